//! Database builtins: `asserta/1`, `assertz/1`, `retract/1`, `abolish/1`
//! and `current_predicate/1`.

use crate::database::{Clause, PredKey};
use crate::engine::{Barrier, Builtin, Cont, Control, Engine, Solve};
use crate::Error;
use indexmap::IndexMap;
use prolog_terms::{Term, VarMap};

pub(crate) fn register(table: &mut IndexMap<PredKey, Builtin>) {
    let entries: &[(&str, usize, Builtin)] = &[
        ("asserta", 1, asserta),
        ("assertz", 1, assertz),
        ("assert", 1, assertz),
        ("retract", 1, retract),
        ("abolish", 1, abolish),
        ("current_predicate", 1, current_predicate),
    ];
    for &(name, arity, f) in entries {
        table.insert(PredKey::new(name, arity), f);
    }
}

impl Engine {
    /// Splits a clause term into head and body.  A bare head gets body
    /// `true`.
    fn clause_parts(&mut self, clause: Term) -> Result<(Term, Term), Error> {
        let clause = self.env.resolve(clause);
        if clause.is_var() {
            return Err(self.instantiation_error());
        }
        let (head, body) = match self.compound_args(clause, ":-", 2) {
            Some(parts) => (self.env.resolve(parts[0]), parts[1]),
            None => (clause, Term::TRUE),
        };
        if head.is_var() {
            return Err(self.instantiation_error());
        }
        if !head.is_callable() {
            return Err(self.type_error("callable", head));
        }
        Ok((head, body))
    }

    /// The key of a user procedure.  Builtins cannot be modified.
    fn user_key(&mut self, head: Term) -> Result<PredKey, Error> {
        let key = PredKey::of(&self.arena, &head)?;
        if self.builtins.contains_key(&key) {
            let ind = key.to_term(&mut self.arena);
            return Err(self.permission_error("modify", "static_procedure", ind));
        }
        Ok(key)
    }

    /// Copies `clause` into the database, at the front of its procedure if
    /// `front`, otherwise at the back.
    pub(crate) fn assert_clause(&mut self, clause: Term, front: bool) -> Result<(), Error> {
        let (head, body) = self.clause_parts(clause)?;
        if self.env.resolve(body).is_number() {
            let body = self.env.resolve(body);
            return Err(self.type_error("callable", body));
        }
        let key = self.user_key(head)?;
        let mut vars = VarMap::new();
        let head = self
            .db
            .arena
            .import(&self.arena, Some(&self.env), head, &mut vars)?;
        let body = self
            .db
            .arena
            .import(&self.arena, Some(&self.env), body, &mut vars)?;
        log::debug!("assert {key} ({})", if front { "front" } else { "back" });
        let clause = Clause { head, body };
        if front {
            self.db.add_front(key, clause);
        } else {
            self.db.add_back(key, clause);
        }
        Ok(())
    }
}

fn asserta(e: &mut Engine, args: &[Term], _: Barrier, k: Cont<'_>) -> Solve {
    e.assert_clause(args[0], true)?;
    k(e)
}

fn assertz(e: &mut Engine, args: &[Term], _: Barrier, k: Cont<'_>) -> Solve {
    e.assert_clause(args[0], false)?;
    k(e)
}

/// `retract(Clause)`: removes each matching clause in turn and runs the
/// continuation after each removal.
fn retract(e: &mut Engine, args: &[Term], _: Barrier, k: Cont<'_>) -> Solve {
    let (head, body) = e.clause_parts(args[0])?;
    let key = e.user_key(head)?;
    let Some(clauses) = e.db.snapshot(&key) else {
        return Ok(Control::Next);
    };
    for clause in clauses {
        let mark = e.env.mark();
        let mut vars = VarMap::new();
        let h = e.arena.import(&e.db.arena, None, clause.head, &mut vars)?;
        let b = e.arena.import(&e.db.arena, None, clause.body, &mut vars)?;
        // A clause an earlier solution already removed is skipped.
        let r = if e.unify(head, h)? && e.unify(body, b)? && e.db.remove(&key, &clause) {
            log::debug!("retract {key}");
            k(e)
        } else {
            Ok(Control::Next)
        };
        e.env.undo_to(mark);
        match r? {
            Control::Next => {}
            r => return Ok(r),
        }
    }
    Ok(Control::Next)
}

/// `abolish(Name/Arity)`.
fn abolish(e: &mut Engine, args: &[Term], _: Barrier, k: Cont<'_>) -> Solve {
    let pi = e.env.resolve(args[0]);
    if pi.is_var() {
        return Err(e.instantiation_error());
    }
    let Some(parts) = e.compound_args(pi, "/", 2) else {
        return Err(e.type_error("predicate_indicator", pi));
    };
    let (name, arity) = (e.env.resolve(parts[0]), e.env.resolve(parts[1]));
    if name.is_var() || arity.is_var() {
        return Err(e.instantiation_error());
    }
    let Some(n) = e.atom_name(name) else {
        return Err(e.type_error("atom", name));
    };
    let Some(a) = e.int_value(arity) else {
        return Err(e.type_error("integer", arity));
    };
    let Ok(a) = usize::try_from(a) else {
        return Err(e.domain_error("not_less_than_zero", arity));
    };
    let key = PredKey::new(&n, a);
    if e.builtins.contains_key(&key) {
        return Err(e.permission_error("modify", "static_procedure", pi));
    }
    if e.db.abolish(&key) {
        log::debug!("abolish {key}");
    }
    k(e)
}

/// `current_predicate(Name/Arity)`, enumerating user procedures in the
/// order they were first defined.
fn current_predicate(e: &mut Engine, args: &[Term], _: Barrier, k: Cont<'_>) -> Solve {
    let pi = e.env.resolve(args[0]);
    if !pi.is_var() && e.compound_args(pi, "/", 2).is_none() {
        return Err(e.type_error("predicate_indicator", pi));
    }
    let keys: Vec<PredKey> = e.db.keys().cloned().collect();
    for key in keys {
        let ind = key.to_term(&mut e.arena);
        match e.unify_then(pi, ind, k)? {
            Control::Next => {}
            r => return Ok(r),
        }
    }
    Ok(Control::Next)
}
