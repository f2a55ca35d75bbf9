//! All-solutions builtins: `findall/3`, `bagof/3`, `setof/3` and
//! `forall/2`.

use crate::database::PredKey;
use crate::engine::{Barrier, Builtin, Cont, Control, Engine, Solve};
use crate::Error;
use indexmap::IndexMap;
use prolog_terms::{Term, VarId, VarMap};
use std::cmp::Ordering;
use std::collections::HashSet;

pub(crate) fn register(table: &mut IndexMap<PredKey, Builtin>) {
    let entries: &[(&str, usize, Builtin)] = &[
        ("findall", 3, findall),
        ("bagof", 3, bagof),
        ("setof", 3, setof),
        ("forall", 2, forall),
    ];
    for &(name, arity, f) in entries {
        table.insert(PredKey::new(name, arity), f);
    }
}

fn findall(e: &mut Engine, args: &[Term], _: Barrier, k: Cont<'_>) -> Solve {
    let template = args[0];
    let mut results = Vec::new();
    e.call(args[1], &mut |e: &mut Engine| {
        let copy = e.arena.copy_term(&e.env, template, &mut VarMap::new())?;
        results.push(copy);
        Ok(Control::Next)
    })?;
    let list = e.arena.list(&results);
    e.unify_then(args[2], list, k)
}

fn bagof(e: &mut Engine, args: &[Term], _: Barrier, k: Cont<'_>) -> Solve {
    e.collect_groups(args[0], args[1], args[2], false, k)
}

fn setof(e: &mut Engine, args: &[Term], _: Barrier, k: Cont<'_>) -> Solve {
    e.collect_groups(args[0], args[1], args[2], true, k)
}

/// `forall(Cond, Action)`: no solution of `Cond` makes `Action` fail.
fn forall(e: &mut Engine, args: &[Term], _: Barrier, k: Cont<'_>) -> Solve {
    let (cond, action) = (args[0], args[1]);
    let barrier = e.barrier();
    let mark = e.env.mark();
    let mut counterexample = false;
    let r = e.solve_goal(cond, barrier, &mut |e: &mut Engine| {
        if e.provable(action)? {
            Ok(Control::Next)
        } else {
            counterexample = true;
            Ok(Control::Cut(barrier))
        }
    });
    e.env.undo_to(mark);
    r?;
    if counterexample {
        Ok(Control::Next)
    } else {
        k(e)
    }
}

impl Engine {
    /// Solutions of `goal` grouped by the bindings of its free variables,
    /// as `bagof/3` (or `setof/3` if `set`) enumerates them.
    pub fn bagof(&mut self, template: Term, goal: Term, result: Term, k: Cont<'_>) -> Result<bool, Error> {
        Ok(self.collect_groups(template, goal, result, false, k)? == Control::Stop)
    }

    /// Like [`Engine::bagof`], with each group sorted and free of duplicates.
    pub fn setof(&mut self, template: Term, goal: Term, result: Term, k: Cont<'_>) -> Result<bool, Error> {
        Ok(self.collect_groups(template, goal, result, true, k)? == Control::Stop)
    }

    fn collect_groups(
        &mut self,
        template: Term,
        goal: Term,
        result: Term,
        set: bool,
        k: Cont<'_>,
    ) -> Solve {
        // Strip `V^Goal`, collecting the variables that are not free.
        let mut bound: HashSet<VarId> = HashSet::new();
        for v in self.env.term_variables(&self.arena, template)? {
            bound.extend(v.var_id());
        }
        let mut goal = self.env.resolve(goal);
        while let Some(parts) = self.compound_args(goal, "^", 2) {
            for v in self.env.term_variables(&self.arena, parts[0])? {
                bound.extend(v.var_id());
            }
            goal = self.env.resolve(parts[1]);
        }
        let free: Vec<Term> = self
            .env
            .term_variables(&self.arena, goal)?
            .into_iter()
            .filter(|v| v.var_id().is_some_and(|id| !bound.contains(&id)))
            .collect();
        let witness = self.arena.func("$w", &free);

        let mut pairs: Vec<(Term, Term)> = Vec::new();
        self.call(goal, &mut |e: &mut Engine| {
            let mut vars = VarMap::new();
            let w = e.arena.copy_term(&e.env, witness, &mut vars)?;
            let t = e.arena.copy_term(&e.env, template, &mut vars)?;
            pairs.push((w, t));
            Ok(Control::Next)
        })?;
        if pairs.is_empty() {
            return Ok(Control::Next);
        }

        let mut groups: Vec<(Term, Vec<Term>)> = Vec::new();
        for (w, t) in pairs {
            let mut found = None;
            for (i, (gw, _)) in groups.iter().enumerate() {
                if self.env.compare(&self.arena, *gw, w)? == Ordering::Equal {
                    found = Some(i);
                    break;
                }
            }
            match found {
                Some(i) => groups[i].1.push(t),
                None => groups.push((w, vec![t])),
            }
        }
        if set {
            let mut err = None;
            groups.sort_by(|(a, _), (b, _)| match self.env.compare(&self.arena, *a, *b) {
                Ok(ord) => ord,
                Err(e) => {
                    err.get_or_insert(e);
                    Ordering::Equal
                }
            });
            if let Some(e) = err {
                return Err(e.into());
            }
            for (_, items) in groups.iter_mut() {
                self.env.sort_dedup(&self.arena, items)?;
            }
        }

        for (w, items) in groups {
            let list = self.arena.list(&items);
            let mark = self.env.mark();
            let r = if self.unify(witness, w)? && self.unify(result, list)? {
                k(self)
            } else {
                Ok(Control::Next)
            };
            self.env.undo_to(mark);
            match r? {
                Control::Next => {}
                r => return Ok(r),
            }
        }
        Ok(Control::Next)
    }
}

#[cfg(test)]
mod tests {
    use crate::engine::tests::{engine, solutions, uncaught};
    use crate::engine::Control;
    use crate::Engine;
    use prolog_terms::{func, list, Term};

    fn foo_db(e: &mut Engine) {
        let clauses = [
            func!("foo"; "a", "b", "c" => &mut e.arena),
            func!("foo"; "a", "b", "d" => &mut e.arena),
            func!("foo"; "b", "c", "e" => &mut e.arena),
            func!("foo"; "b", "c", "f" => &mut e.arena),
            func!("foo"; "c", "c", "g" => &mut e.arena),
        ];
        e.add_clauses(clauses).unwrap();
    }

    #[test]
    fn findall_collects_copies() {
        let mut e = engine();
        foo_db(&mut e);
        let (a, c, l) = (e.arena.var("A"), e.arena.var("C"), e.arena.var("L"));
        let goal = func!("findall"; func!("-"; a, c), func!("foo"; a, "c", c), l => &mut e.arena);
        assert_eq!(solutions(&mut e, goal, &[a, l]), ["A [b-e, b-f, c-g]"]);
        let goal = func!("findall"; a, "fail", l => &mut e.arena);
        assert_eq!(solutions(&mut e, goal, &[l]), ["[]"]);
    }

    #[test]
    fn bagof_groups_by_free_variables() {
        let mut e = engine();
        foo_db(&mut e);
        let (a, b, c, cs) = (
            e.arena.var("A"),
            e.arena.var("B"),
            e.arena.var("C"),
            e.arena.var("Cs"),
        );
        let goal = func!("bagof"; c, func!("foo"; a, b, c), cs => &mut e.arena);
        assert_eq!(
            solutions(&mut e, goal, &[a, b, cs]),
            ["a b [c, d]", "b c [e, f]", "c c [g]"]
        );
    }

    #[test]
    fn bagof_with_existential_qualifier() {
        let mut e = engine();
        foo_db(&mut e);
        let (a, b, c, cs) = (
            e.arena.var("A"),
            e.arena.var("B"),
            e.arena.var("C"),
            e.arena.var("Cs"),
        );
        let goal = func!("bagof"; c, func!("^"; a, func!("foo"; a, b, c)), cs => &mut e.arena);
        assert_eq!(
            solutions(&mut e, goal, &[a, b, cs]),
            ["A b [c, d]", "A c [e, f, g]"]
        );
        let goal = func!("bagof"; c, func!("^"; a, func!("^"; b, func!("foo"; a, b, c))), cs => &mut e.arena);
        assert_eq!(solutions(&mut e, goal, &[cs]), ["[c, d, e, f, g]"]);
    }

    #[test]
    fn bagof_fails_without_solutions() {
        let mut e = engine();
        foo_db(&mut e);
        let (c, cs) = (e.arena.var("C"), e.arena.var("Cs"));
        let goal = func!("bagof"; c, func!("foo"; "z", "z", c), cs => &mut e.arena);
        assert!(solutions(&mut e, goal, &[cs]).is_empty());
    }

    #[test]
    fn setof_sorts_groups_and_items() {
        let mut e = engine();
        let clauses = [
            func!("age"; "peter", 7 => &mut e.arena),
            func!("age"; "ann", 11 => &mut e.arena),
            func!("age"; "pat", 8 => &mut e.arena),
            func!("age"; "tom", 5 => &mut e.arena),
            func!("age"; "mike", 11 => &mut e.arena),
            func!("age"; "ann", 11 => &mut e.arena),
        ];
        e.add_clauses(clauses).unwrap();
        let (n, a, l) = (e.arena.var("N"), e.arena.var("A"), e.arena.var("L"));
        let goal = func!("setof"; n, func!("age"; n, a), l => &mut e.arena);
        assert_eq!(
            solutions(&mut e, goal, &[a, l]),
            ["5 [tom]", "7 [peter]", "8 [pat]", "11 [ann, mike]"]
        );
        let goal = func!("setof"; func!("-"; a, n), func!("^"; n, func!("age"; n, a)), l => &mut e.arena);
        assert_eq!(
            solutions(&mut e, goal, &[l]),
            ["[5-tom, 7-peter, 8-pat, 11-ann, 11-mike]"]
        );
    }

    #[test]
    fn host_bagof() {
        let mut e = engine();
        foo_db(&mut e);
        let (a, b, c, cs) = (
            e.arena.var("A"),
            e.arena.var("B"),
            e.arena.var("C"),
            e.arena.var("Cs"),
        );
        let goal = func!("foo"; a, b, c => &mut e.arena);
        let mut groups = Vec::new();
        let stopped = e
            .bagof(c, goal, cs, &mut |e: &mut Engine| {
                groups.push(e.display(cs).to_string());
                Ok(Control::Next)
            })
            .unwrap();
        assert!(!stopped);
        assert_eq!(groups, ["[c, d]", "[e, f]", "[g]"]);
        let stopped = e.setof(c, goal, cs, &mut |_: &mut Engine| Ok(Control::Stop)).unwrap();
        assert!(stopped);
        assert!(e.env().is_empty());
    }

    #[test]
    fn forall_checks_every_solution() {
        let mut e = engine();
        foo_db(&mut e);
        let (a, b, c) = (e.arena.var("A"), e.arena.var("B"), e.arena.var("C"));
        let goal = func!("forall"; func!("foo"; a, b, c), func!("atom"; c) => &mut e.arena);
        assert_eq!(solutions(&mut e, goal, &[]), [""]);
        let goal = func!("forall"; func!("foo"; a, b, c), func!("=="; a, "a") => &mut e.arena);
        assert!(solutions(&mut e, goal, &[]).is_empty());
        let goal = func!("forall"; "fail", func!("throw"; "never") => &mut e.arena);
        assert_eq!(solutions(&mut e, goal, &[]), [""]);
        let goal = func!("forall"; "true", func!("throw"; "boom") => &mut e.arena);
        assert_eq!(uncaught(&mut e, goal), "boom");
    }

    #[test]
    fn tuple_qualifier_binds_every_variable() {
        let mut e = engine();
        foo_db(&mut e);
        let (a, b, c, l) = (
            e.arena.var("A"),
            e.arena.var("B"),
            e.arena.var("C"),
            e.arena.var("L"),
        );
        let goal = func!("bagof"; c, func!("^"; func!(","; a, b), func!("foo"; a, b, c)), l => &mut e.arena);
        assert_eq!(solutions(&mut e, goal, &[l]), ["[c, d, e, f, g]"]);
        let goal = func!("bagof"; a, func!("^"; func!(","; b, c), func!("foo"; a, b, c)), l => &mut e.arena);
        assert_eq!(solutions(&mut e, goal, &[l]), ["[a, a, b, b, c]"]);
        let goal = func!("setof"; a, func!("^"; func!(","; b, c), func!("foo"; a, b, c)), l => &mut e.arena);
        assert_eq!(solutions(&mut e, goal, &[l]), ["[a, b, c]"]);
    }

    #[test]
    fn witness_and_template_are_copied_together() {
        let mut e = engine();
        let x = e.arena.var("X");
        let clause = func!("p"; x, func!("f"; x) => &mut e.arena);
        e.add_clause(clause).unwrap();
        let (w, t, v) = (e.arena.var("W"), e.arena.var("T"), e.arena.var("V"));
        for name in ["bagof", "setof"] {
            let goal = func!(
                ",";
                func!(name; t, func!("p"; w, t), list![func!("f"; v)]),
                func!("=="; w, v)
                => &mut e.arena
            );
            assert_eq!(solutions(&mut e, goal, &[]), [""]);
        }
    }

    #[test]
    fn long_solution_lists() {
        let mut e = engine();
        let (x, h, t) = (e.arena.var("X"), e.arena.var("H"), e.arena.var("T"));
        let clauses = [
            func!("mem"; x, list![x; h] => &mut e.arena),
            func!(":-"; func!("mem"; x, list![h; t]), func!("mem"; x, t) => &mut e.arena),
        ];
        e.add_clauses(clauses).unwrap();
        let down: Vec<Term> = (0..10_000i64).rev().map(Term::int).collect();
        let up: Vec<Term> = (0..10_000i64).map(Term::int).collect();
        let (down, up) = (e.arena.list(&down), e.arena.list(&up));
        let (y, l) = (e.arena.var("Y"), e.arena.var("L"));
        for (name, expected) in [("findall", down), ("bagof", down), ("setof", up)] {
            let goal = func!(
                ",";
                func!(name; y, func!("mem"; y, down), l),
                func!("=="; l, expected)
                => &mut e.arena
            );
            assert_eq!(solutions(&mut e, goal, &[]), [""]);
        }
    }
}
