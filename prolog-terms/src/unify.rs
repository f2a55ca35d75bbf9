//! Structural unification over an [`Env`].
//!
//! Unification never touches the terms themselves: it only adds bindings
//! to the environment, and a failed attempt leaves the environment exactly
//! as it found it.

use crate::{Arena, Env, Term, TermError, VarId, View};

impl Env {
    /// Unifies `a` with `b`, extending the environment.
    ///
    /// Returns `Ok(false)` when the terms do not unify; in that case every
    /// binding made during the attempt has been undone.  With
    /// `occurs_check` set, a variable is never bound to a term that
    /// contains it.  Integers and floats never unify with each other, so
    /// `1` and `1.0` are distinct.
    pub fn unify(
        &mut self,
        arena: &Arena,
        a: Term,
        b: Term,
        occurs_check: bool,
    ) -> Result<bool, TermError> {
        let mark = self.mark();
        match self.unify_pairs(arena, a, b, occurs_check) {
            Ok(true) => Ok(true),
            Ok(false) => {
                self.undo_to(mark);
                Ok(false)
            }
            Err(e) => {
                self.undo_to(mark);
                Err(e)
            }
        }
    }

    fn unify_pairs(
        &mut self,
        arena: &Arena,
        a: Term,
        b: Term,
        occurs_check: bool,
    ) -> Result<bool, TermError> {
        let mut stack = vec![(a, b)];
        while let Some((a, b)) = stack.pop() {
            let a = self.resolve(a);
            let b = self.resolve(b);
            match (a.view(arena)?, b.view(arena)?) {
                (View::Var(x), View::Var(y)) if x == y => {}
                (View::Var(x), _) => {
                    if occurs_check && self.occurs(arena, x, b)? {
                        return Ok(false);
                    }
                    self.bind(x, b);
                }
                (_, View::Var(y)) => {
                    if occurs_check && self.occurs(arena, y, a)? {
                        return Ok(false);
                    }
                    self.bind(y, a);
                }
                (View::Int(x), View::Int(y)) => {
                    if x != y {
                        return Ok(false);
                    }
                }
                (View::Real(x), View::Real(y)) => {
                    if x.total_cmp(&y).is_ne() {
                        return Ok(false);
                    }
                }
                (View::Atom(x), View::Atom(y)) => {
                    if x != y {
                        return Ok(false);
                    }
                }
                (View::Func(_, fa, args_a), View::Func(_, fb, args_b)) => {
                    if args_a.len() != args_b.len() || arena.atom_name(fa)? != arena.atom_name(fb)? {
                        return Ok(false);
                    }
                    // Reversed so the leftmost pair is unified first.
                    stack.extend(args_a.iter().copied().zip(args_b.iter().copied()).rev());
                }
                _ => return Ok(false),
            }
        }
        Ok(true)
    }

    /// True if the variable `var` occurs in `term`, following bindings.
    pub fn occurs(&self, arena: &Arena, var: VarId, term: Term) -> Result<bool, TermError> {
        let mut stack = vec![term];
        while let Some(t) = stack.pop() {
            match self.resolve(t).view(arena)? {
                View::Var(id) if id == var => return Ok(true),
                View::Func(_, _, args) => stack.extend_from_slice(args),
                _ => {}
            }
        }
        Ok(false)
    }
}
