//! Copying terms with fresh variables.
//!
//! [`Arena::copy_term`] copies within one arena, [`Arena::import`] copies
//! a term out of another arena.  Both give every distinct variable of the
//! source one fresh variable in the copy, recorded in a [`VarMap`] that the
//! caller may share between several copies to keep them linked.

use crate::{Arena, Env, Handle, Term, TermError, VarId};
use std::collections::HashMap;

/// Source variable to copied term.
pub type VarMap = HashMap<VarId, Term>;

impl Arena {
    /// Copies `term` as seen through `env` into this arena.  Bound variables
    /// are replaced by their values; unbound ones by fresh variables.
    pub fn copy_term(&mut self, env: &Env, term: Term, vars: &mut VarMap) -> Result<Term, TermError> {
        copy_rec(self, None, Some(env), term, vars)
    }

    /// Copies `term`, which lives in `src`, into this arena.  `env`, if
    /// given, holds bindings for the variables of `src`.  Long atom names
    /// are re-interned here, so the copy no longer depends on `src`.
    pub fn import(
        &mut self,
        src: &Arena,
        env: Option<&Env>,
        term: Term,
        vars: &mut VarMap,
    ) -> Result<Term, TermError> {
        copy_rec(self, Some(src), env, term, vars)
    }
}

/// A compound whose arguments are being copied.
struct Frame {
    functor: Term,
    args: Vec<Term>,
    copied: Vec<Term>,
}

enum Step {
    Done(Term),
    Enter(Frame),
}

fn copy_rec(
    dst: &mut Arena,
    src: Option<&Arena>,
    env: Option<&Env>,
    term: Term,
    vars: &mut VarMap,
) -> Result<Term, TermError> {
    // Compounds wait on an explicit stack, so a long list costs heap, not
    // call depth.
    let mut frames: Vec<Frame> = Vec::new();
    let mut next = term;
    loop {
        let mut done = match copy_step(dst, src, env, next, vars)? {
            Step::Done(t) => t,
            Step::Enter(frame) => {
                next = frame.args[0];
                frames.push(frame);
                continue;
            }
        };
        loop {
            let Some(mut frame) = frames.pop() else {
                return Ok(done);
            };
            frame.copied.push(done);
            if let Some(&arg) = frame.args.get(frame.copied.len()) {
                next = arg;
                frames.push(frame);
                break;
            }
            done = Term(Handle::FuncRef(dst.intern_func(frame.functor, &frame.copied)));
        }
    }
}

/// Copies an atomic term, or opens a frame for a compound.
fn copy_step(
    dst: &mut Arena,
    src: Option<&Arena>,
    env: Option<&Env>,
    term: Term,
    vars: &mut VarMap,
) -> Result<Step, TermError> {
    let term = match env {
        Some(env) => env.resolve(term),
        None => term,
    };
    match term.0 {
        Handle::Int(_) | Handle::Real(_) | Handle::Atom(_) => Ok(Step::Done(term)),
        Handle::Var(id) => Ok(Step::Done(*vars.entry(id).or_insert_with(|| dst.fresh_var()))),
        Handle::AtomRef(_) => Ok(Step::Done(copy_atom(dst, src, term)?)),
        Handle::FuncRef(_) => {
            let (functor, args) = {
                let from = src.unwrap_or(&*dst);
                let (functor, args) = from.unpack_func_any(&term, &[])?;
                (*functor, args.to_vec())
            };
            let functor = copy_atom(dst, src, functor)?;
            if args.is_empty() {
                return Ok(Step::Done(Term(Handle::FuncRef(dst.intern_func(functor, &[])))));
            }
            let copied = Vec::with_capacity(args.len());
            Ok(Step::Enter(Frame { functor, args, copied }))
        }
    }
}

/// Re-interns a long atom name when copying across arenas.
fn copy_atom(dst: &mut Arena, src: Option<&Arena>, atom: Term) -> Result<Term, TermError> {
    match (atom.0, src) {
        (Handle::AtomRef(_), Some(src)) => {
            let name = src.atom_name(&atom)?;
            Ok(dst.atom(name))
        }
        _ => Ok(atom),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{func, list};

    #[test]
    fn copies_get_fresh_variables() {
        let mut arena = Arena::new();
        let env = Env::new();
        let x = arena.var("X");
        let y = arena.var("Y");
        let t = func!("f"; x, y, x => &mut arena);
        let mut vars = VarMap::new();
        let c = arena.copy_term(&env, t, &mut vars).unwrap();
        let (_, [a, b, a2]) = c.unpack_func(&arena, &["f"]).unwrap();
        assert!(a.is_var() && b.is_var());
        assert_ne!(a, x);
        assert_ne!(a, b);
        assert_eq!(a, a2);
        assert_eq!(vars.len(), 2);
    }

    #[test]
    fn bound_variables_are_replaced() {
        let mut arena = Arena::new();
        let mut env = Env::new();
        let x = arena.var("X");
        let t = list![x, 2 => &mut arena];
        env.bind(x.var_id().unwrap(), Term::int(1));
        let c = arena.copy_term(&env, t, &mut VarMap::new()).unwrap();
        let clean = Env::new();
        assert_eq!(
            clean.list_items(&arena, c).unwrap(),
            Some(vec![Term::int(1), Term::int(2)])
        );
    }

    #[test]
    fn shared_map_links_copies() {
        let mut arena = Arena::new();
        let env = Env::new();
        let x = arena.var("X");
        let t1 = func!("a"; x => &mut arena);
        let t2 = func!("b"; x => &mut arena);
        let mut vars = VarMap::new();
        let c1 = arena.copy_term(&env, t1, &mut vars).unwrap();
        let c2 = arena.copy_term(&env, t2, &mut vars).unwrap();
        let (_, [v1]) = c1.unpack_func(&arena, &[]).unwrap();
        let (_, [v2]) = c2.unpack_func(&arena, &[]).unwrap();
        assert_eq!(v1, v2);
    }

    #[test]
    fn import_survives_source() {
        let mut src = Arena::new();
        let mut dst = Arena::new();
        let x = src.var("X");
        let t = func!("a_functor_with_a_long_name"; "another_long_atom_value", x => &mut src);
        let c = dst.import(&src, None, t, &mut VarMap::new()).unwrap();
        drop(src);
        assert_eq!(c.func_name(&dst).unwrap(), "a_functor_with_a_long_name");
        let (_, [a, v]) = c.unpack_func(&dst, &[]).unwrap();
        assert_eq!(a.atom_name(&dst).unwrap(), "another_long_atom_value");
        assert!(v.is_var());
    }

    #[test]
    fn long_lists_copy_without_recursion() {
        let mut src = Arena::new();
        let mut dst = Arena::new();
        let env = Env::new();
        let x = src.var("X");
        let items: Vec<Term> = (0..100_000).map(|i| if i % 2 == 0 { x } else { Term::int(i) }).collect();
        let t = src.list(&items);
        let c = src.copy_term(&env, t, &mut VarMap::new()).unwrap();
        let copied = env.list_items(&src, c).unwrap().unwrap();
        assert_eq!(copied.len(), 100_000);
        assert!(copied[0].is_var() && copied[0] != x);
        assert_eq!(copied[0], copied[99_998]);
        assert_eq!(copied[99_999], Term::int(99_999));
        let i = dst.import(&src, None, t, &mut VarMap::new()).unwrap();
        assert_eq!(env.list_items(&dst, i).unwrap().map(|v| v.len()), Some(100_000));
    }

    #[test]
    fn import_follows_source_bindings() {
        let mut src = Arena::new();
        let mut dst = Arena::new();
        let mut env = Env::new();
        let x = src.var("X");
        let t = func!("f"; x => &mut src);
        let value = func!("g"; 7 => &mut src);
        env.bind(x.var_id().unwrap(), value);
        let c = dst.import(&src, Some(&env), t, &mut VarMap::new()).unwrap();
        let (_, [g]) = c.unpack_func(&dst, &["f"]).unwrap();
        let (_, [seven]) = g.unpack_func(&dst, &["g"]).unwrap();
        assert_eq!(seven, Term::int(7));
    }
}
