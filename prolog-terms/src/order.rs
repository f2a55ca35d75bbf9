//! Standard order of terms.
//!
//! Unbound variables sort first (by creation order), then numbers by
//! value, then atoms by name, then compound terms by arity, name and
//! arguments.  When an integer and a float have the same value the float
//! sorts first, which keeps the order total.

use crate::{Arena, Env, Term, TermError, View};
use std::cmp::Ordering;

/// Rank of each kind in the standard order.
fn kind_order(v: &View) -> u8 {
    match v {
        View::Var(_) => 0,
        View::Int(_) | View::Real(_) => 1,
        View::Atom(_) => 2,
        View::Func(..) => 3,
    }
}

fn compare_numbers(a: &View, b: &View) -> Ordering {
    match (a, b) {
        (View::Int(x), View::Int(y)) => x.cmp(y),
        (View::Real(x), View::Real(y)) => x.total_cmp(y),
        (View::Int(x), View::Real(y)) => (*x as f64).total_cmp(y).then(Ordering::Greater),
        (View::Real(x), View::Int(y)) => x.total_cmp(&(*y as f64)).then(Ordering::Less),
        _ => Ordering::Equal,
    }
}

impl Env {
    /// Compares two terms in the standard order, looking through bindings.
    pub fn compare(&self, arena: &Arena, a: Term, b: Term) -> Result<Ordering, TermError> {
        // Pending argument pairs, leftmost on top.  Lists only grow the
        // stack, never the call depth.
        let mut pending = vec![(a, b)];
        while let Some((a, b)) = pending.pop() {
            let a = self.resolve(a);
            let b = self.resolve(b);
            let (va, vb) = (a.view(arena)?, b.view(arena)?);
            let (ka, kb) = (kind_order(&va), kind_order(&vb));
            let ord = if ka != kb {
                ka.cmp(&kb)
            } else {
                match (va, vb) {
                    (View::Var(x), View::Var(y)) => x.cmp(&y),
                    (View::Atom(x), View::Atom(y)) => x.as_bytes().cmp(y.as_bytes()),
                    (View::Func(_, fa, args_a), View::Func(_, fb, args_b)) => {
                        let ord = args_a
                            .len()
                            .cmp(&args_b.len())
                            .then(arena.atom_name(fa)?.cmp(arena.atom_name(fb)?));
                        if ord.is_eq() {
                            pending.extend(args_a.iter().copied().zip(args_b.iter().copied()).rev());
                        }
                        ord
                    }
                    (va, vb) => compare_numbers(&va, &vb),
                }
            };
            if ord.is_ne() {
                return Ok(ord);
            }
        }
        Ok(Ordering::Equal)
    }

    /// True if the two terms are identical (`==`).
    #[inline]
    pub fn identical(&self, arena: &Arena, a: Term, b: Term) -> Result<bool, TermError> {
        Ok(self.compare(arena, a, b)?.is_eq())
    }

    /// Sorts `terms` in the standard order and removes duplicates.
    pub fn sort_dedup(&self, arena: &Arena, terms: &mut Vec<Term>) -> Result<(), TermError> {
        let mut err = None;
        let mut cmp = |a: &Term, b: &Term| match self.compare(arena, *a, *b) {
            Ok(ord) => ord,
            Err(e) => {
                err.get_or_insert(e);
                Ordering::Equal
            }
        };
        terms.sort_by(&mut cmp);
        terms.dedup_by(|a, b| cmp(&*a, &*b).is_eq());
        match err {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::func;
    use crate::unify::tests::{arb_shape, build, var_pool};
    use proptest::prelude::*;

    fn ord(arena: &Arena, a: Term, b: Term) -> Ordering {
        Env::new().compare(arena, a, b).unwrap()
    }

    #[test]
    fn kinds_are_ranked() {
        let mut arena = Arena::new();
        let x = arena.var("X");
        let a = arena.atom("a");
        let f = func!("f"; 1 => &mut arena);
        assert_eq!(ord(&arena, x, Term::int(1)), Ordering::Less);
        assert_eq!(ord(&arena, Term::real(100.0), a), Ordering::Less);
        assert_eq!(ord(&arena, a, f), Ordering::Less);
        assert_eq!(ord(&arena, f, x), Ordering::Greater);
    }

    #[test]
    fn variables_by_age() {
        let mut arena = Arena::new();
        let x = arena.var("Z");
        let y = arena.var("A");
        assert_eq!(ord(&arena, x, y), Ordering::Less);
        assert_eq!(ord(&arena, x, x), Ordering::Equal);
    }

    #[test]
    fn numbers_by_value() {
        let arena = Arena::new();
        assert_eq!(ord(&arena, Term::int(1), Term::real(1.5)), Ordering::Less);
        assert_eq!(ord(&arena, Term::real(0.5), Term::int(1)), Ordering::Less);
        assert_eq!(ord(&arena, Term::int(-3), Term::int(2)), Ordering::Less);
        // equal value: float first
        assert_eq!(ord(&arena, Term::real(1.0), Term::int(1)), Ordering::Less);
        assert_eq!(ord(&arena, Term::int(1), Term::real(1.0)), Ordering::Greater);
    }

    #[test]
    fn atoms_by_bytes() {
        let mut arena = Arena::new();
        let a = arena.atom("apple");
        let b = arena.atom("banana");
        let long1 = arena.atom("banana_split_with_cream");
        let long2 = arena.atom("banana_split_with_cream");
        assert_eq!(ord(&arena, a, b), Ordering::Less);
        assert_eq!(ord(&arena, b, long1), Ordering::Less);
        assert_eq!(ord(&arena, long1, long2), Ordering::Equal);
    }

    #[test]
    fn compounds_by_arity_name_args() {
        let mut arena = Arena::new();
        let z1 = func!("z"; 1 => &mut arena);
        let a2 = func!("a"; 1, 1 => &mut arena);
        let b1 = func!("b"; 1 => &mut arena);
        let b2 = func!("b"; 2 => &mut arena);
        assert_eq!(ord(&arena, z1, a2), Ordering::Less);
        assert_eq!(ord(&arena, b1, z1), Ordering::Less);
        assert_eq!(ord(&arena, b1, b2), Ordering::Less);
    }

    #[test]
    fn bindings_are_followed() {
        let mut arena = Arena::new();
        let mut env = Env::new();
        let x = arena.var("X");
        let fx = func!("f"; x => &mut arena);
        let fa = func!("f"; "a" => &mut arena);
        assert_eq!(env.compare(&arena, fx, fa).unwrap(), Ordering::Less);
        let a = arena.atom("a");
        env.bind(x.var_id().unwrap(), a);
        assert!(env.identical(&arena, fx, fa).unwrap());
    }

    #[test]
    fn sort_dedup_removes_equal_terms() {
        let mut arena = Arena::new();
        let b = arena.atom("b");
        let a = arena.atom("a");
        let a_again = arena.atom("a");
        let mut terms = vec![b, Term::int(2), a, Term::int(2), a_again];
        Env::new().sort_dedup(&arena, &mut terms).unwrap();
        assert_eq!(terms, vec![Term::int(2), a, b]);
    }

    #[test]
    fn long_lists_compare_without_recursion() {
        let mut arena = Arena::new();
        let n = 200_000;
        let xs = arena.list((0..n).map(Term::int).collect::<Vec<_>>());
        let ys = arena.list((0..n).map(Term::int).collect::<Vec<_>>());
        let zs = arena.list((0..n).map(|i| Term::int(if i == n - 1 { n } else { i })).collect::<Vec<_>>());
        assert_eq!(ord(&arena, xs, ys), Ordering::Equal);
        assert_eq!(ord(&arena, xs, zs), Ordering::Less);
        assert_eq!(ord(&arena, zs, ys), Ordering::Greater);
    }

    proptest! {
        #![proptest_config(ProptestConfig { cases: 32, .. ProptestConfig::default() })]

        #[test]
        fn compare_is_antisymmetric(a in arb_shape(), b in arb_shape()) {
            let mut arena = Arena::new();
            let vars = var_pool(&mut arena);
            let ta = build(&mut arena, &vars, &a);
            let tb = build(&mut arena, &vars, &b);
            let env = Env::new();
            prop_assert_eq!(
                env.compare(&arena, ta, tb).unwrap(),
                env.compare(&arena, tb, ta).unwrap().reverse()
            );
        }

        #[test]
        fn compare_is_transitive(a in arb_shape(), b in arb_shape(), c in arb_shape()) {
            let mut arena = Arena::new();
            let vars = var_pool(&mut arena);
            let mut ts = vec![
                build(&mut arena, &vars, &a),
                build(&mut arena, &vars, &b),
                build(&mut arena, &vars, &c),
            ];
            let env = Env::new();
            ts.sort_by(|x, y| env.compare(&arena, *x, *y).unwrap());
            prop_assert!(env.compare(&arena, ts[0], ts[1]).unwrap().is_le());
            prop_assert!(env.compare(&arena, ts[1], ts[2]).unwrap().is_le());
            prop_assert!(env.compare(&arena, ts[0], ts[2]).unwrap().is_le());
        }

        #[test]
        fn sort_dedup_is_idempotent(shapes in prop::collection::vec(arb_shape(), 0..8)) {
            let mut arena = Arena::new();
            let vars = var_pool(&mut arena);
            let mut ts: Vec<Term> = shapes.iter().map(|s| build(&mut arena, &vars, s)).collect();
            let env = Env::new();
            env.sort_dedup(&arena, &mut ts).unwrap();
            let once = ts.clone();
            env.sort_dedup(&arena, &mut ts).unwrap();
            prop_assert_eq!(once.len(), ts.len());
            for (x, y) in once.iter().zip(&ts) {
                prop_assert!(env.identical(&arena, *x, *y).unwrap());
            }
            for w in ts.windows(2) {
                prop_assert!(env.compare(&arena, w[0], w[1]).unwrap().is_lt());
            }
        }
    }
}
