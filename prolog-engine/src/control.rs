//! Control constructs: conjunction, disjunction, if-then-else, negation,
//! cut, meta-calls and exceptions.

use crate::engine::{Barrier, Builtin, Cont, Control, Engine, Solve};
use crate::{Error, database::PredKey};
use indexmap::IndexMap;
use prolog_terms::Term;

pub(crate) fn register(table: &mut IndexMap<PredKey, Builtin>) {
    let entries: &[(&str, usize, Builtin)] = &[
        (",", 2, conjunction),
        (";", 2, disjunction),
        ("->", 2, if_then),
        ("!", 0, cut),
        ("\\+", 1, not_provable),
        ("not", 1, not_provable),
        ("call", 1, call),
        ("call", 2, call),
        ("call", 3, call),
        ("call", 4, call),
        ("call", 5, call),
        ("call", 6, call),
        ("call", 7, call),
        ("call", 8, call),
        ("catch", 3, catch),
        ("throw", 1, throw),
        ("^", 2, bagof_qualifier),
    ];
    for &(name, arity, f) in entries {
        table.insert(PredKey::new(name, arity), f);
    }
}

fn conjunction(e: &mut Engine, args: &[Term], cut: Barrier, k: Cont<'_>) -> Solve {
    let rest = args[1];
    e.solve_goal(args[0], cut, &mut |e: &mut Engine| e.solve_goal(rest, cut, k))
}

fn disjunction(e: &mut Engine, args: &[Term], cut: Barrier, k: Cont<'_>) -> Solve {
    if let Some(cond) = e.compound_args(args[0], "->", 2) {
        return if_then_else(e, cond[0], cond[1], Some(args[1]), cut, k);
    }
    match e.solve_goal(args[0], cut, k)? {
        Control::Next => e.solve_goal(args[1], cut, k),
        r => Ok(r),
    }
}

fn if_then(e: &mut Engine, args: &[Term], cut: Barrier, k: Cont<'_>) -> Solve {
    if_then_else(e, args[0], args[1], None, cut, k)
}

/// `(Cond -> Then ; Else)`.  The condition runs behind a local barrier;
/// once it succeeds, `Then` runs and the condition's remaining
/// alternatives are cut away.
fn if_then_else(
    e: &mut Engine,
    cond: Term,
    then: Term,
    otherwise: Option<Term>,
    cut: Barrier,
    k: Cont<'_>,
) -> Solve {
    let local = e.barrier();
    let mut committed = false;
    let r = e.solve_goal(cond, local, &mut |e: &mut Engine| {
        committed = true;
        match e.solve_goal(then, cut, k)? {
            Control::Next => Ok(Control::Cut(local)),
            r => Ok(r),
        }
    })?;
    match r {
        Control::Next => {}
        Control::Cut(b) if b == local => {}
        r => return Ok(r),
    }
    match otherwise {
        Some(goal) if !committed => e.solve_goal(goal, cut, k),
        _ => Ok(Control::Next),
    }
}

fn cut(e: &mut Engine, _: &[Term], cut: Barrier, k: Cont<'_>) -> Solve {
    match k(e)? {
        Control::Next => Ok(Control::Cut(cut)),
        r => Ok(r),
    }
}

fn not_provable(e: &mut Engine, args: &[Term], _: Barrier, k: Cont<'_>) -> Solve {
    if e.provable(args[0])? {
        Ok(Control::Next)
    } else {
        k(e)
    }
}

/// `call/1..8`: appends the extra arguments to the goal.
fn call(e: &mut Engine, args: &[Term], _: Barrier, k: Cont<'_>) -> Solve {
    let goal = e.env.resolve(args[0]);
    if args.len() == 1 {
        return e.call(goal, k);
    }
    if goal.is_var() {
        return Err(e.instantiation_error());
    }
    if !goal.is_callable() {
        return Err(e.type_error("callable", goal));
    }
    let name = e.arena.name(&goal)?.to_owned();
    let mut all = e.args(goal)?;
    all.extend_from_slice(&args[1..]);
    let goal = e.arena.func(&name, &all);
    e.call(goal, k)
}

/// `catch(Goal, Catcher, Recovery)`.  Only balls thrown while proving
/// `Goal` are caught; those raised by the continuation pass through.
fn catch(e: &mut Engine, args: &[Term], _: Barrier, k: Cont<'_>) -> Solve {
    let mark = e.env.mark();
    let mut from_k = false;
    let r = e.call(args[0], &mut |e: &mut Engine| {
        let r = k(e);
        from_k = r.is_err();
        r
    });
    let ball = match r {
        Err(Error::Exception(ball)) if !from_k => ball,
        r => return r,
    };
    e.env.undo_to(mark);
    if !e.unify(args[1], ball)? {
        return Err(Error::Exception(ball));
    }
    let r = e.call(args[2], k);
    e.env.undo_to(mark);
    r
}

fn throw(e: &mut Engine, args: &[Term], _: Barrier, _: Cont<'_>) -> Solve {
    if e.env.is_unbound(args[0]) {
        return Err(e.instantiation_error());
    }
    Err(e.throw(args[0]))
}

/// `V^Goal` outside of `bagof/3` and `setof/3` just calls `Goal`.
fn bagof_qualifier(e: &mut Engine, args: &[Term], _: Barrier, k: Cont<'_>) -> Solve {
    e.call(args[1], k)
}

#[cfg(test)]
mod tests {
    use crate::engine::tests::{engine, solutions, uncaught};
    use crate::{Engine, Error};
    use prolog_terms::func;

    fn member_db(e: &mut Engine) {
        let a = &mut e.arena;
        let clauses = [
            func!("c"; 1 => a),
            func!("c"; 2 => a),
            func!("c"; 3 => a),
        ];
        e.add_clauses(clauses).unwrap();
    }

    #[test]
    fn disjunction_tries_both() {
        let mut e = engine();
        member_db(&mut e);
        let x = e.arena.var("X");
        let goal = func!(";"; func!("="; x, "left"), func!("c"; x) => &mut e.arena);
        assert_eq!(solutions(&mut e, goal, &[x]), ["left", "1", "2", "3"]);
    }

    #[test]
    fn if_then_else_commits() {
        let mut e = engine();
        member_db(&mut e);
        let x = e.arena.var("X");
        let goal = func!(";"; func!("->"; func!("c"; x), "true"), func!("="; x, 0) => &mut e.arena);
        assert_eq!(solutions(&mut e, goal, &[x]), ["1"]);
        let goal = func!(";"; func!("->"; "fail", "true"), func!("="; x, 0) => &mut e.arena);
        assert_eq!(solutions(&mut e, goal, &[x]), ["0"]);
        // The then branch keeps its own alternatives.
        let y = e.arena.var("Y");
        let goal = func!("->"; func!("c"; x), func!("c"; y) => &mut e.arena);
        assert_eq!(solutions(&mut e, goal, &[x, y]), ["1 1", "1 2", "1 3"]);
        // A cut in the condition is local to it.
        let goal = func!(";"; func!("->"; func!(","; "!", "fail"), "true"), func!("="; x, 7) => &mut e.arena);
        assert_eq!(solutions(&mut e, goal, &[x]), ["7"]);
    }

    #[test]
    fn cut_in_then_branch_cuts_the_clause() {
        let mut e = engine();
        member_db(&mut e);
        let x = e.arena.var("X");
        let body = func!(","; func!("c"; x), func!("->"; "true", "!") => &mut e.arena);
        let clauses = [
            func!(":-"; func!("p"; x), body => &mut e.arena),
            func!("p"; 9 => &mut e.arena),
        ];
        e.add_clauses(clauses).unwrap();
        let y = e.arena.var("Y");
        let goal = func!("p"; y => &mut e.arena);
        assert_eq!(solutions(&mut e, goal, &[y]), ["1"]);
    }

    #[test]
    fn negation() {
        let mut e = engine();
        member_db(&mut e);
        let x = e.arena.var("X");
        let goal = func!("\\+"; func!("c"; 4) => &mut e.arena);
        assert_eq!(solutions(&mut e, goal, &[]), [""]);
        let goal = func!("\\+"; func!("c"; x) => &mut e.arena);
        assert!(solutions(&mut e, goal, &[]).is_empty());
        // Bindings made inside are discarded.
        let goal = func!(","; func!("\\+"; func!("\\+"; func!("="; x, 1))), func!("="; x, 2) => &mut e.arena);
        assert_eq!(solutions(&mut e, goal, &[x]), ["2"]);
        // A cut inside does not count as a solution.
        let goal = func!("\\+"; func!(","; "!", "fail") => &mut e.arena);
        assert_eq!(solutions(&mut e, goal, &[]), [""]);
    }

    #[test]
    fn call_with_extra_arguments() {
        let mut e = engine();
        member_db(&mut e);
        let x = e.arena.var("X");
        let goal = func!("call"; "c", x => &mut e.arena);
        assert_eq!(solutions(&mut e, goal, &[x]), ["1", "2", "3"]);
        let partial = func!("="; x => &mut e.arena);
        let goal = func!("call"; partial, "z" => &mut e.arena);
        assert_eq!(solutions(&mut e, goal, &[x]), ["z"]);
        let goal = func!("call"; 3, x => &mut e.arena);
        assert!(uncaught(&mut e, goal).starts_with("error(type_error(callable, 3)"));
        let g = e.arena.var("G");
        let goal = func!("call"; g, x => &mut e.arena);
        assert!(uncaught(&mut e, goal).starts_with("error(instantiation_error"));
    }

    #[test]
    fn catch_and_throw() {
        let mut e = engine();
        let x = e.arena.var("X");
        // catch(throw(a), X, true) binds X = a.
        let goal = func!("catch"; func!("throw"; "a"), x, "true" => &mut e.arena);
        assert_eq!(solutions(&mut e, goal, &[x]), ["a"]);
        // A catcher that does not match rethrows the ball.
        let goal = func!("catch"; func!("throw"; "a"), "b", "true" => &mut e.arena);
        assert_eq!(uncaught(&mut e, goal), "a");
        // No exception: catch/3 behaves like call/1.
        let goal = func!("catch"; "true", x, "fail" => &mut e.arena);
        assert_eq!(solutions(&mut e, goal, &[]), [""]);
        let goal = func!("catch"; "fail", x, "true" => &mut e.arena);
        assert!(solutions(&mut e, goal, &[]).is_empty());
        // The recovery goal sees the ball.
        let y = e.arena.var("Y");
        let goal = func!("catch"; func!("throw"; func!("f"; 1)), func!("f"; y), func!("="; x, y) => &mut e.arena);
        assert_eq!(solutions(&mut e, goal, &[x]), ["1"]);
        let goal = func!("throw"; y => &mut e.arena);
        assert!(uncaught(&mut e, goal).starts_with("error(instantiation_error"));
    }

    #[test]
    fn catch_restores_bindings_and_ignores_continuation_errors() {
        let mut e = engine();
        let (x, y) = (e.arena.var("X"), e.arena.var("Y"));
        let goal = func!(
            "catch";
            func!(","; func!("="; x, 1), func!("throw"; "oops")),
            y,
            func!("="; x, 2)
            => &mut e.arena
        );
        assert_eq!(solutions(&mut e, goal, &[x, y]), ["2 oops"]);
        // throw(b) runs in the continuation of the catch, so it escapes.
        let goal = func!(","; func!("catch"; "true", x, "true"), func!("throw"; "b") => &mut e.arena);
        assert_eq!(uncaught(&mut e, goal), "b");
    }

    #[test]
    fn errors_unwind_through_cut_barriers() {
        let mut e = engine();
        let x = e.arena.var("X");
        let inner = func!("call"; func!(","; "!", func!("throw"; "deep")) => &mut e.arena);
        let goal = func!("catch"; func!("\\+"; inner), x, "true" => &mut e.arena);
        assert_eq!(solutions(&mut e, goal, &[x]), ["deep"]);
    }

    #[test]
    fn native_faults_are_not_caught() {
        let mut e = engine();
        let mut other = prolog_terms::Arena::new();
        let foreign = func!("f"; 1 => &mut other);
        let x = e.arena.var("X");
        let goal = func!("catch"; foreign, x, "true" => &mut e.arena);
        assert!(matches!(e.query(goal, |_| false), Err(Error::Term(_))));
        assert!(e.env.is_empty());
    }
}
