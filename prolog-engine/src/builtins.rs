//! The builtin table and the term builtins: unification, comparison, type
//! tests, term construction and inspection, flags and operators.

use crate::engine::{Barrier, Builtin, Cont, Control, Engine, Solve};
use crate::{EngineConfig, aggregate, control, database::PredKey, dynamic, stream};
use indexmap::IndexMap;
use prolog_terms::{MAX_OPER_PREC, OperDef, Term, VarMap, View};
use std::cmp::Ordering;

/// Every builtin, keyed by name and arity.
pub(crate) fn table() -> IndexMap<PredKey, Builtin> {
    let mut table = IndexMap::new();
    control::register(&mut table);
    register(&mut table);
    dynamic::register(&mut table);
    aggregate::register(&mut table);
    stream::register(&mut table);
    table
}

fn register(table: &mut IndexMap<PredKey, Builtin>) {
    let entries: &[(&str, usize, Builtin)] = &[
        ("true", 0, succeed),
        ("fail", 0, fail),
        ("false", 0, fail),
        ("=", 2, unify),
        ("\\=", 2, not_unifiable),
        ("unify_with_occurs_check", 2, unify_with_occurs_check),
        ("==", 2, identical),
        ("\\==", 2, not_identical),
        ("@<", 2, term_less),
        ("@>", 2, term_greater),
        ("@=<", 2, term_not_greater),
        ("@>=", 2, term_not_less),
        ("compare", 3, compare),
        ("var", 1, is_var),
        ("nonvar", 1, is_nonvar),
        ("atom", 1, is_atom),
        ("number", 1, is_number),
        ("integer", 1, is_integer),
        ("float", 1, is_float),
        ("atomic", 1, is_atomic),
        ("compound", 1, is_compound),
        ("callable", 1, is_callable),
        ("is_list", 1, is_list),
        ("functor", 3, functor),
        ("arg", 3, arg),
        ("=..", 2, univ),
        ("copy_term", 2, copy_term),
        ("char_code", 2, char_code),
        ("repeat", 0, repeat),
        ("set_prolog_flag", 2, set_prolog_flag),
        ("current_prolog_flag", 2, current_prolog_flag),
        ("op", 3, op),
    ];
    for &(name, arity, f) in entries {
        table.insert(PredKey::new(name, arity), f);
    }
}

/// Runs `k` if `ok`, otherwise fails.
fn succeed_if(e: &mut Engine, ok: bool, k: Cont<'_>) -> Solve {
    if ok { k(e) } else { Ok(Control::Next) }
}

fn succeed(e: &mut Engine, _: &[Term], _: Barrier, k: Cont<'_>) -> Solve {
    k(e)
}

fn fail(_: &mut Engine, _: &[Term], _: Barrier, _: Cont<'_>) -> Solve {
    Ok(Control::Next)
}

fn unify(e: &mut Engine, args: &[Term], _: Barrier, k: Cont<'_>) -> Solve {
    e.unify_then(args[0], args[1], k)
}

fn not_unifiable(e: &mut Engine, args: &[Term], _: Barrier, k: Cont<'_>) -> Solve {
    let mark = e.env.mark();
    let unifiable = e.unify(args[0], args[1])?;
    e.env.undo_to(mark);
    succeed_if(e, !unifiable, k)
}

fn unify_with_occurs_check(e: &mut Engine, args: &[Term], _: Barrier, k: Cont<'_>) -> Solve {
    let mark = e.env.mark();
    let r = if e.env.unify(&e.arena, args[0], args[1], true)? {
        k(e)
    } else {
        Ok(Control::Next)
    };
    e.env.undo_to(mark);
    r
}

fn order(e: &Engine, args: &[Term]) -> Result<Ordering, crate::Error> {
    Ok(e.env.compare(&e.arena, args[0], args[1])?)
}

fn identical(e: &mut Engine, args: &[Term], _: Barrier, k: Cont<'_>) -> Solve {
    let ok = order(e, args)?.is_eq();
    succeed_if(e, ok, k)
}

fn not_identical(e: &mut Engine, args: &[Term], _: Barrier, k: Cont<'_>) -> Solve {
    let ok = order(e, args)?.is_ne();
    succeed_if(e, ok, k)
}

fn term_less(e: &mut Engine, args: &[Term], _: Barrier, k: Cont<'_>) -> Solve {
    let ok = order(e, args)?.is_lt();
    succeed_if(e, ok, k)
}

fn term_greater(e: &mut Engine, args: &[Term], _: Barrier, k: Cont<'_>) -> Solve {
    let ok = order(e, args)?.is_gt();
    succeed_if(e, ok, k)
}

fn term_not_greater(e: &mut Engine, args: &[Term], _: Barrier, k: Cont<'_>) -> Solve {
    let ok = order(e, args)?.is_le();
    succeed_if(e, ok, k)
}

fn term_not_less(e: &mut Engine, args: &[Term], _: Barrier, k: Cont<'_>) -> Solve {
    let ok = order(e, args)?.is_ge();
    succeed_if(e, ok, k)
}

/// `compare(Order, A, B)`.
fn compare(e: &mut Engine, args: &[Term], _: Barrier, k: Cont<'_>) -> Solve {
    let o = e.env.resolve(args[0]);
    if !o.is_var() {
        let name = e.atom_name(o);
        match name.as_deref() {
            None => return Err(e.type_error("atom", o)),
            Some("<" | "=" | ">") => {}
            Some(_) => return Err(e.domain_error("order", o)),
        }
    }
    let ord = order(e, &args[1..])?;
    let name = match ord {
        Ordering::Less => "<",
        Ordering::Equal => "=",
        Ordering::Greater => ">",
    };
    let result = e.arena.atom(name);
    e.unify_then(o, result, k)
}

fn type_test(e: &mut Engine, arg: Term, k: Cont<'_>, test: fn(&Term) -> bool) -> Solve {
    let t = e.env.resolve(arg);
    succeed_if(e, test(&t), k)
}

fn is_var(e: &mut Engine, args: &[Term], _: Barrier, k: Cont<'_>) -> Solve {
    type_test(e, args[0], k, Term::is_var)
}

fn is_nonvar(e: &mut Engine, args: &[Term], _: Barrier, k: Cont<'_>) -> Solve {
    type_test(e, args[0], k, |t| !t.is_var())
}

fn is_atom(e: &mut Engine, args: &[Term], _: Barrier, k: Cont<'_>) -> Solve {
    type_test(e, args[0], k, Term::is_atom)
}

fn is_number(e: &mut Engine, args: &[Term], _: Barrier, k: Cont<'_>) -> Solve {
    type_test(e, args[0], k, Term::is_number)
}

fn is_integer(e: &mut Engine, args: &[Term], _: Barrier, k: Cont<'_>) -> Solve {
    type_test(e, args[0], k, Term::is_int)
}

fn is_float(e: &mut Engine, args: &[Term], _: Barrier, k: Cont<'_>) -> Solve {
    type_test(e, args[0], k, Term::is_real)
}

fn is_atomic(e: &mut Engine, args: &[Term], _: Barrier, k: Cont<'_>) -> Solve {
    type_test(e, args[0], k, Term::is_atomic)
}

fn is_compound(e: &mut Engine, args: &[Term], _: Barrier, k: Cont<'_>) -> Solve {
    type_test(e, args[0], k, Term::is_func)
}

fn is_callable(e: &mut Engine, args: &[Term], _: Barrier, k: Cont<'_>) -> Solve {
    type_test(e, args[0], k, Term::is_callable)
}

fn is_list(e: &mut Engine, args: &[Term], _: Barrier, k: Cont<'_>) -> Solve {
    let ok = e.env.list_items(&e.arena, args[0])?.is_some();
    succeed_if(e, ok, k)
}

/// `functor(Term, Name, Arity)`.
fn functor(e: &mut Engine, args: &[Term], _: Barrier, k: Cont<'_>) -> Solve {
    let t = e.env.resolve(args[0]);
    if !t.is_var() {
        let (name, arity) = match e.arena.view(&t)? {
            View::Func(_, functor, fargs) => (*functor, fargs.len()),
            _ => (t, 0),
        };
        let arity = Term::int(arity as i64);
        let mark = e.env.mark();
        let r = if e.unify(args[1], name)? && e.unify(args[2], arity)? {
            k(e)
        } else {
            Ok(Control::Next)
        };
        e.env.undo_to(mark);
        return r;
    }
    let name = e.env.resolve(args[1]);
    let arity = e.env.resolve(args[2]);
    if name.is_var() || arity.is_var() {
        return Err(e.instantiation_error());
    }
    let Some(n) = e.int_value(arity) else {
        return Err(e.type_error("integer", arity));
    };
    if n < 0 {
        return Err(e.domain_error("not_less_than_zero", arity));
    }
    if !name.is_atomic() {
        return Err(e.type_error("atomic", name));
    }
    if n == 0 {
        return e.unify_then(t, name, k);
    }
    if !name.is_atom() {
        return Err(e.type_error("atom", name));
    }
    let functor = e.arena.atom_name(&name)?.to_owned();
    let fresh: Vec<Term> = (0..n).map(|_| e.arena.fresh_var()).collect();
    let built = e.arena.func(&functor, &fresh);
    e.unify_then(t, built, k)
}

/// `arg(N, Term, Arg)`.
fn arg(e: &mut Engine, args: &[Term], _: Barrier, k: Cont<'_>) -> Solve {
    let n = e.env.resolve(args[0]);
    let t = e.env.resolve(args[1]);
    if n.is_var() || t.is_var() {
        return Err(e.instantiation_error());
    }
    let Some(n) = e.int_value(n) else {
        return Err(e.type_error("integer", n));
    };
    if !t.is_func() {
        return Err(e.type_error("compound", t));
    }
    if n < 0 {
        return Err(e.domain_error("not_less_than_zero", args[0]));
    }
    let fargs = e.args(t)?;
    match usize::try_from(n).ok().filter(|&i| i >= 1).and_then(|i| fargs.get(i - 1)) {
        Some(&a) => e.unify_then(args[2], a, k),
        None => Ok(Control::Next),
    }
}

/// `Term =.. List`.
fn univ(e: &mut Engine, args: &[Term], _: Barrier, k: Cont<'_>) -> Solve {
    let t = e.env.resolve(args[0]);
    if !t.is_var() {
        let list = match e.arena.view(&t)? {
            View::Func(_, functor, fargs) => {
                let mut items = Vec::with_capacity(fargs.len() + 1);
                items.push(*functor);
                items.extend_from_slice(fargs);
                items
            }
            _ => vec![t],
        };
        let list = e.arena.list(&list);
        return e.unify_then(args[1], list, k);
    }
    let items = e.list_items(args[1])?;
    let Some((&head, rest)) = items.split_first() else {
        return Err(e.domain_error("non_empty_list", Term::NIL));
    };
    let head = e.env.resolve(head);
    if head.is_var() {
        return Err(e.instantiation_error());
    }
    if rest.is_empty() {
        if !head.is_atomic() {
            return Err(e.type_error("atomic", head));
        }
        return e.unify_then(t, head, k);
    }
    if !head.is_atom() {
        return Err(e.type_error("atom", head));
    }
    let name = e.arena.atom_name(&head)?.to_owned();
    let built = e.arena.func(&name, rest);
    e.unify_then(t, built, k)
}

fn copy_term(e: &mut Engine, args: &[Term], _: Barrier, k: Cont<'_>) -> Solve {
    let copy = e.arena.copy_term(&e.env, args[0], &mut VarMap::new())?;
    e.unify_then(args[1], copy, k)
}

/// `char_code(Char, Code)`.
fn char_code(e: &mut Engine, args: &[Term], _: Barrier, k: Cont<'_>) -> Solve {
    let a = e.env.resolve(args[0]);
    if a.is_atom() {
        let name = e.arena.atom_name(&a)?;
        let mut chars = name.chars();
        let (Some(c), None) = (chars.next(), chars.next()) else {
            return Err(e.type_error("character", a));
        };
        let code = Term::int(c as i64);
        return e.unify_then(args[1], code, k);
    }
    if !a.is_var() {
        return Err(e.type_error("character", a));
    }
    let code = e.env.resolve(args[1]);
    if code.is_var() {
        return Err(e.instantiation_error());
    }
    let Some(n) = e.int_value(code) else {
        return Err(e.type_error("integer", code));
    };
    let Some(c) = u32::try_from(n).ok().and_then(char::from_u32) else {
        return Err(e.representation_error("character_code"));
    };
    let mut buf = [0u8; 4];
    let ch = e.arena.atom(c.encode_utf8(&mut buf));
    e.unify_then(a, ch, k)
}

fn repeat(e: &mut Engine, _: &[Term], _: Barrier, k: Cont<'_>) -> Solve {
    loop {
        match k(e)? {
            Control::Next => {}
            r => return Ok(r),
        }
    }
}

fn set_prolog_flag(e: &mut Engine, args: &[Term], _: Barrier, k: Cont<'_>) -> Solve {
    let flag = e.env.resolve(args[0]);
    let value = e.env.resolve(args[1]);
    if flag.is_var() || value.is_var() {
        return Err(e.instantiation_error());
    }
    let Some(name) = e.atom_name(flag) else {
        return Err(e.type_error("atom", flag));
    };
    if !EngineConfig::FLAGS.contains(&name.as_str()) {
        return Err(e.domain_error("prolog_flag", flag));
    }
    let Some(v) = e.atom_name(value) else {
        return Err(e.domain_error("flag_value", value));
    };
    if e.config.set_flag(&name, &v).is_err() {
        let culprit = e.arena.func("+", [flag, value]);
        return Err(e.domain_error("flag_value", culprit));
    }
    log::debug!("set_prolog_flag {name} = {v}");
    k(e)
}

fn current_prolog_flag(e: &mut Engine, args: &[Term], _: Barrier, k: Cont<'_>) -> Solve {
    let flag = e.env.resolve(args[0]);
    if !flag.is_var() && !flag.is_atom() {
        return Err(e.type_error("atom", flag));
    }
    for name in EngineConfig::FLAGS {
        let Some(value) = e.config.flag(name) else {
            continue;
        };
        let (name, value) = (e.arena.atom(name), e.arena.atom(value));
        let mark = e.env.mark();
        let r = if e.unify(flag, name)? && e.unify(args[1], value)? {
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

/// `op(Priority, Specifier, Operators)`.
fn op(e: &mut Engine, args: &[Term], _: Barrier, k: Cont<'_>) -> Solve {
    let prec = e.env.resolve(args[0]);
    let spec = e.env.resolve(args[1]);
    if prec.is_var() || spec.is_var() {
        return Err(e.instantiation_error());
    }
    let Some(p) = e.int_value(prec) else {
        return Err(e.type_error("integer", prec));
    };
    if !(0..=MAX_OPER_PREC).contains(&p) {
        return Err(e.domain_error("operator_priority", prec));
    }
    let Some(s) = e.atom_name(spec) else {
        return Err(e.type_error("atom", spec));
    };
    if OperDef::parse_specifier(&s).is_err() {
        return Err(e.domain_error("operator_specifier", spec));
    }
    let ops = e.env.resolve(args[2]);
    let names = if ops.is_atom() && ops != Term::NIL {
        vec![ops]
    } else {
        e.list_items(ops)?
    };
    for name in &names {
        let name = e.env.resolve(*name);
        if name.is_var() {
            return Err(e.instantiation_error());
        }
        let Some(n) = e.atom_name(name) else {
            return Err(e.type_error("atom", name));
        };
        if n == "," {
            return Err(e.permission_error("modify", "operator", name));
        }
        if e.arena.opers_mut().define(&n, p, &s).is_err() {
            return Err(e.permission_error("create", "operator", name));
        }
    }
    k(e)
}

#[cfg(test)]
mod tests {
    use crate::engine::tests::{engine, solutions, uncaught};
    use prolog_terms::{Term, func, list};

    #[test]
    fn unification_builtins() {
        let mut e = engine();
        let (x, y) = (e.arena.var("X"), e.arena.var("Y"));
        let goal = func!("="; func!("f"; x, "b"), func!("f"; "a", y) => &mut e.arena);
        assert_eq!(solutions(&mut e, goal, &[x, y]), ["a b"]);
        let goal = func!("\\="; 1, 1.0 => &mut e.arena);
        assert_eq!(solutions(&mut e, goal, &[]), [""]);
        let goal = func!("\\="; x, "a" => &mut e.arena);
        assert!(solutions(&mut e, goal, &[]).is_empty());
        // Occurs check.
        let fx = func!("f"; x => &mut e.arena);
        let goal = func!("unify_with_occurs_check"; x, fx => &mut e.arena);
        assert!(solutions(&mut e, goal, &[]).is_empty());
        let goal = func!("unify_with_occurs_check"; x, func!("f"; y) => &mut e.arena);
        assert_eq!(solutions(&mut e, goal, &[x]), ["f(Y)"]);
    }

    #[test]
    fn comparison() {
        let mut e = engine();
        let (x, o) = (e.arena.var("X"), e.arena.var("O"));
        for (a, b, expected) in [
            (Term::int(1), Term::int(2), "<"),
            (Term::real(1.0), Term::int(1), "<"),
            (x, Term::int(1), "<"),
            (Term::int(3), Term::NIL, "<"),
        ] {
            let goal = func!("compare"; o, a, b => &mut e.arena);
            assert_eq!(solutions(&mut e, goal, &[o]), [expected]);
        }
        let goal = func!("compare"; o, func!("f"; "b"), func!("f"; "a") => &mut e.arena);
        assert_eq!(solutions(&mut e, goal, &[o]), [">"]);
        let goal = func!("compare"; "=", func!("g"; x), func!("g"; x) => &mut e.arena);
        assert_eq!(solutions(&mut e, goal, &[]), [""]);
        let goal = func!("compare"; 1, "a", "b" => &mut e.arena);
        assert!(uncaught(&mut e, goal).starts_with("error(type_error(atom, 1)"));
        let goal = func!("compare"; "foo", "a", "b" => &mut e.arena);
        assert!(uncaught(&mut e, goal).starts_with("error(domain_error(order, foo)"));
        let goal = func!("@<"; "abc", "abd" => &mut e.arena);
        assert_eq!(solutions(&mut e, goal, &[]), [""]);
        let goal = func!("=="; x, x => &mut e.arena);
        assert_eq!(solutions(&mut e, goal, &[]), [""]);
        let goal = func!("\\=="; x, o => &mut e.arena);
        assert_eq!(solutions(&mut e, goal, &[]), [""]);
    }

    #[test]
    fn type_tests() {
        let mut e = engine();
        let x = e.arena.var("X");
        let l = list![1, 2 => &mut e.arena];
        let partial = list![1; x => &mut e.arena];
        let cases = [
            ("var", x, true),
            ("nonvar", x, false),
            ("atom", Term::NIL, true),
            ("atom", Term::int(1), false),
            ("number", Term::real(1.5), true),
            ("integer", Term::real(1.5), false),
            ("float", Term::real(1.5), true),
            ("atomic", Term::int(1), true),
            ("compound", l, true),
            ("callable", Term::int(1), false),
            ("is_list", l, true),
            ("is_list", partial, false),
        ];
        for (test, arg, expected) in cases {
            let goal = e.arena.func(test, [arg]);
            assert_eq!(!solutions(&mut e, goal, &[]).is_empty(), expected, "{test}");
        }
    }

    #[test]
    fn functor_and_arg() {
        let mut e = engine();
        let (n, a, t) = (e.arena.var("N"), e.arena.var("A"), e.arena.var("T"));
        let goal = func!("functor"; func!("foo"; 1, 2), n, a => &mut e.arena);
        assert_eq!(solutions(&mut e, goal, &[n, a]), ["foo 2"]);
        let goal = func!("functor"; "atom", n, a => &mut e.arena);
        assert_eq!(solutions(&mut e, goal, &[n, a]), ["atom 0"]);
        let goal = func!("functor"; t, "bar", 2 => &mut e.arena);
        let shown = solutions(&mut e, goal, &[t]);
        assert!(shown[0].starts_with("bar(_G"), "{shown:?}");
        let goal = func!("functor"; t, 7, 0 => &mut e.arena);
        assert_eq!(solutions(&mut e, goal, &[t]), ["7"]);
        let goal = func!("functor"; t, n, 2 => &mut e.arena);
        assert!(uncaught(&mut e, goal).starts_with("error(instantiation_error"));
        let goal = func!("functor"; t, func!("f"; 1), 1 => &mut e.arena);
        assert!(uncaught(&mut e, goal).starts_with("error(type_error(atomic, f(1))"));

        let goal = func!("arg"; 2, func!("foo"; "a", "b"), a => &mut e.arena);
        assert_eq!(solutions(&mut e, goal, &[a]), ["b"]);
        let goal = func!("arg"; 3, func!("foo"; "a", "b"), a => &mut e.arena);
        assert!(solutions(&mut e, goal, &[a]).is_empty());
        let goal = func!("arg"; 1, "foo", a => &mut e.arena);
        assert!(uncaught(&mut e, goal).starts_with("error(type_error(compound, foo)"));
    }

    #[test]
    fn univ() {
        let mut e = engine();
        let (l, t) = (e.arena.var("L"), e.arena.var("T"));
        let goal = func!("=.."; func!("foo"; 1, "b"), l => &mut e.arena);
        assert_eq!(solutions(&mut e, goal, &[l]), ["[foo, 1, b]"]);
        let goal = func!("=.."; 5, l => &mut e.arena);
        assert_eq!(solutions(&mut e, goal, &[l]), ["[5]"]);
        let goal = func!("=.."; t, list!["bar", 1] => &mut e.arena);
        assert_eq!(solutions(&mut e, goal, &[t]), ["bar(1)"]);
        let goal = func!("=.."; t, Term::NIL => &mut e.arena);
        assert!(uncaught(&mut e, goal).starts_with("error(domain_error(non_empty_list, [])"));
        let goal = func!("=.."; t, list![1, 2] => &mut e.arena);
        assert!(uncaught(&mut e, goal).starts_with("error(type_error(atom, 1)"));
    }

    #[test]
    fn copy_term_renames() {
        let mut e = engine();
        let (x, y, c) = (e.arena.var("X"), e.arena.var("Y"), e.arena.var("C"));
        let goal = func!(","; func!("="; y, 1), func!("copy_term"; func!("f"; x, y, x), c) => &mut e.arena);
        let shown = solutions(&mut e, goal, &[c]);
        let s = &shown[0];
        assert!(s.starts_with("f(_G") && s.contains(", 1, _G"), "{s}");
        let first = &s[2..s.find(',').unwrap_or(0)];
        assert!(s.ends_with(&format!("{first})")));
    }

    #[test]
    fn char_code() {
        let mut e = engine();
        let (c, x) = (e.arena.var("C"), e.arena.var("X"));
        let goal = func!("char_code"; "a", c => &mut e.arena);
        assert_eq!(solutions(&mut e, goal, &[c]), ["97"]);
        let goal = func!("char_code"; x, 0x2200 => &mut e.arena);
        assert_eq!(solutions(&mut e, goal, &[x]), ["'∀'"]);
        let goal = func!("char_code"; x, c => &mut e.arena);
        assert!(uncaught(&mut e, goal).starts_with("error(instantiation_error"));
        let goal = func!("char_code"; "ab", c => &mut e.arena);
        assert!(uncaught(&mut e, goal).starts_with("error(type_error(character, ab)"));
        let goal = func!("char_code"; x, "x" => &mut e.arena);
        assert!(uncaught(&mut e, goal).starts_with("error(type_error(integer, x)"));
        let goal = func!("char_code"; x, -1 => &mut e.arena);
        assert!(uncaught(&mut e, goal).starts_with("error(representation_error(character_code)"));
    }

    #[test]
    fn repeat_until_stopped() {
        let mut e = engine();
        let goal = e.arena.atom("repeat");
        let mut n = 0;
        let stopped = e
            .query(goal, |_| {
                n += 1;
                n == 5
            })
            .unwrap();
        assert!(stopped);
        assert_eq!(n, 5);
    }

    #[test]
    fn flags() {
        let mut e = engine();
        let (f, v) = (e.arena.var("F"), e.arena.var("V"));
        let goal = func!("current_prolog_flag"; f, v => &mut e.arena);
        assert_eq!(
            solutions(&mut e, goal, &[f, v]),
            ["unknown error", "occurs_check false"]
        );
        let goal = func!("set_prolog_flag"; "occurs_check", "true" => &mut e.arena);
        assert_eq!(solutions(&mut e, goal, &[]), [""]);
        assert!(e.config.occurs_check);
        let fx = func!("f"; f => &mut e.arena);
        let goal = func!("="; f, fx => &mut e.arena);
        assert!(solutions(&mut e, goal, &[]).is_empty());
        let goal = func!("set_prolog_flag"; "bounded", "true" => &mut e.arena);
        assert!(uncaught(&mut e, goal).starts_with("error(domain_error(prolog_flag, bounded)"));
        let goal = func!("set_prolog_flag"; "unknown", "maybe" => &mut e.arena);
        assert!(uncaught(&mut e, goal).starts_with("error(domain_error(flag_value, unknown+maybe)"));
    }

    #[test]
    fn op_defines_operators() {
        let mut e = engine();
        let goal = func!("op"; 700, "xfx", list!["===>", "<==="] => &mut e.arena);
        assert_eq!(solutions(&mut e, goal, &[]), [""]);
        let t = func!("===>"; "a", "b" => &mut e.arena);
        assert_eq!(e.display(t).to_string(), "a===>b");
        let goal = func!("op"; 1201, "xfx", "foo" => &mut e.arena);
        assert!(uncaught(&mut e, goal).starts_with("error(domain_error(operator_priority, 1201)"));
        let goal = func!("op"; 700, "abc", "foo" => &mut e.arena);
        assert!(uncaught(&mut e, goal).starts_with("error(domain_error(operator_specifier, abc)"));
        let goal = func!("op"; 1000, "xfy", "," => &mut e.arena);
        assert!(uncaught(&mut e, goal).starts_with("error(permission_error(modify, operator, "));
    }
}
