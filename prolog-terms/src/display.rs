//! Defines [`TermDisplay`], a formatter for rendering [`Term`] values.
//!
//! Terms are written in canonical form (`f(a, b)`, `[a, b | T]`) unless an
//! operator table is supplied through [`WriteOptions`], in which case
//! operator compounds are written in prefix, infix or postfix form with
//! parentheses only where precedence requires them.

use crate::{Arena, Env, Fixity, OperDef, OperDefs, Term, View};
use std::fmt::{self, Write};

/// Options for [`TermDisplay`], mirroring the `write_term/2` options.
#[derive(Debug, Clone, Copy)]
pub struct WriteOptions<'a> {
    /// Quote atoms that would not read back as the same atom.
    pub quoted: bool,
    /// Write every compound in canonical form.
    pub ignore_ops: bool,
    /// Write `'$VAR'(N)` as a variable name (`A`, `B`, …, `Z`, `A1`, …).
    pub number_vars: bool,
    /// Operator table used unless `ignore_ops` is set.
    pub ops: Option<&'a OperDefs>,
}

impl Default for WriteOptions<'_> {
    fn default() -> Self {
        Self {
            quoted: true,
            ignore_ops: true,
            number_vars: false,
            ops: None,
        }
    }
}

/// A wrapper that ties together a [`Term`], its [`Arena`] and optionally an
/// [`Env`] whose bindings are substituted while writing.
///
/// ### Example
/// ```rust
/// use prolog_terms::{Arena, func};
/// let mut arena = Arena::new();
/// let term = func!("foo"; 1, "hello, world!" => &mut arena);
/// assert_eq!(term.display(&arena).to_string(), "foo(1, 'hello, world!')");
/// ```
///
/// Construct instances via [`Term::display`] or [`Arena::display`].
pub struct TermDisplay<'a> {
    term: Term,
    arena: &'a Arena,
    env: Option<&'a Env>,
    opts: WriteOptions<'a>,
}

impl Term {
    /// Return a [`TermDisplay`] writing this term quoted and in canonical form.
    #[inline]
    pub fn display<'a>(&self, arena: &'a Arena) -> TermDisplay<'a> {
        TermDisplay {
            term: *self,
            arena,
            env: None,
            opts: WriteOptions::default(),
        }
    }
}

impl Arena {
    /// Return a [`TermDisplay`] for `term`.  See [`Term::display`].
    #[inline]
    pub fn display<'a>(&'a self, term: &Term) -> TermDisplay<'a> {
        term.display(self)
    }
}

impl<'a> TermDisplay<'a> {
    /// Substitute the bindings of `env` while writing.
    pub fn env(mut self, env: &'a Env) -> Self {
        self.env = Some(env);
        self
    }

    /// Replace the write options.
    pub fn options(mut self, opts: WriteOptions<'a>) -> Self {
        self.opts = opts;
        self
    }
}

impl fmt::Display for TermDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = String::new();
        let writer = Writer {
            arena: self.arena,
            env: self.env,
            opts: &self.opts,
        };
        writer.write(&mut out, self.term, 1200)?;
        f.write_str(&out)
    }
}

const SYMBOL_CHARS: &str = "+-*/\\^<>=~:.?@#&$";

fn is_symbol_char(c: char) -> bool {
    SYMBOL_CHARS.contains(c)
}

fn is_unquoted_atom(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_lowercase() => chars.all(|c| c.is_ascii_alphanumeric() || c == '_'),
        Some(_) if s.chars().all(is_symbol_char) => true,
        _ => matches!(s, "[]" | "!" | ";" | "{}"),
    }
}

fn is_alpha_atom(s: &str) -> bool {
    s.chars().next().is_some_and(|c| c.is_alphanumeric() || c == '_')
}

fn write_atom_str(out: &mut String, s: &str, quoted: bool) -> fmt::Result {
    if !quoted || is_unquoted_atom(s) {
        return out.write_str(s);
    }
    out.push('\'');
    for ch in s.chars() {
        match ch {
            '\'' => out.push_str("\\'"),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            c => out.push(c),
        }
    }
    out.push('\'');
    Ok(())
}

/// Appends `piece`, separated by a space when gluing it to the end of
/// `out` would change how the text reads.
fn append_operand(out: &mut String, piece: &str) {
    let glue = match (out.chars().last(), piece.chars().next()) {
        (Some(a), Some(b)) => {
            (is_symbol_char(a) && is_symbol_char(b))
                || (a.is_alphanumeric() && (b.is_alphanumeric() || b == '_'))
        }
        _ => false,
    };
    if glue {
        out.push(' ');
    }
    out.push_str(piece);
}

struct Writer<'a> {
    arena: &'a Arena,
    env: Option<&'a Env>,
    opts: &'a WriteOptions<'a>,
}

impl Writer<'_> {
    fn ops(&self) -> Option<&OperDefs> {
        if self.opts.ignore_ops {
            None
        } else {
            self.opts.ops
        }
    }

    fn resolve(&self, t: Term) -> Term {
        match self.env {
            Some(env) => env.resolve(t),
            None => t,
        }
    }

    fn render(&self, term: Term, prec: i64) -> Result<String, fmt::Error> {
        let mut s = String::new();
        self.write(&mut s, term, prec)?;
        Ok(s)
    }

    fn write(&self, out: &mut String, term: Term, prec: i64) -> fmt::Result {
        let term = self.resolve(term);
        match term.view(self.arena).map_err(|_| fmt::Error)? {
            View::Int(i) => write!(out, "{i}"),
            View::Real(r) => {
                if r.is_finite() && r.fract() == 0.0 {
                    write!(out, "{:.1}", r)
                } else {
                    write!(out, "{}", r)
                }
            }
            View::Var(id) => match self.arena.var_id_name(id) {
                Ok(Some(name)) => out.write_str(name),
                _ => write!(out, "_G{}", id.index()),
            },
            View::Atom(name) => {
                let bracket = self
                    .ops()
                    .and_then(|ops| ops.get(name))
                    .is_some_and(|tab| tab.iter().any(|d| d.prec > prec));
                if bracket {
                    out.push('(');
                }
                write_atom_str(out, name, self.opts.quoted)?;
                if bracket {
                    out.push(')');
                }
                Ok(())
            }
            View::Func(ar, functor, args) => {
                let name = ar.atom_name(functor).map_err(|_| fmt::Error)?;
                match (name, args) {
                    (".", [_, _]) => return self.write_list(out, term),
                    ("{}", [arg]) if self.ops().is_some() => {
                        out.push('{');
                        self.write(out, *arg, 1200)?;
                        out.push('}');
                        return Ok(());
                    }
                    ("$VAR", [n]) if self.opts.number_vars => {
                        if let View::Int(n) = self.resolve(*n).view(ar).map_err(|_| fmt::Error)? {
                            if n >= 0 {
                                out.push((b'A' + (n % 26) as u8) as char);
                                if n >= 26 {
                                    write!(out, "{}", n / 26)?;
                                }
                                return Ok(());
                            }
                        }
                    }
                    _ => {}
                }
                if let Some(ops) = self.ops() {
                    let fixity = match args.len() {
                        2 => Some(Fixity::Infix),
                        1 if ops.lookup(name, Fixity::Prefix).is_some() => Some(Fixity::Prefix),
                        1 => Some(Fixity::Postfix),
                        _ => None,
                    };
                    if let Some(def) = fixity.and_then(|fx| ops.lookup(name, fx)) {
                        return self.write_op(out, name, def, args, prec);
                    }
                }
                write_atom_str(out, name, self.opts.quoted)?;
                out.push('(');
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        out.push_str(", ");
                    }
                    self.write(out, *arg, 999)?;
                }
                out.push(')');
                Ok(())
            }
        }
    }

    fn write_op(
        &self,
        out: &mut String,
        name: &str,
        def: &OperDef,
        args: &[Term],
        prec: i64,
    ) -> fmt::Result {
        let open = def.prec > prec;
        let (lp, rp) = def.arg_precs();
        let mut s = String::new();
        if open {
            s.push('(');
        }
        let mut op = String::new();
        write_atom_str(&mut op, name, self.opts.quoted)?;
        match (def.fixity, args) {
            (Fixity::Infix, [left, right]) => {
                s.push_str(&self.render(*left, lp)?);
                if name == "," {
                    s.push_str(", ");
                } else if is_alpha_atom(name) {
                    s.push(' ');
                    s.push_str(&op);
                    s.push(' ');
                } else {
                    append_operand(&mut s, &op);
                }
                append_operand(&mut s, &self.render(*right, rp)?);
            }
            (Fixity::Prefix, [arg]) => {
                s.push_str(&op);
                let arg = self.render(*arg, rp)?;
                let number = self.resolve(args[0]).is_number();
                if is_alpha_atom(name) || number || arg.starts_with('(') {
                    s.push(' ');
                }
                append_operand(&mut s, &arg);
            }
            (Fixity::Postfix, [arg]) => {
                s.push_str(&self.render(*arg, lp)?);
                append_operand(&mut s, &op);
            }
            _ => return Err(fmt::Error),
        }
        if open {
            s.push(')');
        }
        out.push_str(&s);
        Ok(())
    }

    fn write_list(&self, out: &mut String, term: Term) -> fmt::Result {
        out.push('[');
        let mut term = term;
        let mut first = true;
        loop {
            let (_, [head, tail]) = self
                .arena
                .unpack_func(&term, &["."])
                .map_err(|_| fmt::Error)?;
            if !first {
                out.push_str(", ");
            }
            first = false;
            self.write(out, head, 999)?;
            let tail = self.resolve(tail);
            let name = match tail.view(self.arena).map_err(|_| fmt::Error)? {
                View::Atom(name) => Some(name),
                View::Func(ar, functor, args) if args.len() == 2 => {
                    Some(ar.atom_name(functor).map_err(|_| fmt::Error)?)
                }
                _ => None,
            };
            if tail.is_func() && name == Some(".") {
                term = tail;
                continue;
            }
            if name != Some("[]") || tail.is_func() {
                out.push_str(" | ");
                self.write(out, tail, 999)?;
            }
            break;
        }
        out.push(']');
        Ok(())
    }
}
