//! Defines the core [`Term`] type and related constructors.
//!
//! Provides a compact representation for Prolog terms
//! and basic utilities for creating and inspecting them.

use crate::{Arena, EpochID, TermError};
use core::fmt;
use smartstring::alias::String;
use std::borrow::Cow;

// The following type definitions describe the internal representation
// of a term.  Rather than packing data into a single integer we use
// a tagged enum to store the various kinds of terms.  Numbers and short
// atoms are carried inline; long atom names and the argument vectors of
// compound terms live in an arena and are referenced by index and length.
// Variables carry only their identity; what they are bound to lives in an
// `Env`, never in the term.

#[derive(Debug, Copy, Clone, PartialEq, PartialOrd)]
pub(crate) struct TinyArray {
    pub(crate) bytes: [u8; 14],
    pub(crate) len: u8,
}

#[derive(Debug, Copy, Clone, PartialEq, PartialOrd)]
pub(crate) struct Slice {
    pub(crate) epoch_id: EpochID,
    pub(crate) index: u32,
    pub(crate) len: u32,
}

/// Identity of a logic variable.
///
/// Ids are handed out by [`Arena::var`] and [`Arena::fresh_var`] in
/// creation order, which is also the order the standard order of terms
/// uses for unbound variables.  The display name of a variable is kept in
/// the arena and plays no part in identity.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct VarId(pub(crate) u32);

impl VarId {
    /// Position of this variable in its arena's variable table.
    #[inline]
    pub fn index(self) -> u32 {
        self.0
    }
}

/// Internal handle describing the kind of a term and storing its data.
///
/// Each variant stores the associated value directly.  The `repr(u8)`
/// attribute ensures the discriminant occupies a single byte, which
/// together with the payloads yields a `Term` size of 16 bytes on
/// 64‑bit targets.
#[derive(Debug, Copy, Clone, PartialEq, PartialOrd)]
#[repr(u8)]
pub(crate) enum Handle {
    Int(i64),
    Real(f64),
    Var(VarId),
    Atom(TinyArray),
    AtomRef(Slice),
    FuncRef(Slice),
}

/// A compact, copyable handle referencing a term stored in an [`Arena`].
///
/// Internally a `Term` stores a single [`Handle`] enum variant.
/// On 64‑bit targets the discriminant and associated payload occupy
/// 16 bytes in total.  Users should never construct `Term` values
/// directly; instead use the associated constructors or the
/// convenience macros [`func!`], [`list!`], [`atom!`] and [`var!`].
///
/// The derived `PartialEq` compares handles, not values: two atoms with
/// the same long name interned twice are different handles.  Use
/// [`Env::compare`](crate::Env::compare) for term equality.
#[derive(Copy, Clone, PartialEq, PartialOrd)]
pub struct Term(pub(crate) Handle);

impl AsRef<Term> for Term {
    fn as_ref(&self) -> &Self {
        self
    }
}

macro_rules! impl_from_integers_for_term {
    ($($t:ty),* $(,)?) => {$(
        impl From<$t> for Term {
            #[inline]
            fn from(v: $t) -> Self { Term::int(v as i64) }
        }
    )*};
}
impl_from_integers_for_term!(i8, i16, i32, i64, u8, u16, u32);

macro_rules! impl_from_floats_for_term {
    ($($t:ty),* $(,)?) => {$(
        impl From<$t> for Term {
            #[inline]
            fn from(v: $t) -> Self { Term::real(v as f64) }
        }
    )*};
}
impl_from_floats_for_term!(f32, f64);

/// Conversion of host values into terms allocated in an [`Arena`].
///
/// Strings become atoms, integers and floats become numbers, and closures
/// of the form `FnOnce(&mut Arena) -> Term` (what the construction macros
/// expand to) are simply invoked.
pub trait IntoTerm {
    fn into_term(self, arena: &mut Arena) -> Term;
}

macro_rules! impl_intoterm_for_integers {
    ($($t:ty),* $(,)?) => {$(
        impl IntoTerm for $t {
            #[inline]
            fn into_term(self, _arena: &mut Arena) -> Term { Term::int(self as i64) }
        }
    )*};
}
impl_intoterm_for_integers!(i8, i16, i32, i64, u8, u16, u32);

macro_rules! impl_intoterm_for_floats {
    ($($t:ty),* $(,)?) => {$(
        impl IntoTerm for $t {
            #[inline]
            fn into_term(self, _arena: &mut Arena) -> Term { Term::real(self as f64) }
        }
    )*};
}
impl_intoterm_for_floats!(f32, f64);

impl<'a> IntoTerm for &'a str {
    #[inline]
    fn into_term(self, arena: &mut Arena) -> Term {
        Term::atom(arena, self)
    }
}

impl<'a> IntoTerm for Cow<'a, str> {
    #[inline]
    fn into_term(self, arena: &mut Arena) -> Term {
        Term::atom(arena, self)
    }
}

impl IntoTerm for String {
    #[inline]
    fn into_term(self, arena: &mut Arena) -> Term {
        Term::atom(arena, &self)
    }
}

impl IntoTerm for std::string::String {
    #[inline]
    fn into_term(self, arena: &mut Arena) -> Term {
        Term::atom(arena, &self)
    }
}

impl IntoTerm for Term {
    #[inline]
    fn into_term(self, _arena: &mut Arena) -> Term {
        self
    }
}

impl IntoTerm for &Term {
    #[inline]
    fn into_term(self, _arena: &mut Arena) -> Term {
        *self
    }
}

impl<F> IntoTerm for F
where
    F: FnOnce(&mut Arena) -> Term,
{
    #[inline]
    fn into_term(self, arena: &mut Arena) -> Term {
        self(arena)
    }
}

/// Builds the inline handle for a short atom name.  Used by the
/// `const` atoms below, so it must stay `const fn`.
const fn tiny_atom(name: &str) -> Term {
    let src = name.as_bytes();
    let mut bytes = [0u8; 14];
    let mut i = 0;
    while i < src.len() {
        bytes[i] = src[i];
        i += 1;
    }
    Term(Handle::Atom(TinyArray {
        bytes,
        len: src.len() as u8,
    }))
}

impl Term {
    /// Construct a new integer term.  The full 64 bit two's complement
    /// representation of `i` is stored in the payload.
    #[inline]
    pub fn int(i: impl Into<i64>) -> Self {
        Self(Handle::Int(i.into()))
    }

    /// Construct a new floating point term.  The full 64 bit IEEE‑754
    /// bit pattern is stored in the payload without truncation.
    #[inline]
    pub fn real(f: impl Into<f64>) -> Self {
        Self(Handle::Real(f.into()))
    }

    /// Construct or intern an atom into the arena and produce a term
    /// referencing it.  Small atom names (≤14 bytes of UTF‑8) are
    /// inlined directly into the handle; longer names are interned
    /// into the arena and referenced by index and length.
    #[inline]
    pub fn atom(arena: &mut Arena, name: impl AsRef<str>) -> Self {
        let name = name.as_ref();
        if name.len() <= 14 {
            let mut buf = [0u8; 14];
            buf[..name.len()].copy_from_slice(name.as_bytes());
            Self(Handle::Atom(TinyArray {
                bytes: buf,
                len: name.len() as u8,
            }))
        } else {
            Self(Handle::AtomRef(arena.intern_str(name)))
        }
    }

    /// Allocate a new named variable.  Every call yields a distinct
    /// variable, even when the name repeats.
    #[inline]
    pub fn var(arena: &mut Arena, name: impl AsRef<str>) -> Self {
        arena.var(name)
    }

    /// Construct a new compound term by interning the functor and
    /// arguments in the arena.  The returned term references a slice
    /// in the arena's term storage consisting of the functor atom as
    /// the first entry followed by the argument handles.  A functor of
    /// arity zero results in an atom.
    #[inline]
    pub fn func(
        arena: &mut Arena,
        functor: impl AsRef<str>,
        args: impl IntoIterator<Item = impl IntoTerm>,
    ) -> Self {
        let functor_atom = Self::atom(arena, functor);
        // Arguments may themselves allocate; finish them before the
        // functor slice is laid out.
        let args: Vec<Term> = args.into_iter().map(|a| a.into_term(arena)).collect();
        if args.is_empty() {
            return functor_atom;
        }
        Self(Handle::FuncRef(arena.intern_func(functor_atom, &args)))
    }

    /// Construct a new compound term from a sequence of terms (functor
    /// first, then arguments).  A functor with no arguments yields the
    /// atom itself.  Errors if no functor is provided or if the first
    /// term is not an atom.
    #[inline]
    pub fn funcv(
        arena: &mut Arena,
        terms: impl IntoIterator<Item = impl IntoTerm>,
    ) -> Result<Self, TermError> {
        let mut terms = terms.into_iter();
        let Some(functor_atom) = terms.next() else {
            return Err(TermError::MissingFunctor);
        };
        let functor_atom = functor_atom.into_term(arena);
        if !functor_atom.is_atom() {
            return Err(TermError::InvalidFunctor(functor_atom));
        }
        let args: Vec<Term> = terms.map(|a| a.into_term(arena)).collect();
        if args.is_empty() {
            return Ok(functor_atom);
        }
        Ok(Self(Handle::FuncRef(arena.intern_func(functor_atom, &args))))
    }

    /// Constructs a proper list out of `'.'/2` cells ending in `[]`.
    /// If `terms` is empty, returns `[]`.
    #[inline]
    pub fn list(arena: &mut Arena, terms: impl IntoIterator<Item = impl IntoTerm>) -> Self {
        Self::listc(arena, terms, Self::NIL)
    }

    /// Constructs a list of `terms` whose last cell points at `tail`
    /// instead of `[]`.  If `terms` is empty, returns `tail`.
    #[inline]
    pub fn listc(
        arena: &mut Arena,
        terms: impl IntoIterator<Item = impl IntoTerm>,
        tail: impl IntoTerm,
    ) -> Self {
        let items: Vec<Term> = terms.into_iter().map(|a| a.into_term(arena)).collect();
        let mut list = tail.into_term(arena);
        for item in items.into_iter().rev() {
            list = Self(Handle::FuncRef(arena.intern_func(Self::CONS, &[item, list])));
        }
        list
    }

    /// The empty list `[]`.  Inline; does not depend on any arena.
    pub const NIL: Self = tiny_atom("[]");

    /// The list constructor functor `'.'`.
    pub const CONS: Self = tiny_atom(".");

    /// The atom `true`, the body of every fact.
    pub const TRUE: Self = tiny_atom("true");

    /// Returns the value if `term` is an integer, otherwise an error.
    #[inline]
    pub fn unpack_int(&self, arena: &Arena) -> Result<i64, TermError> {
        arena.unpack_int(self)
    }

    /// Returns the value if `term` is a real, otherwise an error.
    #[inline]
    pub fn unpack_real(&self, arena: &Arena) -> Result<f64, TermError> {
        arena.unpack_real(self)
    }

    /// Returns the name if `term` is an atom, otherwise an error.
    #[inline]
    pub fn unpack_atom<'a>(
        &'a self,
        arena: &'a Arena,
        allowed_names: &[&str],
    ) -> Result<&'a str, TermError> {
        arena.unpack_atom(self, allowed_names)
    }

    /// Returns the identity if `term` is a variable, otherwise an error.
    #[inline]
    pub fn unpack_var(&self, arena: &Arena) -> Result<VarId, TermError> {
        arena.unpack_var(self)
    }

    /// Returns the functor and arguments if `term` is a compound term of any arity
    /// or an atom and its name is in `allowed_names` (or if `allowed_names` is empty),
    /// otherwise returns an error.
    #[inline]
    pub fn unpack_func_any<'a>(
        &'a self,
        arena: &'a Arena,
        allowed_names: &[&str],
    ) -> Result<(&'a Term, &'a [Term]), TermError> {
        arena.unpack_func_any(self, allowed_names)
    }

    /// Returns the functor and arguments if `term` is a compound term of arity `ARITY`
    /// (or an atom if `ARITY == 0`) and its name is in `allowed_names` (or if
    /// `allowed_names` is empty), otherwise returns an error.
    #[inline]
    pub fn unpack_func<'a, const ARITY: usize>(
        &'a self,
        arena: &'a Arena,
        allowed_names: &[&str],
    ) -> Result<(&'a Term, [Term; ARITY]), TermError> {
        arena.unpack_func(self, allowed_names)
    }

    /// Returns `true` if the value fits directly in `Term` without arena storage.
    #[inline]
    pub fn is_inline(&self) -> bool {
        match &self.0 {
            Handle::Int(_) | Handle::Real(_) | Handle::Atom(_) | Handle::Var(_) => true,
            Handle::AtomRef(_) | Handle::FuncRef(_) => false,
        }
    }

    /// Returns `true` if the term is a compound term.
    #[inline]
    pub fn is_func(&self) -> bool {
        matches!(self.0, Handle::FuncRef(_))
    }

    /// Returns `true` if the term is an integer.
    #[inline]
    pub fn is_int(&self) -> bool {
        matches!(self.0, Handle::Int(_))
    }

    /// Returns `true` if the term is a real (floating-point) number.
    #[inline]
    pub fn is_real(&self) -> bool {
        matches!(self.0, Handle::Real(_))
    }

    /// Returns `true` if the term is an atom.
    #[inline]
    pub fn is_atom(&self) -> bool {
        matches!(self.0, Handle::Atom(_) | Handle::AtomRef(_))
    }

    /// Returns `true` if the term is a variable.  This says nothing about
    /// whether the variable is bound in some environment.
    #[inline]
    pub fn is_var(&self) -> bool {
        matches!(self.0, Handle::Var(_))
    }

    /// Returns `true` if the term is a number (`int` or `real`).
    #[inline]
    pub fn is_number(&self) -> bool {
        matches!(self.0, Handle::Int(_) | Handle::Real(_))
    }

    /// Returns `true` for atoms and numbers.
    #[inline]
    pub fn is_atomic(&self) -> bool {
        !matches!(self.0, Handle::Var(_) | Handle::FuncRef(_))
    }

    /// Returns `true` for atoms and compound terms, i.e. anything that
    /// can be called as a goal.
    #[inline]
    pub fn is_callable(&self) -> bool {
        matches!(
            self.0,
            Handle::Atom(_) | Handle::AtomRef(_) | Handle::FuncRef(_)
        )
    }

    /// Returns the variable identity, if this is a variable.
    #[inline]
    pub fn var_id(&self) -> Option<VarId> {
        match self.0 {
            Handle::Var(id) => Some(id),
            _ => None,
        }
    }

    /// Returns the arity of the term; zero for everything but compounds.
    #[inline]
    pub fn arity(&self) -> usize {
        match &self.0 {
            Handle::FuncRef(Slice { len: n, .. }) => (n - 1) as usize,
            Handle::Int(_)
            | Handle::Real(_)
            | Handle::Var(_)
            | Handle::Atom(_)
            | Handle::AtomRef(_) => 0,
        }
    }

    /// Returns the name of a compound term or atom.
    /// Use [`atom_name`](Self::atom_name) or [`func_name`](Self::func_name)
    /// to ensure the term is of a specific kind.
    #[inline]
    pub fn name<'a>(&'a self, arena: &'a Arena) -> Result<&'a str, TermError> {
        arena.name(self)
    }

    /// Returns the name of an atom.
    #[inline]
    pub fn atom_name<'a>(&'a self, arena: &'a Arena) -> Result<&'a str, TermError> {
        arena.unpack_atom(self, &[])
    }

    /// Returns the name of a compound term.
    #[inline]
    pub fn func_name<'a>(&'a self, arena: &'a Arena) -> Result<&'a str, TermError> {
        let (functor, _) = arena.unpack_func_any(self, &[])?;
        arena.atom_name(functor)
    }

    /// Returns a string describing the kind of this term.
    #[inline]
    pub fn kind_name(&self) -> &'static str {
        match &self.0 {
            Handle::Int(_) => "int",
            Handle::Real(_) => "real",
            Handle::Var(_) => "var",
            Handle::Atom(_) | Handle::AtomRef(_) => "atom",
            Handle::FuncRef(_) => "func",
        }
    }
}

/// Implements the standard [`Debug`] formatter for [`Term`].
///
/// This prints a developer-friendly representation of the handle.
/// The output is not guaranteed to be stable across versions and
/// should not be parsed; it is intended purely for diagnostics
/// and logging.
///
/// # Example
/// ```rust
/// # use prolog_terms::Term;
/// let t = Term::int(42);
/// assert_eq!(format!("{:?}", t), "Int(42)");
/// ```
impl fmt::Debug for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0 {
            Handle::Int(i) => f.debug_tuple("Int").field(i).finish(),
            Handle::Real(r) => f.debug_tuple("Real").field(r).finish(),
            Handle::Var(v) => f.debug_tuple("Var").field(&v.0).finish(),
            Handle::Atom(a) => {
                let name =
                    core::str::from_utf8(&a.bytes[..a.len as usize]).unwrap_or("<invalid utf8>");
                f.debug_struct("Atom").field("name", &name).finish()
            }
            Handle::AtomRef(v) => f
                .debug_struct("AtomRef")
                .field("epoch_id", &v.epoch_id)
                .field("index", &v.index)
                .field("len", &v.len)
                .finish(),
            Handle::FuncRef(v) => f
                .debug_struct("Func")
                .field("epoch_id", &v.epoch_id)
                .field("index", &v.index)
                .field("len", &v.len)
                .finish(),
        }
    }
}

/// Convenience macros to construct compound terms, lists, atoms and
/// variables.  Each macro either takes an explicit arena after `=>`, or
/// expands to a closure that implements [`IntoTerm`] so it can be nested.
#[macro_export]
macro_rules! list {
    // with tail, explicit arena
    ($($arg:expr),* $(,)?; $tail:expr => $arena:expr) => {
        $crate::list!($($arg),* ; $tail)(&mut *$arena)
    };
    // without tail, explicit arena
    ($($arg:expr),* $(,)? => $arena:expr) => {
        $crate::list!($($arg),*)(&mut *$arena)
    };
    // with tail, implicit arena
    ($($arg:expr),* $(,)?; $tail:expr) => { (|__arena: &mut $crate::Arena| {
        let __args: &[$crate::Term] = &[$($crate::IntoTerm::into_term($arg, __arena)),*];
        let __tail: $crate::Term = $crate::IntoTerm::into_term($tail, __arena);
        __arena.listc(__args, __tail)
    })};
    // without tail, implicit arena
    ($($arg:expr),* $(,)?) => { (|__arena: &mut $crate::Arena| {
        let __args: &[$crate::Term] = &[$($crate::IntoTerm::into_term($arg, __arena)),*];
        __arena.list(__args)
    })};
}

#[macro_export]
macro_rules! func {
    // explicit arena
    ($functor:expr; $($arg:expr),+ $(,)? => $arena:expr) => {
        $crate::func!($functor; $($arg),+)(&mut *$arena)
    };
    // implicit arena
    ($functor:expr; $($arg:expr),+ $(,)?) => { (|__arena: &mut $crate::Arena| {
        let __args: &[$crate::Term] = &[$($crate::IntoTerm::into_term($arg, __arena)),+];
        __arena.func($functor, __args)
    })};
}

#[macro_export]
macro_rules! atom {
    // explicit arena
    ($functor:expr => $arena:expr) => {
        $crate::atom!($functor)(&mut *$arena)
    };
    // implicit arena
    ($functor:expr) => {
        (|__arena: &mut $crate::Arena| __arena.atom($functor))
    };
}

/// Note that every expansion allocates a new variable: `var!("X")` twice
/// yields two unrelated variables.  Bind the result to a Rust variable to
/// share it between terms.
#[macro_export]
macro_rules! var {
    // explicit arena
    ($name:expr => $arena:expr) => {
        $crate::var!($name)(&mut *$arena)
    };
    // implicit arena
    ($name:expr) => {
        (|__arena: &mut $crate::Arena| __arena.var($name))
    };
}

#[macro_export]
macro_rules! nil {
    () => {
        $crate::Term::NIL
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::View;

    #[test]
    fn term_size_is_16_bytes() {
        assert_eq!(core::mem::size_of::<Term>(), 16);
    }

    #[test]
    fn option_term_size_is_16_bytes() {
        assert_eq!(core::mem::size_of::<Option<Term>>(), 16);
    }

    #[test]
    fn small_atom_interning() {
        let mut arena = Arena::new();
        let a1 = Term::atom(&mut arena, "foo");
        let a2 = Term::atom(&mut arena, "foo");
        assert_eq!(a1, a2);
        assert!(a1.is_inline());
        assert_eq!(a1.atom_name(&arena).unwrap(), "foo");
    }

    #[test]
    fn long_atoms_live_in_the_arena() {
        let mut arena = Arena::new();
        let a = Term::atom(&mut arena, "a_rather_long_atom_name");
        assert!(!a.is_inline());
        assert_eq!(a.atom_name(&arena).unwrap(), "a_rather_long_atom_name");
    }

    #[test]
    fn constants_are_atoms() {
        let arena = Arena::new();
        assert_eq!(Term::NIL.atom_name(&arena).unwrap(), "[]");
        assert_eq!(Term::CONS.atom_name(&arena).unwrap(), ".");
        assert_eq!(Term::TRUE.atom_name(&arena).unwrap(), "true");
    }

    #[test]
    fn variables_have_identity_not_names() {
        let mut arena = Arena::new();
        let x1 = Term::var(&mut arena, "X");
        let x2 = Term::var(&mut arena, "X");
        assert_ne!(x1, x2);
        assert_eq!(arena.var_name(&x1).unwrap(), Some("X"));
        assert!(x1.var_id().unwrap() < x2.var_id().unwrap());
        let anon = arena.fresh_var();
        assert_eq!(arena.var_name(&anon).unwrap(), None);
    }

    #[test]
    fn compound_construction_with_macros() {
        let mut arena = Arena::new();
        let x = arena.var("X");
        let t = func!("foo"; 1, 2.5, "bar", x, list![1, 2] => &mut arena);
        assert!(t.is_func());
        assert_eq!(t.arity(), 5);
        assert_eq!(t.func_name(&arena).unwrap(), "foo");
        let (_, [a, b, c, d, e]) = t.unpack_func(&arena, &["foo"]).unwrap();
        assert_eq!(a.unpack_int(&arena).unwrap(), 1);
        assert_eq!(b.unpack_real(&arena).unwrap(), 2.5);
        assert_eq!(c.atom_name(&arena).unwrap(), "bar");
        assert_eq!(d, x);
        assert_eq!(e.func_name(&arena).unwrap(), ".");
    }

    #[test]
    fn lists_are_cons_cells() {
        let mut arena = Arena::new();
        let l = list![1, 2 => &mut arena];
        let (functor, [head, tail]) = l.unpack_func(&arena, &["."]).unwrap();
        assert_eq!(*functor, Term::CONS);
        assert_eq!(head, Term::int(1));
        let (_, [head2, tail2]) = tail.unpack_func(&arena, &["."]).unwrap();
        assert_eq!(head2, Term::int(2));
        assert_eq!(tail2, Term::NIL);

        let empty = list![](&mut arena);
        assert_eq!(empty, Term::NIL);
    }

    #[test]
    fn list_with_tail() {
        let mut arena = Arena::new();
        let t = arena.var("T");
        let l = list![1; t => &mut arena];
        let (_, [_, tail]) = l.unpack_func(&arena, &["."]).unwrap();
        assert_eq!(tail, t);
    }

    #[test]
    fn func_with_no_args_is_an_atom() {
        let mut arena = Arena::new();
        let t = arena.func("foo", Vec::<Term>::new());
        assert!(t.is_atom());
    }

    #[test]
    fn funcv() {
        let mut arena = Arena::new();
        let foo = arena.atom("foo");
        let t = arena.funcv([foo, Term::int(1)]).unwrap();
        assert_eq!(t.func_name(&arena).unwrap(), "foo");
        assert!(matches!(
            arena.funcv(Vec::<Term>::new()),
            Err(TermError::MissingFunctor)
        ));
        assert!(matches!(
            arena.funcv([Term::int(1), Term::int(2)]),
            Err(TermError::InvalidFunctor(_))
        ));
    }

    #[test]
    fn kind_predicates() {
        let mut arena = Arena::new();
        let x = arena.var("X");
        let f = func!("f"; 1 => &mut arena);
        assert!(Term::int(1).is_number() && Term::int(1).is_atomic());
        assert!(Term::real(1.0).is_real() && !Term::real(1.0).is_int());
        assert!(x.is_var() && !x.is_atomic() && !x.is_callable());
        assert!(f.is_callable() && !f.is_atomic());
        assert!(Term::NIL.is_callable() && Term::NIL.is_atomic());
        assert_eq!(x.kind_name(), "var");
        assert_eq!(f.kind_name(), "func");
    }

    #[test]
    fn unpack_wrong_kind_errs() {
        let mut arena = Arena::new();
        let a = arena.atom("a");
        assert!(matches!(
            a.unpack_int(&arena),
            Err(TermError::UnexpectedKind {
                expected: "int",
                found: "atom"
            })
        ));
        assert!(matches!(
            a.unpack_func::<1>(&arena, &[]),
            Err(TermError::UnexpectedArity {
                expected: 1,
                found: 0
            })
        ));
        assert!(matches!(
            a.unpack_atom(&arena, &["b"]),
            Err(TermError::UnexpectedName(_))
        ));
    }

    #[test]
    fn view_construction() {
        let mut arena = Arena::new();
        let t = func!("point"; 1, 2 => &mut arena);
        match t.view(&arena).unwrap() {
            View::Func(ar, functor, args) => {
                assert_eq!(functor.atom_name(ar).unwrap(), "point");
                assert_eq!(args.len(), 2);
            }
            other => panic!("unexpected view {other:?}"),
        }
    }
}
