//! Defines [`View`], a borrowed read-only representation of a [`Term`].
//!
//! Provides lightweight accessors for inspecting terms without allocation.

use crate::{Arena, Handle, Term, TermError, VarId};
use core::fmt;

impl fmt::Debug for View<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self {
            View::Int(i) => f.debug_tuple("Int").field(&i).finish(),
            View::Real(r) => f.debug_tuple("Real").field(&r).finish(),
            View::Var(v) => f.debug_tuple("Var").field(&v.0).finish(),
            View::Atom(a) => f.debug_tuple("Atom").field(&a).finish(),
            View::Func(a, fr, ts) => f
                .debug_tuple("Func")
                .field(&a.arena_id)
                .field(&fr.view(a))
                .field(&ts.iter().map(|t| t.view(a)).collect::<Vec<_>>())
                .finish(),
        }
    }
}

/// A borrowed view into the interned contents of a [`Term`].
///
/// Use [`Term::view`] to obtain a view.  No allocations are performed when
/// constructing a `View`; references into the underlying storage are
/// returned directly.  A view shows the term as written: a variable is
/// reported as a variable even if some [`Env`](crate::Env) binds it.
/// Dereference through [`Env::resolve`](crate::Env::resolve) first when
/// bindings matter.
#[derive(Clone, Copy)]
pub enum View<'a> {
    /// An integer value.
    Int(i64),
    /// A floating point value.
    Real(f64),
    /// A variable, by identity.
    Var(VarId),
    /// An atom name borrowed from the term or arena.
    Atom(&'a str),
    /// A compound term: the arena, the functor atom, and the arguments.
    Func(&'a Arena, &'a Term, &'a [Term]),
}

impl Term {
    /// Produce a [`View`] of this term that borrows from the given
    /// [`Arena`].  This method decodes any inlined bytes and
    /// dereferences indexes into the arena to yield structured
    /// references.  See [`View`] for details.
    #[inline]
    pub fn view<'a>(&'a self, arena: &'a Arena) -> Result<View<'a>, TermError> {
        match &self.0 {
            Handle::Int(i) => Ok(View::Int(*i)),
            Handle::Real(f) => Ok(View::Real(*f)),
            Handle::Var(id) => Ok(View::Var(*id)),
            Handle::Atom(a) => {
                let s_bytes = &a.bytes[..a.len as usize];
                // Inline atoms are only ever built from `&str`.
                let s = unsafe { core::str::from_utf8_unchecked(s_bytes) };
                Ok(View::Atom(s))
            }
            Handle::AtomRef(ar) => Ok(View::Atom(unsafe {
                core::str::from_utf8_unchecked(
                    arena
                        .byte_slice(ar)
                        .map_err(|_| TermError::InvalidTerm(*self))?,
                )
            })),
            Handle::FuncRef(fr) => {
                let slice = arena
                    .term_slice(fr)
                    .map_err(|_| TermError::InvalidTerm(*self))?;
                // Functor is the first element of the slice
                let functor = &slice[0];
                let args = &slice[1..];
                Ok(View::Func(arena, functor, args))
            }
        }
    }
}

impl Arena {
    /// Produce a [`View`] of the given `term` that borrows from
    /// this [`Arena`].  See [`Term::view`].
    #[inline]
    pub fn view<'a>(&'a self, term: &'a Term) -> Result<View<'a>, TermError> {
        term.view(self)
    }
}
