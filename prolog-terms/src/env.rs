//! Defines [`Env`], the binding environment with an undo trail.
//!
//! Terms are immutable; a variable gets its value through an `Env`.
//! Every binding is recorded on the trail so a caller can take a
//! [`Mark`] before trying an alternative and roll back to it afterwards.

use crate::{Arena, Handle, Term, TermError, VarId, View};
use std::collections::{HashMap, HashSet};

/// A trail position returned by [`Env::mark`].
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct Mark(pub(crate) usize);

/// Variable bindings plus the trail used to undo them.
#[derive(Debug, Default, Clone)]
pub struct Env {
    pub(crate) bindings: HashMap<VarId, Term>,
    pub(crate) trail: Vec<VarId>,
}

impl Env {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current trail position.
    #[inline]
    pub fn mark(&self) -> Mark {
        Mark(self.trail.len())
    }

    /// Forgets every binding made since `mark`.
    pub fn undo_to(&mut self, mark: Mark) {
        while self.trail.len() > mark.0 {
            if let Some(id) = self.trail.pop() {
                self.bindings.remove(&id);
            }
        }
    }

    /// Drops all bindings.
    pub fn clear(&mut self) {
        self.bindings.clear();
        self.trail.clear();
    }

    /// Number of live bindings.
    #[inline]
    pub fn len(&self) -> usize {
        self.trail.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.trail.is_empty()
    }

    /// Binds `var` to `value` and records it on the trail.
    /// The variable must be unbound.
    pub fn bind(&mut self, var: VarId, value: Term) {
        debug_assert!(!self.bindings.contains_key(&var));
        self.bindings.insert(var, value);
        self.trail.push(var);
    }

    /// The direct binding of `var`, if any.
    #[inline]
    pub fn lookup(&self, var: VarId) -> Option<Term> {
        self.bindings.get(&var).copied()
    }

    /// Follows variable bindings until reaching a non-variable or an
    /// unbound variable.
    pub fn resolve(&self, term: Term) -> Term {
        let mut term = term;
        while let Handle::Var(id) = term.0 {
            match self.bindings.get(&id) {
                Some(next) => term = *next,
                None => break,
            }
        }
        term
    }

    /// True if `term` resolves to an unbound variable.
    #[inline]
    pub fn is_unbound(&self, term: Term) -> bool {
        self.resolve(term).is_var()
    }

    /// Distinct unbound variables of `term` in depth-first, left-to-right
    /// order of first occurrence.
    pub fn term_variables(&self, arena: &Arena, term: Term) -> Result<Vec<Term>, TermError> {
        let mut seen = HashSet::new();
        let mut out = Vec::new();
        self.collect_vars(arena, term, &mut seen, &mut out)?;
        Ok(out)
    }

    fn collect_vars(
        &self,
        arena: &Arena,
        term: Term,
        seen: &mut HashSet<VarId>,
        out: &mut Vec<Term>,
    ) -> Result<(), TermError> {
        let mut term = self.resolve(term);
        // Loop on the last argument so long lists do not recurse.
        loop {
            match term.view(arena)? {
                View::Var(id) => {
                    if seen.insert(id) {
                        out.push(term);
                    }
                    return Ok(());
                }
                View::Func(_, _, args) => {
                    let (last, init) = args.split_last().ok_or(TermError::InvalidTerm(term))?;
                    for arg in init {
                        self.collect_vars(arena, *arg, seen, out)?;
                    }
                    term = self.resolve(*last);
                }
                View::Int(_) | View::Real(_) | View::Atom(_) => return Ok(()),
            }
        }
    }

    /// Elements of a proper list, or `None` if `term` is not one
    /// (partial lists included).
    pub fn list_items(&self, arena: &Arena, term: Term) -> Result<Option<Vec<Term>>, TermError> {
        let mut items = Vec::new();
        let mut term = self.resolve(term);
        loop {
            if term.is_var() {
                return Ok(None);
            }
            if term.is_atom() {
                return Ok((arena.atom_name(&term)? == "[]").then_some(items));
            }
            let next = match arena.unpack_func_any(&term, &["."]) {
                Ok((_, [head, tail])) => {
                    items.push(*head);
                    *tail
                }
                _ => return Ok(None),
            };
            term = self.resolve(next);
        }
    }
}
