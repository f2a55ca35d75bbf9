//! Defines the [`Arena`] type, which manages allocation and interning
//! of data for [`Term`] values.
//!
//! Provides constructors, basic allocation methods, and utilities for
//! working with terms stored in the arena.

use crate::{Handle, InternalTermError, IntoTerm, OperDefs, Slice, Term, TermError, VarId, View};

/// The arena interns long atom names, variables and compound terms.
/// An `Arena` owns all memory for interned data. Terms store only indices into
/// this arena and remain valid as long as the epoch they belong to is alive.
///
/// ### Epochs
/// The arena is divided into *epochs*, which form a stack.
/// Allocation begins in epoch `0`, which starts at offset `0` in all
/// underlying storages. At any time, the user can call `begin_epoch()`.
/// This operation:
/// - Freezes the current epoch (recording its byte, term and variable offsets).
/// - Starts a new *active* epoch for subsequent allocations.
///
/// At any point, there are `K` alive epochs, where `K - 1` are frozen and the
/// last one receives all new allocations, and `K <= MAX_LIVE_EPOCHS`.
///
/// ### Truncation
/// - `truncate(m)` erases the contents of epoch `m` and all newer epochs in
///   O(1) and leaves `m` as the (now empty) active epoch.
/// - `end_epoch(m)` does the same and then makes the epoch before `m`
///   active again, so `begin_epoch`/`end_epoch` behave like push and pop.
///
/// The engine runs every query inside its own epoch, so the terms a query
/// allocates (renamed clauses, copies, error terms) are released in one step:
/// ```
/// # use prolog_terms::Arena;
/// let mut arena = Arena::with_capacity(4096, 1024);
/// let epoch = arena.begin_epoch().unwrap();
/// let _tmp = arena.fresh_var();
/// arena.end_epoch(epoch).unwrap(); // frees it all at once
/// ```
#[derive(Default, Clone, Debug)]
pub struct Arena {
    /// Randomly generated Arena ID
    pub(crate) arena_id: ArenaID,

    /// Index of the epoch receiving allocations.
    pub(crate) current_epoch: usize,

    /// Randomly generated identifiers, one per epoch.
    /// Every slice handle carries the epoch ID that was current at
    /// allocation time, and is checked against this table on access.
    pub(crate) epoch_ids: [EpochID; MAX_LIVE_EPOCHS],

    /// Storage for long atom names and variable names.
    pub(crate) bytes: Vec<u8>,

    /// For each epoch, the starting offset into `bytes`.
    pub(crate) byte_start_by_epoch: [usize; MAX_LIVE_EPOCHS],

    /// Storage for compound terms.
    /// Each term is a contiguous slice `[functor_atom, arg1, arg2, …]`.
    pub(crate) terms: Vec<Term>,

    /// For each epoch, the starting index into `terms`.
    pub(crate) term_start_by_epoch: [usize; MAX_LIVE_EPOCHS],

    /// Variable table indexed by [`VarId`]; holds the optional display name.
    pub(crate) vars: Vec<Option<Slice>>,

    /// For each epoch, the first [`VarId`] allocated in it.
    pub(crate) var_start_by_epoch: [usize; MAX_LIVE_EPOCHS],

    /// Operator definitions associated with this arena.
    pub(crate) opers: OperDefs,
}

pub const MAX_LIVE_EPOCHS: usize = 8;

#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct EpochID(pub(crate) u32); // Random Epoch ID

#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArenaID(pub(crate) u32); // Random Arena ID

#[derive(Debug, Clone, Copy)]
pub struct ArenaStats {
    pub current_epoch: EpochID,
    pub bytes_len: usize,
    pub terms_len: usize,
    pub vars_len: usize,
}

impl Arena {
    /// Create a new, empty arena with given capacities.
    pub fn with_capacity(bytes_capacity: usize, terms_capacity: usize) -> Self {
        let mut epoch_ids = [EpochID(0); MAX_LIVE_EPOCHS];
        epoch_ids[0] = EpochID(rand::random());

        Self {
            arena_id: ArenaID(rand::random()),
            current_epoch: 0,
            epoch_ids,
            bytes: Vec::with_capacity(bytes_capacity),
            byte_start_by_epoch: [0; MAX_LIVE_EPOCHS],
            terms: Vec::with_capacity(terms_capacity),
            term_start_by_epoch: [0; MAX_LIVE_EPOCHS],
            vars: Vec::new(),
            var_start_by_epoch: [0; MAX_LIVE_EPOCHS],
            opers: OperDefs::new(),
        }
    }

    /// Create a new, empty arena with default capacities.
    pub fn new() -> Self {
        Self::with_capacity(4096, 1024)
    }

    /// Returns stats.
    pub fn stats(&self) -> ArenaStats {
        ArenaStats {
            current_epoch: self.epoch_ids[self.current_epoch],
            bytes_len: self.bytes.len(),
            terms_len: self.terms.len(),
            vars_len: self.vars.len(),
        }
    }

    /// Returns current epoch.
    pub fn current_epoch(&self) -> EpochID {
        self.epoch_ids[self.current_epoch]
    }

    /// Freezes current epoch and begins a new one.
    pub fn begin_epoch(&mut self) -> Result<EpochID, TermError> {
        let new_epoch = self.current_epoch + 1;
        if new_epoch >= MAX_LIVE_EPOCHS {
            return Err(TermError::LiveEpochsExceeded);
        }
        self.epoch_ids[new_epoch] = EpochID(rand::random());
        self.byte_start_by_epoch[new_epoch] = self.bytes.len();
        self.term_start_by_epoch[new_epoch] = self.terms.len();
        self.var_start_by_epoch[new_epoch] = self.vars.len();
        self.current_epoch = new_epoch;
        Ok(self.epoch_ids[new_epoch])
    }

    /// Erases arena in O(1).
    /// Does not shrink the allocated capacity.
    pub fn clear(&mut self) -> Result<(), TermError> {
        self.truncate(self.epoch_ids[0])
    }

    /// Erases the contents of the active epoch.
    pub fn truncate_current(&mut self) -> Result<(), TermError> {
        self.truncate(self.epoch_ids[self.current_epoch])
    }

    /// Epoch `m` and all epochs more recent than `m` are erased in O(1).
    /// Epoch `m` stays alive and active.
    /// Does not shrink the allocated capacity.
    pub fn truncate(&mut self, epoch_id: EpochID) -> Result<(), TermError> {
        let epoch = self
            .epoch_index(epoch_id)
            .map_err(|_| TermError::InvalidEpoch(epoch_id))?;
        self.bytes.truncate(self.byte_start_by_epoch[epoch]);
        self.terms.truncate(self.term_start_by_epoch[epoch]);
        self.vars.truncate(self.var_start_by_epoch[epoch]);
        self.current_epoch = epoch;
        Ok(())
    }

    /// Erases epoch `m` and everything newer, then reactivates the epoch
    /// preceding `m`.  Ending epoch `0` is the same as [`clear`](Self::clear).
    pub fn end_epoch(&mut self, epoch_id: EpochID) -> Result<(), TermError> {
        self.truncate(epoch_id)?;
        self.current_epoch = self.current_epoch.saturating_sub(1);
        Ok(())
    }

    /// Searches epoch ID in alive epochs and returns its index.
    #[inline]
    fn epoch_index(&self, epoch_id: EpochID) -> Result<usize, InternalTermError> {
        let Some(epoch) = self.epoch_ids[..=self.current_epoch]
            .iter()
            .position(|&id| id == epoch_id)
        else {
            return Err(InternalTermError::InvalidEpoch(epoch_id));
        };
        Ok(epoch)
    }

    /// Checks that `slice` lies inside the range `starts` assigns to its epoch.
    #[inline]
    fn verify_slice(
        &self,
        slice: &Slice,
        starts: &[usize; MAX_LIVE_EPOCHS],
        len: usize,
    ) -> Result<(), InternalTermError> {
        let epoch = self.epoch_index(slice.epoch_id)?;
        let epoch_start = starts[epoch];
        let epoch_end = if epoch == self.current_epoch {
            len
        } else {
            starts[epoch + 1]
        };
        if (slice.index as usize) < epoch_start
            || (slice.index as usize) + (slice.len as usize) > epoch_end
        {
            return Err(InternalTermError::InvalidSlice(*slice));
        }
        Ok(())
    }

    /// Convert a `value` into `Term`.
    #[inline]
    pub fn term<T: IntoTerm>(&mut self, value: T) -> Term {
        value.into_term(self)
    }

    /// Construct a new integer term.
    #[inline]
    pub fn int(&mut self, i: impl Into<i64>) -> Term {
        Term::int(i)
    }

    /// Construct a new floating point term.
    #[inline]
    pub fn real(&mut self, r: impl Into<f64>) -> Term {
        Term::real(r)
    }

    /// Construct or intern an atom.  See [`Term::atom`].
    #[inline]
    pub fn atom(&mut self, name: impl AsRef<str>) -> Term {
        Term::atom(self, name)
    }

    /// Allocate a new variable carrying a display name.  The name is only
    /// used for printing; every call creates a distinct variable.
    pub fn var(&mut self, name: impl AsRef<str>) -> Term {
        let name = self.intern_str(name.as_ref());
        self.push_var(Some(name))
    }

    /// Allocate a new anonymous variable.
    pub fn fresh_var(&mut self) -> Term {
        self.push_var(None)
    }

    fn push_var(&mut self, name: Option<Slice>) -> Term {
        let id = VarId(self.vars.len() as u32);
        self.vars.push(name);
        Term(Handle::Var(id))
    }

    /// Construct a new compound term.  See [`Term::func`].
    #[inline]
    pub fn func(
        &mut self,
        functor: impl AsRef<str>,
        args: impl IntoIterator<Item = impl IntoTerm>,
    ) -> Term {
        Term::func(self, functor, args)
    }

    /// Construct a compound term from functor followed by arguments.
    /// See [`Term::funcv`].
    #[inline]
    pub fn funcv(
        &mut self,
        terms: impl IntoIterator<Item = impl IntoTerm>,
    ) -> Result<Term, TermError> {
        Term::funcv(self, terms)
    }

    /// Constructs a proper list.  If `terms` is empty, returns `[]`.
    #[inline]
    pub fn list(&mut self, terms: impl IntoIterator<Item = impl IntoTerm>) -> Term {
        Term::list(self, terms)
    }

    /// Constructs a list ending in `tail`.  If `terms` is empty, returns `tail`.
    #[inline]
    pub fn listc(
        &mut self,
        terms: impl IntoIterator<Item = impl IntoTerm>,
        tail: impl IntoTerm,
    ) -> Term {
        Term::listc(self, terms, tail)
    }

    /// Constant representing the empty list.
    pub const NIL: Term = Term::NIL;

    /// Returns the name of a compound term or atom.
    #[inline]
    pub fn name<'a>(&'a self, term: &'a Term) -> Result<&'a str, TermError> {
        match self.view(term)? {
            View::Atom(name) => Ok(name),
            View::Func(ar, functor, _) => Ok(functor.atom_name(ar)?),
            _ => Err(TermError::UnexpectedKind {
                expected: "atom, func",
                found: term.kind_name(),
            }),
        }
    }

    /// Returns the name of an atom,
    #[inline]
    pub fn atom_name<'a>(&'a self, term: &'a Term) -> Result<&'a str, TermError> {
        self.unpack_atom(term, &[])
    }

    /// Returns the display name of a variable, or `None` for an anonymous one.
    #[inline]
    pub fn var_name(&self, term: &Term) -> Result<Option<&str>, TermError> {
        let id = self.unpack_var(term)?;
        self.var_id_name(id)
    }

    /// Returns the display name of the variable `id`.
    pub fn var_id_name(&self, id: VarId) -> Result<Option<&str>, TermError> {
        let Some(slot) = self.vars.get(id.0 as usize) else {
            return Err(TermError::InvalidTerm(Term(Handle::Var(id))));
        };
        match slot {
            None => Ok(None),
            Some(slice) => {
                let bytes = self
                    .byte_slice(slice)
                    .map_err(|_| TermError::InvalidTerm(Term(Handle::Var(id))))?;
                let name = core::str::from_utf8(bytes)
                    .map_err(|_| TermError::InvalidTerm(Term(Handle::Var(id))))?;
                Ok(Some(name))
            }
        }
    }

    /// Returns the name of a compund term.
    #[inline]
    pub fn func_name<'a>(&'a self, term: &'a Term) -> Result<&'a str, TermError> {
        let (functor, _) = self.unpack_func_any(term, &[])?;
        self.atom_name(functor)
    }

    /// Returns the value if `term` is an integer, otherwise an error.
    #[inline]
    pub fn unpack_int(&self, term: &Term) -> Result<i64, TermError> {
        match self.view(term)? {
            View::Int(v) => Ok(v),
            _ => Err(TermError::UnexpectedKind {
                expected: "int",
                found: term.kind_name(),
            }),
        }
    }

    /// Returns the value if `term` is a real, otherwise an error.
    #[inline]
    pub fn unpack_real(&self, term: &Term) -> Result<f64, TermError> {
        match self.view(term)? {
            View::Real(v) => Ok(v),
            _ => Err(TermError::UnexpectedKind {
                expected: "real",
                found: term.kind_name(),
            }),
        }
    }

    /// Returns the name if `term` is an atom, otherwise an error.
    #[inline]
    pub fn unpack_atom<'a>(
        &'a self,
        term: &'a Term,
        allowed_names: &[&str],
    ) -> Result<&'a str, TermError> {
        match self.view(term)? {
            View::Atom(name) => {
                if !allowed_names.is_empty() && !allowed_names.contains(&name) {
                    return Err(TermError::UnexpectedName(*term));
                }
                Ok(name)
            }
            _ => Err(TermError::UnexpectedKind {
                expected: "atom",
                found: term.kind_name(),
            }),
        }
    }

    /// Returns the identity if `term` is a variable, otherwise an error.
    #[inline]
    pub fn unpack_var(&self, term: &Term) -> Result<VarId, TermError> {
        match term.0 {
            Handle::Var(id) => Ok(id),
            _ => Err(TermError::UnexpectedKind {
                expected: "var",
                found: term.kind_name(),
            }),
        }
    }

    /// Returns the functor and arguments if `term` is a compound term of any arity
    /// or an atom and its name is in `allowed_names` (or if `allowed_names` is empty),
    /// otherwise returns an error.
    #[inline]
    pub fn unpack_func_any<'a>(
        &'a self,
        term: &'a Term,
        allowed_names: &[&str],
    ) -> Result<(&'a Term, &'a [Term]), TermError> {
        match self.view(term)? {
            View::Atom(name) => {
                if !allowed_names.is_empty() && !allowed_names.contains(&name) {
                    return Err(TermError::UnexpectedName(*term));
                }
                Ok((term, &[] as &[Term]))
            }
            View::Func(_, functor, args) => {
                if args.is_empty() {
                    return Err(TermError::InvalidTerm(*term));
                }
                if !allowed_names.is_empty() {
                    let name = self.atom_name(functor)?;
                    if !allowed_names.contains(&name) {
                        return Err(TermError::UnexpectedName(*term));
                    }
                }
                Ok((functor, args))
            }
            _ => Err(TermError::UnexpectedKind {
                expected: "func",
                found: term.kind_name(),
            }),
        }
    }

    /// Returns the functor and arguments if `term` is a compound term of arity
    /// `ARITY` (or an atom if `ARITY == 0`) and its name is in `allowed_names`
    /// (or if `allowed_names` is empty), otherwise returns an error.
    #[inline]
    pub fn unpack_func<'a, const ARITY: usize>(
        &'a self,
        term: &'a Term,
        allowed_names: &[&str],
    ) -> Result<(&'a Term, [Term; ARITY]), TermError> {
        let (functor, args) = self.unpack_func_any(term, allowed_names)?;
        let arr: [Term; ARITY] = args.try_into().map_err(|_| TermError::UnexpectedArity {
            expected: ARITY,
            found: args.len(),
        })?;
        Ok((functor, arr))
    }

    /// Intern a UTF‑8 string into the arena and return its slice
    /// descriptor.  Strings are stored in a contiguous bump vector.
    #[inline]
    pub(crate) fn intern_str(&mut self, s: &str) -> Slice {
        let index = self.bytes.len();
        self.bytes.extend_from_slice(s.as_bytes());
        Slice {
            epoch_id: self.epoch_ids[self.current_epoch],
            index: index as u32,
            len: s.len() as u32,
        }
    }

    /// Intern a compound term slice (functor + args) into the term arena.
    /// Arguments must already be built.
    #[inline]
    pub(crate) fn intern_func(&mut self, functor: Term, args: &[Term]) -> Slice {
        let index = self.terms.len();
        self.terms.push(functor);
        self.terms.extend_from_slice(args);
        Slice {
            epoch_id: self.epoch_ids[self.current_epoch],
            index: index as u32,
            len: (args.len() + 1) as u32,
        }
    }

    /// Borrow a slice of bytes stored in the arena.
    #[inline]
    pub(crate) fn byte_slice<'a>(&'a self, slice: &Slice) -> Result<&'a [u8], InternalTermError> {
        self.verify_slice(slice, &self.byte_start_by_epoch, self.bytes.len())?;
        Ok(&self.bytes[(slice.index as usize)..((slice.index + slice.len) as usize)])
    }

    /// Borrow a slice of terms comprising a compound term.
    #[inline]
    pub(crate) fn term_slice<'a>(&'a self, slice: &Slice) -> Result<&'a [Term], InternalTermError> {
        self.verify_slice(slice, &self.term_start_by_epoch, self.terms.len())?;
        Ok(&self.terms[(slice.index as usize)..((slice.index + slice.len) as usize)])
    }
}
