//! Defines [`TermError`], the unified error type for term operations.
//!
//! Provides descriptive error variants for invalid terms, epochs,
//! kind or arity mismatches, and operator-table issues.

use crate::{EpochID, Slice, Term};
use smartstring::alias::String;
use thiserror::Error;

/// Represents all possible errors that can occur while building,
/// inspecting, unifying or comparing terms.
///
/// [`TermError`] provides a single error surface for higher-level functions.
/// None of these are logical failures: a unification that does not hold
/// returns `Ok(false)`, never an error.
#[derive(Debug, Clone, Error)]
pub enum TermError {
    #[error("Invalid term {0:?}")]
    InvalidTerm(Term),

    #[error("Epoch overflow")]
    LiveEpochsExceeded,

    #[error("Invalid epoch {0:?}")]
    InvalidEpoch(EpochID),

    #[error("Missing functor")]
    MissingFunctor,

    #[error("Invalid functor {0:?}")]
    InvalidFunctor(Term),

    #[error("Type mismatch: expected {expected}, found {found}")]
    UnexpectedKind {
        expected: &'static str,
        found: &'static str,
    },

    #[error("Arity mismatch: expected {expected}, found {found}")]
    UnexpectedArity { expected: usize, found: usize },

    #[error("Unexpected name in {0:?}")]
    UnexpectedName(Term),

    #[error("invalid fixity: {0}")]
    InvalidFixity(String),

    #[error("invalid associativity: {0}")]
    InvalidAssoc(String),

    #[error("operdef error: {0}")]
    OperDef(String),
}

/// Internal errors that may occur when resolving a handle against
/// an arena.
#[derive(Debug, Clone, Error)]
pub(crate) enum InternalTermError {
    /// Invalid arena epoch ID.
    #[error("invalid arena epoch: {0:?}")]
    InvalidEpoch(EpochID),

    /// Invalid slice.
    #[error("invalid term slice: {0:?}")]
    InvalidSlice(Slice),
}
