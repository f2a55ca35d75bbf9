//! Defines [`Error`], the error type of the resolution engine.
//!
//! A thrown Prolog term travels as [`Error::Exception`] while the proof is
//! running and can be intercepted by `catch/3`.  Once it reaches the query
//! boundary uncaught it is rendered into [`Error::Uncaught`].  Faults of
//! the host side ([`Error::Io`], [`Error::Term`]) are never catchable.

use prolog_terms::{Term, TermError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// A ball thrown by `throw/1` or raised by a builtin, in flight.
    ///
    /// The ball is a handle into the engine's arena, so it cannot render
    /// itself; hosts that see this variant write it with
    /// [`Engine::display`](crate::Engine::display).
    #[error("exception thrown (write the ball with Engine::display)")]
    Exception(Term),

    /// A ball that no `catch/3` intercepted, rendered with `writeq`.
    #[error("uncaught exception: {0}")]
    Uncaught(String),

    #[error(transparent)]
    Term(#[from] TermError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    /// True for a thrown term, the only kind `catch/3` can intercept.
    pub fn is_exception(&self) -> bool {
        matches!(self, Error::Exception(_))
    }
}
