//! # Prolog Terms
//!
//! An arena-backed representation of Prolog terms together with the
//! operations a resolution engine is built from.
//!
//! A [`Term`] is a compact 16 byte `Copy` handle.  Numbers, variables and
//! short atoms are stored inline; long atom names and the arguments of
//! compound terms live in an [`Arena`], which releases whole epochs of
//! allocations at once.  Terms are immutable: variable bindings are kept
//! in an [`Env`], whose trail lets a caller take a [`Mark`] and undo every
//! binding made after it.
//!
//! On top of that the crate provides
//! - unification with and without occurs check ([`Env::unify`]),
//! - the standard order of terms ([`Env::compare`], [`Env::sort_dedup`]),
//! - copying with fresh variables, within or across arenas
//!   ([`Arena::copy_term`], [`Arena::import`]),
//! - an operator table ([`OperDefs`]) and a writer ([`TermDisplay`]).
//!
//! ## Example
//! ```rust
//! # use prolog_terms::{Arena, Env, func, list};
//! let mut arena = Arena::new();
//! let mut env = Env::new();
//!
//! let x = arena.var("X");
//! let t = arena.var("T");
//! let pattern = func!("point"; x, list![2; t] => &mut arena);
//! let value = func!("point"; 1, list![2, 3] => &mut arena);
//!
//! assert!(env.unify(&arena, pattern, value, false).unwrap());
//! assert_eq!(pattern.display(&arena).env(&env).to_string(), "point(1, [2, 3])");
//! assert!(env.compare(&arena, pattern, value).unwrap().is_eq());
//! ```
//!
//! ## License
//!
//! Copyright (c) 2005–2025 IKH Software, Inc.
//!
//! Released under the terms of the GNU Lesser General Public License, version 3.0 or
//! (at your option) any later version (LGPL-3.0-or-later).

mod arena;
mod copy;
mod display;
mod env;
mod error;
mod oper;
mod order;
mod term;
mod unify;
mod view;

pub use arena::{Arena, ArenaID, ArenaStats, EpochID, MAX_LIVE_EPOCHS};
pub use copy::VarMap;
pub use display::{TermDisplay, WriteOptions};
pub use env::{Env, Mark};
pub(crate) use error::InternalTermError;
pub use error::TermError;
pub use oper::{Assoc, Fixity, MAX_OPER_PREC, MIN_OPER_PREC, OperDef, OperDefTab, OperDefs};
pub(crate) use term::{Handle, Slice};
pub use term::{IntoTerm, Term, VarId};
pub use view::View;
