//! # Prolog Engine
//!
//! A tree-walking Prolog resolution engine over the arena-backed terms of
//! [`prolog_terms`].
//!
//! An [`Engine`] owns a working arena, a binding environment, a clause
//! [`Database`], a builtin table and a stream table.  Goals are proved in
//! continuation-passing style: the continuation runs once per solution and
//! answers with a [`Control`], so backtracking is ordinary return and cut is
//! a [`Control::Cut`] travelling up to the frame that owns its [`Barrier`].
//!
//! The builtins cover control constructs, `catch/3` and `throw/1`,
//! unification and the standard order, type tests, term inspection,
//! `assert`/`retract`, all-solutions predicates, flags, operators and byte
//! and term I/O.  Terms are built by the host; there is no reader.
//!
//! ## Example
//! ```rust
//! # use prolog_engine::Engine;
//! # use prolog_terms::func;
//! let mut engine = Engine::new().unwrap();
//! let arena = engine.arena_mut();
//! let facts = [
//!     func!("parent"; "tom", "bob" => arena),
//!     func!("parent"; "tom", "liz" => arena),
//! ];
//! engine.add_clauses(facts).unwrap();
//!
//! let x = engine.arena_mut().var("X");
//! let goal = func!("parent"; "tom", x => engine.arena_mut());
//! let mut children = Vec::new();
//! engine
//!     .query(goal, |e| {
//!         children.push(e.display(x).to_string());
//!         false
//!     })
//!     .unwrap();
//! assert_eq!(children, ["bob", "liz"]);
//! ```
//!
//! ## License
//!
//! Copyright (c) 2005–2025 IKH Software, Inc.
//!
//! Released under the terms of the GNU Lesser General Public License, version 3.0 or
//! (at your option) any later version (LGPL-3.0-or-later).

mod aggregate;
mod builtins;
mod config;
mod control;
mod database;
mod dynamic;
mod engine;
mod error;
mod stream;

pub use config::{EngineConfig, InvalidFlag, Unknown};
pub use database::{Clause, Database, PredKey, Procedure};
pub use engine::{Barrier, Builtin, Cont, Control, Engine, Solve};
pub use error::Error;
