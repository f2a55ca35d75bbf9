//! The clause database.
//!
//! Clauses are copied into the database's own [`Arena`], so they outlive
//! the query epochs of the working arena.  A procedure hands out its
//! clause list as a snapshot of reference-counted clauses; a caller that
//! iterates a snapshot is unaffected by clauses added or removed while it
//! runs.

use indexmap::IndexMap;
use prolog_terms::{Arena, Term, TermError};
use smartstring::alias::String;
use std::fmt;
use std::rc::Rc;

/// A predicate indicator `Name/Arity`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PredKey {
    pub name: String,
    pub arity: usize,
}

impl PredKey {
    pub fn new(name: &str, arity: usize) -> Self {
        Self {
            name: String::from(name),
            arity,
        }
    }

    /// The key of a callable term.
    pub fn of(arena: &Arena, term: &Term) -> Result<Self, TermError> {
        Ok(Self::new(arena.name(term)?, term.arity()))
    }

    /// Builds the indicator term `Name/Arity`.
    pub fn to_term(&self, arena: &mut Arena) -> Term {
        let name = arena.atom(&self.name);
        let arity = Term::int(self.arity as i64);
        arena.func("/", [name, arity])
    }
}

impl fmt::Display for PredKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.name, self.arity)
    }
}

/// `Head :- Body`, stored in the database arena.  A fact has body `true`.
#[derive(Debug, Clone, Copy)]
pub struct Clause {
    pub head: Term,
    pub body: Term,
}

/// The ordered clauses of one predicate.
#[derive(Debug, Default, Clone)]
pub struct Procedure {
    pub(crate) clauses: Vec<Rc<Clause>>,
}

impl Procedure {
    pub fn len(&self) -> usize {
        self.clauses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }
}

/// Procedures keyed by predicate indicator, in order of first definition.
#[derive(Debug, Default)]
pub struct Database {
    pub(crate) arena: Arena,
    procedures: IndexMap<PredKey, Procedure>,
}

impl Database {
    pub fn new() -> Self {
        Self::default()
    }

    /// The arena holding clause terms.
    pub fn arena(&self) -> &Arena {
        &self.arena
    }

    pub fn contains(&self, key: &PredKey) -> bool {
        self.procedures.contains_key(key)
    }

    pub fn get(&self, key: &PredKey) -> Option<&Procedure> {
        self.procedures.get(key)
    }

    /// The current clauses of `key`, or `None` if the procedure is unknown.
    pub fn snapshot(&self, key: &PredKey) -> Option<Vec<Rc<Clause>>> {
        self.procedures.get(key).map(|p| p.clauses.clone())
    }

    /// Inserts a clause before all others of its procedure.
    pub fn add_front(&mut self, key: PredKey, clause: Clause) {
        self.procedures
            .entry(key)
            .or_default()
            .clauses
            .insert(0, Rc::new(clause));
    }

    /// Appends a clause after all others of its procedure.
    pub fn add_back(&mut self, key: PredKey, clause: Clause) {
        self.procedures
            .entry(key)
            .or_default()
            .clauses
            .push(Rc::new(clause));
    }

    /// Removes exactly `clause` (by identity).  Returns false if it was
    /// already gone.
    pub fn remove(&mut self, key: &PredKey, clause: &Rc<Clause>) -> bool {
        let Some(proc) = self.procedures.get_mut(key) else {
            return false;
        };
        match proc.clauses.iter().position(|c| Rc::ptr_eq(c, clause)) {
            Some(i) => {
                proc.clauses.remove(i);
                true
            }
            None => false,
        }
    }

    /// Removes the whole procedure.  Returns false if it did not exist.
    pub fn abolish(&mut self, key: &PredKey) -> bool {
        self.procedures.shift_remove(key).is_some()
    }

    /// Procedure keys in order of first definition.
    pub fn keys(&self) -> impl Iterator<Item = &PredKey> {
        self.procedures.keys()
    }

    pub fn len(&self) -> usize {
        self.procedures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.procedures.is_empty()
    }
}
