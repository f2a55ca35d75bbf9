//! Operator definitions: fixity, associativity and precedence.
//!
//! An operator is an atom with up to one definition per [`Fixity`].  The
//! table lives in the [`Arena`] and is consulted by the term writer when
//! it renders compounds in operator form, and updated by `op/3`.
//! Definitions are given with the usual Prolog type specifiers (`xfx`,
//! `xfy`, `yfx`, `fy`, `fx`, `xf`, `yf`), which decompose into a fixity
//! and an associativity.

use crate::{Arena, Term, TermError, func, list};
use indexmap::IndexMap;
use smartstring::alias::String;
use std::fmt;
use std::str::FromStr;

/// Returns `TermError::OperDef` with a formatted message.
macro_rules! bail {
    ($($arg:tt)*) => {
        return Err(crate::TermError::OperDef(String::from(format!($($arg)*))))
    }
}

/// Defines the syntactic position (fixity) of an operator.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Fixity {
    /// Prefix operator, appearing before its operand, e.g. `-x`.
    Prefix = 0,

    /// Infix operator, appearing between operands, e.g. `x + y`.
    Infix = 1,

    /// Postfix operator, appearing after its operand.
    Postfix = 2,
}

impl Fixity {
    /// The total number of fixity variants.
    pub const COUNT: usize = 3;

    /// String representations of each fixity variant, in declaration order.
    pub const STRS: &[&str] = &["prefix", "infix", "postfix"];

    /// Number of operands an operator of this fixity takes.
    pub fn arity(self) -> usize {
        match self {
            Fixity::Prefix | Fixity::Postfix => 1,
            Fixity::Infix => 2,
        }
    }
}

impl From<Fixity> for usize {
    fn from(f: Fixity) -> Self {
        f as usize
    }
}

impl fmt::Display for Fixity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(Fixity::STRS[usize::from(*self)])
    }
}

impl FromStr for Fixity {
    type Err = TermError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "prefix" => Ok(Fixity::Prefix),
            "infix" => Ok(Fixity::Infix),
            "postfix" => Ok(Fixity::Postfix),
            other => Err(TermError::InvalidFixity(String::from(other))),
        }
    }
}

/// Operator associativity.
///
/// | Variant | Specifiers |
/// |----------|--------------|
/// | [`Assoc::None`]  | `xfx`, `fx`, `xf` |
/// | [`Assoc::Left`]  | `yfx`, `yf` |
/// | [`Assoc::Right`] | `xfy`, `fy` |
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Assoc {
    /// Non-associative operator.
    None = 0,
    /// Left-associative operator.
    Left = 1,
    /// Right-associative operator.
    Right = 2,
}

impl Assoc {
    /// Total number of associativity variants.
    pub const COUNT: usize = 3;

    /// Canonical string representations for each variant.
    pub const STRS: &[&str] = &["none", "left", "right"];
}

impl From<Assoc> for usize {
    fn from(a: Assoc) -> Self {
        a as usize
    }
}

impl fmt::Display for Assoc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(Assoc::STRS[usize::from(*self)])
    }
}

impl FromStr for Assoc {
    type Err = TermError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "none" => Ok(Assoc::None),
            "left" => Ok(Assoc::Left),
            "right" => Ok(Assoc::Right),
            other => Err(TermError::InvalidAssoc(String::from(other))),
        }
    }
}

/// Precedence bounds.  A precedence of `0` in a definition request
/// removes the operator.
pub const MIN_OPER_PREC: i64 = 0;
pub const MAX_OPER_PREC: i64 = 1200;

/// A single operator definition.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OperDef {
    /// Operator fixity (prefix, infix, or postfix).
    pub fixity: Fixity,
    /// Operator precedence (`1`–`1200`); higher binds looser.
    pub prec: i64,
    /// Operator associativity.
    pub assoc: Assoc,
}

impl OperDef {
    /// Decodes a type specifier such as `xfy` into fixity and associativity.
    pub fn parse_specifier(spec: &str) -> Result<(Fixity, Assoc), TermError> {
        Ok(match spec {
            "xfx" => (Fixity::Infix, Assoc::None),
            "xfy" => (Fixity::Infix, Assoc::Right),
            "yfx" => (Fixity::Infix, Assoc::Left),
            "fy" => (Fixity::Prefix, Assoc::Right),
            "fx" => (Fixity::Prefix, Assoc::None),
            "xf" => (Fixity::Postfix, Assoc::None),
            "yf" => (Fixity::Postfix, Assoc::Left),
            _ => bail!("invalid operator specifier {:?}", spec),
        })
    }

    /// The type specifier this definition was made from.
    pub fn specifier(&self) -> &'static str {
        match (self.fixity, self.assoc) {
            (Fixity::Infix, Assoc::None) => "xfx",
            (Fixity::Infix, Assoc::Right) => "xfy",
            (Fixity::Infix, Assoc::Left) => "yfx",
            (Fixity::Prefix, Assoc::Right) => "fy",
            (Fixity::Prefix, _) => "fx",
            (Fixity::Postfix, Assoc::Left) => "yf",
            (Fixity::Postfix, _) => "xf",
        }
    }

    /// Maximum precedence allowed for the left and right operands.
    /// For prefix operators only the right bound is meaningful, for
    /// postfix only the left.
    pub fn arg_precs(&self) -> (i64, i64) {
        let p = self.prec;
        match self.assoc {
            Assoc::None => (p - 1, p - 1),
            Assoc::Left => (p, p - 1),
            Assoc::Right => (p - 1, p),
        }
    }
}

/// Operator definitions of one atom, indexed by [`Fixity`].
#[derive(Debug, Clone, Default)]
pub struct OperDefTab {
    tab: [Option<OperDef>; Fixity::COUNT],
}

impl OperDefTab {
    /// Creates a new, empty [`OperDefTab`] with all fixity slots unset.
    pub const fn new() -> Self {
        Self {
            tab: [const { None }; Fixity::COUNT],
        }
    }

    /// Returns `true` if this table defines at least one fixity.
    pub fn is_oper(&self) -> bool {
        self.tab.iter().any(|x| x.is_some())
    }

    /// Retrieves the operator definition for the given [`Fixity`], if present.
    pub fn get(&self, fixity: Fixity) -> Option<&OperDef> {
        self.tab[usize::from(fixity)].as_ref()
    }

    /// Iterates over the definitions present.
    pub fn iter(&self) -> impl Iterator<Item = &OperDef> {
        self.tab.iter().flatten()
    }
}

impl std::ops::Index<Fixity> for OperDefTab {
    type Output = Option<OperDef>;

    fn index(&self, i: Fixity) -> &Self::Output {
        &self.tab[usize::from(i)]
    }
}

impl std::ops::IndexMut<Fixity> for OperDefTab {
    fn index_mut(&mut self, i: Fixity) -> &mut Self::Output {
        &mut self.tab[usize::from(i)]
    }
}

/// Registry of operator definitions keyed by atom name, in definition order.
#[derive(Debug, Clone, Default)]
pub struct OperDefs {
    map: IndexMap<String, OperDefTab>,
}

impl OperDefs {
    /// Creates an empty [`OperDefs`] registry.
    pub fn new() -> Self {
        Self {
            map: IndexMap::new(),
        }
    }

    /// Definitions of `name`, if it has any.
    pub fn get(&self, name: &str) -> Option<&OperDefTab> {
        self.map.get(name).filter(|tab| tab.is_oper())
    }

    /// Definition of `name` with the given fixity.
    pub fn lookup(&self, name: &str, fixity: Fixity) -> Option<&OperDef> {
        self.map.get(name).and_then(|tab| tab.get(fixity))
    }

    /// True if `name` has any operator definition.
    pub fn is_oper(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Number of atoms with at least one definition.
    pub fn len(&self) -> usize {
        self.map.values().filter(|tab| tab.is_oper()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Iterates `(name, definition)` pairs in definition order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &OperDef)> {
        self.map
            .iter()
            .flat_map(|(name, tab)| tab.iter().map(move |def| (name.as_str(), def)))
    }

    /// Adds, replaces, or (with `prec == 0`) removes the definition of
    /// `name` for the fixity encoded in `spec`.
    ///
    /// An atom cannot be both an infix and a postfix operator.
    pub fn define(&mut self, name: &str, prec: i64, spec: &str) -> Result<(), TermError> {
        if !(MIN_OPER_PREC..=MAX_OPER_PREC).contains(&prec) {
            bail!(
                "precedence {} out of range {}..={}",
                prec,
                MIN_OPER_PREC,
                MAX_OPER_PREC
            );
        }
        let (fixity, assoc) = OperDef::parse_specifier(spec)?;
        if prec == 0 {
            if let Some(tab) = self.map.get_mut(name) {
                tab[fixity] = None;
            }
            return Ok(());
        }
        let clash = match fixity {
            Fixity::Infix => Some(Fixity::Postfix),
            Fixity::Postfix => Some(Fixity::Infix),
            Fixity::Prefix => None,
        };
        if let Some(other) = clash {
            if self.lookup(name, other).is_some() {
                bail!(
                    "{:?} cannot be both an infix and a postfix operator",
                    name
                );
            }
        }
        let tab = self.map.entry(String::from(name)).or_default();
        tab[fixity] = Some(OperDef {
            fixity,
            prec,
            assoc,
        });
        Ok(())
    }
}

impl Arena {
    /// The operator table of this arena.
    pub fn opers(&self) -> &OperDefs {
        &self.opers
    }

    /// Mutable access to the operator table.
    pub fn opers_mut(&mut self) -> &mut OperDefs {
        &mut self.opers
    }

    /// Defines one operator from an `op(Priority, Specifier, Name)` term.
    /// `Name` may also be a list of atoms.
    pub fn define_oper(&mut self, op: Term) -> Result<(), TermError> {
        let (_, [prec, spec, names]) = op.unpack_func(self, &["op"])?;
        let prec = prec.unpack_int(self)?;
        let spec = String::from(spec.atom_name(self)?);
        let mut todo = vec![names];
        while let Some(names) = todo.pop() {
            if names.is_atom() {
                let name = String::from(names.atom_name(self)?);
                self.opers.define(&name, prec, &spec)?;
            } else {
                let (_, [head, tail]) = names.unpack_func(self, &["."])?;
                todo.push(tail);
                todo.push(head);
            }
        }
        Ok(())
    }

    /// Defines each `op/3` term of `term`, which is a list of such terms or
    /// a single one.
    pub fn define_opers(&mut self, term: Term) -> Result<(), TermError> {
        let mut term = term;
        loop {
            if term == Term::NIL {
                return Ok(());
            }
            let cell = match term.unpack_func::<2>(self, &["."]) {
                Ok((_, [op, tail])) => Some((op, tail)),
                Err(_) => None,
            };
            match cell {
                Some((op, tail)) => {
                    self.define_oper(op)?;
                    term = tail;
                }
                None => return self.define_oper(term),
            }
        }
    }

    /// Installs the standard Prolog operator table.
    pub fn define_default_opers(&mut self) -> Result<(), TermError> {
        let term = list![
            func!("op"; 1200, "xfx", list![":-", "-->"]),
            func!("op"; 1200, "fx", list![":-", "?-"]),
            func!("op"; 1150, "fx", list!["dynamic", "discontiguous", "initialization"]),
            func!("op"; 1100, "xfy", list![";", "|"]),
            func!("op"; 1105, "xfy", "|"),
            func!("op"; 1050, "xfy", list!["->", "*->"]),
            func!("op"; 1000, "xfy", ","),
            func!("op"; 900, "fy", "\\+"),
            func!(
                "op";
                700,
                "xfx",
                list![
                    "=", "\\=", "==", "\\==", "@<", "@>", "@=<", "@>=", "=..", "is", "=:=",
                    "=\\=", "<", ">", "=<", ">="
                ]
            ),
            func!("op"; 600, "xfy", ":"),
            func!("op"; 500, "yfx", list!["+", "-", "/\\", "\\/", "xor"]),
            func!("op"; 400, "yfx", list!["*", "/", "//", "rem", "mod", "div", "<<", ">>"]),
            func!("op"; 200, "xfx", "**"),
            func!("op"; 200, "xfy", "^"),
            func!("op"; 200, "fy", list!["-", "+", "\\"]),
            => self
        ];
        self.define_opers(term)
    }
}
