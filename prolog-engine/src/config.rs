//! Engine configuration: the Prolog flags and the arena sizes.

use smartstring::alias::String;
use std::fmt;
use std::str::FromStr;

/// What a call to an unknown procedure does.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Unknown {
    /// Raise `existence_error(procedure, Name/Arity)`.
    #[default]
    Error,
    /// Fail silently.
    Fail,
}

impl Unknown {
    pub const STRS: &[&str] = &["error", "fail"];
}

impl fmt::Display for Unknown {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Unknown::Error => "error",
            Unknown::Fail => "fail",
        })
    }
}

/// Error returned when a flag value does not parse.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid flag value: {0}")]
pub struct InvalidFlag(pub String);

impl FromStr for Unknown {
    type Err = InvalidFlag;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "error" => Ok(Unknown::Error),
            "fail" => Ok(Unknown::Fail),
            other => Err(InvalidFlag(String::from(other))),
        }
    }
}

/// Settings of an [`Engine`](crate::Engine).
///
/// `unknown` and `occurs_check` are visible to programs as the Prolog flags
/// of the same name; the arena sizes only tune the initial allocations.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    pub unknown: Unknown,
    /// Whether `=/2` and clause head unification use the occurs check.
    pub occurs_check: bool,
    /// Initial byte capacity of the working arena.
    pub arena_bytes: usize,
    /// Initial term capacity of the working arena.
    pub arena_terms: usize,
    /// Deepest nesting of goals a proof may reach before it raises
    /// `resource_error(stack)`.
    pub max_depth: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            unknown: Unknown::Error,
            occurs_check: false,
            arena_bytes: 4096,
            arena_terms: 1024,
            max_depth: 100_000,
        }
    }
}

impl EngineConfig {
    /// Names of the flags exposed through `current_prolog_flag/2`.
    pub const FLAGS: &[&str] = &["unknown", "occurs_check"];

    /// Current value of a flag, as an atom name.
    pub fn flag(&self, name: &str) -> Option<&'static str> {
        match name {
            "unknown" => Some(match self.unknown {
                Unknown::Error => "error",
                Unknown::Fail => "fail",
            }),
            "occurs_check" => Some(if self.occurs_check { "true" } else { "false" }),
            _ => None,
        }
    }

    /// Sets a flag from an atom name.  Returns `Ok(false)` for an unknown
    /// flag name.
    pub fn set_flag(&mut self, name: &str, value: &str) -> Result<bool, InvalidFlag> {
        match name {
            "unknown" => self.unknown = value.parse()?,
            "occurs_check" => {
                self.occurs_check = match value {
                    "true" => true,
                    "false" => false,
                    other => return Err(InvalidFlag(String::from(other))),
                }
            }
            _ => return Ok(false),
        }
        Ok(true)
    }
}
