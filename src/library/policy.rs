//! Ownership rules deciding which records an actor may see and change.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::domain::{Owned, UserId};

/// How records without an owner are treated
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OwnershipMode {
    /// Only the owner sees a record; unowned records are hidden from everyone
    #[default]
    Strict,

    /// Unowned (legacy) records are shared with every actor
    LegacyOpen,
}

impl fmt::Display for OwnershipMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OwnershipMode::Strict => write!(f, "strict"),
            OwnershipMode::LegacyOpen => write!(f, "legacy-open"),
        }
    }
}

impl FromStr for OwnershipMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s.to_lowercase().as_str() {
            "strict" => Ok(OwnershipMode::Strict),
            "legacy-open" | "legacy_open" | "legacy" | "open" => Ok(OwnershipMode::LegacyOpen),
            _ => anyhow::bail!("Unknown ownership mode: {}", s),
        }
    }
}

/// Pure visibility predicate over owned records
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OwnershipPolicy {
    mode: OwnershipMode,
}

impl OwnershipPolicy {
    pub fn new(mode: OwnershipMode) -> Self {
        Self { mode }
    }

    pub fn strict() -> Self {
        Self::new(OwnershipMode::Strict)
    }

    pub fn legacy_open() -> Self {
        Self::new(OwnershipMode::LegacyOpen)
    }

    pub fn mode(&self) -> OwnershipMode {
        self.mode
    }

    /// Whether `actor` may see `record`
    pub fn visible<R: Owned + ?Sized>(&self, actor: &UserId, record: &R) -> bool {
        match (record.owner_id(), self.mode) {
            (Some(owner), _) => owner == actor,
            (None, OwnershipMode::LegacyOpen) => true,
            (None, OwnershipMode::Strict) => false,
        }
    }

    /// Whether `actor` may change `record` (ownership grants both)
    pub fn mutable<R: Owned + ?Sized>(&self, actor: &UserId, record: &R) -> bool {
        self.visible(actor, record)
    }
}
