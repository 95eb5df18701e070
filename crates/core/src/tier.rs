//! The confidentiality tier lattice.
//!
//! Three totally ordered tiers gate every chunk and every grant:
//! `public(0) < friends(1) < intimate(2)`. Access is cumulative — holding
//! `friends` implies `public`, holding `intimate` implies both.
//!
//! [`Tier::resolve`] is the single chokepoint preventing privilege
//! escalation: the effective ceiling for a request is always the lesser of
//! what the viewer holds and what they asked for. Asking above the grant
//! never raises access and never raises an error — it is clamped down.

use crate::error::Error;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    /// Visible to anyone, grant or no grant. The resolution floor.
    #[default]
    Public,
    /// Visible to viewers granted `friends` or above.
    Friends,
    /// Visible only to viewers granted `intimate` — and always to the owner.
    Intimate,
}

impl Tier {
    /// All tiers in ascending order. Small enough to enumerate in tests.
    pub const ALL: [Tier; 3] = [Tier::Public, Tier::Friends, Tier::Intimate];

    /// Ordinal rank: public(0) < friends(1) < intimate(2).
    pub const fn rank(self) -> u8 {
        match self {
            Tier::Public => 0,
            Tier::Friends => 1,
            Tier::Intimate => 2,
        }
    }

    pub const fn from_rank(rank: u8) -> Option<Tier> {
        match rank {
            0 => Some(Tier::Public),
            1 => Some(Tier::Friends),
            2 => Some(Tier::Intimate),
            _ => None,
        }
    }

    /// The effective access ceiling for a request: `min(granted, requested)`.
    pub fn resolve(granted: Tier, requested: Tier) -> Tier {
        granted.min(requested)
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Tier::Public => "public",
            Tier::Friends => "friends",
            Tier::Intimate => "intimate",
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Tier {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "public" => Ok(Tier::Public),
            "friends" => Ok(Tier::Friends),
            "intimate" => Ok(Tier::Intimate),
            other => Err(Error::validation(format!(
                "unknown tier '{other}' (expected public, friends, or intimate)"
            ))),
        }
    }
}
