//! Cluster member identifiers

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Unique identifier for a cluster member.
///
/// A `MemberId` is derived from the member's advertised peer URLs and the
/// cluster name, never assigned by hand. Its string form is the zero-padded
/// 16-digit lowercase-hex rendering used in directory store keys.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MemberId(u64);

/// Error returned when a string is not a valid member ID.
#[derive(Debug, thiserror::Error)]
#[error("invalid member ID {0:?}")]
pub struct InvalidMemberId(String);

impl MemberId {
    /// Get the raw numeric identity.
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl From<u64> for MemberId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl fmt::Display for MemberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

impl FromStr for MemberId {
    type Err = InvalidMemberId;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        u64::from_str_radix(s, 16)
            .map(Self)
            .map_err(|_| InvalidMemberId(s.to_string()))
    }
}
