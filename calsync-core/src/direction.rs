//! Which provider is which, and which way changes may flow.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CalSyncError;

/// One of the two synced providers. `A` is the "local" side of a diff
/// (the REST provider), `B` the "remote" side (the CalDAV provider).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    A,
    B,
}

impl Side {
    pub fn other(self) -> Side {
        match self {
            Side::A => Side::B,
            Side::B => Side::A,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::A => write!(f, "a"),
            Side::B => write!(f, "b"),
        }
    }
}

impl FromStr for Side {
    type Err = CalSyncError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "a" => Ok(Side::A),
            "b" => Ok(Side::B),
            other => Err(CalSyncError::Config(format!(
                "Unknown side '{}'. Expected 'a' or 'b'",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncDirection {
    #[default]
    Both,
    AToB,
    BToA,
}

impl SyncDirection {
    /// Whether operations targeting `side` may run in this direction.
    pub fn allows(self, side: Side) -> bool {
        match self {
            SyncDirection::Both => true,
            SyncDirection::AToB => side == Side::B,
            SyncDirection::BToA => side == Side::A,
        }
    }

    /// The side that wins conflicts. One-way syncs always favor their origin;
    /// two-way syncs only have a winner when one was configured.
    pub fn winner(self, source_of_truth: Option<Side>) -> Option<Side> {
        match self {
            SyncDirection::Both => source_of_truth,
            SyncDirection::AToB => Some(Side::A),
            SyncDirection::BToA => Some(Side::B),
        }
    }
}

impl fmt::Display for SyncDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyncDirection::Both => write!(f, "both"),
            SyncDirection::AToB => write!(f, "a_to_b"),
            SyncDirection::BToA => write!(f, "b_to_a"),
        }
    }
}

impl FromStr for SyncDirection {
    type Err = CalSyncError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace('-', "_").as_str() {
            "both" => Ok(SyncDirection::Both),
            "a_to_b" => Ok(SyncDirection::AToB),
            "b_to_a" => Ok(SyncDirection::BToA),
            other => Err(CalSyncError::Config(format!(
                "Unknown sync direction '{}'. Expected both, a_to_b or b_to_a",
                other
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direction_gating() {
        assert!(SyncDirection::Both.allows(Side::A));
        assert!(SyncDirection::Both.allows(Side::B));
        assert!(SyncDirection::AToB.allows(Side::B));
        assert!(!SyncDirection::AToB.allows(Side::A));
        assert!(SyncDirection::BToA.allows(Side::A));
        assert!(!SyncDirection::BToA.allows(Side::B));
    }

    #[test]
    fn test_winner() {
        assert_eq!(SyncDirection::Both.winner(None), None);
        assert_eq!(SyncDirection::Both.winner(Some(Side::B)), Some(Side::B));
        assert_eq!(SyncDirection::AToB.winner(Some(Side::B)), Some(Side::A));
        assert_eq!(SyncDirection::BToA.winner(None), Some(Side::B));
    }

    #[test]
    fn test_parse_direction() {
        assert_eq!("a-to-b".parse::<SyncDirection>().unwrap(), SyncDirection::AToB);
        assert_eq!("BOTH".parse::<SyncDirection>().unwrap(), SyncDirection::Both);
        assert!("sideways".parse::<SyncDirection>().is_err());
    }
}
