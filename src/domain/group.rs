//! Lifecycle groups
//!
//! Every devfile command belongs to at most one lifecycle phase. Commands
//! without a phase live in the [`GroupKind::None`] bucket.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum GroupParseError {
    #[error("Unknown group: {0:?}")]
    UnknownGroup(String),
}

/// Lifecycle group of a command
///
/// The declaration order is the canonical order used when a grouped command
/// set is flattened back into a document.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum GroupKind {
    Build,
    Run,
    Test,
    Debug,
    Deploy,
    /// Only a bucket key; a devfile group block always names a real phase
    #[default]
    #[serde(skip_deserializing)]
    None,
}

impl GroupKind {
    /// All groups in canonical order
    pub const ALL: [GroupKind; 6] = [
        GroupKind::Build,
        GroupKind::Run,
        GroupKind::Test,
        GroupKind::Debug,
        GroupKind::Deploy,
        GroupKind::None,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            GroupKind::Build => "build",
            GroupKind::Run => "run",
            GroupKind::Test => "test",
            GroupKind::Debug => "debug",
            GroupKind::Deploy => "deploy",
            GroupKind::None => "none",
        }
    }

    /// Returns true for the ungrouped bucket
    pub fn is_none(&self) -> bool {
        matches!(self, GroupKind::None)
    }
}

impl fmt::Display for GroupKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for GroupKind {
    type Err = GroupParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "build" => Ok(GroupKind::Build),
            "run" => Ok(GroupKind::Run),
            "test" => Ok(GroupKind::Test),
            "debug" => Ok(GroupKind::Debug),
            "deploy" => Ok(GroupKind::Deploy),
            // The editor sends an empty string for ungrouped commands
            "" | "none" | "other" => Ok(GroupKind::None),
            _ => Err(GroupParseError::UnknownGroup(s.to_string())),
        }
    }
}
