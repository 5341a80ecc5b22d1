//! Moving commands between lifecycle groups
//!
//! A move takes a command out of one bucket and inserts it into another (or
//! the same) bucket, leaving the order of every other command untouched.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use super::command::{group_commands, Command, GroupedCommandSet};
use super::group::GroupKind;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MoveError {
    #[error("No command at index {index} in group {group}")]
    IndexOutOfRange { group: GroupKind, index: usize },

    #[error("Cannot insert at index {index} in group {group} ({len} commands)")]
    DestinationOutOfRange {
        group: GroupKind,
        index: usize,
        len: usize,
    },
}

/// What to do when the destination index is past the end of its group
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DestinationPolicy {
    /// Fail with [`MoveError::DestinationOutOfRange`]
    #[default]
    Reject,
    /// Append at the end of the group
    Clamp,
}

/// A request to relocate one command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Move {
    pub from_group: GroupKind,
    pub to_group: GroupKind,
    pub from_index: usize,
    pub to_index: usize,
}

impl Move {
    pub fn new(from_group: GroupKind, to_group: GroupKind, from_index: usize, to_index: usize) -> Self {
        Self {
            from_group,
            to_group,
            from_index,
            to_index,
        }
    }
}

/// Groups `commands` and applies the move with the default policy
pub fn move_command<I>(commands: I, mv: Move) -> Result<GroupedCommandSet, MoveError>
where
    I: IntoIterator<Item = Command>,
{
    move_command_with(commands, mv, DestinationPolicy::default())
}

/// Groups `commands` and applies the move
///
/// The source index is checked against the half-open range `0..len`. For a
/// move within one group the destination index refers to the group after the
/// command has been taken out of it.
pub fn move_command_with<I>(
    commands: I,
    mv: Move,
    policy: DestinationPolicy,
) -> Result<GroupedCommandSet, MoveError>
where
    I: IntoIterator<Item = Command>,
{
    let mut set = group_commands(commands);

    let source_len = set.get(mv.from_group).len();
    if mv.from_index >= source_len {
        return Err(MoveError::IndexOutOfRange {
            group: mv.from_group,
            index: mv.from_index,
        });
    }

    // Validate the destination before touching any bucket
    let dest_len = if mv.from_group == mv.to_group {
        source_len - 1
    } else {
        set.get(mv.to_group).len()
    };
    let to_index = match (mv.to_index > dest_len, policy) {
        (false, _) => mv.to_index,
        (true, DestinationPolicy::Clamp) => dest_len,
        (true, DestinationPolicy::Reject) => {
            return Err(MoveError::DestinationOutOfRange {
                group: mv.to_group,
                index: mv.to_index,
                len: dest_len,
            })
        }
    };

    let mut command = set.bucket_mut(mv.from_group).remove(mv.from_index);
    debug!(
        command = %command.id,
        from = %mv.from_group,
        to = %mv.to_group,
        index = to_index,
        "moving command"
    );
    command.group = mv.to_group;
    set.bucket_mut(mv.to_group).insert(to_index, command);

    Ok(set)
}
