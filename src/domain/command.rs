//! Command domain model
//!
//! A [`Command`] is the engine's view of a devfile command: its id, what kind
//! of command it is, and the lifecycle group it sits in. Everything else in
//! the document (command lines, components) is opaque here.

use std::collections::BTreeMap;

use serde::Serialize;

use super::group::GroupKind;

/// Kind of a command
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "type")]
pub enum CommandKind {
    Exec,
    Apply,
    /// Runs other commands, one after another or all at once
    Composite { children: Vec<String>, parallel: bool },
}

impl CommandKind {
    pub fn label(&self) -> &'static str {
        match self {
            CommandKind::Exec => "exec",
            CommandKind::Apply => "apply",
            CommandKind::Composite { .. } => "composite",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Command {
    pub id: String,
    #[serde(flatten)]
    pub kind: CommandKind,
    pub group: GroupKind,
    pub is_default: bool,
}

impl Command {
    pub fn exec(id: impl Into<String>) -> Self {
        Self::new(id, CommandKind::Exec)
    }

    pub fn apply(id: impl Into<String>) -> Self {
        Self::new(id, CommandKind::Apply)
    }

    pub fn composite<I, S>(id: impl Into<String>, children: I, parallel: bool) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(
            id,
            CommandKind::Composite {
                children: children.into_iter().map(Into::into).collect(),
                parallel,
            },
        )
    }

    fn new(id: impl Into<String>, kind: CommandKind) -> Self {
        Self {
            id: id.into(),
            kind,
            group: GroupKind::None,
            is_default: false,
        }
    }

    /// Places the command in a group
    pub fn in_group(mut self, group: GroupKind) -> Self {
        self.group = group;
        self
    }

    /// Marks the command as its group's default
    pub fn as_default(mut self) -> Self {
        self.is_default = true;
        self
    }

    pub fn is_composite(&self) -> bool {
        matches!(self.kind, CommandKind::Composite { .. })
    }

    /// Ids of the commands this one runs (empty unless composite)
    pub fn children(&self) -> &[String] {
        match &self.kind {
            CommandKind::Composite { children, .. } => children,
            _ => &[],
        }
    }

    /// True only for parallel composites
    pub fn is_parallel(&self) -> bool {
        matches!(self.kind, CommandKind::Composite { parallel: true, .. })
    }
}

/// Commands bucketed by lifecycle group, each bucket in display order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct GroupedCommandSet(BTreeMap<GroupKind, Vec<Command>>);

impl GroupedCommandSet {
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Commands of a group, empty if the group has no bucket
    pub fn get(&self, group: GroupKind) -> &[Command] {
        self.0.get(&group).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Returns true if the group has a bucket, even an empty one
    pub fn contains_group(&self, group: GroupKind) -> bool {
        self.0.contains_key(&group)
    }

    pub(crate) fn bucket_mut(&mut self, group: GroupKind) -> &mut Vec<Command> {
        self.0.entry(group).or_default()
    }

    /// Groups that have a bucket, in canonical order
    pub fn groups(&self) -> impl Iterator<Item = GroupKind> + '_ {
        self.0.keys().copied()
    }

    /// Iterates over buckets in canonical group order
    pub fn iter(&self) -> impl Iterator<Item = (GroupKind, &[Command])> {
        self.0.iter().map(|(group, cmds)| (*group, cmds.as_slice()))
    }

    /// Total number of commands across all buckets
    pub fn len(&self) -> usize {
        self.0.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// All commands, group by group, each bucket in its own order
    pub fn flatten(self) -> Vec<Command> {
        self.0.into_values().flatten().collect()
    }
}

impl FromIterator<(GroupKind, Vec<Command>)> for GroupedCommandSet {
    fn from_iter<T: IntoIterator<Item = (GroupKind, Vec<Command>)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Buckets commands by their own group, preserving input order
pub fn group_commands<I>(commands: I) -> GroupedCommandSet
where
    I: IntoIterator<Item = Command>,
{
    let mut set = GroupedCommandSet::new();
    for command in commands {
        set.bucket_mut(command.group).push(command);
    }
    set
}
