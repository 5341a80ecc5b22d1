//! Devfile YAML document
//!
//! Only the parts the engine touches are typed: commands, components and
//! events. Metadata and any other top-level key are carried through
//! untouched so a round trip never drops data.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::component::DevfileComponent;
use crate::domain::{Command, CommandKind, GroupKind};

/// The minimal document a fresh buffer starts from
pub const DEFAULT_DEVFILE: &str = "schemaVersion: 2.2.0\n";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Devfile {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub commands: Vec<DevfileCommand>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub components: Vec<DevfileComponent>,

    #[serde(default, skip_serializing_if = "Events::is_empty")]
    pub events: Events,

    #[serde(default)]
    pub metadata: serde_yaml::Mapping,

    pub schema_version: String,

    /// Top-level keys the engine does not interpret (projects, variables...)
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_yaml::Value>,
}

impl Devfile {
    /// Parses a devfile from YAML text
    pub fn parse(text: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(text)
    }

    /// Serializes the devfile back to YAML text
    pub fn to_yaml(&self) -> Result<String, serde_yaml::Error> {
        serde_yaml::to_string(self)
    }

    /// Engine view of the commands, in document order
    pub fn domain_commands(&self) -> Vec<Command> {
        self.commands.iter().map(DevfileCommand::to_command).collect()
    }

    pub fn command(&self, id: &str) -> Option<&DevfileCommand> {
        self.commands.iter().find(|c| c.id == id)
    }

    pub fn command_mut(&mut self, id: &str) -> Option<&mut DevfileCommand> {
        self.commands.iter_mut().find(|c| c.id == id)
    }

    pub fn component(&self, name: &str) -> Option<&DevfileComponent> {
        self.components.iter().find(|c| c.name == name)
    }

    /// Exec and apply commands that run on a component
    pub fn commands_on(&self, component: &str) -> impl Iterator<Item = &DevfileCommand> + '_ {
        let component = component.to_string();
        self.commands
            .iter()
            .filter(move |c| c.component() == Some(component.as_str()))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DevfileCommand {
    #[serde(flatten)]
    pub body: CommandBody,

    pub id: String,

    /// Command-level keys besides the union (`attributes`...)
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_yaml::Value>,
}

/// The command union: exactly one of `apply`, `composite` or `exec`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommandBody {
    Apply(ApplyCommand),
    Composite(CompositeCommand),
    Exec(ExecCommand),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecCommand {
    pub command_line: String,

    pub component: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<CommandGroup>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hot_reload_capable: Option<bool>,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub working_dir: String,

    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_yaml::Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplyCommand {
    pub component: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<CommandGroup>,

    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_yaml::Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompositeCommand {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub commands: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<CommandGroup>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parallel: Option<bool>,

    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_yaml::Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandGroup {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_default: Option<bool>,

    pub kind: GroupKind,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Events {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub post_start: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub post_stop: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub pre_start: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub pre_stop: Vec<String>,
}

impl Events {
    pub fn is_empty(&self) -> bool {
        self.post_start.is_empty()
            && self.post_stop.is_empty()
            && self.pre_start.is_empty()
            && self.pre_stop.is_empty()
    }

    /// Iterates over `(event name, command ids)` pairs
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &[String])> {
        [
            ("preStart", self.pre_start.as_slice()),
            ("postStart", self.post_start.as_slice()),
            ("preStop", self.pre_stop.as_slice()),
            ("postStop", self.post_stop.as_slice()),
        ]
        .into_iter()
    }

    /// Command list of an event, by its devfile name
    pub fn get_mut(&mut self, event: &str) -> Option<&mut Vec<String>> {
        match event {
            "preStart" => Some(&mut self.pre_start),
            "postStart" => Some(&mut self.post_start),
            "preStop" => Some(&mut self.pre_stop),
            "postStop" => Some(&mut self.post_stop),
            _ => None,
        }
    }

    /// Returns the first event that runs the command
    pub fn referencing(&self, id: &str) -> Option<&'static str> {
        self.iter()
            .find(|(_, commands)| commands.iter().any(|c| c == id))
            .map(|(event, _)| event)
    }
}

impl DevfileCommand {
    pub fn exec(
        id: impl Into<String>,
        component: impl Into<String>,
        command_line: impl Into<String>,
        working_dir: impl Into<String>,
        hot_reload_capable: bool,
    ) -> Self {
        Self {
            body: CommandBody::Exec(ExecCommand {
                command_line: command_line.into(),
                component: component.into(),
                group: None,
                hot_reload_capable: Some(hot_reload_capable),
                working_dir: working_dir.into(),
                extra: BTreeMap::new(),
            }),
            id: id.into(),
            extra: BTreeMap::new(),
        }
    }

    pub fn apply(id: impl Into<String>, component: impl Into<String>) -> Self {
        Self {
            body: CommandBody::Apply(ApplyCommand {
                component: component.into(),
                group: None,
                extra: BTreeMap::new(),
            }),
            id: id.into(),
            extra: BTreeMap::new(),
        }
    }

    pub fn composite(id: impl Into<String>, parallel: bool, commands: Vec<String>) -> Self {
        Self {
            body: CommandBody::Composite(CompositeCommand {
                commands,
                group: None,
                parallel: Some(parallel),
                extra: BTreeMap::new(),
            }),
            id: id.into(),
            extra: BTreeMap::new(),
        }
    }

    fn group_slot(&self) -> &Option<CommandGroup> {
        match &self.body {
            CommandBody::Apply(apply) => &apply.group,
            CommandBody::Composite(composite) => &composite.group,
            CommandBody::Exec(exec) => &exec.group,
        }
    }

    fn group_slot_mut(&mut self) -> &mut Option<CommandGroup> {
        match &mut self.body {
            CommandBody::Apply(apply) => &mut apply.group,
            CommandBody::Composite(composite) => &mut composite.group,
            CommandBody::Exec(exec) => &mut exec.group,
        }
    }

    /// Lifecycle group, [`GroupKind::None`] when the command has none
    pub fn group(&self) -> GroupKind {
        self.group_slot()
            .as_ref()
            .map(|g| g.kind)
            .unwrap_or(GroupKind::None)
    }

    pub fn is_default(&self) -> bool {
        self.group_slot()
            .as_ref()
            .and_then(|g| g.is_default)
            .unwrap_or(false)
    }

    /// Returns true if the document spells out `isDefault` for this command
    pub fn has_default_flag(&self) -> bool {
        self.group_slot()
            .as_ref()
            .is_some_and(|g| g.is_default.is_some())
    }

    /// Moves the command to a group, keeping an existing default flag
    pub fn set_group(&mut self, kind: GroupKind) {
        let slot = self.group_slot_mut();
        if kind.is_none() {
            *slot = None;
            return;
        }
        slot.get_or_insert(CommandGroup {
            is_default: None,
            kind,
        })
        .kind = kind;
    }

    /// Sets the default flag; ungrouped commands have nowhere to store it
    pub fn set_default(&mut self, is_default: bool) -> bool {
        match self.group_slot_mut() {
            Some(group) => {
                group.is_default = Some(is_default);
                true
            }
            None => false,
        }
    }

    /// Component an exec or apply command runs on
    pub fn component(&self) -> Option<&str> {
        match &self.body {
            CommandBody::Exec(exec) => Some(&exec.component),
            CommandBody::Apply(apply) => Some(&apply.component),
            CommandBody::Composite(_) => None,
        }
    }

    /// Command ids a composite runs
    pub fn children(&self) -> &[String] {
        match &self.body {
            CommandBody::Composite(composite) => &composite.commands,
            _ => &[],
        }
    }

    pub fn to_command(&self) -> Command {
        let kind = match &self.body {
            CommandBody::Exec(_) => CommandKind::Exec,
            CommandBody::Apply(_) => CommandKind::Apply,
            CommandBody::Composite(composite) => CommandKind::Composite {
                children: composite.commands.clone(),
                parallel: composite.parallel.unwrap_or(false),
            },
        };
        Command {
            id: self.id.clone(),
            kind,
            group: self.group(),
            is_default: self.is_default(),
        }
    }
}
