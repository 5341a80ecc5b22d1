//! Devfile editing state
//!
//! [`DevfileState`] owns the serialized devfile. Every operation parses the
//! current text, applies one change, and serializes the result. The stored
//! text is replaced only when all three steps succeed.

use std::collections::HashMap;

use thiserror::Error;
use tracing::{debug, warn};

use super::content::DevfileContent;
use crate::devfile::{
    AutoPolicy, CommandBody, ComponentBody, ContainerComponent, Devfile, DevfileCommand,
    DevfileComponent, DockerfileImage, EnvVar, ImageComponent, KubernetesComponent,
    VolumeComponent, VolumeMount, DEFAULT_DEVFILE,
};
use crate::domain::{
    build_graph, expand_composite, move_command_with, render_flowchart, DestinationPolicy,
    ExpandError, GraphError, GroupKind, GroupParseError, GroupedCommandSet, LabelOverrides, Move,
    MoveError,
};

#[derive(Debug, Error)]
pub enum StateError {
    #[error("Failed to parse devfile")]
    Parse(#[source] serde_yaml::Error),

    #[error("Failed to serialize devfile")]
    Serialize(#[source] serde_yaml::Error),

    #[error(transparent)]
    UnknownGroup(#[from] GroupParseError),

    #[error("Command not found: {0}")]
    UnknownCommand(String),

    #[error("Command already exists: {0}")]
    DuplicateCommand(String),

    #[error("Command {command} is not in group {group}")]
    NotInGroup { command: String, group: GroupKind },

    #[error("Command {command} is used by {user}")]
    CommandInUse { command: String, user: String },

    #[error("No {kind} component named {name}")]
    UnknownComponent { kind: &'static str, name: String },

    #[error("Component already exists: {0}")]
    DuplicateComponent(String),

    #[error("Component {component} is used by {user}")]
    ComponentInUse { component: String, user: String },

    #[error("Resource {0} cannot be both inlined and loaded from a uri")]
    ConflictingResourceSource(String),

    #[error("Unknown event: {0} (expected preStart, postStart, preStop or postStop)")]
    UnknownEvent(String),

    #[error(transparent)]
    Move(#[from] MoveError),

    #[error(transparent)]
    Expand(#[from] ExpandError),

    #[error(transparent)]
    Graph(#[from] GraphError),
}

/// Settings of a new container component
#[derive(Debug, Clone, Default)]
pub struct ContainerSpec {
    pub image: String,
    pub command: Vec<String>,
    pub args: Vec<String>,
    pub env: Vec<EnvVar>,
    pub memory_request: String,
    pub memory_limit: String,
    pub cpu_request: String,
    pub cpu_limit: String,
    pub volume_mounts: Vec<VolumeMount>,
    /// `Some` writes `mountSources`, and `sourceMapping` along with it
    pub mount_sources: Option<bool>,
    pub source_mapping: String,
}

/// Settings of a new image component built from a Dockerfile
#[derive(Debug, Clone, Default)]
pub struct ImageSpec {
    pub image_name: String,
    pub args: Vec<String>,
    pub build_context: String,
    pub root_required: bool,
    pub uri: String,
    pub auto_build: AutoPolicy,
}

/// How flowchart nodes are labelled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LabelStyle {
    /// The command id only
    #[default]
    Plain,
    /// Id, what the command does, and its group
    Detailed,
}

/// The devfile being edited
#[derive(Debug, Clone)]
pub struct DevfileState {
    content: String,
    policy: DestinationPolicy,
}

impl Default for DevfileState {
    fn default() -> Self {
        Self::new()
    }
}

impl DevfileState {
    /// Creates a state holding the minimal default devfile
    pub fn new() -> Self {
        Self {
            content: DEFAULT_DEVFILE.to_string(),
            policy: DestinationPolicy::default(),
        }
    }

    /// Creates a state from existing devfile text
    pub fn from_content(text: &str) -> Result<Self, StateError> {
        let mut state = Self::new();
        state.set_content(text)?;
        Ok(state)
    }

    /// Sets how moves past the end of a group are handled
    pub fn with_policy(mut self, policy: DestinationPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// The current serialized devfile
    pub fn content(&self) -> &str {
        &self.content
    }

    fn load(&self) -> Result<Devfile, StateError> {
        Devfile::parse(&self.content).map_err(StateError::Parse)
    }

    /// Applies `change` to a freshly parsed document and commits the result
    fn commit<F>(&mut self, operation: &str, change: F) -> Result<DevfileContent, StateError>
    where
        F: FnOnce(&mut Devfile) -> Result<(), StateError>,
    {
        let mut devfile = self.load()?;
        if let Err(e) = change(&mut devfile) {
            warn!(operation, error = %e, "devfile left unchanged");
            return Err(e);
        }

        let text = devfile.to_yaml().map_err(StateError::Serialize)?;
        debug!(operation, bytes = text.len(), "devfile updated");
        self.content = text.clone();
        Ok(DevfileContent::new(text, &devfile))
    }

    /// Returns the current document and its flat command view
    pub fn get_content(&self) -> Result<DevfileContent, StateError> {
        let devfile = self.load()?;
        let text = devfile.to_yaml().map_err(StateError::Serialize)?;
        Ok(DevfileContent::new(text, &devfile))
    }

    /// Replaces the whole document
    pub fn set_content(&mut self, text: &str) -> Result<DevfileContent, StateError> {
        let devfile = Devfile::parse(text).map_err(StateError::Parse)?;
        self.commit("set_content", |current| {
            *current = devfile;
            Ok(())
        })
    }

    /// Restores the minimal default document
    pub fn reset(&mut self) -> Result<DevfileContent, StateError> {
        self.set_content(DEFAULT_DEVFILE)
    }

    /// Commands bucketed by lifecycle group
    pub fn grouped_commands(&self) -> Result<GroupedCommandSet, StateError> {
        let devfile = self.load()?;
        Ok(crate::domain::group_commands(devfile.domain_commands()))
    }

    /// Moves the command at `from_index` of `from_group` to `to_index` of `to_group`
    ///
    /// The document's command list is rewritten group by group, in the
    /// canonical group order, so the new position sticks.
    pub fn move_command(
        &mut self,
        from_group: &str,
        to_group: &str,
        from_index: usize,
        to_index: usize,
    ) -> Result<DevfileContent, StateError> {
        let mv = Move::new(from_group.parse()?, to_group.parse()?, from_index, to_index);
        let policy = self.policy;

        self.commit("move_command", |devfile| {
            let grouped = move_command_with(devfile.domain_commands(), mv, policy)?;

            let mut by_id: HashMap<String, DevfileCommand> = HashMap::new();
            for command in devfile.commands.drain(..) {
                let id = command.id.clone();
                if by_id.insert(id.clone(), command).is_some() {
                    return Err(StateError::DuplicateCommand(id));
                }
            }

            for command in grouped.flatten() {
                let mut doc_command = by_id
                    .remove(&command.id)
                    .ok_or_else(|| StateError::UnknownCommand(command.id.clone()))?;
                doc_command.set_group(command.group);
                devfile.commands.push(doc_command);
            }
            Ok(())
        })
    }

    /// Makes a command the default of its group
    ///
    /// Other commands of the group that carry a default flag lose it.
    pub fn set_default_command(
        &mut self,
        name: &str,
        group: &str,
    ) -> Result<DevfileContent, StateError> {
        let group: GroupKind = group.parse()?;

        self.commit("set_default_command", |devfile| {
            let command = devfile
                .command(name)
                .ok_or_else(|| StateError::UnknownCommand(name.to_string()))?;
            if group.is_none() || command.group() != group {
                return Err(StateError::NotInGroup {
                    command: name.to_string(),
                    group,
                });
            }

            for command in devfile.commands.iter_mut().filter(|c| c.group() == group) {
                if command.id == name {
                    command.set_default(true);
                } else if command.has_default_flag() {
                    command.set_default(false);
                }
            }
            Ok(())
        })
    }

    /// Clears the default flag of a command
    pub fn unset_default_command(&mut self, name: &str) -> Result<DevfileContent, StateError> {
        self.commit("unset_default_command", |devfile| {
            let command = devfile
                .command_mut(name)
                .ok_or_else(|| StateError::UnknownCommand(name.to_string()))?;
            let group = command.group();
            if !command.set_default(false) {
                return Err(StateError::NotInGroup {
                    command: name.to_string(),
                    group,
                });
            }
            Ok(())
        })
    }

    pub fn add_exec_command(
        &mut self,
        name: &str,
        component: &str,
        command_line: &str,
        working_dir: &str,
        hot_reload_capable: bool,
    ) -> Result<DevfileContent, StateError> {
        let command = DevfileCommand::exec(name, component, command_line, working_dir, hot_reload_capable);
        self.commit("add_exec_command", |devfile| add_command(devfile, command))
    }

    pub fn add_apply_command(
        &mut self,
        name: &str,
        component: &str,
    ) -> Result<DevfileContent, StateError> {
        let command = DevfileCommand::apply(name, component);
        self.commit("add_apply_command", |devfile| add_command(devfile, command))
    }

    /// Adds a composite running `commands`, which must already exist
    pub fn add_composite_command(
        &mut self,
        name: &str,
        parallel: bool,
        commands: &[String],
    ) -> Result<DevfileContent, StateError> {
        let command = DevfileCommand::composite(name, parallel, commands.to_vec());
        self.commit("add_composite_command", |devfile| {
            for child in commands {
                if devfile.command(child).is_none() {
                    return Err(StateError::UnknownCommand(child.clone()));
                }
            }
            add_command(devfile, command)?;
            expand_composite(&devfile.domain_commands())?;
            Ok(())
        })
    }

    /// Deletes a command nothing else refers to
    pub fn delete_command(&mut self, name: &str) -> Result<DevfileContent, StateError> {
        self.commit("delete_command", |devfile| {
            let pos = devfile
                .commands
                .iter()
                .position(|c| c.id == name)
                .ok_or_else(|| StateError::UnknownCommand(name.to_string()))?;

            if let Some(parent) = devfile
                .commands
                .iter()
                .find(|c| c.children().iter().any(|child| child == name))
            {
                return Err(StateError::CommandInUse {
                    command: name.to_string(),
                    user: format!("composite command {}", parent.id),
                });
            }
            if let Some(event) = devfile.events.referencing(name) {
                return Err(StateError::CommandInUse {
                    command: name.to_string(),
                    user: format!("event {}", event),
                });
            }

            devfile.commands.remove(pos);
            Ok(())
        })
    }

    /// Replaces the commands run on a lifecycle event
    pub fn update_events(
        &mut self,
        event: &str,
        commands: &[String],
    ) -> Result<DevfileContent, StateError> {
        self.commit("update_events", |devfile| {
            for command in commands {
                if devfile.command(command).is_none() {
                    return Err(StateError::UnknownCommand(command.clone()));
                }
            }
            let slot = devfile
                .events
                .get_mut(event)
                .ok_or_else(|| StateError::UnknownEvent(event.to_string()))?;
            *slot = commands.to_vec();
            Ok(())
        })
    }

    pub fn add_container(
        &mut self,
        name: &str,
        spec: ContainerSpec,
    ) -> Result<DevfileContent, StateError> {
        let source_mapping = if spec.mount_sources.is_some() {
            spec.source_mapping
        } else {
            String::new()
        };
        let component = DevfileComponent::new(
            name,
            ComponentBody::Container(ContainerComponent {
                args: spec.args,
                command: spec.command,
                cpu_limit: spec.cpu_limit,
                cpu_request: spec.cpu_request,
                env: spec.env,
                image: spec.image,
                memory_limit: spec.memory_limit,
                memory_request: spec.memory_request,
                mount_sources: spec.mount_sources,
                source_mapping,
                volume_mounts: spec.volume_mounts,
                extra: Default::default(),
            }),
        );
        self.commit("add_container", |devfile| add_component(devfile, component))
    }

    pub fn add_image(&mut self, name: &str, spec: ImageSpec) -> Result<DevfileContent, StateError> {
        let component = DevfileComponent::new(
            name,
            ComponentBody::Image(ImageComponent {
                auto_build: spec.auto_build.as_flag(),
                dockerfile: Some(DockerfileImage {
                    args: spec.args,
                    build_context: spec.build_context,
                    root_required: Some(spec.root_required),
                    uri: spec.uri,
                    extra: Default::default(),
                }),
                image_name: spec.image_name,
                extra: Default::default(),
            }),
        );
        self.commit("add_image", |devfile| add_component(devfile, component))
    }

    /// Adds a Kubernetes resource, given either inline or by uri
    pub fn add_resource(
        &mut self,
        name: &str,
        inlined: &str,
        uri: &str,
        deploy_by_default: AutoPolicy,
    ) -> Result<DevfileContent, StateError> {
        let component = DevfileComponent::new(
            name,
            ComponentBody::Kubernetes(KubernetesComponent {
                deploy_by_default: deploy_by_default.as_flag(),
                inlined: inlined.to_string(),
                uri: uri.to_string(),
                extra: Default::default(),
            }),
        );
        self.commit("add_resource", |devfile| {
            if !inlined.is_empty() && !uri.is_empty() {
                return Err(StateError::ConflictingResourceSource(name.to_string()));
            }
            add_component(devfile, component)
        })
    }

    pub fn add_volume(
        &mut self,
        name: &str,
        ephemeral: bool,
        size: &str,
    ) -> Result<DevfileContent, StateError> {
        let component = DevfileComponent::new(
            name,
            ComponentBody::Volume(VolumeComponent {
                ephemeral: Some(ephemeral),
                size: size.to_string(),
                extra: Default::default(),
            }),
        );
        self.commit("add_volume", |devfile| add_component(devfile, component))
    }

    /// Deletes a container no exec command runs on
    pub fn delete_container(&mut self, name: &str) -> Result<DevfileContent, StateError> {
        self.commit("delete_container", |devfile| {
            delete_component(devfile, "container", name, |body| {
                matches!(body, ComponentBody::Container(_))
            })
        })
    }

    /// Deletes an image no apply command builds
    pub fn delete_image(&mut self, name: &str) -> Result<DevfileContent, StateError> {
        self.commit("delete_image", |devfile| {
            delete_component(devfile, "image", name, |body| {
                matches!(body, ComponentBody::Image(_))
            })
        })
    }

    /// Deletes a Kubernetes or OpenShift resource no apply command deploys
    pub fn delete_resource(&mut self, name: &str) -> Result<DevfileContent, StateError> {
        self.commit("delete_resource", |devfile| {
            delete_component(devfile, "resource", name, |body| {
                matches!(body, ComponentBody::Kubernetes(_) | ComponentBody::Openshift(_))
            })
        })
    }

    /// Deletes a volume no container mounts
    pub fn delete_volume(&mut self, name: &str) -> Result<DevfileContent, StateError> {
        self.commit("delete_volume", |devfile| {
            delete_component(devfile, "volume", name, |body| {
                matches!(body, ComponentBody::Volume(_))
            })
        })
    }

    /// Renders the command graph starting at `entry` as a flowchart
    pub fn flow_chart(&self, entry: &str, style: LabelStyle) -> Result<String, StateError> {
        let devfile = self.load()?;
        let labels = match style {
            LabelStyle::Plain => LabelOverrides::new(),
            LabelStyle::Detailed => detailed_labels(&devfile),
        };

        let graph = build_graph(&devfile.domain_commands(), entry, &labels)?;
        debug!(entry, nodes = graph.node_count(), edges = graph.edges().len(), "built flowchart");
        Ok(render_flowchart(&graph))
    }

    /// Stages of leaf commands a command runs, in order
    pub fn execution_plan(&self, name: &str) -> Result<Vec<Vec<String>>, StateError> {
        let devfile = self.load()?;
        if devfile.command(name).is_none() {
            return Err(StateError::UnknownCommand(name.to_string()));
        }
        let graph = expand_composite(&devfile.domain_commands())?;
        Ok(graph.execution_stages(name)?)
    }
}

fn add_command(devfile: &mut Devfile, command: DevfileCommand) -> Result<(), StateError> {
    if devfile.command(&command.id).is_some() {
        return Err(StateError::DuplicateCommand(command.id));
    }
    devfile.commands.push(command);
    Ok(())
}

fn add_component(devfile: &mut Devfile, component: DevfileComponent) -> Result<(), StateError> {
    if devfile.component(&component.name).is_some() {
        return Err(StateError::DuplicateComponent(component.name));
    }
    devfile.components.push(component);
    Ok(())
}

/// Removes the component `name` if it is of the expected kind and nothing
/// refers to it: no exec or apply command, and no container volume mount
fn delete_component<F>(
    devfile: &mut Devfile,
    kind: &'static str,
    name: &str,
    is_kind: F,
) -> Result<(), StateError>
where
    F: Fn(&ComponentBody) -> bool,
{
    let pos = devfile
        .components
        .iter()
        .position(|c| c.name == name && is_kind(&c.body))
        .ok_or_else(|| StateError::UnknownComponent {
            kind,
            name: name.to_string(),
        })?;

    if let Some(command) = devfile.commands_on(name).next() {
        let command_kind = match &command.body {
            CommandBody::Exec(_) => "exec",
            CommandBody::Apply(_) => "apply",
            CommandBody::Composite(_) => "composite",
        };
        return Err(StateError::ComponentInUse {
            component: name.to_string(),
            user: format!("{} command {}", command_kind, command.id),
        });
    }
    if let Some(container) = devfile
        .components
        .iter()
        .find(|c| c.volume_mounts().iter().any(|m| m.name == name))
    {
        return Err(StateError::ComponentInUse {
            component: name.to_string(),
            user: format!("container {}", container.name),
        });
    }

    devfile.components.remove(pos);
    Ok(())
}

fn detailed_labels(devfile: &Devfile) -> LabelOverrides {
    devfile
        .commands
        .iter()
        .map(|command| {
            let mut lines = vec![command.id.clone()];
            lines.push(match &command.body {
                CommandBody::Exec(exec) => format!("exec: {}", exec.command_line),
                CommandBody::Apply(apply) => format!("apply: {}", apply.component),
                CommandBody::Composite(composite) => {
                    if composite.parallel.unwrap_or(false) {
                        "composite (parallel)".to_string()
                    } else {
                        "composite (sequential)".to_string()
                    }
                }
            });

            let group = command.group();
            if !group.is_none() {
                if command.is_default() {
                    lines.push(format!("group: {} (default)", group));
                } else {
                    lines.push(format!("group: {}", group));
                }
            }
            (command.id.clone(), lines)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state_with_exec() -> DevfileState {
        let mut state = DevfileState::new();
        state
            .add_exec_command("an-exec-command", "a-container", "run command", "/path/to/work", true)
            .unwrap();
        state
    }

    fn names(content: &DevfileContent) -> Vec<&str> {
        content.commands.iter().map(|c| c.name.as_str()).collect()
    }

    #[test]
    fn new_state_holds_default_document() {
        let state = DevfileState::new();
        assert_eq!(state.content(), "schemaVersion: 2.2.0\n");

        let content = state.get_content().unwrap();
        assert_eq!(content.content, "metadata: {}\nschemaVersion: 2.2.0\n");
        assert!(content.commands.is_empty());
    }

    #[test]
    fn add_exec_command() {
        let state = state_with_exec();
        let content = state.get_content().unwrap();

        assert_eq!(
            content.content,
            concat!(
                "commands:\n",
                "- exec:\n",
                "    commandLine: run command\n",
                "    component: a-container\n",
                "    hotReloadCapable: true\n",
                "    workingDir: /path/to/work\n",
                "  id: an-exec-command\n",
                "metadata: {}\n",
                "schemaVersion: 2.2.0\n",
            )
        );
        assert_eq!(content.commands[0].kind, "exec");
        assert_eq!(content.commands[0].group, "");
    }

    #[test]
    fn duplicate_command_is_rejected_and_buffer_kept() {
        let mut state = state_with_exec();
        let before = state.content().to_string();

        let err = state.add_apply_command("an-exec-command", "k8s").unwrap_err();
        assert!(matches!(err, StateError::DuplicateCommand(_)));
        assert_eq!(state.content(), before);
    }

    #[test]
    fn move_from_no_group_to_run() {
        let mut state = state_with_exec();

        let content = state.move_command("", "run", 0, 0).unwrap();
        assert!(content.content.contains("    group:\n      kind: run\n"));
        assert_eq!(content.commands[0].group, "run");
        assert!(!content.commands[0].default);
    }

    #[test]
    fn move_on_empty_document_fails() {
        let mut state = DevfileState::new();

        let err = state.move_command("build", "run", 0, 0).unwrap_err();
        assert!(matches!(
            err,
            StateError::Move(MoveError::IndexOutOfRange {
                group: GroupKind::Build,
                index: 0
            })
        ));
        assert_eq!(state.content(), DEFAULT_DEVFILE);
    }

    #[test]
    fn move_with_unknown_group_fails() {
        let mut state = state_with_exec();
        let err = state.move_command("", "release", 0, 0).unwrap_err();
        assert!(matches!(err, StateError::UnknownGroup(_)));
    }

    #[test]
    fn move_rewrites_commands_in_group_order() {
        let mut state = DevfileState::new();
        state.add_exec_command("b1", "c", "make", "", false).unwrap();
        state.add_exec_command("b2", "c", "make", "", false).unwrap();
        state.add_exec_command("r1", "c", "run", "", false).unwrap();
        state.move_command("", "build", 0, 0).unwrap();
        state.move_command("", "build", 0, 1).unwrap();
        state.move_command("", "run", 0, 0).unwrap();

        let content = state.move_command("run", "build", 0, 0).unwrap();
        assert_eq!(names(&content), vec!["r1", "b1", "b2"]);
        assert!(content.commands.iter().all(|c| c.group == "build"));
    }

    #[test]
    fn move_keeps_command_attributes() {
        let text = r#"schemaVersion: 2.2.0
commands:
- id: build
  attributes:
    owner: team-a
  exec:
    component: runtime
    commandLine: make
- id: run
  exec:
    component: runtime
    commandLine: ./app
"#;
        let mut state = DevfileState::from_content(text).unwrap();

        let content = state.move_command("none", "build", 0, 0).unwrap();
        assert!(content.content.contains("  attributes:\n    owner: team-a\n"));
        assert!(content.content.contains("      kind: build\n"));
        assert_eq!(content.commands[0].name, "build");
        assert_eq!(content.commands[0].group, "build");
    }

    #[test]
    fn clamp_policy_appends() {
        let mut state = DevfileState::new().with_policy(DestinationPolicy::Clamp);
        state.add_exec_command("a", "c", "x", "", false).unwrap();

        let content = state.move_command("", "test", 0, 9).unwrap();
        assert_eq!(content.commands[0].group, "test");
    }

    #[test]
    fn set_and_unset_default() {
        let mut state = state_with_exec();
        state.move_command("", "run", 0, 0).unwrap();

        let content = state.set_default_command("an-exec-command", "run").unwrap();
        assert!(content.content.contains("      isDefault: true\n      kind: run\n"));
        assert!(content.commands[0].default);

        let content = state.unset_default_command("an-exec-command").unwrap();
        assert!(content.content.contains("      isDefault: false\n      kind: run\n"));
        assert!(!content.commands[0].default);
    }

    #[test]
    fn set_default_clears_previous_default() {
        let mut state = DevfileState::new();
        state.add_exec_command("first", "c", "a", "", false).unwrap();
        state.add_exec_command("second", "c", "b", "", false).unwrap();
        state.move_command("", "run", 0, 0).unwrap();
        state.move_command("", "run", 0, 1).unwrap();
        state.set_default_command("first", "run").unwrap();

        let content = state.set_default_command("second", "run").unwrap();
        let defaults: Vec<_> = content.commands.iter().filter(|c| c.default).map(|c| c.name.as_str()).collect();
        assert_eq!(defaults, vec!["second"]);
    }

    #[test]
    fn set_default_requires_matching_group() {
        let mut state = state_with_exec();

        let err = state.set_default_command("an-exec-command", "run").unwrap_err();
        assert!(matches!(err, StateError::NotInGroup { .. }));

        let err = state.unset_default_command("an-exec-command").unwrap_err();
        assert!(matches!(err, StateError::NotInGroup { .. }));

        let err = state.set_default_command("ghost", "run").unwrap_err();
        assert!(matches!(err, StateError::UnknownCommand(_)));
    }

    #[test]
    fn add_composite_command() {
        let mut state = state_with_exec();

        let content = state
            .add_composite_command("a-composite-command", true, &["an-exec-command".to_string()])
            .unwrap();
        assert!(content.content.contains(concat!(
            "- composite:\n",
            "    commands:\n",
            "    - an-exec-command\n",
            "    parallel: true\n",
            "  id: a-composite-command\n",
        )));
        let composite = content.commands[1].composite.as_ref().unwrap();
        assert!(composite.parallel);
    }

    #[test]
    fn add_composite_with_unknown_child_fails() {
        let mut state = state_with_exec();
        let err = state
            .add_composite_command("all", false, &["missing".to_string()])
            .unwrap_err();
        assert!(matches!(err, StateError::UnknownCommand(ref id) if id == "missing"));
    }

    #[test]
    fn delete_command() {
        let mut state = state_with_exec();

        let content = state.delete_command("an-exec-command").unwrap();
        assert_eq!(content.content, "metadata: {}\nschemaVersion: 2.2.0\n");

        let err = state.delete_command("another-name").unwrap_err();
        assert!(matches!(err, StateError::UnknownCommand(_)));
    }

    #[test]
    fn delete_refuses_referenced_commands() {
        let mut state = state_with_exec();
        state
            .add_composite_command("all", false, &["an-exec-command".to_string()])
            .unwrap();

        let err = state.delete_command("an-exec-command").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Command an-exec-command is used by composite command all"
        );

        state.update_events("postStart", &["all".to_string()]).unwrap();
        let err = state.delete_command("all").unwrap_err();
        assert_eq!(err.to_string(), "Command all is used by event postStart");
    }

    #[test]
    fn update_events() {
        let mut state = state_with_exec();

        let content = state
            .update_events("preStop", &["an-exec-command".to_string()])
            .unwrap();
        assert!(content.content.contains("events:\n  preStop:\n  - an-exec-command\n"));
        assert_eq!(content.events.pre_stop, vec!["an-exec-command"]);

        assert!(matches!(
            state.update_events("onSave", &[]).unwrap_err(),
            StateError::UnknownEvent(_)
        ));
        assert!(matches!(
            state.update_events("preStart", &["ghost".to_string()]).unwrap_err(),
            StateError::UnknownCommand(_)
        ));
    }

    #[test]
    fn invalid_content_is_rejected() {
        let mut state = state_with_exec();
        let before = state.content().to_string();

        let err = state.set_content("commands: [").unwrap_err();
        assert!(matches!(err, StateError::Parse(_)));
        assert_eq!(state.content(), before);
    }

    #[test]
    fn cyclic_document_keeps_buffer_on_chart() {
        let text = r#"schemaVersion: 2.2.0
commands:
- id: a
  composite:
    commands: [b]
    group:
      kind: build
- id: b
  composite:
    commands: [a]
"#;
        let state = DevfileState::from_content(text).unwrap();
        let before = state.content().to_string();

        let err = state.flow_chart("a", LabelStyle::Plain).unwrap_err();
        assert!(matches!(err, StateError::Graph(GraphError::Expand(ExpandError::Cycle(_)))));
        assert_eq!(state.content(), before);
    }

    #[test]
    fn flow_chart_plain_and_detailed() {
        let mut state = state_with_exec();
        state.add_apply_command("deploy-k8s", "k8s").unwrap();
        state
            .add_composite_command(
                "all",
                false,
                &["an-exec-command".to_string(), "deploy-k8s".to_string()],
            )
            .unwrap();
        state.move_command("", "deploy", 2, 0).unwrap();
        state.set_default_command("all", "deploy").unwrap();

        let chart = state.flow_chart("all", LabelStyle::Plain).unwrap();
        assert_eq!(
            chart,
            concat!(
                "graph TB\n",
                "    id_all[\"all\"]\n",
                "    id_an-exec-command[\"an-exec-command\"]\n",
                "    id_deploy-k8s[\"deploy-k8s\"]\n",
                "    id_all -->|\"#1<br/>sequential\"| id_an-exec-command\n",
                "    id_all -->|\"#2<br/>sequential\"| id_deploy-k8s\n",
            )
        );

        let chart = state.flow_chart("all", LabelStyle::Detailed).unwrap();
        assert!(chart.contains("id_all[\"all<br/>composite (sequential)<br/>group: deploy (default)\"]"));
        assert!(chart.contains("id_an-exec-command[\"an-exec-command<br/>exec: run command\"]"));
    }

    #[test]
    fn flow_chart_unknown_entry() {
        let state = state_with_exec();
        let err = state.flow_chart("ghost", LabelStyle::Plain).unwrap_err();
        assert!(matches!(err, StateError::Graph(GraphError::UnknownEntry(_))));
    }

    #[test]
    fn execution_plan() {
        let mut state = state_with_exec();
        state.add_apply_command("deploy-k8s", "k8s").unwrap();
        state
            .add_composite_command(
                "all",
                true,
                &["an-exec-command".to_string(), "deploy-k8s".to_string()],
            )
            .unwrap();

        let plan = state.execution_plan("all").unwrap();
        assert_eq!(plan, vec![vec!["an-exec-command".to_string(), "deploy-k8s".to_string()]]);

        assert!(matches!(
            state.execution_plan("ghost").unwrap_err(),
            StateError::UnknownCommand(_)
        ));
    }

    #[test]
    fn reset_restores_default() {
        let mut state = state_with_exec();
        let content = state.reset().unwrap();
        assert!(content.commands.is_empty());
    }

    #[test]
    fn add_container() {
        let mut state = DevfileState::new();
        let content = state
            .add_container(
                "a-name",
                ContainerSpec {
                    image: "an-image".to_string(),
                    args: vec!["arg1".to_string()],
                    memory_request: "1Gi".to_string(),
                    memory_limit: "2Gi".to_string(),
                    cpu_request: "100m".to_string(),
                    cpu_limit: "200m".to_string(),
                    volume_mounts: vec![VolumeMount {
                        name: "vol1".to_string(),
                        path: "/mnt/volume1".to_string(),
                    }],
                    mount_sources: Some(false),
                    ..Default::default()
                },
            )
            .unwrap();

        assert_eq!(
            content.content,
            concat!(
                "components:\n",
                "- container:\n",
                "    args:\n",
                "    - arg1\n",
                "    cpuLimit: 200m\n",
                "    cpuRequest: 100m\n",
                "    image: an-image\n",
                "    memoryLimit: 2Gi\n",
                "    memoryRequest: 1Gi\n",
                "    mountSources: false\n",
                "    volumeMounts:\n",
                "    - name: vol1\n",
                "      path: /mnt/volume1\n",
                "  name: a-name\n",
                "metadata: {}\n",
                "schemaVersion: 2.2.0\n",
            )
        );
        assert_eq!(content.containers.len(), 1);
        assert_eq!(content.containers[0].image, "an-image");
        assert!(!content.containers[0].mount_sources);
    }

    #[test]
    fn source_mapping_needs_mount_sources() {
        let mut state = DevfileState::new();
        let content = state
            .add_container(
                "runtime",
                ContainerSpec {
                    image: "golang".to_string(),
                    source_mapping: "/src".to_string(),
                    ..Default::default()
                },
            )
            .unwrap();

        assert!(!content.content.contains("sourceMapping"));
        assert!(content.containers[0].mount_sources);
    }

    #[test]
    fn add_image_and_resource() {
        let mut state = DevfileState::new();
        state
            .add_image(
                "an-image",
                ImageSpec {
                    image_name: "quay.io/app".to_string(),
                    args: vec!["arg1".to_string()],
                    build_context: "/context".to_string(),
                    root_required: true,
                    uri: "Dockerfile".to_string(),
                    auto_build: AutoPolicy::Never,
                },
            )
            .unwrap();
        let content = state
            .add_resource("a-resource", "", "an-uri", AutoPolicy::Never)
            .unwrap();

        assert!(content.content.contains(concat!(
            "- image:\n",
            "    autoBuild: false\n",
            "    dockerfile:\n",
            "      args:\n",
            "      - arg1\n",
            "      buildContext: /context\n",
            "      rootRequired: true\n",
            "      uri: Dockerfile\n",
            "    imageName: quay.io/app\n",
            "  name: an-image\n",
        )));
        assert!(content.content.contains(concat!(
            "- kubernetes:\n",
            "    deployByDefault: false\n",
            "    uri: an-uri\n",
            "  name: a-resource\n",
        )));
        assert_eq!(content.images[0].image_name, "quay.io/app");
        assert!(content.images[0].root_required);
        assert_eq!(content.resources[0].uri, "an-uri");
    }

    #[test]
    fn resource_cannot_be_inlined_and_by_uri() {
        let mut state = DevfileState::new();
        let err = state
            .add_resource("a-resource", "kind: Deployment", "an-uri", AutoPolicy::Undefined)
            .unwrap_err();

        assert!(matches!(err, StateError::ConflictingResourceSource(_)));
        assert_eq!(state.content(), DEFAULT_DEVFILE);
    }

    #[test]
    fn add_volume() {
        let mut state = DevfileState::new();
        let content = state.add_volume("a-name", true, "1Gi").unwrap();

        assert!(content.content.contains("    ephemeral: true\n    size: 1Gi\n"));
        assert!(content.content.contains("  name: a-name\n"));
        assert_eq!(content.volumes[0].size, "1Gi");
        assert!(content.volumes[0].ephemeral);
    }

    #[test]
    fn component_names_are_unique_across_kinds() {
        let mut state = DevfileState::new();
        state.add_volume("shared", false, "1Gi").unwrap();

        let err = state
            .add_container(
                "shared",
                ContainerSpec {
                    image: "an-image".to_string(),
                    ..Default::default()
                },
            )
            .unwrap_err();
        assert!(matches!(err, StateError::DuplicateComponent(_)));
    }

    #[test]
    fn delete_container_used_by_exec_command() {
        let mut state = state_with_exec();
        state
            .add_container(
                "a-container",
                ContainerSpec {
                    image: "an-image".to_string(),
                    ..Default::default()
                },
            )
            .unwrap();
        let before = state.content().to_string();

        let err = state.delete_container("a-container").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Component a-container is used by exec command an-exec-command"
        );
        assert_eq!(state.content(), before);

        state.delete_command("an-exec-command").unwrap();
        let content = state.delete_container("a-container").unwrap();
        assert!(content.containers.is_empty());
    }

    #[test]
    fn delete_image_and_resource_used_by_apply_command() {
        let mut state = DevfileState::new();
        state
            .add_image(
                "an-image",
                ImageSpec {
                    image_name: "quay.io/app".to_string(),
                    ..Default::default()
                },
            )
            .unwrap();
        state.add_resource("k8s", "kind: Service", "", AutoPolicy::Undefined).unwrap();
        state.add_apply_command("build-image", "an-image").unwrap();
        state.add_apply_command("deploy-k8s", "k8s").unwrap();

        let err = state.delete_image("an-image").unwrap_err();
        assert!(matches!(err, StateError::ComponentInUse { .. }));
        let err = state.delete_resource("k8s").unwrap_err();
        assert_eq!(err.to_string(), "Component k8s is used by apply command deploy-k8s");

        state.delete_command("deploy-k8s").unwrap();
        let content = state.delete_resource("k8s").unwrap();
        assert!(content.resources.is_empty());
        assert_eq!(content.images.len(), 1);
    }

    #[test]
    fn delete_volume_mounted_by_container() {
        let mut state = DevfileState::new();
        state.add_volume("cache", true, "").unwrap();
        state
            .add_container(
                "runtime",
                ContainerSpec {
                    image: "an-image".to_string(),
                    volume_mounts: vec![VolumeMount {
                        name: "cache".to_string(),
                        path: "/cache".to_string(),
                    }],
                    ..Default::default()
                },
            )
            .unwrap();

        let err = state.delete_volume("cache").unwrap_err();
        assert_eq!(err.to_string(), "Component cache is used by container runtime");

        state.delete_container("runtime").unwrap();
        let content = state.delete_volume("cache").unwrap();
        assert!(content.volumes.is_empty());
    }

    #[test]
    fn delete_checks_component_kind() {
        let mut state = DevfileState::new();
        state.add_volume("data", false, "1Gi").unwrap();

        let err = state.delete_container("data").unwrap_err();
        assert_eq!(err.to_string(), "No container component named data");
        assert!(matches!(
            state.delete_volume("ghost").unwrap_err(),
            StateError::UnknownComponent { kind: "volume", .. }
        ));
        assert_eq!(state.get_content().unwrap().volumes.len(), 1);
    }
}
