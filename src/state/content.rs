//! Flat view of a devfile returned by every state operation

use serde::Serialize;

use crate::devfile::{
    CommandBody, ComponentBody, Devfile, DevfileCommand, EnvVar, Events, VolumeMount,
};

/// The serialized document together with a flat view of its commands and
/// components
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DevfileContent {
    pub content: String,
    pub commands: Vec<CommandView>,
    pub containers: Vec<ContainerView>,
    pub images: Vec<ImageView>,
    pub resources: Vec<ResourceView>,
    pub volumes: Vec<VolumeView>,
    pub events: Events,
}

impl DevfileContent {
    pub(crate) fn new(content: String, devfile: &Devfile) -> Self {
        let mut view = Self {
            content,
            commands: devfile.commands.iter().map(CommandView::from).collect(),
            containers: Vec::new(),
            images: Vec::new(),
            resources: Vec::new(),
            volumes: Vec::new(),
            events: devfile.events.clone(),
        };

        for component in &devfile.components {
            let name = component.name.clone();
            match &component.body {
                ComponentBody::Container(container) => view.containers.push(ContainerView {
                    name,
                    image: container.image.clone(),
                    command: container.command.clone(),
                    args: container.args.clone(),
                    env: container.env.clone(),
                    memory_request: container.memory_request.clone(),
                    memory_limit: container.memory_limit.clone(),
                    cpu_request: container.cpu_request.clone(),
                    cpu_limit: container.cpu_limit.clone(),
                    volume_mounts: container.volume_mounts.clone(),
                    mount_sources: container.mount_sources.unwrap_or(true),
                    source_mapping: container.source_mapping.clone(),
                }),
                ComponentBody::Image(image) => {
                    let dockerfile = image.dockerfile.clone().unwrap_or_default();
                    view.images.push(ImageView {
                        name,
                        image_name: image.image_name.clone(),
                        args: dockerfile.args,
                        build_context: dockerfile.build_context,
                        root_required: dockerfile.root_required.unwrap_or(false),
                        uri: dockerfile.uri,
                        auto_build: image.auto_build,
                    });
                }
                ComponentBody::Kubernetes(resource) => view.resources.push(ResourceView {
                    name,
                    inlined: resource.inlined.clone(),
                    uri: resource.uri.clone(),
                    deploy_by_default: resource.deploy_by_default,
                }),
                ComponentBody::Volume(volume) => view.volumes.push(VolumeView {
                    name,
                    ephemeral: volume.ephemeral.unwrap_or(false),
                    size: volume.size.clone(),
                }),
                _ => {}
            }
        }
        view
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandView {
    pub name: String,
    /// Empty for ungrouped commands
    pub group: String,
    pub default: bool,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exec: Option<ExecView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub apply: Option<ApplyView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub composite: Option<CompositeView>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecView {
    pub component: String,
    pub command_line: String,
    pub working_dir: String,
    pub hot_reload_capable: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApplyView {
    pub component: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompositeView {
    pub commands: Vec<String>,
    pub parallel: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContainerView {
    pub name: String,
    pub image: String,
    pub command: Vec<String>,
    pub args: Vec<String>,
    pub env: Vec<EnvVar>,
    pub memory_request: String,
    pub memory_limit: String,
    pub cpu_request: String,
    pub cpu_limit: String,
    pub volume_mounts: Vec<VolumeMount>,
    /// Unset in the document means sources are mounted
    pub mount_sources: bool,
    pub source_mapping: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageView {
    pub name: String,
    pub image_name: String,
    pub args: Vec<String>,
    pub build_context: String,
    pub root_required: bool,
    pub uri: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auto_build: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceView {
    pub name: String,
    pub inlined: String,
    pub uri: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deploy_by_default: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VolumeView {
    pub name: String,
    pub ephemeral: bool,
    pub size: String,
}

impl From<&DevfileCommand> for CommandView {
    fn from(command: &DevfileCommand) -> Self {
        let group = command.group();
        let mut view = CommandView {
            name: command.id.clone(),
            group: if group.is_none() {
                String::new()
            } else {
                group.to_string()
            },
            default: command.is_default(),
            kind: String::new(),
            exec: None,
            apply: None,
            composite: None,
        };

        match &command.body {
            CommandBody::Exec(exec) => {
                view.kind = "exec".to_string();
                view.exec = Some(ExecView {
                    component: exec.component.clone(),
                    command_line: exec.command_line.clone(),
                    working_dir: exec.working_dir.clone(),
                    hot_reload_capable: exec.hot_reload_capable.unwrap_or(false),
                });
            }
            CommandBody::Apply(apply) => {
                view.kind = "apply".to_string();
                view.apply = Some(ApplyView {
                    component: apply.component.clone(),
                });
            }
            CommandBody::Composite(composite) => {
                view.kind = "composite".to_string();
                view.composite = Some(CompositeView {
                    commands: composite.commands.clone(),
                    parallel: composite.parallel.unwrap_or(false),
                });
            }
        }
        view
    }
}
