//! Component CLI commands

use anyhow::Result;
use clap::{Subcommand, ValueEnum};
use serde::Serialize;

use super::command_cmd::report;
use super::output::Output;
use super::workspace::Workspace;
use crate::devfile::{AutoPolicy, EnvVar, VolumeMount};
use crate::state::{ContainerSpec, ImageSpec};

#[derive(Subcommand)]
pub enum ComponentCommands {
    /// List containers, images, resources and volumes
    List,

    /// Add a container component
    AddContainer {
        /// Component name
        name: String,

        /// Container image
        #[arg(long)]
        image: String,

        /// Entrypoint, one value per flag
        #[arg(long = "command")]
        command: Vec<String>,

        /// Entrypoint arguments, one value per flag
        #[arg(long = "arg")]
        args: Vec<String>,

        /// Environment variable as NAME=value
        #[arg(long = "env", value_parser = parse_env)]
        env: Vec<EnvVar>,

        #[arg(long, default_value = "")]
        memory_request: String,

        #[arg(long, default_value = "")]
        memory_limit: String,

        #[arg(long, default_value = "")]
        cpu_request: String,

        #[arg(long, default_value = "")]
        cpu_limit: String,

        /// Volume mount as VOLUME:PATH
        #[arg(long = "volume-mount", value_parser = parse_volume_mount)]
        volume_mounts: Vec<VolumeMount>,

        /// Write mountSources explicitly
        #[arg(long)]
        mount_sources: Option<bool>,

        /// Where sources are mounted; needs --mount-sources
        #[arg(long, default_value = "", requires = "mount_sources")]
        source_mapping: String,
    },

    /// Add an image component built from a Dockerfile
    AddImage {
        /// Component name
        name: String,

        /// Name of the built image
        #[arg(long)]
        image_name: String,

        /// Build arguments, one value per flag
        #[arg(long = "arg")]
        args: Vec<String>,

        #[arg(long, default_value = "")]
        build_context: String,

        #[arg(long)]
        root_required: bool,

        /// Dockerfile location
        #[arg(long, default_value = "")]
        uri: String,

        /// never, always or undefined
        #[arg(long, default_value = "undefined")]
        auto_build: AutoPolicy,
    },

    /// Add a Kubernetes resource, inline or by uri
    AddResource {
        /// Component name
        name: String,

        /// Manifest content
        #[arg(long, default_value = "", conflicts_with = "uri")]
        inlined: String,

        /// Manifest location
        #[arg(long, default_value = "")]
        uri: String,

        /// never, always or undefined
        #[arg(long, default_value = "undefined")]
        deploy_by_default: AutoPolicy,
    },

    /// Add a volume component
    AddVolume {
        /// Component name
        name: String,

        #[arg(long)]
        ephemeral: bool,

        /// Requested size, e.g. 1Gi
        #[arg(long, default_value = "")]
        size: String,
    },

    /// Delete a component nothing refers to
    Delete {
        kind: ComponentKind,

        /// Component name
        name: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ComponentKind {
    Container,
    Image,
    Resource,
    Volume,
}

/// One line of `component list`
#[derive(Debug, Serialize)]
struct ListedComponent {
    name: String,
    kind: &'static str,
    detail: String,
}

pub fn run(cmd: ComponentCommands, workspace: &Workspace, output: &Output) -> Result<()> {
    match cmd {
        ComponentCommands::List => list_components(workspace, output),
        ComponentCommands::AddContainer {
            name,
            image,
            command,
            args,
            env,
            memory_request,
            memory_limit,
            cpu_request,
            cpu_limit,
            volume_mounts,
            mount_sources,
            source_mapping,
        } => {
            let spec = ContainerSpec {
                image,
                command,
                args,
                env,
                memory_request,
                memory_limit,
                cpu_request,
                cpu_limit,
                volume_mounts,
                mount_sources,
                source_mapping,
            };
            let content = workspace.mutate(|state| state.add_container(&name, spec))?;
            report(output, &content, &format!("Added container {}", name));
            Ok(())
        }
        ComponentCommands::AddImage {
            name,
            image_name,
            args,
            build_context,
            root_required,
            uri,
            auto_build,
        } => {
            let spec = ImageSpec {
                image_name,
                args,
                build_context,
                root_required,
                uri,
                auto_build,
            };
            let content = workspace.mutate(|state| state.add_image(&name, spec))?;
            report(output, &content, &format!("Added image {}", name));
            Ok(())
        }
        ComponentCommands::AddResource {
            name,
            inlined,
            uri,
            deploy_by_default,
        } => {
            let content = workspace
                .mutate(|state| state.add_resource(&name, &inlined, &uri, deploy_by_default))?;
            report(output, &content, &format!("Added resource {}", name));
            Ok(())
        }
        ComponentCommands::AddVolume {
            name,
            ephemeral,
            size,
        } => {
            let content = workspace.mutate(|state| state.add_volume(&name, ephemeral, &size))?;
            report(output, &content, &format!("Added volume {}", name));
            Ok(())
        }
        ComponentCommands::Delete { kind, name } => {
            let content = workspace.mutate(|state| match kind {
                ComponentKind::Container => state.delete_container(&name),
                ComponentKind::Image => state.delete_image(&name),
                ComponentKind::Resource => state.delete_resource(&name),
                ComponentKind::Volume => state.delete_volume(&name),
            })?;
            report(output, &content, &format!("Deleted component {}", name));
            Ok(())
        }
    }
}

fn list_components(workspace: &Workspace, output: &Output) -> Result<()> {
    let content = workspace.load()?.get_content()?;

    let mut listed = Vec::new();
    for container in &content.containers {
        listed.push(ListedComponent {
            name: container.name.clone(),
            kind: "container",
            detail: container.image.clone(),
        });
    }
    for image in &content.images {
        listed.push(ListedComponent {
            name: image.name.clone(),
            kind: "image",
            detail: image.image_name.clone(),
        });
    }
    for resource in &content.resources {
        listed.push(ListedComponent {
            name: resource.name.clone(),
            kind: "resource",
            detail: if resource.uri.is_empty() {
                "(inlined)".to_string()
            } else {
                resource.uri.clone()
            },
        });
    }
    for volume in &content.volumes {
        listed.push(ListedComponent {
            name: volume.name.clone(),
            kind: "volume",
            detail: volume.size.clone(),
        });
    }

    if output.is_json() {
        output.data(&listed);
        return Ok(());
    }

    if listed.is_empty() {
        println!("No components found");
        return Ok(());
    }

    println!("{:<24} {:<10} DETAIL", "NAME", "KIND");
    println!("{}", "-".repeat(56));
    for component in &listed {
        println!("{:<24} {:<10} {}", component.name, component.kind, component.detail);
    }

    Ok(())
}

fn parse_env(s: &str) -> Result<EnvVar, String> {
    let (name, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=value, got {:?}", s))?;
    Ok(EnvVar {
        name: name.to_string(),
        value: value.to_string(),
    })
}

fn parse_volume_mount(s: &str) -> Result<VolumeMount, String> {
    let (name, path) = s.split_once(':').unwrap_or((s, ""));
    if name.is_empty() {
        return Err(format!("expected VOLUME:PATH, got {:?}", s));
    }
    Ok(VolumeMount {
        name: name.to_string(),
        path: path.to_string(),
    })
}
