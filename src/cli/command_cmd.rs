//! Command CLI commands

use anyhow::Result;
use clap::Subcommand;
use serde::Serialize;

use super::output::Output;
use super::workspace::Workspace;
use crate::domain::GroupKind;
use crate::state::DevfileContent;

#[derive(Subcommand)]
pub enum CommandCommands {
    /// List commands by group, with their index inside the group
    List {
        /// Only show one group (build, run, test, debug, deploy, none)
        #[arg(long, short)]
        group: Option<String>,
    },

    /// Add an exec command
    AddExec {
        /// Command id
        name: String,

        /// Container component running the command
        #[arg(long)]
        component: String,

        /// Command line to execute
        #[arg(long)]
        command_line: String,

        /// Working directory inside the container
        #[arg(long, default_value = "")]
        working_dir: String,

        /// The command restarts itself on source changes
        #[arg(long)]
        hot_reload_capable: bool,
    },

    /// Add an apply command
    AddApply {
        /// Command id
        name: String,

        /// Component to apply
        #[arg(long)]
        component: String,
    },

    /// Add a composite command running existing commands
    AddComposite {
        /// Command id
        name: String,

        /// Run the children in parallel
        #[arg(long)]
        parallel: bool,

        /// Child command ids, in order
        #[arg(required = true)]
        commands: Vec<String>,
    },

    /// Delete a command nothing refers to
    Delete {
        /// Command id
        name: String,
    },

    /// Move a command between (or within) groups
    ///
    /// Examples:
    ///   devstate command move none 0 run 0     # Put the first ungrouped command in run
    ///   devstate command move build 2 build 0  # Reorder inside build
    Move {
        /// Group the command is in
        from_group: String,

        /// Position inside the source group
        from_index: usize,

        /// Group to move it to
        to_group: String,

        /// Position inside the destination group
        to_index: usize,
    },

    /// Make a command the default of its group
    SetDefault {
        /// Command id
        name: String,

        /// Group the command belongs to
        group: String,
    },

    /// Clear the default flag of a command
    UnsetDefault {
        /// Command id
        name: String,
    },
}

/// One line of `command list`
#[derive(Debug, Serialize)]
struct ListedCommand {
    group: GroupKind,
    index: usize,
    name: String,
    #[serde(rename = "type")]
    kind: &'static str,
    default: bool,
}

pub fn run(cmd: CommandCommands, workspace: &Workspace, output: &Output) -> Result<()> {
    match cmd {
        CommandCommands::List { group } => list_commands(workspace, output, group.as_deref()),
        CommandCommands::AddExec {
            name,
            component,
            command_line,
            working_dir,
            hot_reload_capable,
        } => {
            let content = workspace.mutate(|state| {
                state.add_exec_command(&name, &component, &command_line, &working_dir, hot_reload_capable)
            })?;
            report(output, &content, &format!("Added exec command {}", name));
            Ok(())
        }
        CommandCommands::AddApply { name, component } => {
            let content = workspace.mutate(|state| state.add_apply_command(&name, &component))?;
            report(output, &content, &format!("Added apply command {}", name));
            Ok(())
        }
        CommandCommands::AddComposite {
            name,
            parallel,
            commands,
        } => {
            let content =
                workspace.mutate(|state| state.add_composite_command(&name, parallel, &commands))?;
            report(output, &content, &format!("Added composite command {}", name));
            Ok(())
        }
        CommandCommands::Delete { name } => {
            let content = workspace.mutate(|state| state.delete_command(&name))?;
            report(output, &content, &format!("Deleted command {}", name));
            Ok(())
        }
        CommandCommands::Move {
            from_group,
            from_index,
            to_group,
            to_index,
        } => {
            output.verbose_ctx(
                "move",
                &format!("{}[{}] -> {}[{}]", from_group, from_index, to_group, to_index),
            );
            let content = workspace
                .mutate(|state| state.move_command(&from_group, &to_group, from_index, to_index))?;
            report(
                output,
                &content,
                &format!(
                    "Moved {} #{} to {} #{}",
                    from_group, from_index, to_group, to_index
                ),
            );
            Ok(())
        }
        CommandCommands::SetDefault { name, group } => {
            let content = workspace.mutate(|state| state.set_default_command(&name, &group))?;
            report(output, &content, &format!("{} is now the default {} command", name, group));
            Ok(())
        }
        CommandCommands::UnsetDefault { name } => {
            let content = workspace.mutate(|state| state.unset_default_command(&name))?;
            report(output, &content, &format!("{} is no longer a default command", name));
            Ok(())
        }
    }
}

/// Prints the outcome of a change: the new document in JSON mode, a message otherwise
pub(super) fn report(output: &Output, content: &DevfileContent, message: &str) {
    if output.is_json() {
        output.data(content);
    } else {
        output.success(message);
    }
}

fn list_commands(workspace: &Workspace, output: &Output, group: Option<&str>) -> Result<()> {
    let filter = group.map(|g| g.parse::<GroupKind>()).transpose()?;
    let grouped = workspace.load()?.grouped_commands()?;

    let listed: Vec<ListedCommand> = grouped
        .iter()
        .filter(|(kind, _)| filter.map_or(true, |f| f == *kind))
        .flat_map(|(kind, commands)| {
            commands.iter().enumerate().map(move |(index, command)| ListedCommand {
                group: kind,
                index,
                name: command.id.clone(),
                kind: command.kind.label(),
                default: command.is_default,
            })
        })
        .collect();

    if output.is_json() {
        output.data(&listed);
        return Ok(());
    }

    if listed.is_empty() {
        println!("No commands found");
        return Ok(());
    }

    println!("{:<8} {:>3}  {:<24} {:<10} DEFAULT", "GROUP", "#", "NAME", "TYPE");
    println!("{}", "-".repeat(56));
    for command in &listed {
        println!(
            "{:<8} {:>3}  {:<24} {:<10} {}",
            command.group,
            command.index,
            command.name,
            command.kind,
            if command.default { "*" } else { "" }
        );
    }

    Ok(())
}
