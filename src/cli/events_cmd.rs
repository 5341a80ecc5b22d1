//! Lifecycle event CLI commands

use anyhow::Result;
use clap::Subcommand;

use super::command_cmd::report;
use super::output::Output;
use super::workspace::Workspace;

#[derive(Subcommand)]
pub enum EventsCommands {
    /// List the commands bound to each event
    List,

    /// Replace the commands run on an event
    ///
    /// Examples:
    ///   devstate events set postStart init-db seed   # Run two commands after start
    ///   devstate events set postStart                # Clear the event
    Set {
        /// preStart, postStart, preStop or postStop
        event: String,

        /// Command ids, in order
        commands: Vec<String>,
    },
}

pub fn run(cmd: EventsCommands, workspace: &Workspace, output: &Output) -> Result<()> {
    match cmd {
        EventsCommands::List => {
            let content = workspace.load()?.get_content()?;
            if output.is_json() {
                output.data(&content.events);
            } else {
                for (event, commands) in content.events.iter() {
                    println!("{:<10} {}", event, commands.join(", "));
                }
            }
            Ok(())
        }
        EventsCommands::Set { event, commands } => {
            let content = workspace.mutate(|state| state.update_events(&event, &commands))?;
            let message = if commands.is_empty() {
                format!("Cleared {}", event)
            } else {
                format!("{} runs {}", event, commands.join(", "))
            };
            report(output, &content, &message);
            Ok(())
        }
    }
}
