//! Main CLI application structure

use std::env;
use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use super::command_cmd::{self, CommandCommands};
use super::component_cmd::{self, ComponentCommands};
use super::events_cmd::{self, EventsCommands};
use super::graph_cmd;
use super::output::{Output, OutputFormat};
use super::workspace::Workspace;
use crate::storage::{Config, Project};

#[derive(Parser)]
#[command(name = "devstate")]
#[command(author, version, about = "Edit devfile commands and chart how they run")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output format (defaults to the global config, then text)
    #[arg(long, short = 'f', global = true)]
    pub format: Option<OutputFormat>,

    /// Enable verbose output for debugging
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    /// Devfile to work on (defaults to the project's configured devfile)
    #[arg(long, global = true, env = "DEVSTATE_DEVFILE")]
    pub devfile: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new devstate project
    Init {
        /// Path to initialize (defaults to current directory)
        #[arg(default_value = ".")]
        path: String,
    },

    /// Show the devfile and its commands
    Show,

    /// Replace the devfile with the minimal default document
    Reset,

    /// Manage commands
    #[command(subcommand)]
    Command(CommandCommands),

    /// Manage components
    #[command(subcommand)]
    Component(ComponentCommands),

    /// Manage lifecycle events
    #[command(subcommand)]
    Events(EventsCommands),

    /// Print the Mermaid flowchart of a command
    Chart {
        /// Command the chart starts from
        entry: String,

        /// Label nodes with command details
        #[arg(long)]
        detailed: bool,
    },

    /// Print the stages a composite command runs
    Plan {
        /// Command id
        name: String,
    },
}

/// Main entry point for the CLI
pub fn run() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = Config::load()?;
    let format = cli
        .format
        .unwrap_or_else(|| config.global.default_format.into());
    let output = Output::new(format, cli.verbose);

    output.verbose("devstate starting");

    let workspace = Workspace::open(config, cli.devfile);

    match cli.command {
        Commands::Init { path } => {
            output.verbose_ctx("init", &format!("Initializing project at: {}", path));
            let project = Project::init(&path)?;
            output.verbose_ctx(
                "init",
                &format!("Devfile at: {}", project.devfile_store().path().display()),
            );
            output.success(&format!(
                "Initialized devstate project at {}",
                project.root().display()
            ));
        }

        Commands::Show => {
            output.verbose(&format!("Using devfile: {}", workspace.store.path().display()));
            show(&workspace, &output)?
        }

        Commands::Reset => {
            let content = workspace.mutate(|state| state.reset())?;
            command_cmd::report(&output, &content, "Devfile reset");
        }

        Commands::Command(cmd) => command_cmd::run(cmd, &workspace, &output)?,
        Commands::Component(cmd) => component_cmd::run(cmd, &workspace, &output)?,
        Commands::Events(cmd) => events_cmd::run(cmd, &workspace, &output)?,

        Commands::Chart { entry, detailed } => graph_cmd::chart(&workspace, &output, &entry, detailed)?,
        Commands::Plan { name } => graph_cmd::plan(&workspace, &output, &name)?,
    }

    output.verbose("Command completed successfully");
    Ok(())
}

fn show(workspace: &Workspace, output: &Output) -> Result<()> {
    let content = workspace.load()?.get_content()?;

    if output.is_json() {
        output.data(&content);
    } else {
        print!("{}", content.content);
    }

    Ok(())
}

/// Installs the stderr log subscriber
///
/// `DEVSTATE_LOG` takes an `EnvFilter` directive; `DEVSTATE_LOG_FORMAT=json`
/// switches to JSON lines.
fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_env("DEVSTATE_LOG").unwrap_or_else(|_| {
        EnvFilter::new(if verbose {
            "devstate_cli=debug,info"
        } else {
            "warn"
        })
    });

    let format = env::var("DEVSTATE_LOG_FORMAT").unwrap_or_else(|_| "compact".to_string());

    let registry = tracing_subscriber::registry().with(filter);

    match format.as_str() {
        "json" => {
            registry
                .with(fmt::layer().json().with_ansi(false).with_writer(std::io::stderr))
                .init();
        }
        _ => {
            registry
                .with(fmt::layer().compact().with_writer(std::io::stderr))
                .init();
        }
    }
}
