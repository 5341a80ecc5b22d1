//! # Command-Line Interface
//!
//! User-facing CLI commands and output formatting.
//!
//! ## Command Groups
//!
//! | Group | Purpose | Examples |
//! |-------|---------|----------|
//! | Core | Project and document | `init`, `show`, `reset` |
//! | Command | Command editing | `command add-exec`, `command move`, `command set-default` |
//! | Component | Component editing | `component add-container`, `component delete volume cache` |
//! | Events | Lifecycle events | `events set postStart build` |
//! | Graph | Visualization | `chart`, `plan` |
//!
//! ## Choosing the Devfile
//!
//! `--devfile <path>` (or `DEVSTATE_DEVFILE`) wins; otherwise the devfile
//! named in `.devstate/config.toml` is used, falling back to `devfile.yaml`.
//!
//! ## Output Formats
//!
//! All commands support `--format` flag:
//! - `text` (default) - Human-readable output
//! - `json` - Machine-parseable JSON
//!
//! ## Verbose Mode
//!
//! Use `--verbose` (or `-v`) for debug output:
//! ```bash
//! devstate --verbose chart build-all
//! ```
//!
//! ## Entry Point
//!
//! Call [`run()`] to parse arguments and execute the appropriate command.

mod app;
mod command_cmd;
mod component_cmd;
mod events_cmd;
mod graph_cmd;
mod output;
mod workspace;

pub use app::{run, Cli, Commands};
pub use output::{Output, OutputFormat};
