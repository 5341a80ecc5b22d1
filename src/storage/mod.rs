//! # Storage Layer
//!
//! Keeps the devfile and the tool's configuration on disk between CLI runs.
//!
//! ## Storage Formats
//!
//! | Data | Format | Location |
//! |------|--------|----------|
//! | Devfile | YAML | `devfile.yaml` (configurable) |
//! | Config | TOML | `.devstate/config.toml` |
//! | Global config | TOML | `~/.config/devstate/config.toml` |
//!
//! ## Concurrency Safety
//!
//! - [`DevfileStore`] uses file locking (`fs2`) for concurrent access
//! - Writes are atomic (temp file + rename)
//!
//! ## Key Types
//!
//! - [`Project`] - Entry point for a devstate project
//! - [`DevfileStore`] - Read/write the devfile
//! - [`Config`] - Project and global configuration

mod config;
mod project;
mod store;

pub use config::{
    ChartConfig, Config, ConfigError, GlobalConfig, MoveConfig, OutputFormat, ProjectConfig,
    DEFAULT_DEVFILE_PATH, PROJECT_DIR,
};
pub use project::{Project, ProjectError};
pub use store::DevfileStore;
