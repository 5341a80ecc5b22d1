//! Project management
//!
//! Handles project initialization and provides access to the devfile store.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use thiserror::Error;

use super::config::PROJECT_DIR;
use super::{Config, DevfileStore};

#[derive(Debug, Error)]
pub enum ProjectError {
    #[error("Not in a devstate project. Run 'devstate init' first.")]
    NotInProject,
}

/// A devstate project
pub struct Project {
    root: PathBuf,
    config: Config,
}

impl Project {
    /// Opens an existing project at the given path
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();

        if !root.join(PROJECT_DIR).is_dir() {
            return Err(ProjectError::NotInProject.into());
        }

        let config = Config::for_project(&root)?;

        Ok(Self { root, config })
    }

    /// Initializes a new project at the given path
    ///
    /// Existing configuration and devfile are left as they are.
    pub fn init(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        let project_dir = root.join(PROJECT_DIR);

        fs::create_dir_all(&project_dir).with_context(|| {
            format!(
                "Failed to create {} directory: {}",
                PROJECT_DIR,
                project_dir.display()
            )
        })?;

        let config_path = project_dir.join("config.toml");
        if !config_path.exists() {
            let default_config = r#"# devstate configuration

# Devfile edited by this project, relative to the project root
devfile = "devfile.yaml"

[move]
# "reject" fails moves past the end of a group, "clamp" appends instead
destination = "reject"

[chart]
# Label flowchart nodes with command details
detailed = false
"#;
            fs::write(&config_path, default_config)
                .with_context(|| format!("Failed to write config: {}", config_path.display()))?;
        }

        let project = Self::open(root)?;

        let store = project.devfile_store();
        if !store.exists() {
            store.write(&store.read()?)?;
        }

        Ok(project)
    }

    /// Returns the project root path
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Returns the .devstate directory path
    pub fn devstate_dir(&self) -> PathBuf {
        self.root.join(PROJECT_DIR)
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Returns the store for the project's devfile
    pub fn devfile_store(&self) -> DevfileStore {
        DevfileStore::new(self.config.devfile_path())
    }
}
