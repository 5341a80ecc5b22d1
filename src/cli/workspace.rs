//! Resolves which devfile a CLI invocation works on

use std::path::PathBuf;

use anyhow::Result;

use crate::state::{DevfileContent, DevfileState, StateError};
use crate::storage::{Config, DevfileStore};

/// The devfile and settings for one invocation
pub struct Workspace {
    pub config: Config,
    pub store: DevfileStore,
}

impl Workspace {
    /// Uses `--devfile` when given, otherwise the configured devfile
    pub fn open(config: Config, devfile: Option<PathBuf>) -> Self {
        let path = devfile.unwrap_or_else(|| config.devfile_path());
        Self {
            store: DevfileStore::new(path),
            config,
        }
    }

    pub fn load(&self) -> Result<DevfileState> {
        self.store.load(self.config.project.move_.destination)
    }

    /// Applies one state operation and writes the devfile back if it succeeds
    pub fn mutate<F>(&self, change: F) -> Result<DevfileContent>
    where
        F: FnOnce(&mut DevfileState) -> Result<DevfileContent, StateError>,
    {
        let mut state = self.load()?;
        let content = change(&mut state)?;
        self.store.save(&state)?;
        Ok(content)
    }
}
