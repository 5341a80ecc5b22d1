//! On-disk devfile
//!
//! The devfile is read under a shared lock and rewritten atomically: the new
//! text goes to a locked temp file that is then renamed over the original.

use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use fs2::FileExt;
use tracing::debug;

use crate::devfile::DEFAULT_DEVFILE;
use crate::domain::DestinationPolicy;
use crate::state::DevfileState;

/// Store for one devfile
pub struct DevfileStore {
    path: PathBuf,
}

impl DevfileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Returns the path to the devfile
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Reads the devfile text; a missing file reads as the default document
    pub fn read(&self) -> Result<String> {
        if !self.path.exists() {
            debug!(path = %self.path.display(), "devfile missing, using default document");
            return Ok(DEFAULT_DEVFILE.to_string());
        }

        let mut file = File::open(&self.path)
            .with_context(|| format!("Failed to open devfile: {}", self.path.display()))?;

        file.lock_shared()
            .context("Failed to acquire read lock on devfile")?;

        let mut text = String::new();
        file.read_to_string(&mut text)
            .with_context(|| format!("Failed to read devfile: {}", self.path.display()))?;

        Ok(text)
    }

    /// Loads the devfile into an editing state
    pub fn load(&self, policy: DestinationPolicy) -> Result<DevfileState> {
        let text = self.read()?;
        let state = DevfileState::from_content(&text)
            .with_context(|| format!("Invalid devfile: {}", self.path.display()))?;
        Ok(state.with_policy(policy))
    }

    /// Writes the devfile text (full rewrite)
    pub fn write(&self, text: &str) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }

        let temp_path = self.path.with_extension("yaml.tmp");

        {
            let file = OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .open(&temp_path)
                .with_context(|| format!("Failed to create temp file: {}", temp_path.display()))?;

            file.lock_exclusive()
                .context("Failed to acquire write lock on devfile")?;

            let mut writer = BufWriter::new(&file);
            writer
                .write_all(text.as_bytes())
                .context("Failed to write devfile")?;
            writer.flush().context("Failed to flush devfile")?;
        }

        fs::rename(&temp_path, &self.path).with_context(|| {
            format!(
                "Failed to rename {} to {}",
                temp_path.display(),
                self.path.display()
            )
        })?;

        debug!(path = %self.path.display(), bytes = text.len(), "devfile written");
        Ok(())
    }

    /// Writes the current text of an editing state
    pub fn save(&self, state: &DevfileState) -> Result<()> {
        self.write(state.content())
    }
}
