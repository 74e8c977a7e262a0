use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use munchers_core::SaveData;
use munchers_system_progression::SaveStore;
use tracing::debug;

/// Save store backed by a pretty-printed JSON file.
#[derive(Clone, Debug)]
pub(crate) struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    /// Creates a store reading and writing the provided file.
    pub(crate) fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// File the store persists to.
    pub(crate) fn path(&self) -> &Path {
        &self.path
    }

    fn temporary_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|name| name.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl SaveStore for JsonFileStore {
    fn load(&self) -> Result<SaveData> {
        if !self.path.exists() {
            debug!(path = %self.path.display(), "no save file; starting fresh");
            return Ok(SaveData::default());
        }
        let contents = fs::read_to_string(&self.path)
            .with_context(|| format!("failed to read save file at {}", self.path.display()))?;
        serde_json::from_str(&contents)
            .with_context(|| format!("failed to parse save file at {}", self.path.display()))
    }

    fn save(&mut self, data: &SaveData) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create save directory {}", parent.display()))?;
        }

        let encoded = serde_json::to_string_pretty(data).context("failed to encode save data")?;
        let tmp = self.temporary_path();
        if let Err(error) = fs::write(&tmp, encoded) {
            let _ = fs::remove_file(&tmp);
            return Err(error)
                .with_context(|| format!("failed to write save file at {}", tmp.display()));
        }
        if let Err(error) = fs::rename(&tmp, &self.path) {
            let _ = fs::remove_file(&tmp);
            return Err(error)
                .with_context(|| format!("failed to replace save file at {}", self.path.display()));
        }
        debug!(path = %self.path.display(), "saved progression");
        Ok(())
    }
}
