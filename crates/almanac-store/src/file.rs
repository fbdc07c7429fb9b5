//! JSON document on the local filesystem.
//!
//! Writes go to a sibling temporary file that is then renamed over the
//! target, so a crash mid-write never leaves a truncated document behind.

use std::path::{Path, PathBuf};

use almanac_types::PersistedRecord;

use crate::backend::StateStore;
use crate::error::StoreError;

/// File-backed [`StateStore`].
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    /// Store the document at `path`. The file is created on first write.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The document path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(std::ffi::OsStr::to_os_string)
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl StateStore for JsonFileStore {
    async fn get(&self) -> Result<PersistedRecord, StoreError> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(contents) if contents.trim().is_empty() => Ok(PersistedRecord::default()),
            Ok(contents) => Ok(serde_json::from_str(&contents)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %self.path.display(), "state file missing, starting empty");
                Ok(PersistedRecord::default())
            }
            Err(e) => Err(StoreError::io(&self.path, e)),
        }
    }

    async fn put(&self, record: &PersistedRecord) -> Result<(), StoreError> {
        let json = serde_json::to_string_pretty(record)?;
        let temp = self.temp_path();

        tokio::fs::write(&temp, json.as_bytes())
            .await
            .map_err(|e| StoreError::io(&temp, e))?;
        tokio::fs::rename(&temp, &self.path)
            .await
            .map_err(|e| StoreError::io(&self.path, e))?;
        Ok(())
    }

    fn name(&self) -> &'static str {
        "file"
    }
}
