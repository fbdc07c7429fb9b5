//! Opens the configured state store backend.

use almanac_core::config::{StoreConfig, StoreKind};
use almanac_store::{DragonflyStore, JsonFileStore, MemoryStore, StoreBackend};

use crate::error::EngineError;

/// Open the backend named in `config`.
///
/// The memory backend loses everything on exit and is only meant for
/// trying the scheduler out.
///
/// # Errors
///
/// Returns [`EngineError::Store`] if `Dragonfly` cannot be reached.
pub async fn open(config: &StoreConfig) -> Result<StoreBackend, EngineError> {
    let backend = match config.backend {
        StoreKind::File => StoreBackend::File(JsonFileStore::new(&config.path)),
        StoreKind::Dragonfly => {
            tracing::info!(url = %config.dragonfly_url, key = %config.key, "Connecting to Dragonfly");
            StoreBackend::Dragonfly(DragonflyStore::connect(&config.dragonfly_url, &config.key).await?)
        }
        StoreKind::Memory => {
            tracing::warn!("Using the in-memory store, state will not survive a restart");
            StoreBackend::Memory(MemoryStore::new())
        }
    };
    Ok(backend)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use almanac_store::StateStore;

    use super::*;

    #[tokio::test]
    async fn file_backend_uses_configured_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        let config = StoreConfig {
            backend: StoreKind::File,
            path: path.to_string_lossy().into_owned(),
            ..StoreConfig::default()
        };

        let backend = open(&config).await.unwrap();
        assert_eq!(backend.name(), "file");
        let record = backend.get().await.unwrap();
        backend.put(&record).await.unwrap();
        assert!(path.exists());
    }

    #[tokio::test]
    async fn memory_backend_starts_empty() {
        let config = StoreConfig {
            backend: StoreKind::Memory,
            ..StoreConfig::default()
        };
        let backend = open(&config).await.unwrap();
        assert_eq!(backend.get().await.unwrap(), almanac_types::PersistedRecord::default());
    }
}
