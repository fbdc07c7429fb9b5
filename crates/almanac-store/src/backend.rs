//! The [`StateStore`] capability and its enum-dispatched backends.
//!
//! A store holds exactly one [`PersistedRecord`]. Callers never write partial
//! updates: they read the whole document, change it, and put it back (see
//! [`RecordStore`](crate::RecordStore) for the serialized version of that
//! cycle).

use std::future::Future;

use almanac_types::PersistedRecord;

use crate::dragonfly::DragonflyStore;
use crate::error::StoreError;
use crate::file::JsonFileStore;
use crate::memory::MemoryStore;

/// Durable get/put of the single state document.
///
/// A missing document reads as [`PersistedRecord::default`].
pub trait StateStore: Send + Sync {
    /// Read the current document.
    fn get(&self) -> impl Future<Output = Result<PersistedRecord, StoreError>> + Send;

    /// Replace the document.
    fn put(&self, record: &PersistedRecord) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Short name for logging.
    fn name(&self) -> &'static str;
}

/// A store chosen at runtime from configuration.
///
/// Uses enum dispatch so the scheduler can stay generic over a single
/// concrete type.
pub enum StoreBackend {
    /// JSON document on the local filesystem.
    File(JsonFileStore),
    /// JSON document under a `Dragonfly` key.
    Dragonfly(DragonflyStore),
    /// Process memory only.
    Memory(MemoryStore),
}

impl StateStore for StoreBackend {
    async fn get(&self) -> Result<PersistedRecord, StoreError> {
        match self {
            Self::File(store) => store.get().await,
            Self::Dragonfly(store) => store.get().await,
            Self::Memory(store) => store.get().await,
        }
    }

    async fn put(&self, record: &PersistedRecord) -> Result<(), StoreError> {
        match self {
            Self::File(store) => store.put(record).await,
            Self::Dragonfly(store) => store.put(record).await,
            Self::Memory(store) => store.put(record).await,
        }
    }

    fn name(&self) -> &'static str {
        match self {
            Self::File(store) => store.name(),
            Self::Dragonfly(store) => store.name(),
            Self::Memory(store) => store.name(),
        }
    }
}
