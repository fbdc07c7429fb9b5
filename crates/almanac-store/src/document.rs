//! Serialized read-modify-write over a [`StateStore`].
//!
//! Each scheduler component owns its own in-memory lock, but all of them
//! persist into the same document. [`RecordStore::update`] holds a
//! document-wide lock for the duration of one get-modify-put so a season
//! change and a weather tick cannot overwrite each other's fields.

use almanac_types::PersistedRecord;
use tokio::sync::Mutex;

use crate::backend::StateStore;
use crate::error::StoreError;

/// The single writer of the durable document.
pub struct RecordStore<S> {
    inner: S,
    write_lock: Mutex<()>,
}

impl<S: StateStore> RecordStore<S> {
    /// Wrap a backend.
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            write_lock: Mutex::new(()),
        }
    }

    /// The wrapped backend.
    pub const fn backend(&self) -> &S {
        &self.inner
    }

    /// Read the current document.
    pub async fn load(&self) -> Result<PersistedRecord, StoreError> {
        self.inner.get().await
    }

    /// Apply `mutate` to the current document and write it back.
    ///
    /// Returns the document as written. Nothing is written if the read
    /// fails, and the caller must treat a failed write as "not recorded".
    pub async fn update<F>(&self, mutate: F) -> Result<PersistedRecord, StoreError>
    where
        F: FnOnce(&mut PersistedRecord) + Send,
    {
        let _guard = self.write_lock.lock().await;
        let mut record = self.inner.get().await?;
        mutate(&mut record);
        self.inner.put(&record).await?;
        tracing::trace!(store = self.inner.name(), "state document written");
        Ok(record)
    }
}
