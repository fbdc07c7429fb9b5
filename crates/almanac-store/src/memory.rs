//! Process-local store.
//!
//! Used for dry runs and tests. [`MemoryStore::set_unavailable`] simulates a
//! backend outage so callers can exercise their store-failure paths.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use almanac_types::PersistedRecord;
use tokio::sync::Mutex;

use crate::backend::StateStore;
use crate::error::StoreError;

/// In-memory [`StateStore`].
#[derive(Debug, Default)]
pub struct MemoryStore {
    record: Mutex<PersistedRecord>,
    unavailable: AtomicBool,
    writes: AtomicU64,
}

impl MemoryStore {
    /// An empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// A store pre-loaded with `record`.
    pub fn with_record(record: PersistedRecord) -> Self {
        Self {
            record: Mutex::new(record),
            ..Self::default()
        }
    }

    /// Make every subsequent `get`/`put` fail (or succeed again).
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::Release);
    }

    /// Number of successful writes so far.
    pub fn write_count(&self) -> u64 {
        self.writes.load(Ordering::Acquire)
    }

    fn check_available(&self) -> Result<(), StoreError> {
        if self.unavailable.load(Ordering::Acquire) {
            return Err(StoreError::Unavailable("memory store switched off".to_owned()));
        }
        Ok(())
    }
}

impl StateStore for MemoryStore {
    async fn get(&self) -> Result<PersistedRecord, StoreError> {
        self.check_available()?;
        Ok(self.record.lock().await.clone())
    }

    async fn put(&self, record: &PersistedRecord) -> Result<(), StoreError> {
        self.check_available()?;
        *self.record.lock().await = record.clone();
        self.writes.fetch_add(1, Ordering::AcqRel);
        Ok(())
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn outage_switch_fails_reads_and_writes() {
        let store = MemoryStore::new();
        store.set_unavailable(true);
        assert!(store.get().await.is_err());
        assert!(store.put(&PersistedRecord::default()).await.is_err());
        assert_eq!(store.write_count(), 0);

        store.set_unavailable(false);
        store.put(&PersistedRecord::default()).await.unwrap();
        assert_eq!(store.write_count(), 1);
    }
}
