//! `Dragonfly` (Redis-compatible) document storage.
//!
//! The whole state document lives as one JSON string under a single key
//! (default `almanac:state`).

use almanac_types::PersistedRecord;
use fred::prelude::*;

use crate::backend::StateStore;
use crate::error::StoreError;

/// Connection handle storing the document in `Dragonfly`.
#[derive(Clone)]
pub struct DragonflyStore {
    client: Client,
    key: String,
}

impl DragonflyStore {
    /// Connect to `Dragonfly` at the given URL and store the document at `key`.
    ///
    /// The URL should follow the Redis URL scheme:
    /// `redis://host:port` or `redis://host:port/db`
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Config`] if the URL cannot be parsed.
    /// Returns [`StoreError::Dragonfly`] if the connection fails.
    pub async fn connect(url: &str, key: &str) -> Result<Self, StoreError> {
        let config = Config::from_url(url)
            .map_err(|e| StoreError::Config(format!("Invalid Dragonfly URL: {e}")))?;

        let client = Builder::from_config(config).build()?;
        client.init().await?;

        tracing::info!(key, "Connected to Dragonfly");
        Ok(Self {
            client,
            key: key.to_owned(),
        })
    }

    /// The key holding the document.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Delete the document.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Dragonfly`] if the delete fails.
    pub async fn clear(&self) -> Result<(), StoreError> {
        let _: u32 = self.client.del(self.key.as_str()).await?;
        Ok(())
    }
}

impl StateStore for DragonflyStore {
    async fn get(&self) -> Result<PersistedRecord, StoreError> {
        let value: Option<String> = self.client.get(self.key.as_str()).await?;
        value.map_or_else(
            || Ok(PersistedRecord::default()),
            |s| Ok(serde_json::from_str(&s)?),
        )
    }

    async fn put(&self, record: &PersistedRecord) -> Result<(), StoreError> {
        let json = serde_json::to_string(record)?;
        let _: () = self
            .client
            .set(self.key.as_str(), json.as_str(), None, None, false)
            .await?;
        Ok(())
    }

    fn name(&self) -> &'static str {
        "dragonfly"
    }
}
