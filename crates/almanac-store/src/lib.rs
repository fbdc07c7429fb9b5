//! Durable state for the Almanac scheduler.
//!
//! The scheduler keeps exactly one document: last season, last weather,
//! pause deadline and weather history. This crate defines the
//! [`StateStore`] capability, three interchangeable backends, and the
//! [`RecordStore`] wrapper that serializes every read-modify-write.
//!
//! # Architecture
//!
//! ```text
//! SeasonCycle ---+
//! WeatherCycle --+--> RecordStore::update --> StoreBackend
//! PauseController+                             |-- JsonFileStore  (data.json)
//!                                              |-- DragonflyStore (almanac:state)
//!                                              +-- MemoryStore    (dry run / tests)
//! ```
//!
//! # Modules
//!
//! - [`backend`] -- The [`StateStore`] trait and [`StoreBackend`] enum dispatch
//! - [`document`] -- [`RecordStore`], the serialized document writer
//! - [`file`] -- JSON file backend
//! - [`dragonfly`] -- `Dragonfly` (Redis-compatible) backend
//! - [`memory`] -- In-process backend
//! - [`error`] -- Shared error types

pub mod backend;
pub mod document;
pub mod dragonfly;
pub mod error;
pub mod file;
pub mod memory;

// Re-export primary types for convenience.
pub use backend::{StateStore, StoreBackend};
pub use document::RecordStore;
pub use dragonfly::DragonflyStore;
pub use error::StoreError;
pub use file::JsonFileStore;
pub use memory::MemoryStore;
