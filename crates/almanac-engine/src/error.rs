//! Error types for the engine binary.
//!
//! [`EngineError`] is the top-level error that wraps every failure mode
//! during startup and shutdown. Failures inside a running tick never reach
//! it; the scheduler logs those and carries on.

/// Top-level error for the engine binary.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Configuration loading failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: almanac_core::ConfigError,
    },

    /// The state store could not be opened.
    #[error("store error: {source}")]
    Store {
        /// The underlying store error.
        #[from]
        source: almanac_store::StoreError,
    },

    /// Building or bootstrapping the almanac failed.
    #[error("almanac error: {source}")]
    Cycle {
        /// The underlying cycle error.
        #[from]
        source: almanac_core::CycleError,
    },

    /// An actuator or announcer adapter could not be built.
    #[error("adapter error: {message}")]
    Adapter {
        /// Description of the adapter failure.
        message: String,
    },

    /// Waiting for the shutdown signal failed.
    #[error("signal error: {0}")]
    Signal(std::io::Error),
}
