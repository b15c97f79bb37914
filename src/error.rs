//! Error types for the store, schedule editing and shared state access

use thiserror::Error;

/// Errors raised by the schedule store
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Failed to access schedule file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Schedule file {path} is malformed: {source}")]
    Malformed {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Errors raised while editing the schedule list
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EditError {
    /// The list is locked while a countdown is underway
    #[error("Schedule cannot be edited while a run is active")]
    RunActive,

    #[error("Event index {index} is out of range (schedule has {len} events)")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("Invalid event: {0}")]
    InvalidEvent(String),
}

/// Top-level error for operations on the shared application state
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Edit(#[from] EditError),

    #[error("Failed to lock {0}")]
    LockPoisoned(String),
}
