//! Error types for the Cadence lifecycle engine.

use thiserror::Error;

/// Main error type for Cadence operations.
#[derive(Error, Debug)]
pub enum CadenceError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Proposal error: {0}")]
    Proposal(#[from] ProposalError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Entity-construction validation errors.
///
/// Rejected before any entity reaches the handlers, so the orchestration
/// core can trust `end > start` and positive reminder offsets.
#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("End time {end} is not after start time {start}")]
    EndNotAfterStart {
        start: chrono::DateTime<chrono::Utc>,
        end: chrono::DateTime<chrono::Utc>,
    },

    #[error("Reminder offset must be positive, got {0}")]
    NonPositiveOffset(i64),

    #[error("Title must not be empty")]
    EmptyTitle,
}

/// Storage-related errors.
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid operation: {0}")]
    InvalidOperation(String),
}

/// Proposal lifecycle errors.
#[derive(Error, Debug)]
pub enum ProposalError {
    #[error("Proposal not found: {0}")]
    NotFound(String),

    #[error("Proposal {0} is already confirmed")]
    AlreadyConfirmed(String),

    #[error("Proposal {0} is already rejected")]
    AlreadyRejected(String),
}

/// Configuration-related errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadFile(#[source] std::io::Error),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Result type alias for Cadence operations.
pub type Result<T> = std::result::Result<T, CadenceError>;
