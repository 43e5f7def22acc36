//! Error types for calsync.

use thiserror::Error;

/// Errors that can occur while reconciling two calendars.
#[derive(Error, Debug)]
pub enum CalSyncError {
    #[error("Authentication with '{provider}' failed: {message}")]
    Auth { provider: String, message: String },

    #[error("Could not reach '{provider}': {message}")]
    Connectivity { provider: String, message: String },

    #[error("'{provider}' rejected the event: {message}")]
    Validation { provider: String, message: String },

    #[error("'{provider}' could not find the event: {message}")]
    NotFound { provider: String, message: String },

    #[error("Identity mapping is corrupt: {0}")]
    MappingCorruption(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Provider error: {0}")]
    Provider(String),

    #[error("Provider '{0}' not found in PATH")]
    ProviderNotInstalled(String),

    #[error("Provider request timed out after {0}s")]
    ProviderTimeout(u64),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl CalSyncError {
    /// Errors that make the rest of the run meaningless.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            CalSyncError::Auth { .. } | CalSyncError::MappingCorruption(_)
        )
    }

    /// Transient failures worth another attempt at the adapter boundary.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            CalSyncError::Connectivity { .. } | CalSyncError::ProviderTimeout(_)
        )
    }
}

/// Result type alias for calsync operations.
pub type CalSyncResult<T> = Result<T, CalSyncError>;
