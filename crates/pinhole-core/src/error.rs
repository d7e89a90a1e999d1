use thiserror::Error;

/// Result type for repository operations.
pub type Result<T> = std::result::Result<T, StorageError>;

/// Errors raised by the URL store and the user archive.
///
/// `NotFound` and `Gone` describe lookups; every other variant is a backend
/// failure that must reach the caller.
#[derive(Debug, Clone, Error)]
pub enum StorageError {
    #[error("short id not found: {0}")]
    NotFound(String),
    #[error("short id is gone: {0}")]
    Gone(String),
    #[error("storage backend unavailable: {0}")]
    Unavailable(String),
    #[error("storage operation timed out: {0}")]
    Timeout(String),
    #[error("storage query failed: {0}")]
    Query(String),
    #[error("stored data is invalid: {0}")]
    InvalidData(String),
    #[error("snapshot persistence failed: {0}")]
    Persistence(String),
}

impl StorageError {
    /// Returns `true` for errors that mean the backend itself misbehaved.
    pub fn is_backend_failure(&self) -> bool {
        !matches!(self, StorageError::NotFound(_) | StorageError::Gone(_))
    }
}

/// Errors returned by the [`Shortener`](crate::Shortener) facade.
#[derive(Debug, Clone, Error)]
pub enum ShortenerError {
    #[error("not found: {0}")]
    NotFound(String),
    #[error("gone: {0}")]
    Gone(String),
    #[error("batch aborted: {0}")]
    Aborted(String),
    #[error("storage error: {0}")]
    Storage(StorageError),
}

impl From<StorageError> for ShortenerError {
    fn from(value: StorageError) -> Self {
        match value {
            StorageError::NotFound(message) => Self::NotFound(message),
            StorageError::Gone(message) => Self::Gone(message),
            other => Self::Storage(other),
        }
    }
}
