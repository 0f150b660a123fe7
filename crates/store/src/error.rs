//! Error types for store access.

/// Errors that can occur when talking to the object store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Object storage error
    #[error("object storage error: {0}")]
    ObjectStore(#[from] object_store::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Object not found
    #[error("object not found: {0}")]
    NotFound(String),

    /// Only the `/` hierarchy separator is supported
    #[error("unsupported listing delimiter: {0:?}")]
    UnsupportedDelimiter(char),

    /// Continuation token could not be interpreted
    #[error("malformed continuation token: {0}")]
    InvalidToken(String),

    /// Invalid configuration
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Bucket not found - must exist before the service starts
    #[error("bucket '{0}' does not exist or is not accessible")]
    BucketNotFound(String),

    /// Failure injected by a test double
    #[error("transport failure: {0}")]
    Transport(String),
}

/// Result type alias for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
