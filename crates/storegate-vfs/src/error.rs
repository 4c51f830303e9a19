//! Error types for the virtual filesystem layer

use thiserror::Error;

/// Errors raised by lookup, synthesis, and pseudo-file handle operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VfsError {
    /// No object exists at the given share-relative path.
    #[error("not found: {path}")]
    NotFound {
        /// The share-relative path that failed to resolve.
        path: String,
    },
    /// The path resolved to a file where a directory was required.
    #[error("not a directory: {path}")]
    NotADirectory {
        /// The offending share-relative path.
        path: String,
    },
    /// The operation is not supported on a pseudo entry.
    #[error("unsupported operation on pseudo file: {operation}")]
    UnsupportedOperation {
        /// The rejected operation name.
        operation: String,
    },
    /// The backing content store reported a failure.
    #[error("store error: {reason}")]
    Store {
        /// Detail reported by the store.
        reason: String,
    },
}

/// Result type alias using VfsError as the error type.
pub type Result<T> = std::result::Result<T, VfsError>;
