//! Error types for LumenStore operations
//!
//! Every fallible store call returns a [`StoreError`]. Variants carry enough
//! context (path, key, limits) to tell the operator what went wrong without
//! having to reproduce it.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// LumenStore error types with detailed context
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    /// The backing file exists but does not hold a valid dataset.
    ///
    /// Fatal to store construction: the existing file is never replaced.
    #[error("corrupt store at {}: {reason}", .path.display())]
    CorruptStore {
        /// Backing file that failed to decode
        path: PathBuf,
        /// Decoder message
        reason: String,
    },

    /// I/O operation failed while loading or syncing the backing file
    #[error("I/O error{}: {message} ({kind})", fmt_path(.path))]
    Io {
        /// The file path where the error occurred
        path: Option<PathBuf>,
        /// The underlying I/O error kind
        kind: std::io::ErrorKind,
        /// Human-readable description
        message: String,
    },

    /// Key is absent or its entry has expired
    #[error("not found: {key}")]
    NotFound {
        /// Requested key
        key: String,
    },

    /// Dataset could not be encoded for writing
    #[error("could not serialize dataset: {message}")]
    Serialize {
        /// Encoder message
        message: String,
    },

    /// TTL cannot be represented as an absolute timestamp
    #[error("ttl {ttl:?} is out of range")]
    TtlOutOfRange {
        /// Requested time-to-live
        ttl: Duration,
    },

    /// Key or value exceeds the configured limit
    #[error("entry {component} too large: {size} bytes exceeds limit of {max} bytes")]
    OversizedEntry {
        /// Whether it's the key or value that's oversized
        component: &'static str,
        /// Actual size in bytes
        size: usize,
        /// Configured limit in bytes
        max: usize,
    },

    /// No driver registered under this name
    #[error("unknown store driver: {driver}")]
    UnknownDriver {
        /// Requested driver name
        driver: String,
    },

    /// Store selection string is not of the form `driver:params`
    #[error("invalid store spec {spec:?}: expected driver:params")]
    InvalidStoreSpec {
        /// The string as given
        spec: String,
    },

    /// Configuration failed validation
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

fn fmt_path(path: &Option<PathBuf>) -> String {
    match path {
        Some(p) => format!(" in {}", p.display()),
        None => String::new(),
    }
}

impl StoreError {
    /// Wrap an I/O error with the path it happened on.
    pub fn io(path: impl Into<PathBuf>, err: &std::io::Error, context: &str) -> Self {
        StoreError::Io {
            path: Some(path.into()),
            kind: err.kind(),
            message: format!("{}: {}", context, err),
        }
    }

    /// True for a missing or expired key.
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound { .. })
    }
}

/// Convert std::io::Error to StoreError::Io
impl From<std::io::Error> for StoreError {
    fn from(err: std::io::Error) -> Self {
        StoreError::Io {
            path: None,
            kind: err.kind(),
            message: err.to_string(),
        }
    }
}

/// Result type alias for LumenStore operations
pub type StoreResult<T> = Result<T, StoreError>;
