//! Error types module
//!
//! All storage engine failures are unified under the `StorageError` enum.
//! Low-level failures (filesystem, interrupted streams) are translated into
//! this taxonomy before they cross the engine boundary; client-facing
//! messages never carry filesystem paths or stack detail.

use std::io;

/// Log level for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Debug level - for expected errors like validation failures
    Debug,
    /// Warning level - for authorization failures (bad tokens)
    Warn,
    /// Error level - for unexpected failures
    Error,
}

/// Metadata for error responses - defines how an error should be presented
/// This trait allows errors to self-describe their HTTP response characteristics
pub trait ErrorMetadata {
    /// HTTP status code to return
    fn http_status_code(&self) -> u16;

    /// Machine-readable error code (e.g., "VALIDATION_ERROR")
    fn error_code(&self) -> &'static str;

    /// Whether this error is recoverable (can be retried)
    fn is_recoverable(&self) -> bool;

    /// Client-facing message (may differ from internal error message)
    fn client_message(&self) -> String;

    /// Whether details should be hidden in production
    fn is_sensitive(&self) -> bool;

    /// Log level for this error
    fn log_level(&self) -> LogLevel;
}

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Signature error: {0}")]
    Signature(String),

    #[error("IO error: {0}")]
    Io(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

impl From<io::Error> for StorageError {
    fn from(err: io::Error) -> Self {
        StorageError::Io(err.to_string())
    }
}

/// Static metadata for each variant: (http_status, error_code, recoverable, sensitive, log_level).
fn static_metadata(err: &StorageError) -> (u16, &'static str, bool, bool, LogLevel) {
    match err {
        StorageError::Validation(_) => (400, "VALIDATION_ERROR", false, false, LogLevel::Debug),
        StorageError::NotFound(_) => (404, "NOT_FOUND", false, false, LogLevel::Debug),
        StorageError::Signature(_) => (403, "SIGNATURE_ERROR", false, false, LogLevel::Warn),
        StorageError::Io(_) => (500, "IO_ERROR", true, true, LogLevel::Error),
        StorageError::Config(_) => (500, "CONFIG_ERROR", false, true, LogLevel::Error),
    }
}

impl StorageError {
    /// Get the error type name for detailed error responses
    pub fn error_type(&self) -> &'static str {
        match self {
            StorageError::Validation(_) => "Validation",
            StorageError::NotFound(_) => "NotFound",
            StorageError::Signature(_) => "Signature",
            StorageError::Io(_) => "Io",
            StorageError::Config(_) => "Config",
        }
    }
}

impl ErrorMetadata for StorageError {
    fn http_status_code(&self) -> u16 {
        static_metadata(self).0
    }

    fn error_code(&self) -> &'static str {
        static_metadata(self).1
    }

    fn is_recoverable(&self) -> bool {
        static_metadata(self).2
    }

    fn is_sensitive(&self) -> bool {
        static_metadata(self).3
    }

    fn log_level(&self) -> LogLevel {
        static_metadata(self).4
    }

    fn client_message(&self) -> String {
        match self {
            StorageError::Validation(msg) => msg.clone(),
            StorageError::NotFound(msg) => msg.clone(),
            StorageError::Signature(msg) => msg.clone(),
            // Internal failures: the raw message may name files or devices.
            StorageError::Io(_) => "Internal storage error".to_string(),
            StorageError::Config(_) => "Storage engine misconfigured".to_string(),
        }
    }
}
