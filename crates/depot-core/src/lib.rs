//! Depot Core Library
//!
//! Core domain models, error taxonomy, and configuration shared across the
//! depot storage engine crates.

pub mod bucket;
pub mod config;
pub mod constants;
pub mod error;
pub mod models;

// Re-export commonly used types
pub use bucket::Bucket;
pub use config::StorageConfig;
pub use error::{ErrorMetadata, LogLevel, StorageError, StorageResult};
pub use models::{ObjectEntry, ObjectPage, PutResult, StoredObjectMeta};
