//! Depot Storage Library
//!
//! Provider contract and backend implementations for the depot storage
//! engine.
//!
//! # Storage key format
//!
//! Keys are server-generated relative paths of the form
//! `YYYY/MM/DD/{random-id}.{ext}`. The caller-supplied filename only ever
//! contributes a sanitized extension; it is never used verbatim as the
//! on-disk path. Keys must not contain `..` or a leading `/`. Key
//! generation is centralized in the `keys` module so all backends stay
//! consistent.

pub mod factory;
pub mod keys;
pub mod local;
pub mod traits;

// Re-export commonly used types
pub use depot_core::{Bucket, StorageConfig, StorageError, StorageResult};
pub use factory::{create_provider, ProviderKind};
pub use keys::{generate_key, sanitize_filename};
pub use local::LocalProvider;
pub use traits::{ByteStream, ObjectRead, StorageProvider};
