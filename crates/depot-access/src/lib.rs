//! Depot Access Library
//!
//! The access-control boundary around the storage engine: ingestion
//! validation in front of `put`, signed time-boxed download tokens, and the
//! public URL shapes that carry `(bucket, key)` without exposing the
//! storage backend.

pub mod guard;
pub mod token;
pub mod url;

// Re-export commonly used types
pub use guard::{BoundedReader, IngestionGuard};
pub use token::TokenSigner;
pub use url::{direct_url, parse_url_path, proxy_url};
