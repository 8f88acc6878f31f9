//! Domain models for stored objects.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::bucket::Bucket;

/// Record of a successfully stored file.
///
/// Created exactly once per successful `put`, never mutated, removed only by
/// `delete`. The local provider persists this record as a sidecar next to
/// the object bytes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredObjectMeta {
    pub id: Uuid,
    pub bucket: Bucket,
    /// Server-generated relative path identifying the object within its bucket.
    pub key: String,
    /// Sanitized original filename, kept for display only. Never used as the
    /// on-disk path.
    pub original_filename: String,
    pub size: u64,
    pub content_type: String,
    /// SHA-256 digest of the object bytes, 64 lowercase hex characters.
    pub checksum_sha256: String,
    pub created_by: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Result of a successful `put`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PutResult {
    pub key: String,
    /// 64 lowercase hex characters.
    pub checksum_sha256: String,
    pub size: u64,
}

/// One entry in a `list` page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ObjectEntry {
    pub key: String,
    pub size: u64,
}

/// A page of `list` results. `next_cursor` is `None` when exhausted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ObjectPage {
    pub items: Vec<ObjectEntry>,
    pub next_cursor: Option<String>,
}
