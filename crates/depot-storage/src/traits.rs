//! Storage provider contract
//!
//! This module defines the `StorageProvider` trait that all backends must
//! implement. It is the only language backends speak to the rest of the
//! system: callers hand over a byte stream plus declared size and content
//! type, and get object metadata back.

use async_trait::async_trait;
use bytes::Bytes;
use futures::Stream;
use std::pin::Pin;
use tokio::io::AsyncRead;

use depot_core::{Bucket, ObjectPage, PutResult, StorageResult, StoredObjectMeta};

/// Stream of object bytes returned by `get`.
pub type ByteStream = Pin<Box<dyn Stream<Item = StorageResult<Bytes>> + Send>>;

/// A readable object: its bytes, size, and stored content type.
pub struct ObjectRead {
    pub stream: ByteStream,
    pub size: u64,
    pub content_type: String,
}

/// Storage provider contract
///
/// Backends are selected once at startup through configuration and accessed
/// through dynamic dispatch. Implementations must be safe to call
/// concurrently; the only ordering guarantee required is that a reader
/// never observes a partially written object.
#[async_trait]
pub trait StorageProvider: Send + Sync {
    /// Store a byte stream and return its key, checksum, and size.
    ///
    /// `size` is the declared byte count; it must be positive, within the
    /// per-bucket maximum, and match the number of bytes actually read
    /// from `reader`. Bytes are durably persisted before this returns; on
    /// failure no partial object remains visible under the final key.
    async fn put(
        &self,
        bucket: Bucket,
        original_filename: &str,
        content_type: &str,
        size: u64,
        reader: Pin<Box<dyn AsyncRead + Send + Unpin>>,
        created_by: Option<&str>,
    ) -> StorageResult<PutResult>;

    /// Open an object for reading. Fails with `NotFound` if the key does
    /// not exist in that bucket.
    async fn get(&self, bucket: Bucket, key: &str) -> StorageResult<ObjectRead>;

    /// Remove an object. Idempotent: deleting a non-existent key is a
    /// no-op success, to simplify cleanup and retry paths.
    async fn delete(&self, bucket: Bucket, key: &str) -> StorageResult<()>;

    /// List objects whose key starts with `prefix`, sorted by key and
    /// paginated by an opaque cursor. `limit` of 0 means the default page
    /// size.
    async fn list(
        &self,
        bucket: Bucket,
        prefix: Option<&str>,
        cursor: Option<&str>,
        limit: usize,
    ) -> StorageResult<ObjectPage>;

    /// Check whether an object exists.
    async fn exists(&self, bucket: Bucket, key: &str) -> StorageResult<bool>;

    /// Size in bytes of an object, if it exists.
    async fn content_length(&self, bucket: Bucket, key: &str) -> StorageResult<u64>;

    /// Fetch the stored metadata record without streaming the bytes, so
    /// callers can re-verify checksums cheaply.
    async fn head(&self, bucket: Bucket, key: &str) -> StorageResult<StoredObjectMeta>;
}
