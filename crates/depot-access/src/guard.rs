//! Ingestion guard in front of `put`.
//!
//! Enforces the single-file-per-request rule, per-bucket size limits, and
//! MIME allow-lists before any bytes reach a provider. Stream-read failures
//! past this point surface as IO errors and the provider guarantees that no
//! partial object is committed.

use std::io;
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio::io::{AsyncRead, ReadBuf};

use depot_core::{Bucket, StorageConfig, StorageError, StorageResult};

/// Validates upload requests against the engine configuration.
#[derive(Clone)]
pub struct IngestionGuard {
    config: StorageConfig,
}

impl IngestionGuard {
    pub fn new(config: StorageConfig) -> Self {
        IngestionGuard { config }
    }

    /// Enforce the one-file-per-request rule: exactly one part, no more.
    pub fn single_file<P>(&self, mut parts: Vec<P>) -> StorageResult<P> {
        match parts.len() {
            0 => Err(StorageError::Validation("No file provided".to_string())),
            1 => Ok(parts.remove(0)),
            _ => Err(StorageError::Validation(
                "Multiple files are not allowed; send exactly one file per upload".to_string(),
            )),
        }
    }

    /// Validate bucket, declared size, and content type before streaming.
    ///
    /// An empty `allowed_types` list disables the MIME check (callers that
    /// accept anything, e.g. raw asset ingestion).
    pub fn check(
        &self,
        bucket: Bucket,
        content_type: &str,
        declared_size: u64,
        allowed_types: &[&str],
    ) -> StorageResult<()> {
        if !self.config.bucket_enabled(bucket) {
            return Err(StorageError::Validation(format!(
                "Bucket '{}' is not enabled",
                bucket
            )));
        }
        if declared_size == 0 {
            return Err(StorageError::Validation(
                "File size must be positive".to_string(),
            ));
        }
        if declared_size > self.config.max_file_size_bytes() {
            tracing::warn!(
                bucket = %bucket,
                declared_size,
                limit_mb = self.config.max_file_size_mb,
                "Rejected oversize upload"
            );
            return Err(StorageError::Validation(format!(
                "File size exceeds maximum allowed size of {} MB",
                self.config.max_file_size_mb
            )));
        }

        if !allowed_types.is_empty() {
            let normalized = normalize_mime_type(content_type).to_lowercase();
            if !allowed_types.iter().any(|ct| normalized == ct.to_lowercase()) {
                tracing::warn!(
                    bucket = %bucket,
                    content_type = %normalized,
                    "Rejected upload with disallowed content type"
                );
                return Err(StorageError::Validation(format!(
                    "Invalid content type. Allowed types: {}",
                    allowed_types.join(", ")
                )));
            }
        }

        Ok(())
    }

    /// Wrap an upload stream so reads past the per-bucket size limit abort
    /// instead of consuming unbounded disk. Backstop behind the declared
    /// size check: clients that lie about `size` are cut off mid-stream.
    pub fn bounded_reader<R>(&self, reader: R) -> BoundedReader<R>
    where
        R: AsyncRead + Unpin,
    {
        BoundedReader {
            inner: reader,
            remaining: self.config.max_file_size_bytes(),
        }
    }
}

/// Normalize a MIME type by stripping parameters
/// (e.g. "image/jpeg; charset=utf-8" -> "image/jpeg").
fn normalize_mime_type(content_type: &str) -> &str {
    content_type
        .split(';')
        .next()
        .map(|s| s.trim())
        .unwrap_or(content_type)
}

/// AsyncRead adapter that fails once more than its byte allowance arrives.
pub struct BoundedReader<R> {
    inner: R,
    remaining: u64,
}

impl<R: AsyncRead + Unpin> AsyncRead for BoundedReader<R> {
    fn poll_read(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        let this = self.get_mut();
        let before = buf.filled().len();
        match Pin::new(&mut this.inner).poll_read(cx, buf) {
            Poll::Ready(Ok(())) => {
                let read = (buf.filled().len() - before) as u64;
                if read > this.remaining {
                    // AsyncRead requires that no bytes are reported read when
                    // an error is returned; roll back the fill position.
                    buf.set_filled(before);
                    return Poll::Ready(Err(io::Error::new(
                        io::ErrorKind::InvalidData,
                        "upload stream exceeds the configured size limit",
                    )));
                }
                this.remaining -= read;
                Poll::Ready(Ok(()))
            }
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::AsyncReadExt;

    fn guard_with_limit_mb(mb: u32) -> IngestionGuard {
        let mut config = StorageConfig::new("/tmp/depot-test", "test-secret");
        config.max_file_size_mb = mb;
        IngestionGuard::new(config)
    }

    #[test]
    fn test_single_file_rule() {
        let guard = guard_with_limit_mb(50);
        assert!(matches!(
            guard.single_file(Vec::<&str>::new()),
            Err(StorageError::Validation(_))
        ));
        assert_eq!(guard.single_file(vec!["logo.png"]).unwrap(), "logo.png");
        assert!(matches!(
            guard.single_file(vec!["a.png", "b.png"]),
            Err(StorageError::Validation(_))
        ));
    }

    #[test]
    fn test_size_limit() {
        let guard = guard_with_limit_mb(50);
        assert!(guard
            .check(Bucket::Uploads, "image/png", 2 * 1024 * 1024, &[])
            .is_ok());

        // 60 MB declared against a 50 MB cap.
        let result = guard.check(Bucket::Uploads, "image/png", 60 * 1024 * 1024, &[]);
        assert!(matches!(result, Err(StorageError::Validation(_))));

        let result = guard.check(Bucket::Uploads, "image/png", 0, &[]);
        assert!(matches!(result, Err(StorageError::Validation(_))));
    }

    #[test]
    fn test_mime_allow_list() {
        let guard = guard_with_limit_mb(50);
        let allowed = depot_core::constants::IMAGE_CONTENT_TYPES;

        assert!(guard.check(Bucket::Uploads, "image/png", 100, allowed).is_ok());
        // Parameters and case are normalized away.
        assert!(guard
            .check(Bucket::Uploads, "IMAGE/JPEG; charset=utf-8", 100, allowed)
            .is_ok());
        assert!(matches!(
            guard.check(Bucket::Uploads, "application/x-sh", 100, allowed),
            Err(StorageError::Validation(_))
        ));
    }

    #[test]
    fn test_disabled_bucket() {
        let mut config = StorageConfig::new("/tmp/depot-test", "test-secret");
        config.buckets = vec![Bucket::Uploads];
        let guard = IngestionGuard::new(config);
        assert!(matches!(
            guard.check(Bucket::Exports, "text/csv", 100, &[]),
            Err(StorageError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_bounded_reader_cuts_off_oversize_stream() {
        let mut config = StorageConfig::new("/tmp/depot-test", "test-secret");
        config.max_file_size_mb = 1;
        let guard = IngestionGuard::new(config);

        let data = vec![0u8; 2 * 1024 * 1024];
        let mut reader = guard.bounded_reader(std::io::Cursor::new(data));

        let mut sink = Vec::new();
        let result = reader.read_to_end(&mut sink).await;
        assert!(result.is_err());
        assert_eq!(result.unwrap_err().kind(), io::ErrorKind::InvalidData);
    }

    #[tokio::test]
    async fn test_bounded_reader_passes_within_limit() {
        let guard = guard_with_limit_mb(1);
        let data = vec![7u8; 1024];
        let mut reader = guard.bounded_reader(std::io::Cursor::new(data.clone()));

        let mut sink = Vec::new();
        reader.read_to_end(&mut sink).await.unwrap();
        assert_eq!(sink, data);
    }
}
