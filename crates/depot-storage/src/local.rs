//! Local filesystem storage provider
//!
//! Objects live under `<base_path>/<bucket>/<key>` with a `<key>.meta`
//! sidecar holding the serialized [`StoredObjectMeta`]. Writes stream into
//! a temp file while a SHA-256 digest is computed, then rename atomically
//! into place, so readers never observe a partially written object.

use async_trait::async_trait;
use base64::Engine;
use chrono::Utc;
use futures::StreamExt;
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::time::Instant;
use tokio::fs;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWriteExt};
use uuid::Uuid;

use depot_core::constants::{DEFAULT_LIST_LIMIT, MAX_LIST_LIMIT};
use depot_core::{
    Bucket, ObjectEntry, ObjectPage, PutResult, StorageConfig, StorageError, StorageResult,
    StoredObjectMeta,
};

use crate::keys;
use crate::traits::{ObjectRead, StorageProvider};

const TMP_PREFIX: &str = ".tmp-";
const META_SUFFIX: &str = ".meta";
const COPY_BUF_SIZE: usize = 64 * 1024;

/// Local filesystem storage implementation
#[derive(Clone)]
pub struct LocalProvider {
    config: StorageConfig,
}

impl LocalProvider {
    /// Create a new LocalProvider, creating the base and bucket directories
    /// with owner-only permissions if absent.
    pub async fn new(config: StorageConfig) -> StorageResult<Self> {
        config.validate()?;

        ensure_dir(&config.base_path).await.map_err(|e| {
            StorageError::Config(format!("Failed to create storage directory: {}", e))
        })?;
        for bucket in &config.buckets {
            ensure_dir(&config.base_path.join(bucket.as_str()))
                .await
                .map_err(|e| {
                    StorageError::Config(format!("Failed to create bucket directory: {}", e))
                })?;
        }

        Ok(LocalProvider { config })
    }

    /// Convert a storage key to a filesystem path with security validation.
    ///
    /// Generated keys never contain traversal sequences, but the check is
    /// repeated here so a hostile key handed straight to `get`/`delete`
    /// cannot escape the bucket directory.
    fn key_to_path(&self, bucket: Bucket, key: &str) -> StorageResult<PathBuf> {
        if key.is_empty() || key.contains("..") || key.starts_with('/') {
            return Err(StorageError::Validation(
                "Storage key contains invalid characters".to_string(),
            ));
        }
        Ok(self.config.base_path.join(bucket.as_str()).join(key))
    }

    fn meta_path(path: &Path) -> PathBuf {
        let mut os = path.as_os_str().to_owned();
        os.push(META_SUFFIX);
        PathBuf::from(os)
    }

    async fn read_meta(path: &Path) -> StorageResult<StoredObjectMeta> {
        let raw = fs::read(Self::meta_path(path)).await.map_err(|e| {
            StorageError::Io(format!("Failed to read object metadata: {}", e))
        })?;
        serde_json::from_slice(&raw)
            .map_err(|e| StorageError::Io(format!("Corrupt object metadata record: {}", e)))
    }

    /// Stream the upload into a temp file, digesting as bytes arrive.
    /// Returns the checksum once exactly `declared_size` bytes landed.
    async fn write_temp(
        tmp_path: &Path,
        reader: &mut Pin<Box<dyn AsyncRead + Send + Unpin>>,
        declared_size: u64,
    ) -> StorageResult<String> {
        let mut file = fs::File::create(tmp_path)
            .await
            .map_err(|e| StorageError::Io(format!("Failed to create temporary file: {}", e)))?;

        let mut hasher = Sha256::new();
        let mut written: u64 = 0;
        let mut buf = vec![0u8; COPY_BUF_SIZE];
        loop {
            let n = reader
                .read(&mut buf)
                .await
                .map_err(|e| StorageError::Io(format!("Failed to read upload stream: {}", e)))?;
            if n == 0 {
                break;
            }
            written += n as u64;
            if written > declared_size {
                return Err(StorageError::Validation(format!(
                    "Upload exceeds declared size of {} bytes",
                    declared_size
                )));
            }
            hasher.update(&buf[..n]);
            file.write_all(&buf[..n])
                .await
                .map_err(|e| StorageError::Io(format!("Failed to write object bytes: {}", e)))?;
        }

        if written != declared_size {
            return Err(StorageError::Validation(format!(
                "Upload size mismatch: declared {} bytes, received {}",
                declared_size, written
            )));
        }

        file.sync_all()
            .await
            .map_err(|e| StorageError::Io(format!("Failed to sync object bytes: {}", e)))?;

        Ok(hex::encode(hasher.finalize()))
    }

    async fn write_meta_sidecar(
        meta_tmp: &Path,
        meta_path: &Path,
        meta: &StoredObjectMeta,
    ) -> StorageResult<()> {
        let raw = serde_json::to_vec(meta)
            .map_err(|e| StorageError::Io(format!("Failed to serialize object metadata: {}", e)))?;
        fs::write(meta_tmp, raw)
            .await
            .map_err(|e| StorageError::Io(format!("Failed to write object metadata: {}", e)))?;
        fs::rename(meta_tmp, meta_path)
            .await
            .map_err(|e| StorageError::Io(format!("Failed to finalize object metadata: {}", e)))
    }
}

async fn ensure_dir(path: &Path) -> std::io::Result<()> {
    fs::create_dir_all(path).await?;
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(path, std::fs::Permissions::from_mode(0o700)).await?;
    }
    Ok(())
}

async fn remove_quiet(path: &Path) {
    let _ = fs::remove_file(path).await;
}

fn encode_cursor(key: &str) -> String {
    base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(key.as_bytes())
}

fn decode_cursor(cursor: &str) -> StorageResult<String> {
    let raw = base64::engine::general_purpose::URL_SAFE_NO_PAD
        .decode(cursor)
        .map_err(|_| StorageError::Validation("Invalid list cursor".to_string()))?;
    String::from_utf8(raw).map_err(|_| StorageError::Validation("Invalid list cursor".to_string()))
}

#[async_trait]
impl StorageProvider for LocalProvider {
    async fn put(
        &self,
        bucket: Bucket,
        original_filename: &str,
        content_type: &str,
        size: u64,
        mut reader: Pin<Box<dyn AsyncRead + Send + Unpin>>,
        created_by: Option<&str>,
    ) -> StorageResult<PutResult> {
        if !self.config.bucket_enabled(bucket) {
            return Err(StorageError::Validation(format!(
                "Bucket '{}' is not enabled",
                bucket
            )));
        }
        if size == 0 {
            return Err(StorageError::Validation(
                "File size must be positive".to_string(),
            ));
        }
        if size > self.config.max_file_size_bytes() {
            return Err(StorageError::Validation(format!(
                "File size exceeds maximum allowed size of {} MB",
                self.config.max_file_size_mb
            )));
        }

        let key = keys::generate_key(original_filename);
        let path = self.key_to_path(bucket, &key)?;
        let start = Instant::now();

        let parent = path
            .parent()
            .map(Path::to_path_buf)
            .ok_or_else(|| StorageError::Io("Object path has no parent directory".to_string()))?;
        ensure_dir(&parent)
            .await
            .map_err(|e| StorageError::Io(format!("Failed to create object directory: {}", e)))?;

        let tmp_id = Uuid::new_v4().simple().to_string();
        let tmp_path = parent.join(format!("{}{}", TMP_PREFIX, tmp_id));

        let checksum = match Self::write_temp(&tmp_path, &mut reader, size).await {
            Ok(checksum) => checksum,
            Err(e) => {
                remove_quiet(&tmp_path).await;
                return Err(e);
            }
        };

        let meta = StoredObjectMeta {
            id: Uuid::new_v4(),
            bucket,
            key: key.clone(),
            original_filename: keys::sanitize_filename(original_filename),
            size,
            content_type: content_type.to_string(),
            checksum_sha256: checksum.clone(),
            created_by: created_by.map(str::to_string),
            created_at: Utc::now(),
        };

        let meta_path = Self::meta_path(&path);
        let meta_tmp = parent.join(format!("{}{}{}", TMP_PREFIX, tmp_id, META_SUFFIX));
        if let Err(e) = Self::write_meta_sidecar(&meta_tmp, &meta_path, &meta).await {
            remove_quiet(&tmp_path).await;
            remove_quiet(&meta_tmp).await;
            return Err(e);
        }

        // The object becomes visible only once this rename lands.
        if let Err(e) = fs::rename(&tmp_path, &path).await {
            remove_quiet(&tmp_path).await;
            remove_quiet(&meta_path).await;
            return Err(StorageError::Io(format!(
                "Failed to finalize object write: {}",
                e
            )));
        }

        tracing::info!(
            bucket = %bucket,
            key = %key,
            size_bytes = size,
            checksum = %checksum,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Stored object"
        );

        Ok(PutResult {
            key,
            checksum_sha256: checksum,
            size,
        })
    }

    async fn get(&self, bucket: Bucket, key: &str) -> StorageResult<ObjectRead> {
        let path = self.key_to_path(bucket, key)?;

        if !fs::try_exists(&path).await.unwrap_or(false) {
            return Err(StorageError::NotFound(format!(
                "Object not found: {}/{}",
                bucket, key
            )));
        }

        let content_type = match Self::read_meta(&path).await {
            Ok(meta) => meta.content_type,
            // Sidecar lost out-of-band; the bytes are still servable.
            Err(_) => "application/octet-stream".to_string(),
        };

        let file = fs::File::open(&path)
            .await
            .map_err(|e| StorageError::Io(format!("Failed to open object: {}", e)))?;
        let size = file
            .metadata()
            .await
            .map_err(|e| StorageError::Io(format!("Failed to stat object: {}", e)))?
            .len();

        let stream = tokio_util::io::ReaderStream::new(file).map(|result| {
            result.map_err(|e| StorageError::Io(format!("Failed to read object chunk: {}", e)))
        });

        Ok(ObjectRead {
            stream: Box::pin(stream),
            size,
            content_type,
        })
    }

    async fn delete(&self, bucket: Bucket, key: &str) -> StorageResult<()> {
        let path = self.key_to_path(bucket, key)?;
        let start = Instant::now();

        if !fs::try_exists(&path).await.unwrap_or(false) {
            return Ok(());
        }

        fs::remove_file(&path)
            .await
            .map_err(|e| StorageError::Io(format!("Failed to delete object: {}", e)))?;
        remove_quiet(&Self::meta_path(&path)).await;

        tracing::info!(
            bucket = %bucket,
            key = %key,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Deleted object"
        );

        Ok(())
    }

    async fn list(
        &self,
        bucket: Bucket,
        prefix: Option<&str>,
        cursor: Option<&str>,
        limit: usize,
    ) -> StorageResult<ObjectPage> {
        let limit = if limit == 0 {
            DEFAULT_LIST_LIMIT
        } else {
            limit.min(MAX_LIST_LIMIT)
        };

        let root = self.config.base_path.join(bucket.as_str());
        let mut entries: Vec<ObjectEntry> = Vec::new();

        if fs::try_exists(&root).await.unwrap_or(false) {
            let mut stack = vec![root.clone()];
            while let Some(dir) = stack.pop() {
                let mut read_dir = fs::read_dir(&dir)
                    .await
                    .map_err(|e| StorageError::Io(format!("Failed to list bucket: {}", e)))?;
                while let Some(entry) = read_dir
                    .next_entry()
                    .await
                    .map_err(|e| StorageError::Io(format!("Failed to list bucket: {}", e)))?
                {
                    let file_type = entry
                        .file_type()
                        .await
                        .map_err(|e| StorageError::Io(format!("Failed to list bucket: {}", e)))?;
                    if file_type.is_dir() {
                        stack.push(entry.path());
                        continue;
                    }
                    let name = entry.file_name().to_string_lossy().into_owned();
                    if name.starts_with(TMP_PREFIX) || name.ends_with(META_SUFFIX) {
                        continue;
                    }
                    let rel = match entry.path().strip_prefix(&root) {
                        Ok(p) => p.to_string_lossy().replace('\\', "/"),
                        Err(_) => continue,
                    };
                    if let Some(prefix) = prefix {
                        if !rel.starts_with(prefix) {
                            continue;
                        }
                    }
                    let size = entry.metadata().await.map(|m| m.len()).unwrap_or(0);
                    entries.push(ObjectEntry { key: rel, size });
                }
            }
        }

        entries.sort_by(|a, b| a.key.cmp(&b.key));

        if let Some(cursor) = cursor {
            let after = decode_cursor(cursor)?;
            entries.retain(|e| e.key.as_str() > after.as_str());
        }

        let next_cursor = if entries.len() > limit {
            entries.truncate(limit);
            entries.last().map(|e| encode_cursor(&e.key))
        } else {
            None
        };

        Ok(ObjectPage {
            items: entries,
            next_cursor,
        })
    }

    async fn exists(&self, bucket: Bucket, key: &str) -> StorageResult<bool> {
        let path = self.key_to_path(bucket, key)?;
        Ok(fs::try_exists(&path).await.unwrap_or(false))
    }

    async fn content_length(&self, bucket: Bucket, key: &str) -> StorageResult<u64> {
        let path = self.key_to_path(bucket, key)?;
        if !fs::try_exists(&path).await.unwrap_or(false) {
            return Err(StorageError::NotFound(format!(
                "Object not found: {}/{}",
                bucket, key
            )));
        }
        let meta = fs::metadata(&path)
            .await
            .map_err(|e| StorageError::Io(format!("Failed to stat object: {}", e)))?;
        Ok(meta.len())
    }

    async fn head(&self, bucket: Bucket, key: &str) -> StorageResult<StoredObjectMeta> {
        let path = self.key_to_path(bucket, key)?;
        if !fs::try_exists(&path).await.unwrap_or(false) {
            return Err(StorageError::NotFound(format!(
                "Object not found: {}/{}",
                bucket, key
            )));
        }
        Self::read_meta(&path).await
    }
}
