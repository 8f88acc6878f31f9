//! Configuration module
//!
//! The engine is configured once at startup with an explicit
//! [`StorageConfig`] value passed to the provider's constructor. Nothing is
//! read ad hoc from global environment state afterwards, so tests can
//! instantiate multiple isolated providers side by side.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::bucket::Bucket;
use crate::constants::{
    DEFAULT_FILE_SIZE_MB, DEFAULT_TOKEN_TTL_SECS, MAX_FILE_SIZE_MB, MIN_FILE_SIZE_MB,
};
use crate::error::{StorageError, StorageResult};

/// Storage engine configuration
#[derive(Clone, Debug)]
pub struct StorageConfig {
    /// Root directory for stored objects. Created with owner-only
    /// permissions if absent.
    pub base_path: PathBuf,
    /// Per-bucket maximum file size in megabytes (1-1000).
    pub max_file_size_mb: u32,
    /// Enabled buckets. Requests against any other bucket are rejected.
    pub buckets: Vec<Bucket>,
    /// Base URL used when building direct-backend download URLs.
    pub public_base_url: String,
    /// Server-held secret for signing download tokens.
    pub token_secret: String,
    /// Signed-token lifetime in seconds.
    pub token_ttl_secs: u64,
}

impl StorageConfig {
    /// Build a configuration with defaults for everything but the base path
    /// and token secret.
    pub fn new(base_path: impl Into<PathBuf>, token_secret: impl Into<String>) -> Self {
        StorageConfig {
            base_path: base_path.into(),
            max_file_size_mb: DEFAULT_FILE_SIZE_MB,
            buckets: Bucket::ALL.to_vec(),
            public_base_url: "http://localhost:3000".to_string(),
            token_secret: token_secret.into(),
            token_ttl_secs: DEFAULT_TOKEN_TTL_SECS,
        }
    }

    /// Load configuration from `DEPOT_*` environment variables.
    ///
    /// `DEPOT_BASE_PATH` and `DEPOT_TOKEN_SECRET` are required; everything
    /// else falls back to defaults.
    pub fn from_env() -> StorageResult<Self> {
        let base_path = env::var("DEPOT_BASE_PATH")
            .map_err(|_| StorageError::Config("DEPOT_BASE_PATH not configured".to_string()))?;
        let token_secret = env::var("DEPOT_TOKEN_SECRET")
            .map_err(|_| StorageError::Config("DEPOT_TOKEN_SECRET not configured".to_string()))?;

        let max_file_size_mb = match env::var("DEPOT_MAX_FILE_SIZE_MB") {
            Ok(raw) => raw.parse::<u32>().map_err(|_| {
                StorageError::Config(format!("Invalid DEPOT_MAX_FILE_SIZE_MB: {}", raw))
            })?,
            Err(_) => DEFAULT_FILE_SIZE_MB,
        };

        let buckets = match env::var("DEPOT_BUCKETS") {
            Ok(raw) => raw
                .split(',')
                .map(|s| s.trim())
                .filter(|s| !s.is_empty())
                .map(|s| {
                    s.parse::<Bucket>()
                        .map_err(|_| StorageError::Config(format!("Invalid DEPOT_BUCKETS entry: {}", s)))
                })
                .collect::<StorageResult<Vec<_>>>()?,
            Err(_) => Bucket::ALL.to_vec(),
        };

        let public_base_url = env::var("DEPOT_PUBLIC_BASE_URL")
            .unwrap_or_else(|_| "http://localhost:3000".to_string());

        let token_ttl_secs = match env::var("DEPOT_TOKEN_TTL_SECS") {
            Ok(raw) => raw.parse::<u64>().map_err(|_| {
                StorageError::Config(format!("Invalid DEPOT_TOKEN_TTL_SECS: {}", raw))
            })?,
            Err(_) => DEFAULT_TOKEN_TTL_SECS,
        };

        let config = StorageConfig {
            base_path: PathBuf::from(base_path),
            max_file_size_mb,
            buckets,
            public_base_url,
            token_secret,
            token_ttl_secs,
        };
        config.validate()?;
        Ok(config)
    }

    /// Validate ranges and required fields.
    pub fn validate(&self) -> StorageResult<()> {
        if self.base_path.as_os_str().is_empty() {
            return Err(StorageError::Config(
                "Storage base path must not be empty".to_string(),
            ));
        }
        if !(MIN_FILE_SIZE_MB..=MAX_FILE_SIZE_MB).contains(&self.max_file_size_mb) {
            return Err(StorageError::Config(format!(
                "max_file_size_mb must be between {} and {}, got {}",
                MIN_FILE_SIZE_MB, MAX_FILE_SIZE_MB, self.max_file_size_mb
            )));
        }
        if self.buckets.is_empty() {
            return Err(StorageError::Config(
                "At least one bucket must be enabled".to_string(),
            ));
        }
        if self.token_secret.is_empty() {
            return Err(StorageError::Config(
                "Token secret must not be empty".to_string(),
            ));
        }
        if self.token_ttl_secs == 0 {
            return Err(StorageError::Config(
                "Token TTL must be positive".to_string(),
            ));
        }
        Ok(())
    }

    /// Per-bucket maximum file size in bytes.
    pub fn max_file_size_bytes(&self) -> u64 {
        self.max_file_size_mb as u64 * 1024 * 1024
    }

    /// Whether the given bucket is enabled.
    pub fn bucket_enabled(&self, bucket: Bucket) -> bool {
        self.buckets.contains(&bucket)
    }

    /// Signed-token lifetime.
    pub fn token_ttl(&self) -> Duration {
        Duration::from_secs(self.token_ttl_secs)
    }
}
