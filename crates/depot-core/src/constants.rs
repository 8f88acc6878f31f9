//! Shared constants for the storage engine.

/// Smallest configurable per-bucket file size limit, in megabytes.
pub const MIN_FILE_SIZE_MB: u32 = 1;

/// Largest configurable per-bucket file size limit, in megabytes.
pub const MAX_FILE_SIZE_MB: u32 = 1000;

/// Default per-bucket file size limit, in megabytes.
pub const DEFAULT_FILE_SIZE_MB: u32 = 50;

/// Default signed-token lifetime, in seconds.
pub const DEFAULT_TOKEN_TTL_SECS: u64 = 300;

/// Default page size for `list`.
pub const DEFAULT_LIST_LIMIT: usize = 100;

/// Hard cap on the page size for `list`.
pub const MAX_LIST_LIMIT: usize = 1000;

/// Placeholder used when sanitization produces an empty filename.
pub const FALLBACK_FILENAME: &str = "unnamed";

/// Content types accepted for image uploads (brand logos and similar).
pub const IMAGE_CONTENT_TYPES: &[&str] = &[
    "image/png",
    "image/jpeg",
    "image/gif",
    "image/webp",
    "image/svg+xml",
];
