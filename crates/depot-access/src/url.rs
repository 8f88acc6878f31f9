//! Public URL shapes for stored objects.
//!
//! Two forms resolve to the same `(bucket, key)` pair:
//! - proxy form: `/api/uploads/<bucket>/<key>`
//! - direct-backend form: `<public_base_url>/uploads/<bucket>/<key>`
//!
//! Key segments are percent-encoded on build and percent-decoded on parse.
//! Neither form exposes the filesystem layout under the provider's base
//! path.

use std::str::FromStr;

use depot_core::{Bucket, StorageError, StorageResult};

const PROXY_PREFIX: &str = "/api/uploads/";
const DIRECT_PREFIX: &str = "/uploads/";

/// Build the proxy-form URL path for an object.
pub fn proxy_url(bucket: Bucket, key: &str) -> String {
    format!("{}{}/{}", PROXY_PREFIX, bucket, encode_key(key))
}

/// Build the direct-backend URL for an object.
pub fn direct_url(public_base_url: &str, bucket: Bucket, key: &str) -> String {
    format!(
        "{}{}{}/{}",
        public_base_url.trim_end_matches('/'),
        DIRECT_PREFIX,
        bucket,
        encode_key(key)
    )
}

/// Parse a proxy- or direct-form URL path back into `(bucket, key)`.
///
/// Accepts the path portion only (`/api/uploads/...` or `/uploads/...`);
/// anything else is rejected with a validation error.
pub fn parse_url_path(path: &str) -> StorageResult<(Bucket, String)> {
    let rest = path
        .strip_prefix(PROXY_PREFIX)
        .or_else(|| path.strip_prefix(DIRECT_PREFIX))
        .ok_or_else(|| StorageError::Validation("Unrecognized object URL".to_string()))?;

    let (bucket_str, encoded_key) = rest
        .split_once('/')
        .ok_or_else(|| StorageError::Validation("Object URL is missing a key".to_string()))?;

    let bucket = Bucket::from_str(bucket_str)?;
    let key = decode_key(encoded_key)?;
    if key.is_empty() {
        return Err(StorageError::Validation(
            "Object URL is missing a key".to_string(),
        ));
    }
    // Decoded segments must stay inside the bucket.
    if key.contains("..") || key.starts_with('/') {
        return Err(StorageError::Validation(
            "Object URL contains an invalid key".to_string(),
        ));
    }

    Ok((bucket, key))
}

fn encode_key(key: &str) -> String {
    key.split('/')
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

fn decode_key(encoded: &str) -> StorageResult<String> {
    let mut segments = Vec::new();
    for segment in encoded.split('/') {
        let decoded = urlencoding::decode(segment).map_err(|_| {
            StorageError::Validation("Invalid percent-encoding in object URL".to_string())
        })?;
        segments.push(decoded.into_owned());
    }
    Ok(segments.join("/"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_proxy_round_trip() {
        let url = proxy_url(Bucket::Uploads, "2024/06/01/abc123.png");
        assert_eq!(url, "/api/uploads/uploads/2024/06/01/abc123.png");
        let (bucket, key) = parse_url_path(&url).unwrap();
        assert_eq!(bucket, Bucket::Uploads);
        assert_eq!(key, "2024/06/01/abc123.png");
    }

    #[test]
    fn test_direct_url_shape() {
        let url = direct_url("https://cdn.example.com/", Bucket::Assets, "2024/06/01/a.css");
        assert_eq!(url, "https://cdn.example.com/uploads/assets/2024/06/01/a.css");

        let (bucket, key) = parse_url_path("/uploads/assets/2024/06/01/a.css").unwrap();
        assert_eq!(bucket, Bucket::Assets);
        assert_eq!(key, "2024/06/01/a.css");
    }

    #[test]
    fn test_percent_decoding() {
        let (_, key) = parse_url_path("/api/uploads/uploads/2024/06/01/logo%202.png").unwrap();
        assert_eq!(key, "2024/06/01/logo 2.png");
    }

    #[test]
    fn test_foreign_and_traversal_paths_rejected() {
        assert!(parse_url_path("/api/other/uploads/key.png").is_err());
        assert!(parse_url_path("/api/uploads/secrets/key.png").is_err());
        assert!(parse_url_path("/api/uploads/uploads").is_err());
        assert!(parse_url_path("/api/uploads/uploads/%2e%2e/escape.png").is_err());
    }
}
