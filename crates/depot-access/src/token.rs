//! Signed token for time-boxed download access (no auth).
//!
//! Payload: expiry_ts (u64 BE) || bucket || '\n' || key.
//! Token = base64url(payload || HMAC-SHA256(secret, payload)).
//!
//! Stateless by design: validity is fully determined by the signature and
//! the current time, so there is no revocation before expiry. The short
//! default lifetime bounds exposure.

use base64::Engine;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use depot_core::constants::DEFAULT_TOKEN_TTL_SECS;
use depot_core::{Bucket, StorageError, StorageResult};

const EXPIRY_LEN: usize = 8;
const MAC_LEN: usize = 32; // SHA256
const SEPARATOR: u8 = b'\n'; // never appears in bucket names or generated keys

/// Issues and validates signed download tokens with a server-held secret.
#[derive(Clone)]
pub struct TokenSigner {
    secret: Vec<u8>,
    ttl: Duration,
}

impl TokenSigner {
    pub fn new(secret: impl Into<Vec<u8>>, ttl: Duration) -> Self {
        TokenSigner {
            secret: secret.into(),
            ttl,
        }
    }

    /// Signer with the default 5-minute token lifetime.
    pub fn with_default_ttl(secret: impl Into<Vec<u8>>) -> Self {
        Self::new(secret, Duration::from_secs(DEFAULT_TOKEN_TTL_SECS))
    }

    /// Build a signed token granting read access to `(bucket, key)` for the
    /// signer's configured lifetime.
    pub fn issue(&self, bucket: Bucket, key: &str) -> String {
        self.issue_with_ttl(bucket, key, self.ttl)
    }

    /// Build a signed token with an explicit lifetime.
    pub fn issue_with_ttl(&self, bucket: Bucket, key: &str, ttl: Duration) -> String {
        let expiry_ts = SystemTime::now()
            .checked_add(ttl)
            .unwrap_or(SystemTime::UNIX_EPOCH)
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs();

        let bucket_bytes = bucket.as_str().as_bytes();
        let mut payload =
            Vec::with_capacity(EXPIRY_LEN + bucket_bytes.len() + 1 + key.len());
        payload.extend_from_slice(&expiry_ts.to_be_bytes());
        payload.extend_from_slice(bucket_bytes);
        payload.push(SEPARATOR);
        payload.extend_from_slice(key.as_bytes());

        let mut mac =
            Hmac::<Sha256>::new_from_slice(&self.secret).expect("HMAC accepts any key size");
        mac.update(&payload);
        let tag = mac.finalize().into_bytes();

        let mut token_bytes = payload;
        token_bytes.extend_from_slice(&tag);

        base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(token_bytes)
    }

    /// Verify a token and return the `(bucket, key)` it grants access to.
    ///
    /// Forged, malformed, and expired tokens all fail with a `Signature`
    /// error; the MAC comparison is constant-time.
    pub fn validate(&self, token: &str) -> StorageResult<(Bucket, String)> {
        let decoded = base64::engine::general_purpose::URL_SAFE_NO_PAD
            .decode(token)
            .map_err(|_| StorageError::Signature("Invalid download token".to_string()))?;

        // Smallest valid payload: expiry + one-char bucket + separator + one-char key.
        if decoded.len() < EXPIRY_LEN + 3 + MAC_LEN {
            return Err(StorageError::Signature(
                "Invalid download token".to_string(),
            ));
        }

        let (payload, tag) = decoded.split_at(decoded.len() - MAC_LEN);
        let mut mac =
            Hmac::<Sha256>::new_from_slice(&self.secret).expect("HMAC accepts any key size");
        mac.update(payload);
        mac.verify_slice(tag)
            .map_err(|_| StorageError::Signature("Invalid download token".to_string()))?;

        // Signature checks out; the payload is trustworthy from here on.
        let expiry_ts = u64::from_be_bytes(
            payload[..EXPIRY_LEN]
                .try_into()
                .expect("length checked above"),
        );
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs();
        if now > expiry_ts {
            return Err(StorageError::Signature(
                "Download token has expired".to_string(),
            ));
        }

        let rest = &payload[EXPIRY_LEN..];
        let sep = rest
            .iter()
            .position(|&b| b == SEPARATOR)
            .ok_or_else(|| StorageError::Signature("Invalid download token".to_string()))?;
        let bucket = std::str::from_utf8(&rest[..sep])
            .map_err(|_| StorageError::Signature("Invalid download token".to_string()))?
            .parse::<Bucket>()
            .map_err(|_| StorageError::Signature("Invalid download token".to_string()))?;
        let key = std::str::from_utf8(&rest[sep + 1..])
            .map_err(|_| StorageError::Signature("Invalid download token".to_string()))?;
        if key.is_empty() {
            return Err(StorageError::Signature(
                "Invalid download token".to_string(),
            ));
        }

        Ok((bucket, key.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signer() -> TokenSigner {
        TokenSigner::with_default_ttl(b"test-secret-key".to_vec())
    }

    #[test]
    fn test_issue_validate_round_trip() {
        let signer = signer();
        let token = signer.issue(Bucket::Uploads, "2024/06/01/abc123.png");
        let (bucket, key) = signer.validate(&token).unwrap();
        assert_eq!(bucket, Bucket::Uploads);
        assert_eq!(key, "2024/06/01/abc123.png");
    }

    #[test]
    fn test_expired_token_rejected() {
        let signer = signer();
        let token = signer.issue_with_ttl(Bucket::Exports, "2024/06/01/x.csv", Duration::ZERO);
        std::thread::sleep(Duration::from_millis(1100));
        assert!(matches!(
            signer.validate(&token),
            Err(StorageError::Signature(_))
        ));
    }

    #[test]
    fn test_tampered_token_rejected() {
        let signer = signer();
        let token = signer.issue(Bucket::Uploads, "2024/06/01/abc123.png");

        let mut raw = base64::engine::general_purpose::URL_SAFE_NO_PAD
            .decode(&token)
            .unwrap();
        // Flip a payload byte; the MAC no longer matches.
        raw[10] ^= 0x01;
        let forged = base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(raw);
        assert!(matches!(
            signer.validate(&forged),
            Err(StorageError::Signature(_))
        ));
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let token = signer().issue(Bucket::Uploads, "2024/06/01/abc123.png");
        let other = TokenSigner::with_default_ttl(b"a-different-secret".to_vec());
        assert!(matches!(
            other.validate(&token),
            Err(StorageError::Signature(_))
        ));
    }

    #[test]
    fn test_malformed_token_rejected() {
        let signer = signer();
        assert!(matches!(
            signer.validate("not-a-token"),
            Err(StorageError::Signature(_))
        ));
        assert!(matches!(
            signer.validate(""),
            Err(StorageError::Signature(_))
        ));
    }
}
