//! Bucket namespace
//!
//! Buckets are a small closed set of logical namespaces. They are
//! configuration, not data: the enabled set is read at startup and does not
//! change at runtime.

use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

use crate::error::StorageError;

/// Logical storage namespaces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Bucket {
    Uploads,
    Exports,
    Assets,
}

impl Bucket {
    /// All known buckets, in canonical order.
    pub const ALL: [Bucket; 3] = [Bucket::Uploads, Bucket::Exports, Bucket::Assets];

    pub fn as_str(&self) -> &'static str {
        match self {
            Bucket::Uploads => "uploads",
            Bucket::Exports => "exports",
            Bucket::Assets => "assets",
        }
    }
}

impl FromStr for Bucket {
    type Err = StorageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "uploads" => Ok(Bucket::Uploads),
            "exports" => Ok(Bucket::Exports),
            "assets" => Ok(Bucket::Assets),
            _ => Err(StorageError::Validation(format!("Unknown bucket: {}", s))),
        }
    }
}

impl Display for Bucket {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bucket_round_trip() {
        for bucket in Bucket::ALL {
            assert_eq!(bucket.to_string().parse::<Bucket>().unwrap(), bucket);
        }
    }

    #[test]
    fn test_unknown_bucket_rejected() {
        assert!(matches!(
            "secrets".parse::<Bucket>(),
            Err(StorageError::Validation(_))
        ));
    }
}
