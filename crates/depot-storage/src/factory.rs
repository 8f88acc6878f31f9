//! Provider factory
//!
//! The backend is selected once at startup through configuration; there is
//! no runtime backend switching.

use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;
use std::sync::Arc;

use depot_core::{StorageConfig, StorageError, StorageResult};

use crate::local::LocalProvider;
use crate::traits::StorageProvider;

/// Available storage backend kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    Local,
    Smb,
}

impl FromStr for ProviderKind {
    type Err = StorageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "local" => Ok(ProviderKind::Local),
            "smb" => Ok(ProviderKind::Smb),
            _ => Err(StorageError::Config(format!(
                "Invalid storage backend: {}",
                s
            ))),
        }
    }
}

impl Display for ProviderKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            ProviderKind::Local => write!(f, "local"),
            ProviderKind::Smb => write!(f, "smb"),
        }
    }
}

/// Create a storage provider based on configuration
pub async fn create_provider(
    kind: ProviderKind,
    config: StorageConfig,
) -> StorageResult<Arc<dyn StorageProvider>> {
    match kind {
        ProviderKind::Local => {
            let provider = LocalProvider::new(config).await?;
            Ok(Arc::new(provider))
        }
        ProviderKind::Smb => Err(StorageError::Config(
            "SMB storage backend not yet implemented".to_string(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_provider_kind_round_trip() {
        assert_eq!("local".parse::<ProviderKind>().unwrap(), ProviderKind::Local);
        assert_eq!("SMB".parse::<ProviderKind>().unwrap(), ProviderKind::Smb);
        assert!("gdrive".parse::<ProviderKind>().is_err());
    }

    #[tokio::test]
    async fn test_create_local_provider() {
        let dir = tempdir().unwrap();
        let config = StorageConfig::new(dir.path(), "test-secret");
        let provider = create_provider(ProviderKind::Local, config).await.unwrap();
        assert!(provider
            .exists(depot_core::Bucket::Uploads, "2024/01/01/none.png")
            .await
            .map(|exists| !exists)
            .unwrap());
    }

    #[tokio::test]
    async fn test_smb_not_implemented() {
        let dir = tempdir().unwrap();
        let config = StorageConfig::new(dir.path(), "test-secret");
        let result = create_provider(ProviderKind::Smb, config).await;
        assert!(matches!(result, Err(StorageError::Config(_))));
    }
}
