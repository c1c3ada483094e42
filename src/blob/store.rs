//! Container lifecycle and SAS operations against Azure Blob Storage
//!
//! `BlobStore` is the seam between the provisioning flow and the cloud.
//! Every call is attempted exactly once; the SDK turns any non-success
//! status into an error, which is mapped onto the matching `StageError`.

use crate::auth::StorageAccountCredentials;
use crate::blob::models::{full_container_permissions, SasWindow};
use crate::error::{Result, StageError};
use crate::utils::datetime::to_offset_datetime;
use async_trait::async_trait;
use azure_storage_blobs::prelude::*;
use url::Url;

/// Cloud-side container operations
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Create `container` in `account`
    async fn create_container(
        &self,
        account: &StorageAccountCredentials,
        container: &str,
    ) -> Result<()>;

    /// Delete `container` from `account`
    async fn delete_container(
        &self,
        account: &StorageAccountCredentials,
        container: &str,
    ) -> Result<()>;

    /// Container URL on `host`'s endpoint carrying a SAS computed with `signer`'s key
    async fn signed_container_url(
        &self,
        host: &StorageAccountCredentials,
        signer: &StorageAccountCredentials,
        container: &str,
        window: &SasWindow,
    ) -> Result<Url>;
}

/// Azure SDK backed store using shared-key credentials
#[derive(Debug, Clone, Copy, Default)]
pub struct AzureBlobStore;

impl AzureBlobStore {
    pub fn new() -> Self {
        Self
    }

    fn container_client(
        host: &StorageAccountCredentials,
        signer: &StorageAccountCredentials,
        container: &str,
    ) -> ContainerClient {
        ClientBuilder::new(host.name(), signer.storage_credentials()).container_client(container)
    }
}

#[async_trait]
impl BlobStore for AzureBlobStore {
    async fn create_container(
        &self,
        account: &StorageAccountCredentials,
        container: &str,
    ) -> Result<()> {
        let container_client = Self::container_client(account, account, container);

        container_client
            .create()
            .await
            .map(|_| ())
            .map_err(|e| StageError::container_creation(container, e))?;

        tracing::info!("Created container '{}' in account '{}'", container, account.name());
        Ok(())
    }

    async fn delete_container(
        &self,
        account: &StorageAccountCredentials,
        container: &str,
    ) -> Result<()> {
        let container_client = Self::container_client(account, account, container);

        container_client
            .delete()
            .await
            .map(|_| ())
            .map_err(|e| StageError::container_deletion(container, e))?;

        tracing::info!("Deleted container '{}' from account '{}'", container, account.name());
        Ok(())
    }

    async fn signed_container_url(
        &self,
        host: &StorageAccountCredentials,
        signer: &StorageAccountCredentials,
        container: &str,
        window: &SasWindow,
    ) -> Result<Url> {
        let container_client = Self::container_client(host, signer, container);

        let start = to_offset_datetime(window.start())?;
        let expiry = to_offset_datetime(window.expiry())?;

        let sas = container_client
            .shared_access_signature(full_container_permissions(), expiry)
            .await
            .map_err(|e| StageError::signature_minting(container, e))?
            .start(start);

        let url = container_client
            .generate_signed_container_url(&sas)
            .map_err(|e| StageError::signature_minting(container, e))?;

        tracing::debug!(
            "Minted SAS for '{}' on account '{}' signed by '{}' ({} .. {})",
            container,
            host.name(),
            signer.name(),
            window.start().to_rfc3339(),
            window.expiry().to_rfc3339()
        );
        Ok(url)
    }
}
