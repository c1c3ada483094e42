//! Stage provisioning
//!
//! Turns a benchmark location request into cloud resources plus a manifest
//! describing where the data lives and how to reach it.

use crate::auth::{AccountKind, EnvSource, StorageAccountCredentials};
use crate::blob::{BlobStore, SasWindow};
use crate::error::Result;
use crate::manifest::{Manifest, ManifestWriter, Stage};
use crate::utils::naming::{container_name_from_url, generate_container_name};
use rand::Rng;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info, warn};
use url::Url;

/// Creates containers, mints SAS URLs and writes stage manifests
pub struct Provisioner<R: Rng> {
    store: Arc<dyn BlobStore>,
    env: Arc<dyn EnvSource>,
    rng: R,
    manifests: ManifestWriter,
    download_signer: AccountKind,
}

impl<R: Rng> Provisioner<R> {
    pub fn new(
        store: Arc<dyn BlobStore>,
        env: Arc<dyn EnvSource>,
        rng: R,
        manifests: ManifestWriter,
    ) -> Self {
        Self {
            store,
            env,
            rng,
            manifests,
            download_signer: AccountKind::Secondary,
        }
    }

    /// Account whose key signs the stage D SAS
    pub fn with_download_signer(mut self, signer: AccountKind) -> Self {
        self.download_signer = signer;
        self
    }

    fn credentials(&self, kind: AccountKind) -> Result<StorageAccountCredentials> {
        StorageAccountCredentials::resolve(kind, self.env.as_ref())
    }

    /// Create a fresh randomly named container in `account`
    async fn create_fresh_container(&mut self, account: &StorageAccountCredentials) -> Result<String> {
        let name = generate_container_name(&mut self.rng);
        self.store.create_container(account, &name).await?;
        Ok(name)
    }

    /// Sign a container created by this invocation, deleting it if signing fails
    async fn sign_or_discard(
        &self,
        account: &StorageAccountCredentials,
        container: &str,
        window: &SasWindow,
    ) -> Result<Url> {
        match self
            .store
            .signed_container_url(account, account, container, window)
            .await
        {
            Ok(url) => Ok(url),
            Err(e) => {
                warn!("SAS generation failed for '{}', removing the container", container);
                self.discard(account, container).await;
                Err(e)
            }
        }
    }

    /// Write the manifest for a container created by this invocation,
    /// deleting the container if the manifest cannot be written
    async fn write_or_discard(
        &self,
        account: &StorageAccountCredentials,
        container: &str,
        stage: Stage,
        version: &str,
        manifest: &Manifest,
    ) -> Result<PathBuf> {
        match self.manifests.write(stage, version, manifest) {
            Ok(path) => Ok(path),
            Err(e) => {
                warn!("Manifest write failed, removing the container '{}'", container);
                self.discard(account, container).await;
                Err(e)
            }
        }
    }

    async fn discard(&self, account: &StorageAccountCredentials, container: &str) {
        if let Err(cleanup) = self.store.delete_container(account, container).await {
            error!("Cleanup of container '{}' failed: {}", container, cleanup);
        }
    }

    /// Stage B: upload container in the default account.
    ///
    /// Manifest: local path, then the container SAS URL.
    pub async fn create_location_b(
        &mut self,
        local_path: &str,
        hours: i64,
        version: &str,
    ) -> Result<PathBuf> {
        info!("Provisioning location B");
        let account = self.credentials(AccountKind::Default)?;
        let window = SasWindow::from_now(hours)?;

        let container = self.create_fresh_container(&account).await?;
        let url = self.sign_or_discard(&account, &container, &window).await?;

        let mut manifest = Manifest::new();
        manifest.push(local_path).push(url.as_str());
        self.write_or_discard(&account, &container, Stage::LocationB, version, &manifest)
            .await
    }

    /// Stage C: server-side copy from an existing default-account container
    /// into a fresh secondary-account container.
    ///
    /// Manifest: source SAS URL, then destination SAS URL.
    pub async fn create_location_c(
        &mut self,
        source_container_url: &str,
        hours: i64,
        version: &str,
    ) -> Result<PathBuf> {
        info!("Provisioning location C");
        let source_account = self.credentials(AccountKind::Default)?;
        let dest_account = self.credentials(AccountKind::Secondary)?;
        let source = container_name_from_url(source_container_url)?;
        let window = SasWindow::from_now(hours)?;

        let source_url = self
            .store
            .signed_container_url(&source_account, &source_account, &source, &window)
            .await?;

        let dest = self.create_fresh_container(&dest_account).await?;
        let dest_url = self.sign_or_discard(&dest_account, &dest, &window).await?;

        let mut manifest = Manifest::new();
        manifest.push(source_url.as_str()).push(dest_url.as_str());
        self.write_or_discard(&dest_account, &dest, Stage::LocationC, version, &manifest)
            .await
    }

    /// Stage D: download from an existing container.
    ///
    /// The URL is on the default account's endpoint while the signature is
    /// computed with the download signer's key (secondary unless configured).
    /// Manifest: SAS URL, then local path.
    pub async fn create_location_d(
        &mut self,
        source_container_url: &str,
        hours: i64,
        local_path: &str,
        version: &str,
    ) -> Result<PathBuf> {
        info!("Provisioning location D");
        let host = self.credentials(AccountKind::Default)?;
        let signer = self.credentials(self.download_signer)?;
        let source = container_name_from_url(source_container_url)?;
        let window = SasWindow::from_now(hours)?;

        let url = self
            .store
            .signed_container_url(&host, &signer, &source, &window)
            .await?;

        let mut manifest = Manifest::new();
        manifest.push(url.as_str()).push(local_path);
        self.manifests.write(Stage::LocationD, version, &manifest)
    }

    /// Best-effort teardown of a container in `account`.
    ///
    /// Missing credentials and malformed URLs are errors; a failed delete is
    /// only logged.
    pub async fn delete_container(&self, account: AccountKind, container_url: &str) -> Result<()> {
        let creds = self.credentials(account)?;
        let container = container_name_from_url(container_url)?;

        match self.store.delete_container(&creds, &container).await {
            Ok(()) => println!("Successfully deleted container: {container}"),
            Err(e) => error!("{}", e),
        }
        Ok(())
    }

    /// Results upload target in an existing default-account container.
    ///
    /// Manifest: `<local_path>/*.csv`, then the container SAS URL.
    pub async fn publish_results(
        &self,
        local_path: &str,
        container: &str,
        hours: i64,
    ) -> Result<PathBuf> {
        info!("Preparing results publication to '{}'", container);
        let account = self.credentials(AccountKind::Default)?;
        let window = SasWindow::from_now(hours)?;

        let url = self
            .store
            .signed_container_url(&account, &account, container, &window)
            .await?;

        let mut manifest = Manifest::new();
        manifest.push(format!("{local_path}/*.csv")).push(url.as_str());
        self.manifests.write(Stage::PublishResults, "", &manifest)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blob::MockBlobStore;
    use crate::error::StageError;
    use mockall::Sequence;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashMap;
    use tempfile::TempDir;

    fn full_env() -> Arc<dyn EnvSource> {
        let vars: HashMap<String, String> = [
            ("AZURE_STORAGE_ACCOUNT_NAME", "benchdefault"),
            ("AZURE_STORAGE_ACCOUNT_KEY", "ZGVmYXVsdA=="),
            ("SECONDARY_AZURE_STORAGE_ACCOUNT_NAME", "benchsecondary"),
            ("SECONDARY_AZURE_STORAGE_ACCOUNT_KEY", "c2Vjb25kYXJ5"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
        Arc::new(vars)
    }

    fn expected_name(seed: u64) -> String {
        generate_container_name(&mut StdRng::seed_from_u64(seed))
    }

    fn provisioner(store: MockBlobStore, dir: &TempDir, seed: u64) -> Provisioner<StdRng> {
        Provisioner::new(
            Arc::new(store),
            full_env(),
            StdRng::seed_from_u64(seed),
            ManifestWriter::new(dir.path()),
        )
    }

    #[tokio::test]
    async fn test_location_b_deletes_container_when_signing_fails() {
        let dir = TempDir::new().unwrap();
        let name = expected_name(11);
        let mut seq = Sequence::new();
        let mut store = MockBlobStore::new();

        store
            .expect_create_container()
            .withf({
                let name = name.clone();
                move |acct, c| acct.name() == "benchdefault" && c == name
            })
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Ok(()));
        store
            .expect_signed_container_url()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _, c, _| Err(StageError::signature_minting(c, "bad key")));
        store
            .expect_delete_container()
            .withf({
                let name = name.clone();
                move |acct, c| acct.name() == "benchdefault" && c == name
            })
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Ok(()));

        let mut p = provisioner(store, &dir, 11);
        let err = p.create_location_b("/data/in", 2, "1").await.unwrap_err();

        assert!(matches!(err, StageError::SignatureMinting { .. }));
        assert!(!dir.path().join("locationB1.csv").exists());
    }

    #[tokio::test]
    async fn test_location_b_aborts_on_creation_failure() {
        let dir = TempDir::new().unwrap();
        let mut store = MockBlobStore::new();
        store
            .expect_create_container()
            .times(1)
            .returning(|_, c| Err(StageError::container_creation(c, "409 Conflict")));
        store.expect_signed_container_url().never();
        store.expect_delete_container().never();

        let mut p = provisioner(store, &dir, 3);
        let err = p.create_location_b("/data/in", 2, "1").await.unwrap_err();

        assert!(matches!(err, StageError::ContainerCreation { .. }));
        assert!(!dir.path().join("locationB1.csv").exists());
    }

    #[tokio::test]
    async fn test_zero_duration_rejected_before_any_cloud_call() {
        let dir = TempDir::new().unwrap();
        let mut store = MockBlobStore::new();
        store.expect_create_container().never();
        store.expect_signed_container_url().never();

        let mut p = provisioner(store, &dir, 3);
        let err = p.create_location_b("/data/in", 0, "1").await.unwrap_err();

        assert!(matches!(err, StageError::InvalidSasWindow(_)));
    }

    #[tokio::test]
    async fn test_location_c_cleans_up_destination_only() {
        let dir = TempDir::new().unwrap();
        let dest = expected_name(5);
        let mut store = MockBlobStore::new();

        store
            .expect_signed_container_url()
            .withf(|host, signer, c, _| {
                host.name() == "benchdefault" && signer.name() == "benchdefault" && c == "source"
            })
            .times(1)
            .returning(|_, _, _, _| {
                Ok(Url::parse("https://benchdefault.blob.core.windows.net/source?sig=a").unwrap())
            });
        store
            .expect_create_container()
            .withf(|acct, _| acct.name() == "benchsecondary")
            .times(1)
            .returning(|_, _| Ok(()));
        store
            .expect_signed_container_url()
            .withf(|host, _, _, _| host.name() == "benchsecondary")
            .times(1)
            .returning(|_, _, c, _| Err(StageError::signature_minting(c, "boom")));
        store
            .expect_delete_container()
            .withf(move |acct, c| acct.name() == "benchsecondary" && c == dest)
            .times(1)
            .returning(|_, _| Ok(()));

        let mut p = provisioner(store, &dir, 5);
        let result = p
            .create_location_c("https://benchdefault.blob.core.windows.net/source", 1, "7")
            .await;

        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_location_c_aborts_when_destination_creation_fails() {
        let dir = TempDir::new().unwrap();
        let mut store = MockBlobStore::new();

        store
            .expect_signed_container_url()
            .withf(|host, signer, c, _| {
                host.name() == "benchdefault" && signer.name() == "benchdefault" && c == "source"
            })
            .times(1)
            .returning(|_, _, _, _| {
                Ok(Url::parse("https://benchdefault.blob.core.windows.net/source?sig=a").unwrap())
            });
        store
            .expect_create_container()
            .withf(|acct, _| acct.name() == "benchsecondary")
            .times(1)
            .returning(|_, c| Err(StageError::container_creation(c, "403 AuthorizationFailure")));
        store.expect_delete_container().never();

        let mut p = provisioner(store, &dir, 5);
        let err = p
            .create_location_c("https://benchdefault.blob.core.windows.net/source", 1, "7")
            .await
            .unwrap_err();

        assert!(matches!(err, StageError::ContainerCreation { .. }));
        assert!(!dir.path().join("locationC7.csv").exists());
    }

    #[tokio::test]
    async fn test_location_b_deletes_container_when_manifest_write_fails() {
        let dir = TempDir::new().unwrap();
        let name = expected_name(9);
        let mut seq = Sequence::new();
        let mut store = MockBlobStore::new();

        store
            .expect_create_container()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Ok(()));
        store
            .expect_signed_container_url()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _, c, _| {
                Ok(Url::parse(&format!("https://benchdefault.blob.core.windows.net/{c}?sig=b"))
                    .unwrap())
            });
        store
            .expect_delete_container()
            .withf(move |acct, c| acct.name() == "benchdefault" && c == name)
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Ok(()));

        let mut p = Provisioner::new(
            Arc::new(store),
            full_env(),
            StdRng::seed_from_u64(9),
            ManifestWriter::new(dir.path().join("missing")),
        );
        let err = p.create_location_b("/data/in", 2, "1").await.unwrap_err();

        assert!(matches!(err, StageError::ManifestWrite { .. }));
    }

    #[tokio::test]
    async fn test_location_d_signs_with_configured_account() {
        let dir = TempDir::new().unwrap();
        let mut store = MockBlobStore::new();
        store
            .expect_signed_container_url()
            .withf(|host, signer, c, _| {
                host.name() == "benchdefault" && signer.name() == "benchdefault" && c == "copied"
            })
            .times(1)
            .returning(|_, _, _, _| {
                Ok(Url::parse("https://benchdefault.blob.core.windows.net/copied?sig=d").unwrap())
            });

        let mut p = provisioner(store, &dir, 1).with_download_signer(AccountKind::Default);
        let path = p
            .create_location_d("https://benchdefault.blob.core.windows.net/copied", 1, "/data/out", "3")
            .await
            .unwrap();

        assert_eq!(
            std::fs::read_to_string(path).unwrap(),
            "https://benchdefault.blob.core.windows.net/copied?sig=d\n/data/out\n"
        );
    }

    #[tokio::test]
    async fn test_delete_failure_is_not_fatal() {
        let dir = TempDir::new().unwrap();
        let mut store = MockBlobStore::new();
        store
            .expect_delete_container()
            .withf(|acct, c| acct.name() == "benchsecondary" && c == "gone")
            .times(1)
            .returning(|_, c| Err(StageError::container_deletion(c, "404 ContainerNotFound")));

        let p = provisioner(store, &dir, 1);
        let result = p
            .delete_container(
                AccountKind::Secondary,
                "https://benchsecondary.blob.core.windows.net/gone",
            )
            .await;

        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_delete_requires_credentials() {
        let dir = TempDir::new().unwrap();
        let mut store = MockBlobStore::new();
        store.expect_delete_container().never();

        let p = Provisioner::new(
            Arc::new(store),
            Arc::new(HashMap::<String, String>::new()),
            StdRng::seed_from_u64(1),
            ManifestWriter::new(dir.path()),
        );
        let err = p
            .delete_container(AccountKind::Default, "https://a.blob.core.windows.net/c")
            .await
            .unwrap_err();

        assert!(matches!(err, StageError::MissingCredentials { .. }));
    }
}
