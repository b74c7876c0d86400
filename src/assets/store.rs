use crate::{
    Error, Result,
    config::{StorageBackend, StorageConfig},
};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tracing::debug;

/// Copy-by-key access to a remote bucket.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Human readable location, used in logs.
    fn describe(&self) -> String;

    /// Copies the object at `key` to `destination`, returning the number of bytes written.
    async fn download(&self, key: &str, destination: &Path) -> Result<u64>;
}

pub async fn create_store(config: &StorageConfig) -> Result<Box<dyn ObjectStore>> {
    match config.backend {
        StorageBackend::Http => {
            let endpoint = config
                .endpoint
                .as_deref()
                .ok_or_else(|| Error::config("storage.endpoint is required for the http backend"))?;
            Ok(Box::new(HttpStore::new(endpoint, &config.bucket)))
        }
        #[cfg(feature = "s3")]
        StorageBackend::S3 => Ok(Box::new(super::s3::S3Store::new(config).await)),
        #[cfg(not(feature = "s3"))]
        StorageBackend::S3 => Err(Error::config(
            "the s3 backend needs the 's3' feature; rebuild with it or use the http backend",
        )),
    }
}

/// Path-style HTTP access (`{endpoint}/{bucket}/{key}`) for public or S3-compatible buckets.
pub struct HttpStore {
    client: reqwest::Client,
    base_url: String,
}

impl HttpStore {
    pub fn new(endpoint: &str, bucket: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: format!(
                "{}/{}",
                endpoint.trim_end_matches('/'),
                bucket.trim_matches('/')
            ),
        }
    }

    pub fn object_url(&self, key: &str) -> String {
        format!("{}/{}", self.base_url, key.trim_start_matches('/'))
    }
}

#[async_trait]
impl ObjectStore for HttpStore {
    fn describe(&self) -> String {
        self.base_url.clone()
    }

    async fn download(&self, key: &str, destination: &Path) -> Result<u64> {
        let url = self.object_url(key);
        debug!("GET {}", url);

        let mut response = self.client.get(&url).send().await?.error_for_status()?;

        let mut part = PartFile::create(destination).await?;
        while let Some(chunk) = response.chunk().await? {
            part.write(&chunk).await?;
        }
        part.commit().await
    }
}

/// A download in progress. Bytes go to `<destination>.part`, which is renamed
/// over the destination on commit and removed if dropped uncommitted.
pub(crate) struct PartFile {
    file: Option<tokio::fs::File>,
    part_path: PathBuf,
    destination: PathBuf,
    written: u64,
    committed: bool,
}

impl PartFile {
    pub(crate) async fn create(destination: &Path) -> Result<Self> {
        let part_path = part_path_for(destination);
        let file = tokio::fs::File::create(&part_path).await?;
        Ok(Self {
            file: Some(file),
            part_path,
            destination: destination.to_path_buf(),
            written: 0,
            committed: false,
        })
    }

    pub(crate) async fn write(&mut self, chunk: &[u8]) -> Result<()> {
        let file = self
            .file
            .as_mut()
            .ok_or_else(|| Error::internal("write after commit"))?;
        file.write_all(chunk).await?;
        self.written += chunk.len() as u64;
        Ok(())
    }

    pub(crate) async fn commit(mut self) -> Result<u64> {
        if let Some(mut file) = self.file.take() {
            file.flush().await?;
            file.sync_all().await?;
        }
        tokio::fs::rename(&self.part_path, &self.destination).await?;
        self.committed = true;
        Ok(self.written)
    }
}

impl Drop for PartFile {
    fn drop(&mut self) {
        if !self.committed {
            let _ = std::fs::remove_file(&self.part_path);
        }
    }
}

fn part_path_for(destination: &Path) -> PathBuf {
    let mut name = destination.as_os_str().to_owned();
    name.push(".part");
    PathBuf::from(name)
}
