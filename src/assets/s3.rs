use super::store::{ObjectStore, PartFile};
use crate::{Error, Result, config::StorageConfig};
use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_s3::Client as S3Client;
use aws_sdk_s3::error::DisplayErrorContext;
use std::path::Path;
use tracing::debug;

/// Amazon S3 access through the AWS SDK. Credentials come from the SDK's
/// default provider chain (environment, profile, instance metadata).
pub struct S3Store {
    client: S3Client,
    bucket: String,
}

impl S3Store {
    pub async fn new(config: &StorageConfig) -> Self {
        let mut loader = aws_config::defaults(BehaviorVersion::latest());
        if let Some(ref profile) = config.profile {
            loader = loader.profile_name(profile);
        }
        if let Some(ref region) = config.region {
            loader = loader.region(aws_config::Region::new(region.clone()));
        }
        let aws_config = loader.load().await;

        Self {
            client: S3Client::new(&aws_config),
            bucket: config.bucket.clone(),
        }
    }
}

#[async_trait]
impl ObjectStore for S3Store {
    fn describe(&self) -> String {
        format!("s3://{}", self.bucket)
    }

    async fn download(&self, key: &str, destination: &Path) -> Result<u64> {
        debug!("GetObject s3://{}/{}", self.bucket, key);

        let output = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| {
                Error::storage(format!(
                    "s3://{}/{}: {}",
                    self.bucket,
                    key,
                    DisplayErrorContext(&e)
                ))
            })?;

        let mut body = output.body;
        let mut part = PartFile::create(destination).await?;
        while let Some(chunk) = body
            .try_next()
            .await
            .map_err(|e| Error::storage(format!("s3://{}/{}: {}", self.bucket, key, e)))?
        {
            part.write(&chunk).await?;
        }
        part.commit().await
    }
}
