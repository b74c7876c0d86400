//! Retrieval of model artifacts from remote object storage.

#[cfg(feature = "s3")]
mod s3;
mod store;
mod types;

#[cfg(feature = "s3")]
pub use s3::S3Store;
pub use store::{HttpStore, ObjectStore, create_store};
pub use types::*;

use crate::Result;
use std::path::Path;
use tracing::{info, warn};

/// Downloads every artifact into place, one at a time.
///
/// Only failing to create `model_dir` is an error. A failed download is logged
/// and recorded in the returned report, and the remaining artifacts are still
/// attempted. Nothing is retried.
pub async fn fetch_artifacts(
    store: &dyn ObjectStore,
    model_dir: &Path,
    artifacts: &[Artifact],
) -> Result<FetchReport> {
    tokio::fs::create_dir_all(model_dir).await?;

    let source = store.describe();
    let mut report = FetchReport::default();

    for artifact in artifacts {
        info!("Downloading {} from {}...", artifact.remote_key, source);

        let result = match store.download(&artifact.remote_key, &artifact.local_path).await {
            Ok(bytes) => {
                info!(
                    "{} downloaded successfully ({} bytes)",
                    artifact.remote_key, bytes
                );
                Ok(bytes)
            }
            Err(e) => {
                warn!("Error downloading {}: {}", artifact.remote_key, e);
                Err(e.to_string())
            }
        };

        report.outcomes.push(FetchOutcome {
            artifact: artifact.clone(),
            result,
        });
    }

    info!(
        "Fetched {}/{} artifacts into {}",
        report.succeeded().count(),
        report.outcomes.len(),
        model_dir.display()
    );

    Ok(report)
}
