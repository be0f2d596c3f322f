use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::domain::{errors::PurgeResult, models::PurgeSummary, value_objects::BucketName};

/// Port for emptying and removing a single bucket
#[async_trait]
pub trait PurgeService: Send + Sync + 'static {
    /// Remove current objects, then versions and delete markers, then the bucket.
    ///
    /// `cancel` is only observed between phases.
    async fn purge_bucket(
        &self,
        bucket: &BucketName,
        cancel: &CancellationToken,
    ) -> PurgeResult<PurgeSummary>;
}
