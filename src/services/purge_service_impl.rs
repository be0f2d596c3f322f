use async_trait::async_trait;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::{
    domain::{
        errors::{ProviderError, ProviderResult, PurgeError, PurgeResult},
        models::{
            batch_count, BatchFailure, BatchFailureCause, ObjectDeleteFailure, ObjectIdentifier,
            PurgePhase, PurgeSummary, MAX_DELETE_BATCH,
        },
        value_objects::BucketName,
    },
    ports::{services::PurgeService, storage::BucketStore},
};

/// Empties and deletes buckets in three strictly ordered phases.
///
/// 1. current versions: best effort, failed batches are recorded and skipped
/// 2. version history and delete markers: any failure aborts the bucket
/// 3. the bucket itself
#[derive(Clone)]
pub struct PurgeServiceImpl {
    store: Arc<dyn BucketStore>,
}

impl PurgeServiceImpl {
    pub fn new(store: Arc<dyn BucketStore>) -> Self {
        Self { store }
    }

    fn ensure_not_cancelled(
        bucket: &BucketName,
        cancel: &CancellationToken,
        next: PurgePhase,
    ) -> PurgeResult<()> {
        if cancel.is_cancelled() {
            warn!(bucket = %bucket, before = %next, "purge cancelled");
            return Err(PurgeError::Cancelled {
                bucket: bucket.clone(),
                before: next,
            });
        }
        Ok(())
    }

    async fn current_object_identifiers(
        &self,
        bucket: &BucketName,
    ) -> ProviderResult<Vec<ObjectIdentifier>> {
        let mut identifiers = Vec::new();
        let mut continuation_token = None;
        loop {
            let page = self.store.list_objects(bucket, continuation_token).await?;
            identifiers.extend(page.items.into_iter().map(ObjectIdentifier::current));
            match page.next_token {
                Some(token) => continuation_token = Some(token),
                None => return Ok(identifiers),
            }
        }
    }

    async fn version_history_identifiers(
        &self,
        bucket: &BucketName,
    ) -> ProviderResult<Vec<ObjectIdentifier>> {
        let mut versions = Vec::new();
        let mut delete_markers = Vec::new();
        let mut marker = None;
        loop {
            let page = self.store.list_object_versions(bucket, marker).await?;
            versions.extend(page.versions);
            delete_markers.extend(page.delete_markers);
            match page.next_marker {
                Some(next) => marker = Some(next),
                None => break,
            }
        }
        debug!(
            bucket = %bucket,
            versions = versions.len(),
            delete_markers = delete_markers.len(),
            "listed version history"
        );
        versions.extend(delete_markers);
        Ok(versions)
    }

    async fn purge_current_versions(&self, bucket: &BucketName, summary: &mut PurgeSummary) {
        let identifiers = match self.current_object_identifiers(bucket).await {
            Ok(identifiers) => identifiers,
            Err(err) => {
                // The versioned listing of phase 2 still covers every current object
                warn!(
                    bucket = %bucket,
                    error = %err,
                    "could not list current objects, continuing with version history"
                );
                return;
            }
        };
        summary.current_objects_submitted = identifiers.len();
        debug!(
            bucket = %bucket,
            objects = identifiers.len(),
            batches = batch_count(identifiers.len()),
            "deleting current objects"
        );

        for (batch_index, batch) in identifiers.chunks(MAX_DELETE_BATCH).enumerate() {
            summary.current_batches += 1;
            let cause = match self.store.delete_objects(bucket, batch).await {
                Ok(rejected) if rejected.is_empty() => {
                    debug!(bucket = %bucket, count = batch.len(), "deleted current objects");
                    continue;
                }
                Ok(rejected) => BatchFailureCause::Objects(rejected),
                Err(err) => BatchFailureCause::Request(err),
            };

            let failure = BatchFailure {
                phase: PurgePhase::CurrentVersions,
                batch_index,
                batch_len: batch.len(),
                cause,
            };
            warn!(bucket = %bucket, failure = %failure, "batch delete failed, continuing");
            summary.batch_failures.push(failure);
        }
    }

    async fn purge_version_history(
        &self,
        bucket: &BucketName,
        summary: &mut PurgeSummary,
    ) -> PurgeResult<()> {
        let history_error = |source: ProviderError| PurgeError::VersionHistory {
            bucket: bucket.clone(),
            source,
        };

        let identifiers = self
            .version_history_identifiers(bucket)
            .await
            .map_err(history_error)?;
        summary.history_entries_submitted = identifiers.len();
        debug!(
            bucket = %bucket,
            entries = identifiers.len(),
            batches = batch_count(identifiers.len()),
            "deleting version history"
        );

        for batch in identifiers.chunks(MAX_DELETE_BATCH) {
            summary.history_batches += 1;
            let rejected = self
                .store
                .delete_objects(bucket, batch)
                .await
                .map_err(history_error)?;
            if !rejected.is_empty() {
                return Err(history_error(rejection_error(&rejected)));
            }
            debug!(bucket = %bucket, count = batch.len(), "deleted versions and delete markers");
        }
        Ok(())
    }
}

/// Fold per-key rejections into one provider error, keeping the first code
fn rejection_error(rejected: &[ObjectDeleteFailure]) -> ProviderError {
    let first = &rejected[0];
    let error = ProviderError::new(
        "DeleteObjects",
        format!("{} entries rejected, first: {}", rejected.len(), first),
    );
    match &first.code {
        Some(code) => error.with_code(code.clone()),
        None => error,
    }
}

#[async_trait]
impl PurgeService for PurgeServiceImpl {
    async fn purge_bucket(
        &self,
        bucket: &BucketName,
        cancel: &CancellationToken,
    ) -> PurgeResult<PurgeSummary> {
        let mut summary = PurgeSummary::default();
        info!(bucket = %bucket, "purging bucket");

        Self::ensure_not_cancelled(bucket, cancel, PurgePhase::CurrentVersions)?;
        self.purge_current_versions(bucket, &mut summary).await;

        Self::ensure_not_cancelled(bucket, cancel, PurgePhase::VersionHistory)?;
        self.purge_version_history(bucket, &mut summary).await?;

        Self::ensure_not_cancelled(bucket, cancel, PurgePhase::DeleteBucket)?;
        self.store
            .delete_bucket(bucket)
            .await
            .map_err(|source| PurgeError::DeleteBucket {
                bucket: bucket.clone(),
                source,
            })?;

        info!(
            bucket = %bucket,
            current_objects = summary.current_objects_submitted,
            history_entries = summary.history_entries_submitted,
            failed_batches = summary.batch_failures.len(),
            "deleted bucket"
        );
        Ok(summary)
    }
}
