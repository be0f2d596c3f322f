use async_trait::async_trait;
use chrono::Utc;
use futures::stream::{self, StreamExt};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::{
    domain::{
        errors::{InventoryResult, RunError},
        models::{BucketOutcome, OrphanSet, OutcomeStatus, RunReport},
        value_objects::BucketName,
    },
    ports::{
        prompt::ConfirmationPrompt,
        services::{CleanupService, InventoryService, OrphanScan, PurgeService},
    },
    services::reconciler::compute_orphans,
};

/// Knobs of a cleanup run
#[derive(Debug, Clone, bon::Builder)]
pub struct CleanupOptions {
    /// Report orphans without prompting or deleting anything
    #[builder(default)]
    pub dry_run: bool,

    /// Upper bound on buckets purged at the same time
    #[builder(default = 1)]
    pub purge_concurrency: usize,
}

impl Default for CleanupOptions {
    fn default() -> Self {
        Self::builder().build()
    }
}

/// Drives inventory, reconciliation, confirmation and purging
#[derive(Clone)]
pub struct CleanupServiceImpl {
    inventory: Arc<dyn InventoryService>,
    purger: Arc<dyn PurgeService>,
    options: CleanupOptions,
    cancel: CancellationToken,
}

impl CleanupServiceImpl {
    pub fn new(
        inventory: Arc<dyn InventoryService>,
        purger: Arc<dyn PurgeService>,
        options: CleanupOptions,
    ) -> Self {
        Self {
            inventory,
            purger,
            options,
            cancel: CancellationToken::new(),
        }
    }

    /// Use an externally owned token, e.g. one cancelled on Ctrl-C
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Token that stops the run between purge phases when cancelled
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    async fn purge_all(&self, orphans: &OrphanSet) -> Vec<BucketOutcome> {
        let concurrency = self.options.purge_concurrency.max(1);
        let mut outcomes: Vec<BucketOutcome> = stream::iter(orphans.iter().cloned())
            .map(|bucket| self.purge_one(bucket))
            .buffer_unordered(concurrency)
            .collect()
            .await;
        outcomes.sort_by(|a, b| a.bucket.cmp(&b.bucket));
        outcomes
    }

    async fn purge_one(&self, bucket: BucketName) -> BucketOutcome {
        if self.cancel.is_cancelled() {
            warn!(bucket = %bucket, "run cancelled, bucket not purged");
            return BucketOutcome::skipped(bucket, "run cancelled before purge started");
        }

        match self.purger.purge_bucket(&bucket, &self.cancel).await {
            Ok(summary) => BucketOutcome::purged(bucket, &summary),
            Err(err) => {
                error!(
                    bucket = %bucket,
                    phase = %err.phase(),
                    error = %err,
                    "bucket purge failed"
                );
                BucketOutcome::failed(&err)
            }
        }
    }
}

#[async_trait]
impl CleanupService for CleanupServiceImpl {
    async fn find_orphans(&self) -> InventoryResult<OrphanScan> {
        let (all_buckets, declared_buckets) = tokio::try_join!(
            self.inventory.list_all_buckets(),
            self.inventory.list_buckets_declared_by_active_stacks(),
        )?;

        let orphans = compute_orphans(&all_buckets, &declared_buckets);
        Ok(OrphanScan {
            total_buckets: all_buckets.len(),
            declared_buckets: declared_buckets.len(),
            orphans,
        })
    }

    async fn run(&self, prompt: &dyn ConfirmationPrompt) -> Result<RunReport, RunError> {
        let started_at = Utc::now();
        let scan = self.find_orphans().await?;

        let mut report = RunReport {
            started_at,
            finished_at: started_at,
            total_buckets: scan.total_buckets,
            declared_buckets: scan.declared_buckets,
            orphans: scan.orphans,
            dry_run: self.options.dry_run,
            confirmed: false,
            outcomes: Vec::new(),
        };

        if report.orphans.is_empty() {
            info!("no orphan buckets found");
            report.finished_at = Utc::now();
            return Ok(report);
        }

        for bucket in &report.orphans {
            info!(bucket = %bucket, "bucket is not declared by any active stack");
        }

        if self.options.dry_run {
            info!(orphans = report.orphans.len(), "dry run, nothing deleted");
            report.finished_at = Utc::now();
            return Ok(report);
        }

        if !prompt.confirm(&report.orphans).await? {
            info!("purge declined, nothing deleted");
            report.finished_at = Utc::now();
            return Ok(report);
        }
        report.confirmed = true;

        report.outcomes = self.purge_all(&report.orphans).await;
        report.finished_at = Utc::now();

        info!(
            purged = report.count(OutcomeStatus::Purged),
            failed = report.count(OutcomeStatus::Failed),
            skipped = report.count(OutcomeStatus::Skipped),
            "cleanup finished"
        );
        Ok(report)
    }
}
