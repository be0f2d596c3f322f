use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeSet;

use crate::domain::{
    errors::PurgeError,
    models::{PurgePhase, PurgeSummary},
    value_objects::BucketName,
};

/// Buckets present in the account but declared by no active stack
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct OrphanSet(BTreeSet<BucketName>);

impl OrphanSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, bucket: &BucketName) -> bool {
        self.0.contains(bucket)
    }

    /// Iterate in lexicographic order
    pub fn iter(&self) -> impl Iterator<Item = &BucketName> {
        self.0.iter()
    }

    pub(crate) fn insert(&mut self, bucket: BucketName) -> bool {
        self.0.insert(bucket)
    }
}

impl FromIterator<BucketName> for OrphanSet {
    fn from_iter<I: IntoIterator<Item = BucketName>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl IntoIterator for OrphanSet {
    type Item = BucketName;
    type IntoIter = std::collections::btree_set::IntoIter<BucketName>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a OrphanSet {
    type Item = &'a BucketName;
    type IntoIter = std::collections::btree_set::Iter<'a, BucketName>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// How a single orphan ended up
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeStatus {
    Purged,
    Failed,
    Skipped,
}

/// Per-bucket line of a run report
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BucketOutcome {
    pub bucket: BucketName,
    pub status: OutcomeStatus,
    /// Phase the purge stopped in, when it did not complete
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stopped_in: Option<PurgePhase>,
    pub current_objects_submitted: usize,
    pub history_entries_submitted: usize,
    pub batch_failures: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl BucketOutcome {
    pub fn purged(bucket: BucketName, summary: &PurgeSummary) -> Self {
        Self {
            bucket,
            status: OutcomeStatus::Purged,
            stopped_in: None,
            current_objects_submitted: summary.current_objects_submitted,
            history_entries_submitted: summary.history_entries_submitted,
            batch_failures: summary.batch_failures.len(),
            error: None,
        }
    }

    pub fn failed(error: &PurgeError) -> Self {
        let status = match error {
            PurgeError::Cancelled { .. } => OutcomeStatus::Skipped,
            _ => OutcomeStatus::Failed,
        };
        Self {
            bucket: error.bucket().clone(),
            status,
            stopped_in: Some(error.phase()),
            current_objects_submitted: 0,
            history_entries_submitted: 0,
            batch_failures: 0,
            error: Some(error.to_string()),
        }
    }

    /// Bucket never reached by the purge pool
    pub fn skipped(bucket: BucketName, reason: impl Into<String>) -> Self {
        Self {
            bucket,
            status: OutcomeStatus::Skipped,
            stopped_in: None,
            current_objects_submitted: 0,
            history_entries_submitted: 0,
            batch_failures: 0,
            error: Some(reason.into()),
        }
    }
}

/// Result of one end-to-end cleanup run
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub total_buckets: usize,
    pub declared_buckets: usize,
    pub orphans: OrphanSet,
    pub dry_run: bool,
    pub confirmed: bool,
    pub outcomes: Vec<BucketOutcome>,
}

impl RunReport {
    pub fn outcome_for(&self, bucket: &BucketName) -> Option<&BucketOutcome> {
        self.outcomes.iter().find(|o| &o.bucket == bucket)
    }

    pub fn count(&self, status: OutcomeStatus) -> usize {
        self.outcomes.iter().filter(|o| o.status == status).count()
    }

    pub fn has_failures(&self) -> bool {
        self.count(OutcomeStatus::Failed) > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::errors::ProviderError;

    fn bucket(name: &str) -> BucketName {
        BucketName::new(name).unwrap()
    }

    #[test]
    fn test_orphan_set_deduplicates_and_sorts() {
        let set: OrphanSet = ["zeta", "alpha", "zeta"].into_iter().map(bucket).collect();
        assert_eq!(set.len(), 2);
        let names: Vec<&str> = set.iter().map(BucketName::as_str).collect();
        assert_eq!(names, vec!["alpha", "zeta"]);
    }

    #[test]
    fn test_failed_outcome_records_phase() {
        let error = PurgeError::VersionHistory {
            bucket: bucket("alpha"),
            source: ProviderError::new("DeleteObjects", "throttled"),
        };
        let outcome = BucketOutcome::failed(&error);
        assert_eq!(outcome.status, OutcomeStatus::Failed);
        assert_eq!(outcome.stopped_in, Some(PurgePhase::VersionHistory));
        assert!(outcome.error.unwrap().contains("throttled"));
    }

    #[test]
    fn test_cancelled_purge_is_reported_as_skipped() {
        let error = PurgeError::Cancelled {
            bucket: bucket("alpha"),
            before: PurgePhase::DeleteBucket,
        };
        let outcome = BucketOutcome::failed(&error);
        assert_eq!(outcome.status, OutcomeStatus::Skipped);
        assert_eq!(outcome.stopped_in, Some(PurgePhase::DeleteBucket));
    }

    #[test]
    fn test_report_serializes_to_json() {
        let now = Utc::now();
        let report = RunReport {
            started_at: now,
            finished_at: now,
            total_buckets: 2,
            declared_buckets: 1,
            orphans: [bucket("alpha")].into_iter().collect(),
            dry_run: false,
            confirmed: true,
            outcomes: vec![BucketOutcome::purged(bucket("alpha"), &PurgeSummary::default())],
        };

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["orphans"], serde_json::json!(["alpha"]));
        assert_eq!(json["outcomes"][0]["status"], "purged");
        assert!(json["outcomes"][0].get("error").is_none());
    }
}
