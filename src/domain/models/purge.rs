use serde::Serialize;

use crate::domain::{errors::ProviderError, models::ObjectDeleteFailure};

/// Most identifiers a single bulk-delete request may carry
pub const MAX_DELETE_BATCH: usize = 100;

/// The ordered steps of a bucket purge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PurgePhase {
    CurrentVersions,
    VersionHistory,
    DeleteBucket,
}

impl std::fmt::Display for PurgePhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PurgePhase::CurrentVersions => write!(f, "current versions"),
            PurgePhase::VersionHistory => write!(f, "version history"),
            PurgePhase::DeleteBucket => write!(f, "bucket deletion"),
        }
    }
}

/// Why a best-effort batch did not go through
#[derive(Debug, Clone, PartialEq)]
pub enum BatchFailureCause {
    Request(ProviderError),
    Objects(Vec<ObjectDeleteFailure>),
}

/// A phase-1 batch that failed without stopping the purge
#[derive(Debug, Clone, PartialEq)]
pub struct BatchFailure {
    pub phase: PurgePhase,
    pub batch_index: usize,
    pub batch_len: usize,
    pub cause: BatchFailureCause,
}

impl std::fmt::Display for BatchFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "batch {} ({} identifiers) of {}: ",
            self.batch_index, self.batch_len, self.phase
        )?;
        match &self.cause {
            BatchFailureCause::Request(err) => write!(f, "{}", err),
            BatchFailureCause::Objects(failures) => {
                write!(f, "{} objects rejected", failures.len())
            }
        }
    }
}

/// Counters of one completed bucket purge
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PurgeSummary {
    pub current_objects_submitted: usize,
    pub current_batches: usize,
    pub history_entries_submitted: usize,
    pub history_batches: usize,
    pub batch_failures: Vec<BatchFailure>,
}

impl PurgeSummary {
    pub fn is_clean(&self) -> bool {
        self.batch_failures.is_empty()
    }
}

/// Number of bulk-delete requests needed for `identifiers` entries
pub fn batch_count(identifiers: usize) -> usize {
    identifiers.div_ceil(MAX_DELETE_BATCH)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_batch_count() {
        assert_eq!(batch_count(0), 0);
        assert_eq!(batch_count(1), 1);
        assert_eq!(batch_count(100), 1);
        assert_eq!(batch_count(101), 2);
        assert_eq!(batch_count(250), 3);
    }

    #[test]
    fn test_phases_are_ordered() {
        assert!(PurgePhase::CurrentVersions < PurgePhase::VersionHistory);
        assert!(PurgePhase::VersionHistory < PurgePhase::DeleteBucket);
    }
}
