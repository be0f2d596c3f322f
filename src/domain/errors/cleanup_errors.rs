use thiserror::Error;

use crate::domain::{errors::ProviderError, models::PurgePhase, value_objects::BucketName};

/// Credentials or provider configuration could not be resolved
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("no AWS region could be resolved (set --region, AWS_REGION or a profile region)")]
    MissingRegion,

    #[error("no AWS credentials provider is configured")]
    MissingCredentialsProvider,

    #[error("failed to resolve AWS credentials: {0}")]
    Credentials(String),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Enumerating either inventory failed. Always fatal for the run.
#[derive(Debug, Error)]
pub enum InventoryError {
    #[error("failed to enumerate buckets: {0}")]
    Storage(#[source] ProviderError),

    #[error("failed to enumerate stacks: {0}")]
    Stacks(#[source] ProviderError),
}

/// Purging one bucket failed. Never fatal for the run.
#[derive(Debug, Error)]
pub enum PurgeError {
    #[error("failed to purge version history of bucket {bucket}: {source}")]
    VersionHistory {
        bucket: BucketName,
        source: ProviderError,
    },

    #[error("failed to delete bucket {bucket}: {source}")]
    DeleteBucket {
        bucket: BucketName,
        source: ProviderError,
    },

    #[error("purge of bucket {bucket} cancelled before {before}")]
    Cancelled {
        bucket: BucketName,
        before: PurgePhase,
    },
}

impl PurgeError {
    pub fn bucket(&self) -> &BucketName {
        match self {
            PurgeError::VersionHistory { bucket, .. }
            | PurgeError::DeleteBucket { bucket, .. }
            | PurgeError::Cancelled { bucket, .. } => bucket,
        }
    }

    /// The phase the purge stopped in
    pub fn phase(&self) -> PurgePhase {
        match self {
            PurgeError::VersionHistory { .. } => PurgePhase::VersionHistory,
            PurgeError::DeleteBucket { .. } => PurgePhase::DeleteBucket,
            PurgeError::Cancelled { before, .. } => *before,
        }
    }
}

/// Errors that end a cleanup run
#[derive(Debug, Error)]
pub enum RunError {
    #[error(transparent)]
    Inventory(#[from] InventoryError),

    #[error("failed to read confirmation: {0}")]
    Prompt(#[from] std::io::Error),
}

/// Result type for inventory enumeration
pub type InventoryResult<T> = Result<T, InventoryError>;

/// Result type for bucket purges
pub type PurgeResult<T> = Result<T, PurgeError>;
