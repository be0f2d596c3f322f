use crate::domain::{errors::ValidationError, value_objects::BucketName};

/// Resource type under which stacks declare storage buckets
pub const BUCKET_RESOURCE_TYPE: &str = "AWS::S3::Bucket";

/// Lifecycle state of an orchestration stack.
///
/// Only the states whose declared resources are expected to exist are
/// modelled as variants; everything else is kept verbatim in `Other`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum StackStatus {
    CreateComplete,
    UpdateComplete,
    RollbackComplete,
    UpdateCompleteCleanupInProgress,
    UpdateRollbackComplete,
    ImportComplete,
    ImportRollbackComplete,
    Other(String),
}

/// Statuses a stack must be in for its resources to count as declared
pub const ACTIVE_STACK_STATUSES: [StackStatus; 7] = [
    StackStatus::CreateComplete,
    StackStatus::UpdateComplete,
    StackStatus::RollbackComplete,
    StackStatus::UpdateCompleteCleanupInProgress,
    StackStatus::UpdateRollbackComplete,
    StackStatus::ImportComplete,
    StackStatus::ImportRollbackComplete,
];

impl StackStatus {
    pub fn as_str(&self) -> &str {
        match self {
            StackStatus::CreateComplete => "CREATE_COMPLETE",
            StackStatus::UpdateComplete => "UPDATE_COMPLETE",
            StackStatus::RollbackComplete => "ROLLBACK_COMPLETE",
            StackStatus::UpdateCompleteCleanupInProgress => "UPDATE_COMPLETE_CLEANUP_IN_PROGRESS",
            StackStatus::UpdateRollbackComplete => "UPDATE_ROLLBACK_COMPLETE",
            StackStatus::ImportComplete => "IMPORT_COMPLETE",
            StackStatus::ImportRollbackComplete => "IMPORT_ROLLBACK_COMPLETE",
            StackStatus::Other(raw) => raw,
        }
    }

    pub fn is_active(&self) -> bool {
        !matches!(self, StackStatus::Other(_))
    }
}

impl From<&str> for StackStatus {
    fn from(value: &str) -> Self {
        match value {
            "CREATE_COMPLETE" => StackStatus::CreateComplete,
            "UPDATE_COMPLETE" => StackStatus::UpdateComplete,
            "ROLLBACK_COMPLETE" => StackStatus::RollbackComplete,
            "UPDATE_COMPLETE_CLEANUP_IN_PROGRESS" => StackStatus::UpdateCompleteCleanupInProgress,
            "UPDATE_ROLLBACK_COMPLETE" => StackStatus::UpdateRollbackComplete,
            "IMPORT_COMPLETE" => StackStatus::ImportComplete,
            "IMPORT_ROLLBACK_COMPLETE" => StackStatus::ImportRollbackComplete,
            other => StackStatus::Other(other.to_string()),
        }
    }
}

impl std::fmt::Display for StackStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One stack as returned by the stack listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StackSummary {
    pub name: String,
    pub status: StackStatus,
}

impl StackSummary {
    pub fn new(name: impl Into<String>, status: StackStatus) -> Result<Self, ValidationError> {
        let name = name.into();
        if name.is_empty() {
            return Err(ValidationError::EmptyStackName);
        }
        Ok(Self { name, status })
    }
}

/// One resource declared by a stack
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StackResourceRecord {
    pub resource_type: String,
    pub physical_id: Option<String>,
    pub logical_id: String,
}

impl StackResourceRecord {
    pub fn new(
        resource_type: impl Into<String>,
        physical_id: Option<String>,
        logical_id: impl Into<String>,
    ) -> Self {
        Self {
            resource_type: resource_type.into(),
            physical_id,
            logical_id: logical_id.into(),
        }
    }

    /// The bucket this record declares, if it is a created bucket resource
    pub fn declared_bucket(&self) -> Option<BucketName> {
        if self.resource_type != BUCKET_RESOURCE_TYPE {
            return None;
        }
        // Resources still being created have no physical id yet
        self.physical_id
            .as_deref()
            .and_then(|id| BucketName::new(id).ok())
    }
}
