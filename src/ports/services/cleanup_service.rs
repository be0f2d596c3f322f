use async_trait::async_trait;

use crate::{
    domain::{
        errors::{InventoryResult, RunError},
        models::{OrphanSet, RunReport},
    },
    ports::prompt::ConfirmationPrompt,
};

/// Port for the end-to-end orphan bucket cleanup
#[async_trait]
pub trait CleanupService: Send + Sync + 'static {
    /// Enumerate both inventories and reconcile them, without side effects
    async fn find_orphans(&self) -> InventoryResult<OrphanScan>;

    /// Find orphans, ask for confirmation and purge each confirmed orphan
    async fn run(&self, prompt: &dyn ConfirmationPrompt) -> Result<RunReport, RunError>;
}

/// Outcome of reconciling the two inventories
#[derive(Debug, Clone)]
pub struct OrphanScan {
    pub total_buckets: usize,
    pub declared_buckets: usize,
    pub orphans: OrphanSet,
}
