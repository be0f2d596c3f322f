use async_trait::async_trait;
use std::collections::HashSet;

use crate::domain::{errors::InventoryResult, value_objects::BucketName};

/// Port for the two inventories the reconciler compares
#[async_trait]
pub trait InventoryService: Send + Sync + 'static {
    /// Every bucket the account owns, following all pages
    async fn list_all_buckets(&self) -> InventoryResult<Vec<BucketName>>;

    /// Buckets declared as resources by at least one active stack
    async fn list_buckets_declared_by_active_stacks(&self)
        -> InventoryResult<HashSet<BucketName>>;
}
