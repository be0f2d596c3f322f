use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info};

use crate::{
    domain::{
        errors::{InventoryError, InventoryResult},
        models::ACTIVE_STACK_STATUSES,
        value_objects::BucketName,
    },
    ports::{services::InventoryService, stacks::StackCatalog, storage::BucketStore},
};

/// Builds both inventories by walking every page the providers return.
///
/// Any failed page aborts the enumeration: a partial stack inventory would
/// make declared buckets look orphaned.
#[derive(Clone)]
pub struct InventoryServiceImpl {
    store: Arc<dyn BucketStore>,
    catalog: Arc<dyn StackCatalog>,
}

impl InventoryServiceImpl {
    pub fn new(store: Arc<dyn BucketStore>, catalog: Arc<dyn StackCatalog>) -> Self {
        Self { store, catalog }
    }

    /// Add the buckets one stack declares, over all resource pages
    async fn collect_stack_buckets(
        &self,
        stack_name: &str,
        declared: &mut HashSet<BucketName>,
    ) -> InventoryResult<()> {
        let mut next_token = None;
        loop {
            let page = self
                .catalog
                .list_stack_resources(stack_name, next_token)
                .await
                .map_err(InventoryError::Stacks)?;

            for record in &page.items {
                if let Some(bucket) = record.declared_bucket() {
                    debug!(
                        stack = stack_name,
                        logical_id = %record.logical_id,
                        bucket = %bucket,
                        "stack declares bucket"
                    );
                    declared.insert(bucket);
                }
            }

            match page.next_token {
                Some(token) => next_token = Some(token),
                None => return Ok(()),
            }
        }
    }
}

#[async_trait]
impl InventoryService for InventoryServiceImpl {
    async fn list_all_buckets(&self) -> InventoryResult<Vec<BucketName>> {
        let mut buckets = Vec::new();
        let mut continuation_token = None;
        loop {
            let page = self
                .store
                .list_buckets(continuation_token)
                .await
                .map_err(InventoryError::Storage)?;
            buckets.extend(page.items);

            match page.next_token {
                Some(token) => continuation_token = Some(token),
                None => break,
            }
        }

        info!(count = buckets.len(), "enumerated buckets in account");
        Ok(buckets)
    }

    async fn list_buckets_declared_by_active_stacks(
        &self,
    ) -> InventoryResult<HashSet<BucketName>> {
        let mut declared = HashSet::new();
        let mut stack_count = 0usize;
        let mut next_token = None;
        loop {
            let page = self
                .catalog
                .list_stacks(&ACTIVE_STACK_STATUSES, next_token)
                .await
                .map_err(InventoryError::Stacks)?;

            for stack in &page.items {
                // Re-check, the provider filter is not relied on
                if !stack.status.is_active() {
                    debug!(stack = %stack.name, status = %stack.status, "skipping inactive stack");
                    continue;
                }
                stack_count += 1;
                self.collect_stack_buckets(&stack.name, &mut declared)
                    .await?;
            }

            match page.next_token {
                Some(token) => next_token = Some(token),
                None => break,
            }
        }

        info!(
            stacks = stack_count,
            buckets = declared.len(),
            "enumerated buckets declared by active stacks"
        );
        Ok(declared)
    }
}
