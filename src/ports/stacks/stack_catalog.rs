use async_trait::async_trait;

use crate::{
    domain::{
        errors::ProviderResult,
        models::{StackResourceRecord, StackStatus, StackSummary},
    },
    ports::Page,
};

/// Port for the orchestration-stack provider
#[async_trait]
pub trait StackCatalog: Send + Sync + 'static {
    /// List one page of stacks whose status is in `statuses`
    async fn list_stacks(
        &self,
        statuses: &[StackStatus],
        next_token: Option<String>,
    ) -> ProviderResult<Page<StackSummary>>;

    /// List one page of the resources a stack declares
    async fn list_stack_resources(
        &self,
        stack_name: &str,
        next_token: Option<String>,
    ) -> ProviderResult<Page<StackResourceRecord>>;
}
