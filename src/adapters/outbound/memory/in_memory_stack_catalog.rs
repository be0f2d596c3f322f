use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::{
    domain::{
        errors::{ProviderError, ProviderResult},
        models::{StackResourceRecord, StackStatus, StackSummary, BUCKET_RESOURCE_TYPE},
    },
    ports::{stacks::StackCatalog, Page},
};

#[derive(Debug, Clone)]
struct StoredStack {
    summary: StackSummary,
    resources: Vec<StackResourceRecord>,
}

#[derive(Default)]
struct CatalogData {
    stacks: Vec<StoredStack>,
    fail_list_stacks: bool,
    fail_resources_of: Vec<String>,
    ignore_status_filter: bool,
    stack_pages_served: usize,
    resource_pages_served: usize,
}

/// In-memory stack provider.
///
/// Applies the status filter the way the real service does and serves both
/// listings through offset tokens, so pagination paths run in tests.
#[derive(Clone)]
pub struct InMemoryStackCatalog {
    data: Arc<RwLock<CatalogData>>,
    page_size: usize,
}

impl InMemoryStackCatalog {
    pub fn new() -> Self {
        Self {
            data: Arc::new(RwLock::new(CatalogData::default())),
            page_size: 100,
        }
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    /// Register a stack; `status` is the raw provider status string
    pub async fn add_stack(&self, name: &str, status: &str) -> ProviderResult<()> {
        let summary = StackSummary::new(name, StackStatus::from(status))
            .map_err(|e| ProviderError::new("CreateStack", e.to_string()))?;
        self.data.write().await.stacks.push(StoredStack {
            summary,
            resources: Vec::new(),
        });
        Ok(())
    }

    pub async fn add_resource(&self, stack: &str, record: StackResourceRecord) -> ProviderResult<()> {
        let mut data = self.data.write().await;
        let stored = data
            .stacks
            .iter_mut()
            .find(|s| s.summary.name == stack)
            .ok_or_else(|| stack_not_found(stack))?;
        stored.resources.push(record);
        Ok(())
    }

    /// Shorthand for a created bucket resource
    pub async fn add_bucket(&self, stack: &str, logical_id: &str, bucket: &str) -> ProviderResult<()> {
        self.add_resource(
            stack,
            StackResourceRecord::new(BUCKET_RESOURCE_TYPE, Some(bucket.to_string()), logical_id),
        )
        .await
    }

    pub async fn fail_list_stacks(&self) {
        self.data.write().await.fail_list_stacks = true;
    }

    pub async fn fail_resources_of(&self, stack: &str) {
        self.data.write().await.fail_resources_of.push(stack.to_string());
    }

    /// Return stacks in every status, as a provider that drops the filter would
    pub async fn ignore_status_filter(&self) {
        self.data.write().await.ignore_status_filter = true;
    }

    pub async fn stack_pages_served(&self) -> usize {
        self.data.read().await.stack_pages_served
    }

    pub async fn resource_pages_served(&self) -> usize {
        self.data.read().await.resource_pages_served
    }
}

impl Default for InMemoryStackCatalog {
    fn default() -> Self {
        Self::new()
    }
}

fn stack_not_found(stack: &str) -> ProviderError {
    ProviderError::new("ListStackResources", format!("Stack with id {} does not exist", stack))
        .with_code("ValidationError")
}

fn offset_page<T: Clone>(items: &[T], next_token: Option<String>, page_size: usize) -> Page<T> {
    let start = next_token
        .and_then(|t| t.parse::<usize>().ok())
        .unwrap_or(0)
        .min(items.len());
    let end = (start + page_size).min(items.len());
    Page {
        items: items[start..end].to_vec(),
        next_token: (end < items.len()).then(|| end.to_string()),
    }
}

#[async_trait]
impl StackCatalog for InMemoryStackCatalog {
    async fn list_stacks(
        &self,
        statuses: &[StackStatus],
        next_token: Option<String>,
    ) -> ProviderResult<Page<StackSummary>> {
        let mut data = self.data.write().await;
        if data.fail_list_stacks {
            return Err(ProviderError::new("ListStacks", "Rate exceeded").with_code("Throttling"));
        }
        data.stack_pages_served += 1;

        let unfiltered = data.ignore_status_filter;
        let matching: Vec<StackSummary> = data
            .stacks
            .iter()
            .filter(|s| unfiltered || statuses.contains(&s.summary.status))
            .map(|s| s.summary.clone())
            .collect();
        Ok(offset_page(&matching, next_token, self.page_size))
    }

    async fn list_stack_resources(
        &self,
        stack_name: &str,
        next_token: Option<String>,
    ) -> ProviderResult<Page<StackResourceRecord>> {
        let mut data = self.data.write().await;
        if data.fail_resources_of.iter().any(|s| s == stack_name) {
            return Err(ProviderError::new("ListStackResources", "Access Denied")
                .with_code("AccessDenied"));
        }
        data.resource_pages_served += 1;

        let stack = data
            .stacks
            .iter()
            .find(|s| s.summary.name == stack_name)
            .ok_or_else(|| stack_not_found(stack_name))?;
        Ok(offset_page(&stack.resources, next_token, self.page_size))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::ACTIVE_STACK_STATUSES;

    #[tokio::test]
    async fn test_status_filter_excludes_deleted_stacks() {
        let catalog = InMemoryStackCatalog::new();
        catalog.add_stack("live", "CREATE_COMPLETE").await.unwrap();
        catalog.add_stack("gone", "DELETE_COMPLETE").await.unwrap();

        let page = catalog.list_stacks(&ACTIVE_STACK_STATUSES, None).await.unwrap();
        let names: Vec<_> = page.items.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["live"]);
    }

    #[tokio::test]
    async fn test_resources_are_paged() {
        let catalog = InMemoryStackCatalog::new().with_page_size(2);
        catalog.add_stack("app", "UPDATE_COMPLETE").await.unwrap();
        for i in 0..5 {
            catalog
                .add_bucket("app", &format!("Bucket{i}"), &format!("app-bucket-{i}"))
                .await
                .unwrap();
        }

        let first = catalog.list_stack_resources("app", None).await.unwrap();
        assert_eq!(first.items.len(), 2);
        assert_eq!(first.next_token.as_deref(), Some("2"));

        let last = catalog
            .list_stack_resources("app", Some("4".to_string()))
            .await
            .unwrap();
        assert_eq!(last.items.len(), 1);
        assert!(last.next_token.is_none());
        assert_eq!(catalog.resource_pages_served().await, 2);
    }

    #[tokio::test]
    async fn test_unknown_stack_is_an_error() {
        let catalog = InMemoryStackCatalog::new();
        let err = catalog.list_stack_resources("missing", None).await.unwrap_err();
        assert!(err.has_code("ValidationError"));
    }
}
