use async_trait::async_trait;
use aws_config::SdkConfig;
use aws_sdk_cloudformation::{types::StackStatus as SdkStackStatus, Client};

use super::error::{malformed, provider_error};
use crate::{
    domain::{
        errors::ProviderResult,
        models::{StackResourceRecord, StackStatus, StackSummary},
    },
    ports::{stacks::StackCatalog, Page},
};

fn stack_summary(name: Option<&str>, status: Option<&str>) -> ProviderResult<StackSummary> {
    let name = name.ok_or_else(|| malformed("ListStacks", "stack summary without a name"))?;
    // No status reported means nothing we can treat as active
    let status = StackStatus::from(status.unwrap_or_default());
    StackSummary::new(name, status).map_err(|e| malformed("ListStacks", e.to_string()))
}

fn resource_record(
    resource_type: Option<&str>,
    physical_id: Option<&str>,
    logical_id: Option<&str>,
) -> StackResourceRecord {
    StackResourceRecord::new(
        resource_type.unwrap_or_default(),
        physical_id.map(str::to_string),
        logical_id.unwrap_or_default(),
    )
}

/// CloudFormation implementation of [`StackCatalog`]
#[derive(Clone)]
pub struct CloudFormationStackCatalog {
    client: Client,
}

impl CloudFormationStackCatalog {
    pub fn new(sdk_config: &SdkConfig) -> Self {
        Self {
            client: Client::new(sdk_config),
        }
    }
}

#[async_trait]
impl StackCatalog for CloudFormationStackCatalog {
    async fn list_stacks(
        &self,
        statuses: &[StackStatus],
        next_token: Option<String>,
    ) -> ProviderResult<Page<StackSummary>> {
        let filter = statuses
            .iter()
            .map(|status| SdkStackStatus::from(status.as_str()))
            .collect();

        let output = self
            .client
            .list_stacks()
            .set_stack_status_filter(Some(filter))
            .set_next_token(next_token)
            .send()
            .await
            .map_err(|e| provider_error("ListStacks", e))?;

        let items = output
            .stack_summaries()
            .iter()
            .map(|summary| {
                stack_summary(
                    summary.stack_name(),
                    summary.stack_status().map(SdkStackStatus::as_str),
                )
            })
            .collect::<ProviderResult<Vec<_>>>()?;

        Ok(Page {
            items,
            next_token: output.next_token().map(str::to_string),
        })
    }

    async fn list_stack_resources(
        &self,
        stack_name: &str,
        next_token: Option<String>,
    ) -> ProviderResult<Page<StackResourceRecord>> {
        let output = self
            .client
            .list_stack_resources()
            .stack_name(stack_name)
            .set_next_token(next_token)
            .send()
            .await
            .map_err(|e| provider_error("ListStackResources", e))?;

        let items = output
            .stack_resource_summaries()
            .iter()
            .map(|resource| {
                resource_record(
                    resource.resource_type(),
                    resource.physical_resource_id(),
                    resource.logical_resource_id(),
                )
            })
            .collect();

        Ok(Page {
            items,
            next_token: output.next_token().map(str::to_string),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::outbound::aws::error::MALFORMED_RESPONSE;
    use crate::domain::value_objects::BucketName;

    #[test]
    fn test_stack_summary_keeps_status() {
        let summary = stack_summary(Some("web"), Some("UPDATE_COMPLETE")).unwrap();
        assert_eq!(summary.name, "web");
        assert_eq!(summary.status, StackStatus::UpdateComplete);
        assert!(summary.status.is_active());
    }

    #[test]
    fn test_stack_without_name_is_malformed() {
        let err = stack_summary(None, Some("CREATE_COMPLETE")).unwrap_err();
        assert!(err.has_code(MALFORMED_RESPONSE));
    }

    #[test]
    fn test_stack_without_status_is_inactive() {
        let summary = stack_summary(Some("web"), None).unwrap();
        assert!(!summary.status.is_active());
    }

    #[test]
    fn test_resource_record_declares_bucket() {
        let record = resource_record(Some("AWS::S3::Bucket"), Some("web-assets"), Some("Assets"));
        assert_eq!(record.logical_id, "Assets");
        assert_eq!(record.declared_bucket(), Some(BucketName::new("web-assets").unwrap()));
    }

    #[test]
    fn test_resource_record_with_missing_fields_declares_nothing() {
        let record = resource_record(None, Some("web-assets"), None);
        assert_eq!(record.resource_type, "");
        assert!(record.declared_bucket().is_none());

        let pending = resource_record(Some("AWS::S3::Bucket"), None, Some("Pending"));
        assert!(pending.declared_bucket().is_none());
    }
}
