mod cloudformation_stack_catalog;
pub mod error;
mod s3_bucket_store;

pub use cloudformation_stack_catalog::CloudFormationStackCatalog;
pub use s3_bucket_store::S3BucketStore;

use aws_config::{
    retry::RetryConfig, timeout::TimeoutConfig, BehaviorVersion, Region, SdkConfig,
};
use aws_credential_types::provider::ProvideCredentials;
use aws_sdk_s3::error::DisplayErrorContext;
use std::time::Duration;
use tracing::{debug, info};

use crate::domain::errors::ConfigError;

/// How the AWS clients are configured.
///
/// Unset fields fall back to the standard provider chain (environment,
/// shared config files, instance metadata).
#[derive(Debug, Clone)]
pub struct AwsSettings {
    pub region: Option<String>,
    pub profile: Option<String>,
    /// Custom S3-compatible endpoint, e.g. a local MinIO
    pub endpoint_url: Option<String>,
    pub max_attempts: u32,
    pub operation_timeout: Option<Duration>,
}

impl Default for AwsSettings {
    fn default() -> Self {
        Self {
            region: None,
            profile: None,
            endpoint_url: None,
            max_attempts: 3,
            operation_timeout: None,
        }
    }
}

/// Resolve the shared SDK configuration and make sure credentials exist.
///
/// Fails before any provider call when no region is configured or the
/// credential chain yields nothing.
pub async fn load_sdk_config(settings: &AwsSettings) -> Result<SdkConfig, ConfigError> {
    if settings.max_attempts == 0 {
        return Err(ConfigError::Invalid(
            "max_attempts must be at least 1".to_string(),
        ));
    }

    let mut loader = aws_config::defaults(BehaviorVersion::latest())
        .retry_config(RetryConfig::standard().with_max_attempts(settings.max_attempts));

    if let Some(region) = &settings.region {
        loader = loader.region(Region::new(region.clone()));
    }
    if let Some(profile) = &settings.profile {
        loader = loader.profile_name(profile);
    }
    if let Some(endpoint_url) = &settings.endpoint_url {
        loader = loader.endpoint_url(endpoint_url);
    }
    if let Some(timeout) = settings.operation_timeout {
        loader = loader.timeout_config(TimeoutConfig::builder().operation_timeout(timeout).build());
    }

    let sdk_config = loader.load().await;

    let region = sdk_config.region().ok_or(ConfigError::MissingRegion)?;
    let provider = sdk_config
        .credentials_provider()
        .ok_or(ConfigError::MissingCredentialsProvider)?;
    provider
        .provide_credentials()
        .await
        .map_err(|e| ConfigError::Credentials(DisplayErrorContext(&e).to_string()))?;

    info!(region = %region, "resolved AWS configuration");
    debug!(
        profile = ?settings.profile,
        endpoint_url = ?settings.endpoint_url,
        max_attempts = settings.max_attempts,
        "AWS client settings"
    );
    Ok(sdk_config)
}
