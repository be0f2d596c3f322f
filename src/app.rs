use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use crate::{
    adapters::outbound::{
        aws::{load_sdk_config, AwsSettings, CloudFormationStackCatalog, S3BucketStore},
        memory::{InMemoryBucketStore, InMemoryStackCatalog},
    },
    domain::errors::ConfigError,
    ports::{stacks::StackCatalog, storage::BucketStore},
    services::{CleanupOptions, CleanupServiceImpl, InventoryServiceImpl, PurgeServiceImpl},
};

/// Configuration for the application
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub backend: ProviderBackend,
    pub cleanup: CleanupOptions,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            backend: ProviderBackend::Aws(AwsSettings::default()),
            cleanup: CleanupOptions::default(),
        }
    }
}

/// Where buckets and stacks come from
#[derive(Debug, Clone)]
pub enum ProviderBackend {
    /// S3 and CloudFormation through the AWS SDK
    Aws(AwsSettings),
    /// Empty in-memory providers, for local runs and tests
    InMemory,
}

/// Provider clients the services are built on
#[derive(Clone)]
pub struct AppDependencies {
    pub bucket_store: Arc<dyn BucketStore>,
    pub stack_catalog: Arc<dyn StackCatalog>,
}

/// Application services container
pub struct AppServices {
    pub cleanup_service: CleanupServiceImpl,
    pub inventory_service: Arc<InventoryServiceImpl>,
    pub purge_service: Arc<PurgeServiceImpl>,
}

/// Application builder for dependency injection
pub struct AppBuilder {
    config: AppConfig,
    providers: Option<AppDependencies>,
    cancel: Option<CancellationToken>,
}

impl AppBuilder {
    pub fn new() -> Self {
        Self {
            config: AppConfig::default(),
            providers: None,
            cancel: None,
        }
    }

    pub fn with_config(mut self, config: AppConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_backend(mut self, backend: ProviderBackend) -> Self {
        self.config.backend = backend;
        self
    }

    pub fn with_cleanup_options(mut self, options: CleanupOptions) -> Self {
        self.config.cleanup = options;
        self
    }

    /// Use these providers instead of building them from the backend config
    pub fn with_providers(
        mut self,
        bucket_store: Arc<dyn BucketStore>,
        stack_catalog: Arc<dyn StackCatalog>,
    ) -> Self {
        self.providers = Some(AppDependencies {
            bucket_store,
            stack_catalog,
        });
        self
    }

    /// Token the cleanup run observes between purge phases
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = Some(cancel);
        self
    }

    /// Build the provider clients.
    ///
    /// For the AWS backend this resolves region and credentials, so a broken
    /// environment fails here before any listing call.
    pub async fn build_dependencies(&self) -> Result<AppDependencies, AppError> {
        if let Some(providers) = &self.providers {
            return Ok(providers.clone());
        }

        match &self.config.backend {
            ProviderBackend::Aws(settings) => {
                let sdk_config = load_sdk_config(settings).await?;
                Ok(AppDependencies {
                    bucket_store: Arc::new(S3BucketStore::new(&sdk_config)),
                    stack_catalog: Arc::new(CloudFormationStackCatalog::new(&sdk_config)),
                })
            }
            ProviderBackend::InMemory => Ok(AppDependencies {
                bucket_store: Arc::new(InMemoryBucketStore::new()),
                stack_catalog: Arc::new(InMemoryStackCatalog::new()),
            }),
        }
    }

    /// Build the complete application with services
    pub async fn build(self) -> Result<AppServices, AppError> {
        if self.config.cleanup.purge_concurrency == 0 {
            return Err(AppError::Configuration {
                message: "purge concurrency must be at least 1".to_string(),
            });
        }

        let deps = self.build_dependencies().await?;

        let inventory_service = Arc::new(InventoryServiceImpl::new(
            deps.bucket_store.clone(),
            deps.stack_catalog.clone(),
        ));
        let purge_service = Arc::new(PurgeServiceImpl::new(deps.bucket_store.clone()));

        let mut cleanup_service = CleanupServiceImpl::new(
            inventory_service.clone(),
            purge_service.clone(),
            self.config.cleanup.clone(),
        );
        if let Some(cancel) = self.cancel {
            cleanup_service = cleanup_service.with_cancellation(cancel);
        }

        Ok(AppServices {
            cleanup_service,
            inventory_service,
            purge_service,
        })
    }
}

impl Default for AppBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Application-level errors
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Create an application over empty in-memory providers
pub async fn create_in_memory_app() -> Result<AppServices, AppError> {
    AppBuilder::new()
        .with_backend(ProviderBackend::InMemory)
        .build()
        .await
}

/// Create an AWS-backed application
pub async fn create_aws_app(
    settings: AwsSettings,
    options: CleanupOptions,
) -> Result<AppServices, AppError> {
    AppBuilder::new()
        .with_backend(ProviderBackend::Aws(settings))
        .with_cleanup_options(options)
        .build()
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::inbound::AssumeYes;
    use crate::ports::services::CleanupService;

    #[tokio::test]
    async fn test_in_memory_app_finds_nothing() {
        let app = create_in_memory_app().await.unwrap();
        let report = app.cleanup_service.run(&AssumeYes).await.unwrap();
        assert_eq!(report.total_buckets, 0);
        assert!(report.orphans.is_empty());
        assert!(!report.confirmed);
    }

    #[tokio::test]
    async fn test_zero_concurrency_is_rejected() {
        let result = AppBuilder::new()
            .with_backend(ProviderBackend::InMemory)
            .with_cleanup_options(CleanupOptions::builder().purge_concurrency(0).build())
            .build()
            .await;
        assert!(matches!(result, Err(AppError::Configuration { .. })));
    }

    #[tokio::test]
    async fn test_injected_providers_take_precedence() {
        let store = InMemoryBucketStore::new();
        store
            .create_bucket(&crate::domain::value_objects::BucketName::new("x").unwrap(), false)
            .await;

        let app = AppBuilder::new()
            .with_providers(Arc::new(store), Arc::new(InMemoryStackCatalog::new()))
            .with_cleanup_options(CleanupOptions::builder().dry_run(true).build())
            .build()
            .await
            .unwrap();

        let report = app.cleanup_service.run(&AssumeYes).await.unwrap();
        assert_eq!(report.orphans.len(), 1);
        assert!(report.dry_run);
    }

    #[tokio::test]
    async fn test_cancellation_token_is_shared() {
        let cancel = CancellationToken::new();
        let app = AppBuilder::new()
            .with_backend(ProviderBackend::InMemory)
            .with_cancellation(cancel.clone())
            .build()
            .await
            .unwrap();

        cancel.cancel();
        assert!(app.cleanup_service.cancellation_token().is_cancelled());
    }
}
