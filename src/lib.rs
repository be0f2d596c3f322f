pub mod adapters;
pub mod app;
pub mod domain;
pub mod ports;
pub mod services;

// Re-export key types for convenience

// Domain types
pub use domain::{
    // Models
    BatchFailure,
    BucketOutcome,
    // Value objects
    BucketName,
    // Errors
    ConfigError,
    DomainValidationError,
    InventoryError,
    ObjectIdentifier,
    ObjectKey,
    OrphanSet,
    OutcomeStatus,
    ProviderError,
    PurgeError,
    PurgePhase,
    PurgeSummary,
    RunError,
    RunReport,
    StackStatus,
    VersionId,
};

// Port types - interfaces for external systems
pub use ports::{
    BucketStore, CleanupService, ConfirmationPrompt, InventoryService, OrphanScan, Page,
    PurgeService, StackCatalog,
};

// Service implementations
pub use services::{
    compute_orphans, CleanupOptions, CleanupServiceImpl, InventoryServiceImpl, PurgeServiceImpl,
};

// Application factory and configuration
pub use app::{
    create_aws_app, create_in_memory_app, AppBuilder, AppConfig, AppDependencies, AppError,
    AppServices, ProviderBackend,
};

// Adapter types
pub use adapters::inbound::{AssumeYes, ConsolePrompt};
pub use adapters::outbound::aws::{AwsSettings, CloudFormationStackCatalog, S3BucketStore};
pub use adapters::outbound::memory::{InMemoryBucketStore, InMemoryStackCatalog};

pub mod prelude {
    pub use crate::{
        AppBuilder, AppServices, AssumeYes, AwsSettings, BucketName, CleanupOptions,
        CleanupService, ConsolePrompt, InMemoryBucketStore, InMemoryStackCatalog, OrphanSet,
        RunReport,
    };
}
