pub mod prompt;
pub mod services;
pub mod stacks;
pub mod storage;

// Re-export all port traits for convenience
pub use prompt::ConfirmationPrompt;
pub use services::{CleanupService, InventoryService, OrphanScan, PurgeService};
pub use stacks::StackCatalog;
pub use storage::{BucketStore, VersionMarker, VersionPage};

/// One page of a provider listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub next_token: Option<String>,
}

impl<T> Page<T> {
    /// A page with no continuation
    pub fn last(items: Vec<T>) -> Self {
        Self {
            items,
            next_token: None,
        }
    }
}

impl<T> Default for Page<T> {
    fn default() -> Self {
        Self::last(Vec::new())
    }
}
