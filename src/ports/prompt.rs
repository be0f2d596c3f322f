use async_trait::async_trait;

use crate::domain::models::OrphanSet;

/// Port for the operator's go/no-go decision before anything is deleted
#[async_trait]
pub trait ConfirmationPrompt: Send + Sync {
    /// Ask whether the given orphans may be purged
    async fn confirm(&self, orphans: &OrphanSet) -> std::io::Result<bool>;
}
