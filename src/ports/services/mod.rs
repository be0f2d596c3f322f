mod cleanup_service;
mod inventory_service;
mod purge_service;

pub use cleanup_service::{CleanupService, OrphanScan};
pub use inventory_service::InventoryService;
pub use purge_service::PurgeService;
