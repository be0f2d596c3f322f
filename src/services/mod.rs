mod cleanup_service_impl;
mod inventory_service_impl;
mod purge_service_impl;
pub mod reconciler;

pub use cleanup_service_impl::{CleanupOptions, CleanupServiceImpl};
pub use inventory_service_impl::InventoryServiceImpl;
pub use purge_service_impl::PurgeServiceImpl;
pub use reconciler::compute_orphans;
