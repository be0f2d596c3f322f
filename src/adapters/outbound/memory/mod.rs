mod in_memory_bucket_store;
mod in_memory_stack_catalog;

pub use in_memory_bucket_store::{FailOn, InMemoryBucketStore, StoreCall};
pub use in_memory_stack_catalog::InMemoryStackCatalog;
