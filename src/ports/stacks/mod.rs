mod stack_catalog;

pub use stack_catalog::StackCatalog;
