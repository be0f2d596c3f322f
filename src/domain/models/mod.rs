pub mod object;
pub mod purge;
pub mod report;
pub mod stack;

pub use object::*;
pub use purge::*;
pub use report::*;
pub use stack::*;
