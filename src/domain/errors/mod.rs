mod cleanup_errors;
mod provider_errors;
mod validation_errors;

pub use cleanup_errors::*;
pub use provider_errors::*;
pub use validation_errors::*;
