pub mod console;

pub use console::{AssumeYes, ConsolePrompt};
