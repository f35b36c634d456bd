//! User interface and interaction
//!
//! CLI parsing, the terminal progress bar and shell completion generation.

pub mod cli;
pub mod completion;
pub mod progress;

// Re-export commonly used items
pub use cli::{Cli, Commands, GlobalArgs, cli_to_config};
pub use completion::{completion_script, print_completions};
pub use progress::ProgressReporter;
