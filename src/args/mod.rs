//! Command-line argument parsing and handling.

pub mod definition;
pub mod output;
pub mod utils;

// Re-export commonly used items
pub use definition::{Args, CliError, run};
pub use utils::determine_log_level;
