//! Shared utilities for argument processing.

use crate::args::Args;
use crate::settings::Settings;

/// What: Determine the log level from flags, settings, and defaults.
///
/// Inputs:
/// - `args`: Parsed command-line arguments.
/// - `settings`: Loaded settings.
///
/// Output:
/// - Log filter directive (trace, debug, info, warn, error).
///
/// Details:
/// - `--verbose` wins over `--log-level`, which wins over `log_level` in settings.conf.
/// - `RUST_LOG`, when set, is applied by the subscriber before this value is consulted.
#[must_use]
pub fn determine_log_level(args: &Args, settings: &Settings) -> String {
    if args.verbose {
        "debug".to_string()
    } else {
        args.log_level
            .clone()
            .unwrap_or_else(|| settings.log_level.clone())
    }
}
