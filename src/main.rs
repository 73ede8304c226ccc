//! unitfacet binary entrypoint kept minimal. The engine lives in the library.

use std::fmt;
use std::process::ExitCode;
use std::sync::OnceLock;

use clap::Parser;
use unitfacet::args::{self, Args};
use unitfacet::settings;

/// Log timestamp formatter (`YYYY-MM-DD-T HH:MM:SS`, local time).
struct UnitfacetTimer;

impl tracing_subscriber::fmt::time::FormatTime for UnitfacetTimer {
    fn format_time(&self, w: &mut tracing_subscriber::fmt::format::Writer<'_>) -> fmt::Result {
        let ts = chrono::Local::now().format("%Y-%m-%d-T %H:%M:%S").to_string();
        w.write_str(&ts)
    }
}

/// Keeps the non-blocking log writer alive for the whole process.
static LOG_GUARD: OnceLock<tracing_appender::non_blocking::WorkerGuard> = OnceLock::new();

/// What: Initialize tracing to `~/.config/unitfacet/logs/unitfacet.log`.
///
/// Inputs:
/// - `level`: Default filter used when `RUST_LOG` is unset.
///
/// Output:
/// - None; falls back to stderr when the log file cannot be opened.
fn init_logging(level: &str) {
    let env_filter = || {
        tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level))
    };
    let mut log_path = settings::logs_dir();
    log_path.push("unitfacet.log");
    match std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
    {
        Ok(file) => {
            let (non_blocking, guard) = tracing_appender::non_blocking(file);
            tracing_subscriber::fmt()
                .with_env_filter(env_filter())
                .with_target(false)
                .with_ansi(false)
                .with_writer(non_blocking)
                .with_timer(UnitfacetTimer)
                .init();
            let _ = LOG_GUARD.set(guard);
            tracing::info!(path = %log_path.display(), "logging initialized");
        }
        Err(e) => {
            // Fallback: stderr logger so results on stdout stay clean
            tracing_subscriber::fmt()
                .with_env_filter(env_filter())
                .with_target(false)
                .with_ansi(true)
                .with_writer(std::io::stderr)
                .with_timer(UnitfacetTimer)
                .init();
            tracing::warn!(error = %e, "failed to open log file; using stderr");
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    let settings = settings::settings();
    init_logging(&args::determine_log_level(&args, &settings));
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "unitfacet starting");
    match args::run(&args, &settings).await {
        Ok(out) => {
            print!("{out}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("unitfacet: {err}");
            tracing::error!(error = %err, "request failed");
            ExitCode::FAILURE
        }
    }
}
