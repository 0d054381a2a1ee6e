//! Logging setup
//!
//! Logs go to stderr, or to `log_file` when one is configured. The filter
//! comes from `SHELF_LOG` when set, otherwise `warn` (`debug` with --verbose).

use std::fs::OpenOptions;
use std::sync::Mutex;

use tracing::debug;
use tracing_subscriber::EnvFilter;

use shelf_core::Config;

const LOG_ENV: &str = "SHELF_LOG";

/// Initialize the global tracing subscriber
pub fn init(config: &Config, verbose: bool) {
    let level = if verbose { "debug" } else { "warn" };
    let env_filter = EnvFilter::try_from_env(LOG_ENV)
        .unwrap_or_else(|_| EnvFilter::new(default_directives(level)));

    if let Some(log_path) = &config.log_file {
        let file = match OpenOptions::new().create(true).append(true).open(log_path) {
            Ok(f) => f,
            Err(e) => {
                eprintln!("Warning: Could not open log file {:?}: {}", log_path, e);
                return;
            }
        };

        // Ignore error if already initialized
        let _ = tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .with_ansi(false)
            .with_writer(Mutex::new(file))
            .try_init();

        debug!("Logging to {:?}", log_path);
        return;
    }

    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

fn default_directives(level: &str) -> String {
    format!("shelf_core={},shelf_cli={}", level, level)
}
