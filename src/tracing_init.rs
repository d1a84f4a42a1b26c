//! Tracing initialization: every command appends to `{data_dir}/mentor.log`.

use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

use crate::storage::path_utils;

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Initialize tracing to mentor.log (append mode).
///
/// Falls back to stderr when the log file cannot be opened. A second call is a no-op.
pub fn init_file_tracing() {
    let data_dir = path_utils::data_dir();
    std::fs::create_dir_all(&data_dir).ok();
    let log_path = path_utils::log_path();

    let opened = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path);

    let installed = match opened {
        Ok(log_file) => tracing_subscriber::fmt()
            .with_env_filter(env_filter())
            .with_writer(Mutex::new(log_file))
            .with_target(true)
            .with_ansi(false)
            .try_init(),
        Err(e) => {
            eprintln!("Cannot open {}: {}, logging to stderr", log_path.display(), e);
            tracing_subscriber::fmt()
                .with_env_filter(env_filter())
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_ansi(false)
                .try_init()
        }
    };

    if installed.is_ok() {
        tracing::debug!(path = %log_path.display(), "Tracing initialized");
    }
}
