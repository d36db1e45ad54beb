use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{anyhow, Result};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Where the log file lives: <data_dir>/tableview/tableview.log
pub fn log_path() -> Option<PathBuf> {
    dirs::data_dir().map(|dir| dir.join("tableview").join("tableview.log"))
}

/// Initialize tracing, honoring RUST_LOG over the given default level.
///
/// Logs go to the log file so the interactive surface stays clean; when
/// the data directory is unavailable they fall back to stderr.
pub fn init_logging(default_level: &str) -> Result<()> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let file = log_path().and_then(|path| {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).ok()?;
        }
        fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .ok()
    });

    match file {
        Some(file) => {
            let fmt_layer = fmt::layer()
                .with_writer(Arc::new(file))
                .with_target(true)
                .with_level(true)
                .with_ansi(false)
                .compact();
            tracing_subscriber::registry()
                .with(filter)
                .with(fmt_layer)
                .try_init()
                .map_err(|e| anyhow!("failed to initialize logging: {}", e))?;
        }
        None => {
            let fmt_layer = fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_level(true)
                .compact();
            tracing_subscriber::registry()
                .with(filter)
                .with(fmt_layer)
                .try_init()
                .map_err(|e| anyhow!("failed to initialize logging: {}", e))?;
        }
    }

    tracing::debug!("logging initialized");
    Ok(())
}
