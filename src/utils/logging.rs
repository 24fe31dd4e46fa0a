//! Log file setup for fiander.
//!
//! The TUI owns the terminal, so logs go to `fiander.log` in the platform data directory
//! (`~/.local/share/fiander/` on Linux). Setup failures are silent: fiander runs without logs.

use std::fs::{self, OpenOptions};
use std::path::PathBuf;
use std::sync::Mutex;

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

pub const LOG_ENV: &str = "FIANDER_LOG";

pub fn log_dir() -> Option<PathBuf> {
    dirs::data_local_dir().map(|d| d.join("fiander"))
}

/// Picks the filter directive: `FIANDER_LOG` wins over the configured level.
pub fn resolve_level(env_value: Option<String>, configured: &str) -> String {
    env_value
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| configured.to_owned())
}

/// Installs the global subscriber. Only the first call takes effect.
pub fn init_logging(configured_level: &str) {
    let level = resolve_level(std::env::var(LOG_ENV).ok(), configured_level);

    let Some(dir) = log_dir() else {
        return;
    };
    if fs::create_dir_all(&dir).is_err() {
        return;
    }
    let Ok(file) = OpenOptions::new()
        .create(true)
        .append(true)
        .open(dir.join("fiander.log"))
    else {
        return;
    };

    let filter = EnvFilter::try_new(&level).unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(Mutex::new(file))
                .with_ansi(false)
                .with_target(true),
        )
        .try_init();

    tracing::info!(version = env!("CARGO_PKG_VERSION"), %level, "fiander started");
}
