use std::fs::{self, OpenOptions};
use std::path::Path;
use std::sync::Arc;

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

use crate::error::Result;

/// Installs the global subscriber: stderr always, plus an optional append
/// file. Stdout is reserved for the rendered timeline. Unknown LOG_LEVEL
/// values fall back to info.
pub fn init(level: &str, log_file: Option<&Path>) -> Result<()> {
    let directive = match level.to_ascii_uppercase().as_str() {
        "DEBUG" => "debug",
        "INFO" => "info",
        "WARNING" | "WARN" => "warn",
        "ERROR" => "error",
        _ => "info",
    };

    let file_layer = match log_file {
        Some(path) => {
            if let Some(parent) = path.parent() {
                if !parent.as_os_str().is_empty() {
                    fs::create_dir_all(parent)?;
                }
            }
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            Some(fmt::layer().with_ansi(false).with_writer(Arc::new(file)))
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(EnvFilter::new(directive))
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(file_layer)
        .init();

    if !matches!(
        level.to_ascii_uppercase().as_str(),
        "DEBUG" | "INFO" | "WARNING" | "WARN" | "ERROR"
    ) {
        tracing::warn!(level, "unknown LOG_LEVEL, using info");
    }

    Ok(())
}
