//! Tracing subscriber setup.
//!
//! The TUI owns the terminal, so in dashboard mode logs go to a file or
//! nowhere. Headless exports log to stderr.

use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::{anyhow, Context, Result};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogTarget {
    Stderr,
    File(PathBuf),
    Off,
}

/// Filter from `RUST_LOG` if set, otherwise `level` for this crate and
/// its client.
fn filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "slawatch={},slawatch_client={}",
            level, level
        ))
    })
}

/// Install the global subscriber.
pub fn init(target: &LogTarget, level: &str) -> Result<()> {
    match target {
        LogTarget::Off => Ok(()),
        LogTarget::Stderr => tracing_subscriber::fmt()
            .with_env_filter(filter(level))
            .with_writer(std::io::stderr)
            .try_init()
            .map_err(|e| anyhow!("failed to install log subscriber: {}", e)),
        LogTarget::File(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("failed to open log file {}", path.display()))?;
            tracing_subscriber::fmt()
                .with_env_filter(filter(level))
                .with_writer(Mutex::new(file))
                .with_ansi(false)
                .try_init()
                .map_err(|e| anyhow!("failed to install log subscriber: {}", e))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_off_installs_nothing() {
        assert!(init(&LogTarget::Off, "debug").is_ok());
    }

    #[test]
    fn test_unwritable_log_file() {
        let target = LogTarget::File(PathBuf::from("/nonexistent/dir/slawatch.log"));
        assert!(init(&target, "info").is_err());
    }
}
