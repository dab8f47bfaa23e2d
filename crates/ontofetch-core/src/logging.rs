//! Logging init for a short-lived CLI run.
//!
//! One global subscriber, chosen at startup: append to a log file under the
//! XDG state dir, or fall back to plain stderr when that file cannot be
//! opened (unset HOME, unwritable dir). The refresher runs for seconds, so
//! a mutex-guarded file handle is plenty.

use anyhow::Result;
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

/// Where log output goes for this process.
#[derive(Debug)]
pub enum LogSink {
    File(PathBuf),
    Stderr,
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,ontofetch_core=debug,ontofetch_cli=debug"))
}

/// Default log file: `~/.local/state/ontofetch/ontofetch.log`.
pub fn log_file_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("ontofetch")?;
    Ok(xdg_dirs
        .get_state_home()
        .join("ontofetch")
        .join("ontofetch.log"))
}

/// Open `path` for appending, creating parent directories as needed.
fn open_log_file(path: &Path) -> io::Result<File> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::OpenOptions::new().create(true).append(true).open(path)
}

/// Install the global subscriber and report which sink was picked.
pub fn init() -> LogSink {
    let opened = log_file_path().and_then(|path| {
        let file = open_log_file(&path)?;
        Ok((file, path))
    });
    match opened {
        Ok((file, path)) => {
            tracing_subscriber::fmt()
                .with_env_filter(env_filter())
                .with_writer(Mutex::new(file))
                .with_ansi(false)
                .init();
            tracing::info!("logging to {}", path.display());
            LogSink::File(path)
        }
        Err(_) => {
            tracing_subscriber::fmt()
                .with_env_filter(env_filter())
                .with_writer(io::stderr)
                .with_ansi(false)
                .init();
            LogSink::Stderr
        }
    }
}
