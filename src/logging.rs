use anyhow::{Context, Result};
use directories::ProjectDirs;
use std::path::PathBuf;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

const LOG_FILE: &str = "ytchan.log";

/// Where the log file lives: the platform data dir, or the temp dir without a home.
pub fn log_dir() -> PathBuf {
  ProjectDirs::from("", "", "ytchan")
    .map(|dirs| dirs.data_local_dir().to_path_buf())
    .unwrap_or_else(|| std::env::temp_dir().join("ytchan"))
}

/// Send tracing output to a file, since the terminal belongs to the TUI.
///
/// Filter comes from `RUST_LOG`, defaulting to `ytchan=info`. Keep the
/// returned guard alive until exit so buffered lines get flushed.
pub fn init_tracing() -> Result<WorkerGuard> {
  let dir = log_dir();
  std::fs::create_dir_all(&dir).with_context(|| format!("Failed to create log directory {}", dir.display()))?;

  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("ytchan=info"));
  let file_appender = tracing_appender::rolling::never(&dir, LOG_FILE);
  let (writer, guard) = tracing_appender::non_blocking(file_appender);

  tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_writer(writer)
    .with_ansi(false)
    .try_init()
    .map_err(|e| anyhow::anyhow!(e))
    .context("Failed to install tracing subscriber")?;
  Ok(guard)
}
