//! Desktop integration: clipboard writes, opening URLs in the default browser,
//! and the transcript hand-off built on both.

use anyhow::{Context, Result, anyhow};
use std::future::Future;
use std::process::{Command, Stdio};
use tracing::{debug, info};

use crate::constants::constants;
use crate::youtube::watch_url;

/// The two desktop capabilities the explorer uses.
pub trait Desktop {
  fn copy_text(&self, text: &str) -> impl Future<Output = Result<()>> + Send;
  fn open_url(&self, url: &str) -> Result<()>;
}

/// Real desktop: the system clipboard through `arboard`, and `open`/`xdg-open`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemDesktop;

impl Desktop for SystemDesktop {
  async fn copy_text(&self, text: &str) -> Result<()> {
    let text = text.to_string();
    // Clipboard backends block while talking to the display server.
    tokio::task::spawn_blocking(move || arboard::Clipboard::new().and_then(|mut cb| cb.set_text(text)))
      .await
      .context("Clipboard task panicked")?
      .map_err(|e| anyhow!("Clipboard unavailable: {}", e))?;
    debug!("clipboard: copied");
    Ok(())
  }

  fn open_url(&self, url: &str) -> Result<()> {
    // Use platform-appropriate command to open URL in default browser.
    #[cfg(target_os = "macos")]
    let cmd = "open";
    #[cfg(not(target_os = "macos"))]
    let cmd = "xdg-open";
    let mut child = Command::new(cmd)
      .arg(url)
      .stdin(Stdio::null())
      .stdout(Stdio::null())
      .stderr(Stdio::null())
      .spawn()
      .with_context(|| format!("Failed to launch {}", cmd))?;
    // Reap the child in a background thread to avoid zombie processes.
    std::thread::spawn(move || {
      let _ = child.wait();
    });
    Ok(())
  }
}

/// What happened during a transcript hand-off.
#[derive(Debug)]
pub struct HandoffOutcome {
  /// The watch URL reached the clipboard.
  pub copied: bool,
  /// Set when the transcript tool could not be opened.
  pub open_error: Option<anyhow::Error>,
}

/// Copy the video's watch URL to the clipboard, then open the transcript tool.
///
/// The tool is opened exactly once whether or not the copy succeeded; a
/// missing clipboard degrades silently.
pub async fn transcript_handoff<D: Desktop>(desktop: &D, video_id: &str) -> HandoffOutcome {
  let url = watch_url(video_id);
  let copied = match desktop.copy_text(&url).await {
    Ok(()) => true,
    Err(e) => {
      debug!(video_id, err = %e, "handoff: clipboard unavailable, opening tool only");
      false
    }
  };
  info!(video_id, copied, "handoff: opening transcript tool");
  let open_error = desktop.open_url(&constants().transcript_tool_url).err();
  HandoffOutcome { copied, open_error }
}

/// Open the video's watch page.
pub fn open_video<D: Desktop>(desktop: &D, video_id: &str) -> Result<()> {
  desktop.open_url(&watch_url(video_id))
}
