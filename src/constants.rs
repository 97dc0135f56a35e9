//! Application constants loaded from `constants.ron` at compile time.
//!
//! The RON file is embedded via `include_str!` so it's always available,
//! with no runtime file I/O. Parsed once on first access via `LazyLock`.

use serde::Deserialize;
use std::sync::LazyLock;

/// All tuneable application constants.
#[derive(Debug, Deserialize)]
pub struct Constants {
  pub api_base_url: String,
  /// Preferences entry holding the API key.
  pub api_key_entry: String,
  pub theme_entry: String,

  // Result sizes
  pub channel_search_size: usize,
  pub uploads_page_size: usize,

  // Hand-off
  pub watch_url_prefix: String,
  pub transcript_tool_url: String,
  pub copy_feedback_ms: u64,

  // Layout
  pub channel_card_width: u16,
  pub video_card_width: u16,
  pub preview_width_percent: u16,
}

static CONSTANTS: LazyLock<Constants> = LazyLock::new(|| {
  // Safety: the RON file is embedded at compile time; if it's malformed this is a build-time error.
  ron::from_str(include_str!("../constants.ron")).expect("constants.ron must be valid RON (embedded at compile time)")
});

/// Returns a reference to the parsed application constants.
pub fn constants() -> &'static Constants {
  &CONSTANTS
}
