//! Explorer state: what the user searched, what came back, and which screen shows it.
//!
//! Remote work happens elsewhere. Each operation is split into a `begin_*`
//! step that decides whether a request is issued (and prepares state for it)
//! and a `finish_*` step that applies the outcome. `finish_*` always clears
//! the loading flag, whatever the outcome.

use anyhow::Result;
use std::time::{Duration, Instant};
use tracing::{info, warn};

use crate::constants::constants;
use crate::youtube::{ChannelSummary, VideoSummary};

pub const SEARCH_FAILED: &str = "Search error";
pub const CHANNEL_NOT_FOUND: &str = "Channel info error";
pub const VIDEOS_FAILED: &str = "Video loading error";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViewState {
  #[default]
  Channels,
  Videos,
}

/// The most recently copied video, for transient "copied" feedback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CopyStatus {
  pub video_id: String,
  pub copied_at: Instant,
}

/// What the main area should show. Loading wins over everything else.
#[derive(Debug, PartialEq, Eq)]
pub enum Screen<'a> {
  Loading,
  /// No search has completed yet.
  Welcome,
  /// A search completed with no channels.
  NoResults,
  Channels(&'a [ChannelSummary]),
  Videos { channel: &'a ChannelSummary, videos: &'a [VideoSummary] },
}

#[derive(Debug, Default)]
pub struct Explorer {
  pub query: String,
  pub view: ViewState,
  pub channels: Vec<ChannelSummary>,
  pub selected_channel: Option<ChannelSummary>,
  pub videos: Vec<VideoSummary>,
  pub loading: bool,
  pub copy_status: Option<CopyStatus>,
  /// Modal failure message; input is blocked until dismissed.
  pub alert: Option<String>,
  /// Whether the credential entry panel is open.
  pub show_settings: bool,
  /// Set once a search has completed, to tell "nothing searched" from "nothing found".
  pub searched: bool,
}

impl Explorer {
  /// Prepare a channel search. Returns the trimmed query to send, or `None`
  /// when no request should be made (blank query, or no API key, in which
  /// case the credential panel is opened instead).
  pub fn begin_search(&mut self, has_credential: bool) -> Option<String> {
    let query = self.query.trim();
    if query.is_empty() {
      return None;
    }
    if !has_credential {
      info!("search without API key, opening credential panel");
      self.show_settings = true;
      return None;
    }
    let query = query.to_string();
    self.loading = true;
    self.channels.clear();
    self.videos.clear();
    self.selected_channel = None;
    self.view = ViewState::Channels;
    Some(query)
  }

  pub fn finish_search(&mut self, result: Result<Vec<ChannelSummary>>) {
    self.loading = false;
    match result {
      Ok(channels) => {
        info!(count = channels.len(), "search complete");
        self.channels = channels;
        self.searched = true;
      }
      Err(e) => {
        warn!(err = %format!("{:#}", e), "search failed");
        self.searched = true;
        self.alert = Some(SEARCH_FAILED.to_string());
      }
    }
  }

  /// Prepare loading the videos of the channel at `index`. Returns its id.
  pub fn begin_channel(&mut self, index: usize) -> Option<String> {
    let channel = self.channels.get(index)?.clone();
    let id = channel.id.clone();
    self.loading = true;
    self.selected_channel = Some(channel);
    self.videos.clear();
    Some(id)
  }

  /// Apply the two-step listing outcome: `Ok(None)` means the channel lookup found nothing.
  pub fn finish_channel(&mut self, result: Result<Option<Vec<VideoSummary>>>) {
    self.loading = false;
    match result {
      Ok(Some(videos)) => {
        info!(count = videos.len(), "channel videos loaded");
        self.videos = videos;
        self.view = ViewState::Videos;
      }
      Ok(None) => {
        self.alert = Some(CHANNEL_NOT_FOUND.to_string());
      }
      Err(e) => {
        warn!(err = %format!("{:#}", e), "channel video listing failed");
        self.alert = Some(VIDEOS_FAILED.to_string());
      }
    }
  }

  /// Return to the channel grid, keeping the search results.
  pub fn back(&mut self) {
    self.view = ViewState::Channels;
  }

  /// Back to the initial screen. Settings visibility is kept.
  pub fn reset(&mut self) {
    *self = Self { show_settings: self.show_settings, ..Self::default() };
  }

  pub fn dismiss_alert(&mut self) {
    self.alert = None;
  }

  pub fn mark_copied(&mut self, video_id: &str, now: Instant) {
    self.copy_status = Some(CopyStatus { video_id: video_id.to_string(), copied_at: now });
  }

  /// Clear the copy feedback once its display window has passed.
  pub fn expire_copy_status(&mut self, now: Instant) {
    let window = Duration::from_millis(constants().copy_feedback_ms);
    if self.copy_status.as_ref().is_some_and(|s| now.saturating_duration_since(s.copied_at) >= window) {
      self.copy_status = None;
    }
  }

  pub fn is_copied(&self, video_id: &str) -> bool {
    self.copy_status.as_ref().is_some_and(|s| s.video_id == video_id)
  }

  pub fn screen(&self) -> Screen<'_> {
    if self.loading {
      return Screen::Loading;
    }
    match (self.view, &self.selected_channel) {
      (ViewState::Videos, Some(channel)) => Screen::Videos { channel, videos: &self.videos },
      _ if !self.channels.is_empty() => Screen::Channels(&self.channels),
      _ if self.searched => Screen::NoResults,
      _ => Screen::Welcome,
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::handoff::testing::FakeDesktop;
  use crate::handoff::transcript_handoff;
  use crate::youtube::testing::{MockApi, channel, video};
  use crate::youtube::{ChannelApi, list_channel_videos};

  /// Drive a full search the way the app does: begin, request, finish.
  async fn search(explorer: &mut Explorer, api: &MockApi, has_key: bool) {
    if let Some(query) = explorer.begin_search(has_key) {
      let result = api.search_channels("key", &query).await;
      explorer.finish_search(result);
    }
  }

  async fn open_channel(explorer: &mut Explorer, api: &MockApi, index: usize) {
    if let Some(id) = explorer.begin_channel(index) {
      let result = list_channel_videos(api, "key", &id).await;
      explorer.finish_channel(result);
    }
  }

  fn with_query(query: &str) -> Explorer {
    Explorer { query: query.to_string(), ..Default::default() }
  }

  #[tokio::test]
  async fn search_renders_channel_cards() {
    let api = MockApi { channels: vec![channel("UC1", "One"), channel("UC2", "Two")], ..Default::default() };
    let mut explorer = with_query("test");
    search(&mut explorer, &api, true).await;

    assert_eq!(api.calls(), vec!["search:test"]);
    assert_eq!(explorer.channels, api.channels);
    assert_eq!(explorer.view, ViewState::Channels);
    assert!(!explorer.loading);
    match explorer.screen() {
      Screen::Channels(cards) => assert_eq!(cards.len(), 2),
      other => panic!("expected channel grid, got {:?}", other),
    }
  }

  #[tokio::test]
  async fn blank_query_issues_no_request() {
    for query in ["", "   ", "\t\n"] {
      let api = MockApi::default();
      let mut explorer = with_query(query);
      explorer.channels = vec![channel("UC9", "Kept")];
      search(&mut explorer, &api, true).await;

      assert!(api.calls().is_empty());
      assert_eq!(explorer.channels, vec![channel("UC9", "Kept")]);
      assert!(!explorer.loading);
      assert!(!explorer.show_settings);
    }
  }

  #[tokio::test]
  async fn missing_credential_opens_settings_instead() {
    let api = MockApi::default();
    let mut explorer = with_query("music");
    search(&mut explorer, &api, false).await;

    assert!(api.calls().is_empty());
    assert!(explorer.show_settings);
    assert!(!explorer.loading);
  }

  #[tokio::test]
  async fn search_query_is_trimmed() {
    let api = MockApi::default();
    let mut explorer = with_query("  lofi girl \n");
    search(&mut explorer, &api, true).await;
    assert_eq!(api.calls(), vec!["search:lofi girl"]);
  }

  #[tokio::test]
  async fn empty_search_shows_no_results_message() {
    let api = MockApi::default();
    let mut explorer = with_query("zzzz");
    assert_eq!(explorer.screen(), Screen::Welcome);
    search(&mut explorer, &api, true).await;
    assert_eq!(explorer.screen(), Screen::NoResults);
  }

  #[tokio::test]
  async fn search_failure_alerts_and_clears_loading() {
    let api = MockApi { fail_search: true, ..Default::default() };
    let mut explorer = with_query("music");
    explorer.channels = vec![channel("UC9", "Old")];
    search(&mut explorer, &api, true).await;

    assert_eq!(explorer.alert.as_deref(), Some(SEARCH_FAILED));
    assert!(!explorer.loading);
    assert!(explorer.channels.is_empty());
    assert_eq!(explorer.screen(), Screen::NoResults);
  }

  #[test]
  fn search_while_in_video_view_returns_to_channels() {
    let mut explorer = with_query("new");
    explorer.selected_channel = Some(channel("UC1", "One"));
    explorer.videos = vec![video("V1", "v")];
    explorer.view = ViewState::Videos;

    assert_eq!(explorer.begin_search(true).as_deref(), Some("new"));
    assert_eq!(explorer.view, ViewState::Channels);
    assert_eq!(explorer.selected_channel, None);
    assert!(explorer.videos.is_empty());
    assert_eq!(explorer.screen(), Screen::Loading);
  }

  #[tokio::test]
  async fn selecting_channel_lists_its_uploads() {
    let api = MockApi {
      channels: vec![channel("C1", "Chan")],
      uploads: Some("U1".to_string()),
      videos: vec![video("V1", "a"), video("V2", "b"), video("V3", "c")],
      ..Default::default()
    };
    let mut explorer = with_query("chan");
    search(&mut explorer, &api, true).await;
    open_channel(&mut explorer, &api, 0).await;

    assert_eq!(api.calls(), vec!["search:chan", "channels:C1", "playlistItems:U1"]);
    assert_eq!(explorer.view, ViewState::Videos);
    assert!(!explorer.loading);
    match explorer.screen() {
      Screen::Videos { channel, videos } => {
        assert_eq!(channel.id, "C1");
        assert_eq!(videos.len(), 3);
      }
      other => panic!("expected video grid, got {:?}", other),
    }
  }

  #[tokio::test]
  async fn unknown_channel_alerts_and_stays_on_channels() {
    let api = MockApi { channels: vec![channel("C1", "Chan")], ..Default::default() };
    let mut explorer = with_query("chan");
    search(&mut explorer, &api, true).await;
    open_channel(&mut explorer, &api, 0).await;

    assert_eq!(api.calls(), vec!["search:chan", "channels:C1"]);
    assert_eq!(explorer.alert.as_deref(), Some(CHANNEL_NOT_FOUND));
    assert_eq!(explorer.view, ViewState::Channels);
    assert!(explorer.videos.is_empty());
    assert!(!explorer.loading);
  }

  #[tokio::test]
  async fn listing_failure_alerts_and_discards_videos() {
    let api = MockApi {
      channels: vec![channel("C1", "Chan")],
      uploads: Some("U1".to_string()),
      videos: vec![video("V1", "a")],
      fail_playlist: true,
      ..Default::default()
    };
    let mut explorer = with_query("chan");
    search(&mut explorer, &api, true).await;
    open_channel(&mut explorer, &api, 0).await;

    assert_eq!(explorer.alert.as_deref(), Some(VIDEOS_FAILED));
    assert_eq!(explorer.view, ViewState::Channels);
    assert!(explorer.videos.is_empty());
    assert!(!explorer.loading);
  }

  #[test]
  fn begin_channel_out_of_range_is_noop() {
    let mut explorer = Explorer::default();
    assert_eq!(explorer.begin_channel(3), None);
    assert!(!explorer.loading);
  }

  #[test]
  fn back_keeps_channel_results() {
    let mut explorer = Explorer {
      channels: vec![channel("C1", "Chan")],
      selected_channel: Some(channel("C1", "Chan")),
      view: ViewState::Videos,
      ..Default::default()
    };
    explorer.back();
    assert_eq!(explorer.view, ViewState::Channels);
    assert_eq!(explorer.channels.len(), 1);
  }

  #[test]
  fn video_view_requires_selected_channel() {
    let explorer = Explorer { view: ViewState::Videos, searched: true, ..Default::default() };
    assert_eq!(explorer.screen(), Screen::NoResults);
  }

  #[tokio::test]
  async fn transcript_handoff_marks_copied_for_two_seconds() {
    let desktop = FakeDesktop::with_clipboard();
    let mut explorer = Explorer::default();
    let start = Instant::now();

    let outcome = transcript_handoff(&desktop, "V1").await;
    if outcome.copied {
      explorer.mark_copied("V1", start);
    }
    assert!(explorer.is_copied("V1"));
    assert!(!explorer.is_copied("V2"));
    assert_eq!(desktop.opened().len(), 1);

    explorer.expire_copy_status(start + Duration::from_millis(1999));
    assert!(explorer.is_copied("V1"));
    explorer.expire_copy_status(start + Duration::from_secs(2));
    assert_eq!(explorer.copy_status, None);
  }

  #[test]
  fn reset_returns_to_welcome() {
    let mut explorer = Explorer {
      query: "q".to_string(),
      channels: vec![channel("C1", "Chan")],
      searched: true,
      show_settings: true,
      ..Default::default()
    };
    explorer.reset();
    assert_eq!(explorer.screen(), Screen::Welcome);
    assert!(explorer.query.is_empty());
    assert!(explorer.show_settings);
  }
}
