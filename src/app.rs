use anyhow::{Result, anyhow};
use image::DynamicImage;
use reqwest::Client;
use std::time::{Duration, Instant};
use tokio::sync::oneshot;
use tracing::{debug, info};

use crate::config::{KeyValueStore, PrefsStore, load_api_key, persist_api_key};
use crate::constants::constants;
use crate::display::DisplayMode;
use crate::explorer::{Explorer, ViewState};
use crate::handoff::{SystemDesktop, open_video, transcript_handoff};
use crate::theme::{THEMES, Theme, theme_index};
use crate::youtube::{ChannelApi, ChannelSummary, VideoSummary, YoutubeClient, fetch_thumbnail, list_channel_videos};

// --- Types ---

pub type SearchResult = Vec<ChannelSummary>;
pub type ChannelResult = Option<Vec<VideoSummary>>;

/// Which widget receives key presses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
  Search,
  Settings,
  Results,
}

/// Thumbnail of the selected card, and its last resize for the preview pane.
#[derive(Default)]
pub struct GraphicsCache {
  pub preview: Option<(String, DynamicImage)>,
  pub resized: Option<(String, u16, u16, DynamicImage)>,
  /// Last thumbnail URL whose fetch failed; not retried while it stays selected.
  pub failed: Option<String>,
}

/// In-flight async task receivers.
#[derive(Default)]
pub(crate) struct AsyncTasks {
  pub(crate) search_rx: Option<oneshot::Receiver<Result<SearchResult>>>,
  pub(crate) channel_rx: Option<oneshot::Receiver<Result<ChannelResult>>>,
  pub(crate) preview_rx: Option<(String, oneshot::Receiver<Result<DynamicImage>>)>,
}

pub struct App {
  pub explorer: Explorer,
  pub focus: Focus,
  pub cursor_position: usize,
  pub input_scroll: usize,
  pub api_key: String,
  pub key_cursor: usize,
  pub key_scroll: usize,
  pub channel_cursor: usize,
  pub video_cursor: usize,
  /// Columns in the card grid as last laid out; drives up/down navigation.
  pub grid_columns: usize,
  /// First visible grid row.
  pub grid_scroll: usize,
  pub theme_index: usize,
  pub display_mode: DisplayMode,
  pub last_error: Option<String>,
  pub status_message: Option<String>,
  pub should_quit: bool,
  pub gfx: GraphicsCache,
  /// App start instant, used to drive the loading spinner.
  pub started_at: Instant,
  pub(crate) tasks: AsyncTasks,
  api: YoutubeClient,
  http: Client,
  desktop: SystemDesktop,
  prefs: PrefsStore,
  /// When the last error was set, for auto-dismiss after 5 seconds.
  error_time: Option<Instant>,
}

impl App {
  pub fn new(display_mode: DisplayMode, prefs: PrefsStore, api_key_override: Option<String>) -> Self {
    let http = Client::new();
    let api_key = load_api_key(&prefs);
    let theme_index = theme_index(prefs.get(&constants().theme_entry).as_deref());

    let mut app = Self {
      explorer: Explorer::default(),
      focus: Focus::Search,
      cursor_position: 0,
      input_scroll: 0,
      key_cursor: api_key.chars().count(),
      api_key,
      key_scroll: 0,
      channel_cursor: 0,
      video_cursor: 0,
      grid_columns: 1,
      grid_scroll: 0,
      theme_index,
      display_mode,
      last_error: None,
      status_message: None,
      should_quit: false,
      gfx: GraphicsCache::default(),
      started_at: Instant::now(),
      tasks: AsyncTasks::default(),
      api: YoutubeClient::new(http.clone()),
      http,
      desktop: SystemDesktop,
      prefs,
      error_time: None,
    };
    if let Some(key) = api_key_override {
      app.key_cursor = key.chars().count();
      app.set_api_key(key);
    }
    app
  }

  pub fn theme(&self) -> &'static Theme {
    &THEMES[self.theme_index]
  }

  pub fn next_theme(&mut self) {
    self.theme_index = (self.theme_index + 1) % THEMES.len();
    if let Err(e) = self.prefs.set(&constants().theme_entry, self.theme().name) {
      self.set_error(format!("Failed to save theme: {:#}", e));
    }
  }

  /// Set an error message with auto-dismiss tracking.
  pub fn set_error(&mut self, msg: String) {
    self.last_error = Some(msg);
    self.error_time = Some(Instant::now());
  }

  /// Clear the current error message and its expiry timer.
  pub fn clear_error(&mut self) {
    self.last_error = None;
    self.error_time = None;
  }

  /// Clear stale error messages after 5 seconds.
  pub fn expire_error(&mut self) {
    if let Some(t) = self.error_time
      && t.elapsed() >= Duration::from_secs(5)
    {
      self.clear_error();
    }
  }

  pub fn has_api_key(&self) -> bool {
    !self.api_key.is_empty()
  }

  /// Replace the in-memory key and mirror it to the preferences file.
  pub fn set_api_key(&mut self, key: String) {
    self.api_key = key;
    if let Err(e) = persist_api_key(&mut self.prefs, &self.api_key) {
      self.set_error(format!("{:#}", e));
    }
  }

  pub fn toggle_settings(&mut self) {
    self.explorer.show_settings = !self.explorer.show_settings;
    self.focus = if self.explorer.show_settings { Focus::Settings } else { Focus::Search };
  }

  pub fn close_settings(&mut self) {
    self.explorer.show_settings = false;
    self.focus = Focus::Search;
  }

  /// Per-tick housekeeping: expire transient feedback and keep the preview current.
  pub fn tick(&mut self, now: Instant) {
    self.explorer.expire_copy_status(now);
    self.expire_error();
    self.trigger_preview();
  }

  pub fn check_pending(&mut self) {
    if let Some(mut rx) = self.tasks.search_rx.take() {
      match rx.try_recv() {
        Ok(result) => {
          self.status_message = None;
          self.explorer.finish_search(result);
          if !self.explorer.channels.is_empty() {
            self.focus = Focus::Results;
          }
        }
        Err(oneshot::error::TryRecvError::Empty) => {
          self.tasks.search_rx = Some(rx);
        }
        Err(oneshot::error::TryRecvError::Closed) => {
          self.status_message = None;
          self.explorer.finish_search(Err(anyhow!("search task ended without a result")));
        }
      }
    }

    if let Some(mut rx) = self.tasks.channel_rx.take() {
      match rx.try_recv() {
        Ok(result) => {
          self.status_message = None;
          self.explorer.finish_channel(result);
          if self.explorer.view == ViewState::Videos {
            self.video_cursor = 0;
            self.grid_scroll = 0;
            self.focus = Focus::Results;
          }
        }
        Err(oneshot::error::TryRecvError::Empty) => {
          self.tasks.channel_rx = Some(rx);
        }
        Err(oneshot::error::TryRecvError::Closed) => {
          self.status_message = None;
          self.explorer.finish_channel(Err(anyhow!("channel task ended without a result")));
        }
      }
    }

    if let Some((url, mut rx)) = self.tasks.preview_rx.take() {
      match rx.try_recv() {
        Ok(Ok(image)) => {
          self.gfx.preview = Some((url, image));
          self.gfx.resized = None;
        }
        Ok(Err(e)) => {
          // Preview is decorative; the pane just shows "No thumbnail".
          debug!(url = %url, err = %format!("{:#}", e), "thumbnail fetch failed");
          self.gfx.failed = Some(url);
        }
        Err(oneshot::error::TryRecvError::Empty) => {
          self.tasks.preview_rx = Some((url, rx));
        }
        Err(oneshot::error::TryRecvError::Closed) => {}
      }
    }
  }

  pub fn trigger_search(&mut self) {
    match self.explorer.begin_search(self.has_api_key()) {
      Some(query) => {
        info!(query = %query, "search triggered");
        // A newer search replaces any pending one; dropped receivers are ignored.
        self.tasks.search_rx = None;
        self.tasks.channel_rx = None;
        self.clear_error();
        self.status_message = Some(format!("Searching '{}'…", query));
        self.channel_cursor = 0;
        self.video_cursor = 0;
        self.grid_scroll = 0;

        let api = self.api.clone();
        let api_key = self.api_key.clone();
        let (tx, rx) = oneshot::channel();
        tokio::spawn(async move {
          let _ = tx.send(api.search_channels(&api_key, &query).await);
        });
        self.tasks.search_rx = Some(rx);
      }
      None if self.explorer.show_settings => {
        self.focus = Focus::Settings;
        self.key_cursor = self.api_key.chars().count();
      }
      None => {}
    }
  }

  /// Load the uploads of the channel under the cursor.
  pub fn trigger_channel_load(&mut self) {
    if self.explorer.loading {
      return;
    }
    let Some(channel_id) = self.explorer.begin_channel(self.channel_cursor) else { return };
    info!(channel_id = %channel_id, "channel selected");
    self.clear_error();
    self.status_message = Some("Loading videos…".to_string());

    let api = self.api.clone();
    let api_key = self.api_key.clone();
    let (tx, rx) = oneshot::channel();
    tokio::spawn(async move {
      let _ = tx.send(list_channel_videos(&api, &api_key, &channel_id).await);
    });
    self.tasks.channel_rx = Some(rx);
  }

  pub fn back(&mut self) {
    self.explorer.back();
    self.grid_scroll = 0;
  }

  /// Initial screen again, keeping the API key.
  pub fn reset(&mut self) {
    info!("reset");
    self.explorer.reset();
    self.tasks = AsyncTasks::default();
    self.gfx = GraphicsCache::default();
    self.cursor_position = 0;
    self.input_scroll = 0;
    self.channel_cursor = 0;
    self.video_cursor = 0;
    self.grid_scroll = 0;
    self.status_message = None;
    self.clear_error();
    self.focus = if self.explorer.show_settings { Focus::Settings } else { Focus::Search };
  }

  fn selected_video(&self) -> Option<&VideoSummary> {
    (self.explorer.view == ViewState::Videos).then(|| self.explorer.videos.get(self.video_cursor)).flatten()
  }

  pub fn open_selected_video(&mut self) {
    let Some(video) = self.selected_video() else { return };
    if let Err(e) = open_video(&self.desktop, &video.id) {
      self.set_error(format!("Failed to open browser: {:#}", e));
    }
  }

  /// Copy the selected video's URL and open the transcript tool.
  pub async fn handoff_selected_video(&mut self) {
    let Some(video_id) = self.selected_video().map(|v| v.id.clone()) else { return };
    let outcome = transcript_handoff(&self.desktop, &video_id).await;
    if outcome.copied {
      self.explorer.mark_copied(&video_id, Instant::now());
    }
    if let Some(e) = outcome.open_error {
      self.set_error(format!("Failed to open transcript tool: {:#}", e));
    }
  }

  /// Number of cards in the grid currently on screen.
  pub fn card_count(&self) -> usize {
    match self.explorer.view {
      ViewState::Channels => self.explorer.channels.len(),
      ViewState::Videos => self.explorer.videos.len(),
    }
  }

  fn cursor_mut(&mut self) -> &mut usize {
    match self.explorer.view {
      ViewState::Channels => &mut self.channel_cursor,
      ViewState::Videos => &mut self.video_cursor,
    }
  }

  pub fn cursor(&self) -> usize {
    match self.explorer.view {
      ViewState::Channels => self.channel_cursor,
      ViewState::Videos => self.video_cursor,
    }
  }

  /// Move the grid cursor by whole columns (`dx`) or rows (`dy`), clamped to the cards.
  pub fn move_cursor(&mut self, dx: isize, dy: isize) {
    let count = self.card_count();
    if count == 0 {
      return;
    }
    let step = dx + dy * self.grid_columns.max(1) as isize;
    let cursor = self.cursor_mut();
    *cursor = cursor.saturating_add_signed(step).min(count - 1);
  }

  pub fn selected_thumbnail_url(&self) -> Option<&str> {
    match self.explorer.view {
      ViewState::Channels => self.explorer.channels.get(self.channel_cursor)?.thumbnail_url.as_deref(),
      ViewState::Videos => self.selected_video()?.thumbnail_url.as_deref(),
    }
  }

  /// Fetch the selected card's thumbnail unless it is shown or already on its way.
  fn trigger_preview(&mut self) {
    if self.explorer.loading {
      return;
    }
    let Some(url) = self.selected_thumbnail_url() else { return };
    let shown = self.gfx.preview.as_ref().is_some_and(|(u, _)| u == url);
    let pending = self.tasks.preview_rx.as_ref().is_some_and(|(u, _)| u == url);
    let failed = self.gfx.failed.as_deref() == Some(url);
    if shown || pending || failed {
      return;
    }
    let url = url.to_string();
    self.gfx.failed = None;
    let client = self.http.clone();
    let fetch_url = url.clone();
    let (tx, rx) = oneshot::channel();
    tokio::spawn(async move {
      let _ = tx.send(fetch_thumbnail(&client, &fetch_url).await);
    });
    self.tasks.preview_rx = Some((url, rx));
  }
}
