use anyhow::{Context, Result, anyhow};
use image::DynamicImage;
use reqwest::{Client, Url};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::future::Future;
use tracing::{debug, info};

use crate::constants::constants;

/// A channel returned by the channel search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelSummary {
  pub id: String,
  /// HTML-escaped as delivered by the API.
  pub title: String,
  pub thumbnail_url: Option<String>,
}

/// A video from a channel's uploads playlist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoSummary {
  pub id: String,
  /// HTML-escaped as delivered by the API.
  pub title: String,
  pub thumbnail_url: Option<String>,
  /// RFC 3339 timestamp of when the item was added to the playlist.
  pub published_at: Option<String>,
}

impl VideoSummary {
  /// Publication date as `YYYY-MM-DD`, if the timestamp parses.
  pub fn published_date(&self) -> Option<String> {
    let raw = self.published_at.as_deref()?;
    chrono::DateTime::parse_from_rfc3339(raw).ok().map(|dt| dt.format("%Y-%m-%d").to_string())
  }
}

/// Canonical watch-page URL for a video.
pub fn watch_url(video_id: &str) -> String {
  format!("{}{}", constants().watch_url_prefix, video_id)
}

// --- Wire types ---

#[derive(Debug, Deserialize)]
struct ListResponse<T> {
  #[serde(default = "Vec::new")]
  items: Vec<T>,
}

#[derive(Debug, Default, Deserialize)]
struct Thumbnail {
  url: String,
}

#[derive(Debug, Default, Deserialize)]
struct Thumbnails {
  default: Option<Thumbnail>,
  medium: Option<Thumbnail>,
}

impl Thumbnails {
  fn into_url(self) -> Option<String> {
    self.medium.or(self.default).map(|t| t.url)
  }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchId {
  channel_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SearchSnippet {
  title: String,
  #[serde(default)]
  thumbnails: Thumbnails,
}

#[derive(Debug, Deserialize)]
struct SearchItem {
  id: SearchId,
  snippet: SearchSnippet,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RelatedPlaylists {
  uploads: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ContentDetails {
  related_playlists: RelatedPlaylists,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChannelItem {
  content_details: ContentDetails,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResourceId {
  video_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PlaylistSnippet {
  title: String,
  resource_id: ResourceId,
  published_at: Option<String>,
  #[serde(default)]
  thumbnails: Thumbnails,
}

#[derive(Debug, Deserialize)]
struct PlaylistItem {
  snippet: PlaylistSnippet,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
  message: String,
}

#[derive(Debug, Deserialize)]
struct ApiErrorEnvelope {
  error: ApiErrorBody,
}

fn channels_from(response: ListResponse<SearchItem>) -> Vec<ChannelSummary> {
  response
    .items
    .into_iter()
    .filter_map(|item| {
      let id = item.id.channel_id?;
      Some(ChannelSummary { id, title: item.snippet.title, thumbnail_url: item.snippet.thumbnails.into_url() })
    })
    .collect()
}

fn uploads_from(response: ListResponse<ChannelItem>) -> Option<String> {
  response.items.into_iter().next()?.content_details.related_playlists.uploads.filter(|id| !id.is_empty())
}

fn videos_from(response: ListResponse<PlaylistItem>) -> Vec<VideoSummary> {
  response
    .items
    .into_iter()
    .map(|item| {
      let s = item.snippet;
      VideoSummary {
        id: s.resource_id.video_id,
        title: s.title,
        thumbnail_url: s.thumbnails.into_url(),
        published_at: s.published_at,
      }
    })
    .collect()
}

// --- API seam ---

/// The three read-only lookups the explorer performs against the video platform.
pub trait ChannelApi {
  /// Channel search, up to `channel_search_size` results.
  fn search_channels(&self, api_key: &str, query: &str) -> impl Future<Output = Result<Vec<ChannelSummary>>> + Send;

  /// Resolve a channel's uploads playlist id. `None` when the channel is unknown.
  fn uploads_playlist_id(&self, api_key: &str, channel_id: &str) -> impl Future<Output = Result<Option<String>>> + Send;

  /// First page (up to `uploads_page_size`) of a playlist.
  fn playlist_videos(&self, api_key: &str, playlist_id: &str) -> impl Future<Output = Result<Vec<VideoSummary>>> + Send;
}

/// List a channel's latest uploads: channel detail, then playlist items.
///
/// Returns `Ok(None)` when the detail lookup finds no channel; the playlist
/// request is then never issued. Any failure aborts the chain.
pub async fn list_channel_videos<A: ChannelApi>(
  api: &A,
  api_key: &str,
  channel_id: &str,
) -> Result<Option<Vec<VideoSummary>>> {
  let Some(uploads_id) = api.uploads_playlist_id(api_key, channel_id).await? else {
    info!(channel_id, "channel detail lookup returned no channel");
    return Ok(None);
  };
  debug!(channel_id, uploads_id = %uploads_id, "resolved uploads playlist");
  let videos = api.playlist_videos(api_key, &uploads_id).await?;
  Ok(Some(videos))
}

/// YouTube Data API v3 client.
#[derive(Debug, Clone)]
pub struct YoutubeClient {
  http: Client,
  base_url: String,
}

impl YoutubeClient {
  pub fn new(http: Client) -> Self {
    Self::with_base_url(http, constants().api_base_url.clone())
  }

  pub fn with_base_url(http: Client, base_url: String) -> Self {
    Self { http, base_url: base_url.trim_end_matches('/').to_string() }
  }

  fn endpoint_url(&self, endpoint: &str, params: &[(&str, &str)]) -> Result<Url> {
    Url::parse_with_params(&format!("{}/{}", self.base_url, endpoint), params)
      .with_context(|| format!("Invalid API URL for {}", endpoint))
  }

  async fn get_json<T: DeserializeOwned>(&self, endpoint: &str, params: &[(&str, &str)]) -> Result<T> {
    let url = self.endpoint_url(endpoint, params)?;
    debug!(endpoint, "api request");
    let response =
      self.http.get(url).send().await.with_context(|| format!("Failed to reach the YouTube API ({})", endpoint))?;

    let status = response.status();
    if !status.is_success() {
      let body = response.text().await.unwrap_or_default();
      let message = serde_json::from_str::<ApiErrorEnvelope>(&body).map(|e| e.error.message).unwrap_or(body);
      return Err(anyhow!("YouTube API {} returned {}: {}", endpoint, status, message));
    }

    response.json::<T>().await.with_context(|| format!("Failed to parse YouTube API {} response", endpoint))
  }
}

impl ChannelApi for YoutubeClient {
  async fn search_channels(&self, api_key: &str, query: &str) -> Result<Vec<ChannelSummary>> {
    let max = constants().channel_search_size.to_string();
    let params = [("part", "snippet"), ("maxResults", max.as_str()), ("q", query), ("type", "channel"), ("key", api_key)];
    let response: ListResponse<SearchItem> = self.get_json("search", &params).await?;
    Ok(channels_from(response))
  }

  async fn uploads_playlist_id(&self, api_key: &str, channel_id: &str) -> Result<Option<String>> {
    let params = [("part", "contentDetails"), ("id", channel_id), ("key", api_key)];
    let response: ListResponse<ChannelItem> = self.get_json("channels", &params).await?;
    Ok(uploads_from(response))
  }

  async fn playlist_videos(&self, api_key: &str, playlist_id: &str) -> Result<Vec<VideoSummary>> {
    let max = constants().uploads_page_size.to_string();
    let params = [("part", "snippet"), ("maxResults", max.as_str()), ("playlistId", playlist_id), ("key", api_key)];
    let response: ListResponse<PlaylistItem> = self.get_json("playlistItems", &params).await?;
    Ok(videos_from(response))
  }
}

pub async fn fetch_thumbnail(client: &Client, url: &str) -> Result<DynamicImage> {
  let response = client
    .get(url)
    .send()
    .await
    .with_context(|| format!("Failed to fetch thumbnail {}", url))?
    .error_for_status()
    .with_context(|| format!("Thumbnail request rejected: {}", url))?;
  let bytes = response.bytes().await.with_context(|| format!("Failed to read image bytes from {}", url))?;
  image::load_from_memory(&bytes).with_context(|| format!("Failed to decode image from memory (URL: {})", url))
}

#[cfg(test)]
pub(crate) mod testing {
  use super::*;
  use std::sync::Mutex;

  /// Scripted `ChannelApi` that records every call it receives.
  #[derive(Default)]
  pub(crate) struct MockApi {
    pub(crate) channels: Vec<ChannelSummary>,
    pub(crate) uploads: Option<String>,
    pub(crate) videos: Vec<VideoSummary>,
    pub(crate) fail_search: bool,
    pub(crate) fail_detail: bool,
    pub(crate) fail_playlist: bool,
    pub(crate) calls: Mutex<Vec<String>>,
  }

  impl MockApi {
    pub(crate) fn calls(&self) -> Vec<String> {
      self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: String) {
      self.calls.lock().unwrap().push(call);
    }
  }

  impl ChannelApi for MockApi {
    async fn search_channels(&self, _api_key: &str, query: &str) -> Result<Vec<ChannelSummary>> {
      self.record(format!("search:{}", query));
      if self.fail_search {
        return Err(anyhow!("connection reset"));
      }
      Ok(self.channels.clone())
    }

    async fn uploads_playlist_id(&self, _api_key: &str, channel_id: &str) -> Result<Option<String>> {
      self.record(format!("channels:{}", channel_id));
      if self.fail_detail {
        return Err(anyhow!("quota exceeded"));
      }
      Ok(self.uploads.clone())
    }

    async fn playlist_videos(&self, _api_key: &str, playlist_id: &str) -> Result<Vec<VideoSummary>> {
      self.record(format!("playlistItems:{}", playlist_id));
      if self.fail_playlist {
        return Err(anyhow!("unexpected EOF"));
      }
      Ok(self.videos.clone())
    }
  }

  pub(crate) fn channel(id: &str, title: &str) -> ChannelSummary {
    ChannelSummary {
      id: id.to_string(),
      title: title.to_string(),
      thumbnail_url: Some(format!("https://yt3.ggpht.com/{}", id)),
    }
  }

  pub(crate) fn video(id: &str, title: &str) -> VideoSummary {
    VideoSummary {
      id: id.to_string(),
      title: title.to_string(),
      thumbnail_url: Some(format!("https://i.ytimg.com/vi/{}/mqdefault.jpg", id)),
      published_at: Some("2024-03-09T17:00:05Z".to_string()),
    }
  }
}
