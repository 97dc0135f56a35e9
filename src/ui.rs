use ratatui::{
  Frame,
  layout::{Alignment, Constraint, Flex, Layout, Rect},
  style::{Modifier, Style, Stylize},
  text::{Line, Span},
  widgets::{Block, BorderType, Clear, Padding, Paragraph, Wrap},
};
use unicode_width::UnicodeWidthChar;

use crate::app::{App, Focus};
use crate::constants::constants;
use crate::explorer::Screen;
use crate::graphics::{ThumbnailWidget, fit_to_area};
use crate::html::decode_entities;
use crate::theme::Theme;
use crate::youtube::{ChannelSummary, VideoSummary};

const SPINNER: [&str; 10] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];
const CHANNEL_CARD_HEIGHT: u16 = 4;
const VIDEO_CARD_HEIGHT: u16 = 6;

// --- Helpers ---

/// Compute the display width of the first `n` chars (accounting for double-width CJK).
fn display_width(s: &str, n: usize) -> usize {
  s.chars().take(n).map(|c| c.width().unwrap_or(0)).sum()
}

/// Truncate a string to `max_width` columns, appending "…" if truncated.
fn truncate_str(s: &str, max_width: usize) -> String {
  if display_width(s, usize::MAX) <= max_width {
    return s.to_string();
  }
  let mut out = String::new();
  let mut width = 0;
  for c in s.chars() {
    let w = c.width().unwrap_or(0);
    if width + w + 1 > max_width {
      break;
    }
    out.push(c);
    width += w;
  }
  out.push('…');
  out
}

fn rounded_block(theme: &Theme, border: ratatui::style::Color) -> Block<'static> {
  Block::bordered().border_type(BorderType::Rounded).border_style(Style::default().fg(border)).bg(theme.bg)
}

// --- UI Rendering ---

pub fn ui(frame: &mut Frame, app: &mut App) {
  let theme = app.theme();
  frame.render_widget(Block::default().style(Style::default().bg(theme.bg)), frame.area());

  let settings_height = if app.explorer.show_settings { 3 } else { 0 };
  let [header_area, input_area, settings_area, main_area, status_area, footer_area] = Layout::vertical([
    Constraint::Length(1),
    Constraint::Length(3),
    Constraint::Length(settings_height),
    Constraint::Min(3),
    Constraint::Length(1),
    Constraint::Length(1),
  ])
  .areas(frame.area());

  render_header(frame, app, header_area);
  render_search_input(frame, app, input_area);
  if app.explorer.show_settings {
    render_settings(frame, app, settings_area);
  }
  render_main(frame, app, main_area);
  render_status(frame, app, status_area);
  render_footer(frame, app, footer_area);

  if let Some(alert) = &app.explorer.alert {
    render_alert(frame, theme, alert);
  }
}

fn render_header(frame: &mut Frame, app: &App, area: Rect) {
  let theme = app.theme();
  let left = Line::from(Span::styled(" ▶ Channel Explorer ", Style::default().fg(theme.accent).add_modifier(Modifier::BOLD)));
  frame.render_widget(left, area);

  let right = if app.has_api_key() {
    Span::styled(format!("v{} ", env!("CARGO_PKG_VERSION")), Style::default().fg(theme.muted))
  } else {
    Span::styled("● no API key (^k) ", Style::default().fg(theme.error))
  };
  let width = right.width() as u16;
  let right_area = Rect { x: area.x + area.width.saturating_sub(width), width: width.min(area.width), ..area };
  frame.render_widget(Line::from(right), right_area);
}

/// Single-line text input with horizontal scrolling. `masked` hides the content.
fn render_line_input(
  frame: &mut Frame,
  app_theme: &Theme,
  area: Rect,
  title: &str,
  (text, cursor, scroll): (&str, usize, &mut usize),
  focused: bool,
  masked: bool,
) {
  let border_color = if focused { app_theme.accent } else { app_theme.border };
  let block = rounded_block(app_theme, border_color)
    .title(format!(" {} ", title))
    .title_style(Style::default().fg(border_color))
    .padding(Padding::horizontal(1));

  let shown: String = if masked { text.chars().map(|_| '•').collect() } else { text.to_string() };
  let inner_w = area.width.saturating_sub(4) as usize;
  let cursor_col = display_width(&shown, cursor);

  if cursor_col < *scroll {
    *scroll = cursor_col;
  } else if cursor_col >= *scroll + inner_w {
    *scroll = cursor_col.saturating_sub(inner_w) + 1;
  }

  let visible: String = shown
    .chars()
    .scan(0usize, |col, c| {
      let w = c.width().unwrap_or(0);
      let start = *col;
      *col += w;
      Some((start, *col, c))
    })
    .skip_while(|(_, end, _)| *end <= *scroll)
    .take_while(|(start, _, _)| *start < *scroll + inner_w)
    .map(|(_, _, c)| c)
    .collect();

  frame.render_widget(Paragraph::new(visible).style(Style::default().fg(app_theme.fg)).block(block), area);

  if focused {
    let cursor_x = area.x + 2 + cursor_col.saturating_sub(*scroll) as u16;
    frame.set_cursor_position((cursor_x, area.y + 1));
  }
}

fn render_search_input(frame: &mut Frame, app: &mut App, area: Rect) {
  let theme = app.theme();
  let focused = app.focus == Focus::Search && app.explorer.alert.is_none();
  render_line_input(
    frame,
    theme,
    area,
    "Search channels",
    (app.explorer.query.as_str(), app.cursor_position, &mut app.input_scroll),
    focused,
    false,
  );
}

fn render_settings(frame: &mut Frame, app: &mut App, area: Rect) {
  let theme = app.theme();
  let focused = app.focus == Focus::Settings && app.explorer.alert.is_none();
  render_line_input(
    frame,
    theme,
    area,
    "YouTube API key (Enter to save)",
    (app.api_key.as_str(), app.key_cursor, &mut app.key_scroll),
    focused,
    true,
  );
}

fn render_main(frame: &mut Frame, app: &mut App, area: Rect) {
  let theme = app.theme();
  let focused = app.focus == Focus::Results;
  match app.explorer.screen() {
    Screen::Loading => render_loading(frame, app, area),
    Screen::Welcome => render_message(frame, theme, area, "Search for a channel name."),
    Screen::NoResults => render_message(frame, theme, area, "No channels found."),
    Screen::Channels(channels) => {
      let cards: Vec<Vec<Line>> = channels.iter().map(|c| channel_card(theme, c)).collect();
      let title = channels.get(app.channel_cursor).map(|c| c.title.clone());
      let (grid_area, preview_area) = split_preview(area);
      let grid = render_grid(frame, app, grid_area, &cards, constants().channel_card_width, CHANNEL_CARD_HEIGHT, focused);
      app.grid_columns = grid;
      if let Some(preview_area) = preview_area {
        render_preview(frame, app, preview_area, title.as_deref(), None);
      }
    }
    Screen::Videos { channel, videos } => {
      let [title_area, body_area] = Layout::vertical([Constraint::Length(2), Constraint::Min(3)]).areas(area);
      render_channel_title(frame, theme, title_area, channel);
      let cards: Vec<Vec<Line>> =
        videos.iter().map(|v| video_card(theme, v, app.explorer.is_copied(&v.id))).collect();
      let selected = videos.get(app.video_cursor).map(|v| (v.title.clone(), v.published_date()));
      let (grid_area, preview_area) = split_preview(body_area);
      if cards.is_empty() {
        render_message(frame, theme, grid_area, "This channel has no public uploads.");
      } else {
        let grid = render_grid(frame, app, grid_area, &cards, constants().video_card_width, VIDEO_CARD_HEIGHT, focused);
        app.grid_columns = grid;
      }
      if let Some(preview_area) = preview_area {
        let (title, date) = selected.unzip();
        render_preview(frame, app, preview_area, title.as_deref(), date.flatten().as_deref());
      }
    }
  }
}

fn render_loading(frame: &mut Frame, app: &App, area: Rect) {
  let theme = app.theme();
  let tick = (app.started_at.elapsed().as_millis() / 100) as usize % SPINNER.len();
  let text = vec![
    Line::from(""),
    Line::from(Span::styled(SPINNER[tick], Style::default().fg(theme.accent).add_modifier(Modifier::BOLD))),
  ];
  let [centre] = Layout::vertical([Constraint::Length(3)]).flex(Flex::Center).areas(area);
  frame.render_widget(Paragraph::new(text).alignment(Alignment::Center), centre);
}

fn render_message(frame: &mut Frame, theme: &Theme, area: Rect, message: &str) {
  let text = vec![
    Line::from(""),
    Line::from(Span::styled("◉", Style::default().fg(theme.border))),
    Line::from(""),
    Line::from(Span::styled(message.to_string(), Style::default().fg(theme.muted))),
  ];
  let [centre] = Layout::vertical([Constraint::Length(5)]).flex(Flex::Center).areas(area);
  frame.render_widget(Paragraph::new(text).alignment(Alignment::Center), centre);
}

fn render_channel_title(frame: &mut Frame, theme: &Theme, area: Rect, channel: &ChannelSummary) {
  let title = decode_entities(&channel.title);
  let lines = vec![
    Line::from(vec![
      Span::styled(" ◀ ", Style::default().fg(theme.key_fg).bg(theme.key_bg)),
      Span::raw(" "),
      Span::styled(title.into_owned(), Style::default().fg(theme.fg).add_modifier(Modifier::BOLD)),
    ]),
    Line::from(Span::styled("     Latest uploads", Style::default().fg(theme.muted))),
  ];
  frame.render_widget(Paragraph::new(lines), area);
}

/// Split off the preview pane when there is room for it.
fn split_preview(area: Rect) -> (Rect, Option<Rect>) {
  if area.width < 72 {
    return (area, None);
  }
  let pct = constants().preview_width_percent;
  let [grid, preview] =
    Layout::horizontal([Constraint::Percentage(100 - pct), Constraint::Percentage(pct)]).areas(area);
  (grid, Some(preview))
}

fn channel_card<'a>(theme: &Theme, channel: &ChannelSummary) -> Vec<Line<'a>> {
  vec![
    Line::from(Span::styled(decode_entities(&channel.title).into_owned(), Style::default().fg(theme.fg).bold())),
    Line::from(Span::styled("Select channel", Style::default().fg(theme.accent))),
  ]
}

fn video_card<'a>(theme: &Theme, video: &VideoSummary, copied: bool) -> Vec<Line<'a>> {
  let action = if copied {
    Span::styled("✓ Link copied!", Style::default().fg(theme.success).bold())
  } else {
    Span::styled("▶ Tactiq transcript [t]", Style::default().fg(theme.action))
  };
  vec![
    Line::from(Span::styled(decode_entities(&video.title).into_owned(), Style::default().fg(theme.fg).bold())),
    Line::from(Span::styled(video.published_date().unwrap_or_default(), Style::default().fg(theme.muted))),
    Line::from(action),
  ]
}

/// Lay cards out in rows, scrolled so the cursor's row is visible.
/// Returns the number of columns used.
fn render_grid(
  frame: &mut Frame,
  app: &mut App,
  area: Rect,
  cards: &[Vec<Line>],
  card_width: u16,
  card_height: u16,
  focused: bool,
) -> usize {
  let theme = app.theme();
  let columns = (area.width / card_width.max(1)).max(1) as usize;
  let visible_rows = (area.height / card_height).max(1) as usize;
  let selected = app.cursor().min(cards.len().saturating_sub(1));
  let selected_row = selected / columns;

  if selected_row < app.grid_scroll {
    app.grid_scroll = selected_row;
  } else if selected_row >= app.grid_scroll + visible_rows {
    app.grid_scroll = selected_row + 1 - visible_rows;
  }

  let col_width = area.width / columns as u16;
  for (i, card) in cards.iter().enumerate().skip(app.grid_scroll * columns).take(visible_rows * columns) {
    let row = (i / columns - app.grid_scroll) as u16;
    let col = (i % columns) as u16;
    let cell = Rect {
      x: area.x + col * col_width,
      y: area.y + row * card_height,
      width: col_width,
      height: card_height.min(area.height.saturating_sub(row * card_height)),
    };
    let is_selected = i == selected;
    let border = if is_selected && focused { theme.accent } else { theme.border };
    let mut block = rounded_block(theme, border).padding(Padding::horizontal(1));
    if is_selected {
      block = block.bg(theme.highlight_bg);
    }

    let inner_w = cell.width.saturating_sub(4) as usize;
    let mut lines = card.clone();
    if let Some(first) = card.first() {
      // The title wraps into whatever rows the other card lines leave free.
      let title: String = first.spans.iter().map(|s| s.content.as_ref()).collect();
      let style = first.spans.first().map(|s| s.style).unwrap_or_default();
      let title_rows = usize::from(card_height.saturating_sub(2)).saturating_sub(card.len() - 1).max(1);
      let rest = lines.split_off(1);
      lines = wrap_title(&title, inner_w, title_rows).into_iter().map(|t| Line::from(Span::styled(t, style))).collect();
      lines.extend(rest);
    }
    if is_selected {
      lines = lines.into_iter().map(|l| l.patch_style(Style::default().fg(theme.highlight_fg))).collect();
    }
    frame.render_widget(Paragraph::new(lines).block(block), cell);
  }
  columns
}

/// Wrap `title` into at most `rows` lines of `width` columns, ellipsising the last.
fn wrap_title(title: &str, width: usize, rows: usize) -> Vec<String> {
  let mut lines: Vec<String> = vec![String::new()];
  let mut col = 0;
  for c in title.chars() {
    let w = c.width().unwrap_or(0);
    if col + w > width && col > 0 {
      lines.push(String::new());
      col = 0;
    }
    if let Some(line) = lines.last_mut() {
      line.push(c);
    }
    col += w;
  }
  if lines.len() > rows {
    let rest: String = lines[rows - 1..].concat();
    lines.truncate(rows - 1);
    lines.push(truncate_str(&rest, width));
  }
  lines
}

fn render_preview(frame: &mut Frame, app: &mut App, area: Rect, title: Option<&str>, date: Option<&str>) {
  let theme = app.theme();
  let block = rounded_block(theme, theme.border)
    .title(Line::from(vec![
      Span::styled(" Preview ", Style::default().fg(theme.accent).add_modifier(Modifier::BOLD)),
      Span::styled(format!("[{}] ", app.display_mode.label().to_lowercase()), Style::default().fg(theme.muted)),
    ]))
    .padding(Padding::horizontal(1));
  let inner = block.inner(area);
  frame.render_widget(block, area);

  let [thumb_area, info_area] = Layout::vertical([Constraint::Percentage(60), Constraint::Min(2)]).areas(inner);

  let url = app.selected_thumbnail_url().map(str::to_string);
  match (&url, &app.gfx.preview) {
    (Some(url), Some((shown_url, image))) if url == shown_url => {
      let needs_resize = match &app.gfx.resized {
        Some((u, w, h, _)) => u != url || *w != thumb_area.width || *h != thumb_area.height,
        None => true,
      };
      if needs_resize {
        let resized = fit_to_area(image, thumb_area, app.display_mode);
        app.gfx.resized = Some((url.clone(), thumb_area.width, thumb_area.height, resized));
      }
      if let Some((_, _, _, ref resized)) = app.gfx.resized {
        frame.render_widget(ThumbnailWidget { image: resized, display_mode: app.display_mode }, thumb_area);
      }
    }
    (Some(_), _) => {
      let p = Paragraph::new(Span::styled("Loading thumbnail…", Style::default().fg(theme.muted)));
      frame.render_widget(p.alignment(Alignment::Center), thumb_area);
    }
    (None, _) => {
      let p = Paragraph::new(Span::styled("No thumbnail", Style::default().fg(theme.muted)));
      frame.render_widget(p.alignment(Alignment::Center), thumb_area);
    }
  }

  let mut lines = Vec::new();
  if let Some(title) = title {
    lines.push(Line::from(Span::styled(
      decode_entities(title).into_owned(),
      Style::default().fg(theme.fg).add_modifier(Modifier::BOLD),
    )));
  }
  if let Some(date) = date {
    lines.push(Line::from(vec![
      Span::styled("Published  ", Style::default().fg(theme.muted)),
      Span::styled(date.to_string(), Style::default().fg(theme.fg)),
    ]));
  }
  frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: true }), info_area);
}

fn render_status(frame: &mut Frame, app: &App, area: Rect) {
  let theme = app.theme();
  let (text, style) = if let Some(msg) = &app.status_message {
    (format!(" ⏳ {}", msg), Style::default().fg(theme.status))
  } else if let Some(err) = &app.last_error {
    (format!(" ⚠  {}", err), Style::default().fg(theme.error))
  } else if let Some(status) = &app.explorer.copy_status {
    (format!(" ✓ Copied watch link for {}", status.video_id), Style::default().fg(theme.success))
  } else {
    let count = app.card_count();
    let text = if count > 0 { format!(" {} of {}", app.cursor() + 1, count) } else { " Ready".to_string() };
    (text, Style::default().fg(theme.muted))
  };
  frame.render_widget(Paragraph::new(text).style(style), area);
}

fn render_footer(frame: &mut Frame, app: &App, area: Rect) {
  use crate::explorer::ViewState;

  let theme = app.theme();
  let keys: Vec<(&str, &str)> = if app.explorer.alert.is_some() {
    vec![("Enter", "Dismiss")]
  } else {
    match app.focus {
      Focus::Search => {
        let mut k = vec![("Enter", "Search"), ("^k", "API key"), ("^t", "Theme")];
        if app.card_count() > 0 {
          k.push(("Tab", "Results"));
        }
        k.push(("Esc", if app.explorer.query.is_empty() && app.card_count() == 0 { "Quit" } else { "Clear" }));
        k
      }
      Focus::Settings => vec![("Enter", "Save"), ("Esc", "Close")],
      Focus::Results => match app.explorer.view {
        ViewState::Channels => vec![("Enter", "Open channel"), ("←↑↓→", "Move"), ("Tab", "Search"), ("^r", "Reset")],
        ViewState::Videos => {
          vec![("t", "Transcript"), ("Enter", "Watch"), ("←↑↓→", "Move"), ("Esc", "Back"), ("^r", "Reset")]
        }
      },
    }
  };

  let spans: Vec<Span> = keys
    .iter()
    .enumerate()
    .flat_map(|(i, (key, action))| {
      let mut s = vec![
        Span::styled(format!(" {} ", key), Style::default().fg(theme.key_fg).bg(theme.key_bg)),
        Span::styled(format!(" {} ", action), Style::default().fg(theme.muted)),
      ];
      if i < keys.len() - 1 {
        s.push(Span::raw("  "));
      }
      s
    })
    .collect();

  frame.render_widget(Line::from(spans), area);

  let theme_label = format!("{} ", theme.name);
  let right = Line::from(Span::styled(&theme_label, Style::default().fg(theme.muted)));
  let right_area =
    Rect { x: area.x + area.width.saturating_sub(theme_label.len() as u16), width: theme_label.len() as u16, ..area };
  frame.render_widget(right, right_area);
}

fn render_alert(frame: &mut Frame, theme: &Theme, message: &str) {
  let [row] = Layout::vertical([Constraint::Length(5)]).flex(Flex::Center).areas(frame.area());
  let [area] = Layout::horizontal([Constraint::Length(44)]).flex(Flex::Center).areas(row);
  let block = rounded_block(theme, theme.error)
    .title(Span::styled(" Error ", Style::default().fg(theme.error).add_modifier(Modifier::BOLD)));
  let text = vec![
    Line::from(Span::styled(message.to_string(), Style::default().fg(theme.fg))),
    Line::from(""),
    Line::from(Span::styled("Press Enter to continue", Style::default().fg(theme.muted))),
  ];
  frame.render_widget(Clear, area);
  frame.render_widget(Paragraph::new(text).alignment(Alignment::Center).block(block), area);
}
