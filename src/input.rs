use ratatui::crossterm::event::{self, KeyCode, KeyModifiers};

use crate::app::{App, Focus};
use crate::explorer::ViewState;

// --- Helpers ---

/// Convert a char index to a byte offset within the string.
pub fn char_to_byte_index(s: &str, char_idx: usize) -> usize {
  s.char_indices().nth(char_idx).map_or(s.len(), |(i, _)| i)
}

/// Apply a line-editing key to `text`. Returns whether the text changed.
fn edit_line(text: &mut String, cursor: &mut usize, code: KeyCode) -> bool {
  match code {
    KeyCode::Char(c) => {
      let byte_idx = char_to_byte_index(text, *cursor);
      text.insert(byte_idx, c);
      *cursor += 1;
      true
    }
    KeyCode::Backspace if *cursor > 0 => {
      *cursor -= 1;
      let byte_idx = char_to_byte_index(text, *cursor);
      text.remove(byte_idx);
      true
    }
    KeyCode::Delete if *cursor < text.chars().count() => {
      let byte_idx = char_to_byte_index(text, *cursor);
      text.remove(byte_idx);
      true
    }
    KeyCode::Left => {
      *cursor = cursor.saturating_sub(1);
      false
    }
    KeyCode::Right => {
      *cursor = (*cursor + 1).min(text.chars().count());
      false
    }
    KeyCode::Home => {
      *cursor = 0;
      false
    }
    KeyCode::End => {
      *cursor = text.chars().count();
      false
    }
    _ => false,
  }
}

// --- Event Handling ---

pub async fn handle_key_event(app: &mut App, key: event::KeyEvent) {
  let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

  if ctrl && key.code == KeyCode::Char('c') {
    app.should_quit = true;
    return;
  }

  // The alert is modal: nothing else happens until it is dismissed.
  if app.explorer.alert.is_some() {
    if matches!(key.code, KeyCode::Enter | KeyCode::Esc | KeyCode::Char(' ')) {
      app.explorer.dismiss_alert();
    }
    return;
  }

  if ctrl {
    match key.code {
      KeyCode::Char('t') => app.next_theme(),
      KeyCode::Char('k') => app.toggle_settings(),
      KeyCode::Char('r') => app.reset(),
      _ => {}
    }
    return;
  }

  match app.focus {
    Focus::Search => handle_search_key(app, key.code),
    Focus::Settings => handle_settings_key(app, key.code),
    Focus::Results => handle_results_key(app, key.code).await,
  }
}

fn handle_search_key(app: &mut App, code: KeyCode) {
  app.clear_error();
  match code {
    KeyCode::Enter => app.trigger_search(),
    KeyCode::Esc => {
      if !app.explorer.query.is_empty() {
        app.explorer.query.clear();
        app.cursor_position = 0;
        app.input_scroll = 0;
      } else if app.card_count() > 0 {
        app.focus = Focus::Results;
      } else {
        app.should_quit = true;
      }
    }
    KeyCode::Down | KeyCode::Tab => {
      if app.card_count() > 0 || app.explorer.view == ViewState::Videos {
        app.focus = Focus::Results;
      }
    }
    code => {
      edit_line(&mut app.explorer.query, &mut app.cursor_position, code);
    }
  }
}

fn handle_settings_key(app: &mut App, code: KeyCode) {
  match code {
    KeyCode::Enter | KeyCode::Esc | KeyCode::Tab => app.close_settings(),
    code => {
      let mut key = app.api_key.clone();
      if edit_line(&mut key, &mut app.key_cursor, code) {
        app.set_api_key(key);
      }
    }
  }
}

async fn handle_results_key(app: &mut App, code: KeyCode) {
  match code {
    KeyCode::Tab | KeyCode::Char('/') => {
      app.focus = Focus::Search;
      return;
    }
    KeyCode::Esc | KeyCode::Backspace => {
      if app.explorer.view == ViewState::Videos {
        app.back();
      } else {
        app.focus = Focus::Search;
      }
      return;
    }
    _ => {}
  }

  if app.explorer.loading {
    return;
  }

  match code {
    KeyCode::Left | KeyCode::Char('h') => app.move_cursor(-1, 0),
    KeyCode::Right | KeyCode::Char('l') => app.move_cursor(1, 0),
    KeyCode::Up | KeyCode::Char('k') => app.move_cursor(0, -1),
    KeyCode::Down | KeyCode::Char('j') => app.move_cursor(0, 1),
    KeyCode::Enter => match app.explorer.view {
      ViewState::Channels => app.trigger_channel_load(),
      ViewState::Videos => app.open_selected_video(),
    },
    KeyCode::Char('o') => app.open_selected_video(),
    KeyCode::Char('t') => app.handoff_selected_video().await,
    _ => {}
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::config::PrefsStore;
  use crate::display::DisplayMode;
  use crate::explorer::CHANNEL_NOT_FOUND;
  use crate::youtube::testing::{channel, video};
  use ratatui::crossterm::event::KeyEvent;

  fn app() -> App {
    App::new(DisplayMode::Ascii, PrefsStore::default(), None)
  }

  fn press(code: KeyCode) -> KeyEvent {
    KeyEvent::new(code, KeyModifiers::NONE)
  }

  fn ctrl(c: char) -> KeyEvent {
    KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL)
  }

  // --- char_to_byte_index ---

  #[test]
  fn char_to_byte_ascii() {
    assert_eq!(char_to_byte_index("hello", 0), 0);
    assert_eq!(char_to_byte_index("hello", 3), 3);
    assert_eq!(char_to_byte_index("hello", 5), 5); // past end
  }

  #[test]
  fn char_to_byte_multibyte() {
    let s = "a채널"; // a=1 byte, 채=3 bytes, 널=3 bytes
    assert_eq!(char_to_byte_index(s, 1), 1);
    assert_eq!(char_to_byte_index(s, 2), 4);
    assert_eq!(char_to_byte_index(s, 3), 7); // past end
  }

  // --- edit_line ---

  #[test]
  fn edit_line_inserts_and_deletes_at_cursor() {
    let mut text = String::from("ac");
    let mut cursor = 1;
    assert!(edit_line(&mut text, &mut cursor, KeyCode::Char('b')));
    assert_eq!((text.as_str(), cursor), ("abc", 2));
    assert!(edit_line(&mut text, &mut cursor, KeyCode::Backspace));
    assert_eq!((text.as_str(), cursor), ("ac", 1));
    assert!(edit_line(&mut text, &mut cursor, KeyCode::Delete));
    assert_eq!((text.as_str(), cursor), ("a", 1));
    assert!(!edit_line(&mut text, &mut cursor, KeyCode::Delete));
    assert!(!edit_line(&mut text, &mut cursor, KeyCode::Right));
    assert_eq!(cursor, 1);
  }

  #[test]
  fn backspace_at_start_changes_nothing() {
    let mut text = String::from("x");
    let mut cursor = 0;
    assert!(!edit_line(&mut text, &mut cursor, KeyCode::Backspace));
    assert_eq!(text, "x");
  }

  // --- key routing ---

  #[tokio::test]
  async fn typing_into_settings_updates_key() {
    let mut app = app();
    handle_key_event(&mut app, ctrl('k')).await;
    assert_eq!(app.focus, Focus::Settings);
    for c in "AIz".chars() {
      handle_key_event(&mut app, press(KeyCode::Char(c))).await;
    }
    assert_eq!(app.api_key, "AIz");
    handle_key_event(&mut app, press(KeyCode::Enter)).await;
    assert_eq!(app.focus, Focus::Search);
    assert!(!app.explorer.show_settings);
  }

  #[tokio::test]
  async fn alert_blocks_input_until_dismissed() {
    let mut app = app();
    app.explorer.alert = Some(CHANNEL_NOT_FOUND.to_string());
    handle_key_event(&mut app, press(KeyCode::Char('x'))).await;
    assert!(app.explorer.query.is_empty());
    handle_key_event(&mut app, press(KeyCode::Enter)).await;
    assert!(app.explorer.alert.is_none());
    handle_key_event(&mut app, press(KeyCode::Char('x'))).await;
    assert_eq!(app.explorer.query, "x");
  }

  #[tokio::test]
  async fn escape_in_video_view_goes_back() {
    let mut app = app();
    app.explorer.channels = vec![channel("C1", "a")];
    app.explorer.selected_channel = Some(channel("C1", "a"));
    app.explorer.videos = vec![video("V1", "v")];
    app.explorer.view = ViewState::Videos;
    app.focus = Focus::Results;

    handle_key_event(&mut app, press(KeyCode::Esc)).await;
    assert_eq!(app.explorer.view, ViewState::Channels);
    assert_eq!(app.focus, Focus::Results);
    assert_eq!(app.explorer.channels.len(), 1);
  }

  #[tokio::test]
  async fn grid_keys_ignored_while_loading() {
    let mut app = app();
    app.explorer.channels = vec![channel("C1", "a"), channel("C2", "b")];
    app.explorer.loading = true;
    app.focus = Focus::Results;
    handle_key_event(&mut app, press(KeyCode::Right)).await;
    assert_eq!(app.channel_cursor, 0);
  }

  #[tokio::test]
  async fn escape_on_empty_search_quits() {
    let mut app = app();
    handle_key_event(&mut app, press(KeyCode::Esc)).await;
    assert!(app.should_quit);
  }
}
