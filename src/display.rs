use clap::ValueEnum;

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum CliDisplayMode {
  Auto,
  Direct,
  Ascii,
}

/// How thumbnails are drawn in the preview pane.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayMode {
  /// Grayscale character ramp, works everywhere.
  Ascii,
  /// True-colour half-block cells (two pixels per cell).
  Direct,
}

impl DisplayMode {
  pub fn label(self) -> &'static str {
    match self {
      DisplayMode::Ascii => "ASCII",
      DisplayMode::Direct => "Half-block",
    }
  }

  /// Pixel rows per terminal row for this mode.
  pub fn rows_per_cell(self) -> u32 {
    match self {
      DisplayMode::Ascii => 1,
      DisplayMode::Direct => 2,
    }
  }
}

fn mode_for_colorterm(colorterm: &str) -> DisplayMode {
  match colorterm.to_lowercase().as_str() {
    "truecolor" | "24bit" => DisplayMode::Direct,
    _ => DisplayMode::Ascii,
  }
}

/// Half-blocks when `COLORTERM` advertises true colour, ASCII otherwise.
pub fn detect_display_mode() -> DisplayMode {
  mode_for_colorterm(&std::env::var("COLORTERM").unwrap_or_default())
}

pub fn resolve_display_mode(cli: CliDisplayMode) -> DisplayMode {
  match cli {
    CliDisplayMode::Auto => detect_display_mode(),
    CliDisplayMode::Direct => DisplayMode::Direct,
    CliDisplayMode::Ascii => DisplayMode::Ascii,
  }
}
