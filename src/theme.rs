use ratatui::style::Color;

pub struct Theme {
  pub name: &'static str,
  pub bg: Color,
  pub fg: Color,
  pub accent: Color,
  pub muted: Color,
  pub border: Color,
  pub highlight_fg: Color,
  pub highlight_bg: Color,
  pub status: Color,
  pub error: Color,
  /// "Link copied" feedback on video cards.
  pub success: Color,
  /// Default transcript action on video cards.
  pub action: Color,
  pub key_fg: Color,
  pub key_bg: Color,
}

pub const THEMES: &[Theme] = &[
  Theme {
    name: "Studio",
    bg: Color::Rgb(24, 24, 24),
    fg: Color::Rgb(241, 241, 241),
    accent: Color::Rgb(255, 51, 51),
    muted: Color::Rgb(144, 144, 144),
    border: Color::Rgb(63, 63, 63),
    highlight_fg: Color::Rgb(255, 255, 255),
    highlight_bg: Color::Rgb(120, 20, 20),
    status: Color::Rgb(255, 196, 0),
    error: Color::Rgb(255, 99, 99),
    success: Color::Rgb(110, 220, 140),
    action: Color::Rgb(178, 132, 255),
    key_fg: Color::Rgb(24, 24, 24),
    key_bg: Color::Rgb(200, 200, 200),
  },
  Theme {
    name: "Nord",
    bg: Color::Rgb(46, 52, 64),
    fg: Color::Rgb(216, 222, 233),
    accent: Color::Rgb(136, 192, 208),
    muted: Color::Rgb(129, 161, 193),
    border: Color::Rgb(76, 86, 106),
    highlight_fg: Color::Rgb(46, 52, 64),
    highlight_bg: Color::Rgb(136, 192, 208),
    status: Color::Rgb(235, 203, 139),
    error: Color::Rgb(191, 97, 106),
    success: Color::Rgb(163, 190, 140),
    action: Color::Rgb(180, 142, 173),
    key_fg: Color::Rgb(46, 52, 64),
    key_bg: Color::Rgb(216, 222, 233),
  },
  Theme {
    name: "Paper",
    bg: Color::Rgb(250, 250, 250),
    fg: Color::Rgb(17, 24, 39),
    accent: Color::Rgb(220, 38, 38),
    muted: Color::Rgb(107, 114, 128),
    border: Color::Rgb(209, 213, 219),
    highlight_fg: Color::Rgb(17, 24, 39),
    highlight_bg: Color::Rgb(254, 226, 226),
    status: Color::Rgb(180, 83, 9),
    error: Color::Rgb(185, 28, 28),
    success: Color::Rgb(21, 128, 61),
    action: Color::Rgb(124, 58, 237),
    key_fg: Color::Rgb(250, 250, 250),
    key_bg: Color::Rgb(55, 65, 81),
  },
];

/// Index of the theme called `name`, falling back to the first theme.
pub fn theme_index(name: Option<&str>) -> usize {
  name.and_then(|n| THEMES.iter().position(|t| t.name.eq_ignore_ascii_case(n))).unwrap_or(0)
}
