use image::{DynamicImage, imageops::FilterType};
use ratatui::{
  buffer::Buffer,
  layout::Rect,
  style::{Color, Style},
  widgets::Widget,
};

use crate::display::DisplayMode;

// --- Thumbnail Widget ---

/// Draws an image that was already scaled with [`fit_to_area`].
pub struct ThumbnailWidget<'a> {
  pub image: &'a DynamicImage,
  pub display_mode: DisplayMode,
}

const ASCII_RAMP: [char; 10] = [' ', '.', ':', '-', '=', '+', '*', '#', '%', '@'];

/// Scale `image` to fit `area` (in cells) keeping its aspect ratio.
///
/// Terminal cells are roughly twice as tall as wide, so ASCII mode squashes
/// the height by half while half-block mode gets two pixel rows per cell.
pub fn fit_to_area(image: &DynamicImage, area: Rect, mode: DisplayMode) -> DynamicImage {
  let max_w = u32::from(area.width).max(1);
  let max_h = match mode {
    DisplayMode::Direct => u32::from(area.height) * mode.rows_per_cell(),
    DisplayMode::Ascii => u32::from(area.height) * 2,
  }
  .max(1);
  let fitted = image.resize(max_w, max_h, FilterType::Triangle);
  match mode {
    DisplayMode::Direct => fitted,
    DisplayMode::Ascii => fitted.resize_exact(fitted.width(), fitted.height().div_ceil(2).max(1), FilterType::Triangle),
  }
}

impl Widget for ThumbnailWidget<'_> {
  fn render(self, area: Rect, buf: &mut Buffer) {
    if area.is_empty() {
      return;
    }
    match self.display_mode {
      DisplayMode::Direct => render_half_blocks(self.image, area, buf),
      DisplayMode::Ascii => render_ascii(self.image, area, buf),
    }
  }
}

/// Top-left cell that centres a `w`×`h` cell block inside `area`.
fn centred_origin(area: Rect, w: u32, h: u32) -> (u16, u16) {
  let dx = u32::from(area.width).saturating_sub(w) / 2;
  let dy = u32::from(area.height).saturating_sub(h) / 2;
  (area.x.saturating_add(dx as u16), area.y.saturating_add(dy as u16))
}

fn render_half_blocks(image: &DynamicImage, area: Rect, buf: &mut Buffer) {
  let rgb = image.to_rgb8();
  let w = rgb.width().min(u32::from(area.width));
  let rows = rgb.height().div_ceil(2).min(u32::from(area.height));
  let (x0, y0) = centred_origin(area, w, rows);

  for row in 0..rows {
    for col in 0..w {
      let upper = rgb.get_pixel(col, row * 2);
      let lower = (row * 2 + 1 < rgb.height()).then(|| rgb.get_pixel(col, row * 2 + 1));
      let style = Style::default()
        .fg(Color::Rgb(upper[0], upper[1], upper[2]))
        .bg(lower.map_or(Color::Reset, |p| Color::Rgb(p[0], p[1], p[2])));
      if let Some(cell) = buf.cell_mut((x0 + col as u16, y0 + row as u16)) {
        cell.set_char('▀').set_style(style);
      }
    }
  }
}

fn render_ascii(image: &DynamicImage, area: Rect, buf: &mut Buffer) {
  let luma = image.to_luma8();
  let w = luma.width().min(u32::from(area.width));
  let h = luma.height().min(u32::from(area.height));
  let (x0, y0) = centred_origin(area, w, h);
  let steps = (ASCII_RAMP.len() - 1) as f32;

  for y in 0..h {
    for x in 0..w {
      let level = f32::from(luma.get_pixel(x, y)[0]) / 255.0;
      let idx = ((level * steps).round() as usize).min(ASCII_RAMP.len() - 1);
      if let Some(cell) = buf.cell_mut((x0 + x as u16, y0 + y as u16)) {
        cell.set_char(ASCII_RAMP[idx]);
      }
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use image::{Rgb, RgbImage};

  fn solid(w: u32, h: u32, px: [u8; 3]) -> DynamicImage {
    DynamicImage::ImageRgb8(RgbImage::from_pixel(w, h, Rgb(px)))
  }

  #[test]
  fn fit_keeps_aspect_in_half_block_mode() {
    let img = solid(320, 180, [0, 0, 0]);
    let fitted = fit_to_area(&img, Rect::new(0, 0, 32, 20), DisplayMode::Direct);
    assert_eq!(fitted.width(), 32);
    assert_eq!(fitted.height(), 18);
  }

  #[test]
  fn fit_halves_rows_in_ascii_mode() {
    let img = solid(320, 180, [0, 0, 0]);
    let fitted = fit_to_area(&img, Rect::new(0, 0, 32, 20), DisplayMode::Ascii);
    assert_eq!(fitted.width(), 32);
    assert_eq!(fitted.height(), 9);
  }

  #[test]
  fn half_blocks_paint_colours() {
    let img = solid(4, 4, [255, 0, 0]);
    let area = Rect::new(0, 0, 4, 2);
    let mut buf = Buffer::empty(area);
    ThumbnailWidget { image: &img, display_mode: DisplayMode::Direct }.render(area, &mut buf);
    let cell = &buf[(0, 0)];
    assert_eq!(cell.symbol(), "▀");
    assert_eq!(cell.fg, Color::Rgb(255, 0, 0));
    assert_eq!(cell.bg, Color::Rgb(255, 0, 0));
  }

  #[test]
  fn ascii_maps_white_to_densest_glyph() {
    let img = solid(2, 1, [255, 255, 255]);
    let area = Rect::new(0, 0, 2, 1);
    let mut buf = Buffer::empty(area);
    ThumbnailWidget { image: &img, display_mode: DisplayMode::Ascii }.render(area, &mut buf);
    assert_eq!(buf[(0, 0)].symbol(), "@");
  }

  #[test]
  fn empty_area_renders_nothing() {
    let img = solid(2, 2, [1, 2, 3]);
    let mut buf = Buffer::empty(Rect::new(0, 0, 0, 0));
    ThumbnailWidget { image: &img, display_mode: DisplayMode::Ascii }.render(Rect::new(0, 0, 0, 0), &mut buf);
  }
}
