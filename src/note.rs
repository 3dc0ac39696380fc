// ============================================================================
// NOTES — journal entry entity + rendering to a shareable bitmap
// ============================================================================
//
// A note is edited in memory and rendered flat for export; the filter chain
// never applies here. Weather icons are drawn procedurally so rendering only
// depends on one text face.

use ab_glyph::FontArc;
use image::imageops::{self, FilterType};
use image::{Rgba, RgbaImage};

use crate::text;

/// Weather stamp on a note, stepped 0–4 in the editor.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Weather {
    Sunny,
    Windy,
    Cloudy,
    PartlyCloudy,
    Rainy,
}

impl Weather {
    /// Editor stepper value → variant. Out-of-range indices saturate at the
    /// last variant rather than failing.
    pub fn from_index(idx: u8) -> Self {
        match idx {
            0 => Weather::Sunny,
            1 => Weather::Windy,
            2 => Weather::Cloudy,
            3 => Weather::PartlyCloudy,
            _ => Weather::Rainy,
        }
    }

    pub fn index(&self) -> u8 {
        match self {
            Weather::Sunny => 0,
            Weather::Windy => 1,
            Weather::Cloudy => 2,
            Weather::PartlyCloudy => 3,
            Weather::Rainy => 4,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Weather::Sunny => "sunny",
            Weather::Windy => "windy",
            Weather::Cloudy => "cloudy",
            Weather::PartlyCloudy => "partly cloudy",
            Weather::Rainy => "rainy",
        }
    }
}

/// One journal entry: text plus an ordered list of attached photos.
/// Transient editing state only; notes are never persisted across sessions.
#[derive(Clone, Debug)]
pub struct Note {
    pub title: String,
    /// Display string; the caller formats the picked date.
    pub date: String,
    pub weather: Weather,
    pub content: String,
    pub font_color: Rgba<u8>,
    pub background_color: Rgba<u8>,
    pub images: Vec<RgbaImage>,
}

impl Default for Note {
    fn default() -> Self {
        Self {
            title: String::new(),
            date: String::new(),
            weather: Weather::Sunny,
            content: String::new(),
            font_color: Rgba([0, 0, 0, 255]),
            background_color: Rgba([128, 128, 128, 255]),
            images: Vec::new(),
        }
    }
}

impl Note {
    pub fn attach_image(&mut self, image: RgbaImage) {
        self.images.push(image);
    }

    /// Remove an attached photo by position; out-of-range is a no-op.
    pub fn remove_image(&mut self, index: usize) {
        if index < self.images.len() {
            self.images.remove(index);
        }
    }
}

/// Photo grid column count: one photo gets the full width, two sit side by
/// side, three or more flow in three columns.
pub fn grid_columns(image_count: usize) -> usize {
    match image_count {
        0 | 1 => 1,
        2 => 2,
        _ => 3,
    }
}

const MARGIN: u32 = 24;
const SPACING: u32 = 5;
const TITLE_SIZE: f32 = 36.0;
const DATE_SIZE: f32 = 16.0;
const CONTENT_SIZE: f32 = 20.0;
const ICON_SIZE: u32 = 30;

/// Render `note` to a flat bitmap `width` pixels wide. Height grows with the
/// content: title, date + weather icon row, body text, then the photo grid.
pub fn render_note(note: &Note, font: &FontArc, width: u32) -> RgbaImage {
    let width = width.max(2 * MARGIN + 64);
    let content_width = (width - 2 * MARGIN) as f32;

    let title_lines = text::wrap_text(font, &note.title, TITLE_SIZE, content_width);
    let content_lines = text::wrap_text(font, &note.content, CONTENT_SIZE, content_width);
    let title_lh = text::line_height(font, TITLE_SIZE);
    let date_lh = text::line_height(font, DATE_SIZE);
    let content_lh = text::line_height(font, CONTENT_SIZE);

    // Scale attached photos into grid cells up front so the total height is
    // known before allocating the canvas.
    let cols = grid_columns(note.images.len());
    let cell_w =
        ((content_width as u32).saturating_sub(SPACING * (cols as u32 - 1)) / cols as u32).max(1);
    let thumbs: Vec<RgbaImage> = note
        .images
        .iter()
        .map(|img| {
            let scale = cell_w as f32 / img.width().max(1) as f32;
            let h = ((img.height() as f32 * scale).round() as u32).max(1);
            imageops::resize(img, cell_w, h, FilterType::Triangle)
        })
        .collect();

    let mut grid_height = 0u32;
    for row in thumbs.chunks(cols) {
        let row_h = row.iter().map(|t| t.height()).max().unwrap_or(0);
        grid_height += row_h + SPACING;
    }

    let date_row_h = (date_lh.ceil() as u32).max(ICON_SIZE);
    let height = MARGIN
        + (title_lines.len() as f32 * title_lh).ceil() as u32
        + SPACING
        + date_row_h
        + SPACING
        + (content_lines.len() as f32 * content_lh).ceil() as u32
        + SPACING
        + grid_height
        + MARGIN;

    let mut canvas = RgbaImage::from_pixel(width, height, note.background_color);
    let mut cursor_y = MARGIN as f32;

    // Title, centered.
    for line in &title_lines {
        let lw = text::line_width(font, line, TITLE_SIZE);
        let x = (width as f32 - lw) / 2.0;
        text::draw_line(
            &mut canvas,
            font,
            line,
            TITLE_SIZE,
            x.max(MARGIN as f32),
            cursor_y + title_lh * 0.8,
            note.font_color,
        );
        cursor_y += title_lh;
    }
    cursor_y += SPACING as f32;

    // Date + weather icon, centered as one row.
    let date_w = text::line_width(font, &note.date, DATE_SIZE);
    let row_w = date_w + SPACING as f32 + ICON_SIZE as f32;
    let row_x = ((width as f32 - row_w) / 2.0).max(MARGIN as f32);
    text::draw_line(
        &mut canvas,
        font,
        &note.date,
        DATE_SIZE,
        row_x,
        cursor_y + date_row_h as f32 * 0.65,
        note.font_color,
    );
    draw_weather_icon(
        &mut canvas,
        note.weather,
        (row_x + date_w + SPACING as f32) as u32,
        cursor_y as u32 + (date_row_h - ICON_SIZE) / 2,
        ICON_SIZE,
        note.font_color,
    );
    cursor_y += date_row_h as f32 + SPACING as f32;

    // Body text, left-aligned.
    for line in &content_lines {
        text::draw_line(
            &mut canvas,
            font,
            line,
            CONTENT_SIZE,
            MARGIN as f32,
            cursor_y + content_lh * 0.8,
            note.font_color,
        );
        cursor_y += content_lh;
    }
    cursor_y += SPACING as f32;

    // Photo grid.
    let mut y = cursor_y as u32;
    for row in thumbs.chunks(cols) {
        let row_h = row.iter().map(|t| t.height()).max().unwrap_or(0);
        for (i, thumb) in row.iter().enumerate() {
            let x = MARGIN + i as u32 * (cell_w + SPACING);
            // Center shorter thumbnails vertically within the row.
            let dy = (row_h - thumb.height()) / 2;
            imageops::overlay(&mut canvas, thumb, x as i64, (y + dy) as i64);
        }
        y += row_h + SPACING;
    }

    canvas
}

// ============================================================================
// PROCEDURAL WEATHER ICONS
// ============================================================================

fn draw_weather_icon(
    canvas: &mut RgbaImage,
    weather: Weather,
    x: u32,
    y: u32,
    size: u32,
    color: Rgba<u8>,
) {
    let s = size as f32;
    let (ox, oy) = (x as f32, y as f32);
    match weather {
        Weather::Sunny => {
            draw_disc(canvas, ox + s / 2.0, oy + s / 2.0, s * 0.22, color);
            for i in 0..8 {
                let a = i as f32 * std::f32::consts::FRAC_PI_4;
                let (sin, cos) = a.sin_cos();
                draw_segment(
                    canvas,
                    ox + s / 2.0 + cos * s * 0.3,
                    oy + s / 2.0 + sin * s * 0.3,
                    ox + s / 2.0 + cos * s * 0.45,
                    oy + s / 2.0 + sin * s * 0.45,
                    1.2,
                    color,
                );
            }
        }
        Weather::Windy => {
            for (i, len) in [0.9f32, 0.7, 0.5].iter().enumerate() {
                let ly = oy + s * (0.3 + 0.2 * i as f32);
                draw_segment(canvas, ox + s * 0.05, ly, ox + s * 0.05 + s * len, ly, 1.4, color);
            }
        }
        Weather::Cloudy => {
            draw_cloud(canvas, ox, oy + s * 0.15, s, color);
        }
        Weather::PartlyCloudy => {
            draw_disc(canvas, ox + s * 0.3, oy + s * 0.3, s * 0.18, color);
            draw_cloud(canvas, ox + s * 0.15, oy + s * 0.3, s * 0.85, color);
        }
        Weather::Rainy => {
            draw_cloud(canvas, ox, oy, s, color);
            for i in 0..3 {
                let rx = ox + s * (0.25 + 0.25 * i as f32);
                draw_segment(canvas, rx, oy + s * 0.68, rx - s * 0.08, oy + s * 0.92, 1.2, color);
            }
        }
    }
}

/// Three overlapping discs over a flat base.
fn draw_cloud(canvas: &mut RgbaImage, x: f32, y: f32, s: f32, color: Rgba<u8>) {
    draw_disc(canvas, x + s * 0.3, y + s * 0.42, s * 0.18, color);
    draw_disc(canvas, x + s * 0.5, y + s * 0.32, s * 0.22, color);
    draw_disc(canvas, x + s * 0.68, y + s * 0.44, s * 0.16, color);
    draw_disc(canvas, x + s * 0.5, y + s * 0.5, s * 0.16, color);
}

/// Filled anti-aliased disc.
fn draw_disc(canvas: &mut RgbaImage, cx: f32, cy: f32, radius: f32, color: Rgba<u8>) {
    let x0 = (cx - radius - 1.0).floor().max(0.0) as u32;
    let y0 = (cy - radius - 1.0).floor().max(0.0) as u32;
    let x1 = ((cx + radius + 1.0).ceil() as u32).min(canvas.width());
    let y1 = ((cy + radius + 1.0).ceil() as u32).min(canvas.height());
    for y in y0..y1 {
        for x in x0..x1 {
            let dx = x as f32 + 0.5 - cx;
            let dy = y as f32 + 0.5 - cy;
            let d = (dx * dx + dy * dy).sqrt();
            let coverage = (radius - d + 0.5).clamp(0.0, 1.0);
            text::blend_pixel(canvas, x, y, color, coverage);
        }
    }
}

/// Anti-aliased line segment of the given half-thickness.
fn draw_segment(
    canvas: &mut RgbaImage,
    x0: f32,
    y0: f32,
    x1: f32,
    y1: f32,
    thickness: f32,
    color: Rgba<u8>,
) {
    let min_x = (x0.min(x1) - thickness - 1.0).floor().max(0.0) as u32;
    let min_y = (y0.min(y1) - thickness - 1.0).floor().max(0.0) as u32;
    let max_x = ((x0.max(x1) + thickness + 1.0).ceil() as u32).min(canvas.width());
    let max_y = ((y0.max(y1) + thickness + 1.0).ceil() as u32).min(canvas.height());

    let vx = x1 - x0;
    let vy = y1 - y0;
    let len_sq = (vx * vx + vy * vy).max(1e-6);

    for y in min_y..max_y {
        for x in min_x..max_x {
            let px = x as f32 + 0.5 - x0;
            let py = y as f32 + 0.5 - y0;
            let t = ((px * vx + py * vy) / len_sq).clamp(0.0, 1.0);
            let dx = px - t * vx;
            let dy = py - t * vy;
            let d = (dx * dx + dy * dy).sqrt();
            let coverage = (thickness - d + 0.5).clamp(0.0, 1.0);
            text::blend_pixel(canvas, x, y, color, coverage);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text::resolve_font;

    #[test]
    fn weather_index_round_trips() {
        for idx in 0..5u8 {
            assert_eq!(Weather::from_index(idx).index(), idx);
        }
        // Out-of-range saturates.
        assert_eq!(Weather::from_index(9), Weather::Rainy);
    }

    #[test]
    fn weather_labels_are_distinct() {
        let labels: Vec<_> = (0..5u8).map(|i| Weather::from_index(i).label()).collect();
        for (i, a) in labels.iter().enumerate() {
            for b in &labels[i + 1..] {
                assert_ne!(a, b);
            }
        }
        assert_eq!(Weather::PartlyCloudy.label(), "partly cloudy");
    }

    #[test]
    fn grid_columns_match_photo_count() {
        assert_eq!(grid_columns(0), 1);
        assert_eq!(grid_columns(1), 1);
        assert_eq!(grid_columns(2), 2);
        assert_eq!(grid_columns(3), 3);
        assert_eq!(grid_columns(7), 3);
    }

    #[test]
    fn remove_image_out_of_range_is_a_noop() {
        let mut note = Note::default();
        note.attach_image(RgbaImage::new(4, 4));
        note.remove_image(5);
        assert_eq!(note.images.len(), 1);
        note.remove_image(0);
        assert!(note.images.is_empty());
    }

    #[test]
    fn render_fills_background_and_requested_width() {
        // Needs a resolvable system font; skip on bare environments.
        let Ok(font) = resolve_font() else { return };
        let note = Note {
            title: "Morning".into(),
            date: "2021-12-05".into(),
            content: "Clear skies over the harbor.".into(),
            background_color: Rgba([200, 210, 220, 255]),
            ..Note::default()
        };
        let out = render_note(&note, &font, 400);
        assert_eq!(out.width(), 400);
        assert!(out.height() > 0);
        // Corners are untouched background.
        assert_eq!(*out.get_pixel(0, 0), Rgba([200, 210, 220, 255]));
        assert_eq!(*out.get_pixel(399, out.height() - 1), Rgba([200, 210, 220, 255]));
    }

    #[test]
    fn render_lays_out_attached_photos() {
        let Ok(font) = resolve_font() else { return };
        let mut note = Note {
            background_color: Rgba([255, 255, 255, 255]),
            ..Note::default()
        };
        note.attach_image(RgbaImage::from_pixel(50, 50, Rgba([255, 0, 0, 255])));
        note.attach_image(RgbaImage::from_pixel(50, 50, Rgba([0, 255, 0, 255])));
        let out = render_note(&note, &font, 300);
        // Two photos share a row, so some red and some green pixels land.
        let has_red = out.pixels().any(|p| p[0] > 200 && p[1] < 50);
        let has_green = out.pixels().any(|p| p[1] > 200 && p[0] < 50);
        assert!(has_red && has_green);
    }
}
