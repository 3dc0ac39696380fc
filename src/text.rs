// ============================================================================
// TEXT — glyph layout and rasterization for note rendering
// ============================================================================

use ab_glyph::{Font, FontArc, Glyph, ScaleFont, point};
use image::{Rgba, RgbaImage};

/// Load the best-matching sans-serif system font.
/// Note rendering needs exactly one face; weight variants, italics and
/// per-family pickers are out of scope here.
pub fn resolve_font() -> Result<FontArc, String> {
    use font_kit::family_name::FamilyName;
    use font_kit::properties::Properties;
    use font_kit::source::SystemSource;

    let source = SystemSource::new();
    let handle = source
        .select_best_match(&[FamilyName::SansSerif], &Properties::new())
        .map_err(|e| format!("no usable system font: {}", e))?;
    let font_data = handle
        .load()
        .map_err(|e| format!("failed to load system font: {}", e))?;
    let bytes = font_data
        .copy_font_data()
        .ok_or_else(|| "system font has no accessible data".to_string())?;
    FontArc::try_from_vec((*bytes).clone()).map_err(|e| format!("bad font data: {}", e))
}

/// Advance width of a single line at `size` px, kerning included.
pub fn line_width(font: &FontArc, text: &str, size: f32) -> f32 {
    let scaled = font.as_scaled(size);
    let mut width = 0.0f32;
    let mut last = None;
    for ch in text.chars() {
        let id = font.glyph_id(ch);
        if let Some(prev) = last {
            width += scaled.kern(prev, id);
        }
        width += scaled.h_advance(id);
        last = Some(id);
    }
    width
}

/// Line height (ascent − descent + gap) at `size` px.
pub fn line_height(font: &FontArc, size: f32) -> f32 {
    font.as_scaled(size).height()
}

/// Greedy word wrap: split `text` into lines no wider than `max_width`.
/// Explicit newlines are honored; a single word wider than the limit gets a
/// line of its own rather than being broken mid-word.
pub fn wrap_text(font: &FontArc, text: &str, size: f32, max_width: f32) -> Vec<String> {
    let mut lines = Vec::new();
    for paragraph in text.split('\n') {
        let mut current = String::new();
        for word in paragraph.split_whitespace() {
            let candidate = if current.is_empty() {
                word.to_string()
            } else {
                format!("{} {}", current, word)
            };
            if line_width(font, &candidate, size) <= max_width || current.is_empty() {
                current = candidate;
            } else {
                lines.push(current);
                current = word.to_string();
            }
        }
        lines.push(current);
    }
    lines
}

/// Rasterize one line of text onto `canvas` with its baseline-left origin at
/// (`x`, `baseline_y`), alpha-blending glyph coverage with `color`.
pub fn draw_line(
    canvas: &mut RgbaImage,
    font: &FontArc,
    text: &str,
    size: f32,
    x: f32,
    baseline_y: f32,
    color: Rgba<u8>,
) {
    let scaled = font.as_scaled(size);
    let mut cursor_x = x;
    let mut last = None;

    for ch in text.chars() {
        let id = font.glyph_id(ch);
        if let Some(prev) = last {
            cursor_x += scaled.kern(prev, id);
        }
        let glyph: Glyph = id.with_scale_and_position(size, point(cursor_x, baseline_y));
        if let Some(outlined) = font.outline_glyph(glyph) {
            let bounds = outlined.px_bounds();
            outlined.draw(|gx, gy, coverage| {
                let px = bounds.min.x as i32 + gx as i32;
                let py = bounds.min.y as i32 + gy as i32;
                if px >= 0 && py >= 0 && (px as u32) < canvas.width() && (py as u32) < canvas.height()
                {
                    blend_pixel(canvas, px as u32, py as u32, color, coverage);
                }
            });
        }
        cursor_x += scaled.h_advance(id);
        last = Some(id);
    }
}

/// Source-over blend of `color` at `alpha` coverage onto one canvas pixel.
pub fn blend_pixel(canvas: &mut RgbaImage, x: u32, y: u32, color: Rgba<u8>, alpha: f32) {
    let a = alpha.clamp(0.0, 1.0) * (color[3] as f32 / 255.0);
    if a <= 0.0 {
        return;
    }
    let dst = canvas.get_pixel_mut(x, y);
    for c in 0..3 {
        let d = dst[c] as f32;
        dst[c] = (d + (color[c] as f32 - d) * a).round().clamp(0.0, 255.0) as u8;
    }
    let da = dst[3] as f32 / 255.0;
    dst[3] = ((a + da * (1.0 - a)) * 255.0).round().clamp(0.0, 255.0) as u8;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_font() -> Option<FontArc> {
        // System-dependent; tests that need a face skip when none resolves.
        resolve_font().ok()
    }

    #[test]
    fn wider_text_measures_wider() {
        let Some(font) = test_font() else { return };
        let short = line_width(&font, "hi", 20.0);
        let long = line_width(&font, "hello there", 20.0);
        assert!(long > short);
    }

    #[test]
    fn wrap_respects_max_width() {
        let Some(font) = test_font() else { return };
        let lines = wrap_text(&font, "one two three four five six seven", 18.0, 80.0);
        assert!(lines.len() > 1);
        for line in &lines {
            // A single over-long word is allowed through; these are short.
            assert!(line_width(&font, line, 18.0) <= 80.0 + 1.0, "{}", line);
        }
    }

    #[test]
    fn wrap_keeps_explicit_newlines() {
        let Some(font) = test_font() else { return };
        let lines = wrap_text(&font, "a\nb", 18.0, 500.0);
        assert_eq!(lines, vec!["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn draw_line_marks_pixels() {
        let Some(font) = test_font() else { return };
        let mut canvas = RgbaImage::from_pixel(120, 40, Rgba([255, 255, 255, 255]));
        draw_line(&mut canvas, &font, "Xy", 24.0, 10.0, 28.0, Rgba([0, 0, 0, 255]));
        let changed = canvas.pixels().any(|p| p[0] != 255);
        assert!(changed);
    }

    #[test]
    fn blend_full_alpha_replaces_color() {
        let mut canvas = RgbaImage::from_pixel(2, 2, Rgba([0, 0, 0, 255]));
        blend_pixel(&mut canvas, 1, 1, Rgba([200, 100, 50, 255]), 1.0);
        assert_eq!(*canvas.get_pixel(1, 1), Rgba([200, 100, 50, 255]));
    }
}
