// ============================================================================
// IMAGE IO — the acquisition and export boundary
// ============================================================================
//
// Loading stands in for the platform photo picker; saving stands in for the
// photo-library writer. Failures surface as strings for the caller to report;
// nothing here retries or panics.

use image::codecs::bmp::BmpEncoder;
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::{DynamicImage, RgbaImage};
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

/// Export formats, inferred from the output extension.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SaveFormat {
    Png,
    Jpeg,
    Bmp,
}

impl SaveFormat {
    /// Map a file extension to a format; unknown extensions fall back to PNG.
    pub fn from_extension(ext: &str) -> Self {
        match ext.to_lowercase().as_str() {
            "jpg" | "jpeg" => SaveFormat::Jpeg,
            "bmp" => SaveFormat::Bmp,
            _ => SaveFormat::Png,
        }
    }

    pub fn from_path(path: &Path) -> Self {
        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
        Self::from_extension(ext)
    }
}

/// Load any supported image file and decode it to RGBA8.
pub fn load_image(path: &Path) -> Result<RgbaImage, String> {
    let img = image::open(path)
        .map_err(|e| format!("could not load '{}': {}", path.display(), e))?;
    Ok(img.to_rgba8())
}

/// Encode `image` in `format` and write it to `path`.
/// `quality` applies to JPEG only (1–100).
pub fn encode_and_write(
    image: &RgbaImage,
    path: &Path,
    format: SaveFormat,
    quality: u8,
) -> Result<(), String> {
    let file = File::create(path)
        .map_err(|e| format!("could not create '{}': {}", path.display(), e))?;
    let mut writer = BufWriter::new(file);

    let result = match format {
        SaveFormat::Png => {
            let encoder = PngEncoder::new(&mut writer);
            #[allow(deprecated)]
            encoder.encode(
                image.as_raw(),
                image.width(),
                image.height(),
                image::ColorType::Rgba8,
            )
        }
        SaveFormat::Jpeg => {
            // JPEG has no alpha channel.
            let rgb_image = DynamicImage::ImageRgba8(image.clone()).to_rgb8();
            let mut encoder = JpegEncoder::new_with_quality(&mut writer, quality.clamp(1, 100));
            encoder.encode(
                rgb_image.as_raw(),
                rgb_image.width(),
                rgb_image.height(),
                image::ColorType::Rgb8,
            )
        }
        SaveFormat::Bmp => {
            let mut encoder = BmpEncoder::new(&mut writer);
            encoder.encode(
                image.as_raw(),
                image.width(),
                image.height(),
                image::ColorType::Rgba8,
            )
        }
    };

    result.map_err(|e| format!("could not write '{}': {}", path.display(), e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    #[test]
    fn format_inference_from_extension() {
        assert_eq!(SaveFormat::from_extension("PNG"), SaveFormat::Png);
        assert_eq!(SaveFormat::from_extension("jpg"), SaveFormat::Jpeg);
        assert_eq!(SaveFormat::from_extension("JPEG"), SaveFormat::Jpeg);
        assert_eq!(SaveFormat::from_extension("bmp"), SaveFormat::Bmp);
        // Unknown extensions default to PNG.
        assert_eq!(SaveFormat::from_extension("zip"), SaveFormat::Png);
        assert_eq!(SaveFormat::from_path(Path::new("out")), SaveFormat::Png);
    }

    #[test]
    fn png_round_trip_preserves_pixels() {
        let dir = std::env::temp_dir().join("photojot-io-test");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("roundtrip.png");

        let img = RgbaImage::from_fn(12, 8, |x, y| {
            Rgba([(x * 20) as u8, (y * 30) as u8, 128, 255])
        });
        encode_and_write(&img, &path, SaveFormat::Png, 90).unwrap();
        let back = load_image(&path).unwrap();
        assert_eq!(back, img);

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn load_missing_file_reports_error() {
        let err = load_image(Path::new("/definitely/not/here.png")).unwrap_err();
        assert!(err.contains("not/here.png"));
    }
}
