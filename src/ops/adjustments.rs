// ============================================================================
// COLOR ADJUSTMENTS — pre-chain saturation / brightness / contrast grade
// ============================================================================
//
// The grade runs on the source photo before any chain step, every render.
// Defaults are the identity, so an untouched session renders the source
// straight into the chain.

use image::RgbaImage;

use super::effects::apply_per_pixel;

/// Global color controls for an edit session.
///
/// Ranges follow the sliders: saturation 0–2 (1 = unchanged), brightness
/// -1–1 (0 = unchanged), contrast 0–2 (1 = unchanged).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ColorAdjustments {
    pub saturation: f64,
    pub brightness: f64,
    pub contrast: f64,
}

impl Default for ColorAdjustments {
    fn default() -> Self {
        Self {
            saturation: 1.0,
            brightness: 0.0,
            contrast: 1.0,
        }
    }
}

impl ColorAdjustments {
    /// True when applying the grade would leave every pixel unchanged.
    pub fn is_identity(&self) -> bool {
        self.saturation == 1.0 && self.brightness == 0.0 && self.contrast == 1.0
    }

    /// Slider-range clamp.
    pub fn clamped(self) -> Self {
        Self {
            saturation: self.saturation.clamp(0.0, 2.0),
            brightness: self.brightness.clamp(-1.0, 1.0),
            contrast: self.contrast.clamp(0.0, 2.0),
        }
    }
}

/// Apply the grade: desaturate/oversaturate around BT.709 luminance, offset
/// brightness, then scale contrast around mid gray. Alpha is preserved.
pub fn color_controls_core(src: &RgbaImage, adjustments: ColorAdjustments) -> RgbaImage {
    let a = adjustments.clamped();
    if a.is_identity() {
        return src.clone();
    }
    let sat = a.saturation as f32;
    let bri = a.brightness as f32;
    let con = a.contrast as f32;

    apply_per_pixel(src, move |_x, _y, r, g, b, alpha| {
        let (r, g, b) = (r / 255.0, g / 255.0, b / 255.0);
        let luma = 0.2126 * r + 0.7152 * g + 0.0722 * b;
        let grade = |v: f32| {
            let v = luma + (v - luma) * sat;
            let v = v + bri;
            let v = (v - 0.5) * con + 0.5;
            v * 255.0
        };
        (grade(r), grade(g), grade(b), alpha)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn gradient(w: u32, h: u32) -> RgbaImage {
        RgbaImage::from_fn(w, h, |x, y| {
            Rgba([(x * 17 % 256) as u8, (y * 29 % 256) as u8, 140, 255])
        })
    }

    #[test]
    fn default_adjustments_are_identity() {
        let img = gradient(12, 12);
        let out = color_controls_core(&img, ColorAdjustments::default());
        assert_eq!(out, img);
    }

    #[test]
    fn zero_saturation_is_grayscale() {
        let img = gradient(8, 8);
        let out = color_controls_core(
            &img,
            ColorAdjustments {
                saturation: 0.0,
                ..Default::default()
            },
        );
        for p in out.pixels() {
            assert_eq!(p[0], p[1]);
            assert_eq!(p[1], p[2]);
        }
    }

    #[test]
    fn brightness_shifts_channels_and_preserves_alpha() {
        let img = RgbaImage::from_pixel(4, 4, Rgba([100, 100, 100, 200]));
        let out = color_controls_core(
            &img,
            ColorAdjustments {
                brightness: 0.2,
                ..Default::default()
            },
        );
        let p = out.get_pixel(0, 0);
        assert_eq!(p[0], 151); // 100 + 0.2 * 255, rounded
        assert_eq!(p[3], 200);
    }

    #[test]
    fn zero_contrast_flattens_to_mid_gray() {
        let img = gradient(8, 8);
        let out = color_controls_core(
            &img,
            ColorAdjustments {
                contrast: 0.0,
                ..Default::default()
            },
        );
        for p in out.pixels() {
            assert_eq!(&p.0[..3], &[128, 128, 128]);
        }
    }

    #[test]
    fn out_of_range_values_are_clamped() {
        let raw = ColorAdjustments {
            saturation: 5.0,
            brightness: -3.0,
            contrast: -1.0,
        };
        let c = raw.clamped();
        assert_eq!((c.saturation, c.brightness, c.contrast), (2.0, -1.0, 0.0));
    }
}
