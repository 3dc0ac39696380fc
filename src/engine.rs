// ============================================================================
// FILTER ENGINE — applies a chain to a source image, in order
// ============================================================================

use image::RgbaImage;

use crate::chain::{FilterChain, FilterDescriptor, FilterKind};
use crate::log_warn;
use crate::ops::effects;

/// Seed for crystallize cell jitter. Fixed so that re-applying an identical
/// chain to an identical image is bit-identical.
const CRYSTALLIZE_SEED: u32 = 0;

/// Apply every descriptor of `chain` to `source`, in chain order.
///
/// `None` entries pass through. A step that cannot produce output for its
/// parameters (non-finite values) is skipped and the previous result carried
/// forward; the skip is recorded in the session log but never aborts the
/// chain. The empty chain returns the source unchanged.
pub fn apply(source: &RgbaImage, chain: &FilterChain) -> RgbaImage {
    let mut result = source.clone();
    for descriptor in chain {
        match step(&result, descriptor) {
            StepOutcome::Output(img) => result = img,
            StepOutcome::PassThrough => {}
            StepOutcome::Skipped(reason) => {
                log_warn!(
                    "skipping {} step {}: {}",
                    descriptor.kind.label(),
                    descriptor.id,
                    reason
                );
            }
        }
    }
    result
}

enum StepOutcome {
    /// The step produced a new image.
    Output(RgbaImage),
    /// Identity step; previous result flows through.
    PassThrough,
    /// The step could not run; previous result flows through.
    Skipped(&'static str),
}

fn step(input: &RgbaImage, d: &FilterDescriptor) -> StepOutcome {
    if d.kind == FilterKind::None {
        return StepOutcome::PassThrough;
    }
    if !(d.arg0.is_finite() && d.arg1.is_finite() && d.arg2.is_finite()) {
        return StepOutcome::Skipped("non-finite parameter");
    }

    let out = match d.kind {
        FilterKind::None => unreachable!(),
        FilterKind::SepiaTone => effects::sepia_core(input, d.arg0 as f32),
        FilterKind::Pixellate => effects::pixellate_core(input, d.arg0 as f32),
        FilterKind::Crystallize => {
            effects::crystallize_core(input, d.arg0 as f32, CRYSTALLIZE_SEED)
        }
        FilterKind::TwirlDistortion => {
            effects::twirl_core(input, d.arg0 as f32, d.arg1 as f32, d.arg2 as f32)
        }
    };
    StepOutcome::Output(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::{FilterChain, FilterDescriptor, FilterKind};
    use image::Rgba;

    fn gradient(w: u32, h: u32) -> RgbaImage {
        RgbaImage::from_fn(w, h, |x, y| {
            Rgba([
                (x * 11 % 256) as u8,
                (y * 5 % 256) as u8,
                ((x * y) % 256) as u8,
                255,
            ])
        })
    }

    fn descriptor(kind: FilterKind, w: f64, h: f64, a0: f64, a1: f64, a2: f64) -> FilterDescriptor {
        FilterDescriptor::with_args(kind, w, h, a0, a1, a2)
    }

    #[test]
    fn empty_chain_is_identity() {
        let img = gradient(12, 9);
        assert_eq!(apply(&img, &FilterChain::new()), img);
    }

    #[test]
    fn none_step_is_identity() {
        let img = gradient(12, 12);
        let mut chain = FilterChain::new();
        chain.add_default(12.0, 12.0);
        assert_eq!(apply(&img, &chain), img);
    }

    #[test]
    fn apply_is_deterministic() {
        let img = gradient(24, 24);
        let mut chain = FilterChain::new();
        chain.push(descriptor(FilterKind::Crystallize, 24.0, 24.0, 4.0, 0.0, 0.0));
        chain.push(descriptor(FilterKind::SepiaTone, 24.0, 24.0, 0.6, 0.0, 0.0));
        chain.push(descriptor(FilterKind::TwirlDistortion, 24.0, 24.0, 10.0, 12.0, 12.0));
        assert_eq!(apply(&img, &chain), apply(&img, &chain));
    }

    #[test]
    fn sepia_chain_changes_solid_color_but_keeps_dimensions() {
        let img = RgbaImage::from_pixel(10, 10, Rgba([100, 150, 200, 255]));
        let mut chain = FilterChain::new();
        chain.push(descriptor(FilterKind::SepiaTone, 10.0, 10.0, 1.0, 0.0, 0.0));
        let out = apply(&img, &chain);
        assert_eq!(out.dimensions(), (10, 10));
        assert_ne!(out, img);
    }

    #[test]
    fn zero_intensity_sepia_after_pixellate_equals_pixellate_alone() {
        let img = gradient(20, 20);

        let mut both = FilterChain::new();
        both.push(descriptor(FilterKind::Pixellate, 20.0, 20.0, 5.0, 0.0, 0.0));
        both.push(descriptor(FilterKind::SepiaTone, 20.0, 20.0, 0.0, 0.0, 0.0));

        let mut pixellate_only = FilterChain::new();
        pixellate_only.push(descriptor(FilterKind::Pixellate, 20.0, 20.0, 5.0, 0.0, 0.0));

        assert_eq!(apply(&img, &both), apply(&img, &pixellate_only));
    }

    #[test]
    fn order_matters_for_order_sensitive_steps() {
        let img = gradient(30, 30);
        let pix = descriptor(FilterKind::Pixellate, 30.0, 30.0, 6.0, 0.0, 0.0);
        let twirl = descriptor(FilterKind::TwirlDistortion, 30.0, 30.0, 14.0, 15.0, 15.0);

        let mut ab = FilterChain::new();
        ab.push(pix);
        ab.push(twirl);

        let mut ba = FilterChain::new();
        ba.push(twirl);
        ba.push(pix);

        assert_ne!(apply(&img, &ab), apply(&img, &ba));
    }

    #[test]
    fn removing_a_step_equals_never_adding_it() {
        let img = gradient(16, 16);

        let mut chain = FilterChain::new();
        chain.push(descriptor(FilterKind::SepiaTone, 16.0, 16.0, 0.8, 0.0, 0.0));
        let pix = descriptor(FilterKind::Pixellate, 16.0, 16.0, 4.0, 0.0, 0.0);
        chain.push(pix);

        let mut never_added = FilterChain::new();
        never_added.push(descriptor(FilterKind::SepiaTone, 16.0, 16.0, 0.8, 0.0, 0.0));

        assert!(chain.remove(pix.id));
        assert_eq!(apply(&img, &chain), apply(&img, &never_added));
    }

    #[test]
    fn cleared_chain_applies_as_identity() {
        let img = gradient(14, 14);
        let mut chain = FilterChain::new();
        chain.push(descriptor(FilterKind::Crystallize, 14.0, 14.0, 3.0, 0.0, 0.0));
        chain.push(descriptor(FilterKind::SepiaTone, 14.0, 14.0, 1.0, 0.0, 0.0));
        chain.clear();
        assert_eq!(apply(&img, &chain), img);
    }

    #[test]
    fn non_finite_parameters_skip_the_step() {
        let img = gradient(10, 10);
        let mut bad = FilterDescriptor::with_args(FilterKind::SepiaTone, 10.0, 10.0, 1.0, 0.0, 0.0);
        bad.arg0 = f64::NAN;
        let mut chain = FilterChain::new();
        chain.push(bad);
        // Skipped step carries the previous result forward untouched.
        assert_eq!(apply(&img, &chain), img);
    }
}
