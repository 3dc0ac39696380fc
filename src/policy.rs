// ============================================================================
// PARAMETER POLICY — valid ranges and defaults per filter kind
// ============================================================================
//
// Every filter parameter range is a function of the source image dimensions
// captured when the descriptor was created. A descriptor created against a
// 4000×3000 photo keeps 4000×3000 bounds even if the UI later previews a
// downscaled copy.

use rand::Rng;

use crate::chain::FilterKind;

/// Inclusive (min, max) range for one parameter slot.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ParamRange {
    pub min: f64,
    pub max: f64,
}

impl ParamRange {
    fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn clamp(&self, v: f64) -> f64 {
        v.clamp(self.min, self.max)
    }

    pub fn contains(&self, v: f64) -> bool {
        v >= self.min && v <= self.max
    }
}

/// Ranges for the three parameter slots of one filter kind.
/// Unused slots get a degenerate [0, 0] range.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ParamBounds {
    pub arg0: ParamRange,
    pub arg1: ParamRange,
    pub arg2: ParamRange,
}

/// Upper limit shared by the size-driven parameters (pixellate scale,
/// crystallize radius, twirl radius): half the longer image side, floored
/// at 1 so tiny images still have a non-empty range.
fn size_cap(width: f64, height: f64) -> f64 {
    (width.max(height) / 2.0).max(1.0)
}

/// Valid parameter ranges for `kind` against a `width`×`height` source.
pub fn bounds(kind: FilterKind, width: f64, height: f64) -> ParamBounds {
    let unused = ParamRange::new(0.0, 0.0);
    match kind {
        FilterKind::None => ParamBounds {
            arg0: unused,
            arg1: unused,
            arg2: unused,
        },
        FilterKind::SepiaTone => ParamBounds {
            arg0: ParamRange::new(0.0, 1.0),
            arg1: unused,
            arg2: unused,
        },
        FilterKind::Pixellate | FilterKind::Crystallize => ParamBounds {
            arg0: ParamRange::new(1.0, size_cap(width, height)),
            arg1: unused,
            arg2: unused,
        },
        FilterKind::TwirlDistortion => ParamBounds {
            arg0: ParamRange::new(1.0, size_cap(width, height)),
            arg1: ParamRange::new(0.0, width.max(0.0)),
            arg2: ParamRange::new(0.0, height.max(0.0)),
        },
    }
}

/// Default parameter values for `kind`: the values a freshly selected filter
/// starts from before the user touches a slider.
pub fn defaults(kind: FilterKind, width: f64, height: f64) -> (f64, f64, f64) {
    match kind {
        FilterKind::None => (1.0, width / 2.0, height / 2.0),
        FilterKind::SepiaTone => (1.0, 0.0, 0.0),
        FilterKind::Pixellate | FilterKind::Crystallize => (1.0, 0.0, 0.0),
        FilterKind::TwirlDistortion => (1.0, width / 2.0, height / 2.0),
    }
}

/// Clamp a parameter triple into the bounds for `kind`.
pub fn clamp_args(
    kind: FilterKind,
    width: f64,
    height: f64,
    arg0: f64,
    arg1: f64,
    arg2: f64,
) -> (f64, f64, f64) {
    let b = bounds(kind, width, height);
    (b.arg0.clamp(arg0), b.arg1.clamp(arg1), b.arg2.clamp(arg2))
}

/// True when every parameter of the triple lies inside the bounds for `kind`.
pub fn args_in_bounds(
    kind: FilterKind,
    width: f64,
    height: f64,
    arg0: f64,
    arg1: f64,
    arg2: f64,
) -> bool {
    let b = bounds(kind, width, height);
    b.arg0.contains(arg0) && b.arg1.contains(arg1) && b.arg2.contains(arg2)
}

/// Draw a random in-bounds parameter triple for `kind`.
///
/// The twirl radius is biased toward the upper quarter of its range
/// (`raw/4 + 3*max/4`) so a random twirl is actually visible, then clamped
/// back under the cap.
pub fn random_args<R: Rng>(
    rng: &mut R,
    kind: FilterKind,
    width: f64,
    height: f64,
) -> (f64, f64, f64) {
    let b = bounds(kind, width, height);
    let mut arg0 = sample(rng, b.arg0);
    let arg1 = sample(rng, b.arg1);
    let arg2 = sample(rng, b.arg2);

    if kind == FilterKind::TwirlDistortion {
        arg0 = b.arg0.clamp(arg0 / 4.0 + b.arg0.max * 3.0 / 4.0);
    }
    (arg0, arg1, arg2)
}

fn sample<R: Rng>(rng: &mut R, range: ParamRange) -> f64 {
    if range.max <= range.min {
        range.min
    } else {
        rng.gen_range(range.min..=range.max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    #[test]
    fn sepia_bounds_ignore_image_size() {
        let b = bounds(FilterKind::SepiaTone, 4000.0, 3000.0);
        assert_eq!(b.arg0, ParamRange::new(0.0, 1.0));
        let b_small = bounds(FilterKind::SepiaTone, 8.0, 8.0);
        assert_eq!(b.arg0, b_small.arg0);
    }

    #[test]
    fn size_driven_bounds_use_longer_side() {
        let b = bounds(FilterKind::Pixellate, 640.0, 480.0);
        assert_eq!(b.arg0, ParamRange::new(1.0, 320.0));
        let b = bounds(FilterKind::Crystallize, 480.0, 640.0);
        assert_eq!(b.arg0, ParamRange::new(1.0, 320.0));
    }

    #[test]
    fn twirl_center_bounds_follow_each_axis() {
        let b = bounds(FilterKind::TwirlDistortion, 200.0, 100.0);
        assert_eq!(b.arg1, ParamRange::new(0.0, 200.0));
        assert_eq!(b.arg2, ParamRange::new(0.0, 100.0));
    }

    #[test]
    fn tiny_image_still_has_nonempty_range() {
        let b = bounds(FilterKind::Pixellate, 1.0, 1.0);
        assert!(b.arg0.max >= b.arg0.min);
    }

    #[test]
    fn clamp_pulls_out_of_range_values_back() {
        let (a0, a1, a2) =
            clamp_args(FilterKind::TwirlDistortion, 100.0, 100.0, 900.0, -5.0, 250.0);
        assert_eq!(a0, 50.0);
        assert_eq!(a1, 0.0);
        assert_eq!(a2, 100.0);
    }

    #[test]
    fn random_args_stay_in_bounds_for_every_kind() {
        let mut rng = SmallRng::seed_from_u64(7);
        for kind in [
            FilterKind::SepiaTone,
            FilterKind::Pixellate,
            FilterKind::Crystallize,
            FilterKind::TwirlDistortion,
        ] {
            for &(w, h) in &[(1.0, 1.0), (10.0, 20.0), (3000.0, 4000.0)] {
                for _ in 0..50 {
                    let (a0, a1, a2) = random_args(&mut rng, kind, w, h);
                    assert!(
                        args_in_bounds(kind, w, h, a0, a1, a2),
                        "{:?} out of bounds for {}x{}: ({}, {}, {})",
                        kind, w, h, a0, a1, a2
                    );
                }
            }
        }
    }

    #[test]
    fn random_twirl_radius_is_biased_high() {
        let mut rng = SmallRng::seed_from_u64(3);
        let max = bounds(FilterKind::TwirlDistortion, 400.0, 400.0).arg0.max;
        for _ in 0..100 {
            let (r, _, _) = random_args(&mut rng, FilterKind::TwirlDistortion, 400.0, 400.0);
            // raw/4 + 3*max/4 can never drop below three quarters of the cap
            assert!(r >= max * 0.75);
            assert!(r <= max);
        }
    }
}
