// ============================================================================
// EDIT SESSION — exclusive owner of one source photo and its filter chain
// ============================================================================

use image::RgbaImage;
use rand::Rng;
use uuid::Uuid;

use crate::chain::{DescriptorNotFound, FilterChain, FilterDescriptor, FilterKind};
use crate::engine;
use crate::ops::adjustments::{self, ColorAdjustments};

/// One photo-editing session: the source image, the chain being edited, and
/// the most recent engine output.
///
/// The session is the only mutator of its chain. Every mutation bumps a
/// render generation and re-runs the engine synchronously; `generation`
/// exists so that a caller which computes a render off to the side (e.g. a
/// preview at reduced size) can detect that the chain moved on underneath it
/// and must discard the stale result instead of installing it.
pub struct EditSession {
    pub id: Uuid,
    source: RgbaImage,
    chain: FilterChain,
    adjustments: ColorAdjustments,
    output: RgbaImage,
    generation: u64,
}

impl EditSession {
    /// Start a session on `source`. The chain starts empty, so the initial
    /// output is the source itself.
    pub fn new(source: RgbaImage) -> Self {
        let output = source.clone();
        Self {
            id: Uuid::new_v4(),
            source,
            chain: FilterChain::new(),
            adjustments: ColorAdjustments::default(),
            output,
            generation: 0,
        }
    }

    pub fn source(&self) -> &RgbaImage {
        &self.source
    }

    /// The rendered result for the current chain state.
    pub fn output(&self) -> &RgbaImage {
        &self.output
    }

    pub fn chain(&self) -> &FilterChain {
        &self.chain
    }

    pub fn adjustments(&self) -> ColorAdjustments {
        self.adjustments
    }

    /// Monotonic counter, bumped by every chain mutation.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn width(&self) -> f64 {
        self.source.width() as f64
    }

    pub fn height(&self) -> f64 {
        self.source.height() as f64
    }

    // -- chain mutations (each re-renders) ---------------------------------

    /// "Add Filter": append a centered placeholder, returns its id.
    pub fn add_filter(&mut self) -> Uuid {
        let id = self.chain.add_default(self.width(), self.height());
        self.rerender();
        id
    }

    /// "Random Effect": append 2–6 random in-bounds filters.
    pub fn add_random_filters<R: Rng>(&mut self, rng: &mut R) {
        let (w, h) = (self.width(), self.height());
        self.chain.randomize(w, h, rng);
        self.rerender();
    }

    /// Append an explicit descriptor.
    pub fn push_filter(&mut self, descriptor: FilterDescriptor) {
        self.chain.push(descriptor);
        self.rerender();
    }

    /// Remove by id; a missing id is a no-op that still reports `false`.
    pub fn remove_filter(&mut self, id: Uuid) -> bool {
        let removed = self.chain.remove(id);
        if removed {
            self.rerender();
        }
        removed
    }

    /// Slider edit: replace the descriptor with matching id in place.
    pub fn replace_filter(
        &mut self,
        id: Uuid,
        descriptor: FilterDescriptor,
    ) -> Result<(), DescriptorNotFound> {
        self.chain.replace(id, descriptor)?;
        self.rerender();
        Ok(())
    }

    /// Kind selection on a chain entry; args reset to the kind's defaults.
    pub fn set_filter_kind(&mut self, id: Uuid, kind: FilterKind) -> Result<(), DescriptorNotFound> {
        self.chain.set_kind(id, kind)?;
        self.rerender();
        Ok(())
    }

    /// "Remove All Filters".
    pub fn clear_filters(&mut self) {
        self.chain.clear();
        self.rerender();
    }

    // -- color adjustments (each re-renders) -------------------------------

    /// Saturation / brightness / contrast sliders. Values are clamped to the
    /// slider ranges before they take effect.
    pub fn set_adjustments(&mut self, adjustments: ColorAdjustments) {
        self.adjustments = adjustments.clamped();
        self.rerender();
    }

    /// Restore the identity grade (saturation 1, brightness 0, contrast 1).
    pub fn reset_adjustments(&mut self) {
        self.adjustments = ColorAdjustments::default();
        self.rerender();
    }

    // -- rendering ---------------------------------------------------------

    /// The grade runs first, then the chain, on every render.
    fn rerender(&mut self) {
        self.generation += 1;
        self.output = if self.adjustments.is_identity() {
            engine::apply(&self.source, &self.chain)
        } else {
            let graded = adjustments::color_controls_core(&self.source, self.adjustments);
            engine::apply(&graded, &self.chain)
        };
    }

    /// Install a render computed outside the session (same chain state,
    /// possibly on a scaled copy of the source). The result is accepted only
    /// when `generation` still matches; a stale render is dropped and `false`
    /// returned so out-of-order results can never overwrite a newer one.
    pub fn install_render(&mut self, generation: u64, output: RgbaImage) -> bool {
        if generation != self.generation {
            return false;
        }
        self.output = output;
        true
    }
}
