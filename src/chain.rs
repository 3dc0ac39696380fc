// ============================================================================
// FILTER CHAIN — the ordered, editable list of filter steps
// ============================================================================
//
// One editing session owns exactly one chain. Entries are addressed by their
// Uuid, never by position: slider edits, deletions, and the re-render they
// trigger can race in the event loop, and a stale index must never hit the
// wrong entry.

use rand::Rng;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::policy;

/// The filter applied by one chain entry.
///
/// `None` is a real chain member: the "Add Filter" action appends a `None`
/// placeholder and the user picks a concrete kind afterwards. It contributes
/// identity to the pipeline until then.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterKind {
    None,
    SepiaTone,
    Pixellate,
    Crystallize,
    TwirlDistortion,
}

impl FilterKind {
    /// The kinds a user can actually select (everything but the placeholder).
    pub const ACTIVE: [FilterKind; 4] = [
        FilterKind::SepiaTone,
        FilterKind::Pixellate,
        FilterKind::Crystallize,
        FilterKind::TwirlDistortion,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            FilterKind::None => "(none)",
            FilterKind::SepiaTone => "Sepia Tone",
            FilterKind::Pixellate => "Pixellate",
            FilterKind::Crystallize => "Crystallize",
            FilterKind::TwirlDistortion => "Twirl Distortion",
        }
    }
}

/// One filter step: a kind, three parameter slots, and the source image
/// dimensions captured at creation time (parameter bounds are derived from
/// this snapshot, not from whatever image is previewed later).
///
/// Parameter meaning by kind:
///   SepiaTone        arg0 = intensity [0, 1]
///   Pixellate        arg0 = block scale [1, max(w,h)/2]
///   Crystallize      arg0 = cell radius [1, max(w,h)/2]
///   TwirlDistortion  arg0 = radius [1, max(w,h)/2], arg1/arg2 = center x/y
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FilterDescriptor {
    pub id: Uuid,
    pub kind: FilterKind,
    pub arg0: f64,
    pub arg1: f64,
    pub arg2: f64,
    pub image_width: f64,
    pub image_height: f64,
}

impl FilterDescriptor {
    /// Create a descriptor with `kind`'s default parameters.
    pub fn new(kind: FilterKind, image_width: f64, image_height: f64) -> Self {
        let (arg0, arg1, arg2) = policy::defaults(kind, image_width, image_height);
        Self {
            id: Uuid::new_v4(),
            kind,
            arg0,
            arg1,
            arg2,
            image_width,
            image_height,
        }
    }

    /// Create a descriptor with explicit parameters, clamped into bounds.
    pub fn with_args(
        kind: FilterKind,
        image_width: f64,
        image_height: f64,
        arg0: f64,
        arg1: f64,
        arg2: f64,
    ) -> Self {
        let (arg0, arg1, arg2) =
            policy::clamp_args(kind, image_width, image_height, arg0, arg1, arg2);
        Self {
            id: Uuid::new_v4(),
            kind,
            arg0,
            arg1,
            arg2,
            image_width,
            image_height,
        }
    }

    /// True when the parameters satisfy the bounds for this descriptor's kind.
    pub fn is_in_bounds(&self) -> bool {
        policy::args_in_bounds(
            self.kind,
            self.image_width,
            self.image_height,
            self.arg0,
            self.arg1,
            self.arg2,
        )
    }
}

/// A chain mutation referenced an id that is no longer present.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DescriptorNotFound(pub Uuid);

impl std::fmt::Display for DescriptorNotFound {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "no filter with id {} in the chain", self.0)
    }
}

impl std::error::Error for DescriptorNotFound {}

/// Ordered list of filter steps. Insertion order is application order.
/// The empty chain is valid and applies as identity.
#[derive(Clone, Debug, Default)]
pub struct FilterChain {
    entries: Vec<FilterDescriptor>,
}

impl FilterChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FilterDescriptor> {
        self.entries.iter()
    }

    pub fn get(&self, id: Uuid) -> Option<&FilterDescriptor> {
        self.entries.iter().find(|d| d.id == id)
    }

    /// Append a descriptor at the end of the chain. Count is unbounded.
    pub fn push(&mut self, descriptor: FilterDescriptor) {
        self.entries.push(descriptor);
    }

    /// The "Add Filter" action: append a centered `None` placeholder the user
    /// will turn into a concrete filter via `set_kind`.
    pub fn add_default(&mut self, image_width: f64, image_height: f64) -> Uuid {
        let mut d = FilterDescriptor::new(FilterKind::None, image_width, image_height);
        d.arg0 = 1.0;
        d.arg1 = image_width / 2.0;
        d.arg2 = image_height / 2.0;
        let id = d.id;
        self.entries.push(d);
        id
    }

    /// The "Random Effect" action: append 2–6 random descriptors, every one
    /// in bounds for its drawn kind.
    pub fn randomize<R: Rng>(&mut self, image_width: f64, image_height: f64, rng: &mut R) {
        let quantity = rng.gen_range(2..=6);
        for _ in 0..quantity {
            let kind = FilterKind::ACTIVE[rng.gen_range(0..FilterKind::ACTIVE.len())];
            let (arg0, arg1, arg2) = policy::random_args(rng, kind, image_width, image_height);
            self.entries.push(FilterDescriptor {
                id: Uuid::new_v4(),
                kind,
                arg0,
                arg1,
                arg2,
                image_width,
                image_height,
            });
        }
    }

    /// Remove the descriptor with the given id. Returns `false` (and leaves
    /// the chain untouched) when the id is not present — a removal raced a
    /// concurrent edit and already happened, which is fine.
    pub fn remove(&mut self, id: Uuid) -> bool {
        let before = self.entries.len();
        self.entries.retain(|d| d.id != id);
        self.entries.len() != before
    }

    /// Replace the descriptor with the given id in place, preserving its
    /// position. The replacement keeps the original id regardless of the id
    /// carried by `descriptor`.
    pub fn replace(
        &mut self,
        id: Uuid,
        descriptor: FilterDescriptor,
    ) -> Result<(), DescriptorNotFound> {
        match self.entries.iter_mut().find(|d| d.id == id) {
            Some(slot) => {
                *slot = FilterDescriptor { id, ..descriptor };
                Ok(())
            }
            None => Err(DescriptorNotFound(id)),
        }
    }

    /// Change the kind of an existing entry, resetting its parameters to the
    /// new kind's defaults (stale slider values from the previous kind are
    /// meaningless under the new bounds).
    pub fn set_kind(&mut self, id: Uuid, kind: FilterKind) -> Result<(), DescriptorNotFound> {
        match self.entries.iter_mut().find(|d| d.id == id) {
            Some(slot) => {
                let (arg0, arg1, arg2) =
                    policy::defaults(kind, slot.image_width, slot.image_height);
                slot.kind = kind;
                slot.arg0 = arg0;
                slot.arg1 = arg1;
                slot.arg2 = arg2;
                Ok(())
            }
            None => Err(DescriptorNotFound(id)),
        }
    }

    /// Remove every descriptor, returning the chain to identity.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

impl<'a> IntoIterator for &'a FilterChain {
    type Item = &'a FilterDescriptor;
    type IntoIter = std::slice::Iter<'a, FilterDescriptor>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
