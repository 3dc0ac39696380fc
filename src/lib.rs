//! PhotoJot — photo filter chains and journal-note rendering, headless.
//!
//! The core is an ordered, editable chain of filter descriptors applied
//! sequentially to a source photo ([`engine::apply`]), owned by an
//! [`session::EditSession`] that re-renders on every mutation. Notes
//! ([`note::Note`]) are composed separately and rendered flat for export.

pub mod chain;
pub mod cli;
pub mod engine;
pub mod io;
pub mod logger;
pub mod note;
pub mod ops;
pub mod policy;
pub mod session;
pub mod text;

pub use chain::{DescriptorNotFound, FilterChain, FilterDescriptor, FilterKind};
pub use engine::apply;
pub use ops::adjustments::ColorAdjustments;
pub use session::EditSession;
