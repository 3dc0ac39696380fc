pub mod adjustments;
pub mod effects;
