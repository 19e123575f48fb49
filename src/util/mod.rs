//! Small parsing and ordering helpers shared across layers.

pub mod natural;
pub mod scalar;
