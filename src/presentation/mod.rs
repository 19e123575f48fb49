//! HTML rendering of filter payloads.

pub mod views;
