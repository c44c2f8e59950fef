//! Paint model.
//!
//! Only the clear color lives here; the engine draws nothing beyond clearing
//! and presenting the frame.

pub mod color;

pub use color::Color;
