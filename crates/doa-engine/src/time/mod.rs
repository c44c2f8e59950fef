//! Frame timing.
//!
//! One `FrameClock` per run loop; call `tick()` once per frame to obtain a
//! `FrameTime`.

mod frame_clock;

pub use frame_clock::{FrameClock, FrameTime};
