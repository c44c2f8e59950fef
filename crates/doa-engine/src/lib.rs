//! DOA engine crate.
//!
//! Owns the engine lifecycle (`Core`), the window descriptor, the platform loop
//! and the C ABI consumed by managed hosts.

pub mod core;
pub mod device;
pub mod error;
pub mod ffi;
pub mod logging;
pub mod paint;
pub mod time;
pub mod window;

pub use crate::core::{App, AppControl, Core, CoreConfig, CoreState, ExitReason, FrameCtx, RunStats, StopHandle};
pub use crate::error::EngineError;
pub use crate::window::{Window, WindowMode};
