//! Window descriptor and run loops.
//!
//! The windowed loop owns the `winit` EventLoop and OS window and wires them to
//! the GPU layer. The headless loop runs the same frame cycle without either.

mod desc;
mod headless;
mod runtime;

pub use desc::{Window, WindowMode};

pub(crate) use headless::run as run_headless;
pub(crate) use runtime::run as run_windowed;
