//! Engine lifecycle.
//!
//! `Core` is created from a `CoreConfig`, started (blocking until the loop
//! stops) and released exactly once. User code plugs into the loop through the
//! `App` trait and receives a `FrameCtx` every frame.

mod app;
mod config;
mod ctx;
mod engine;
mod state;
mod stop;

pub use app::{from_fn, App, AppControl, FnApp, Idle};
pub use config::{Backend, CoreConfig, HeadlessConfig};
pub use ctx::FrameCtx;
pub use engine::{Core, ExitReason, RunStats};
pub use state::CoreState;
pub use stop::StopHandle;

pub(crate) use engine::LoopSettings;
