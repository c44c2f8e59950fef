use super::ctx::FrameCtx;
use super::engine::RunStats;
use crate::window::Window;

/// Control directive returned by frame hooks.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum AppControl {
    Continue,
    Exit,
}

/// Hooks invoked by the run loop.
///
/// Only `on_frame` is required. All hooks run on the thread that called
/// [`Core::start`](crate::Core::start).
pub trait App {
    /// Called once, after the window (or headless surface) is ready and before
    /// the first frame.
    fn on_start(&mut self, window: &Window) {
        let _ = window;
    }

    /// Called once per frame, before the frame is cleared and presented.
    fn on_frame(&mut self, ctx: &mut FrameCtx<'_>) -> AppControl;

    /// Called when the drawable surface changes size (physical pixels).
    fn on_resize(&mut self, width: u32, height: u32) {
        let _ = (width, height);
    }

    /// Called once after the loop has stopped without error.
    fn on_stop(&mut self, stats: &RunStats) {
        let _ = stats;
    }
}

/// App that does nothing and never asks to exit.
#[derive(Debug, Default, Copy, Clone)]
pub struct Idle;

impl App for Idle {
    fn on_frame(&mut self, _ctx: &mut FrameCtx<'_>) -> AppControl {
        AppControl::Continue
    }
}

/// Adapter returned by [`from_fn`].
pub struct FnApp<F>(F);

/// Wraps a closure as an `App` whose only hook is `on_frame`.
pub fn from_fn<F>(f: F) -> FnApp<F>
where
    F: FnMut(&mut FrameCtx<'_>) -> AppControl,
{
    FnApp(f)
}

impl<F> App for FnApp<F>
where
    F: FnMut(&mut FrameCtx<'_>) -> AppControl,
{
    fn on_frame(&mut self, ctx: &mut FrameCtx<'_>) -> AppControl {
        (self.0)(ctx)
    }
}
