use crate::paint::Color;
use crate::time::FrameTime;
use crate::window::Window;

use super::stop::StopHandle;

/// Per-frame context passed to [`App::on_frame`](super::App::on_frame).
///
/// `'a` is the duration of the callback invocation.
pub struct FrameCtx<'a> {
    /// Descriptor of the window the Core was created with.
    pub window: &'a Window,

    pub time: FrameTime,

    /// Current drawable size in physical pixels.
    ///
    /// Tracks OS resizes; the descriptor keeps the size requested at creation.
    pub surface_size: (u32, u32),

    /// Color the frame is cleared to after the hook returns.
    pub clear_color: &'a mut Color,

    stop: &'a StopHandle,
}

impl<'a> FrameCtx<'a> {
    pub(crate) fn new(
        window: &'a Window,
        time: FrameTime,
        surface_size: (u32, u32),
        clear_color: &'a mut Color,
        stop: &'a StopHandle,
    ) -> Self {
        Self {
            window,
            time,
            surface_size,
            clear_color,
            stop,
        }
    }

    /// Asks the loop to stop after this frame.
    pub fn request_stop(&self) {
        self.stop.request();
    }

    /// Returns a handle that can stop the loop from another thread.
    pub fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }
}
