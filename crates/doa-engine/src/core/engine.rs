use std::time::Duration;

use anyhow::Result;
use log::{debug, error, info};

use crate::error::EngineError;
use crate::paint::Color;
use crate::window::{self, Window, WindowMode};

use super::app::{App, Idle};
use super::config::{Backend, CoreConfig};
use super::state::CoreState;
use super::stop::StopHandle;

/// Why a run loop returned.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum ExitReason {
    /// The OS window was closed by the user or the platform.
    WindowClosed,
    /// A [`StopHandle`] was triggered.
    StopRequested,
    /// `App::on_frame` returned `AppControl::Exit`.
    AppExit,
    /// The headless frame limit was reached.
    FrameLimit,
}

/// Summary of a finished run.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct RunStats {
    pub frames: u64,
    pub reason: ExitReason,
}

/// Loop-wide settings shared by both backends.
#[derive(Debug, Clone)]
pub(crate) struct LoopSettings {
    pub clear_color: Color,
    pub dt_min: Duration,
    pub dt_max: Duration,
    pub maximized: bool,
    pub stop: StopHandle,
}

/// The engine instance.
///
/// A `Core` owns its [`Window`] descriptor and its loop. It is released exactly
/// once: explicitly with [`Core::release`] or when dropped.
///
/// ```no_run
/// use doa_engine::{Core, CoreConfig};
///
/// # fn main() -> anyhow::Result<()> {
/// let mut core = Core::create(CoreConfig::new(1280, 720, "Sandbox"))?;
/// core.start()?; // blocks until the window is closed
/// core.release();
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Core {
    config: CoreConfig,
    window: Window,
    state: CoreState,
    stop: StopHandle,
}

impl Core {
    /// Validates `config` and builds the window descriptor.
    ///
    /// The OS window is opened when the loop starts.
    pub fn create(config: CoreConfig) -> Result<Self, EngineError> {
        config.validate()?;

        let mode = if config.fullscreen {
            WindowMode::Fullscreen
        } else {
            WindowMode::Windowed
        };
        let window = Window::new(config.width, config.height, config.title.clone(), mode)?;

        info!(
            "core created: {}x{} {:?} ({}, {})",
            window.width(),
            window.height(),
            window.title(),
            window.mode(),
            if config.is_headless() { "headless" } else { "windowed" },
        );

        Ok(Self {
            config,
            window,
            state: CoreState::Created,
            stop: StopHandle::new(),
        })
    }

    /// The window descriptor. The borrow cannot outlive the Core; clone it to keep a copy.
    pub fn window(&self) -> &Window {
        &self.window
    }

    pub fn config(&self) -> &CoreConfig {
        &self.config
    }

    pub fn state(&self) -> CoreState {
        self.state
    }

    /// Returns a handle that stops the loop from any thread.
    pub fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }

    /// Runs the loop with no user hooks. Blocks until the loop stops.
    pub fn start(&mut self) -> Result<RunStats> {
        self.start_with(Idle)
    }

    /// Runs the loop, invoking `app` hooks. Blocks until the loop stops.
    ///
    /// A Core runs at most once; starting it again fails with
    /// [`EngineError::InvalidState`].
    pub fn start_with<A: App>(&mut self, mut app: A) -> Result<RunStats> {
        if !self.state.can_start() {
            return Err(EngineError::InvalidState {
                op: "start",
                state: self.state,
            }
            .into());
        }

        self.state = CoreState::Running;
        info!("core starting");

        let settings = LoopSettings {
            clear_color: self.config.clear_color,
            dt_min: self.config.dt_min,
            dt_max: self.config.dt_max,
            maximized: self.config.maximized,
            stop: self.stop.clone(),
        };

        let result = match &self.config.backend {
            Backend::Windowed(gpu_init) => {
                window::run_windowed(&self.window, gpu_init.clone(), &settings, &mut app)
            }
            Backend::Headless(headless) => {
                Ok(window::run_headless(&self.window, headless, &settings, &mut app))
            }
        };

        self.state = CoreState::Stopped;

        match &result {
            Ok(stats) => {
                info!("core stopped after {} frames ({:?})", stats.frames, stats.reason);
                app.on_stop(stats);
            }
            Err(e) => error!("core loop failed: {e:#}"),
        }

        result
    }

    /// Releases the Core and everything it owns.
    pub fn release(mut self) {
        self.release_resources();
    }

    fn release_resources(&mut self) {
        if self.state.is_released() {
            return;
        }

        // A loop still running on a borrowed handle must observe the release.
        self.stop.request();

        debug!("core released from state {}", self.state);
        self.state = CoreState::Released;
    }
}

impl Drop for Core {
    fn drop(&mut self) {
        self.release_resources();
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;
    use std::time::Duration;

    use super::*;
    use crate::core::{from_fn, AppControl, FrameCtx, HeadlessConfig};

    fn headless(max_frames: Option<u64>) -> CoreConfig {
        CoreConfig::new(320, 240, "headless test").headless(max_frames)
    }

    #[test]
    fn create_reads_back_dimensions_and_title() {
        let core = Core::create(CoreConfig::new(800, 600, "Hello, engine")).unwrap();
        assert_eq!(core.window().width(), 800);
        assert_eq!(core.window().height(), 600);
        assert_eq!(core.window().title(), "Hello, engine");
        assert_eq!(core.state(), CoreState::Created);
        core.release();
    }

    #[test]
    fn create_rejects_zero_dimensions() {
        let err = Core::create(CoreConfig::new(0, 600, "x")).unwrap_err();
        assert_eq!(err, EngineError::InvalidDimensions { width: 0, height: 600 });
    }

    #[test]
    fn create_rejects_oversized_dimensions() {
        let err = Core::create(CoreConfig::new(800, u32::MAX, "x")).unwrap_err();
        assert!(matches!(err, EngineError::InvalidDimensions { .. }));
    }

    #[test]
    fn create_rejects_nul_in_title() {
        let err = Core::create(CoreConfig::new(8, 8, "a\0b")).unwrap_err();
        assert!(matches!(err, EngineError::InvalidTitle(_)));
    }

    #[test]
    fn fullscreen_flag_sets_mode() {
        let core = Core::create(CoreConfig::new(8, 8, "fs").fullscreen(true)).unwrap();
        assert_eq!(core.window().mode(), WindowMode::Fullscreen);
    }

    #[test]
    fn headless_runs_exactly_the_frame_limit() {
        let mut core = Core::create(headless(Some(5))).unwrap();
        let mut seen = Vec::new();
        let stats = core
            .start_with(from_fn(|ctx: &mut FrameCtx<'_>| {
                seen.push(ctx.time.frame_index);
                AppControl::Continue
            }))
            .unwrap();

        assert_eq!(stats, RunStats { frames: 5, reason: ExitReason::FrameLimit });
        assert_eq!(seen, vec![0, 1, 2, 3, 4]);
        assert_eq!(core.state(), CoreState::Stopped);
    }

    #[test]
    fn zero_frame_limit_returns_immediately() {
        let mut core = Core::create(headless(Some(0))).unwrap();
        let stats = core.start().unwrap();
        assert_eq!(stats, RunStats { frames: 0, reason: ExitReason::FrameLimit });
    }

    #[test]
    fn app_exit_stops_the_loop() {
        let mut core = Core::create(headless(None)).unwrap();
        let stats = core
            .start_with(from_fn(|ctx: &mut FrameCtx<'_>| {
                if ctx.time.frame_index == 2 {
                    AppControl::Exit
                } else {
                    AppControl::Continue
                }
            }))
            .unwrap();
        assert_eq!(stats, RunStats { frames: 3, reason: ExitReason::AppExit });
    }

    #[test]
    fn stop_requested_before_start_runs_no_frames() {
        let mut core = Core::create(headless(None)).unwrap();
        core.stop_handle().request();
        let stats = core.start().unwrap();
        assert_eq!(stats, RunStats { frames: 0, reason: ExitReason::StopRequested });
    }

    #[test]
    fn stop_from_frame_hook_ends_after_that_frame() {
        let mut core = Core::create(headless(None)).unwrap();
        let stats = core
            .start_with(from_fn(|ctx: &mut FrameCtx<'_>| {
                ctx.request_stop();
                AppControl::Continue
            }))
            .unwrap();
        assert_eq!(stats, RunStats { frames: 1, reason: ExitReason::StopRequested });
    }

    #[test]
    fn stop_from_another_thread() {
        let config = CoreConfig::new(16, 16, "paced").backend(Backend::Headless(HeadlessConfig {
            max_frames: None,
            frame_interval: Some(Duration::from_millis(1)),
        }));
        let mut core = Core::create(config).unwrap();
        let handle = core.stop_handle();

        let stopper = std::thread::spawn(move || {
            std::thread::sleep(Duration::from_millis(20));
            handle.request();
        });

        let stats = core.start().unwrap();
        stopper.join().unwrap();
        assert_eq!(stats.reason, ExitReason::StopRequested);
    }

    #[test]
    fn second_start_is_rejected() {
        let mut core = Core::create(headless(Some(1))).unwrap();
        core.start().unwrap();

        let err = core.start().unwrap_err();
        assert_eq!(
            err.downcast_ref::<EngineError>(),
            Some(&EngineError::InvalidState { op: "start", state: CoreState::Stopped })
        );
    }

    #[test]
    fn hooks_see_descriptor_and_lifecycle() {
        struct Probe {
            started: Rc<Cell<bool>>,
            stopped_after: Rc<Cell<u64>>,
        }

        impl App for Probe {
            fn on_start(&mut self, window: &Window) {
                assert_eq!(window.title(), "headless test");
                self.started.set(true);
            }

            fn on_frame(&mut self, ctx: &mut FrameCtx<'_>) -> AppControl {
                assert!(self.started.get());
                assert_eq!(ctx.surface_size, (320, 240));
                *ctx.clear_color = Color::WHITE;
                AppControl::Continue
            }

            fn on_stop(&mut self, stats: &RunStats) {
                self.stopped_after.set(stats.frames);
            }
        }

        let started = Rc::new(Cell::new(false));
        let stopped_after = Rc::new(Cell::new(0));
        let mut core = Core::create(headless(Some(2))).unwrap();
        core.start_with(Probe {
            started: started.clone(),
            stopped_after: stopped_after.clone(),
        })
        .unwrap();

        assert!(started.get());
        assert_eq!(stopped_after.get(), 2);
    }

    #[test]
    fn release_requests_stop_on_shared_handles() {
        let core = Core::create(headless(None)).unwrap();
        let handle = core.stop_handle();
        core.release();
        assert!(handle.is_requested());
    }

    #[test]
    fn drop_after_run_releases() {
        let handle;
        {
            let mut core = Core::create(headless(Some(1))).unwrap();
            handle = core.stop_handle();
            core.start().unwrap();
        }
        assert!(handle.is_requested());
    }
}
