use anyhow::{anyhow, Context, Result};
use log::{debug, error, info};
use ouroboros::self_referencing;

use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Fullscreen, Window as OsWindow, WindowId};

use crate::core::{App, AppControl, ExitReason, FrameCtx, LoopSettings, RunStats};
use crate::device::{Gpu, GpuInit, SurfaceErrorAction};
use crate::paint::Color;
use crate::time::FrameClock;

use super::Window;

/// Opens the OS window described by `window` and runs frames until a stop
/// condition is met.
///
/// Must be called on the thread the platform allows to own an event loop
/// (the main thread on macOS). winit permits one event loop per process.
pub(crate) fn run<A: App>(
    window: &Window,
    gpu_init: GpuInit,
    settings: &LoopSettings,
    app: &mut A,
) -> Result<RunStats> {
    let event_loop = EventLoop::new().context("failed to create winit EventLoop")?;
    let mut state = LoopState::new(window, gpu_init, settings, app);

    event_loop
        .run_app(&mut state)
        .context("winit event loop terminated with error")?;

    state.finish()
}

#[self_referencing]
struct WindowEntry {
    window: OsWindow,

    #[borrows(window)]
    #[covariant]
    gpu: Gpu<'this>,
}

struct LoopState<'a, A: App> {
    desc: &'a Window,
    gpu_init: GpuInit,
    settings: &'a LoopSettings,
    app: &'a mut A,

    entry: Option<WindowEntry>,
    clock: FrameClock,
    clear_color: Color,
    frames: u64,

    exit: Option<ExitReason>,
    failure: Option<anyhow::Error>,
}

impl<'a, A: App> LoopState<'a, A> {
    fn new(desc: &'a Window, gpu_init: GpuInit, settings: &'a LoopSettings, app: &'a mut A) -> Self {
        Self {
            desc,
            gpu_init,
            settings,
            app,
            entry: None,
            clock: FrameClock::with_clamps(settings.dt_min, settings.dt_max),
            clear_color: settings.clear_color,
            frames: 0,
            exit: None,
            failure: None,
        }
    }

    fn request_exit(&mut self, event_loop: &ActiveEventLoop, reason: ExitReason) {
        if self.exit.is_none() {
            debug!("exit requested: {reason:?}");
            self.exit = Some(reason);
        }
        event_loop.exit();
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, err: anyhow::Error) {
        error!("{err:#}");
        self.failure.get_or_insert(err);
        event_loop.exit();
    }

    fn open_window(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let mut attrs = OsWindow::default_attributes()
            .with_title(self.desc.title())
            .with_inner_size(PhysicalSize::new(self.desc.width(), self.desc.height()));

        if self.desc.is_fullscreen() {
            attrs = attrs.with_fullscreen(Some(Fullscreen::Borderless(None)));
        } else if self.settings.maximized {
            attrs = attrs.with_maximized(true);
        }

        let window = event_loop
            .create_window(attrs)
            .context("failed to create window")?;

        let gpu_init = self.gpu_init.clone();
        let entry = WindowEntryTryBuilder {
            window,
            gpu_builder: |w| pollster::block_on(Gpu::new(w, gpu_init)),
        }
        .try_build()
        .context("GPU initialization failed for window")?;

        info!(
            "window opened: {:?} {}x{} ({})",
            self.desc.title(),
            self.desc.width(),
            self.desc.height(),
            self.desc.mode()
        );

        self.entry = Some(entry);
        Ok(())
    }

    /// Drives one frame: hook, clear, present.
    fn frame(&mut self, event_loop: &ActiveEventLoop) {
        if self.settings.stop.is_requested() {
            self.request_exit(event_loop, ExitReason::StopRequested);
            return;
        }

        let Some(entry) = self.entry.as_mut() else {
            return;
        };

        let time = self.clock.tick();
        let size = entry.borrow_gpu().size();

        let control = {
            let mut ctx = FrameCtx::new(
                self.desc,
                time,
                (size.width, size.height),
                &mut self.clear_color,
                &self.settings.stop,
            );
            self.app.on_frame(&mut ctx)
        };
        self.frames += 1;

        let clear_color = self.clear_color;
        let presented = entry.with_mut(|fields| {
            fields.window.pre_present_notify();
            fields.gpu.present_clear(clear_color)
        });

        if presented == Err(SurfaceErrorAction::Fatal) {
            self.fail(event_loop, anyhow!("surface lost beyond recovery"));
            return;
        }

        if control == AppControl::Exit {
            self.request_exit(event_loop, ExitReason::AppExit);
        }
    }

    fn finish(self) -> Result<RunStats> {
        if let Some(err) = self.failure {
            return Err(err);
        }

        Ok(RunStats {
            frames: self.frames,
            reason: self.exit.unwrap_or(ExitReason::WindowClosed),
        })
    }
}

impl<A: App> ApplicationHandler for LoopState<'_, A> {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.entry.is_some() {
            return;
        }

        if let Err(e) = self.open_window(event_loop) {
            self.fail(event_loop, e);
            return;
        }

        self.app.on_start(self.desc);
        self.clock.reset();

        if let Some(entry) = &self.entry {
            entry.with_window(|w| w.request_redraw());
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        if self.exit.is_some() || self.failure.is_some() {
            event_loop.exit();
            return;
        }

        if self.settings.stop.is_requested() {
            self.request_exit(event_loop, ExitReason::StopRequested);
            return;
        }

        // The engine loop renders continuously.
        event_loop.set_control_flow(ControlFlow::Poll);
        if let Some(entry) = &self.entry {
            entry.with_window(|w| w.request_redraw());
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _window_id: WindowId, event: WindowEvent) {
        if self.exit.is_some() || self.failure.is_some() {
            event_loop.exit();
            return;
        }

        match event {
            WindowEvent::CloseRequested => {
                info!("window close requested");
                self.request_exit(event_loop, ExitReason::WindowClosed);
            }

            WindowEvent::Resized(new_size) => {
                if let Some(entry) = self.entry.as_mut() {
                    entry.with_gpu_mut(|gpu| gpu.resize(new_size));
                }
                self.app.on_resize(new_size.width, new_size.height);
            }

            WindowEvent::ScaleFactorChanged { .. } => {
                if let Some(entry) = self.entry.as_mut() {
                    let new_size = entry.with_window(|w| w.inner_size());
                    entry.with_gpu_mut(|gpu| gpu.resize(new_size));
                }
            }

            WindowEvent::RedrawRequested => self.frame(event_loop),

            _ => {}
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        // GPU surface and OS window are torn down while the loop still exists.
        self.entry = None;
        debug!("windowed loop exiting after {} frames", self.frames);
    }
}
