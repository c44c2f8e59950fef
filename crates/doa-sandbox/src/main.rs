use anyhow::{Context, Result};
use doa_engine::logging::{init_logging, LoggingConfig};
use doa_engine::paint::Color;
use doa_engine::{App, AppControl, Core, CoreConfig, FrameCtx, RunStats, Window};

/// Fades the clear color between two tones and reports the frame rate once a second.
struct Sandbox {
    from: Color,
    to: Color,
    window_frames: u64,
    window_start: f32,
}

impl Default for Sandbox {
    fn default() -> Self {
        Self {
            from: Color::from_srgb_u8(26, 3, 30, 255),
            to: Color::from_srgb_u8(40, 90, 140, 255),
            window_frames: 0,
            window_start: 0.0,
        }
    }
}

impl App for Sandbox {
    fn on_start(&mut self, window: &Window) {
        log::info!(
            "sandbox running in {:?} ({}x{}, {})",
            window.title(),
            window.width(),
            window.height(),
            window.mode()
        );
    }

    fn on_frame(&mut self, ctx: &mut FrameCtx<'_>) -> AppControl {
        let t = (ctx.time.elapsed * 0.5).sin() * 0.5 + 0.5;
        *ctx.clear_color = self.from.lerp(self.to, t);

        self.window_frames += 1;
        let span = ctx.time.elapsed - self.window_start;
        if span >= 1.0 {
            log::info!(
                "{:.1} fps, surface {}x{}",
                self.window_frames as f32 / span,
                ctx.surface_size.0,
                ctx.surface_size.1
            );
            self.window_frames = 0;
            self.window_start = ctx.time.elapsed;
        }

        AppControl::Continue
    }

    fn on_resize(&mut self, width: u32, height: u32) {
        log::debug!("surface resized to {width}x{height}");
    }

    fn on_stop(&mut self, stats: &RunStats) {
        log::info!("sandbox finished: {} frames, {:?}", stats.frames, stats.reason);
    }
}

fn main() -> Result<()> {
    init_logging(LoggingConfig::default());

    let config = CoreConfig::new(1280, 720, "DOA Sandbox")
        .with_env_overrides()
        .context("invalid DOA_* environment override")?;

    let mut core = Core::create(config).context("failed to create engine core")?;
    core.start_with(Sandbox::default())?;
    core.release();

    Ok(())
}
