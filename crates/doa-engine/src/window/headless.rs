use log::debug;

use crate::core::{App, AppControl, ExitReason, FrameCtx, HeadlessConfig, LoopSettings, RunStats};
use crate::time::FrameClock;

use super::Window;

/// Runs frames without an OS window until a stop condition is met.
pub(crate) fn run<A: App>(
    window: &Window,
    config: &HeadlessConfig,
    settings: &LoopSettings,
    app: &mut A,
) -> RunStats {
    let mut clock = FrameClock::with_clamps(settings.dt_min, settings.dt_max);
    let mut clear_color = settings.clear_color;
    let mut frames = 0u64;

    debug!("headless loop entered (max_frames = {:?})", config.max_frames);
    app.on_start(window);
    clock.reset();

    let reason = loop {
        if settings.stop.is_requested() {
            break ExitReason::StopRequested;
        }
        if config.max_frames.is_some_and(|max| frames >= max) {
            break ExitReason::FrameLimit;
        }

        let time = clock.tick();
        let control = {
            let mut ctx = FrameCtx::new(window, time, window.size(), &mut clear_color, &settings.stop);
            app.on_frame(&mut ctx)
        };
        frames += 1;

        if control == AppControl::Exit {
            break ExitReason::AppExit;
        }

        if let Some(interval) = config.frame_interval {
            std::thread::sleep(interval);
        }
    };

    RunStats { frames, reason }
}
