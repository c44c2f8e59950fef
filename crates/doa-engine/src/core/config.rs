use std::time::Duration;

use crate::device::GpuInit;
use crate::error::EngineError;
use crate::paint::Color;
use crate::time::FrameClock;

/// Environment variable selecting the backend (`windowed` or `headless`).
pub const ENV_BACKEND: &str = "DOA_BACKEND";
/// Environment variable setting the headless frame limit.
pub const ENV_MAX_FRAMES: &str = "DOA_MAX_FRAMES";
/// Environment variable toggling fullscreen.
pub const ENV_FULLSCREEN: &str = "DOA_FULLSCREEN";
/// Environment variable toggling a maximized window.
pub const ENV_MAXIMIZED: &str = "DOA_MAXIMIZED";

/// Which loop `Core::start` runs.
#[derive(Debug, Clone)]
pub enum Backend {
    /// One OS window with a GPU surface cleared and presented every frame.
    Windowed(GpuInit),
    /// No OS window and no GPU.
    Headless(HeadlessConfig),
}

impl Default for Backend {
    fn default() -> Self {
        Backend::Windowed(GpuInit::default())
    }
}

/// Headless loop parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeadlessConfig {
    /// Stop after this many frames. `None` runs until stopped.
    pub max_frames: Option<u64>,

    /// Sleep between frames. `None` runs frames back to back.
    pub frame_interval: Option<Duration>,
}

/// Parameters a [`Core`](crate::Core) is created with.
#[derive(Debug, Clone)]
pub struct CoreConfig {
    pub width: u32,
    pub height: u32,
    pub title: String,
    pub fullscreen: bool,
    /// Open the window maximized. Ignored in fullscreen and headless mode.
    pub maximized: bool,
    pub backend: Backend,
    pub clear_color: Color,
    pub dt_min: Duration,
    pub dt_max: Duration,
}

impl CoreConfig {
    pub fn new(width: u32, height: u32, title: impl Into<String>) -> Self {
        Self {
            width,
            height,
            title: title.into(),
            fullscreen: false,
            maximized: false,
            backend: Backend::default(),
            clear_color: Color::BLACK,
            dt_min: FrameClock::DEFAULT_DT_MIN,
            dt_max: FrameClock::DEFAULT_DT_MAX,
        }
    }

    pub fn fullscreen(mut self, fullscreen: bool) -> Self {
        self.fullscreen = fullscreen;
        self
    }

    pub fn maximized(mut self, maximized: bool) -> Self {
        self.maximized = maximized;
        self
    }

    pub fn backend(mut self, backend: Backend) -> Self {
        self.backend = backend;
        self
    }

    /// Selects the headless backend with an optional frame limit.
    pub fn headless(self, max_frames: Option<u64>) -> Self {
        self.backend(Backend::Headless(HeadlessConfig {
            max_frames,
            frame_interval: None,
        }))
    }

    pub fn clear_color(mut self, color: Color) -> Self {
        self.clear_color = color;
        self
    }

    /// Sets the delta-time clamps of the frame clock.
    pub fn frame_clamps(mut self, dt_min: Duration, dt_max: Duration) -> Self {
        self.dt_min = dt_min;
        self.dt_max = dt_max;
        self
    }

    pub fn is_headless(&self) -> bool {
        matches!(self.backend, Backend::Headless(_))
    }

    /// Checks the settings that are not part of the window descriptor.
    pub(crate) fn validate(&self) -> Result<(), EngineError> {
        if self.dt_min > self.dt_max {
            return Err(EngineError::InvalidConfig {
                key: "frame_clamps".into(),
                value: format!("{:?} > {:?}", self.dt_min, self.dt_max),
            });
        }
        Ok(())
    }

    /// Applies `DOA_BACKEND`, `DOA_MAX_FRAMES`, `DOA_FULLSCREEN` and
    /// `DOA_MAXIMIZED` from the process environment.
    pub fn with_env_overrides(self) -> Result<Self, EngineError> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    /// Applies overrides read through `lookup`.
    ///
    /// The backend is applied first so that a frame limit given alongside
    /// `DOA_BACKEND=headless` lands on the headless config.
    pub fn apply_overrides<F>(mut self, lookup: F) -> Result<Self, EngineError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup(ENV_BACKEND) {
            match value.trim().to_ascii_lowercase().as_str() {
                "windowed" => {
                    if self.is_headless() {
                        self.backend = Backend::Windowed(GpuInit::default());
                    }
                }
                "headless" => {
                    if !self.is_headless() {
                        self.backend = Backend::Headless(HeadlessConfig::default());
                    }
                }
                _ => return Err(invalid(ENV_BACKEND, value)),
            }
        }

        if let Some(value) = lookup(ENV_MAX_FRAMES) {
            let frames: u64 = value
                .trim()
                .parse()
                .map_err(|_| invalid(ENV_MAX_FRAMES, value.clone()))?;
            match &mut self.backend {
                Backend::Headless(h) => h.max_frames = Some(frames),
                Backend::Windowed(_) => {
                    log::warn!("{ENV_MAX_FRAMES}={frames} ignored: backend is windowed");
                }
            }
        }

        if let Some(value) = lookup(ENV_FULLSCREEN) {
            self.fullscreen = parse_flag(&value).ok_or_else(|| invalid(ENV_FULLSCREEN, value.clone()))?;
        }

        if let Some(value) = lookup(ENV_MAXIMIZED) {
            self.maximized = parse_flag(&value).ok_or_else(|| invalid(ENV_MAXIMIZED, value.clone()))?;
        }

        Ok(self)
    }
}

fn invalid(key: &str, value: String) -> EngineError {
    EngineError::InvalidConfig {
        key: key.to_string(),
        value,
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env<'a>(pairs: &'a [(&'a str, &'a str)]) -> impl Fn(&str) -> Option<String> + 'a {
        move |key: &str| {
            pairs
                .iter()
                .find(|(k, _)| *k == key)
                .map(|(_, v)| v.to_string())
        }
    }

    fn base() -> CoreConfig {
        CoreConfig::new(800, 600, "test")
    }

    #[test]
    fn defaults_are_windowed_and_black() {
        let cfg = base();
        assert!(!cfg.is_headless());
        assert!(!cfg.fullscreen);
        assert!(!cfg.maximized);
        assert_eq!(cfg.clear_color, Color::BLACK);
    }

    #[test]
    fn no_overrides_is_identity() {
        let cfg = base().apply_overrides(env(&[])).unwrap();
        assert!(!cfg.is_headless());
        assert!(!cfg.fullscreen);
    }

    #[test]
    fn backend_and_frame_limit_override() {
        let cfg = base()
            .apply_overrides(env(&[(ENV_BACKEND, "Headless"), (ENV_MAX_FRAMES, " 12 ")]))
            .unwrap();
        match cfg.backend {
            Backend::Headless(h) => assert_eq!(h.max_frames, Some(12)),
            Backend::Windowed(_) => panic!("expected headless backend"),
        }
    }

    #[test]
    fn windowed_override_replaces_headless() {
        let cfg = base()
            .headless(Some(1))
            .apply_overrides(env(&[(ENV_BACKEND, "windowed")]))
            .unwrap();
        assert!(!cfg.is_headless());
    }

    #[test]
    fn frame_limit_is_ignored_for_windowed() {
        let cfg = base().apply_overrides(env(&[(ENV_MAX_FRAMES, "3")])).unwrap();
        assert!(!cfg.is_headless());
    }

    #[test]
    fn fullscreen_flag_spellings() {
        for (raw, expected) in [("1", true), ("TRUE", true), ("yes", true), ("0", false), ("off", false)] {
            let cfg = base().apply_overrides(env(&[(ENV_FULLSCREEN, raw)])).unwrap();
            assert_eq!(cfg.fullscreen, expected, "{raw}");
        }
    }

    #[test]
    fn maximized_override() {
        let cfg = base().apply_overrides(env(&[(ENV_MAXIMIZED, "on")])).unwrap();
        assert!(cfg.maximized);
        assert!(base().apply_overrides(env(&[(ENV_MAXIMIZED, "2")])).is_err());
    }

    #[test]
    fn bad_values_are_rejected_with_key() {
        let err = base()
            .apply_overrides(env(&[(ENV_BACKEND, "vulkan")]))
            .unwrap_err();
        assert_eq!(
            err,
            EngineError::InvalidConfig { key: ENV_BACKEND.into(), value: "vulkan".into() }
        );

        let err = base()
            .headless(None)
            .apply_overrides(env(&[(ENV_MAX_FRAMES, "-1")]))
            .unwrap_err();
        assert!(matches!(err, EngineError::InvalidConfig { ref key, .. } if key == ENV_MAX_FRAMES));

        assert!(base().apply_overrides(env(&[(ENV_FULLSCREEN, "maybe")])).is_err());
    }

    #[test]
    fn inverted_clamps_fail_validation() {
        let cfg = base().frame_clamps(Duration::from_millis(10), Duration::from_millis(1));
        assert!(cfg.validate().is_err());
        assert!(base().validate().is_ok());
    }
}
