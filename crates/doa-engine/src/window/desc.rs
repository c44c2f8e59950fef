use std::fmt;

use crate::error::EngineError;

/// Display mode requested at creation.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Default)]
pub enum WindowMode {
    #[default]
    Windowed,
    /// Borderless fullscreen on the current monitor.
    Fullscreen,
}

impl fmt::Display for WindowMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            WindowMode::Windowed => "windowed",
            WindowMode::Fullscreen => "fullscreen",
        })
    }
}

/// Read-only descriptor of a Core's window.
///
/// The title is owned, so clones stay valid after the Core is released.
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub struct Window {
    width: u32,
    height: u32,
    title: String,
    mode: WindowMode,
}

impl Window {
    /// Largest accepted width/height; the native layout stores them as `int32`.
    pub const MAX_EXTENT: u32 = i32::MAX as u32;

    pub(crate) fn new(
        width: u32,
        height: u32,
        title: String,
        mode: WindowMode,
    ) -> Result<Self, EngineError> {
        let valid = |v: u32| (1..=Self::MAX_EXTENT).contains(&v);
        if !valid(width) || !valid(height) {
            return Err(EngineError::InvalidDimensions {
                width: width.into(),
                height: height.into(),
            });
        }

        if let Some(at) = title.find('\0') {
            return Err(EngineError::InvalidTitle(format!(
                "interior NUL byte at offset {at}"
            )));
        }

        Ok(Self {
            width,
            height,
            title,
            mode,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// `(width, height)` in physical pixels.
    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn mode(&self) -> WindowMode {
        self.mode
    }

    pub fn is_fullscreen(&self) -> bool {
        self.mode == WindowMode::Fullscreen
    }
}
