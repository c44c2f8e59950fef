use std::fmt;

use crate::core::CoreState;

/// Lifecycle and validation failures reported by the engine.
///
/// Platform and GPU failures inside the run loop are not represented here; they
/// surface as `anyhow::Error` with context from [`Core::start`](crate::Core::start).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// Width or height is zero or does not fit the native `int32` layout.
    InvalidDimensions { width: i64, height: i64 },

    /// Title cannot be represented as a C string.
    InvalidTitle(String),

    /// An operation was attempted in a lifecycle state that does not allow it.
    InvalidState { op: &'static str, state: CoreState },

    /// A configuration override carried an unparsable value.
    InvalidConfig { key: String, value: String },

    /// A null handle or pointer crossed the native boundary.
    NullHandle(&'static str),
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineError::InvalidDimensions { width, height } => {
                write!(f, "invalid window dimensions {width}x{height}: both must be in 1..={}", i32::MAX)
            }
            EngineError::InvalidTitle(reason) => write!(f, "invalid window title: {reason}"),
            EngineError::InvalidState { op, state } => {
                write!(f, "cannot {op} a core in state {state}")
            }
            EngineError::InvalidConfig { key, value } => {
                write!(f, "invalid value {value:?} for {key}")
            }
            EngineError::NullHandle(what) => write!(f, "null {what}"),
        }
    }
}

impl std::error::Error for EngineError {}
