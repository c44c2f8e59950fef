use std::fmt;

/// Lifecycle state of a [`Core`](crate::Core).
///
/// `Created -> Running -> Stopped -> Released`, or `Created -> Released`.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum CoreState {
    Created,
    Running,
    Stopped,
    Released,
}

impl CoreState {
    pub fn can_start(self) -> bool {
        self == CoreState::Created
    }

    pub fn is_released(self) -> bool {
        self == CoreState::Released
    }
}

impl fmt::Display for CoreState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            CoreState::Created => "created",
            CoreState::Running => "running",
            CoreState::Stopped => "stopped",
            CoreState::Released => "released",
        })
    }
}
