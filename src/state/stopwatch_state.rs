//! Lifecycle states, commands and completion reasons

use std::fmt;

use serde::{Deserialize, Serialize};

/// Lifecycle state of a stopwatch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StopwatchState {
    /// Not counting; either never started or finished
    #[default]
    Stopped,
    /// Counting down, one tick per second
    Running,
    /// Counting suspended; timer beats are dropped
    Paused,
}

impl StopwatchState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Stopped => "stopped",
            Self::Running => "running",
            Self::Paused => "paused",
        }
    }

    pub fn is_running(&self) -> bool {
        matches!(self, Self::Running)
    }
}

impl fmt::Display for StopwatchState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Commands accepted by the stopwatch, recorded as the last applied action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Command {
    Start,
    Stop,
    Pause,
    Resume,
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Start => "start",
            Self::Stop => "stop",
            Self::Pause => "pause",
            Self::Resume => "resume",
        };
        f.write_str(name)
    }
}

/// Why the countdown ended; carried by the completion signal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Completion {
    /// Remaining time reached zero
    Expired,
    /// `stop()` was called
    Stopped,
    /// The interrupt token fired (process signal or injected cancellation)
    Interrupted,
}

impl fmt::Display for Completion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Expired => "expired",
            Self::Stopped => "stopped",
            Self::Interrupted => "interrupted",
        };
        f.write_str(name)
    }
}
