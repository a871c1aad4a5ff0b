//! Point-in-time view of a stopwatch

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Command, StopwatchState};

/// Serializable status of a stopwatch, suitable for printing or logging
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub state: StopwatchState,
    pub time_left_seconds: u64,
    pub total_seconds: u64,
    pub last_command: Option<Command>,
    pub last_command_time: Option<DateTime<Utc>>,
}

impl Snapshot {
    /// Fraction of the countdown already elapsed, in `[0.0, 1.0]`
    pub fn progress(&self) -> f64 {
        if self.total_seconds == 0 {
            return 1.0;
        }
        let elapsed = self.total_seconds.saturating_sub(self.time_left_seconds);
        elapsed as f64 / self.total_seconds as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn progress_reflects_elapsed_share() {
        let snapshot = Snapshot {
            state: StopwatchState::Running,
            time_left_seconds: 3,
            total_seconds: 4,
            last_command: Some(Command::Start),
            last_command_time: None,
        };
        assert!((snapshot.progress() - 0.25).abs() < f64::EPSILON);
    }

    #[test]
    fn serializes_with_lowercase_names() {
        let snapshot = Snapshot {
            state: StopwatchState::Paused,
            time_left_seconds: 4,
            total_seconds: 5,
            last_command: Some(Command::Pause),
            last_command_time: None,
        };
        let json = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(json["state"], "paused");
        assert_eq!(json["last_command"], "pause");
        assert_eq!(json["time_left_seconds"], 4);
    }
}
