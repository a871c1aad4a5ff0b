//! State management module
//!
//! This module contains the lifecycle types and the guarded store shared by
//! the command surface and the countdown loop.

pub mod stopwatch_state;
pub mod store;
pub mod snapshot;

// Re-export main types
pub use stopwatch_state::{Command, Completion, StopwatchState};
pub use store::StateStore;
pub use snapshot::Snapshot;
