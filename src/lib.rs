//! Countdown Stopwatch - a pausable countdown that ticks once per second
//!
//! A [`Stopwatch`] is created for a duration, started to obtain a tick stream
//! and a completion signal, and then driven with pause, resume and stop
//! commands from any task while a background countdown loop does the work.

pub mod config;
pub mod error;
pub mod scenarios;
pub mod state;
pub mod stopwatch;
pub mod tasks;
pub mod utils;

// Re-export commonly used types
pub use config::Config;
pub use error::StopwatchError;
pub use state::{Command, Completion, Snapshot, StopwatchState};
pub use stopwatch::{DoneSignal, Stopwatch, TickStream};
pub use utils::signals::{forward_interrupts, process_interrupt};
