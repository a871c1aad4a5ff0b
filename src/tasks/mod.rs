//! Background tasks module
//!
//! This module contains the task that drives a running stopwatch.

pub mod countdown;

// Re-export main types
pub use countdown::Countdown;
