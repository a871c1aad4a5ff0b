//! Utility functions module
//!
//! This module contains utility functions used throughout the crate.

pub mod signals;

// Re-export main functions
pub use signals::{cancel_on_interrupt, forward_interrupts, process_interrupt};
