//! Guarded lifecycle state and remaining-ticks counter

use std::sync::{Mutex, PoisonError, RwLock};

use super::StopwatchState;

/// Shared state between the command surface and the countdown loop.
///
/// `state` and `remaining` each sit behind their own guard so a time-left
/// query never waits on a state transition. Critical sections never panic, so
/// a poisoned guard still holds a consistent value and is recovered.
#[derive(Debug)]
pub struct StateStore {
    state: Mutex<StopwatchState>,
    remaining: RwLock<u64>,
}

impl StateStore {
    /// Create a stopped store holding `ticks` remaining seconds
    pub fn new(ticks: u64) -> Self {
        Self {
            state: Mutex::new(StopwatchState::Stopped),
            remaining: RwLock::new(ticks),
        }
    }

    /// Current lifecycle state
    pub fn state(&self) -> StopwatchState {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Unconditionally overwrite the lifecycle state
    pub fn set_state(&self, next: StopwatchState) {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner) = next;
    }

    /// Move from `from` to `to` atomically.
    ///
    /// Returns the state actually observed when it differs from `from`; the
    /// stored state is left untouched in that case.
    pub fn transition(
        &self,
        from: StopwatchState,
        to: StopwatchState,
    ) -> Result<(), StopwatchState> {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        if *state != from {
            return Err(*state);
        }
        *state = to;
        Ok(())
    }

    /// Seconds left on the countdown
    pub fn remaining(&self) -> u64 {
        *self.remaining.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Decrement the counter by one second and return the new value.
    /// Saturates at zero.
    pub fn decrement(&self) -> u64 {
        let mut remaining = self.remaining.write().unwrap_or_else(PoisonError::into_inner);
        *remaining = remaining.saturating_sub(1);
        *remaining
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transition_requires_expected_state() {
        let store = StateStore::new(3);
        assert_eq!(
            store.transition(StopwatchState::Running, StopwatchState::Paused),
            Err(StopwatchState::Stopped)
        );
        assert_eq!(store.state(), StopwatchState::Stopped);

        assert_eq!(store.transition(StopwatchState::Stopped, StopwatchState::Running), Ok(()));
        assert_eq!(store.state(), StopwatchState::Running);
    }

    #[test]
    fn decrement_counts_down_to_zero_and_stays() {
        let store = StateStore::new(2);
        assert_eq!(store.decrement(), 1);
        assert_eq!(store.decrement(), 0);
        assert_eq!(store.decrement(), 0);
        assert_eq!(store.remaining(), 0);
    }
}
