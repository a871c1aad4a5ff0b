//! Countdown loop background task

use std::{sync::Arc, time::Duration};
use tokio::{
    sync::{mpsc, oneshot},
    time::{interval_at, Instant, MissedTickBehavior},
};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::state::{Completion, StateStore, StopwatchState};

/// Everything the loop owns for the lifetime of one countdown.
///
/// Dropping this value closes the tick channel and releases the timer, so
/// teardown is just the end of [`Countdown::run`].
#[derive(Debug)]
pub struct Countdown {
    pub store: Arc<StateStore>,
    pub ticks: mpsc::Sender<Duration>,
    pub done: oneshot::Sender<Completion>,
    pub stop: CancellationToken,
    pub interrupt: CancellationToken,
    pub period: Duration,
}

impl Countdown {
    /// Run until expiry, stop or interruption; fires the completion signal
    /// exactly once on the way out.
    pub async fn run(self) {
        let Countdown { store, ticks, done, stop, interrupt, period } = self;

        debug!("Countdown loop started with {} ticks left", store.remaining());

        let mut timer = interval_at(Instant::now() + period, period);
        timer.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut consumer_gone = false;

        let completion = loop {
            tokio::select! {
                biased;

                _ = stop.cancelled() => break Completion::Stopped,
                _ = interrupt.cancelled() => break Completion::Interrupted,
                _ = timer.tick() => {
                    // Beats observed while paused (or while a stop is in flight) are dropped
                    if !store.state().is_running() {
                        continue;
                    }

                    let left = store.decrement();
                    debug!("ticks left {}", left);

                    if !consumer_gone {
                        tokio::select! {
                            biased;

                            _ = stop.cancelled() => break Completion::Stopped,
                            _ = interrupt.cancelled() => break Completion::Interrupted,
                            delivered = hand_off(&ticks, Duration::from_secs(left)) => {
                                if !delivered {
                                    debug!("Tick receiver dropped, counting without publishing");
                                    consumer_gone = true;
                                }
                            }
                        }
                    }

                    if left == 0 {
                        break Completion::Expired;
                    }
                }
            }
        };

        store.set_state(StopwatchState::Stopped);
        if done.send(completion).is_err() {
            debug!("Completion receiver dropped before the countdown ended");
        }
        // Releases the signal bridge scoped to this countdown
        interrupt.cancel();

        info!("Countdown ended: {}", completion);
    }
}

/// Deliver one tick and wait until the consumer has taken it.
///
/// The channel has a single slot, so getting a permit back means the slot was
/// drained. Returns false once the receiver is gone.
async fn hand_off(ticks: &mpsc::Sender<Duration>, left: Duration) -> bool {
    if ticks.send(left).await.is_err() {
        return false;
    }
    ticks.reserve().await.is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    type Receivers = (mpsc::Receiver<Duration>, oneshot::Receiver<Completion>);

    fn countdown(ticks: u64) -> (Countdown, Receivers) {
        let store = Arc::new(StateStore::new(ticks));
        store.set_state(StopwatchState::Running);
        let (tick_tx, tick_rx) = mpsc::channel(1);
        let (done_tx, done_rx) = oneshot::channel();
        let countdown = Countdown {
            store,
            ticks: tick_tx,
            done: done_tx,
            stop: CancellationToken::new(),
            interrupt: CancellationToken::new(),
            period: Duration::from_secs(1),
        };
        (countdown, (tick_rx, done_rx))
    }

    #[tokio::test(start_paused = true)]
    async fn expires_after_publishing_every_tick() {
        let (countdown, (mut ticks, done)) = countdown(2);
        let store = Arc::clone(&countdown.store);
        tokio::spawn(countdown.run());

        let mut seen = Vec::new();
        while let Some(left) = ticks.recv().await {
            seen.push(left.as_secs());
        }

        assert_eq!(seen, vec![1, 0]);
        assert_eq!(done.await.unwrap(), Completion::Expired);
        assert_eq!(store.state(), StopwatchState::Stopped);
    }

    #[tokio::test(start_paused = true)]
    async fn interrupt_ends_loop_while_handoff_is_blocked() {
        let (countdown, (_ticks, done)) = countdown(5);
        let interrupt = countdown.interrupt.clone();
        let store = Arc::clone(&countdown.store);
        tokio::spawn(countdown.run());

        // Nobody reads ticks, so the loop parks in the first handoff
        tokio::time::sleep(Duration::from_secs(3)).await;
        assert_eq!(store.remaining(), 4);

        interrupt.cancel();
        assert_eq!(done.await.unwrap(), Completion::Interrupted);
        assert_eq!(store.state(), StopwatchState::Stopped);
    }

    #[tokio::test(start_paused = true)]
    async fn keeps_counting_when_tick_receiver_is_dropped() {
        let (countdown, (ticks, done)) = countdown(3);
        drop(ticks);
        tokio::spawn(countdown.run());

        assert_eq!(done.await.unwrap(), Completion::Expired);
    }
}
