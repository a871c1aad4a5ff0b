//! Stopwatch construction, commands and queries

use std::{
    sync::{Arc, Mutex, PoisonError},
    time::Duration,
};
use chrono::{DateTime, Utc};
use tokio::{
    runtime::Handle,
    sync::{mpsc, oneshot},
};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::{
    error::StopwatchError,
    state::{Command, Completion, Snapshot, StateStore, StopwatchState},
    tasks::Countdown,
    utils::cancel_on_interrupt,
};

/// Shortest accepted countdown, in ticks
pub const MIN_TICKS: u64 = 1;
/// Longest accepted countdown, in ticks (24 hours)
pub const MAX_TICKS: u64 = 86_400;
/// Interval between ticks
pub const TICK_PERIOD: Duration = Duration::from_secs(1);

/// Remaining time, one value per elapsed second.
///
/// Goes quiet as soon as the countdown is stopped or interrupted: a tick still
/// sitting in the channel at that point is never returned.
#[derive(Debug)]
pub struct TickStream {
    rx: mpsc::Receiver<Duration>,
    stop: CancellationToken,
    interrupt: CancellationToken,
}

impl TickStream {
    /// Next remaining-time value, or `None` once the countdown has ended
    pub async fn recv(&mut self) -> Option<Duration> {
        if self.stop.is_cancelled() || self.interrupt.is_cancelled() {
            return None;
        }
        tokio::select! {
            biased;

            _ = self.stop.cancelled() => None,
            _ = self.interrupt.cancelled() => None,
            tick = self.rx.recv() => tick,
        }
    }
}

/// Fires once when the countdown ends
pub type DoneSignal = oneshot::Receiver<Completion>;

/// Channel halves allocated at construction and handed out by `start`
#[derive(Debug)]
struct Channels {
    tick_tx: mpsc::Sender<Duration>,
    tick_rx: mpsc::Receiver<Duration>,
    done_tx: oneshot::Sender<Completion>,
    done_rx: DoneSignal,
}

impl Channels {
    fn new() -> Self {
        // One slot: together with the loop's handoff this behaves as a rendezvous
        let (tick_tx, tick_rx) = mpsc::channel(1);
        let (done_tx, done_rx) = oneshot::channel();
        Self { tick_tx, tick_rx, done_tx, done_rx }
    }
}

/// A countdown that ticks once per second and can be paused, resumed and
/// stopped from any task.
///
/// Commands take `&self`; share the stopwatch with `Arc` to drive it from
/// several tasks. Each instance counts down at most once.
#[derive(Debug)]
pub struct Stopwatch {
    total: Duration,
    store: Arc<StateStore>,
    /// Serializes start/stop/pause/resume
    command_lock: Mutex<()>,
    channels: Mutex<Option<Channels>>,
    stop: CancellationToken,
    interrupt: Option<CancellationToken>,
    listen_for_signals: bool,
    last_command: Mutex<Option<(Command, DateTime<Utc>)>>,
}

impl Stopwatch {
    /// Create a stopped stopwatch for `duration`, truncated to whole seconds.
    ///
    /// Fails with [`StopwatchError::InvalidDuration`] unless the duration is
    /// between one second and 24 hours.
    pub fn new(duration: Duration) -> Result<Self, StopwatchError> {
        let ticks = duration.as_secs();
        if !(MIN_TICKS..=MAX_TICKS).contains(&ticks) {
            return Err(StopwatchError::InvalidDuration { duration });
        }

        Ok(Self {
            total: Duration::from_secs(ticks),
            store: Arc::new(StateStore::new(ticks)),
            command_lock: Mutex::new(()),
            channels: Mutex::new(Some(Channels::new())),
            stop: CancellationToken::new(),
            interrupt: None,
            listen_for_signals: false,
            last_command: Mutex::new(None),
        })
    }

    /// Interrupt the countdown when `token` is cancelled.
    ///
    /// The loop waits on a child of `token`; the stopwatch never cancels the
    /// caller's token itself.
    pub fn with_interrupt(mut self, token: CancellationToken) -> Self {
        self.interrupt = Some(token);
        self
    }

    /// Interrupt the countdown on SIGINT or SIGTERM.
    ///
    /// [`Stopwatch::start`] hooks the countdown to the process-wide interrupt
    /// token from [`crate::utils::process_interrupt`]. The OS handlers are
    /// installed once and stay installed, so from then on these signals no
    /// longer terminate the process by default.
    pub fn interruptible(mut self) -> Self {
        self.listen_for_signals = true;
        self
    }

    /// Start counting down.
    ///
    /// Returns the tick stream and the completion signal. Must be called from
    /// within a Tokio runtime. The tick stream is a blocking handoff: the
    /// countdown does not advance past a tick nobody has received.
    pub fn start(&self) -> Result<(TickStream, DoneSignal), StopwatchError> {
        let _guard = self.command_lock.lock().unwrap_or_else(PoisonError::into_inner);

        if self.store.state() != StopwatchState::Stopped {
            return Err(StopwatchError::NotStopped);
        }

        let mut slot = self.channels.lock().unwrap_or_else(PoisonError::into_inner);
        if slot.is_none() {
            return Err(StopwatchError::AlreadyStarted);
        }
        if Handle::try_current().is_err() {
            return Err(StopwatchError::NoRuntime);
        }

        let interrupt = match &self.interrupt {
            Some(token) => token.child_token(),
            None => CancellationToken::new(),
        };
        if self.listen_for_signals {
            cancel_on_interrupt(interrupt.clone())?;
        }

        let Some(channels) = slot.take() else {
            return Err(StopwatchError::AlreadyStarted);
        };
        drop(slot);

        self.store.set_state(StopwatchState::Running);
        self.record(Command::Start);

        let ticks = TickStream {
            rx: channels.tick_rx,
            stop: self.stop.clone(),
            interrupt: interrupt.clone(),
        };
        let countdown = Countdown {
            store: Arc::clone(&self.store),
            ticks: channels.tick_tx,
            done: channels.done_tx,
            stop: self.stop.clone(),
            interrupt,
            period: TICK_PERIOD,
        };
        tokio::spawn(countdown.run());

        info!("Stopwatch started for {}s", self.total.as_secs());
        Ok((ticks, channels.done_rx))
    }

    /// Stop a running countdown; the completion signal fires with no further ticks
    pub fn stop(&self) -> Result<(), StopwatchError> {
        let _guard = self.command_lock.lock().unwrap_or_else(PoisonError::into_inner);

        self.store
            .transition(StopwatchState::Running, StopwatchState::Stopped)
            .map_err(|_| StopwatchError::NotRunning)?;
        self.stop.cancel();
        self.record(Command::Stop);

        info!("Stopwatch stopped with {}s left", self.store.remaining());
        Ok(())
    }

    /// Pause a running countdown; beats while paused are dropped
    pub fn pause(&self) -> Result<(), StopwatchError> {
        let _guard = self.command_lock.lock().unwrap_or_else(PoisonError::into_inner);

        self.store
            .transition(StopwatchState::Running, StopwatchState::Paused)
            .map_err(|_| StopwatchError::NotRunning)?;
        self.record(Command::Pause);

        info!("Stopwatch paused with {}s left", self.store.remaining());
        Ok(())
    }

    /// Resume a paused countdown
    pub fn resume(&self) -> Result<(), StopwatchError> {
        let _guard = self.command_lock.lock().unwrap_or_else(PoisonError::into_inner);

        self.store
            .transition(StopwatchState::Paused, StopwatchState::Running)
            .map_err(|_| StopwatchError::NotPaused)?;
        self.record(Command::Resume);

        info!("Stopwatch resumed with {}s left", self.store.remaining());
        Ok(())
    }

    /// Current lifecycle state
    pub fn state(&self) -> StopwatchState {
        self.store.state()
    }

    /// Time left on the countdown
    pub fn time_left(&self) -> Duration {
        Duration::from_secs(self.store.remaining())
    }

    /// Configured countdown length
    pub fn total(&self) -> Duration {
        self.total
    }

    /// Most recent successfully applied command and when it was applied
    pub fn last_command(&self) -> Option<(Command, DateTime<Utc>)> {
        *self.last_command.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn snapshot(&self) -> Snapshot {
        let last = self.last_command();
        Snapshot {
            state: self.state(),
            time_left_seconds: self.store.remaining(),
            total_seconds: self.total.as_secs(),
            last_command: last.map(|(command, _)| command),
            last_command_time: last.map(|(_, at)| at),
        }
    }

    fn record(&self, command: Command) {
        debug!("Recording command: {}", command);
        let mut last = self.last_command.lock().unwrap_or_else(PoisonError::into_inner);
        *last = Some((command, Utc::now()));
    }
}
