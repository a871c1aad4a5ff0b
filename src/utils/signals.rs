//! Bridging process termination signals into cancellation tokens

use std::sync::{Mutex, PoisonError};

use futures::stream::StreamExt;
use signal_hook_tokio::Signals;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Signals treated as an interruption request (SIGTERM, SIGINT)
pub const INTERRUPT_SIGNALS: [i32; 2] = [
    signal_hook::consts::SIGTERM,
    signal_hook::consts::SIGINT,
];

/// Process-wide listener shared by every interruptible stopwatch
static PROCESS_INTERRUPT: Mutex<Option<Listener>> = Mutex::new(None);

#[derive(Debug)]
struct Listener {
    token: CancellationToken,
    task: JoinHandle<()>,
}

/// Cancel `token` when the process receives SIGTERM or SIGINT.
///
/// Installing the handlers replaces the default action of both signals for
/// the rest of the process; signal-hook cannot restore it. The listener task
/// exits once `token` is cancelled, after which the signals are ignored. Must
/// be called from within a Tokio runtime.
pub fn forward_interrupts(token: CancellationToken) -> std::io::Result<JoinHandle<()>> {
    let mut signals = Signals::new(&INTERRUPT_SIGNALS)?;
    let handle = signals.handle();

    Ok(tokio::spawn(async move {
        tokio::select! {
            Some(signal) = signals.next() => {
                info!("Received signal: {}", signal);
                token.cancel();
            }
            _ = token.cancelled() => {
                debug!("Interrupt token cancelled elsewhere, closing signal stream");
            }
        }
        handle.close();
    }))
}

/// Token cancelled by the first SIGTERM or SIGINT the process receives.
///
/// Handlers are registered on first use and shared from then on. Once
/// cancelled the token stays cancelled: the process has been asked to stop.
/// If the runtime that hosted the listener has shut down, the listener is
/// registered again on the current one.
pub fn process_interrupt() -> std::io::Result<CancellationToken> {
    let mut slot = PROCESS_INTERRUPT.lock().unwrap_or_else(PoisonError::into_inner);

    if let Some(listener) = slot.as_ref() {
        if listener.token.is_cancelled() || !listener.task.is_finished() {
            return Ok(listener.token.clone());
        }
        debug!("Signal listener runtime is gone, registering again");
    }

    let token = slot
        .as_ref()
        .map(|listener| listener.token.clone())
        .unwrap_or_default();
    let task = forward_interrupts(token.clone())?;
    *slot = Some(Listener { token: token.clone(), task });

    Ok(token)
}

/// Cancel `scope` on the next process interrupt.
///
/// The bridge task ends as soon as `scope` is cancelled for any reason, so a
/// finished countdown leaves nothing behind but the shared listener.
pub fn cancel_on_interrupt(scope: CancellationToken) -> std::io::Result<JoinHandle<()>> {
    let process = process_interrupt()?;

    Ok(tokio::spawn(async move {
        tokio::select! {
            _ = process.cancelled() => scope.cancel(),
            _ = scope.cancelled() => {}
        }
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn listener_exits_when_token_is_cancelled() {
        let token = CancellationToken::new();
        let listener = forward_interrupts(token.clone()).unwrap();

        token.cancel();
        listener.await.unwrap();
        assert!(token.is_cancelled());
    }

    #[tokio::test]
    async fn bridge_ends_with_its_scope() {
        let scope = CancellationToken::new();
        let bridge = cancel_on_interrupt(scope.clone()).unwrap();

        scope.cancel();
        bridge.await.unwrap();
        assert!(!process_interrupt().unwrap().is_cancelled());
    }
}
