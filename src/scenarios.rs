//! Demonstration scenarios driven by the binary

use std::{sync::Arc, time::Duration};
use anyhow::Context;
use tokio::{task::JoinHandle, time::sleep};
use tracing::{info, warn};

use crate::{
    config::{Config, Scenario},
    error::StopwatchError,
    state::{Completion, Snapshot},
    stopwatch::{DoneSignal, Stopwatch, TickStream},
};

/// Run one scenario on a fresh, signal-interruptible stopwatch
pub async fn run(config: &Config, scenario: Scenario) -> anyhow::Result<(Completion, Snapshot)> {
    let stopwatch = Arc::new(
        Stopwatch::new(config.duration())
            .with_context(|| format!("cannot create a {}s stopwatch", config.seconds))?
            .interruptible(),
    );

    let completion = match scenario {
        Scenario::Basic => basic(Arc::clone(&stopwatch)).await?,
        Scenario::Pause => {
            pause_resume(
                Arc::clone(&stopwatch),
                Duration::from_secs(config.pause_after),
                Duration::from_secs(config.pause_for),
            )
            .await?
        }
        Scenario::Stop => {
            stop_early(Arc::clone(&stopwatch), Duration::from_secs(config.stop_after)).await?
        }
        Scenario::All => anyhow::bail!("`all` expands to individual scenarios before running"),
    };

    Ok((completion, stopwatch.snapshot()))
}

/// Count down to zero, logging every tick
pub async fn basic(stopwatch: Arc<Stopwatch>) -> anyhow::Result<Completion> {
    info!("BasicTimer begin");
    let (ticks, done) = stopwatch.start()?;
    let completion = drain(ticks, done).await?;
    info!("BasicTimer end ({})", completion);
    Ok(completion)
}

/// Pause after `pause_after`, resume `pause_for` later, then run to completion
pub async fn pause_resume(
    stopwatch: Arc<Stopwatch>,
    pause_after: Duration,
    pause_for: Duration,
) -> anyhow::Result<Completion> {
    info!("PauseTimer begin");
    let (ticks, done) = stopwatch.start()?;

    let controller = {
        let stopwatch = Arc::clone(&stopwatch);
        tokio::spawn(async move {
            sleep(pause_after).await;
            stopwatch.pause()?;
            info!("Paused() with {}s left", stopwatch.time_left().as_secs());
            sleep(pause_for).await;
            stopwatch.resume()?;
            info!("Resumed()");
            Ok::<(), StopwatchError>(())
        })
    };

    let completion = drain(ticks, done).await?;
    settle(controller).await;
    info!("PauseTimer end ({})", completion);
    Ok(completion)
}

/// Stop the countdown after `stop_after`
pub async fn stop_early(
    stopwatch: Arc<Stopwatch>,
    stop_after: Duration,
) -> anyhow::Result<Completion> {
    info!("StopTimer begin");
    let (ticks, done) = stopwatch.start()?;

    let controller = {
        let stopwatch = Arc::clone(&stopwatch);
        tokio::spawn(async move {
            sleep(stop_after).await;
            stopwatch.stop()?;
            info!("Stopped()");
            Ok::<(), StopwatchError>(())
        })
    };

    let completion = drain(ticks, done).await?;
    settle(controller).await;
    info!("StopTimer end ({})", completion);
    Ok(completion)
}

/// Consume every tick, then wait for the completion signal
async fn drain(mut ticks: TickStream, done: DoneSignal) -> anyhow::Result<Completion> {
    while let Some(left) = ticks.recv().await {
        info!("tick: {}s", left.as_secs());
    }
    done.await.context("countdown ended without signalling completion")
}

/// A controller command can legitimately lose the race against expiry or an
/// interrupt; report it instead of failing the scenario.
async fn settle(controller: JoinHandle<Result<(), StopwatchError>>) {
    match controller.await {
        Ok(Ok(())) => {}
        Ok(Err(e)) => warn!("Scenario command rejected: {}", e),
        Err(e) => warn!("Scenario controller failed: {}", e),
    }
}
