//! Process signal delivery lives in its own test binary: a raised signal
//! reaches every thread of the process, and the interrupt token it cancels is
//! shared process-wide.

use std::time::Duration;

use countdown_stopwatch::{process_interrupt, Completion, Stopwatch, StopwatchState};
use signal_hook::{consts::SIGTERM, low_level::raise};
use tokio::time::timeout;

const DEADLINE: Duration = Duration::from_secs(5);

#[tokio::test]
async fn sigterm_interrupts_countdown_after_an_earlier_one_finished() {
    // A finished interruptible countdown must not leave the signals unobserved
    let first = Stopwatch::new(Duration::from_secs(1)).unwrap().interruptible();
    let (mut ticks, done) = first.start().unwrap();
    while ticks.recv().await.is_some() {}
    assert_eq!(timeout(DEADLINE, done).await.unwrap().unwrap(), Completion::Expired);
    assert!(!process_interrupt().unwrap().is_cancelled());

    let second = Stopwatch::new(Duration::from_secs(60)).unwrap().interruptible();
    let (mut ticks, done) = second.start().unwrap();

    raise(SIGTERM).unwrap();

    assert_eq!(timeout(DEADLINE, done).await.unwrap().unwrap(), Completion::Interrupted);
    assert_eq!(second.state(), StopwatchState::Stopped);
    assert_eq!(ticks.recv().await, None);
    assert!(process_interrupt().unwrap().is_cancelled());

    // The process has been asked to stop, so later countdowns end at once
    let third = Stopwatch::new(Duration::from_secs(60)).unwrap().interruptible();
    let (_ticks, done) = third.start().unwrap();
    assert_eq!(timeout(DEADLINE, done).await.unwrap().unwrap(), Completion::Interrupted);
}
