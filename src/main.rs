//! Countdown Stopwatch - scenario runner
//!
//! Runs the basic, pause/resume and early-stop countdowns on top of the
//! library's public contract. SIGINT or SIGTERM interrupts the running one.

use tracing::{info, warn};

use countdown_stopwatch::{config::Config, scenarios, Completion};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    // Initialize tracing with appropriate log level
    tracing_subscriber::fmt()
        .with_env_filter(format!("countdown_stopwatch={}", config.log_level()))
        .init();

    info!("Starting countdown-stopwatch v1.0.0");
    info!("Configuration: scenario={:?}, seconds={}", config.scenario, config.seconds);

    for scenario in config.scenarios() {
        let (completion, snapshot) = scenarios::run(&config, scenario).await?;

        info!(
            "{:?} finished: {} ({:.0}% elapsed)",
            scenario,
            completion,
            snapshot.progress() * 100.0
        );
        if config.json {
            println!("{}", serde_json::to_string_pretty(&snapshot)?);
        }

        if completion == Completion::Interrupted {
            warn!("Interrupted, skipping remaining scenarios");
            break;
        }
    }

    info!("All scenarios complete");
    Ok(())
}
