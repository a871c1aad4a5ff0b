//! Configuration and CLI argument handling

use std::time::Duration;

use clap::{Parser, ValueEnum};

/// Demonstration scenario to run
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Scenario {
    /// Count down to zero untouched
    Basic,
    /// Pause part way through, then resume
    Pause,
    /// Stop part way through
    Stop,
    /// Run basic, pause and stop in order
    All,
}

/// CLI argument parsing structure
#[derive(Debug, Parser)]
#[command(name = "countdown-stopwatch")]
#[command(about = "Run countdown stopwatch scenarios")]
#[command(version = "1.0.0")]
pub struct Config {
    /// Scenario to run
    #[arg(value_enum, default_value = "all")]
    pub scenario: Scenario,

    /// Countdown length in seconds
    #[arg(short, long, default_value = "5")]
    pub seconds: u64,

    /// Pause scenario: seconds to wait before pausing
    #[arg(long, default_value = "2")]
    pub pause_after: u64,

    /// Pause scenario: seconds to stay paused
    #[arg(long, default_value = "2")]
    pub pause_for: u64,

    /// Stop scenario: seconds to wait before stopping
    #[arg(long, default_value = "2")]
    pub stop_after: u64,

    /// Print a JSON snapshot after each scenario
    #[arg(long)]
    pub json: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Config {
    /// Parse configuration from command line arguments
    pub fn parse() -> Self {
        Parser::parse()
    }

    pub fn duration(&self) -> Duration {
        Duration::from_secs(self.seconds)
    }

    /// Scenarios selected on the command line, in run order
    pub fn scenarios(&self) -> Vec<Scenario> {
        match self.scenario {
            Scenario::All => vec![Scenario::Basic, Scenario::Pause, Scenario::Stop],
            single => vec![single],
        }
    }

    /// Get the appropriate log level based on verbose flag
    pub fn log_level(&self) -> &'static str {
        if self.verbose { "debug" } else { "info" }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_run_every_scenario() {
        let config = Config::try_parse_from(["countdown-stopwatch"]).unwrap();
        assert_eq!(config.seconds, 5);
        assert_eq!(
            config.scenarios(),
            vec![Scenario::Basic, Scenario::Pause, Scenario::Stop]
        );
        assert_eq!(config.log_level(), "info");
    }

    #[test]
    fn parses_single_scenario_and_flags() {
        let config = Config::try_parse_from([
            "countdown-stopwatch",
            "pause",
            "--seconds",
            "8",
            "--pause-for",
            "3",
            "-v",
        ])
        .unwrap();
        assert_eq!(config.scenarios(), vec![Scenario::Pause]);
        assert_eq!(config.duration(), Duration::from_secs(8));
        assert_eq!(config.pause_for, 3);
        assert_eq!(config.log_level(), "debug");
    }
}
