//! Configuration and CLI argument handling

use clap::Parser;

use crate::{
    error::TimerError,
    timer::{BoundaryPolicy, TimerSettings},
};

/// CLI argument parsing structure
#[derive(Debug, Parser)]
#[command(name = "count-timer")]
#[command(about = "A countdown timer controlled over HTTP")]
#[command(version)]
pub struct Config {
    /// Port to bind the server to
    #[arg(short, long, default_value = "20554")]
    pub port: u16,

    /// Host address to bind to
    #[arg(long, default_value = "0.0.0.0")]
    pub host: String,

    /// Number of ticks in one run
    #[arg(short, long, default_value = "30")]
    pub total: u32,

    /// Delay between ticks in milliseconds
    #[arg(short, long, default_value = "1000")]
    pub interval_ms: u64,

    /// Count up from 0 instead of down to 0
    #[arg(short, long)]
    pub reverse: bool,

    /// Stop on the final count without reporting it
    #[arg(long)]
    pub inclusive_boundary: bool,

    /// Start a run as soon as the server is up
    #[arg(long)]
    pub autostart: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Config {
    /// Parse configuration from command line arguments
    pub fn parse() -> Self {
        Parser::parse()
    }

    /// Get the server address as a formatted string
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Get the appropriate log level based on verbose flag
    pub fn log_level(&self) -> &'static str {
        if self.verbose { "debug" } else { "info" }
    }

    /// Validated timer settings from the command line
    pub fn timer_settings(&self) -> Result<TimerSettings, TimerError> {
        let boundary = if self.inclusive_boundary {
            BoundaryPolicy::Inclusive
        } else {
            BoundaryPolicy::Exclusive
        };
        let settings = TimerSettings::new(self.total, self.interval_ms)
            .reverse(self.reverse)
            .boundary(boundary);
        settings.validate()?;
        Ok(settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_sample_timer() {
        let config = Config::try_parse_from(["count-timer"]).unwrap();
        let settings = config.timer_settings().unwrap();

        assert_eq!(settings.total_count, 30);
        assert_eq!(settings.interval_ms, 1000);
        assert_eq!(settings.boundary, BoundaryPolicy::Exclusive);
        assert_eq!(config.address(), "0.0.0.0:20554");
        assert_eq!(config.log_level(), "info");
    }

    #[test]
    fn flags_map_to_settings() {
        let config = Config::try_parse_from([
            "count-timer",
            "--total",
            "5",
            "--interval-ms",
            "250",
            "--reverse",
            "--inclusive-boundary",
            "-v",
        ])
        .unwrap();
        let settings = config.timer_settings().unwrap();

        assert_eq!(settings, TimerSettings::new(5, 250).reverse(true).boundary(BoundaryPolicy::Inclusive));
        assert_eq!(config.log_level(), "debug");
    }

    #[test]
    fn zero_total_is_rejected() {
        let config = Config::try_parse_from(["count-timer", "--total", "0"]).unwrap();
        assert!(matches!(
            config.timer_settings(),
            Err(TimerError::InvalidArgument(_))
        ));
    }
}
