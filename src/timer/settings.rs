//! Timer settings value object

use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::BoundaryPolicy;
use crate::error::{Result, TimerError};

pub const DEFAULT_TOTAL_COUNT: u32 = 60;
pub const DEFAULT_INTERVAL_MS: u64 = 1000;

/// Everything needed to configure a timer in one go
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerSettings {
    pub total_count: u32,
    pub interval_ms: u64,
    pub reverse: bool,
    pub boundary: BoundaryPolicy,
}

impl TimerSettings {
    pub fn new(total_count: u32, interval_ms: u64) -> Self {
        Self {
            total_count,
            interval_ms,
            ..Self::default()
        }
    }

    pub fn reverse(mut self, reverse: bool) -> Self {
        self.reverse = reverse;
        self
    }

    pub fn boundary(mut self, boundary: BoundaryPolicy) -> Self {
        self.boundary = boundary;
        self
    }

    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }

    /// Reject zero counts and intervals under a millisecond
    pub fn validate(&self) -> Result<()> {
        validate_total_count(self.total_count)?;
        validate_interval(self.interval())
    }
}

/// A partial update: unset fields keep the timer's current value
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SettingsPatch {
    pub total_count: Option<u32>,
    pub interval_ms: Option<u64>,
    pub reverse: Option<bool>,
    pub boundary: Option<BoundaryPolicy>,
}

impl SettingsPatch {
    /// Overlay the fields that are set onto `current`
    pub fn merge(&self, current: TimerSettings) -> TimerSettings {
        TimerSettings {
            total_count: self.total_count.unwrap_or(current.total_count),
            interval_ms: self.interval_ms.unwrap_or(current.interval_ms),
            reverse: self.reverse.unwrap_or(current.reverse),
            boundary: self.boundary.unwrap_or(current.boundary),
        }
    }
}

impl From<TimerSettings> for SettingsPatch {
    fn from(settings: TimerSettings) -> Self {
        Self {
            total_count: Some(settings.total_count),
            interval_ms: Some(settings.interval_ms),
            reverse: Some(settings.reverse),
            boundary: Some(settings.boundary),
        }
    }
}

impl Default for TimerSettings {
    fn default() -> Self {
        Self {
            total_count: DEFAULT_TOTAL_COUNT,
            interval_ms: DEFAULT_INTERVAL_MS,
            reverse: false,
            boundary: BoundaryPolicy::default(),
        }
    }
}

pub(crate) fn validate_total_count(total_count: u32) -> Result<()> {
    if total_count == 0 {
        return Err(TimerError::invalid("total_count must be > 0"));
    }
    Ok(())
}

/// Intervals are whole milliseconds, at least one
pub(crate) fn validate_interval(interval: Duration) -> Result<()> {
    if interval < Duration::from_millis(1) {
        return Err(TimerError::invalid("interval must be at least 1ms"));
    }
    if interval.subsec_nanos() % 1_000_000 != 0 {
        return Err(TimerError::invalid("interval must be a whole number of milliseconds"));
    }
    Ok(())
}
