//! Timer lifecycle states and the boundary policy

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::error::{Result, TimerError};

/// Lifecycle phase of a [`CountTimer`](super::CountTimer)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimerState {
    #[default]
    Stopped,
    Paused,
    Running,
}

impl TimerState {
    /// Raw code of the state, compatible with the STOP/PAUSE/GOING constants
    /// used by existing callers (-1, 0, 1)
    pub fn code(self) -> i32 {
        match self {
            TimerState::Stopped => -1,
            TimerState::Paused => 0,
            TimerState::Running => 1,
        }
    }

    /// Parse a raw state code
    pub fn from_code(code: i32) -> Result<Self> {
        match code {
            -1 => Ok(TimerState::Stopped),
            0 => Ok(TimerState::Paused),
            1 => Ok(TimerState::Running),
            other => Err(TimerError::invalid(format!("illegal state code {}", other))),
        }
    }

    /// Display label: STOP, PAUSE or GOING
    pub fn label(self) -> &'static str {
        match self {
            TimerState::Stopped => "STOP",
            TimerState::Paused => "PAUSE",
            TimerState::Running => "GOING",
        }
    }
}

impl fmt::Display for TimerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for TimerState {
    type Err = TimerError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "STOP" => Ok(TimerState::Stopped),
            "PAUSE" => Ok(TimerState::Paused),
            "GOING" => Ok(TimerState::Running),
            other => Err(TimerError::invalid(format!("illegal state label {:?}", other))),
        }
    }
}

/// Map a raw state code to its label
pub fn state_to_label(code: i32) -> Result<&'static str> {
    TimerState::from_code(code).map(TimerState::label)
}

/// Whether the span-end value is delivered as a progress notification
/// before the timer stops.
///
/// In both cases the stop happens on the tick that reaches the span end,
/// so a started timer is back to [`TimerState::Stopped`] after exactly
/// `total_count` ticks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BoundaryPolicy {
    /// The span end (0 counting down, `total_count` counting up) is reported
    /// as the last `on_count_down` before `on_stop`
    #[default]
    Exclusive,
    /// Reaching the span end stops the timer without reporting it
    Inclusive,
}
