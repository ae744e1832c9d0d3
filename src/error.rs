//! Error types for timer configuration and control

use thiserror::Error;

use crate::timer::TimerState;

/// Contract violations reported synchronously by the timer API
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TimerError {
    /// A value was outside its accepted range (zero count, zero interval,
    /// unknown state code or label)
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A configuration change was attempted while the timer was active
    #[error("cannot {operation} while timer is {state}")]
    IllegalState {
        operation: &'static str,
        state: TimerState,
    },
}

impl TimerError {
    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }
}

/// Result alias used across the timer API
pub type Result<T> = std::result::Result<T, TimerError>;

/// Failures when controlling a timer from another task
#[derive(Debug, Error)]
pub enum ControlError {
    #[error(transparent)]
    Timer(#[from] TimerError),

    #[error("timer driver is not running")]
    DriverGone,
}
