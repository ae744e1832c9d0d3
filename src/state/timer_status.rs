//! Timer status snapshot shared with other threads

use serde::{Deserialize, Serialize};

use crate::timer::{BoundaryPolicy, CountTimer, TimerSettings, TimerState};

/// Point-in-time copy of a timer, safe to send across threads
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimerStatus {
    pub state: TimerState,
    pub label: String,
    pub total_count: u32,
    pub current_count: u32,
    pub interval_ms: u64,
    pub reverse: bool,
    pub boundary: BoundaryPolicy,
    /// Text currently shown by the bound display widget
    pub display: String,
}

impl TimerStatus {
    /// Snapshot a stopped timer configured with `settings`
    pub fn new(settings: &TimerSettings, display: String) -> Self {
        Self {
            state: TimerState::Stopped,
            label: TimerState::Stopped.label().to_string(),
            total_count: settings.total_count,
            current_count: if settings.reverse { 0 } else { settings.total_count },
            interval_ms: settings.interval_ms,
            reverse: settings.reverse,
            boundary: settings.boundary,
            display,
        }
    }

    /// Snapshot a live timer
    pub fn capture(timer: &CountTimer, display: String) -> Self {
        let settings = timer.settings();
        let state = timer.state();
        Self {
            state,
            label: state.label().to_string(),
            total_count: settings.total_count,
            current_count: timer.current_count(),
            interval_ms: settings.interval_ms,
            reverse: settings.reverse,
            boundary: settings.boundary,
            display,
        }
    }

    /// Check if the timer is running or paused
    pub fn is_active(&self) -> bool {
        self.state != TimerState::Stopped
    }
}

impl Default for TimerStatus {
    fn default() -> Self {
        Self::new(&TimerSettings::default(), String::new())
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::scheduler::VirtualScheduler;

    #[test]
    fn capture_reflects_timer() {
        let scheduler = VirtualScheduler::new();
        let timer = CountTimer::new(5, Duration::from_millis(200), scheduler.clone()).unwrap();
        timer.start();
        scheduler.advance(Duration::from_millis(400));

        let status = TimerStatus::capture(&timer, "3".to_string());
        assert_eq!(status.state, TimerState::Running);
        assert_eq!(status.label, "GOING");
        assert_eq!(status.current_count, 3);
        assert_eq!(status.interval_ms, 200);
        assert!(status.is_active());
    }

    #[test]
    fn default_is_stopped_at_span_start() {
        let status = TimerStatus::default();
        assert_eq!(status.state, TimerState::Stopped);
        assert_eq!(status.current_count, 60);
        assert!(!status.is_active());
    }
}
