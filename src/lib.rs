//! Count Timer - a countdown/count-up timer engine
//!
//! This library provides a single-threaded timer state machine that ticks on
//! an injectable scheduler and notifies observers of progress and state
//! changes, plus the pieces needed to run it as a small HTTP-controlled
//! service.

pub mod adapter;
pub mod api;
pub mod config;
pub mod error;
pub mod scheduler;
pub mod state;
pub mod tasks;
pub mod timer;
pub mod utils;

// Re-export commonly used types
pub use api::create_router;
pub use config::Config;
pub use error::{ControlError, TimerError};
pub use scheduler::{LocalScheduler, Scheduler, TaskHandle, VirtualScheduler};
pub use state::AppState;
pub use timer::{
    state_to_label, BoundaryPolicy, CountObserver, CountTimer, SettingsPatch, StateObserver,
    TimerSettings, TimerState,
};
pub use utils::signals::shutdown_signal;
