//! State management module
//!
//! This module contains the cross-thread view of the timer: the status
//! snapshot, the control commands, and the application state the HTTP
//! handlers share.

pub mod app_state;
pub mod command;
pub mod timer_status;

// Re-export main types
pub use app_state::AppState;
pub use command::{ControlIntent, TimerCommand};
pub use timer_status::TimerStatus;
