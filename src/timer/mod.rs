//! Timer engine
//!
//! This module provides:
//! - **State**: lifecycle phases and the boundary policy
//! - **Observers**: count progress and state change listeners
//! - **Settings**: serializable timer configuration
//! - **Engine**: the [`CountTimer`] state machine itself

mod engine;
mod observer;
mod settings;
mod state;

pub use engine::{CountTimer, WeakCountTimer};
pub use observer::{CountObserver, StateObserver};
pub use settings::{SettingsPatch, TimerSettings, DEFAULT_INTERVAL_MS, DEFAULT_TOTAL_COUNT};
pub use state::{state_to_label, BoundaryPolicy, TimerState};
