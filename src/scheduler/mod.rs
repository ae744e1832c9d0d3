//! Tick scheduling
//!
//! The timer never sleeps on its own. It asks a [`Scheduler`] to run a
//! callback once after a delay and re-arms it on every tick. Two
//! implementations are provided:
//! - [`VirtualScheduler`]: a manually advanced clock for tests and simulation
//! - [`LocalScheduler`]: tokio tasks on the current `LocalSet`

pub mod local;
pub mod virtual_clock;

use std::time::Duration;

pub use local::LocalScheduler;
pub use virtual_clock::VirtualScheduler;

/// A deferred callback. Runs on the scheduler's execution context.
pub type Task = Box<dyn FnOnce()>;

/// Identifies a scheduled task so it can be cancelled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskHandle(u64);

impl TaskHandle {
    pub fn from_raw(id: u64) -> Self {
        Self(id)
    }

    pub fn id(self) -> u64 {
        self.0
    }
}

/// Host timing facility: run a task once after `delay`, or revoke it.
///
/// After `cancel` returns, the cancelled task must never run. Cancelling a
/// task that already ran (or an unknown handle) is a no-op.
pub trait Scheduler {
    fn schedule(&self, delay: Duration, task: Task) -> TaskHandle;

    fn cancel(&self, handle: TaskHandle);
}
