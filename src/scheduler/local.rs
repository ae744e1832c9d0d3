//! Tokio-backed scheduler for a single-threaded `LocalSet`

use std::{
    cell::RefCell,
    collections::HashMap,
    rc::{Rc, Weak},
    time::Duration,
};

use tokio::{task::AbortHandle, time::sleep};
use tracing::trace;

use super::{Scheduler, Task, TaskHandle};

/// Runs each task as a `spawn_local` future that sleeps for the delay.
///
/// Must be used from inside a [`tokio::task::LocalSet`]: scheduling panics
/// otherwise. Dropping the last clone aborts everything still pending.
#[derive(Clone, Default)]
pub struct LocalScheduler {
    tasks: Rc<RefCell<LocalTasks>>,
}

#[derive(Default)]
struct LocalTasks {
    next_id: u64,
    pending: HashMap<u64, AbortHandle>,
}

impl LocalScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of tasks that have not run or been cancelled yet
    pub fn pending(&self) -> usize {
        self.tasks.borrow().pending.len()
    }
}

impl Scheduler for LocalScheduler {
    fn schedule(&self, delay: Duration, task: Task) -> TaskHandle {
        let id = {
            let mut tasks = self.tasks.borrow_mut();
            let id = tasks.next_id;
            tasks.next_id += 1;
            id
        };

        let registry: Weak<RefCell<LocalTasks>> = Rc::downgrade(&self.tasks);
        let join = tokio::task::spawn_local(async move {
            sleep(delay).await;
            if let Some(tasks) = registry.upgrade() {
                tasks.borrow_mut().pending.remove(&id);
            }
            task();
        });

        trace!("local task {} scheduled in {:?}", id, delay);
        self.tasks
            .borrow_mut()
            .pending
            .insert(id, join.abort_handle());
        TaskHandle::from_raw(id)
    }

    fn cancel(&self, handle: TaskHandle) {
        let aborted = self.tasks.borrow_mut().pending.remove(&handle.id());
        if let Some(abort) = aborted {
            // We run on the same thread as the task, so it is parked at its
            // await point and will not be polled again.
            abort.abort();
            trace!("local task {} cancelled", handle.id());
        }
    }
}

impl Drop for LocalTasks {
    fn drop(&mut self) {
        for (_, abort) in self.pending.drain() {
            abort.abort();
        }
    }
}
