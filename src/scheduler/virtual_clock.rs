//! Manually advanced clock

use std::{cell::RefCell, collections::BTreeMap, rc::Rc, time::Duration};

use tracing::trace;

use super::{Scheduler, Task, TaskHandle};

/// Scheduler driven by explicit calls to [`advance`](Self::advance).
///
/// Tasks due at the same instant run in the order they were scheduled.
/// Clones share the same clock.
#[derive(Clone, Default)]
pub struct VirtualScheduler {
    clock: Rc<RefCell<Clock>>,
}

#[derive(Default)]
struct Clock {
    now: Duration,
    next_id: u64,
    queue: BTreeMap<(Duration, u64), Task>,
}

impl VirtualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Time elapsed since the clock was created
    pub fn now(&self) -> Duration {
        self.clock.borrow().now
    }

    /// Number of tasks waiting to run
    pub fn pending(&self) -> usize {
        self.clock.borrow().queue.len()
    }

    /// Due time of the earliest pending task
    pub fn next_due(&self) -> Option<Duration> {
        self.clock.borrow().queue.keys().next().map(|(due, _)| *due)
    }

    /// Move the clock forward by `by`, running every task that falls due on
    /// the way (including tasks scheduled by those tasks). Returns how many
    /// tasks ran.
    pub fn advance(&self, by: Duration) -> usize {
        let target = self.now() + by;
        let mut ran = 0;

        loop {
            let task = {
                let mut clock = self.clock.borrow_mut();
                let key = match clock.queue.keys().next() {
                    Some(&key) if key.0 <= target => key,
                    _ => break,
                };
                clock.now = key.0;
                clock.queue.remove(&key)
            };

            // The clock must not be borrowed here: tasks re-arm themselves.
            if let Some(task) = task {
                task();
                ran += 1;
            }
        }

        self.clock.borrow_mut().now = target;
        ran
    }

    /// Jump straight to the next due task and run it
    pub fn run_next(&self) -> bool {
        match self.next_due() {
            Some(due) => {
                let now = self.now();
                self.advance(due.saturating_sub(now)) > 0
            }
            None => false,
        }
    }
}

impl Scheduler for VirtualScheduler {
    fn schedule(&self, delay: Duration, task: Task) -> TaskHandle {
        let mut clock = self.clock.borrow_mut();
        let id = clock.next_id;
        clock.next_id += 1;
        let due = clock.now + delay;
        trace!("virtual task {} due at {:?}", id, due);
        clock.queue.insert((due, id), task);
        TaskHandle::from_raw(id)
    }

    fn cancel(&self, handle: TaskHandle) {
        self.clock
            .borrow_mut()
            .queue
            .retain(|&(_, id), _| id != handle.id());
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;

    #[test]
    fn runs_tasks_when_due() {
        let scheduler = VirtualScheduler::new();
        let hits = Rc::new(Cell::new(0));

        let h = Rc::clone(&hits);
        scheduler.schedule(Duration::from_millis(100), Box::new(move || h.set(h.get() + 1)));

        assert_eq!(scheduler.advance(Duration::from_millis(99)), 0);
        assert_eq!(hits.get(), 0);
        assert_eq!(scheduler.advance(Duration::from_millis(1)), 1);
        assert_eq!(hits.get(), 1);
        assert_eq!(scheduler.now(), Duration::from_millis(100));
    }

    #[test]
    fn cancelled_task_never_runs() {
        let scheduler = VirtualScheduler::new();
        let hits = Rc::new(Cell::new(0));

        let h = Rc::clone(&hits);
        let handle = scheduler.schedule(Duration::from_millis(10), Box::new(move || h.set(1)));
        scheduler.cancel(handle);

        assert_eq!(scheduler.pending(), 0);
        scheduler.advance(Duration::from_secs(1));
        assert_eq!(hits.get(), 0);

        // Cancelling again is harmless
        scheduler.cancel(handle);
    }

    #[test]
    fn same_instant_keeps_schedule_order() {
        let scheduler = VirtualScheduler::new();
        let order = Rc::new(RefCell::new(Vec::new()));

        for i in 0..3 {
            let order = Rc::clone(&order);
            scheduler.schedule(Duration::from_millis(5), Box::new(move || order.borrow_mut().push(i)));
        }
        scheduler.advance(Duration::from_millis(5));

        assert_eq!(*order.borrow(), vec![0, 1, 2]);
    }

    #[test]
    fn tasks_may_reschedule_during_advance() {
        let scheduler = VirtualScheduler::new();
        let hits = Rc::new(Cell::new(0));

        fn rearm(scheduler: VirtualScheduler, hits: Rc<Cell<u32>>) {
            let next = scheduler.clone();
            scheduler.schedule(
                Duration::from_millis(10),
                Box::new(move || {
                    hits.set(hits.get() + 1);
                    rearm(next, hits);
                }),
            );
        }
        rearm(scheduler.clone(), Rc::clone(&hits));

        assert_eq!(scheduler.advance(Duration::from_millis(35)), 3);
        assert_eq!(hits.get(), 3);
        assert_eq!(scheduler.next_due(), Some(Duration::from_millis(40)));
        assert!(scheduler.run_next());
        assert_eq!(hits.get(), 4);
    }
}
