//! The count timer state machine

use std::{
    cell::RefCell,
    collections::VecDeque,
    fmt,
    rc::{Rc, Weak},
    time::Duration,
};

use tracing::{debug, info};

use super::{
    observer::Registry,
    settings::{validate_interval, validate_total_count, DEFAULT_INTERVAL_MS, DEFAULT_TOTAL_COUNT},
    BoundaryPolicy, CountObserver, StateObserver, TimerSettings, TimerState,
};
use crate::{
    error::{Result, TimerError},
    scheduler::{Scheduler, TaskHandle},
};

/// Counts from `total_count` down to 0 (or from 0 up to `total_count` when
/// reversed), one step per interval.
///
/// The timer is a cheap handle over shared single-threaded state: clones
/// control the same timer, and observers may call back into it (for example
/// `stop()` from inside `on_count_down`). All calls must happen on the
/// scheduler's execution context.
#[derive(Clone)]
pub struct CountTimer {
    inner: Rc<RefCell<Inner>>,
}

/// Non-owning handle, for observers that need to control their timer
#[derive(Clone)]
pub struct WeakCountTimer {
    inner: Weak<RefCell<Inner>>,
}

struct Inner {
    total_count: u32,
    current_count: u32,
    interval: Duration,
    reverse: bool,
    boundary: BoundaryPolicy,
    state: TimerState,
    /// Bumped on every state transition; dispatch loops compare it to notice
    /// that an observer already moved the timer on
    transition: u64,
    next_tick: u64,
    pending: Option<PendingTick>,
    /// Start/stop events raised while another one is being delivered wait
    /// here, so every observer sees them in the order they happened
    lifecycle_queue: VecDeque<Lifecycle>,
    delivering_lifecycle: bool,
    scheduler: Rc<dyn Scheduler>,
    count_observers: Registry<dyn CountObserver>,
    state_observers: Registry<dyn StateObserver>,
}

#[derive(Clone, Copy)]
struct PendingTick {
    seq: u64,
    handle: TaskHandle,
}

#[derive(Debug, Clone, Copy)]
enum Lifecycle {
    Start,
    Stop,
}

impl Inner {
    fn span_start(&self) -> u32 {
        if self.reverse {
            0
        } else {
            self.total_count
        }
    }

    fn span_end(&self) -> u32 {
        if self.reverse {
            self.total_count
        } else {
            0
        }
    }

    fn reset_count(&mut self) {
        self.current_count = self.span_start();
    }

    fn ensure_stopped(&self, operation: &'static str) -> Result<()> {
        if self.state != TimerState::Stopped {
            return Err(TimerError::IllegalState {
                operation,
                state: self.state,
            });
        }
        Ok(())
    }

    fn transition_to(&mut self, state: TimerState) -> u64 {
        self.state = state;
        self.transition += 1;
        self.transition
    }

    fn cancel_pending(&mut self) {
        if let Some(pending) = self.pending.take() {
            self.scheduler.cancel(pending.handle);
        }
    }
}

impl Drop for Inner {
    fn drop(&mut self) {
        self.cancel_pending();
    }
}

impl CountTimer {
    /// Create a stopped timer
    pub fn new<S>(total_count: u32, interval: Duration, scheduler: S) -> Result<Self>
    where
        S: Scheduler + 'static,
    {
        validate_total_count(total_count)?;
        validate_interval(interval)?;
        Ok(Self::build(total_count, interval, Rc::new(scheduler)))
    }

    /// 60 ticks, one per second
    pub fn with_defaults<S>(scheduler: S) -> Self
    where
        S: Scheduler + 'static,
    {
        Self::build(
            DEFAULT_TOTAL_COUNT,
            Duration::from_millis(DEFAULT_INTERVAL_MS),
            Rc::new(scheduler),
        )
    }

    /// Create a stopped timer with direction and boundary policy applied
    pub fn from_settings<S>(settings: &TimerSettings, scheduler: S) -> Result<Self>
    where
        S: Scheduler + 'static,
    {
        let timer = Self::new(settings.total_count, settings.interval(), scheduler)?;
        timer.set_reverse(settings.reverse)?;
        timer.set_boundary_policy(settings.boundary)?;
        Ok(timer)
    }

    fn build(total_count: u32, interval: Duration, scheduler: Rc<dyn Scheduler>) -> Self {
        Self {
            inner: Rc::new(RefCell::new(Inner {
                total_count,
                current_count: total_count,
                interval,
                reverse: false,
                boundary: BoundaryPolicy::default(),
                state: TimerState::Stopped,
                transition: 0,
                next_tick: 0,
                pending: None,
                lifecycle_queue: VecDeque::new(),
                delivering_lifecycle: false,
                scheduler,
                count_observers: Registry::new(),
                state_observers: Registry::new(),
            })),
        }
    }

    pub fn downgrade(&self) -> WeakCountTimer {
        WeakCountTimer {
            inner: Rc::downgrade(&self.inner),
        }
    }

    // ---- configuration ----

    pub fn total_count(&self) -> u32 {
        self.inner.borrow().total_count
    }

    /// Change the span. Only allowed while stopped; the current count moves
    /// to the new span start.
    pub fn set_total_count(&self, total_count: u32) -> Result<()> {
        validate_total_count(total_count)?;
        let mut inner = self.inner.borrow_mut();
        inner.ensure_stopped("set total count")?;
        inner.total_count = total_count;
        inner.reset_count();
        Ok(())
    }

    pub fn interval(&self) -> Duration {
        self.inner.borrow().interval
    }

    /// Change the tick interval. Only allowed while stopped.
    pub fn set_interval(&self, interval: Duration) -> Result<()> {
        validate_interval(interval)?;
        let mut inner = self.inner.borrow_mut();
        inner.ensure_stopped("set interval")?;
        inner.interval = interval;
        Ok(())
    }

    pub fn is_reverse(&self) -> bool {
        self.inner.borrow().reverse
    }

    /// Count up from 0 instead of down from `total_count`. Only allowed
    /// while stopped.
    pub fn set_reverse(&self, reverse: bool) -> Result<()> {
        let mut inner = self.inner.borrow_mut();
        inner.ensure_stopped("set reverse")?;
        inner.reverse = reverse;
        inner.reset_count();
        Ok(())
    }

    pub fn boundary_policy(&self) -> BoundaryPolicy {
        self.inner.borrow().boundary
    }

    pub fn set_boundary_policy(&self, boundary: BoundaryPolicy) -> Result<()> {
        let mut inner = self.inner.borrow_mut();
        inner.ensure_stopped("set boundary policy")?;
        inner.boundary = boundary;
        Ok(())
    }

    /// Apply a whole settings object. Nothing changes if validation fails.
    pub fn apply_settings(&self, settings: &TimerSettings) -> Result<()> {
        settings.validate()?;
        let mut inner = self.inner.borrow_mut();
        inner.ensure_stopped("apply settings")?;
        inner.total_count = settings.total_count;
        inner.interval = settings.interval();
        inner.reverse = settings.reverse;
        inner.boundary = settings.boundary;
        inner.reset_count();
        Ok(())
    }

    pub fn settings(&self) -> TimerSettings {
        let inner = self.inner.borrow();
        TimerSettings {
            total_count: inner.total_count,
            interval_ms: u64::try_from(inner.interval.as_millis()).unwrap_or(u64::MAX),
            reverse: inner.reverse,
            boundary: inner.boundary,
        }
    }

    pub fn current_count(&self) -> u32 {
        self.inner.borrow().current_count
    }

    pub fn state(&self) -> TimerState {
        self.inner.borrow().state
    }

    /// Whether a tick is currently armed
    pub fn has_pending_tick(&self) -> bool {
        self.inner.borrow().pending.is_some()
    }

    // ---- observers ----

    /// Register a count observer. Returns false if it was already registered.
    pub fn add_count_observer(&self, observer: Rc<dyn CountObserver>) -> bool {
        self.inner.borrow_mut().count_observers.add(observer)
    }

    /// Unregister a count observer. Unknown observers are ignored.
    pub fn remove_count_observer(&self, observer: &Rc<dyn CountObserver>) -> bool {
        self.inner.borrow_mut().count_observers.remove(observer)
    }

    /// Register a state observer. Returns false if it was already registered.
    pub fn add_state_observer(&self, observer: Rc<dyn StateObserver>) -> bool {
        self.inner.borrow_mut().state_observers.add(observer)
    }

    /// Unregister a state observer. Unknown observers are ignored.
    pub fn remove_state_observer(&self, observer: &Rc<dyn StateObserver>) -> bool {
        self.inner.borrow_mut().state_observers.remove(observer)
    }

    pub fn count_observer_len(&self) -> usize {
        self.inner.borrow().count_observers.len()
    }

    pub fn state_observer_len(&self) -> usize {
        self.inner.borrow().state_observers.len()
    }

    // ---- control ----

    /// Start a new run from the span start. No-op unless stopped.
    pub fn start(&self) {
        let transition = {
            let mut inner = self.inner.borrow_mut();
            if inner.state != TimerState::Stopped {
                return;
            }
            inner.reset_count();
            info!(
                "Timer started: total={}, interval={:?}, reverse={}",
                inner.total_count, inner.interval, inner.reverse
            );
            inner.transition_to(TimerState::Running)
        };
        self.arm();

        self.notify_lifecycle(Lifecycle::Start);
        if self.transition() == transition {
            self.notify_state(TimerState::Running, transition);
        }
    }

    /// Suspend the run, keeping the current count. No-op unless running.
    pub fn pause(&self) {
        let transition = {
            let mut inner = self.inner.borrow_mut();
            if inner.state != TimerState::Running {
                return;
            }
            inner.cancel_pending();
            debug!("Timer paused at {}", inner.current_count);
            inner.transition_to(TimerState::Paused)
        };
        self.notify_state(TimerState::Paused, transition);
    }

    /// Continue a paused run from its current count. No-op unless paused.
    pub fn resume(&self) {
        let transition = {
            let mut inner = self.inner.borrow_mut();
            if inner.state != TimerState::Paused {
                return;
            }
            debug!("Timer resumed at {}", inner.current_count);
            inner.transition_to(TimerState::Running)
        };
        self.arm();
        self.notify_state(TimerState::Running, transition);
    }

    /// End the run and reset the count. No-op when already stopped.
    pub fn stop(&self) {
        if self.state() == TimerState::Stopped {
            return;
        }
        self.halt();
    }

    // ---- internals ----

    fn transition(&self) -> u64 {
        self.inner.borrow().transition
    }

    fn arm(&self) {
        let (scheduler, interval, seq) = {
            let mut inner = self.inner.borrow_mut();
            inner.cancel_pending();
            inner.next_tick += 1;
            (Rc::clone(&inner.scheduler), inner.interval, inner.next_tick)
        };

        let timer = self.downgrade();
        let handle = scheduler.schedule(
            interval,
            Box::new(move || {
                if let Some(timer) = timer.upgrade() {
                    timer.on_tick(seq);
                }
            }),
        );
        self.inner.borrow_mut().pending = Some(PendingTick { seq, handle });
    }

    fn on_tick(&self, seq: u64) {
        enum Step {
            Progress,
            Last { report: bool },
        }

        let (total, current, transition, step) = {
            let mut inner = self.inner.borrow_mut();
            if inner.pending.map(|pending| pending.seq) != Some(seq) {
                debug!("Ignoring stale tick {}", seq);
                return;
            }
            inner.pending = None;
            if inner.state != TimerState::Running {
                return;
            }

            let step = if inner.current_count == inner.span_end() {
                // Paused and resumed while sitting on the span end
                Step::Last { report: false }
            } else {
                if inner.reverse {
                    inner.current_count += 1;
                } else {
                    inner.current_count -= 1;
                }
                if inner.current_count == inner.span_end() {
                    Step::Last {
                        report: inner.boundary == BoundaryPolicy::Exclusive,
                    }
                } else {
                    Step::Progress
                }
            };
            debug!("Tick {}/{}", inner.current_count, inner.total_count);
            (inner.total_count, inner.current_count, inner.transition, step)
        };

        match step {
            Step::Progress => {
                self.arm();
                self.notify_count_down(total, current, transition);
            }
            Step::Last { report } => {
                if report {
                    self.notify_count_down(total, current, transition);
                    if self.transition() != transition {
                        return;
                    }
                }
                self.halt();
            }
        }
    }

    /// Stop sequence shared by `stop()` and the final tick
    fn halt(&self) {
        let transition = {
            let mut inner = self.inner.borrow_mut();
            inner.cancel_pending();
            inner.reset_count();
            info!("Timer stopped");
            inner.transition_to(TimerState::Stopped)
        };
        self.notify_state(TimerState::Stopped, transition);
        self.notify_lifecycle(Lifecycle::Stop);
    }

    fn count_observers(&self) -> Vec<Rc<dyn CountObserver>> {
        self.inner.borrow().count_observers.snapshot()
    }

    fn still_counting(&self, observer: &Rc<dyn CountObserver>) -> bool {
        self.inner.borrow().count_observers.contains(observer)
    }

    /// Deliver `on_start`/`on_stop` to every count observer. A start or stop
    /// triggered from inside one of these callbacks is queued until the
    /// current event has reached everyone.
    fn notify_lifecycle(&self, event: Lifecycle) {
        {
            let mut inner = self.inner.borrow_mut();
            inner.lifecycle_queue.push_back(event);
            if inner.delivering_lifecycle {
                debug!("Queued {:?} behind the event being delivered", event);
                return;
            }
            inner.delivering_lifecycle = true;
        }

        loop {
            let next = self.inner.borrow_mut().lifecycle_queue.pop_front();
            let Some(event) = next else {
                break;
            };
            for observer in self.count_observers() {
                if !self.still_counting(&observer) {
                    continue;
                }
                match event {
                    Lifecycle::Start => observer.on_start(),
                    Lifecycle::Stop => observer.on_stop(),
                }
            }
        }

        self.inner.borrow_mut().delivering_lifecycle = false;
    }

    fn notify_count_down(&self, total: u32, current: u32, transition: u64) {
        for observer in self.count_observers() {
            // An observer stopped or paused us: the rest would see a stale count
            if self.transition() != transition {
                break;
            }
            if self.still_counting(&observer) {
                observer.on_count_down(total, current);
            }
        }
    }

    fn notify_state(&self, state: TimerState, transition: u64) {
        let observers = self.inner.borrow().state_observers.snapshot();
        for observer in observers {
            if self.transition() != transition {
                break;
            }
            let registered = self.inner.borrow().state_observers.contains(&observer);
            if registered {
                observer.on_state_changed(state);
            }
        }
    }
}

impl WeakCountTimer {
    pub fn upgrade(&self) -> Option<CountTimer> {
        self.inner.upgrade().map(|inner| CountTimer { inner })
    }
}

impl fmt::Debug for CountTimer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("CountTimer")
            .field("total_count", &inner.total_count)
            .field("current_count", &inner.current_count)
            .field("interval", &inner.interval)
            .field("reverse", &inner.reverse)
            .field("boundary", &inner.boundary)
            .field("state", &inner.state)
            .finish()
    }
}

#[cfg(test)]
#[path = "engine_tests.rs"]
mod engine_tests;
