//! State observer enabling a widget only while the timer is stopped

use std::rc::Rc;

use super::Widget;
use crate::timer::{CountTimer, StateObserver, TimerState};

pub struct EnableToggle<W: Widget> {
    widget: Rc<W>,
}

impl<W: Widget + 'static> EnableToggle<W> {
    pub fn new(widget: Rc<W>) -> Self {
        Self { widget }
    }

    /// Register on `timer`; the returned handle removes it again
    pub fn attach(self, timer: &CountTimer) -> Rc<dyn StateObserver> {
        self.widget.set_enabled(timer.state() == TimerState::Stopped);
        let observer: Rc<dyn StateObserver> = Rc::new(self);
        timer.add_state_observer(Rc::clone(&observer));
        observer
    }
}

impl<W: Widget> StateObserver for EnableToggle<W> {
    fn on_state_changed(&self, state: TimerState) {
        self.widget.set_enabled(state == TimerState::Stopped);
    }
}
