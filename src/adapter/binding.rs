//! Count observers that render progress onto a widget

use std::{cell::RefCell, rc::Rc};

use super::{Binder, Widget};
use crate::timer::{CountObserver, CountTimer};

/// Writes the count into a widget's text while a run is active.
///
/// On start the widget's text and enabled flag are saved and the widget is
/// disabled; every tick either calls the binder or writes the bare count;
/// on stop the saved text and flag are restored.
pub struct TextBinding<W: Widget> {
    widget: Rc<W>,
    binder: Option<Binder<W>>,
    saved: RefCell<Option<Saved>>,
}

struct Saved {
    text: String,
    enabled: bool,
}

impl<W: Widget + 'static> TextBinding<W> {
    pub fn new(widget: Rc<W>) -> Self {
        Self {
            widget,
            binder: None,
            saved: RefCell::new(None),
        }
    }

    /// Render ticks with `binder` instead of writing the bare count
    pub fn with_binder<F>(widget: Rc<W>, binder: F) -> Self
    where
        F: Fn(&W, u32, u32) + 'static,
    {
        Self {
            widget,
            binder: Some(Box::new(binder)),
            saved: RefCell::new(None),
        }
    }

    /// Register on `timer`; the returned handle removes it again
    pub fn attach(self, timer: &CountTimer) -> Rc<dyn CountObserver> {
        let observer: Rc<dyn CountObserver> = Rc::new(self);
        timer.add_count_observer(Rc::clone(&observer));
        observer
    }
}

impl<W: Widget> CountObserver for TextBinding<W> {
    fn on_start(&self) {
        *self.saved.borrow_mut() = Some(Saved {
            text: self.widget.text(),
            enabled: self.widget.is_enabled(),
        });
        self.widget.set_enabled(false);
    }

    fn on_count_down(&self, total_count: u32, current_count: u32) {
        match &self.binder {
            Some(binder) => binder(&*self.widget, total_count, current_count),
            None => self.widget.set_text(&current_count.to_string()),
        }
    }

    fn on_stop(&self) {
        if let Some(saved) = self.saved.borrow_mut().take() {
            self.widget.set_text(&saved.text);
            self.widget.set_enabled(saved.enabled);
        }
    }
}

/// Forwards every tick to a binder and leaves the widget alone otherwise
pub struct ViewBinding<W> {
    widget: Rc<W>,
    binder: Binder<W>,
}

impl<W: 'static> ViewBinding<W> {
    pub fn new<F>(widget: Rc<W>, binder: F) -> Self
    where
        F: Fn(&W, u32, u32) + 'static,
    {
        Self {
            widget,
            binder: Box::new(binder),
        }
    }

    pub fn attach(self, timer: &CountTimer) -> Rc<dyn CountObserver> {
        let observer: Rc<dyn CountObserver> = Rc::new(self);
        timer.add_count_observer(Rc::clone(&observer));
        observer
    }
}

impl<W> CountObserver for ViewBinding<W> {
    fn on_count_down(&self, total_count: u32, current_count: u32) {
        (self.binder)(&*self.widget, total_count, current_count);
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::{adapter::Label, scheduler::VirtualScheduler};

    const SECOND: Duration = Duration::from_secs(1);

    fn timer(total: u32) -> (VirtualScheduler, CountTimer) {
        let scheduler = VirtualScheduler::new();
        let timer = CountTimer::new(total, SECOND, scheduler.clone()).unwrap();
        (scheduler, timer)
    }

    #[test]
    fn text_binding_writes_count_and_restores() {
        let (scheduler, timer) = timer(3);
        let label = Rc::new(Label::new("Get code"));
        TextBinding::new(Rc::clone(&label)).attach(&timer);

        timer.start();
        assert!(!label.is_enabled());
        assert_eq!(label.text(), "Get code");

        scheduler.advance(SECOND);
        assert_eq!(label.text(), "2");
        scheduler.advance(SECOND);
        assert_eq!(label.text(), "1");

        scheduler.advance(SECOND);
        assert_eq!(label.text(), "Get code");
        assert!(label.is_enabled());
    }

    #[test]
    fn text_binding_restores_prior_disabled_flag() {
        let (scheduler, timer) = timer(5);
        let label = Rc::new(Label::new("wait"));
        label.set_enabled(false);
        TextBinding::new(Rc::clone(&label)).attach(&timer);

        timer.start();
        scheduler.advance(SECOND);
        timer.stop();

        assert_eq!(label.text(), "wait");
        assert!(!label.is_enabled());
    }

    #[test]
    fn text_binding_prefers_binder() {
        let (scheduler, timer) = timer(10);
        let label = Rc::new(Label::new("Send"));
        TextBinding::with_binder(Rc::clone(&label), |label: &Label, total, current| {
            label.set_text(&format!("{}/{}s", current, total));
        })
        .attach(&timer);

        timer.start();
        scheduler.advance(SECOND * 3);
        assert_eq!(label.text(), "7/10s");
    }

    #[test]
    fn text_binding_can_be_detached() {
        let (scheduler, timer) = timer(10);
        let label = Rc::new(Label::new("idle"));
        let handle = TextBinding::new(Rc::clone(&label)).attach(&timer);

        timer.start();
        scheduler.advance(SECOND);
        assert!(timer.remove_count_observer(&handle));
        scheduler.advance(SECOND);

        assert_eq!(label.text(), "9");
    }

    #[test]
    fn view_binding_only_calls_binder() {
        let (scheduler, timer) = timer(4);
        let label = Rc::new(Label::new("untouched"));
        let seen = Rc::new(RefCell::new(Vec::new()));

        let sink = Rc::clone(&seen);
        ViewBinding::new(Rc::clone(&label), move |_: &Label, _, current| {
            sink.borrow_mut().push(current);
        })
        .attach(&timer);

        timer.start();
        assert!(label.is_enabled());
        scheduler.advance(SECOND * 4);

        assert_eq!(*seen.borrow(), vec![3, 2, 1, 0]);
        assert_eq!(label.text(), "untouched");
    }
}
