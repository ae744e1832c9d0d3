//! Observer traits and the ordered registry behind them

use std::rc::Rc;

use super::TimerState;

/// Receives run lifecycle and progress events
pub trait CountObserver {
    /// A run started; the count has been reset to the span start
    fn on_start(&self) {}

    /// One tick advanced the count
    fn on_count_down(&self, total_count: u32, current_count: u32);

    /// The run ended, either at the span end or through `stop()`
    fn on_stop(&self) {}
}

/// Receives every state transition
pub trait StateObserver {
    fn on_state_changed(&self, state: TimerState);
}

impl<F> StateObserver for F
where
    F: Fn(TimerState),
{
    fn on_state_changed(&self, state: TimerState) {
        self(state)
    }
}

/// Insertion-ordered set of observers, compared by allocation identity
pub(crate) struct Registry<T: ?Sized> {
    observers: Vec<Rc<T>>,
}

impl<T: ?Sized> Registry<T> {
    pub fn new() -> Self {
        Self {
            observers: Vec::new(),
        }
    }

    /// Returns false if the observer was already registered
    pub fn add(&mut self, observer: Rc<T>) -> bool {
        if self.contains(&observer) {
            return false;
        }
        self.observers.push(observer);
        true
    }

    /// Returns false if the observer was not registered
    pub fn remove(&mut self, observer: &Rc<T>) -> bool {
        let before = self.observers.len();
        self.observers.retain(|o| !same(o, observer));
        self.observers.len() != before
    }

    pub fn contains(&self, observer: &Rc<T>) -> bool {
        self.observers.iter().any(|o| same(o, observer))
    }

    /// Copy of the current list, so dispatch survives re-entrant changes
    pub fn snapshot(&self) -> Vec<Rc<T>> {
        self.observers.clone()
    }

    pub fn len(&self) -> usize {
        self.observers.len()
    }
}

// Compare data pointers only: vtable pointers for the same type may differ
// between codegen units.
fn same<T: ?Sized>(a: &Rc<T>, b: &Rc<T>) -> bool {
    Rc::as_ptr(a) as *const () == Rc::as_ptr(b) as *const ()
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Noop;

    impl CountObserver for Noop {
        fn on_count_down(&self, _: u32, _: u32) {}
    }

    #[test]
    fn add_is_idempotent() {
        let mut registry: Registry<dyn CountObserver> = Registry::new();
        let a: Rc<dyn CountObserver> = Rc::new(Noop);

        assert!(registry.add(Rc::clone(&a)));
        assert!(!registry.add(Rc::clone(&a)));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn remove_tolerates_unknown() {
        let mut registry: Registry<dyn CountObserver> = Registry::new();
        let a: Rc<dyn CountObserver> = Rc::new(Noop);
        let b: Rc<dyn CountObserver> = Rc::new(Noop);

        registry.add(Rc::clone(&a));
        assert!(!registry.remove(&b));
        assert!(registry.remove(&a));
        assert!(!registry.remove(&a));
        assert_eq!(registry.len(), 0);
    }

    #[test]
    fn keeps_insertion_order() {
        let mut registry: Registry<dyn StateObserver> = Registry::new();
        let log = Rc::new(std::cell::RefCell::new(Vec::new()));

        for name in ["a", "b", "c"] {
            let log = Rc::clone(&log);
            registry.add(Rc::new(move |_: TimerState| log.borrow_mut().push(name)));
        }
        for observer in registry.snapshot() {
            observer.on_state_changed(TimerState::Running);
        }

        assert_eq!(*log.borrow(), vec!["a", "b", "c"]);
    }
}
