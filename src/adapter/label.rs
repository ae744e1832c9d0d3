//! In-memory text label

use std::cell::{Cell, RefCell};

use super::Widget;

/// A text label with an enabled flag, standing in for a UI widget
#[derive(Debug)]
pub struct Label {
    text: RefCell<String>,
    enabled: Cell<bool>,
}

impl Label {
    /// Enabled label showing `text`
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: RefCell::new(text.into()),
            enabled: Cell::new(true),
        }
    }
}

impl Default for Label {
    fn default() -> Self {
        Self::new("")
    }
}

impl Widget for Label {
    fn text(&self) -> String {
        self.text.borrow().clone()
    }

    fn set_text(&self, text: &str) {
        *self.text.borrow_mut() = text.to_string();
    }

    fn is_enabled(&self) -> bool {
        self.enabled.get()
    }

    fn set_enabled(&self, enabled: bool) {
        self.enabled.set(enabled);
    }
}
