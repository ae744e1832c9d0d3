//! Widget adapters
//!
//! Each UI behaviour is a separate observer composed onto a timer:
//! [`TextBinding`] mirrors the count into a widget's text and disables the
//! widget for the duration of a run, [`ViewBinding`] only forwards progress to
//! a binder callback, and [`EnableToggle`] keeps a widget enabled exactly
//! while the timer is stopped.
//!
//! Register an adapter before any observer that reads the widget it updates:
//! observers are called in registration order.

pub mod binding;
pub mod label;
pub mod toggle;

pub use binding::{TextBinding, ViewBinding};
pub use label::Label;
pub use toggle::EnableToggle;

/// Callback rendering a count onto a widget: `(widget, total, current)`
pub type Binder<W> = Box<dyn Fn(&W, u32, u32)>;

/// Minimal surface of a display element the adapters drive
pub trait Widget {
    fn text(&self) -> String;

    fn set_text(&self, text: &str);

    fn is_enabled(&self) -> bool;

    fn set_enabled(&self, enabled: bool);
}
