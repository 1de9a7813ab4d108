mod memory;

use std::fmt::{Display, Formatter};

use crate::feedback::{NoticeEntry, NoticeId};

pub use memory::InMemoryPresentation;

/// Class toggled on an input whose value fails validation.
pub const INVALID_CLASS: &str = "error";

#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct ElementId(&'static str);

impl ElementId {
    pub const fn new(value: &'static str) -> Self {
        Self(value)
    }

    pub const fn as_str(self) -> &'static str {
        self.0
    }
}

impl Display for ElementId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.0)
    }
}

/// Handle to the elements that present one form field: the input holding
/// its value and the slot its error text is written into.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub struct FieldSlot {
    input: ElementId,
    error: ElementId,
}

impl FieldSlot {
    pub const fn new(input: &'static str, error: &'static str) -> Self {
        Self {
            input: ElementId::new(input),
            error: ElementId::new(error),
        }
    }

    pub const fn input(&self) -> ElementId {
        self.input
    }

    pub const fn error(&self) -> ElementId {
        self.error
    }
}

/// The page a form is rendered into.
///
/// Implementations own their elements; every call addresses an element by
/// id and is expected to be cheap and non-blocking. Calls for unknown
/// elements are ignored, except `read_value` and `label`, which report
/// them as `None`.
pub trait Presentation: Send + Sync + 'static {
    fn read_value(&self, input: ElementId) -> Option<String>;
    fn write_value(&self, input: ElementId, value: &str);
    fn write_error(&self, slot: ElementId, message: &str);
    fn toggle_class(&self, element: ElementId, class: &'static str, enabled: bool);
    fn set_attribute(&self, element: ElementId, name: &'static str, value: Option<&str>);
    fn insert_notice(&self, notice: NoticeEntry) -> NoticeId;
    fn remove_notice(&self, id: NoticeId) -> bool;
    fn set_enabled(&self, control: ElementId, enabled: bool);
    fn label(&self, control: ElementId) -> Option<String>;
    fn set_label(&self, control: ElementId, label: &str);
}
