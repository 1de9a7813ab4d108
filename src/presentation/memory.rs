use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use super::{ElementId, Presentation};
use crate::feedback::{NoticeEntry, NoticeId, NoticeManager};

#[derive(Default)]
struct PageState {
    values: BTreeMap<ElementId, String>,
    errors: BTreeMap<ElementId, String>,
    classes: BTreeMap<ElementId, BTreeSet<&'static str>>,
    attributes: BTreeMap<(ElementId, &'static str), String>,
    disabled: BTreeSet<ElementId>,
    labels: BTreeMap<ElementId, String>,
}

/// Page model kept in process memory. Inputs and controls must be declared
/// before they can be read; everything else is created on first write.
#[derive(Clone, Default)]
pub struct InMemoryPresentation {
    state: Arc<RwLock<PageState>>,
    notices: NoticeManager,
}

impl InMemoryPresentation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_input(self, input: ElementId) -> Self {
        self.write().values.entry(input).or_default();
        self
    }

    pub fn with_control(self, control: ElementId, label: impl Into<String>) -> Self {
        self.write().labels.insert(control, label.into());
        self
    }

    /// Replaces an input's value the way a user typing into it would.
    pub fn type_into(&self, input: ElementId, value: &str) {
        self.write().values.insert(input, value.to_string());
    }

    pub fn value(&self, input: ElementId) -> Option<String> {
        self.read().values.get(&input).cloned()
    }

    pub fn error_text(&self, slot: ElementId) -> String {
        self.read().errors.get(&slot).cloned().unwrap_or_default()
    }

    pub fn has_class(&self, element: ElementId, class: &str) -> bool {
        self.read()
            .classes
            .get(&element)
            .is_some_and(|classes| classes.contains(class))
    }

    pub fn attribute(&self, element: ElementId, name: &str) -> Option<String> {
        self.read()
            .attributes
            .iter()
            .find(|((id, key), _)| *id == element && *key == name)
            .map(|(_, value)| value.clone())
    }

    pub fn is_enabled(&self, control: ElementId) -> bool {
        !self.read().disabled.contains(&control)
    }

    pub fn notices(&self) -> Vec<NoticeEntry> {
        self.notices.list()
    }

    pub fn notice_manager(&self) -> &NoticeManager {
        &self.notices
    }

    fn read(&self) -> RwLockReadGuard<'_, PageState> {
        match self.state.read() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn write(&self) -> RwLockWriteGuard<'_, PageState> {
        match self.state.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

impl Presentation for InMemoryPresentation {
    fn read_value(&self, input: ElementId) -> Option<String> {
        self.value(input)
    }

    fn write_value(&self, input: ElementId, value: &str) {
        if let Some(current) = self.write().values.get_mut(&input) {
            value.clone_into(current);
        }
    }

    fn write_error(&self, slot: ElementId, message: &str) {
        self.write().errors.insert(slot, message.to_string());
    }

    fn toggle_class(&self, element: ElementId, class: &'static str, enabled: bool) {
        let mut state = self.write();
        let classes = state.classes.entry(element).or_default();
        if enabled {
            classes.insert(class);
        } else {
            classes.remove(class);
        }
    }

    fn set_attribute(&self, element: ElementId, name: &'static str, value: Option<&str>) {
        let mut state = self.write();
        match value {
            Some(value) => {
                state
                    .attributes
                    .insert((element, name), value.to_string());
            }
            None => {
                state.attributes.remove(&(element, name));
            }
        }
    }

    fn insert_notice(&self, notice: NoticeEntry) -> NoticeId {
        self.notices.show(notice)
    }

    fn remove_notice(&self, id: NoticeId) -> bool {
        self.notices.dismiss(id)
    }

    fn set_enabled(&self, control: ElementId, enabled: bool) {
        let mut state = self.write();
        if enabled {
            state.disabled.remove(&control);
        } else {
            state.disabled.insert(control);
        }
    }

    fn label(&self, control: ElementId) -> Option<String> {
        self.read().labels.get(&control).cloned()
    }

    fn set_label(&self, control: ElementId, label: &str) {
        if let Some(current) = self.write().labels.get_mut(&control) {
            label.clone_into(current);
        }
    }
}
