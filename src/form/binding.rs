use super::controller::{FieldKey, FormController, FormResult, read_lock};
use super::validation::{FieldLens, ValidationError};
use crate::presentation::{FieldSlot, INVALID_CLASS, Presentation};

impl<T, E> FormController<T, E>
where
    T: Clone + Send + Sync + 'static,
    E: ValidationError,
{
    pub fn field_error_for_display<L>(&self, lens: L) -> FormResult<Option<E>>
    where
        L: FieldLens<T>,
    {
        self.display_error_message(lens.key())
    }

    /// Copies the value currently shown in the slot's input into the model.
    /// A missing input reads as empty.
    pub fn pull_value<L, P>(&self, lens: L, slot: &FieldSlot, presentation: &P) -> FormResult<()>
    where
        L: FieldLens<T, Value = String>,
        P: Presentation + ?Sized,
    {
        let value = presentation.read_value(slot.input()).unwrap_or_else(|| {
            tracing::warn!(field = %lens.key(), input = %slot.input(), "input element missing");
            String::new()
        });
        self.set(lens, value)
    }

    /// Writes the field's displayed error into the slot and mirrors it on
    /// the input as the invalid class and `aria-invalid`.
    pub fn render_field<P>(
        &self,
        key: FieldKey,
        slot: &FieldSlot,
        presentation: &P,
    ) -> FormResult<Option<E>>
    where
        P: Presentation + ?Sized,
    {
        let error = self.display_error_message(key)?;
        let message = error.as_ref().map(ValidationError::message);
        presentation.write_error(slot.error(), message.as_deref().unwrap_or_default());
        presentation.toggle_class(slot.input(), INVALID_CLASS, error.is_some());
        presentation.set_attribute(
            slot.input(),
            "aria-invalid",
            error.is_some().then_some("true"),
        );
        if self.is_required_key(key)? {
            presentation.set_attribute(slot.input(), "aria-required", Some("true"));
        }
        Ok(error)
    }

    pub(super) fn display_error_message(&self, key: FieldKey) -> FormResult<Option<E>> {
        let state = read_lock(&self.state, "reading display error message")?;
        let Some(meta) = state.field_meta.get(&key) else {
            return Ok(None);
        };
        if !meta.touched && state.submit_count == 0 {
            return Ok(None);
        }
        Ok(meta.errors.first().cloned())
    }
}
