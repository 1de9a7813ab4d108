use std::borrow::Cow;
use std::collections::{BTreeMap, BTreeSet};

use super::controller::{FieldKey, FormController, FormResult, Trigger, read_lock, write_lock};

pub trait ValidationError: Clone + Send + Sync + 'static {
    fn message(&self) -> Cow<'static, str>;
}

pub trait FieldLens<T>: Copy + Send + Sync + 'static {
    type Value: Clone + PartialEq + Send + Sync + 'static;

    fn key(self) -> FieldKey;
    fn get<'a>(self, model: &'a T) -> &'a Self::Value;
    fn set(self, model: &mut T, value: Self::Value);
}

pub trait FormModel: Clone + Send + Sync + 'static {
    type Fields;

    /// Keys of every field, in declaration order.
    const FIELD_KEYS: &'static [FieldKey];

    fn fields() -> Self::Fields;
}

pub trait FieldValidator<T, L, E>: Send + Sync
where
    L: FieldLens<T>,
    E: ValidationError,
{
    fn validate(&self, model: &T, value: &L::Value) -> Result<(), E>;
}

impl<T, L, E, F> FieldValidator<T, L, E> for F
where
    L: FieldLens<T>,
    E: ValidationError,
    F: for<'a> Fn(&'a T, &'a L::Value) -> Result<(), E> + Send + Sync,
{
    fn validate(&self, model: &T, value: &L::Value) -> Result<(), E> {
        (self)(model, value)
    }
}

/// Cross-field validation. Reported errors are appended to the named fields.
pub trait FormValidator<T, E>: Send + Sync
where
    E: ValidationError,
{
    fn validate(&self, model: &T) -> Vec<(FieldKey, E)>;
}

impl<T, E, F> FormValidator<T, E> for F
where
    E: ValidationError,
    F: Fn(&T) -> Vec<(FieldKey, E)> + Send + Sync,
{
    fn validate(&self, model: &T) -> Vec<(FieldKey, E)> {
        (self)(model)
    }
}

impl<T, E> FormController<T, E>
where
    T: Clone + Send + Sync + 'static,
    E: ValidationError,
{
    pub fn register_field_validator<L, V>(&self, lens: L, validator: V) -> FormResult<()>
    where
        L: FieldLens<T>,
        V: FieldValidator<T, L, E> + 'static,
    {
        let key = lens.key();
        let validator = std::sync::Arc::new(validator);
        let wrapped: super::controller::SyncFieldValidatorFn<T, E> =
            std::sync::Arc::new(move |model: &T| validator.validate(model, lens.get(model)));
        let mut validators =
            write_lock(&self.sync_field_validators, "registering field validator")?;
        validators.entry(key).or_default().push(wrapped);
        Ok(())
    }

    pub fn register_form_validator<V>(&self, validator: V) -> FormResult<()>
    where
        V: FormValidator<T, E> + 'static,
    {
        let validator = std::sync::Arc::new(validator);
        let wrapped: super::controller::SyncFormValidatorFn<T, E> =
            std::sync::Arc::new(move |model: &T| validator.validate(model));
        let mut validators = write_lock(&self.form_validators, "registering form validator")?;
        validators.push(wrapped);
        Ok(())
    }

    /// Stores a new value. Validation runs when the options ask for it on
    /// change, either as a first validation or because the field already
    /// displays an error.
    pub fn set<L>(&self, lens: L, value: L::Value) -> FormResult<()>
    where
        L: FieldLens<T>,
    {
        let key = lens.key();
        {
            let mut state = write_lock(&self.state, "writing form model")?;
            lens.set(&mut state.model, value);
            let is_dirty = lens.get(&state.model) != lens.get(&state.initial_model);
            if is_dirty {
                state.dirty_fields.insert(key);
            } else {
                state.dirty_fields.remove(&key);
            }
            state.ensure_meta(key).dirty = is_dirty;
        }

        if self.validates_on(key, Trigger::Change)? {
            let _ = self.validate_field_by_key(key)?;
        }
        Ok(())
    }

    pub fn touch<L>(&self, lens: L) -> FormResult<()>
    where
        L: FieldLens<T>,
    {
        let key = lens.key();
        {
            let mut state = write_lock(&self.state, "touching field")?;
            state.ensure_meta(key).touched = true;
        }

        if self.validates_on(key, Trigger::Blur)? {
            let _ = self.validate_field_by_key(key)?;
        }
        Ok(())
    }

    /// Runs the field's validators now and marks it touched so the result
    /// is displayed. Returns whether the field is valid.
    pub fn validate_field<L>(&self, lens: L) -> FormResult<bool>
    where
        L: FieldLens<T>,
    {
        let key = lens.key();
        write_lock(&self.state, "touching validated field")?
            .ensure_meta(key)
            .touched = true;
        self.validate_field_by_key(key)
    }

    /// Validates every registered field and form-level rule. All fields are
    /// evaluated, not only the first failing one.
    pub fn validate_form(&self) -> FormResult<bool> {
        let model = {
            read_lock(&self.state, "reading model for form validation")?
                .model
                .clone()
        };
        let field_validators = read_lock(
            &self.sync_field_validators,
            "reading field validators for form validation",
        )?
        .clone();
        let form_validators = read_lock(
            &self.form_validators,
            "reading form validators for form validation",
        )?
        .clone();

        let mut field_errors = BTreeMap::<FieldKey, Vec<E>>::new();
        for (key, validators) in field_validators {
            let errors = validators
                .iter()
                .filter_map(|validator| validator(&model).err())
                .collect::<Vec<_>>();
            field_errors.insert(key, errors);
        }

        for validator in form_validators {
            for (key, error) in validator(&model) {
                field_errors.entry(key).or_default().push(error);
            }
        }

        let mut state = write_lock(&self.state, "applying form validation result")?;
        let mut keys = state
            .field_meta
            .keys()
            .copied()
            .collect::<BTreeSet<FieldKey>>();
        keys.extend(field_errors.keys().copied());
        for key in keys {
            let meta = state.ensure_meta(key);
            meta.touched = true;
            meta.errors = field_errors.remove(&key).unwrap_or_default();
        }
        let is_valid = state.field_meta.values().all(|meta| meta.errors.is_empty());
        tracing::debug!(valid = is_valid, "form validated");
        Ok(is_valid)
    }

    pub(super) fn validate_field_by_key(&self, key: FieldKey) -> FormResult<bool> {
        let model = {
            read_lock(&self.state, "reading model for field validation")?
                .model
                .clone()
        };
        let validators = {
            read_lock(
                &self.sync_field_validators,
                "reading field validators for key validation",
            )?
            .get(&key)
            .cloned()
            .unwrap_or_default()
        };

        let errors = validators
            .iter()
            .filter_map(|validator| validator(&model).err())
            .collect::<Vec<_>>();

        let mut state = write_lock(&self.state, "writing field validation result")?;
        let meta = state.ensure_meta(key);
        meta.errors = errors;
        let is_valid = meta.errors.is_empty();
        tracing::trace!(field = %key, valid = is_valid, "field validated");
        Ok(is_valid)
    }

    fn validates_on(&self, key: FieldKey, trigger: Trigger) -> FormResult<bool> {
        if self.options.validate_mode.fires_on(trigger) {
            return Ok(true);
        }
        Ok(self.options.revalidate_mode.fires_on(trigger)
            && self.display_error_message(key)?.is_some())
    }
}
