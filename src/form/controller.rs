use std::collections::{BTreeMap, BTreeSet};
use std::fmt::{Display, Formatter};
use std::future::Future;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::transport::TransportError;

use super::validation::{FieldLens, ValidationError};

#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct FieldKey(&'static str);

impl FieldKey {
    pub const fn new(value: &'static str) -> Self {
        Self(value)
    }

    pub const fn as_str(self) -> &'static str {
        self.0
    }
}

impl Display for FieldKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.0)
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SubmitState {
    Idle,
    Submitting,
}

/// When a field without a displayed error is validated.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ValidationMode {
    OnChange,
    OnBlur,
    OnSubmit,
}

/// When a field that already displays an error is validated again.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum RevalidateMode {
    OnChange,
    OnBlur,
    OnSubmit,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(super) enum Trigger {
    Change,
    Blur,
}

impl ValidationMode {
    pub(super) fn fires_on(self, trigger: Trigger) -> bool {
        matches!(
            (self, trigger),
            (ValidationMode::OnChange, Trigger::Change) | (ValidationMode::OnBlur, Trigger::Blur)
        )
    }
}

impl RevalidateMode {
    pub(super) fn fires_on(self, trigger: Trigger) -> bool {
        matches!(
            (self, trigger),
            (RevalidateMode::OnChange, Trigger::Change) | (RevalidateMode::OnBlur, Trigger::Blur)
        )
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct FormOptions {
    pub validate_mode: ValidationMode,
    pub revalidate_mode: RevalidateMode,
}

impl Default for FormOptions {
    fn default() -> Self {
        Self {
            validate_mode: ValidationMode::OnSubmit,
            revalidate_mode: RevalidateMode::OnChange,
        }
    }
}

impl FormOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn validate_mode(mut self, mode: ValidationMode) -> Self {
        self.validate_mode = mode;
        self
    }

    pub fn revalidate_mode(mut self, mode: RevalidateMode) -> Self {
        self.revalidate_mode = mode;
        self
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FieldMeta<E> {
    pub dirty: bool,
    pub touched: bool,
    pub errors: Vec<E>,
}

impl<E> Default for FieldMeta<E> {
    fn default() -> Self {
        Self {
            dirty: false,
            touched: false,
            errors: Vec::new(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct FormSnapshot<T, E> {
    pub model: T,
    pub submit_state: SubmitState,
    pub submit_count: u32,
    pub is_dirty: bool,
    pub is_valid: bool,
    pub field_meta: BTreeMap<FieldKey, FieldMeta<E>>,
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub enum FormError {
    StatePoisoned(&'static str),
    AlreadySubmitting,
    Transport(TransportError),
    Cancelled,
}

impl Display for FormError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            FormError::StatePoisoned(context) => {
                write!(f, "form state lock poisoned while {context}")
            }
            FormError::AlreadySubmitting => f.write_str("form submit is already in progress"),
            FormError::Transport(error) => write!(f, "form submission failed: {error}"),
            FormError::Cancelled => f.write_str("form submission was cancelled"),
        }
    }
}

impl std::error::Error for FormError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            FormError::Transport(error) => Some(error),
            _ => None,
        }
    }
}

impl From<TransportError> for FormError {
    fn from(error: TransportError) -> Self {
        FormError::Transport(error)
    }
}

pub type FormResult<T> = Result<T, FormError>;

pub(super) type SyncFieldValidatorFn<T, E> = Arc<dyn Fn(&T) -> Result<(), E> + Send + Sync>;
pub(super) type SyncFormValidatorFn<T, E> = Arc<dyn Fn(&T) -> Vec<(FieldKey, E)> + Send + Sync>;

pub(super) struct FormState<T, E> {
    pub(super) initial_model: T,
    pub(super) model: T,
    pub(super) submit_state: SubmitState,
    pub(super) submit_count: u32,
    pub(super) dirty_fields: BTreeSet<FieldKey>,
    pub(super) field_meta: BTreeMap<FieldKey, FieldMeta<E>>,
}

impl<T, E> FormState<T, E> {
    pub(super) fn ensure_meta(&mut self, key: FieldKey) -> &mut FieldMeta<E> {
        self.field_meta.entry(key).or_default()
    }
}

/// Owns a form model, its per-field validation results and the submit
/// state machine. Clones share the same state.
#[derive(Clone)]
pub struct FormController<T, E>
where
    T: Clone + Send + Sync + 'static,
    E: ValidationError,
{
    pub(super) options: FormOptions,
    pub(super) state: Arc<RwLock<FormState<T, E>>>,
    pub(super) sync_field_validators:
        Arc<RwLock<BTreeMap<FieldKey, Vec<SyncFieldValidatorFn<T, E>>>>>,
    pub(super) form_validators: Arc<RwLock<Vec<SyncFormValidatorFn<T, E>>>>,
    pub(super) required_fields: Arc<RwLock<BTreeSet<FieldKey>>>,
}

impl<T, E> FormController<T, E>
where
    T: Clone + Send + Sync + 'static,
    E: ValidationError,
{
    pub fn new(initial: T, options: FormOptions) -> Self {
        Self {
            options,
            state: Arc::new(RwLock::new(FormState {
                initial_model: initial.clone(),
                model: initial,
                submit_state: SubmitState::Idle,
                submit_count: 0,
                dirty_fields: BTreeSet::new(),
                field_meta: BTreeMap::new(),
            })),
            sync_field_validators: Arc::new(RwLock::new(BTreeMap::new())),
            form_validators: Arc::new(RwLock::new(Vec::new())),
            required_fields: Arc::new(RwLock::new(BTreeSet::new())),
        }
    }

    pub fn options(&self) -> FormOptions {
        self.options
    }

    pub fn register_required_field<L>(&self, lens: L) -> FormResult<()>
    where
        L: FieldLens<T>,
    {
        let mut required = write_lock(&self.required_fields, "registering required field")?;
        required.insert(lens.key());
        Ok(())
    }

    pub fn is_required<L>(&self, lens: L) -> FormResult<bool>
    where
        L: FieldLens<T>,
    {
        self.is_required_key(lens.key())
    }

    pub(super) fn is_required_key(&self, key: FieldKey) -> FormResult<bool> {
        Ok(read_lock(&self.required_fields, "reading required fields")?.contains(&key))
    }

    pub fn is_submitting(&self) -> FormResult<bool> {
        Ok(read_lock(&self.state, "reading submit state")?.submit_state == SubmitState::Submitting)
    }

    /// Validates the whole form and, when it is valid, hands a copy of the
    /// model to `f` while the form sits in `Submitting`.
    ///
    /// Returns `Ok(false)` without calling `f` when validation fails, and
    /// `Err(FormError::AlreadySubmitting)` when another submit is in flight.
    /// The form is back in `Idle` once the returned future completes or is
    /// dropped.
    pub async fn submit_async<F, Fut>(&self, f: F) -> FormResult<bool>
    where
        F: FnOnce(&T) -> Fut,
        Fut: Future<Output = FormResult<()>>,
    {
        {
            let mut state = write_lock(&self.state, "preparing submit")?;
            if state.submit_state == SubmitState::Submitting {
                return Err(FormError::AlreadySubmitting);
            }
            state.submit_count = state.submit_count.saturating_add(1);
        }

        if !self.validate_form()? {
            return Ok(false);
        }

        let (guard, model) = {
            let mut state = write_lock(&self.state, "moving submit state to submitting")?;
            if state.submit_state == SubmitState::Submitting {
                return Err(FormError::AlreadySubmitting);
            }
            state.submit_state = SubmitState::Submitting;
            (SubmittingGuard { state: &self.state }, state.model.clone())
        };

        let submit_result = f(&model).await;
        drop(guard);
        submit_result.map(|()| true)
    }

    /// Restores the initial model and forgets every validation result.
    pub fn reset_to_initial(&self) -> FormResult<()> {
        let mut state = write_lock(&self.state, "resetting form")?;
        state.model = state.initial_model.clone();
        state.submit_count = 0;
        state.dirty_fields.clear();
        for meta in state.field_meta.values_mut() {
            meta.dirty = false;
            meta.touched = false;
            meta.errors.clear();
        }
        Ok(())
    }

    pub fn clear_errors(&self) -> FormResult<()> {
        let mut state = write_lock(&self.state, "clearing all field errors")?;
        for meta in state.field_meta.values_mut() {
            meta.errors.clear();
        }
        Ok(())
    }

    pub fn clear_field_errors<L>(&self, lens: L) -> FormResult<()>
    where
        L: FieldLens<T>,
    {
        let mut state = write_lock(&self.state, "clearing field errors")?;
        if let Some(meta) = state.field_meta.get_mut(&lens.key()) {
            meta.errors.clear();
        }
        Ok(())
    }

    pub fn snapshot(&self) -> FormResult<FormSnapshot<T, E>> {
        let state = read_lock(&self.state, "creating form snapshot")?;
        let is_valid = state.field_meta.values().all(|meta| meta.errors.is_empty());
        Ok(FormSnapshot {
            model: state.model.clone(),
            submit_state: state.submit_state,
            submit_count: state.submit_count,
            is_dirty: !state.dirty_fields.is_empty(),
            is_valid,
            field_meta: state.field_meta.clone(),
        })
    }

    pub fn field_meta<L>(&self, lens: L) -> FormResult<Option<FieldMeta<E>>>
    where
        L: FieldLens<T>,
    {
        self.field_meta_by_key(lens.key())
    }

    pub fn field_meta_by_key(&self, key: FieldKey) -> FormResult<Option<FieldMeta<E>>> {
        Ok(read_lock(&self.state, "reading field meta")?
            .field_meta
            .get(&key)
            .cloned())
    }
}

/// Puts the form back into `Idle` when the submit future finishes or is
/// dropped mid-flight.
struct SubmittingGuard<'a, T, E> {
    state: &'a RwLock<FormState<T, E>>,
}

impl<T, E> Drop for SubmittingGuard<'_, T, E> {
    fn drop(&mut self) {
        let mut state = match self.state.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        state.submit_state = SubmitState::Idle;
    }
}

pub(super) fn read_lock<'a, T>(
    lock: &'a RwLock<T>,
    context: &'static str,
) -> FormResult<RwLockReadGuard<'a, T>> {
    lock.read().map_err(|_| FormError::StatePoisoned(context))
}

pub(super) fn write_lock<'a, T>(
    lock: &'a RwLock<T>,
    context: &'static str,
) -> FormResult<RwLockWriteGuard<'a, T>> {
    lock.write().map_err(|_| FormError::StatePoisoned(context))
}
