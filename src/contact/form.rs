use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

use futures::future::{AbortHandle, abortable};
use futures_timer::Delay;

use super::config::ContactFormConfig;
use super::field::{ContactError, ContactField, ContactMessage, FieldSpec};
use crate::feedback::{NoticeEntry, NoticeId, NoticeKind};
use crate::form::{FieldKey, FieldLens, FormController, FormError, FormModel, FormResult};
use crate::presentation::{ElementId, Presentation};
use crate::transport::{SubmissionTransport, TransportError, with_timeout};

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum SubmitOutcome {
    /// Another submission was still in flight; nothing happened.
    Ignored,
    /// At least one field failed validation; its error is on display.
    Invalid,
    Delivered { notice: NoticeId },
    Failed { error: TransportError, notice: NoticeId },
    Cancelled,
}

/// Validates the contact form's fields, renders their errors and gates
/// submission through the injected transport.
pub struct ContactForm<P, X> {
    controller: FormController<ContactMessage, ContactError>,
    specs: Arc<[FieldSpec]>,
    presentation: Arc<P>,
    transport: Arc<X>,
    config: Arc<ContactFormConfig>,
    in_flight: Arc<Mutex<Option<AbortHandle>>>,
}

impl<P, X> Clone for ContactForm<P, X> {
    fn clone(&self) -> Self {
        Self {
            controller: self.controller.clone(),
            specs: self.specs.clone(),
            presentation: self.presentation.clone(),
            transport: self.transport.clone(),
            config: self.config.clone(),
            in_flight: self.in_flight.clone(),
        }
    }
}

impl<P, X> ContactForm<P, X>
where
    P: Presentation,
    X: SubmissionTransport<ContactMessage>,
{
    pub fn new(presentation: Arc<P>, transport: X, config: ContactFormConfig) -> FormResult<Self> {
        let specs = ContactField::ALL.map(FieldSpec::new);
        Self::with_specs(presentation, transport, config, specs)
    }

    /// Builds the form over explicit field specs, e.g. to present fields
    /// through non-default elements. Fields without a spec are not tracked.
    pub fn with_specs(
        presentation: Arc<P>,
        transport: X,
        config: ContactFormConfig,
        specs: impl IntoIterator<Item = FieldSpec>,
    ) -> FormResult<Self> {
        let controller = FormController::new(ContactMessage::default(), config.options);
        let specs = specs.into_iter().collect::<Arc<[FieldSpec]>>();
        let fields = ContactMessage::fields();
        for spec in specs.iter() {
            match spec.field() {
                ContactField::Name => track(&controller, fields.name(), spec)?,
                ContactField::Email => track(&controller, fields.email(), spec)?,
                ContactField::Message => track(&controller, fields.message(), spec)?,
            }
        }

        let form = Self {
            controller,
            specs,
            presentation,
            transport: Arc::new(transport),
            config: Arc::new(config),
            in_flight: Arc::new(Mutex::new(None)),
        };
        form.render_all()?;
        Ok(form)
    }

    pub fn controller(&self) -> &FormController<ContactMessage, ContactError> {
        &self.controller
    }

    pub fn presentation(&self) -> &Arc<P> {
        &self.presentation
    }

    pub fn config(&self) -> &ContactFormConfig {
        &self.config
    }

    pub fn spec(&self, field: ContactField) -> Option<&FieldSpec> {
        self.specs.iter().find(|spec| spec.field() == field)
    }

    pub fn is_submitting(&self) -> FormResult<bool> {
        self.controller.is_submitting()
    }

    /// The user edited the field. Re-validates only when the field already
    /// shows an error, unless the options validate on every change.
    pub fn handle_input(&self, field: ContactField) -> FormResult<()> {
        let Some(spec) = self.spec(field) else {
            return Ok(());
        };
        self.pull(spec)?;
        self.controller
            .render_field(spec.key(), spec.slot(), self.presentation.as_ref())?;
        Ok(())
    }

    /// The field lost focus.
    pub fn handle_blur(&self, field: ContactField) -> FormResult<()> {
        let Some(spec) = self.spec(field) else {
            return Ok(());
        };
        self.pull(spec)?;
        let fields = ContactMessage::fields();
        match field {
            ContactField::Name => self.controller.touch(fields.name())?,
            ContactField::Email => self.controller.touch(fields.email())?,
            ContactField::Message => self.controller.touch(fields.message())?,
        }
        self.controller
            .render_field(spec.key(), spec.slot(), self.presentation.as_ref())?;
        Ok(())
    }

    /// One validation pass over the field's current value. The result is
    /// written to the field's error slot; `None` means valid.
    pub fn validate_field(&self, field: ContactField) -> FormResult<Option<ContactError>> {
        let Some(spec) = self.spec(field) else {
            return Ok(None);
        };
        self.pull(spec)?;
        let fields = ContactMessage::fields();
        match field {
            ContactField::Name => self.controller.validate_field(fields.name())?,
            ContactField::Email => self.controller.validate_field(fields.email())?,
            ContactField::Message => self.controller.validate_field(fields.message())?,
        };
        let error = self
            .controller
            .render_field(spec.key(), spec.slot(), self.presentation.as_ref())?;
        tracing::debug!(field = %spec.key(), valid = error.is_none(), "contact field validated");
        Ok(error)
    }

    /// Validates every field and updates every error slot. Returns whether
    /// the whole form is valid.
    pub fn validate_form(&self) -> FormResult<bool> {
        self.pull_all()?;
        let is_valid = self.controller.validate_form()?;
        self.render_all()?;
        Ok(is_valid)
    }

    /// The outcome of the most recent validation pass for each field.
    pub fn results(&self) -> FormResult<BTreeMap<FieldKey, Option<ContactError>>> {
        let snapshot = self.controller.snapshot()?;
        Ok(self
            .specs
            .iter()
            .map(|spec| {
                let error = snapshot
                    .field_meta
                    .get(&spec.key())
                    .and_then(|meta| meta.errors.first().copied());
                (spec.key(), error)
            })
            .collect())
    }

    pub async fn submit(&self) -> FormResult<SubmitOutcome> {
        if self.controller.is_submitting()? {
            tracing::debug!("submission ignored, another one is in flight");
            return Ok(SubmitOutcome::Ignored);
        }
        self.pull_all()?;

        let presentation = self.presentation.clone();
        let transport = self.transport.clone();
        let in_flight = self.in_flight.clone();
        let config = self.config.clone();
        let controller = self.controller.clone();
        let specs = self.specs.clone();

        let result = self
            .controller
            .submit_async(move |payload: &ContactMessage| {
                let prepared = render_specs(&controller, &specs, presentation.as_ref())
                    .map(|()| {
                        let guard = SendingGuard::engage(presentation, &config, in_flight.clone());
                        tracing::info!("contact form submitted");
                        let (delivery, handle) = abortable(with_timeout(
                            transport.deliver(payload.clone()),
                            config.submit_timeout,
                        ));
                        *lock_in_flight(&in_flight) = Some(handle);
                        (guard, delivery)
                    });

                async move {
                    let (guard, delivery) = prepared?;
                    let delivered = delivery.await;
                    drop(guard);
                    match delivered {
                        Ok(result) => result.map_err(FormError::Transport),
                        Err(_aborted) => Err(FormError::Cancelled),
                    }
                }
            })
            .await;

        match result {
            Ok(true) => {
                self.clear()?;
                let notice = self.notify(NoticeKind::Success, &self.config.success_message);
                tracing::info!(notice = notice.0, "contact form delivered");
                Ok(SubmitOutcome::Delivered { notice })
            }
            Ok(false) => {
                self.render_all()?;
                Ok(SubmitOutcome::Invalid)
            }
            Err(FormError::AlreadySubmitting) => {
                tracing::debug!("submission ignored, another one is in flight");
                Ok(SubmitOutcome::Ignored)
            }
            Err(FormError::Transport(error)) => {
                tracing::warn!(%error, "contact form delivery failed");
                let notice = self.notify(NoticeKind::Error, &self.config.failure_message);
                Ok(SubmitOutcome::Failed { error, notice })
            }
            Err(FormError::Cancelled) => {
                tracing::info!("contact form submission cancelled");
                Ok(SubmitOutcome::Cancelled)
            }
            Err(error) => Err(error),
        }
    }

    /// Aborts the delivery in flight. The pending `submit` resolves to
    /// `SubmitOutcome::Cancelled` and the entered values are kept.
    pub fn cancel_submission(&self) -> bool {
        match lock_in_flight(&self.in_flight).take() {
            Some(handle) => {
                handle.abort();
                true
            }
            None => false,
        }
    }

    /// Waits out the notice duration, then removes the notice.
    pub async fn expire_notice(&self, notice: NoticeId) -> bool {
        Delay::new(self.config.notice_duration).await;
        self.presentation.remove_notice(notice)
    }

    /// Empties every field and error slot, as after a delivered submission.
    pub fn clear(&self) -> FormResult<()> {
        self.controller.reset_to_initial()?;
        for spec in self.specs.iter() {
            self.presentation.write_value(spec.slot().input(), "");
        }
        self.render_all()
    }

    fn notify(&self, kind: NoticeKind, message: &str) -> NoticeId {
        self.presentation.insert_notice(
            NoticeEntry::new(message)
                .kind(kind)
                .auto_close(self.config.notice_duration),
        )
    }

    fn pull(&self, spec: &FieldSpec) -> FormResult<()> {
        let fields = ContactMessage::fields();
        let presentation = self.presentation.as_ref();
        match spec.field() {
            ContactField::Name => self
                .controller
                .pull_value(fields.name(), spec.slot(), presentation),
            ContactField::Email => self
                .controller
                .pull_value(fields.email(), spec.slot(), presentation),
            ContactField::Message => {
                self.controller
                    .pull_value(fields.message(), spec.slot(), presentation)
            }
        }
    }

    fn pull_all(&self) -> FormResult<()> {
        self.specs.iter().try_for_each(|spec| self.pull(spec))
    }

    fn render_all(&self) -> FormResult<()> {
        render_specs(&self.controller, &self.specs, self.presentation.as_ref())
    }
}

fn render_specs<P>(
    controller: &FormController<ContactMessage, ContactError>,
    specs: &[FieldSpec],
    presentation: &P,
) -> FormResult<()>
where
    P: Presentation,
{
    for spec in specs {
        controller.render_field(spec.key(), spec.slot(), presentation)?;
    }
    Ok(())
}

fn track<L>(
    controller: &FormController<ContactMessage, ContactError>,
    lens: L,
    spec: &FieldSpec,
) -> FormResult<()>
where
    L: FieldLens<ContactMessage, Value = String>,
{
    let rules = spec.rules().clone();
    controller.register_field_validator(lens, move |_model: &ContactMessage, value: &String| {
        rules.check(value)
    })?;
    controller.register_required_field(lens)
}

/// Holds the submit control in its sending state. Dropping it restores the
/// control and forgets the abort handle, also when the `submit` future is
/// dropped mid-delivery.
struct SendingGuard<P: Presentation> {
    presentation: Arc<P>,
    control: ElementId,
    idle_label: Option<String>,
    in_flight: Arc<Mutex<Option<AbortHandle>>>,
}

impl<P: Presentation> SendingGuard<P> {
    fn engage(
        presentation: Arc<P>,
        config: &ContactFormConfig,
        in_flight: Arc<Mutex<Option<AbortHandle>>>,
    ) -> Self {
        let control = config.submit_control;
        let idle_label = presentation.label(control);
        presentation.set_enabled(control, false);
        presentation.set_label(control, &config.sending_label);
        Self {
            presentation,
            control,
            idle_label,
            in_flight,
        }
    }
}

impl<P: Presentation> Drop for SendingGuard<P> {
    fn drop(&mut self) {
        lock_in_flight(&self.in_flight).take();
        self.presentation.set_enabled(self.control, true);
        if let Some(label) = self.idle_label.take() {
            self.presentation.set_label(self.control, &label);
        }
    }
}

fn lock_in_flight(in_flight: &Mutex<Option<AbortHandle>>) -> MutexGuard<'_, Option<AbortHandle>> {
    match in_flight.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}
