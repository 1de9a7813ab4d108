use super::*;
use crate::feedback::NoticeKind;
use crate::form::{FieldKey, FieldLens, FormError, SubmitState};
use crate::presentation::{
    ElementId, FieldSlot, INVALID_CLASS, InMemoryPresentation, Presentation,
};
use crate::transport::{BoxedTransportFuture, SimulatedTransport, TransportError};
use futures::channel::oneshot;
use futures::executor::block_on;
use futures::poll;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::pin::pin;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing_test::traced_test;

const SUBMIT: ElementId = ElementId::new("contactFormSubmit");

fn page() -> Arc<InMemoryPresentation> {
    let mut page = InMemoryPresentation::new().with_control(SUBMIT, "Send Message");
    for field in ContactField::ALL {
        page = page.with_input(field.slot().input());
    }
    Arc::new(page)
}

fn fill(page: &InMemoryPresentation, name: &str, email: &str, message: &str) {
    page.type_into(ContactField::Name.slot().input(), name);
    page.type_into(ContactField::Email.slot().input(), email);
    page.type_into(ContactField::Message.slot().input(), message);
}

fn error_text(page: &InMemoryPresentation, field: ContactField) -> String {
    page.error_text(field.slot().error())
}

fn fast_config() -> ContactFormConfig {
    ContactFormConfig::new().notice_duration(Duration::from_millis(5))
}

fn instant_form(
    page: Arc<InMemoryPresentation>,
) -> ContactForm<InMemoryPresentation, SimulatedTransport> {
    ContactForm::new(page, SimulatedTransport::new(Duration::ZERO), fast_config())
        .expect("build contact form")
}

/// Transport that parks every delivery until the test releases it.
#[derive(Clone, Default)]
struct GatedTransport {
    calls: Arc<AtomicUsize>,
    gates: Arc<Mutex<Vec<oneshot::Sender<Result<(), TransportError>>>>>,
}

impl GatedTransport {
    fn release(&self, result: Result<(), TransportError>) {
        let sender = self.gates.lock().expect("gates lock").remove(0);
        sender.send(result).expect("delivery is still waiting");
    }
}

impl crate::transport::SubmissionTransport<ContactMessage> for GatedTransport {
    fn deliver(&self, _payload: ContactMessage) -> BoxedTransportFuture {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let (sender, receiver) = oneshot::channel();
        self.gates.lock().expect("gates lock").push(sender);
        Box::pin(async move {
            receiver
                .await
                .unwrap_or_else(|_| Err(TransportError::Rejected("gate dropped".to_string())))
        })
    }
}

#[test]
fn blank_values_fire_required_messages() {
    let spec_for = FieldSpec::new;
    for blank in ["", "   ", "\t\n", "\u{FEFF}", " \u{FEFF} "] {
        assert_eq!(
            spec_for(ContactField::Name).validate(blank),
            Some(ContactError::NameRequired)
        );
        assert_eq!(
            spec_for(ContactField::Email).validate(blank),
            Some(ContactError::EmailRequired)
        );
        assert_eq!(
            spec_for(ContactField::Message).validate(blank),
            Some(ContactError::MessageRequired)
        );
    }
    assert_eq!(ContactError::NameRequired.to_string(), "Please enter your name.");
    assert_eq!(ContactError::EmailRequired.to_string(), "Please enter your email.");
    assert_eq!(
        ContactError::MessageRequired.to_string(),
        "Please enter your message."
    );
}

#[test]
fn field_rules_match_documented_boundaries() {
    let name = FieldSpec::new(ContactField::Name);
    assert_eq!(name.validate("A"), Some(ContactError::NameTooShort));
    assert_eq!(name.validate(" A "), Some(ContactError::NameTooShort));
    assert_eq!(name.validate("Al"), None);

    let email = FieldSpec::new(ContactField::Email);
    assert_eq!(email.validate("a@b"), Some(ContactError::EmailInvalid));
    assert_eq!(email.validate("a@b.com"), None);

    let message = FieldSpec::new(ContactField::Message);
    assert_eq!(message.validate("short"), Some(ContactError::MessageTooShort));
    assert_eq!(message.validate("1234567890"), None);

    assert_eq!(name.validate("😀"), None);
    assert_eq!(message.validate("😀😀😀😀😀"), None);
    assert_eq!(message.validate("😀😀😀😀"), Some(ContactError::MessageTooShort));

    assert_eq!(
        ContactError::NameTooShort.to_string(),
        "Name must be at least 2 characters."
    );
    assert_eq!(
        ContactError::EmailInvalid.to_string(),
        "Please enter a valid email address."
    );
    assert_eq!(
        ContactError::MessageTooShort.to_string(),
        "Message must be at least 10 characters."
    );
}

#[test]
fn valid_form_produces_no_messages() {
    let page = page();
    let form = instant_form(page.clone());
    fill(&page, "Ada", "ada@example.com", "Hello there, friend");

    assert!(form.validate_form().expect("validate form"));
    for field in ContactField::ALL {
        assert_eq!(error_text(&page, field), "");
        assert!(!page.has_class(field.slot().input(), INVALID_CLASS));
    }
    assert!(
        form.results()
            .expect("results")
            .values()
            .all(Option::is_none)
    );
}

#[test]
fn single_invalid_field_only_fills_its_slot() {
    let page = page();
    let form = instant_form(page.clone());
    fill(&page, "Ada", "ada@example", "Hello there, friend");

    assert!(!form.validate_form().expect("validate form"));
    assert_eq!(error_text(&page, ContactField::Name), "");
    assert_eq!(
        error_text(&page, ContactField::Email),
        "Please enter a valid email address."
    );
    assert_eq!(error_text(&page, ContactField::Message), "");
    assert!(page.has_class(ContactField::Email.slot().input(), INVALID_CLASS));

    let results = form.results().expect("results");
    assert_eq!(
        results.get(&ContactField::Email.key()).copied().flatten(),
        Some(ContactError::EmailInvalid)
    );
    assert_eq!(results.values().filter(|error| error.is_some()).count(), 1);
}

#[test]
fn validate_form_reports_every_field_not_just_the_first() {
    let page = page();
    let form = instant_form(page.clone());

    assert!(!form.validate_form().expect("validate form"));
    assert_eq!(error_text(&page, ContactField::Name), "Please enter your name.");
    assert_eq!(error_text(&page, ContactField::Email), "Please enter your email.");
    assert_eq!(
        error_text(&page, ContactField::Message),
        "Please enter your message."
    );
}

#[test]
fn validate_field_writes_only_its_own_slot() {
    let page = page();
    let form = instant_form(page.clone());
    page.type_into(ContactField::Name.slot().input(), "A");

    assert_eq!(
        form.validate_field(ContactField::Name).expect("validate name"),
        Some(ContactError::NameTooShort)
    );
    assert_eq!(
        error_text(&page, ContactField::Name),
        "Name must be at least 2 characters."
    );
    assert_eq!(error_text(&page, ContactField::Email), "");

    page.type_into(ContactField::Name.slot().input(), "Al");
    assert_eq!(form.validate_field(ContactField::Name).expect("validate"), None);
    assert_eq!(error_text(&page, ContactField::Name), "");
    assert!(!page.has_class(ContactField::Name.slot().input(), INVALID_CLASS));
}

#[test]
fn blur_validates_and_input_only_revalidates_shown_errors() {
    let page = page();
    let form = instant_form(page.clone());
    let email = ContactField::Email.slot().input();

    page.type_into(email, "nope");
    form.handle_input(ContactField::Email).expect("input");
    assert_eq!(error_text(&page, ContactField::Email), "");

    form.handle_blur(ContactField::Email).expect("blur");
    assert_eq!(
        error_text(&page, ContactField::Email),
        "Please enter a valid email address."
    );

    page.type_into(email, "nope@");
    form.handle_input(ContactField::Email).expect("input");
    assert_eq!(
        error_text(&page, ContactField::Email),
        "Please enter a valid email address."
    );

    page.type_into(email, "nope@example.org");
    form.handle_input(ContactField::Email).expect("input");
    assert_eq!(error_text(&page, ContactField::Email), "");
    assert!(!page.has_class(email, INVALID_CLASS));
}

#[test]
fn invalid_submit_stays_idle_without_transport_call() {
    let page = page();
    let transport = GatedTransport::default();
    let form = ContactForm::new(page.clone(), transport.clone(), fast_config())
        .expect("build contact form");
    fill(&page, "Ada", "", "Hello there, friend");

    let outcome = block_on(form.submit()).expect("submit");
    assert_eq!(outcome, SubmitOutcome::Invalid);
    assert_eq!(transport.calls.load(Ordering::SeqCst), 0);
    assert!(!form.is_submitting().expect("state"));
    assert_eq!(
        error_text(&page, ContactField::Email),
        "Please enter your email."
    );
    assert!(page.is_enabled(SUBMIT));
    assert_eq!(page.value(ContactField::Name.slot().input()).as_deref(), Some("Ada"));
}

#[traced_test]
#[test]
fn submit_while_submitting_is_ignored() {
    let page = page();
    let transport = GatedTransport::default();
    let form = ContactForm::new(page.clone(), transport.clone(), fast_config())
        .expect("build contact form");
    fill(&page, "Ada", "ada@example.com", "Hello there, friend");

    let outcome = block_on(async {
        let mut first = pin!(form.submit());
        assert!(poll!(first.as_mut()).is_pending());
        assert!(form.is_submitting().expect("state"));
        assert!(!page.is_enabled(SUBMIT));
        assert_eq!(page.label(SUBMIT).as_deref(), Some("Sending..."));

        let snapshot_before = form.controller().snapshot().expect("snapshot");
        assert_eq!(
            form.submit().await.expect("second submit"),
            SubmitOutcome::Ignored
        );
        let snapshot_after = form.controller().snapshot().expect("snapshot");
        assert_eq!(snapshot_before.submit_state, SubmitState::Submitting);
        assert_eq!(snapshot_after.submit_state, SubmitState::Submitting);
        assert_eq!(snapshot_before.submit_count, snapshot_after.submit_count);

        transport.release(Ok(()));
        first.await.expect("first submit")
    });

    assert!(matches!(outcome, SubmitOutcome::Delivered { .. }));
    assert_eq!(transport.calls.load(Ordering::SeqCst), 1);
    assert!(logs_contain("submission ignored"));
}

#[test]
fn delivered_submit_clears_form_and_shows_notice() {
    let page = page();
    let form = instant_form(page.clone());
    fill(&page, "Ada", "not-an-email", "Hello there, friend");
    assert!(!form.validate_form().expect("validate form"));
    page.type_into(ContactField::Email.slot().input(), "ada@example.com");

    let outcome = block_on(form.submit()).expect("submit");
    let SubmitOutcome::Delivered { notice } = outcome else {
        panic!("expected delivery, got {outcome:?}");
    };

    assert!(!form.is_submitting().expect("state"));
    assert!(page.is_enabled(SUBMIT));
    assert_eq!(page.label(SUBMIT).as_deref(), Some("Send Message"));
    for field in ContactField::ALL {
        assert_eq!(page.value(field.slot().input()).as_deref(), Some(""));
        assert_eq!(error_text(&page, field), "");
        assert!(!page.has_class(field.slot().input(), INVALID_CLASS));
    }
    assert_eq!(
        form.controller().snapshot().expect("snapshot").model,
        ContactMessage::default()
    );

    let notices = page.notices();
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].id, Some(notice));
    assert_eq!(notices[0].kind, NoticeKind::Success);
    assert_eq!(
        notices[0].message,
        "Thank you! Your message has been sent successfully."
    );

    assert!(block_on(form.expire_notice(notice)));
    assert!(page.notices().is_empty());
}

#[test]
fn transport_receives_values_as_entered() {
    let page = page();
    let received = Arc::new(Mutex::new(Vec::new()));
    let transport = {
        let received = received.clone();
        move |payload: ContactMessage| -> BoxedTransportFuture {
            received.lock().expect("received lock").push(payload);
            Box::pin(async { Ok(()) })
        }
    };
    let form = ContactForm::new(page.clone(), transport, fast_config()).expect("build form");
    fill(&page, " Ada ", "ada@example.com", "Hello there, friend");

    block_on(form.submit()).expect("submit");
    let received = received.lock().expect("received lock");
    assert_eq!(received.len(), 1);
    assert_eq!(received[0].name, " Ada ");
    assert_eq!(received[0].email, "ada@example.com");
}

#[test]
fn failed_delivery_keeps_values_and_reenables_submit() {
    let page = page();
    let transport = |_payload: ContactMessage| -> BoxedTransportFuture {
        Box::pin(async { Err(TransportError::Rejected("503".to_string())) })
    };
    let form = ContactForm::new(page.clone(), transport, fast_config()).expect("build form");
    fill(&page, "Ada", "ada@example.com", "Hello there, friend");

    let outcome = block_on(form.submit()).expect("submit");
    let SubmitOutcome::Failed { error, notice } = outcome else {
        panic!("expected failure, got {outcome:?}");
    };
    assert_eq!(error, TransportError::Rejected("503".to_string()));
    assert!(!form.is_submitting().expect("state"));
    assert!(page.is_enabled(SUBMIT));
    assert_eq!(page.label(SUBMIT).as_deref(), Some("Send Message"));
    assert_eq!(page.value(ContactField::Name.slot().input()).as_deref(), Some("Ada"));

    let notices = page.notices();
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].id, Some(notice));
    assert_eq!(notices[0].kind, NoticeKind::Error);
}

#[test]
fn slow_delivery_times_out() {
    let page = page();
    let limit = Duration::from_millis(10);
    let form = ContactForm::new(
        page.clone(),
        SimulatedTransport::new(Duration::from_secs(5)),
        fast_config().submit_timeout(Some(limit)),
    )
    .expect("build form");
    fill(&page, "Ada", "ada@example.com", "Hello there, friend");

    let outcome = block_on(form.submit()).expect("submit");
    assert!(matches!(
        outcome,
        SubmitOutcome::Failed {
            error: TransportError::TimedOut(elapsed),
            ..
        } if elapsed == limit
    ));
    assert!(!form.is_submitting().expect("state"));
}

#[test]
fn cancelled_submission_returns_to_idle_and_keeps_values() {
    let page = page();
    let transport = GatedTransport::default();
    let form = ContactForm::new(page.clone(), transport.clone(), fast_config())
        .expect("build contact form");
    fill(&page, "Ada", "ada@example.com", "Hello there, friend");
    assert!(!form.cancel_submission());

    let outcome = block_on(async {
        let mut pending = pin!(form.submit());
        assert!(poll!(pending.as_mut()).is_pending());
        assert!(form.cancel_submission());
        pending.await.expect("submit")
    });

    assert_eq!(outcome, SubmitOutcome::Cancelled);
    assert!(!form.is_submitting().expect("state"));
    assert!(page.is_enabled(SUBMIT));
    assert_eq!(page.value(ContactField::Name.slot().input()).as_deref(), Some("Ada"));
    assert!(page.notices().is_empty());
}

#[test]
fn custom_slots_route_errors_to_their_elements() {
    let slot = FieldSlot::new("footerName", "footerNameError");
    let page = Arc::new(
        InMemoryPresentation::new()
            .with_control(SUBMIT, "Send")
            .with_input(slot.input()),
    );
    let form = ContactForm::with_specs(
        page.clone(),
        SimulatedTransport::new(Duration::ZERO),
        fast_config(),
        [FieldSpec::new(ContactField::Name).with_slot(slot)],
    )
    .expect("build form");

    assert_eq!(
        form.validate_field(ContactField::Name).expect("validate"),
        Some(ContactError::NameRequired)
    );
    assert_eq!(page.error_text(slot.error()), "Please enter your name.");
    assert_eq!(form.validate_field(ContactField::Email).expect("untracked"), None);
    assert!(form.validate_form().is_ok());
}

#[test]
fn dropping_pending_submit_restores_the_control() {
    let page = page();
    let transport = GatedTransport::default();
    let form = ContactForm::new(page.clone(), transport.clone(), fast_config())
        .expect("build contact form");
    fill(&page, "Ada", "ada@example.com", "Hello there, friend");

    block_on(async {
        let mut pending = Box::pin(form.submit());
        assert!(poll!(pending.as_mut()).is_pending());
        assert!(!page.is_enabled(SUBMIT));
        assert_eq!(page.label(SUBMIT).as_deref(), Some("Sending..."));
        drop(pending);
    });

    assert!(!form.is_submitting().expect("state"));
    assert!(page.is_enabled(SUBMIT));
    assert_eq!(page.label(SUBMIT).as_deref(), Some("Send Message"));
    assert!(!form.cancel_submission());
    assert_eq!(transport.calls.load(Ordering::SeqCst), 1);
    assert_eq!(page.value(ContactField::Name.slot().input()).as_deref(), Some("Ada"));
}

/// Lens whose key lookup panics, used to poison the required-field registry.
#[derive(Clone, Copy)]
struct PanickingLens;

impl FieldLens<ContactMessage> for PanickingLens {
    type Value = String;

    fn key(self) -> FieldKey {
        panic!("key lookup failed");
    }

    fn get<'a>(self, model: &'a ContactMessage) -> &'a String {
        &model.name
    }

    fn set(self, model: &mut ContactMessage, value: String) {
        model.name = value;
    }
}

#[test]
fn render_failure_stops_before_delivery() {
    let page = page();
    let transport = GatedTransport::default();
    let form = ContactForm::new(page.clone(), transport.clone(), fast_config())
        .expect("build contact form");
    fill(&page, "Ada", "ada@example.com", "Hello there, friend");

    let registered = catch_unwind(AssertUnwindSafe(|| {
        form.controller().register_required_field(PanickingLens)
    }));
    assert!(registered.is_err());

    let result = block_on(form.submit());
    assert!(matches!(result, Err(FormError::StatePoisoned(_))));
    assert_eq!(transport.calls.load(Ordering::SeqCst), 0);
    assert!(!form.is_submitting().expect("state"));
    assert!(page.is_enabled(SUBMIT));
    assert_eq!(page.value(ContactField::Name.slot().input()).as_deref(), Some("Ada"));
}
