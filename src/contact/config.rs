use std::time::Duration;

use crate::form::{FormOptions, RevalidateMode, ValidationMode};
use crate::presentation::ElementId;

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ContactFormConfig {
    pub options: FormOptions,
    /// How long a notice stays before `ContactForm::expire_notice` removes it.
    pub notice_duration: Duration,
    /// `None` waits on the transport indefinitely.
    pub submit_timeout: Option<Duration>,
    pub submit_control: ElementId,
    pub sending_label: String,
    pub success_message: String,
    pub failure_message: String,
}

impl Default for ContactFormConfig {
    fn default() -> Self {
        Self {
            options: FormOptions::new()
                .validate_mode(ValidationMode::OnBlur)
                .revalidate_mode(RevalidateMode::OnChange),
            notice_duration: Duration::from_millis(5_000),
            submit_timeout: None,
            submit_control: ElementId::new("contactFormSubmit"),
            sending_label: "Sending...".to_string(),
            success_message: "Thank you! Your message has been sent successfully.".to_string(),
            failure_message: "Sorry, your message could not be sent. Please try again."
                .to_string(),
        }
    }
}

impl ContactFormConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn options(mut self, options: FormOptions) -> Self {
        self.options = options;
        self
    }

    pub fn notice_duration(mut self, duration: Duration) -> Self {
        self.notice_duration = duration;
        self
    }

    pub fn submit_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.submit_timeout = timeout;
        self
    }

    pub fn submit_control(mut self, control: ElementId) -> Self {
        self.submit_control = control;
        self
    }

    pub fn sending_label(mut self, label: impl Into<String>) -> Self {
        self.sending_label = label.into();
        self
    }

    pub fn success_message(mut self, message: impl Into<String>) -> Self {
        self.success_message = message.into();
        self
    }

    pub fn failure_message(mut self, message: impl Into<String>) -> Self {
        self.failure_message = message.into();
        self
    }
}
