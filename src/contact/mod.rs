//! The site's contact form: name, email and message fields validated
//! inline and delivered through a [`SubmissionTransport`](crate::transport::SubmissionTransport).

mod config;
mod field;
mod form;

#[cfg(test)]
mod tests;

pub use config::ContactFormConfig;
pub use field::{
    ContactError, ContactField, ContactMessage, ContactMessageEmailLens, ContactMessageFields,
    ContactMessageMessageLens, ContactMessageNameLens, FieldSpec,
};
pub use form::{ContactForm, SubmitOutcome};
