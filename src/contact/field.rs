use std::borrow::Cow;
use std::fmt::{Display, Formatter};

use crate::form::{EMAIL_PATTERN, FieldKey, FieldRules, FormModel, ValidationError};
use crate::presentation::FieldSlot;

/// Payload handed to the transport once every field passes validation.
#[derive(Clone, Debug, Default, Eq, PartialEq, FormModel)]
pub struct ContactMessage {
    pub name: String,
    pub email: String,
    pub message: String,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum ContactField {
    Name,
    Email,
    Message,
}

impl ContactField {
    pub const ALL: [ContactField; 3] = [ContactField::Name, ContactField::Email, ContactField::Message];

    pub const fn key(self) -> FieldKey {
        match self {
            ContactField::Name => FieldKey::new("name"),
            ContactField::Email => FieldKey::new("email"),
            ContactField::Message => FieldKey::new("message"),
        }
    }

    pub const fn slot(self) -> FieldSlot {
        match self {
            ContactField::Name => FieldSlot::new("name", "nameError"),
            ContactField::Email => FieldSlot::new("email", "emailError"),
            ContactField::Message => FieldSlot::new("message", "messageError"),
        }
    }

    pub fn from_key(key: FieldKey) -> Option<Self> {
        Self::ALL.into_iter().find(|field| field.key() == key)
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ContactError {
    NameRequired,
    NameTooShort,
    EmailRequired,
    EmailInvalid,
    MessageRequired,
    MessageTooShort,
}

impl ContactError {
    pub const fn as_str(self) -> &'static str {
        match self {
            ContactError::NameRequired => "Please enter your name.",
            ContactError::NameTooShort => "Name must be at least 2 characters.",
            ContactError::EmailRequired => "Please enter your email.",
            ContactError::EmailInvalid => "Please enter a valid email address.",
            ContactError::MessageRequired => "Please enter your message.",
            ContactError::MessageTooShort => "Message must be at least 10 characters.",
        }
    }
}

impl Display for ContactError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::error::Error for ContactError {}

impl ValidationError for ContactError {
    fn message(&self) -> Cow<'static, str> {
        Cow::Borrowed(self.as_str())
    }
}

/// One tracked field: where it is presented and which rules its trimmed
/// value must satisfy.
#[derive(Clone, Debug)]
pub struct FieldSpec {
    field: ContactField,
    slot: FieldSlot,
    rules: FieldRules<ContactError>,
}

impl FieldSpec {
    pub fn new(field: ContactField) -> Self {
        let rules = match field {
            ContactField::Name => FieldRules::new()
                .required(ContactError::NameRequired)
                .min_length(2, ContactError::NameTooShort),
            ContactField::Email => FieldRules::new()
                .required(ContactError::EmailRequired)
                .pattern(&EMAIL_PATTERN, ContactError::EmailInvalid),
            ContactField::Message => FieldRules::new()
                .required(ContactError::MessageRequired)
                .min_length(10, ContactError::MessageTooShort),
        };
        Self {
            field,
            slot: field.slot(),
            rules,
        }
    }

    /// Presents the field through a different pair of elements.
    pub fn with_slot(mut self, slot: FieldSlot) -> Self {
        self.slot = slot;
        self
    }

    pub fn field(&self) -> ContactField {
        self.field
    }

    pub fn key(&self) -> FieldKey {
        self.field.key()
    }

    pub fn slot(&self) -> &FieldSlot {
        &self.slot
    }

    pub fn rules(&self) -> &FieldRules<ContactError> {
        &self.rules
    }

    pub fn validate(&self, value: &str) -> Option<ContactError> {
        self.rules.check(value).err()
    }
}
