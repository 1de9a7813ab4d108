mod binding;
mod controller;
mod rules;
mod validation;


pub use controller::{
    FieldKey, FieldMeta, FormController, FormError, FormOptions, FormResult, FormSnapshot,
    RevalidateMode, SubmitState, ValidationMode,
};
pub use rules::{EMAIL_PATTERN, FieldRules, Rule};
pub use sitekit_form_derive::FormModel;
pub use validation::{FieldLens, FieldValidator, FormModel, FormValidator, ValidationError};
