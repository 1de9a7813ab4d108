pub use crate::contact::{
    ContactError, ContactField, ContactForm, ContactFormConfig, ContactMessage, FieldSpec,
    SubmitOutcome,
};
pub use crate::feedback::{NoticeEntry, NoticeId, NoticeKind, NoticeManager};
pub use crate::form::{
    FieldKey, FieldLens, FieldRules, FormController, FormError, FormModel, FormOptions,
    FormResult, RevalidateMode, SubmitState, ValidationError, ValidationMode,
};
pub use crate::presentation::{ElementId, FieldSlot, InMemoryPresentation, Presentation};
pub use crate::transport::{
    BoxedTransportFuture, SimulatedTransport, SubmissionTransport, TransportError,
};
