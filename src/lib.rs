pub mod contact;
pub mod feedback;
pub mod form;
pub mod prelude;
pub mod presentation;
pub mod transport;
