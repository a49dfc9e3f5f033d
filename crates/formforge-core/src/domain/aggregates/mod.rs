//! Aggregates module

pub mod field;
pub mod form;
pub mod response;

pub use field::{Field, FieldChanges, FieldSpec};
pub use form::{Form, FormError};
pub use response::{FieldValue, Response};
