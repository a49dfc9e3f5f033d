//! Command handlers
//!
//! Application services that orchestrate use cases.

pub mod fields;
pub mod forms;
pub mod submissions;

pub use fields::FieldService;
pub use forms::FormService;
pub use submissions::{SubmissionService, SUBMISSION_ACCEPTED};
