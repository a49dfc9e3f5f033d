//! API Routes

pub mod fields;
pub mod forms;
pub mod health;
pub mod public;
pub mod responses;
