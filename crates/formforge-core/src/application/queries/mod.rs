//! Query handlers
//!
//! Read side over captured responses. Only response deletion writes.

pub mod responses;

pub use responses::ResponseService;
