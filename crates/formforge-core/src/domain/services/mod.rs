//! Domain services module
//!
//! Stateless logic that spans more than one aggregate.

pub mod bot_defense;
pub mod csv_export;
pub mod snapshot;
pub mod validation;

pub use bot_defense::{BotDefense, BotSignal};
pub use csv_export::CsvExporter;
pub use snapshot::{SchemaSnapshot, SnapshotEntry};
pub use validation::{RequestRules, SubmissionValidator};
