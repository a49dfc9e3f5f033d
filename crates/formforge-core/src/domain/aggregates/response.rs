//! Response and FieldValue
//!
//! A response is written once together with its typed rows and never
//! mutated afterwards. The payload blob is the source of truth; typed rows
//! are a write-through secondary index for per-field filtering.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::services::SnapshotEntry;
use crate::domain::value_objects::{FieldId, FormId, OwnerId, ResponseId, ResponseStatus, TypedValue};

/// Captured submission
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Response {
    pub id: ResponseId,
    pub form_id: FormId,
    pub respondent_id: Option<OwnerId>,
    pub submission_ip: Option<String>,
    pub status: ResponseStatus,
    /// Version number of the form at submission time
    pub form_version: i32,
    /// Submitted key -> value map, serialized verbatim
    pub payload: String,
    /// Active field definitions at submission time
    pub schema_snapshot: String,
    pub submitted_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl Response {
    pub fn decode_payload(&self) -> Result<BTreeMap<String, String>, serde_json::Error> {
        serde_json::from_str(&self.payload)
    }

    pub fn decode_snapshot(&self) -> Result<Vec<SnapshotEntry>, serde_json::Error> {
        serde_json::from_str(&self.schema_snapshot)
    }
}

/// Typed secondary index row, one per (response, field)
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct FieldValue {
    pub response_id: ResponseId,
    pub field_id: FieldId,
    pub value: TypedValue,
}
