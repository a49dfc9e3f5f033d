//! Schema snapshot builder

use serde::{Deserialize, Serialize};

use crate::domain::aggregates::Field;
use crate::domain::value_objects::FieldType;

/// One field definition as it stood when a response was captured
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotEntry {
    pub field_key: String,
    pub field_type: FieldType,
    pub label: String,
    pub is_required: bool,
    pub validation_rules: Option<serde_json::Value>,
    pub field_config: Option<serde_json::Value>,
}

pub struct SchemaSnapshot;

impl SchemaSnapshot {
    /// Active fields in display order
    pub fn build(fields: &[Field]) -> Vec<SnapshotEntry> {
        let mut active: Vec<&Field> = fields.iter().filter(|f| f.is_active()).collect();
        active.sort_by_key(|f| (f.display_order, f.id));

        active
            .into_iter()
            .map(|f| SnapshotEntry {
                field_key: f.key.clone(),
                field_type: f.field_type,
                label: f.label.clone(),
                is_required: f.required,
                validation_rules: f.validation_rules.clone(),
                field_config: f.config.clone(),
            })
            .collect()
    }

    pub fn encode(fields: &[Field]) -> Result<String, serde_json::Error> {
        serde_json::to_string(&Self::build(fields))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::aggregates::FieldSpec;
    use crate::domain::value_objects::{FieldId, FormId};
    use chrono::Utc;

    fn field(id: i64, key: &str, order: i32) -> Field {
        Field::define(
            FieldId::new(id),
            FormId::new(1),
            FieldSpec {
                key: key.into(),
                label: key.to_uppercase(),
                field_type: Some(FieldType::Number),
                required: id % 2 == 0,
                ..Default::default()
            },
            order,
            Utc::now(),
        )
    }

    #[test]
    fn test_snapshot_orders_and_skips_deleted() {
        let mut gone = field(3, "gone", 0);
        gone.mark_deleted(Utc::now());
        let fields = vec![field(1, "second", 2), gone, field(2, "first", 1)];

        let snapshot = SchemaSnapshot::build(&fields);
        let keys: Vec<_> = snapshot.iter().map(|e| e.field_key.as_str()).collect();
        assert_eq!(keys, vec!["first", "second"]);
        assert!(snapshot[0].is_required);
        assert_eq!(snapshot[0].label, "FIRST");
    }

    #[test]
    fn test_encoded_keys() {
        let encoded = SchemaSnapshot::encode(&[field(1, "age", 1)]).unwrap();
        let value: serde_json::Value = serde_json::from_str(&encoded).unwrap();
        let entry = &value[0];
        assert_eq!(entry["fieldKey"], "age");
        assert_eq!(entry["fieldType"], "NUMBER");
        assert_eq!(entry["isRequired"], false);
        assert!(entry.get("validationRules").is_some());
        assert!(entry.get("fieldConfig").is_some());
    }
}
