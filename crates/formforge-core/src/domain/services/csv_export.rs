//! CSV export of captured responses
//!
//! Reads payload blobs only, never the typed rows. Columns come from the
//! snapshot of the first response handed in; a response captured under a
//! different schema gets blanks for missing keys and loses extra ones.

use chrono::SecondsFormat;

use crate::domain::aggregates::Response;
use crate::error::FormsError;

pub const SUBMITTED_AT_COLUMN: &str = "submittedAt";
pub const SUBMISSION_IP_COLUMN: &str = "submissionIp";

pub struct CsvExporter;

impl CsvExporter {
    pub fn export(responses: &[Response]) -> Result<String, FormsError> {
        let mut columns = vec![SUBMITTED_AT_COLUMN.to_string(), SUBMISSION_IP_COLUMN.to_string()];
        if let Some(first) = responses.first() {
            for entry in first.decode_snapshot().map_err(internal)? {
                if !columns.contains(&entry.field_key) {
                    columns.push(entry.field_key);
                }
            }
        }

        let mut writer = csv::WriterBuilder::new()
            .terminator(csv::Terminator::Any(b'\n'))
            .from_writer(Vec::new());
        writer.write_record(&columns).map_err(internal)?;

        for response in responses {
            let values = response.decode_payload().map_err(internal)?;
            let submitted_at = response
                .submitted_at
                .to_rfc3339_opts(SecondsFormat::Millis, true);

            let row = columns.iter().enumerate().map(|(index, key)| match index {
                0 => submitted_at.as_str(),
                1 => response.submission_ip.as_deref().unwrap_or(""),
                _ => values.get(key).map(String::as_str).unwrap_or(""),
            });
            writer.write_record(row).map_err(internal)?;
        }

        let bytes = writer.into_inner().map_err(|e| internal(e.error()))?;
        String::from_utf8(bytes).map_err(internal)
    }
}

fn internal(err: impl std::fmt::Display) -> FormsError {
    FormsError::Internal(format!("failed to export responses: {}", err))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value_objects::{FormId, ResponseId, ResponseStatus};
    use chrono::{TimeZone, Utc};

    const SNAPSHOT: &str = r#"[
        {"fieldKey":"name","fieldType":"TEXT","label":"Name","isRequired":true,"validationRules":null,"fieldConfig":null},
        {"fieldKey":"city","fieldType":"TEXT","label":"City","isRequired":false,"validationRules":null,"fieldConfig":null}
    ]"#;

    fn response(id: i64, payload: &str, snapshot: &str) -> Response {
        let at = Utc.with_ymd_and_hms(2026, 1, 15, 10, 30, 0).unwrap();
        Response {
            id: ResponseId::new(id),
            form_id: FormId::new(1),
            respondent_id: None,
            submission_ip: Some("10.0.0.1".into()),
            status: ResponseStatus::Completed,
            form_version: 1,
            payload: payload.into(),
            schema_snapshot: snapshot.into(),
            submitted_at: at,
            created_at: at,
        }
    }

    #[test]
    fn test_header_and_escaping() {
        let responses = vec![
            response(2, r#"{"name":"Doe, Jane","city":"Lagos"}"#, SNAPSHOT),
            response(1, r#"{"name":"Said \"hi\"","city":"Line\nBreak"}"#, SNAPSHOT),
        ];

        let csv = CsvExporter::export(&responses).unwrap();
        let expected = "submittedAt,submissionIp,name,city\n\
            2026-01-15T10:30:00.000Z,10.0.0.1,\"Doe, Jane\",Lagos\n\
            2026-01-15T10:30:00.000Z,10.0.0.1,\"Said \"\"hi\"\"\",\"Line\nBreak\"\n";
        assert_eq!(csv, expected);
    }

    #[test]
    fn test_columns_follow_first_snapshot_only() {
        let responses = vec![
            response(2, r#"{"name":"A"}"#, SNAPSHOT),
            response(1, r#"{"name":"B","extra":"dropped"}"#, "[]"),
        ];

        let csv = CsvExporter::export(&responses).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[0], "submittedAt,submissionIp,name,city");
        assert_eq!(lines[1], "2026-01-15T10:30:00.000Z,10.0.0.1,A,");
        assert_eq!(lines[2], "2026-01-15T10:30:00.000Z,10.0.0.1,B,");
    }

    #[test]
    fn test_no_responses_yields_fixed_header() {
        assert_eq!(CsvExporter::export(&[]).unwrap(), "submittedAt,submissionIp\n");
    }
}
