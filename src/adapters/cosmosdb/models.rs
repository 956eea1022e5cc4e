//! Cosmos DB document models

use crate::domain::FlatRecord;
use serde::{Deserialize, Serialize};

/// Prefix of every document id; the suffix is the record's table index
pub const DOCUMENT_ID_PREFIX: &str = "record_";

/// One flat record as stored in the document container
///
/// The record's fields sit at the top level next to `id`, which is also
/// the partition key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordDocument {
    /// Document ID (`record_<index>`)
    pub id: String,

    #[serde(flatten)]
    pub record: FlatRecord,
}

impl RecordDocument {
    /// Build the document for the record at `index` in table order
    pub fn new(index: usize, record: FlatRecord) -> Self {
        Self {
            id: document_id(index),
            record,
        }
    }
}

/// Document id for the record at `index`
pub fn document_id(index: usize) -> String {
    format!("{DOCUMENT_ID_PREFIX}{index}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_document_id_format() {
        assert_eq!(document_id(0), "record_0");
        assert_eq!(RecordDocument::new(42, FlatRecord::default()).id, "record_42");
    }

    #[test]
    fn test_document_serializes_flat() {
        let doc = RecordDocument::new(
            1,
            FlatRecord {
                patient_age: Some(45),
                vaccine_lot: Some("210178".to_string()),
                ..Default::default()
            },
        );

        let value = serde_json::to_value(&doc).unwrap();
        assert_eq!(value["id"], json!("record_1"));
        assert_eq!(value["patient_age"], json!(45));
        assert_eq!(value["vaccine_lot"], json!("210178"));
        assert_eq!(value["patient_race_color"], json!(null));
        assert_eq!(value.as_object().unwrap().len(), 12);
    }

    #[test]
    fn test_document_deserializes() {
        let doc: RecordDocument = serde_json::from_value(json!({
            "id": "record_7",
            "patient_state_code": "ES",
            "_rid": "ignored",
            "_etag": "ignored"
        }))
        .unwrap();

        assert_eq!(doc.id, "record_7");
        assert_eq!(doc.record.patient_state_code.as_deref(), Some("ES"));
        assert_eq!(doc.record.patient_age, None);
    }
}
