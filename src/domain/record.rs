//! Immunization record types
//!
//! [`RawResult`] is the untouched search API body, [`FlatRecord`] the fixed
//! eleven-field projection of one hit and [`Table`] the ordered collection of
//! flat records handed to every sink.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Raw search API response body
///
/// Held only for the duration of a run. Hits are expected under
/// `hits.hits[*]._source`.
#[derive(Debug, Clone, PartialEq)]
pub struct RawResult(Value);

impl RawResult {
    /// Wrap a parsed JSON body
    pub fn new(body: Value) -> Self {
        Self(body)
    }

    /// Borrow the JSON body
    pub fn body(&self) -> &Value {
        &self.0
    }

    /// Unwrap into the JSON body
    pub fn into_inner(self) -> Value {
        self.0
    }
}

impl From<Value> for RawResult {
    fn from(body: Value) -> Self {
        Self(body)
    }
}

/// One output row
///
/// Field order is the column order of every output (CSV header, Parquet
/// schema, SQL table). Absent source fields are `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlatRecord {
    pub patient_age: Option<i32>,
    pub patient_biological_sex: Option<String>,
    pub patient_race_color: Option<String>,
    pub patient_municipality: Option<String>,
    pub patient_state_code: Option<String>,
    pub facility_legal_name: Option<String>,
    pub vaccine_manufacturer_reference: Option<String>,
    pub vaccine_category_name: Option<String>,
    pub vaccine_lot: Option<String>,
    pub vaccine_manufacturer_name: Option<String>,
    pub vaccine_application_date: Option<String>,
}

impl FlatRecord {
    /// Column names in output order
    pub const FIELD_NAMES: [&'static str; 11] = [
        "patient_age",
        "patient_biological_sex",
        "patient_race_color",
        "patient_municipality",
        "patient_state_code",
        "facility_legal_name",
        "vaccine_manufacturer_reference",
        "vaccine_category_name",
        "vaccine_lot",
        "vaccine_manufacturer_name",
        "vaccine_application_date",
    ];

    /// The ten string-typed columns, in output order
    pub fn text_fields(&self) -> [Option<&str>; 10] {
        [
            self.patient_biological_sex.as_deref(),
            self.patient_race_color.as_deref(),
            self.patient_municipality.as_deref(),
            self.patient_state_code.as_deref(),
            self.facility_legal_name.as_deref(),
            self.vaccine_manufacturer_reference.as_deref(),
            self.vaccine_category_name.as_deref(),
            self.vaccine_lot.as_deref(),
            self.vaccine_manufacturer_name.as_deref(),
            self.vaccine_application_date.as_deref(),
        ]
    }
}

/// Ordered sequence of flat records
///
/// Insertion order equals source order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    records: Vec<FlatRecord>,
}

impl Table {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a record
    pub fn push(&mut self, record: FlatRecord) {
        self.records.push(record);
    }

    /// Number of records
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the table has no records
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Borrow the records in order
    pub fn records(&self) -> &[FlatRecord] {
        &self.records
    }

    /// Iterate over the records in order
    pub fn iter(&self) -> std::slice::Iter<'_, FlatRecord> {
        self.records.iter()
    }
}

impl From<Vec<FlatRecord>> for Table {
    fn from(records: Vec<FlatRecord>) -> Self {
        Self { records }
    }
}

impl FromIterator<FlatRecord> for Table {
    fn from_iter<I: IntoIterator<Item = FlatRecord>>(iter: I) -> Self {
        Self {
            records: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a Table {
    type Item = &'a FlatRecord;
    type IntoIter = std::slice::Iter<'a, FlatRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_field_names_match_serde_order() {
        let record = FlatRecord {
            patient_age: Some(45),
            ..Default::default()
        };
        let value = serde_json::to_value(&record).unwrap();
        let keys: Vec<&String> = value.as_object().unwrap().keys().collect();
        assert_eq!(keys.len(), FlatRecord::FIELD_NAMES.len());
        for name in FlatRecord::FIELD_NAMES {
            assert!(value.get(name).is_some(), "missing {name}");
        }
    }

    #[test]
    fn test_table_preserves_order() {
        let table: Table = vec![
            FlatRecord {
                patient_age: Some(1),
                ..Default::default()
            },
            FlatRecord {
                patient_age: Some(2),
                ..Default::default()
            },
        ]
        .into_iter()
        .collect();

        let ages: Vec<Option<i32>> = table.iter().map(|r| r.patient_age).collect();
        assert_eq!(ages, vec![Some(1), Some(2)]);
        assert_eq!(table.len(), 2);
        assert!(!table.is_empty());
    }

    #[test]
    fn test_raw_result_accessors() {
        let raw = RawResult::new(json!({"hits": {"hits": []}}));
        assert!(raw.body()["hits"]["hits"].is_array());
        assert_eq!(raw.into_inner(), json!({"hits": {"hits": []}}));
    }
}
