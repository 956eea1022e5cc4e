//! Delimited (CSV) output
//!
//! The header row is always written, so an empty table produces a
//! header-only file. `None` is written as an empty field, and an empty
//! field reads back as `None`; flattening never produces `Some("")`, so a
//! flattened table survives the round trip unchanged.

use crate::domain::{EtlError, FlatRecord, Result, Table};
use std::path::Path;

/// Write `table` as CSV to `path`, overwriting any existing file
///
/// # Errors
///
/// Returns [`EtlError::IoFailure`] if the file cannot be created or written.
pub fn write_delimited(table: &Table, path: &Path) -> Result<()> {
    let io_failure = |message: String| EtlError::IoFailure {
        path: path.display().to_string(),
        message,
    };

    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(path)
        .map_err(|e| io_failure(format!("Failed to create CSV file: {e}")))?;

    writer
        .write_record(FlatRecord::FIELD_NAMES)
        .map_err(|e| io_failure(format!("Failed to write CSV header: {e}")))?;

    for (index, record) in table.iter().enumerate() {
        writer
            .serialize(record)
            .map_err(|e| io_failure(format!("Failed to write CSV row {index}: {e}")))?;
    }

    writer
        .flush()
        .map_err(|e| io_failure(format!("Failed to flush CSV file: {e}")))?;

    tracing::debug!(path = %path.display(), rows = table.len(), "CSV file written");
    Ok(())
}

/// Read a CSV file produced by [`write_delimited`] back into a [`Table`]
///
/// Empty fields read back as `None`.
///
/// # Errors
///
/// Returns [`EtlError::IoFailure`] if the file cannot be read, and
/// [`EtlError::StructuralMismatch`] if the header is not the expected one.
pub fn read_delimited(path: impl AsRef<Path>) -> Result<Table> {
    let path = path.as_ref();
    let io_failure = |message: String| EtlError::IoFailure {
        path: path.display().to_string(),
        message,
    };

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_path(path)
        .map_err(|e| io_failure(format!("Failed to open CSV file: {e}")))?;

    let headers = reader
        .headers()
        .map_err(|e| io_failure(format!("Failed to read CSV header: {e}")))?;
    let header_names: Vec<&str> = headers.iter().collect();
    if header_names != FlatRecord::FIELD_NAMES {
        return Err(EtlError::StructuralMismatch(format!(
            "Unexpected CSV header in {}: {}",
            path.display(),
            header_names.join(",")
        )));
    }

    reader
        .deserialize::<FlatRecord>()
        .enumerate()
        .map(|(index, row)| {
            row.map_err(|e| io_failure(format!("Failed to parse CSV row {index}: {e}")))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_table() -> Table {
        vec![
            FlatRecord {
                patient_age: Some(45),
                patient_biological_sex: Some("F".to_string()),
                patient_municipality: Some("VITORIA".to_string()),
                patient_state_code: Some("ES".to_string()),
                facility_legal_name: Some("PREFEITURA MUNICIPAL DE VITORIA, ES".to_string()),
                vaccine_lot: Some("210178".to_string()),
                ..Default::default()
            },
            FlatRecord {
                vaccine_category_name: Some("Faixa Etária".to_string()),
                ..Default::default()
            },
        ]
        .into()
    }

    #[test]
    fn test_write_then_read_preserves_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sus_data.csv");
        let table = sample_table();

        write_delimited(&table, &path).unwrap();
        let read_back = read_delimited(&path).unwrap();

        assert_eq!(read_back, table);
    }

    #[test]
    fn test_flattened_empty_text_round_trips() {
        use crate::core::transform::flatten_hits;
        use crate::domain::RawResult;
        use serde_json::json;

        let raw = RawResult::new(json!({"hits": {"hits": [{"_source": {
            "paciente_idade": 30,
            "paciente_racaCor_valor": "",
            "vacina_lote": "FF8841"
        }}]}}));
        let table = flatten_hits(&raw).unwrap();
        assert_eq!(table.records()[0].patient_race_color, None);

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sus_data.csv");
        write_delimited(&table, &path).unwrap();

        assert_eq!(read_delimited(&path).unwrap(), table);
    }

    #[test]
    fn test_empty_text_reads_back_as_absent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sus_data.csv");
        let table: Table = vec![FlatRecord {
            patient_race_color: Some(String::new()),
            vaccine_lot: Some("FF8841".to_string()),
            ..Default::default()
        }]
        .into();

        write_delimited(&table, &path).unwrap();
        let read_back = read_delimited(&path).unwrap();

        assert_eq!(read_back.records()[0].patient_race_color, None);
        assert_eq!(read_back.records()[0].vaccine_lot.as_deref(), Some("FF8841"));
    }

    #[test]
    fn test_header_row_and_empty_fields() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sus_data.csv");

        write_delimited(&sample_table(), &path).unwrap();
        let contents = std::fs::read_to_string(&path).unwrap();
        let mut lines = contents.lines();

        assert_eq!(lines.next().unwrap(), FlatRecord::FIELD_NAMES.join(","));
        assert_eq!(lines.next().unwrap().split(',').count(), 12); // quoted comma in facility name
        assert_eq!(lines.nth(0).unwrap(), ",,,,,,,Faixa Etária,,,");
    }

    #[test]
    fn test_empty_table_writes_header_only() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.csv");

        write_delimited(&Table::new(), &path).unwrap();
        let contents = std::fs::read_to_string(&path).unwrap();

        assert_eq!(contents.lines().count(), 1);
        assert!(read_delimited(&path).unwrap().is_empty());
    }

    #[test]
    fn test_overwrites_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sus_data.csv");
        std::fs::write(&path, "stale contents that are much longer than the new file\n".repeat(50))
            .unwrap();

        write_delimited(&Table::new(), &path).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap().lines().count(), 1);
    }

    #[test]
    fn test_read_rejects_foreign_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("other.csv");
        std::fs::write(&path, "a,b\n1,2\n").unwrap();

        assert!(matches!(
            read_delimited(&path),
            Err(EtlError::StructuralMismatch(_))
        ));
    }

    #[test]
    fn test_write_into_missing_directory_fails() {
        let path = Path::new("/nonexistent-dir/sus_data.csv");
        assert!(matches!(
            write_delimited(&Table::new(), path),
            Err(EtlError::IoFailure { .. })
        ));
    }
}
