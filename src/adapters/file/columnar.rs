//! Columnar (Parquet) output
//!
//! Same columns as the CSV file: `patient_age` is Int32, every other column
//! Utf8, all nullable. Snappy compressed. Empty text is written as null,
//! matching the empty CSV field.

use crate::domain::{EtlError, FlatRecord, Result, Table};
use arrow::array::{ArrayRef, Int32Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;
use parquet::basic::Compression;
use parquet::file::properties::WriterProperties;
use std::fs::File;
use std::path::Path;
use std::sync::Arc;

/// Arrow schema of the output table
pub fn table_schema() -> Schema {
    let fields: Vec<Field> = FlatRecord::FIELD_NAMES
        .iter()
        .map(|name| {
            let data_type = if *name == "patient_age" {
                DataType::Int32
            } else {
                DataType::Utf8
            };
            Field::new(*name, data_type, true)
        })
        .collect();
    Schema::new(fields)
}

/// Convert a table into a single record batch
pub fn to_record_batch(table: &Table) -> Result<RecordBatch> {
    let schema = Arc::new(table_schema());

    let ages: Int32Array = table.iter().map(|r| r.patient_age).collect();
    let mut columns: Vec<ArrayRef> = Vec::with_capacity(FlatRecord::FIELD_NAMES.len());
    columns.push(Arc::new(ages));

    let rows: Vec<[Option<&str>; 10]> = table.iter().map(FlatRecord::text_fields).collect();
    for column in 0..10 {
        let values: StringArray = rows
            .iter()
            .map(|row| row[column].filter(|value| !value.is_empty()))
            .collect();
        columns.push(Arc::new(values));
    }

    RecordBatch::try_new(schema, columns)
        .map_err(|e| EtlError::Serialization(format!("Failed to build record batch: {e}")))
}

/// Write `table` as Snappy-compressed Parquet to `path`
///
/// # Errors
///
/// Returns [`EtlError::IoFailure`] if the file cannot be created or written.
pub fn write_columnar(table: &Table, path: &Path) -> Result<()> {
    let io_failure = |message: String| EtlError::IoFailure {
        path: path.display().to_string(),
        message,
    };

    let batch = to_record_batch(table)?;

    let file =
        File::create(path).map_err(|e| io_failure(format!("Failed to create Parquet file: {e}")))?;

    let props = WriterProperties::builder()
        .set_compression(Compression::SNAPPY)
        .build();

    let mut writer = ArrowWriter::try_new(file, batch.schema(), Some(props))
        .map_err(|e| io_failure(format!("Failed to open Parquet writer: {e}")))?;

    if batch.num_rows() > 0 {
        writer
            .write(&batch)
            .map_err(|e| io_failure(format!("Failed to write Parquet rows: {e}")))?;
    }

    writer
        .close()
        .map_err(|e| io_failure(format!("Failed to finalize Parquet file: {e}")))?;

    tracing::debug!(path = %path.display(), rows = table.len(), "Parquet file written");
    Ok(())
}
