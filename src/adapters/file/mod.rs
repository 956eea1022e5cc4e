//! Local file outputs
//!
//! Writes the table as CSV and, when enabled, Snappy-compressed Parquet
//! into the configured output directory. The resulting [`FileOutputs`] is
//! what the bucket upload consumes.

pub mod checksum;
pub mod columnar;
pub mod delimited;

pub use columnar::write_columnar;
pub use delimited::{read_delimited, write_delimited};

use crate::config::OutputConfig;
use crate::domain::{EtlError, Result, Table};
use std::path::{Path, PathBuf};

/// Content type of the delimited file
pub const CSV_CONTENT_TYPE: &str = "text/csv";

/// Content type of the columnar file
pub const PARQUET_CONTENT_TYPE: &str = "application/vnd.apache.parquet";

/// One file written to disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputFile {
    pub path: PathBuf,
    /// Hex-encoded SHA-256 of the file contents
    pub sha256: String,
    pub size_bytes: u64,
}

impl OutputFile {
    fn from_written(path: PathBuf) -> Result<Self> {
        let sha256 = checksum::checksum_file(&path)?;
        let size_bytes = std::fs::metadata(&path)
            .map_err(|e| EtlError::IoFailure {
                path: path.display().to_string(),
                message: format!("Failed to stat file: {e}"),
            })?
            .len();
        Ok(Self {
            path,
            sha256,
            size_bytes,
        })
    }
}

/// Files produced by [`write_outputs`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileOutputs {
    pub csv: OutputFile,
    /// Present when columnar output is enabled
    pub parquet: Option<OutputFile>,
}

/// Write the CSV (and optionally Parquet) files for `table`
///
/// Creates the output directory if needed and overwrites existing files.
///
/// # Errors
///
/// Returns [`EtlError::IoFailure`] naming the path that failed.
pub fn write_outputs(table: &Table, config: &OutputConfig) -> Result<FileOutputs> {
    let directory = Path::new(&config.directory);
    std::fs::create_dir_all(directory).map_err(|e| EtlError::IoFailure {
        path: directory.display().to_string(),
        message: format!("Failed to create output directory: {e}"),
    })?;

    let csv_path = directory.join(&config.csv_file_name);
    write_delimited(table, &csv_path)?;
    let csv = OutputFile::from_written(csv_path)?;

    let parquet = if config.columnar_enabled {
        let parquet_path = directory.join(&config.parquet_file_name);
        write_columnar(table, &parquet_path)?;
        Some(OutputFile::from_written(parquet_path)?)
    } else {
        None
    };

    tracing::info!(
        csv = %csv.path.display(),
        parquet = ?parquet.as_ref().map(|p| p.path.display().to_string()),
        rows = table.len(),
        "Output files written"
    );

    Ok(FileOutputs { csv, parquet })
}
