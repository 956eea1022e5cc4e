//! Inspect command implementation
//!
//! Reads a CSV written by `run` and prints row count, checksum and how many
//! values each column holds.

use crate::adapters::file::checksum::checksum_file;
use crate::adapters::file::read_delimited;
use crate::cli::exit_code;
use crate::domain::{FlatRecord, Table};
use clap::Args;
use std::path::Path;

/// Arguments for the inspect command
#[derive(Args, Debug)]
pub struct InspectArgs {
    /// CSV file to inspect
    pub path: String,
}

/// Per-column fill counts of a table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableProfile {
    pub rows: usize,
    /// Non-empty values per column, in [`FlatRecord::FIELD_NAMES`] order
    pub filled: [usize; 11],
    pub age_min: Option<i32>,
    pub age_max: Option<i32>,
}

impl TableProfile {
    pub fn of(table: &Table) -> Self {
        let mut filled = [0usize; 11];
        let mut age_min: Option<i32> = None;
        let mut age_max: Option<i32> = None;

        for record in table {
            if let Some(age) = record.patient_age {
                filled[0] += 1;
                age_min = Some(age_min.map_or(age, |m| m.min(age)));
                age_max = Some(age_max.map_or(age, |m| m.max(age)));
            }
            for (i, field) in record.text_fields().iter().enumerate() {
                if field.is_some() {
                    filled[i + 1] += 1;
                }
            }
        }

        Self {
            rows: table.len(),
            filled,
            age_min,
            age_max,
        }
    }
}

impl InspectArgs {
    /// Execute the inspect command
    pub async fn execute(&self) -> anyhow::Result<i32> {
        let path = Path::new(&self.path);
        tracing::info!(path = %path.display(), "Inspecting output file");

        let table = match read_delimited(path) {
            Ok(t) => t,
            Err(e) => {
                tracing::error!(error = %e, "Failed to read output file");
                eprintln!("❌ {e}");
                return Ok(exit_code::FATAL);
            }
        };
        let checksum = checksum_file(path)?;
        let profile = TableProfile::of(&table);

        println!("📄 {}", path.display());
        println!("  Rows: {}", profile.rows);
        println!("  SHA-256: {checksum}");
        if let (Some(min), Some(max)) = (profile.age_min, profile.age_max) {
            println!("  Age range: {min}..={max}");
        }
        println!();
        println!("  {:<32} {:>8}", "column", "filled");
        for (name, count) in FlatRecord::FIELD_NAMES.iter().zip(profile.filled) {
            println!("  {name:<32} {count:>8}");
        }
        println!();

        Ok(exit_code::SUCCESS)
    }
}
