//! SHA-256 checksums of output files

use crate::domain::{EtlError, Result};
use sha2::{Digest, Sha256};
use std::path::Path;

/// Calculate the SHA-256 checksum of raw bytes
///
/// Returns a hex-encoded string (64 characters).
///
/// # Examples
///
/// ```
/// use sus_etl::adapters::file::checksum::calculate_checksum_bytes;
///
/// let checksum = calculate_checksum_bytes(b"patient_age\n");
/// assert_eq!(checksum.len(), 64);
/// ```
pub fn calculate_checksum_bytes(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    let result = hasher.finalize();

    format!("{result:x}")
}

/// Calculate the SHA-256 checksum of a file on disk
pub fn checksum_file(path: &Path) -> Result<String> {
    let bytes = std::fs::read(path).map_err(|e| EtlError::IoFailure {
        path: path.display().to_string(),
        message: format!("Failed to read file for checksum: {e}"),
    })?;
    Ok(calculate_checksum_bytes(&bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_checksum_known_value() {
        assert_eq!(
            calculate_checksum_bytes(b"abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_checksum_file_matches_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.csv");
        std::fs::write(&path, b"a,b\n1,2\n").unwrap();

        assert_eq!(
            checksum_file(&path).unwrap(),
            calculate_checksum_bytes(b"a,b\n1,2\n")
        );
    }

    #[test]
    fn test_checksum_missing_file() {
        let result = checksum_file(Path::new("/nonexistent/sus_data.csv"));
        assert!(matches!(result, Err(EtlError::IoFailure { .. })));
    }
}
