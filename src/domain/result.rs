//! Result type alias for the SUS extract

use super::errors::EtlError;

/// Result type alias using `EtlError` as the error type
///
/// # Examples
///
/// ```
/// use sus_etl::domain::result::Result;
/// use sus_etl::domain::errors::EtlError;
///
/// fn failing_function() -> Result<()> {
///     Err(EtlError::StructuralMismatch("missing hits".to_string()))
/// }
///
/// assert!(failing_function().is_err());
/// ```
pub type Result<T> = std::result::Result<T, EtlError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_result_with_question_mark() -> Result<()> {
        fn inner() -> Result<i32> {
            Ok(42)
        }

        let value = inner()?;
        assert_eq!(value, 42);
        Ok(())
    }
}
