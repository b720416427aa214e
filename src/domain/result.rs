//! Result type alias for Silo
//!
//! This module provides a convenient Result type alias that uses SiloError
//! as the error type.

use super::errors::SiloError;

/// Result type alias for Silo operations
///
/// This is a convenience type alias that uses `SiloError` as the error type.
/// Use this throughout the codebase for fallible operations.
///
/// # Examples
///
/// ```
/// use silo::domain::result::Result;
/// use silo::domain::errors::SiloError;
///
/// fn example_function() -> Result<String> {
///     Ok("success".to_string())
/// }
///
/// fn failing_function() -> Result<()> {
///     Err(SiloError::SchemaValidation("missing column".to_string()))
/// }
/// ```
pub type Result<T> = std::result::Result<T, SiloError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::errors::SiloError;

    #[test]
    fn test_result_ok() {
        let result: Result<i32> = Ok(42);
        assert!(result.is_ok());
    }

    #[test]
    fn test_result_err() {
        let result: Result<i32> = Err(SiloError::Other("test error".to_string()));
        assert!(result.is_err());
    }

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
