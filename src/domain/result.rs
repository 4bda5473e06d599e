//! Result type alias for ampsync

use super::errors::AmpsyncError;

/// Result type alias for ampsync operations
///
/// Uses `AmpsyncError` as the error type. Stage internals return their own
/// error enums, which convert into `AmpsyncError` with `?`.
///
/// # Examples
///
/// ```
/// use ampsync::domain::result::Result;
/// use ampsync::domain::errors::AmpsyncError;
///
/// fn example_function() -> Result<String> {
///     Ok("success".to_string())
/// }
///
/// fn failing_function() -> Result<()> {
///     Err(AmpsyncError::Validation("Invalid input".to_string()))
/// }
/// ```
pub type Result<T> = std::result::Result<T, AmpsyncError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::errors::{AmpsyncError, ExportError};

    #[test]
    fn test_stage_error_with_question_mark() {
        fn stage() -> std::result::Result<(), ExportError> {
            Err(ExportError::Cancelled)
        }

        fn outer() -> Result<()> {
            stage()?;
            Ok(())
        }

        assert!(matches!(
            outer(),
            Err(AmpsyncError::Export(ExportError::Cancelled))
        ));
    }
}
