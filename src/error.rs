//! Error type shared by the store and every [`ViewService`](crate::service::ViewService)
//! implementation.
//!
//! The only user-facing failure is a rejected argument: an empty identifier
//! or a negative result limit. Broken heap bookkeeping is a bug and panics
//! instead of being reported here.

use thiserror::Error;

/// Errors returned by view counter operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ViewError {
    /// The caller passed an argument the operation cannot accept.
    ///
    /// The payload names the violated precondition.
    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),
}

/// Result type for view counter operations.
pub type Result<T> = std::result::Result<T, ViewError>;

/// Rejects empty identifiers.
pub(crate) fn validate_id(id: &str) -> Result<()> {
    if id.is_empty() {
        return Err(ViewError::InvalidArgument("id must not be empty"));
    }
    Ok(())
}

/// Converts a signed result limit into a length, rejecting negative values.
///
/// Limits beyond `usize::MAX` saturate; they are clamped to the number of
/// known ids anyway.
pub(crate) fn validate_limit(n: i64) -> Result<usize> {
    if n < 0 {
        return Err(ViewError::InvalidArgument("n must not be negative"));
    }
    Ok(usize::try_from(n).unwrap_or(usize::MAX))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_id() {
        assert!(validate_id("video1").is_ok());
        assert_eq!(
            validate_id(""),
            Err(ViewError::InvalidArgument("id must not be empty"))
        );
    }

    #[test]
    fn test_validate_limit() {
        assert_eq!(validate_limit(0), Ok(0));
        assert_eq!(validate_limit(7), Ok(7));
        assert!(matches!(
            validate_limit(-1),
            Err(ViewError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_error_display() {
        let err = ViewError::InvalidArgument("n must not be negative");
        assert_eq!(err.to_string(), "invalid argument: n must not be negative");
    }
}
