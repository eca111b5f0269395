//! Input validation errors.

use thiserror::Error;

/// Reasons a series cannot be analysed.
///
/// None of these are fatal to the host: [`analyze`](super::analyze) maps every
/// variant to an empty analysis.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SpcError {
    #[error("Missing positions: no category axis was bound")]
    MissingPositions,

    #[error("Missing values: no numeric measure was bound")]
    MissingValues,

    #[error("Length mismatch: {positions} positions, {values} values")]
    LengthMismatch { positions: usize, values: usize },

    #[error("Label length mismatch: expected {expected}, got {got}")]
    LabelLengthMismatch { expected: usize, got: usize },

    #[error("Mixed position types at index {index}: numeric and temporal cannot share an axis")]
    MixedPositionTypes { index: usize },

    #[error("Non-finite input at index {index}")]
    NonFiniteValue { index: usize },
}

/// Result type for SPC input handling.
pub type Result<T> = std::result::Result<T, SpcError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_length_mismatch_display() {
        let error = SpcError::LengthMismatch {
            positions: 4,
            values: 3,
        };
        assert_eq!(error.to_string(), "Length mismatch: 4 positions, 3 values");
    }

    #[test]
    fn test_label_length_mismatch_display() {
        let error = SpcError::LabelLengthMismatch {
            expected: 5,
            got: 2,
        };
        assert_eq!(error.to_string(), "Label length mismatch: expected 5, got 2");
    }

    #[test]
    fn test_non_finite_display() {
        let error = SpcError::NonFiniteValue { index: 7 };
        assert_eq!(error.to_string(), "Non-finite input at index 7");
    }

    #[test]
    fn test_error_implements_std_error() {
        let error: Box<dyn std::error::Error> = Box::new(SpcError::MissingValues);
        assert!(!error.to_string().is_empty());
    }

    #[test]
    fn test_error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<SpcError>();
    }
}
