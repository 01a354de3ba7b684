//! # Error Hierarchy
//!
//! Structured validation errors for the finance domain primitives, built
//! with `thiserror`. Each variant carries the rejected input so operators
//! can diagnose bad submissions without guesswork.

use thiserror::Error;

/// Validation errors raised when constructing domain primitives.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Amount string could not be parsed as a decimal money value.
    #[error("invalid amount: \"{0}\" (expected a non-negative decimal with at most 2 fractional digits)")]
    InvalidAmount(String),

    /// Amount is representable but exceeds the supported range.
    #[error("amount out of range: \"{0}\"")]
    AmountOverflow(String),

    /// A required text field was empty after trimming.
    #[error("{field} must not be empty")]
    EmptyField {
        /// Name of the offending field.
        field: &'static str,
    },

    /// A text field exceeded its length limit.
    #[error("{field} must not exceed {max} characters")]
    TooLong {
        /// Name of the offending field.
        field: &'static str,
        /// Maximum permitted length.
        max: usize,
    },

    /// Department is not in the configured catalog.
    #[error("unknown department: \"{0}\"")]
    UnknownDepartment(String),

    /// Category does not belong to the catalog for the transaction type.
    #[error("unknown {kind} category: \"{category}\"")]
    UnknownCategory {
        /// Transaction type the category was checked against.
        kind: String,
        /// The rejected category.
        category: String,
    },

    /// Month key is not in `YYYY-MM` form.
    #[error("invalid month: \"{0}\" (expected YYYY-MM)")]
    InvalidMonth(String),

    /// Calendar date is not in `YYYY-MM-DD` form.
    #[error("invalid date: \"{0}\" (expected YYYY-MM-DD)")]
    InvalidDate(String),

    /// Signature payload is not a usable image data URL.
    #[error("invalid signature image: {0}")]
    InvalidSignature(String),

    /// Audit module name is not recognised.
    #[error("unknown audit module: \"{0}\"")]
    UnknownModule(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_field_names_the_field() {
        let err = ValidationError::EmptyField {
            field: "requester_name",
        };
        assert_eq!(err.to_string(), "requester_name must not be empty");
    }

    #[test]
    fn invalid_amount_carries_input() {
        let err = ValidationError::InvalidAmount("12.345".into());
        assert!(err.to_string().contains("12.345"));
    }

    #[test]
    fn unknown_category_names_kind() {
        let err = ValidationError::UnknownCategory {
            kind: "INCOME".into(),
            category: "Fuel".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("INCOME"));
        assert!(msg.contains("Fuel"));
    }
}
