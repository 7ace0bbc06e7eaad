//! # Error Types
//!
//! Domain-specific error types for bazaar-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  bazaar-core errors (this file)                                        │
//! │  ├── ParseError   - A remote document could not become a domain model  │
//! │  └── MoneyError   - An amount could not become Money                   │
//! │                                                                         │
//! │  bazaar-db errors (separate crate)                                     │
//! │  └── DbError      - Cache operation failures                           │
//! │                                                                         │
//! │  bazaar-sync errors (separate crate)                                   │
//! │  └── SyncError    - Remote / config / coordinator failures             │
//! │                                                                         │
//! │  ParseError never leaves the sync batch: the record is logged and      │
//! │  dropped, the rest of the snapshot is applied.                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

// =============================================================================
// Parse Error
// =============================================================================

/// A remote document that cannot be turned into a domain model.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseError {
    /// The document body is not a JSON object.
    #[error("document {id} is not an object")]
    NotAnObject { id: String },

    /// The document has an empty identifier.
    #[error("document has no id")]
    MissingId,

    /// A field holds a value that has no sensible default substitution.
    ///
    /// ## When This Occurs
    /// - `price` is a non-numeric string such as `"twelve"`
    /// - `price` is an object, array or boolean
    #[error("field '{field}' is invalid: {reason}")]
    InvalidField { field: String, reason: String },
}

impl ParseError {
    /// Creates an InvalidField error.
    pub fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        ParseError::InvalidField {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

// =============================================================================
// Money Error
// =============================================================================

/// Errors converting a decimal amount to [`Money`](crate::Money).
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MoneyError {
    /// NaN or infinity.
    #[error("amount is not a finite number")]
    NotFinite,

    /// Prices are never negative.
    #[error("amount {0} is negative")]
    Negative(f64),

    /// Does not fit in i64 cents.
    #[error("amount {0} is out of range")]
    OutOfRange(f64),

    /// A string that does not hold a decimal number.
    #[error("'{0}' is not a decimal amount")]
    NotANumber(String),
}

/// Convenience type alias for parse results.
pub type ParseResult<T> = Result<T, ParseError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = ParseError::invalid("price", "expected a number");
        assert_eq!(err.to_string(), "field 'price' is invalid: expected a number");

        let err = ParseError::NotAnObject { id: "p-1".into() };
        assert_eq!(err.to_string(), "document p-1 is not an object");
    }

    #[test]
    fn test_money_error_messages() {
        assert_eq!(
            MoneyError::NotANumber("abc".into()).to_string(),
            "'abc' is not a decimal amount"
        );
    }
}
