//! Error types for schema construction and validation.
//!
//! One family, fail-fast: every failure aborts the enclosing construction,
//! `validate_schema`, or `validate_data` call. There is no partial success
//! and no retry anywhere in the crate.

use thiserror::Error;

use crate::schema::SchemaKind;

/// Result type for schema operations
pub type SchemaResult<T> = Result<T, SchemaError>;

/// The single error family for the crate.
#[derive(Debug, Clone, Error)]
pub enum SchemaError {
    /// The schema itself is malformed
    #[error("invalid schema: {0}")]
    SchemaInvalid(String),

    /// A value does not conform to its schema
    #[error("invalid data: {0}")]
    DataInvalid(String),

    /// An array defined both or neither of its two forms
    #[error("an array must define exactly one of 'constType' or 'constLength'")]
    AmbiguousArrayForm,

    /// An object did not supply its field list
    #[error("an object must define a 'fields' list")]
    MissingFields,

    /// A `$ref` could not be fetched, parsed, or validated
    #[error("unreachable reference '{url}': {cause}")]
    ReferenceUnreachable {
        /// The locator that failed to resolve
        url: String,
        /// What went wrong while resolving it
        cause: ReferenceError,
    },

    /// The root of a schema document was not an object or an array
    #[error("the root of a schema must be 'object' or 'array', not '{0}'")]
    RootKind(SchemaKind),

    /// The root of a schema document was marked optional
    #[error("the root of a schema cannot be optional")]
    RootOptional,
}

impl SchemaError {
    /// Create a schema-invalid error
    pub fn schema_invalid(reason: impl Into<String>) -> Self {
        Self::SchemaInvalid(reason.into())
    }

    /// Create a data-invalid error
    pub fn data_invalid(reason: impl Into<String>) -> Self {
        Self::DataInvalid(reason.into())
    }

    /// Create a reference-unreachable error
    pub fn unreachable(url: impl Into<String>, cause: ReferenceError) -> Self {
        Self::ReferenceUnreachable {
            url: url.into(),
            cause,
        }
    }
}

/// Causes of a reference-resolution failure.
#[derive(Debug, Clone, Error)]
pub enum ReferenceError {
    /// The transport failed or returned a non-success status
    #[error("fetch failed: {0}")]
    Fetch(String),

    /// The fetch succeeded but the body was empty
    #[error("the referenced document is empty")]
    EmptyBody,

    /// The body was not parseable as JSON
    #[error("the referenced document is not JSON: {0}")]
    NotJson(String),

    /// The body parsed but was not a valid schema document
    #[error("the referenced document is not a valid schema: {0}")]
    Invalid(Box<SchemaError>),
}

impl From<SchemaError> for ReferenceError {
    fn from(err: SchemaError) -> Self {
        ReferenceError::Invalid(Box::new(err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_carries_reason() {
        let err = SchemaError::schema_invalid("duplicate field name: x");
        assert!(format!("{}", err).contains("duplicate field name: x"));
    }

    #[test]
    fn test_unreachable_reports_url_and_cause() {
        let err = SchemaError::unreachable("http://localhost/s.json", ReferenceError::EmptyBody);
        let display = format!("{}", err);
        assert!(display.contains("http://localhost/s.json"));
        assert!(display.contains("empty"));
    }

    #[test]
    fn test_root_kind_names_offending_kind() {
        let err = SchemaError::RootKind(SchemaKind::Boolean);
        assert!(format!("{}", err).contains("'boolean'"));
    }
}
