//! Error types for form validation and session preconditions.
//!
//! Pipeline failures are an application concern and live in the
//! `incident-search` crate.

use thiserror::Error;

/// A form submission that cannot start the pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field was empty or whitespace.
    #[error("Please fill in the {} field.", field_words(.field))]
    MissingField { field: &'static str },

    /// A field held a value outside its accepted set.
    #[error("Invalid {} '{value}'. Expected one of: {expected}.", field_words(.field))]
    InvalidValue {
        field: &'static str,
        value: String,
        expected: &'static str,
    },
}

impl ValidationError {
    /// Form key of the offending field.
    pub fn field(&self) -> &'static str {
        match self {
            ValidationError::MissingField { field } => field,
            ValidationError::InvalidValue { field, .. } => field,
        }
    }
}

/// An action that needs a completed search was requested without one.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("No search data to {action}")]
    NoActiveSearch { action: &'static str },
}

/// Split a camelCase form key into lower-case words: `errorDescription` → `error description`.
pub fn field_words(field: &str) -> String {
    let mut out = String::with_capacity(field.len() + 4);
    for c in field.chars() {
        if c.is_ascii_uppercase() {
            out.push(' ');
            out.push(c.to_ascii_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}
