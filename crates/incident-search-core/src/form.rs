//! Form validation and canned sample reports.
//!
//! [`validate`] is the only way to obtain an [`ErrorReport`]: required
//! fields are checked in form order before anything is parsed, so the
//! first missing field is the one reported.

use chrono::{DateTime, Utc};

use crate::error::ValidationError;
use crate::models::{Environment, ErrorReport, FormInput, Severity};

/// Required form keys, in the order they are checked.
pub const REQUIRED_FIELDS: [&str; 3] = ["severity", "errorDescription", "environment"];

/// Validate raw form input and stamp it with the submission instant.
pub fn validate(form: &FormInput, submitted_at: DateTime<Utc>) -> Result<ErrorReport, ValidationError> {
    for field in REQUIRED_FIELDS {
        let value = match field {
            "severity" => &form.severity,
            "errorDescription" => &form.error_description,
            _ => &form.environment,
        };
        if value.trim().is_empty() {
            return Err(ValidationError::MissingField { field });
        }
    }

    let severity: Severity = form.severity.parse()?;
    let environment: Environment = form.environment.parse()?;

    Ok(ErrorReport {
        severity,
        error_code: optional(&form.error_code),
        description: form.error_description.trim().to_string(),
        app_name: optional(&form.app_name),
        environment,
        applicable_pool: optional(&form.applicable_pool),
        timestamp: submitted_at,
    })
}

fn optional(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Sample errors offered to pre-fill the form.
pub fn sample_forms() -> Vec<FormInput> {
    vec![
        FormInput {
            severity: "P2".to_string(),
            error_code: "ERR_CONNECTION_TIMEOUT".to_string(),
            error_description: "Database connection timeout after 30 seconds".to_string(),
            app_name: "UserPortal".to_string(),
            environment: "Prod".to_string(),
            applicable_pool: String::new(),
        },
        FormInput {
            severity: "P1".to_string(),
            error_code: "NULL_POINTER_EXCEPTION".to_string(),
            error_description: "NullPointerException in user authentication module".to_string(),
            app_name: "AuthService".to_string(),
            environment: "Prod".to_string(),
            applicable_pool: String::new(),
        },
    ]
}

/// Look up a sample by 1-based index.
pub fn sample_form(n: usize) -> Option<FormInput> {
    n.checked_sub(1).and_then(|i| sample_forms().into_iter().nth(i))
}
