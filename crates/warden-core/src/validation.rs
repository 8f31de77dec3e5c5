//! Validation utilities.

use crate::WardenError;
use validator::{Validate, ValidationErrors};

/// Extension trait for validation.
pub trait ValidateExt: Validate {
    /// Validates the struct and returns a `WardenError` on failure.
    fn validate_request(&self) -> Result<(), WardenError> {
        self.validate().map_err(validation_errors_to_warden_error)
    }
}

impl<T: Validate> ValidateExt for T {}

/// Converts `validator::ValidationErrors` to `WardenError`.
///
/// Field errors are flattened into one `field: message` list, sorted by field
/// name so the message is stable.
#[must_use]
pub fn validation_errors_to_warden_error(errors: ValidationErrors) -> WardenError {
    let mut fields: Vec<(String, String)> = errors
        .field_errors()
        .iter()
        .flat_map(|(field, errors)| {
            errors.iter().map(move |error| {
                (
                    (*field).to_string(),
                    error
                        .message
                        .as_ref()
                        .map_or_else(|| error.code.to_string(), ToString::to_string),
                )
            })
        })
        .collect();
    fields.sort();

    let message = fields
        .iter()
        .map(|(field, message)| format!("{}: {}", field, message))
        .collect::<Vec<_>>()
        .join("; ");

    WardenError::Validation(message)
}

/// Custom field validators.
pub mod rules {
    use validator::ValidationError;

    /// Validates that a bearer token looks like a compact JWS
    /// (three dot-separated segments).
    pub fn compact_token(token: &str) -> Result<(), ValidationError> {
        if token.split('.').count() != 3 || token.split('.').any(str::is_empty) {
            return Err(ValidationError::new("token_malformed"));
        }
        Ok(())
    }
}
