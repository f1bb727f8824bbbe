//! Caller-input checks, run before any network call.

use crate::errors::{AuthError, Result};

/// Check a user identifier: non-empty and safe to place in a URL path
pub fn user_id(value: &str) -> Result<()> {
    if value.is_empty() {
        return Err(AuthError::Validation {
            field: "userId",
            reason: "must not be empty".to_string(),
        });
    }

    if !value
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.' | '@'))
    {
        return Err(AuthError::Validation {
            field: "userId",
            reason: format!("contains unsupported characters: {:?}", value),
        });
    }

    Ok(())
}

/// Check the subscription prefix and join code pair
pub fn subscription(prefix: &str, join_code: &str) -> Result<()> {
    opaque_code("prefix", prefix)?;
    opaque_code("joinCode", join_code)
}

fn opaque_code(field: &'static str, value: &str) -> Result<()> {
    if value.is_empty() {
        return Err(AuthError::Validation {
            field,
            reason: "must not be empty".to_string(),
        });
    }

    if value.chars().any(char::is_whitespace) {
        return Err(AuthError::Validation {
            field,
            reason: "must not contain whitespace".to_string(),
        });
    }

    Ok(())
}
