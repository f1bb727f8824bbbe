//! Input checks for discovery and SQL calls.
//!
//! SQL text itself is passed through verbatim; only the identifiers that
//! end up in URLs or in the `resourceId` field are constrained.

use crate::errors::{ClientError, Result};

/// Check a dotted resource identifier such as `NAMESPACE.TABLE`.
///
/// Each dot-separated segment must be non-empty and made of letters,
/// digits and underscores.
pub fn identifier(field: &'static str, value: &str) -> Result<()> {
    if value.is_empty() {
        return Err(ClientError::Validation {
            field,
            reason: "must not be empty".to_string(),
        });
    }

    for segment in value.split('.') {
        if segment.is_empty() {
            return Err(ClientError::Validation {
                field,
                reason: format!("empty segment in {:?}", value),
            });
        }

        if !segment
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_')
        {
            return Err(ClientError::Validation {
                field,
                reason: format!("unsupported characters in {:?}", value),
            });
        }
    }

    Ok(())
}

/// Check a bare name used in a URL (view name, scope, column)
pub fn name(field: &'static str, value: &str) -> Result<()> {
    if value.is_empty() {
        return Err(ClientError::Validation {
            field,
            reason: "must not be empty".to_string(),
        });
    }

    if value.chars().any(char::is_whitespace) {
        return Err(ClientError::Validation {
            field,
            reason: "must not contain whitespace".to_string(),
        });
    }

    Ok(())
}

/// Check that a SQL statement is present
pub fn sql_text(value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(ClientError::Validation {
            field: "sqlText",
            reason: "must not be empty".to_string(),
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identifier_accepts_plain_and_dotted_names() {
        for value in ["NS1", "ns1.tab_2", "A.B.C", "table_3"] {
            assert!(identifier("resourceId", value).is_ok(), "{:?}", value);
        }
    }

    #[test]
    fn test_identifier_rejects_empty_segments() {
        for value in ["", ".", "ns.", ".tab", "ns..tab"] {
            assert!(
                matches!(
                    identifier("resourceId", value),
                    Err(ClientError::Validation { .. })
                ),
                "{:?}",
                value
            );
        }
    }

    #[test]
    fn test_identifier_rejects_unsafe_characters() {
        for value in ["ns tab", "ns;drop", "ns/tab", "ns-tab"] {
            assert!(
                matches!(
                    identifier("resourceId", value),
                    Err(ClientError::Validation { .. })
                ),
                "{:?}",
                value
            );
        }
    }

    #[test]
    fn test_name_rejects_empty_and_whitespace() {
        assert!(matches!(
            name("viewName", ""),
            Err(ClientError::Validation { .. })
        ));
        assert!(matches!(
            name("viewName", "my view"),
            Err(ClientError::Validation { .. })
        ));
        assert!(name("viewName", "my_view").is_ok());
    }

    #[test]
    fn test_sql_text_must_be_present() {
        assert!(matches!(
            sql_text("   "),
            Err(ClientError::Validation { .. })
        ));
        assert!(sql_text("SELECT 1").is_ok());
    }
}
