//! Identifier validation for catalog lookups.
//!
//! Owner, table and column names are always sent as bind parameters, so no
//! quoting is needed. They are still checked up front so a bad name fails
//! with a clear configuration error instead of an empty result set.

use crate::error::{Result, SchemaMapError};

/// Maximum identifier length (PostgreSQL truncates at 63 bytes).
const MAX_IDENTIFIER_LENGTH: usize = 63;

/// Validate an identifier.
///
/// Rejects:
/// - Empty identifiers
/// - Identifiers containing null bytes
/// - Identifiers exceeding maximum length
///
/// # Errors
///
/// Returns `SchemaMapError::Config` for invalid identifiers with a descriptive message.
pub fn validate_identifier(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(SchemaMapError::Config(
            "Identifier cannot be empty".to_string(),
        ));
    }

    if name.contains('\0') {
        return Err(SchemaMapError::Config(format!(
            "Identifier contains null byte: {:?}",
            name
        )));
    }

    if name.len() > MAX_IDENTIFIER_LENGTH {
        return Err(SchemaMapError::Config(format!(
            "Identifier exceeds maximum length of {} bytes (got {} bytes): {:?}",
            MAX_IDENTIFIER_LENGTH,
            name.len(),
            name
        )));
    }

    Ok(())
}

/// Build a C# / VB string literal body for a catalog name.
///
/// Names end up inside double-quoted literals of the generated code, so
/// embedded quotes and backslashes are escaped C#-style. VB doubles quotes.
pub fn escape_csharp_literal(name: &str) -> String {
    name.replace('\\', "\\\\").replace('"', "\\\"")
}

/// VB string literal body: quotes are doubled.
pub fn escape_vb_literal(name: &str) -> String {
    name.replace('"', "\"\"")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_identifier_valid() {
        assert!(validate_identifier("users").is_ok());
        assert!(validate_identifier("Order Lines").is_ok());
        assert!(validate_identifier(&"a".repeat(63)).is_ok());
    }

    #[test]
    fn test_validate_identifier_rejects_empty() {
        assert!(validate_identifier("").is_err());
    }

    #[test]
    fn test_validate_identifier_rejects_null_byte() {
        let err = validate_identifier("users\0").unwrap_err();
        assert!(err.to_string().contains("null byte"));
    }

    #[test]
    fn test_validate_identifier_rejects_too_long() {
        assert!(validate_identifier(&"a".repeat(64)).is_err());
    }

    #[test]
    fn test_escape_literals() {
        assert_eq!(escape_csharp_literal("plain"), "plain");
        assert_eq!(escape_csharp_literal("a\"b"), "a\\\"b");
        assert_eq!(escape_vb_literal("a\"b"), "a\"\"b");
    }
}
