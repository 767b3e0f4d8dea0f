//! Error types for schema inspection and mapping generation.

use thiserror::Error;

use crate::typemap::ServerKind;

/// Main error type for schema2orm operations.
#[derive(Error, Debug)]
pub enum SchemaMapError {
    /// Configuration error (invalid YAML values, missing fields, bad identifiers)
    #[error("Configuration error: {0}")]
    Config(String),

    /// The database could not be reached or a catalog query failed
    #[error("Database connection failure: {0}")]
    ConnectionFailure(#[from] tokio_postgres::Error),

    /// The data type mapper has no entry for a native type
    #[error("Unsupported {server} data type '{data_type}'")]
    UnsupportedType {
        server: ServerKind,
        data_type: String,
    },

    /// Catalog metadata violates an assumption of the schema graph
    #[error("Malformed schema: {0}")]
    MalformedSchema(String),

    /// IO error (file operations)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML serialization/deserialization error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl SchemaMapError {
    /// Create an UnsupportedType error
    pub fn unsupported(server: ServerKind, data_type: impl Into<String>) -> Self {
        SchemaMapError::UnsupportedType {
            server,
            data_type: data_type.into(),
        }
    }

    /// Create a MalformedSchema error
    pub fn malformed(message: impl Into<String>) -> Self {
        SchemaMapError::MalformedSchema(message.into())
    }

    /// Process exit code used by the CLI for this error.
    pub fn exit_code(&self) -> u8 {
        match self {
            SchemaMapError::Config(_) | SchemaMapError::Yaml(_) | SchemaMapError::Json(_) => 1,
            SchemaMapError::ConnectionFailure(_) => 2,
            SchemaMapError::UnsupportedType { .. } => 3,
            SchemaMapError::MalformedSchema(_) => 4,
            SchemaMapError::Io(_) => 7,
        }
    }

    /// Format error with full details including error chain
    pub fn format_detailed(&self) -> String {
        let mut output = format!("Error: {}\n", self);

        let mut source = std::error::Error::source(self);
        let mut depth = 1;
        while let Some(err) = source {
            output.push_str(&format!("\nCaused by:\n  {}: {}", depth, err));
            source = err.source();
            depth += 1;
        }

        output
    }
}

/// Result type alias for schema2orm operations.
pub type Result<T> = std::result::Result<T, SchemaMapError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unsupported_type_message() {
        let err = SchemaMapError::unsupported(ServerKind::PostgreSql, "tsvector");
        assert_eq!(
            err.to_string(),
            "Unsupported PostgreSQL data type 'tsvector'"
        );
        assert_eq!(err.exit_code(), 3);
    }

    #[test]
    fn test_exit_codes() {
        assert_eq!(SchemaMapError::Config("x".into()).exit_code(), 1);
        assert_eq!(SchemaMapError::malformed("x").exit_code(), 4);
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        assert_eq!(SchemaMapError::from(io).exit_code(), 7);
    }

    #[test]
    fn test_format_detailed_starts_with_message() {
        let err = SchemaMapError::malformed("foreign key 'x' has no columns");
        let detailed = err.format_detailed();
        assert!(detailed.starts_with("Error: Malformed schema: foreign key 'x' has no columns"));
    }
}
