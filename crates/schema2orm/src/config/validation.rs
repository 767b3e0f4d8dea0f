//! Configuration validation.

use super::Config;
use crate::drivers::common::SslMode;
use crate::error::{Result, SchemaMapError};
use crate::formatter::NamingConvention;

/// Validate the configuration.
pub fn validate(config: &Config) -> Result<()> {
    let conn = &config.connection;
    if conn.host.is_empty() {
        return Err(SchemaMapError::Config("connection.host is required".into()));
    }
    if conn.database.is_empty() {
        return Err(SchemaMapError::Config(
            "connection.database is required".into(),
        ));
    }
    if conn.user.is_empty() {
        return Err(SchemaMapError::Config("connection.user is required".into()));
    }
    if conn.port == 0 {
        return Err(SchemaMapError::Config(
            "connection.port must be greater than 0".into(),
        ));
    }
    if let Some(0) = conn.connect_timeout_secs {
        return Err(SchemaMapError::Config(
            "connection.connect_timeout_secs must be at least 1".into(),
        ));
    }
    SslMode::parse(&conn.ssl_mode)?;

    let prefs = &config.preferences;
    if prefs.naming_convention == NamingConvention::Prefixed && prefs.field_prefix.is_empty() {
        return Err(SchemaMapError::Config(
            "preferences.field_prefix is required for the prefixed naming convention".into(),
        ));
    }
    if let Some(seq) = &prefs.sequence {
        if seq.trim().is_empty() {
            return Err(SchemaMapError::Config(
                "preferences.sequence cannot be empty when set".into(),
            ));
        }
    }

    Ok(())
}
