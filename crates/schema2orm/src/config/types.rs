//! Configuration type definitions.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::formatter::{NamingConvention, PluralizationConfig};
use crate::generator::{FieldGenerationConvention, MappingStyle};
use crate::mapping::Language;

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Database connection (PostgreSQL).
    pub connection: ConnectionConfig,

    /// Code generation preferences.
    #[serde(default)]
    pub preferences: Preferences,
}

/// PostgreSQL connection configuration.
#[derive(Clone, Serialize, Deserialize)]
pub struct ConnectionConfig {
    /// Database host.
    pub host: String,

    /// Database port (default: 5432).
    #[serde(default = "default_pg_port")]
    pub port: u16,

    /// Database name.
    pub database: String,

    /// Username.
    pub user: String,

    /// Password.
    #[serde(default)]
    pub password: String,

    /// Default owner/schema for table lookups (default: "public").
    #[serde(default = "default_public_schema")]
    pub schema: String,

    /// SSL mode (default: "disable").
    #[serde(default = "default_disable")]
    pub ssl_mode: String,

    /// Connect timeout in seconds. Unset uses the client default.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connect_timeout_secs: Option<u64>,
}

impl fmt::Debug for ConnectionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("database", &self.database)
            .field("user", &self.user)
            .field("password", &"[REDACTED]")
            .field("schema", &self.schema)
            .field("ssl_mode", &self.ssl_mode)
            .field("connect_timeout_secs", &self.connect_timeout_secs)
            .finish()
    }
}

/// Code generation preferences.
///
/// Passed by reference to mappers and generators; read-only during a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Preferences {
    /// Target language syntax (default: csharp).
    pub language: Language,

    /// Mapping family (default: by-code).
    pub style: MappingStyle,

    /// Property naming convention (default: pascal).
    pub naming_convention: NamingConvention,

    /// Prefix used by the `prefixed` naming convention (default: "_").
    pub field_prefix: String,

    /// Prefixes stripped from table and column names before formatting.
    pub prefix_removal: Vec<String>,

    /// Emit length/precision/scale clauses (default: true).
    pub include_length_and_scale: bool,

    /// Map foreign keys as navigation properties instead of plain columns (default: true).
    pub include_foreign_keys: bool,

    /// Name foreign key properties after the referenced table instead of
    /// the column (default: true).
    pub name_fk_as_foreign_table: bool,

    /// Emit one-to-many collections (default: true).
    pub include_has_many: bool,

    /// How entity members are generated; `field` also selects field access in mappings.
    pub field_generation: FieldGenerationConvention,

    /// Pluralization rules.
    pub pluralization: PluralizationConfig,

    /// Prefix for generated class names.
    pub class_name_prefix: String,

    /// Namespace of the entity classes (default: "Domain").
    pub namespace: String,

    /// Namespace of the mapping classes (default: "Domain.Mappings").
    pub mapping_namespace: String,

    /// Generate partial classes (default: false).
    pub generate_partial_classes: bool,

    /// Sequence backing the primary key. Set means the key uses a sequence generator.
    pub sequence: Option<String>,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            language: Language::default(),
            style: MappingStyle::default(),
            naming_convention: NamingConvention::default(),
            field_prefix: "_".to_string(),
            prefix_removal: Vec::new(),
            include_length_and_scale: true,
            include_foreign_keys: true,
            name_fk_as_foreign_table: true,
            include_has_many: true,
            field_generation: FieldGenerationConvention::default(),
            pluralization: PluralizationConfig::default(),
            class_name_prefix: String::new(),
            namespace: "Domain".to_string(),
            mapping_namespace: "Domain.Mappings".to_string(),
            generate_partial_classes: false,
            sequence: None,
        }
    }
}

fn default_pg_port() -> u16 {
    5432
}

fn default_public_schema() -> String {
    "public".to_string()
}

fn default_disable() -> String {
    "disable".to_string()
}
