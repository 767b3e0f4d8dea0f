//! Configuration loading and validation.

mod types;
mod validation;

pub use types::*;

use crate::error::Result;
use std::path::Path;

impl Config {
    /// Load configuration from a YAML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse configuration from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: Config = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        validation::validate(self)
    }
}

impl ConnectionConfig {
    /// Build a libpq-style connection string (password omitted).
    pub fn display_string(&self) -> String {
        format!(
            "host={} port={} dbname={} user={} sslmode={}",
            self.host, self.port, self.database, self.user, self.ssl_mode
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formatter::NamingConvention;
    use crate::generator::MappingStyle;
    use crate::mapping::Language;
    use std::io::Write;

    const MINIMAL: &str = r#"
connection:
  host: db.local
  database: shop
  user: app
"#;

    #[test]
    fn test_minimal_config_uses_defaults() {
        let config = Config::from_yaml(MINIMAL).unwrap();
        assert_eq!(config.connection.port, 5432);
        assert_eq!(config.connection.schema, "public");
        assert_eq!(config.connection.ssl_mode, "disable");
        assert_eq!(config.preferences, Preferences::default());
        assert!(config.preferences.include_length_and_scale);
    }

    #[test]
    fn test_preferences_parse() {
        let yaml = r#"
connection:
  host: db.local
  database: shop
  user: app
preferences:
  language: vb
  style: fluent
  naming_convention: camel
  prefix_removal: ["tbl_"]
  include_has_many: false
  sequence: users_id_seq
  pluralization:
    enabled: false
"#;
        let config = Config::from_yaml(yaml).unwrap();
        let prefs = &config.preferences;
        assert_eq!(prefs.language, Language::VisualBasic);
        assert_eq!(prefs.style, MappingStyle::Fluent);
        assert_eq!(prefs.naming_convention, NamingConvention::Camel);
        assert_eq!(prefs.prefix_removal, vec!["tbl_".to_string()]);
        assert!(!prefs.include_has_many);
        assert_eq!(prefs.sequence.as_deref(), Some("users_id_seq"));
        assert!(!prefs.pluralization.enabled);
        // Untouched fields keep their defaults.
        assert!(prefs.include_foreign_keys);
        assert_eq!(prefs.namespace, "Domain");
    }

    #[test]
    fn test_missing_connection_is_error() {
        assert!(Config::from_yaml("preferences: {}").is_err());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{}", MINIMAL).unwrap();
        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.connection.host, "db.local");
    }

    #[test]
    fn test_display_string_omits_password() {
        let mut config = Config::from_yaml(MINIMAL).unwrap();
        config.connection.password = "hunter2".to_string();
        let s = config.connection.display_string();
        assert_eq!(s, "host=db.local port=5432 dbname=shop user=app sslmode=disable");
    }
}
