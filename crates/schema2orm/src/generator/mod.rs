//! Class generation.
//!
//! - [`MappingGenerator`]: one mapping class per table, in the configured
//!   [`MappingStyle`]
//! - [`EntityGenerator`]: the domain class the mapping targets
//!
//! Both produce a [`GeneratedCode`] holding the full source file text.

pub mod entity;
pub mod mapping;

pub use entity::EntityGenerator;
pub use mapping::MappingGenerator;

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::config::Preferences;
use crate::formatter::{ConventionFormatter, TextFormatter};
use crate::mapping::{tabs, Language, SyntaxFlavor};

/// Mapping families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MappingStyle {
    /// NHibernate mapping-by-code.
    #[default]
    ByCode,
    /// Fluent NHibernate.
    Fluent,
    /// Dapper.FluentMap with Dommel.
    DapperFluent,
}

impl MappingStyle {
    /// Base class of the generated mapping.
    pub fn base_type(&self, entity: &str, flavor: SyntaxFlavor) -> String {
        let generic = match self {
            MappingStyle::ByCode => "ClassMapping",
            MappingStyle::Fluent => "ClassMap",
            MappingStyle::DapperFluent => "DommelEntityMap",
        };
        if flavor.is_vb() {
            format!("{}(Of {})", generic, entity)
        } else {
            format!("{}<{}>", generic, entity)
        }
    }

    fn imports(&self) -> &'static [&'static str] {
        match self {
            MappingStyle::ByCode => &[
                "System",
                "NHibernate",
                "NHibernate.Mapping.ByCode",
                "NHibernate.Mapping.ByCode.Conformist",
            ],
            MappingStyle::Fluent => &["System", "FluentNHibernate.Mapping"],
            MappingStyle::DapperFluent => &["Dapper.FluentMap.Dommel.Mapping"],
        }
    }

    /// Whether the family maps foreign keys as navigation properties.
    pub fn supports_relationships(&self) -> bool {
        !matches!(self, MappingStyle::DapperFluent)
    }
}

impl FromStr for MappingStyle {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "by-code" | "bycode" => Ok(MappingStyle::ByCode),
            "fluent" => Ok(MappingStyle::Fluent),
            "dapper-fluent" | "dapper" => Ok(MappingStyle::DapperFluent),
            other => Err(format!(
                "unknown mapping style '{}' (expected by-code, fluent or dapper-fluent)",
                other
            )),
        }
    }
}

/// How entity members are generated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FieldGenerationConvention {
    /// `public virtual int Id { get; set; }`
    #[default]
    AutoProperty,
    /// Property over a private backing field.
    Property,
    /// Public field; mappings use field access.
    Field,
}

/// A generated source file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GeneratedCode {
    pub class_name: String,
    pub file_name: String,
    pub code: String,
}

impl GeneratedCode {
    fn new(class_name: String, language: Language, code: String) -> Self {
        Self {
            file_name: format!("{}.{}", class_name, language.file_extension()),
            class_name,
            code,
        }
    }
}

/// `{class_name_prefix}{Singular(table)}`
pub fn entity_class_name(table_name: &str, prefs: &Preferences) -> String {
    let pascal = ConventionFormatter::pascal(prefs.prefix_removal.clone(), &prefs.pluralization);
    format!("{}{}", prefs.class_name_prefix, pascal.format_singular(table_name))
}

/// `{class_name_prefix}{Singular(table)}Map`
pub fn mapping_class_name(table_name: &str, prefs: &Preferences) -> String {
    format!("{}Map", entity_class_name(table_name, prefs))
}

/// Source file skeleton: imports, namespace and class declaration around
/// pre-indented member text.
struct ClassFile<'a> {
    flavor: SyntaxFlavor,
    imports: Vec<String>,
    namespace: &'a str,
    class_name: &'a str,
    base_type: Option<String>,
    partial: bool,
}

impl ClassFile<'_> {
    fn render(&self, members: &[String]) -> String {
        let mut out = String::new();
        let body = members.join("\n");

        if self.flavor.is_vb() {
            for import in &self.imports {
                out.push_str(&format!("Imports {}\n", import));
            }
            out.push('\n');
            out.push_str(&format!("Namespace {}\n", self.namespace));
            let partial = if self.partial { "Partial " } else { "" };
            out.push_str(&format!("{}{}Public Class {}\n", tabs(1), partial, self.class_name));
            if let Some(base) = &self.base_type {
                out.push_str(&format!("{}Inherits {}\n", tabs(2), base));
                out.push('\n');
            }
            out.push_str(&body);
            out.push('\n');
            out.push_str(&format!("{}End Class\n", tabs(1)));
            out.push_str("End Namespace\n");
        } else {
            for import in &self.imports {
                out.push_str(&format!("using {};\n", import));
            }
            out.push('\n');
            out.push_str(&format!("namespace {}\n{{\n", self.namespace));
            let partial = if self.partial { "partial " } else { "" };
            let base = self
                .base_type
                .as_ref()
                .map(|b| format!(" : {}", b))
                .unwrap_or_default();
            out.push_str(&format!(
                "{}public {}class {}{}\n{}{{\n",
                tabs(1),
                partial,
                self.class_name,
                base,
                tabs(1)
            ));
            out.push_str(&body);
            out.push('\n');
            out.push_str(&format!("{}}}\n", tabs(1)));
            out.push_str("}\n");
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_class_names() {
        let prefs = Preferences::default();
        assert_eq!(entity_class_name("users", &prefs), "User");
        assert_eq!(mapping_class_name("order_lines", &prefs), "OrderLineMap");

        let prefixed = Preferences {
            class_name_prefix: "Db".to_string(),
            prefix_removal: vec!["tbl_".to_string()],
            ..Preferences::default()
        };
        assert_eq!(mapping_class_name("tbl_customers", &prefixed), "DbCustomerMap");
    }

    #[test]
    fn test_mapping_style_parse_and_serde() {
        assert_eq!("by-code".parse::<MappingStyle>().unwrap(), MappingStyle::ByCode);
        assert_eq!("dapper".parse::<MappingStyle>().unwrap(), MappingStyle::DapperFluent);
        assert!("hibernate".parse::<MappingStyle>().is_err());

        let style: MappingStyle = serde_yaml::from_str("dapper-fluent").unwrap();
        assert_eq!(style, MappingStyle::DapperFluent);
        let convention: FieldGenerationConvention = serde_yaml::from_str("auto-property").unwrap();
        assert_eq!(convention, FieldGenerationConvention::AutoProperty);
    }

    #[test]
    fn test_base_types() {
        let cs = SyntaxFlavor::new(Language::CSharp);
        let vb = SyntaxFlavor::new(Language::VisualBasic);
        assert_eq!(MappingStyle::ByCode.base_type("User", cs), "ClassMapping<User>");
        assert_eq!(MappingStyle::Fluent.base_type("User", vb), "ClassMap(Of User)");
        assert_eq!(
            MappingStyle::DapperFluent.base_type("User", cs),
            "DommelEntityMap<User>"
        );
    }

    #[test]
    fn test_generated_file_name() {
        let code = GeneratedCode::new("UserMap".to_string(), Language::VisualBasic, String::new());
        assert_eq!(code.file_name, "UserMap.vb");
    }
}
