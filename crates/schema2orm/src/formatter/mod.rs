//! Conversion of catalog names into .NET identifiers.
//!
//! A formatter strips configured prefixes, applies the naming convention and
//! uses the [`Inflector`] for singular/plural forms. Formatting is a pure
//! function of the input and the configured options.

mod inflector;

pub use inflector::{Inflector, PluralizationConfig};

use serde::{Deserialize, Serialize};

use crate::config::Preferences;

/// Formats raw table and column names into identifiers.
pub trait TextFormatter {
    /// Format a name with the naming convention.
    fn format_text(&self, text: &str) -> String;

    /// Format a name, then singularize the result.
    fn format_singular(&self, text: &str) -> String;

    /// Format a name, then pluralize the result.
    fn format_plural(&self, text: &str) -> String;
}

/// Identifier casing convention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NamingConvention {
    /// `user_name` -> `UserName`
    #[default]
    Pascal,
    /// `user_name` -> `userName`
    Camel,
    /// `user_name` -> `_userName` (with the configured field prefix)
    Prefixed,
    /// Names are kept as they are, apart from prefix removal.
    None,
}

/// The formatter used for every generation run.
#[derive(Debug, Clone)]
pub struct ConventionFormatter {
    convention: NamingConvention,
    field_prefix: String,
    prefix_removal: Vec<String>,
    inflector: Inflector,
}

impl ConventionFormatter {
    pub fn new(
        convention: NamingConvention,
        field_prefix: impl Into<String>,
        prefix_removal: Vec<String>,
        pluralization: &PluralizationConfig,
    ) -> Self {
        Self {
            convention,
            field_prefix: field_prefix.into(),
            prefix_removal,
            inflector: Inflector::new(pluralization),
        }
    }

    /// Build the formatter described by the preferences.
    pub fn from_preferences(prefs: &Preferences) -> Self {
        Self::new(
            prefs.naming_convention,
            prefs.field_prefix.clone(),
            prefs.prefix_removal.clone(),
            &prefs.pluralization,
        )
    }

    /// Pascal-case formatter with default options, used for class names.
    pub fn pascal(prefix_removal: Vec<String>, pluralization: &PluralizationConfig) -> Self {
        Self::new(NamingConvention::Pascal, "", prefix_removal, pluralization)
    }

    fn strip_prefix<'a>(&self, text: &'a str) -> &'a str {
        for prefix in &self.prefix_removal {
            if prefix.is_empty() || text.len() <= prefix.len() {
                continue;
            }
            let matches = text
                .get(..prefix.len())
                .map(|head| head.eq_ignore_ascii_case(prefix))
                .unwrap_or(false);
            if matches {
                if let Some(rest) = text.get(prefix.len()..) {
                    return rest;
                }
            }
        }
        text
    }
}

impl TextFormatter for ConventionFormatter {
    fn format_text(&self, text: &str) -> String {
        let stripped = self.strip_prefix(text);
        match self.convention {
            NamingConvention::Pascal => pascal_case(stripped),
            NamingConvention::Camel => camel_case(stripped),
            NamingConvention::Prefixed => format!("{}{}", self.field_prefix, camel_case(stripped)),
            NamingConvention::None => stripped.to_string(),
        }
    }

    fn format_singular(&self, text: &str) -> String {
        self.inflector.singularize(&self.format_text(text))
    }

    fn format_plural(&self, text: &str) -> String {
        self.inflector.pluralize(&self.format_text(text))
    }
}

/// Wraps a formatter for one generated class: a property formatted to the
/// class name gets a `Val` suffix, since C# members cannot share their type's name.
pub struct ClassScopedFormatter<'a> {
    inner: &'a dyn TextFormatter,
    class_name: String,
}

impl<'a> ClassScopedFormatter<'a> {
    pub fn new(inner: &'a dyn TextFormatter, class_name: impl Into<String>) -> Self {
        Self {
            inner,
            class_name: class_name.into(),
        }
    }

    fn fix(&self, name: String) -> String {
        if name.eq_ignore_ascii_case(&self.class_name) {
            format!("{}Val", name)
        } else {
            name
        }
    }
}

impl TextFormatter for ClassScopedFormatter<'_> {
    fn format_text(&self, text: &str) -> String {
        self.fix(self.inner.format_text(text))
    }

    fn format_singular(&self, text: &str) -> String {
        self.fix(self.inner.format_singular(text))
    }

    fn format_plural(&self, text: &str) -> String {
        self.fix(self.inner.format_plural(text))
    }
}

fn segments(text: &str) -> impl Iterator<Item = &str> {
    text.split(['_', ' ', '-', '.']).filter(|s| !s.is_empty())
}

fn capitalize(segment: &str) -> String {
    let has_lower = segment.chars().any(char::is_lowercase);
    let normalized = if has_lower {
        segment.to_string()
    } else {
        segment.to_lowercase()
    };

    let mut chars = normalized.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// `user_name` -> `UserName`; all-caps segments are lowercased first (`ID` -> `Id`).
pub fn pascal_case(text: &str) -> String {
    segments(text).map(capitalize).collect()
}

/// `user_name` -> `userName`
pub fn camel_case(text: &str) -> String {
    let pascal = pascal_case(text);
    let mut chars = pascal.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}
