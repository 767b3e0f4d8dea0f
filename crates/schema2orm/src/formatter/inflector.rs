//! Suffix-rule pluralization for generated identifiers.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Pluralization settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PluralizationConfig {
    /// Apply pluralization/singularization at all (default: true).
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Irregular words, singular to plural (e.g. `person: people`).
    #[serde(default = "default_irregular")]
    pub irregular: BTreeMap<String, String>,
}

impl Default for PluralizationConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            irregular: default_irregular(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_irregular() -> BTreeMap<String, String> {
    [("person", "people"), ("child", "children")]
        .into_iter()
        .map(|(s, p)| (s.to_string(), p.to_string()))
        .collect()
}

/// Pluralizes and singularizes the trailing word of an identifier.
#[derive(Debug, Clone)]
pub struct Inflector {
    enabled: bool,
    irregular: Vec<(String, String)>,
}

impl Inflector {
    pub fn new(config: &PluralizationConfig) -> Self {
        Self {
            enabled: config.enabled,
            irregular: config
                .irregular
                .iter()
                .map(|(s, p)| (s.to_lowercase(), p.to_lowercase()))
                .collect(),
        }
    }

    pub fn pluralize(&self, word: &str) -> String {
        if !self.enabled || word.is_empty() {
            return word.to_string();
        }
        for (singular, plural) in &self.irregular {
            if let Some(replaced) = replace_suffix(word, singular, plural) {
                return replaced;
            }
            if ends_with_ignore_case(word, plural) {
                return word.to_string();
            }
        }

        let lower = word.to_lowercase();
        let upper = is_upper_tail(word);

        if lower.ends_with('y') && !ends_with_vowel_y(&lower) {
            let stem = &word[..word.len() - 1];
            return format!("{}{}", stem, cased("ies", upper));
        }
        if lower.ends_with("ss")
            || lower.ends_with("us")
            || lower.ends_with('x')
            || lower.ends_with('z')
            || lower.ends_with("ch")
            || lower.ends_with("sh")
        {
            return format!("{}{}", word, cased("es", upper));
        }
        if lower.ends_with('s') {
            // Already plural.
            return word.to_string();
        }
        format!("{}{}", word, cased("s", upper))
    }

    pub fn singularize(&self, word: &str) -> String {
        if !self.enabled || word.is_empty() {
            return word.to_string();
        }
        for (singular, plural) in &self.irregular {
            if let Some(replaced) = replace_suffix(word, plural, singular) {
                return replaced;
            }
        }

        let lower = word.to_lowercase();
        let upper = is_upper_tail(word);

        if lower.ends_with("ies") && lower.len() > 3 {
            let stem = &word[..word.len() - 3];
            return format!("{}{}", stem, cased("y", upper));
        }
        if lower.ends_with("sses")
            || lower.ends_with("uses")
            || lower.ends_with("xes")
            || lower.ends_with("zes")
            || lower.ends_with("ches")
            || lower.ends_with("shes")
        {
            return word[..word.len() - 2].to_string();
        }
        if lower.ends_with("ss") || lower.ends_with("us") || lower.ends_with("is") {
            return word.to_string();
        }
        if lower.ends_with('s') && lower.len() > 1 {
            return word[..word.len() - 1].to_string();
        }
        word.to_string()
    }
}

fn ends_with_ignore_case(word: &str, suffix: &str) -> bool {
    word.len() >= suffix.len()
        && word
            .get(word.len() - suffix.len()..)
            .map(|tail| tail.eq_ignore_ascii_case(suffix))
            .unwrap_or(false)
}

/// Replace a case-insensitive suffix, keeping the case of its first letter.
fn replace_suffix(word: &str, from: &str, to: &str) -> Option<String> {
    if !ends_with_ignore_case(word, from) {
        return None;
    }
    let cut = word.len() - from.len();
    let stem = word.get(..cut)?;
    let tail = word.get(cut..)?;

    let mut replacement = to.to_string();
    if tail.chars().next().map(char::is_uppercase).unwrap_or(false) {
        let mut chars = to.chars();
        if let Some(first) = chars.next() {
            replacement = first.to_uppercase().chain(chars).collect();
        }
    }
    Some(format!("{}{}", stem, replacement))
}

fn ends_with_vowel_y(lower: &str) -> bool {
    let mut chars = lower.chars().rev();
    chars.next();
    matches!(chars.next(), Some('a' | 'e' | 'i' | 'o' | 'u'))
}

fn is_upper_tail(word: &str) -> bool {
    word.chars().last().map(char::is_uppercase).unwrap_or(false)
}

fn cased(suffix: &str, upper: bool) -> String {
    if upper {
        suffix.to_uppercase()
    } else {
        suffix.to_string()
    }
}
