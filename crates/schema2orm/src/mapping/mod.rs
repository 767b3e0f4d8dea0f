//! Column and relationship mappers.
//!
//! Each mapper turns one column, key or relationship into the text of a
//! single mapping statement. The three families differ in vocabulary:
//!
//! - [`by_code`]: NHibernate mapping-by-code (`ClassMapping<T>`)
//! - [`fluent`]: Fluent NHibernate (`ClassMap<T>`)
//! - [`dapper`]: Dapper.FluentMap with Dommel (`DommelEntityMap<T>`)
//!
//! Layout of the produced text is owned by [`statement`]. Language
//! differences are carried by one [`SyntaxFlavor`] value chosen per run.

pub mod by_code;
pub mod dapper;
pub mod fluent;
pub mod statement;

pub use by_code::ByCodeMapper;
pub use dapper::DapperFluentColumnMapper;
pub use fluent::FluentColumnMapper;
pub use statement::{ChainedStatement, MappingStatement};

use serde::{Deserialize, Serialize};

use crate::core::identifier::{escape_csharp_literal, escape_vb_literal};
use crate::core::Column;
use crate::formatter::TextFormatter;

/// One level of indentation in generated code.
pub const TAB: &str = "    ";

/// `n` levels of indentation.
pub fn tabs(n: usize) -> String {
    TAB.repeat(n)
}

/// Target .NET language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Language {
    #[default]
    #[serde(rename = "csharp", alias = "cs", alias = "c#")]
    CSharp,
    #[serde(rename = "vb", alias = "visualbasic")]
    VisualBasic,
}

impl Language {
    /// Source file extension without the dot.
    pub fn file_extension(&self) -> &'static str {
        match self {
            Language::CSharp => "cs",
            Language::VisualBasic => "vb",
        }
    }
}

impl std::str::FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "csharp" | "cs" | "c#" => Ok(Language::CSharp),
            "vb" | "visualbasic" => Ok(Language::VisualBasic),
            other => Err(format!("unknown language '{}' (expected csharp or vb)", other)),
        }
    }
}

/// Language-specific syntax pieces used when rendering statements.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyntaxFlavor {
    language: Language,
}

impl SyntaxFlavor {
    pub fn new(language: Language) -> Self {
        Self { language }
    }

    pub fn language(&self) -> Language {
        self.language
    }

    pub fn is_vb(&self) -> bool {
        self.language == Language::VisualBasic
    }

    /// `x => x.Name` / `Function(x) x.Name`
    pub fn selector(&self, property: &str) -> String {
        match self.language {
            Language::CSharp => format!("x => x.{}", property),
            Language::VisualBasic => format!("Function(x) x.{}", property),
        }
    }

    /// Single-line action lambda: `m => body` / `Sub(m) body`
    pub fn action(&self, param: &str, body: &str) -> String {
        match self.language {
            Language::CSharp => format!("{} => {}", param, body),
            Language::VisualBasic => format!("Sub({}) {}", param, body),
        }
    }

    /// Single-line expression lambda: `g => body` / `Function(g) body`
    pub fn function(&self, param: &str, body: &str) -> String {
        match self.language {
            Language::CSharp => format!("{} => {}", param, body),
            Language::VisualBasic => format!("Function({}) {}", param, body),
        }
    }

    /// Quoted string literal.
    pub fn literal(&self, text: &str) -> String {
        match self.language {
            Language::CSharp => format!("\"{}\"", escape_csharp_literal(text)),
            Language::VisualBasic => format!("\"{}\"", escape_vb_literal(text)),
        }
    }

    pub fn bool_literal(&self, value: bool) -> &'static str {
        match (self.language, value) {
            (Language::CSharp, true) => "true",
            (Language::CSharp, false) => "false",
            (Language::VisualBasic, true) => "True",
            (Language::VisualBasic, false) => "False",
        }
    }

    /// Terminate a single-line statement.
    pub fn statement(&self, body: &str) -> String {
        match self.language {
            Language::CSharp => format!("{};", body),
            Language::VisualBasic => body.to_string(),
        }
    }
}

impl From<Language> for SyntaxFlavor {
    fn from(language: Language) -> Self {
        Self::new(language)
    }
}

/// The property name for a column and whether the column name must be
/// spelled out: only when it differs case-insensitively from the property.
pub(crate) fn property_and_override(
    column: &Column,
    formatter: &dyn TextFormatter,
) -> (String, Option<String>) {
    let property = formatter.format_text(&column.name);
    let override_name = if property.eq_ignore_ascii_case(&column.name) {
        None
    } else {
        Some(column.name.clone())
    };
    (property, override_name)
}
