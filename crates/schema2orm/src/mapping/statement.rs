//! Layout of mapping statements.
//!
//! A statement is a call on one property plus an ordered clause list. The
//! clause count picks the shape:
//!
//! | clauses | lambda block (by-code)                 | chain (fluent, Dapper) |
//! |---------|----------------------------------------|------------------------|
//! | 0       | `Property(x => x.A);`                  | `Map(x => x.A);`       |
//! | 1       | `Property(x => x.A, map => a);`        | `Map(x => x.A).a;`     |
//! | 2       | `Property(x => x.A, map => { a; b; });`| `Map(x => x.A).a.b;`   |
//! | 3+      | multi-line block                       | multi-line chain       |
//!
//! Visual Basic has no single-line lambda with several statements, so its
//! two-clause lambda block uses the multi-line form.
//!
//! Statements are placed at constructor-body depth (three levels). Only
//! continuation lines carry their indentation.

use super::{tabs, SyntaxFlavor};

/// Statement body depth inside `namespace { class { ctor { ... } } }`.
pub const STATEMENT_DEPTH: usize = 3;

/// A by-code call: `Method(x => x.Property, map => ...)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappingStatement {
    method: String,
    property: String,
    clauses: Vec<String>,
}

impl MappingStatement {
    pub fn new(method: impl Into<String>, property: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            property: property.into(),
            clauses: Vec::new(),
        }
    }

    pub fn push(&mut self, clause: impl Into<String>) {
        self.clauses.push(clause.into());
    }

    pub fn clauses(&self) -> &[String] {
        &self.clauses
    }

    pub fn render(&self, flavor: SyntaxFlavor) -> String {
        if flavor.is_vb() {
            self.render_vb()
        } else {
            self.render_csharp()
        }
    }

    fn render_csharp(&self) -> String {
        let head = format!("{}(x => x.{}", self.method, self.property);
        match self.clauses.as_slice() {
            [] => format!("{});", head),
            [only] => format!("{}, map => {});", head, only),
            [first, second] => format!("{}, map => {{ {}; {}; }});", head, first, second),
            many => {
                let body: Vec<String> = many
                    .iter()
                    .map(|c| format!("{}{};", tabs(STATEMENT_DEPTH + 1), c))
                    .collect();
                format!(
                    "{}, map =>\n{}{{\n{}\n{}}});",
                    head,
                    tabs(STATEMENT_DEPTH),
                    body.join("\n"),
                    tabs(STATEMENT_DEPTH)
                )
            }
        }
    }

    fn render_vb(&self) -> String {
        // `Property` is a reserved word in VB.
        let method = if self.method == "Property" {
            "[Property]"
        } else {
            self.method.as_str()
        };
        let head = format!("{}(Function(x) x.{}", method, self.property);
        match self.clauses.as_slice() {
            [] => format!("{})", head),
            [only] => format!("{}, Sub(map) {})", head, only),
            many => {
                let body: Vec<String> = many
                    .iter()
                    .map(|c| format!("{}{}", tabs(STATEMENT_DEPTH + 1), c))
                    .collect();
                format!(
                    "{}, Sub(map)\n{}\n{}End Sub)",
                    head,
                    body.join("\n"),
                    tabs(STATEMENT_DEPTH)
                )
            }
        }
    }
}

/// A fluent chain: `Head(...).Clause().Clause()`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainedStatement {
    head: String,
    clauses: Vec<String>,
}

impl ChainedStatement {
    pub fn new(head: impl Into<String>) -> Self {
        Self {
            head: head.into(),
            clauses: Vec::new(),
        }
    }

    pub fn push(&mut self, clause: impl Into<String>) {
        self.clauses.push(clause.into());
    }

    pub fn clauses(&self) -> &[String] {
        &self.clauses
    }

    pub fn render(&self, flavor: SyntaxFlavor) -> String {
        let terminator = if flavor.is_vb() { "" } else { ";" };
        match self.clauses.as_slice() {
            [] => format!("{}{}", self.head, terminator),
            [only] => format!("{}.{}{}", self.head, only, terminator),
            [first, second] => format!("{}.{}.{}{}", self.head, first, second, terminator),
            many => {
                // VB needs an explicit continuation before a leading dot.
                let continuation = if flavor.is_vb() { " _" } else { "" };
                let mut out = self.head.clone();
                for clause in many {
                    out.push_str(continuation);
                    out.push('\n');
                    out.push_str(&tabs(STATEMENT_DEPTH + 1));
                    out.push('.');
                    out.push_str(clause);
                }
                out.push_str(terminator);
                out
            }
        }
    }
}
