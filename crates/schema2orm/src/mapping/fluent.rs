//! Fluent NHibernate statements.

use super::statement::ChainedStatement;
use super::{property_and_override, SyntaxFlavor};
use crate::config::Preferences;
use crate::core::{Column, ForeignKey, HasMany};
use crate::error::{Result, SchemaMapError};
use crate::formatter::TextFormatter;
use crate::generator::FieldGenerationConvention;

/// Builds `ClassMap<T>` constructor statements.
pub struct FluentColumnMapper<'a> {
    prefs: &'a Preferences,
    flavor: SyntaxFlavor,
}

impl<'a> FluentColumnMapper<'a> {
    pub fn new(prefs: &'a Preferences, flavor: SyntaxFlavor) -> Self {
        Self { prefs, flavor }
    }

    fn head(&self, method: &str, property: &str) -> ChainedStatement {
        ChainedStatement::new(format!("{}({})", method, self.flavor.selector(property)))
    }

    fn column_clause(&self, name: &str) -> String {
        format!("Column({})", self.flavor.literal(name))
    }

    /// `Table("users");`
    pub fn table(&self, name: &str) -> String {
        self.flavor
            .statement(&format!("Table({})", self.flavor.literal(name)))
    }

    pub fn id_map(&self, column: &Column, formatter: &dyn TextFormatter) -> String {
        let (property, override_name) = property_and_override(column, formatter);
        let mut statement = self.head("Id", &property);
        if let Some(name) = override_name {
            statement.push(self.column_clause(&name));
        }
        statement.push(if column.is_identity {
            "GeneratedBy.Identity()"
        } else {
            "GeneratedBy.Assigned()"
        });
        statement.render(self.flavor)
    }

    pub fn id_sequence_map(
        &self,
        column: &Column,
        sequence: &str,
        formatter: &dyn TextFormatter,
    ) -> String {
        let (property, override_name) = property_and_override(column, formatter);
        let mut statement = self.head("Id", &property);
        if let Some(name) = override_name {
            statement.push(self.column_clause(&name));
        }
        statement.push(format!("GeneratedBy.Sequence({})", self.flavor.literal(sequence)));
        statement.render(self.flavor)
    }

    /// `CompositeId()` with one `KeyProperty` per key column.
    pub fn composite_id_map(
        &self,
        columns: &[Column],
        formatter: &dyn TextFormatter,
    ) -> Result<String> {
        if columns.is_empty() {
            return Err(SchemaMapError::malformed(
                "composite primary key has no columns",
            ));
        }

        let mut statement = ChainedStatement::new("CompositeId()");
        for column in columns {
            statement.push(format!(
                "KeyProperty({}, {})",
                self.flavor.selector(&formatter.format_text(&column.name)),
                self.flavor.literal(&column.name)
            ));
        }
        Ok(statement.render(self.flavor))
    }

    pub fn map(&self, column: &Column, formatter: &dyn TextFormatter) -> String {
        let (property, override_name) = property_and_override(column, formatter);
        let mut statement = self.head("Map", &property);

        if let Some(name) = override_name {
            statement.push(self.column_clause(&name));
        }
        if !column.is_nullable {
            statement.push("Not.Nullable()");
        }
        if column.is_unique {
            statement.push("Unique()");
        }
        if self.prefs.include_length_and_scale {
            if let Some(length) = column.length() {
                statement.push(format!("Length({})", length));
            } else {
                if let Some(precision) = column.positive_precision() {
                    statement.push(format!("Precision({})", precision));
                }
                if let Some(scale) = column.positive_scale() {
                    statement.push(format!("Scale({})", scale));
                }
            }
        }
        if self.prefs.field_generation == FieldGenerationConvention::Field {
            statement.push("Access.Field()");
        }

        statement.render(self.flavor)
    }

    /// `References(...)` for a foreign key, following the same clause rules
    /// as the by-code many-to-one.
    pub fn reference(&self, fk: &ForeignKey, formatter: &dyn TextFormatter) -> Result<String> {
        let first = fk.columns.first().ok_or_else(|| {
            SchemaMapError::malformed(format!("foreign key '{}' has no columns", fk.name))
        })?;

        let property_source = if self.prefs.name_fk_as_foreign_table {
            fk.unique_property_name.as_str()
        } else {
            first.name.as_str()
        };
        let property = formatter.format_singular(property_source);
        let mut statement = self.head("References", &property);

        if fk.is_composite() {
            let names: Vec<String> = fk
                .columns
                .iter()
                .map(|c| self.flavor.literal(&c.name))
                .collect();
            statement.push(format!("Columns({})", names.join(", ")));
            return Ok(statement.render(self.flavor));
        }

        statement.push(self.column_clause(&first.name));
        if let Some(target) = first.foreign_key.as_ref().filter(|t| !t.is_primary_key) {
            statement.push(format!(
                "PropertyRef({})",
                self.flavor.literal(&formatter.format_text(&target.column))
            ));
        }
        if first.is_nullable {
            statement.push("Not.Nullable()");
        }
        statement.push("Cascade.None()");

        Ok(statement.render(self.flavor))
    }

    /// Inverse `HasMany` keyed on the referencing column.
    pub fn has_many(&self, has_many: &HasMany, formatter: &dyn TextFormatter) -> String {
        let property = formatter.format_plural(&has_many.reference);
        let mut statement = self.head("HasMany", &property);
        statement.push(format!("KeyColumn({})", self.flavor.literal(&has_many.reference_column)));
        statement.push("Inverse()");
        statement.render(self.flavor)
    }
}
