//! Mapping class generation.

use tracing::{debug, info};

use super::{entity_class_name, mapping_class_name, ClassFile, GeneratedCode, MappingStyle};
use crate::config::Preferences;
use crate::core::{Column, PrimaryKeyKind, Table};
use crate::error::{Result, SchemaMapError};
use crate::formatter::{ClassScopedFormatter, TextFormatter};
use crate::mapping::statement::STATEMENT_DEPTH;
use crate::mapping::{
    tabs, ByCodeMapper, DapperFluentColumnMapper, FluentColumnMapper, SyntaxFlavor,
};

/// Generates the mapping class for a table.
///
/// Statements are emitted in a fixed order: table, primary key, many-to-one
/// references, remaining columns, one-to-many collections.
pub struct MappingGenerator<'a> {
    prefs: &'a Preferences,
    formatter: &'a dyn TextFormatter,
    flavor: SyntaxFlavor,
}

impl<'a> MappingGenerator<'a> {
    pub fn new(prefs: &'a Preferences, formatter: &'a dyn TextFormatter) -> Self {
        Self {
            prefs,
            formatter,
            flavor: SyntaxFlavor::new(prefs.language),
        }
    }

    pub fn generate(&self, table: &Table) -> Result<GeneratedCode> {
        let class_name = mapping_class_name(&table.name, self.prefs);
        let entity_name = entity_class_name(&table.name, self.prefs);
        let statements = self.statements(table)?;

        let mut imports: Vec<String> = self
            .prefs
            .style
            .imports()
            .iter()
            .map(|s| s.to_string())
            .collect();
        if !self.prefs.namespace.is_empty()
            && self.prefs.namespace != self.prefs.mapping_namespace
        {
            imports.push(self.prefs.namespace.clone());
        }

        let file = ClassFile {
            flavor: self.flavor,
            imports,
            namespace: &self.prefs.mapping_namespace,
            class_name: &class_name,
            base_type: Some(self.prefs.style.base_type(&entity_name, self.flavor)),
            partial: self.prefs.generate_partial_classes,
        };
        let code = file.render(&[self.constructor(&class_name, &statements)]);

        info!(
            "Generated {} ({:?}, {} statements) for {}",
            class_name,
            self.prefs.style,
            statements.len(),
            table.full_name()
        );
        Ok(GeneratedCode::new(class_name, self.prefs.language, code))
    }

    /// Mapping statements for the table, each unindented on its first line.
    pub fn statements(&self, table: &Table) -> Result<Vec<String>> {
        let entity_name = entity_class_name(&table.name, self.prefs);
        let formatter = ClassScopedFormatter::new(self.formatter, entity_name);

        match self.prefs.style {
            MappingStyle::ByCode => self.by_code_statements(table, &formatter),
            MappingStyle::Fluent => self.fluent_statements(table, &formatter),
            MappingStyle::DapperFluent => self.dapper_statements(table, &formatter),
        }
    }

    fn constructor(&self, class_name: &str, statements: &[String]) -> String {
        let indent = tabs(STATEMENT_DEPTH);
        let body: Vec<String> = statements
            .iter()
            .map(|s| format!("{}{}", indent, s))
            .collect();

        if self.flavor.is_vb() {
            format!(
                "{outer}Public Sub New()\n{}\n{outer}End Sub",
                body.join("\n"),
                outer = tabs(2)
            )
        } else {
            format!(
                "{outer}public {}()\n{outer}{{\n{}\n{outer}}}",
                class_name,
                body.join("\n"),
                outer = tabs(2)
            )
        }
    }

    /// The sequence to use for the key, if the key is single-column.
    fn sequence_for(&self, table: &Table) -> Option<&str> {
        self.prefs
            .sequence
            .as_deref()
            .filter(|_| table.has_single_pk())
    }

    /// Columns left after keys and navigation-mapped foreign keys.
    fn remaining_columns<'t>(&self, table: &'t Table) -> impl Iterator<Item = &'t Column> {
        let skip_foreign =
            self.prefs.include_foreign_keys && self.prefs.style.supports_relationships();
        table
            .columns
            .iter()
            .filter(move |c| !c.is_primary_key && !(skip_foreign && c.is_foreign_key))
    }

    fn single_key_column<'t>(&self, table: &'t Table) -> Result<Option<&'t Column>> {
        match &table.primary_key {
            Some(pk) if pk.kind == PrimaryKeyKind::Single => pk
                .columns
                .first()
                .map(Some)
                .ok_or_else(|| {
                    SchemaMapError::malformed(format!(
                        "primary key of '{}' has no columns",
                        table.full_name()
                    ))
                }),
            _ => Ok(None),
        }
    }

    fn by_code_statements(&self, table: &Table, f: &dyn TextFormatter) -> Result<Vec<String>> {
        let mapper = ByCodeMapper::new(self.prefs, self.flavor);
        let mut out = vec![
            self.flavor
                .statement(&format!("Table({})", self.flavor.literal(&table.name))),
            self.flavor
                .statement(&format!("Schema({})", self.flavor.literal(&table.schema))),
        ];

        if let Some(column) = self.single_key_column(table)? {
            out.push(match self.sequence_for(table) {
                Some(sequence) => mapper.id_sequence_map(column, sequence, f),
                None => mapper.id_map(column, f),
            });
        } else if let Some(pk) = &table.primary_key {
            out.push(mapper.composite_id_map(&pk.columns, f)?);
        } else {
            debug!("{} has no primary key", table.full_name());
        }

        if self.prefs.include_foreign_keys {
            for fk in &table.foreign_keys {
                out.push(mapper.reference(fk, f)?);
            }
        }

        out.extend(self.remaining_columns(table).map(|c| mapper.map(c, f)));

        if self.prefs.include_has_many {
            out.extend(table.has_many.iter().map(|hm| mapper.bag(hm, f)));
        }
        Ok(out)
    }

    fn fluent_statements(&self, table: &Table, f: &dyn TextFormatter) -> Result<Vec<String>> {
        let mapper = FluentColumnMapper::new(self.prefs, self.flavor);
        let mut out = vec![mapper.table(&table.name)];

        if let Some(column) = self.single_key_column(table)? {
            out.push(match self.sequence_for(table) {
                Some(sequence) => mapper.id_sequence_map(column, sequence, f),
                None => mapper.id_map(column, f),
            });
        } else if let Some(pk) = &table.primary_key {
            out.push(mapper.composite_id_map(&pk.columns, f)?);
        } else {
            debug!("{} has no primary key", table.full_name());
        }

        if self.prefs.include_foreign_keys {
            for fk in &table.foreign_keys {
                out.push(mapper.reference(fk, f)?);
            }
        }

        out.extend(self.remaining_columns(table).map(|c| mapper.map(c, f)));

        if self.prefs.include_has_many {
            out.extend(table.has_many.iter().map(|hm| mapper.has_many(hm, f)));
        }
        Ok(out)
    }

    fn dapper_statements(&self, table: &Table, f: &dyn TextFormatter) -> Result<Vec<String>> {
        let mapper = DapperFluentColumnMapper::new(self.flavor);
        let mut out = vec![mapper.table(&table.name)];

        if let Some(column) = self.single_key_column(table)? {
            out.push(match self.sequence_for(table) {
                Some(_) => mapper.id_sequence_map(column, f),
                None => mapper.id_map(column, f),
            });
        } else if let Some(pk) = &table.primary_key {
            out.extend(mapper.composite_id_map(&pk.columns, f)?);
        } else {
            debug!("{} has no primary key", table.full_name());
        }

        out.extend(self.remaining_columns(table).map(|c| mapper.map(c, f)));
        Ok(out)
    }
}
