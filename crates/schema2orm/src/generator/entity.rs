//! Domain (entity) class generation.

use tracing::info;

use super::{entity_class_name, ClassFile, FieldGenerationConvention, GeneratedCode, MappingStyle};
use crate::config::Preferences;
use crate::core::Table;
use crate::error::Result;
use crate::formatter::{camel_case, ClassScopedFormatter, TextFormatter};
use crate::mapping::{tabs, SyntaxFlavor};
use crate::typemap::{map_column, ServerKind};

/// Generates the entity class a mapping targets: one member per column,
/// plus navigation properties and collections when relationships are mapped.
pub struct EntityGenerator<'a> {
    prefs: &'a Preferences,
    formatter: &'a dyn TextFormatter,
    flavor: SyntaxFlavor,
    server: ServerKind,
}

/// A member to render: name and already-rendered type.
struct Member {
    name: String,
    type_name: String,
}

impl<'a> EntityGenerator<'a> {
    pub fn new(prefs: &'a Preferences, formatter: &'a dyn TextFormatter) -> Self {
        Self {
            prefs,
            formatter,
            flavor: SyntaxFlavor::new(prefs.language),
            server: ServerKind::PostgreSql,
        }
    }

    /// Override the server whose native type names the columns carry.
    pub fn with_server(mut self, server: ServerKind) -> Self {
        self.server = server;
        self
    }

    pub fn generate(&self, table: &Table) -> Result<GeneratedCode> {
        let class_name = entity_class_name(&table.name, self.prefs);
        let members = self.members(table, &class_name)?;

        let file = ClassFile {
            flavor: self.flavor,
            imports: vec!["System".to_string(), "System.Collections.Generic".to_string()],
            namespace: &self.prefs.namespace,
            class_name: &class_name,
            base_type: None,
            partial: self.prefs.generate_partial_classes,
        };
        let rendered: Vec<String> = members.iter().map(|m| self.render_member(m)).collect();
        let code = file.render(&rendered);

        info!(
            "Generated entity {} ({} members) for {}",
            class_name,
            members.len(),
            table.full_name()
        );
        Ok(GeneratedCode::new(class_name, self.prefs.language, code))
    }

    fn members(&self, table: &Table, class_name: &str) -> Result<Vec<Member>> {
        let formatter = ClassScopedFormatter::new(self.formatter, class_name);
        let relationships = self.prefs.style.supports_relationships();
        let navigation = relationships && self.prefs.include_foreign_keys;

        let mut members = Vec::new();
        for column in &table.columns {
            if navigation && column.is_foreign_key && !column.is_primary_key {
                continue;
            }
            let mapped = map_column(self.server, column)?;
            let base = if self.flavor.is_vb() {
                mapped.vb_name()
            } else {
                mapped.csharp_name()
            };
            let type_name = if column.is_nullable && mapped.is_value_type() {
                self.nullable(base)
            } else {
                base.to_string()
            };
            members.push(Member {
                name: formatter.format_text(&column.name),
                type_name,
            });
        }

        if navigation {
            for fk in &table.foreign_keys {
                let source = match fk.columns.first() {
                    Some(first) if !self.prefs.name_fk_as_foreign_table => first.name.as_str(),
                    _ => fk.unique_property_name.as_str(),
                };
                members.push(Member {
                    name: formatter.format_singular(source),
                    type_name: entity_class_name(&fk.references, self.prefs),
                });
            }
        }

        if relationships && self.prefs.include_has_many {
            for has_many in &table.has_many {
                let element = entity_class_name(&has_many.reference, self.prefs);
                members.push(Member {
                    name: formatter.format_plural(&has_many.reference),
                    type_name: self.list_of(&element),
                });
            }
        }

        Ok(members)
    }

    fn nullable(&self, base: &str) -> String {
        if self.flavor.is_vb() {
            format!("Nullable(Of {})", base)
        } else {
            format!("{}?", base)
        }
    }

    fn list_of(&self, element: &str) -> String {
        if self.flavor.is_vb() {
            format!("IList(Of {})", element)
        } else {
            format!("IList<{}>", element)
        }
    }

    /// NHibernate proxies need overridable members.
    fn virtual_keyword(&self) -> &'static str {
        match (self.prefs.style, self.flavor.is_vb()) {
            (MappingStyle::DapperFluent, _) => "",
            (_, true) => "Overridable ",
            (_, false) => "virtual ",
        }
    }

    fn backing_field(&self, name: &str) -> String {
        let prefix = if self.prefs.field_prefix.is_empty() {
            "_"
        } else {
            self.prefs.field_prefix.as_str()
        };
        let field = format!("{}{}", prefix, camel_case(name));
        if field == name {
            format!("m{}", field)
        } else {
            field
        }
    }

    fn render_member(&self, member: &Member) -> String {
        let d2 = tabs(2);
        let d3 = tabs(3);
        let d4 = tabs(4);
        let Member { name, type_name } = member;
        let virtual_kw = self.virtual_keyword();

        match (self.prefs.field_generation, self.flavor.is_vb()) {
            (FieldGenerationConvention::AutoProperty, false) => {
                format!("{d2}public {virtual_kw}{type_name} {name} {{ get; set; }}")
            }
            (FieldGenerationConvention::AutoProperty, true) => {
                format!("{d2}Public {virtual_kw}Property {name} As {type_name}")
            }
            (FieldGenerationConvention::Field, false) => {
                format!("{d2}public {type_name} {name};")
            }
            (FieldGenerationConvention::Field, true) => {
                format!("{d2}Public {name} As {type_name}")
            }
            (FieldGenerationConvention::Property, false) => {
                let field = self.backing_field(name);
                format!(
                    "{d2}private {type_name} {field};\n\
                     {d2}public {virtual_kw}{type_name} {name}\n\
                     {d2}{{\n\
                     {d3}get {{ return {field}; }}\n\
                     {d3}set {{ {field} = value; }}\n\
                     {d2}}}"
                )
            }
            (FieldGenerationConvention::Property, true) => {
                let field = self.backing_field(name);
                format!(
                    "{d2}Private {field} As {type_name}\n\
                     {d2}Public {virtual_kw}Property {name} As {type_name}\n\
                     {d3}Get\n\
                     {d4}Return {field}\n\
                     {d3}End Get\n\
                     {d3}Set(value As {type_name})\n\
                     {d4}{field} = value\n\
                     {d3}End Set\n\
                     {d2}End Property"
                )
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::schema::{determine_foreign_keys, determine_primary_key};
    use crate::core::{Column, ForeignKeyTarget, HasMany};
    use crate::error::SchemaMapError;
    use crate::formatter::ConventionFormatter;
    use crate::mapping::Language;

    fn orders_table() -> Table {
        let id = Column {
            is_primary_key: true,
            is_identity: true,
            is_nullable: false,
            ordinal_pos: 1,
            ..Column::new("id", "integer")
        };
        let customer = Column {
            is_foreign_key: true,
            is_nullable: false,
            ordinal_pos: 2,
            foreign_key: Some(ForeignKeyTarget {
                constraint_name: "orders_customer_id_fkey".to_string(),
                table: "customers".to_string(),
                column: "id".to_string(),
                is_primary_key: true,
                position: 1,
            }),
            ..Column::new("customer_id", "integer")
        };
        let placed = Column {
            ordinal_pos: 3,
            ..Column::new("placed_at", "timestamp without time zone")
        };
        let note = Column {
            ordinal_pos: 4,
            ..Column::new("note", "text")
        };
        let columns = vec![id, customer, placed, note];

        let mut table = Table::new("public", "orders");
        table.primary_key = determine_primary_key(&columns);
        table.foreign_keys = determine_foreign_keys("orders", &columns).unwrap();
        table.has_many = vec![HasMany {
            reference: "order_lines".to_string(),
            reference_column: "order_id".to_string(),
            constraint_name: "order_lines_order_id_fkey".to_string(),
        }];
        table.columns = columns;
        table
    }

    fn generate(prefs: &Preferences) -> GeneratedCode {
        let formatter = ConventionFormatter::from_preferences(prefs);
        EntityGenerator::new(prefs, &formatter)
            .generate(&orders_table())
            .unwrap()
    }

    #[test]
    fn test_auto_properties_csharp() {
        let generated = generate(&Preferences::default());
        assert_eq!(generated.file_name, "Order.cs");

        let expected = r#"using System;
using System.Collections.Generic;

namespace Domain
{
    public class Order
    {
        public virtual int Id { get; set; }
        public virtual DateTime? PlacedAt { get; set; }
        public virtual string Note { get; set; }
        public virtual Customer Customer { get; set; }
        public virtual IList<OrderLine> OrderLines { get; set; }
    }
}
"#;
        assert_eq!(generated.code, expected);
    }

    #[test]
    fn test_vb_nullable_and_collections() {
        let prefs = Preferences {
            language: Language::VisualBasic,
            ..Preferences::default()
        };
        let code = generate(&prefs).code;
        assert!(code.contains("        Public Overridable Property Id As Integer\n"));
        assert!(code.contains(
            "        Public Overridable Property PlacedAt As Nullable(Of Date)\n"
        ));
        assert!(code.contains(
            "        Public Overridable Property OrderLines As IList(Of OrderLine)\n"
        ));
    }

    #[test]
    fn test_backing_field_properties() {
        let prefs = Preferences {
            field_generation: FieldGenerationConvention::Property,
            ..Preferences::default()
        };
        let code = generate(&prefs).code;
        assert!(code.contains(
            "        private string _note;\n        public virtual string Note\n        {\n\
             \x20           get { return _note; }\n            set { _note = value; }\n        }"
        ));
    }

    #[test]
    fn test_fields_and_dapper_scalars() {
        let prefs = Preferences {
            field_generation: FieldGenerationConvention::Field,
            style: MappingStyle::DapperFluent,
            ..Preferences::default()
        };
        let code = generate(&prefs).code;
        assert!(code.contains("        public int CustomerId;\n"));
        assert!(!code.contains("Customer Customer"));
        assert!(!code.contains("IList<"));
    }

    #[test]
    fn test_unsupported_type_propagates() {
        let prefs = Preferences::default();
        let mut table = orders_table();
        table.columns.push(Column::new("search", "tsvector"));

        let formatter = ConventionFormatter::from_preferences(&prefs);
        let err = EntityGenerator::new(&prefs, &formatter)
            .generate(&table)
            .unwrap_err();
        assert!(matches!(err, SchemaMapError::UnsupportedType { .. }));
    }
}
