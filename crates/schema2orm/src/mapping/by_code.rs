//! NHibernate mapping-by-code statements.

use super::statement::{MappingStatement, STATEMENT_DEPTH};
use super::{property_and_override, tabs, SyntaxFlavor};
use crate::config::Preferences;
use crate::core::{Column, ForeignKey, HasMany};
use crate::error::{Result, SchemaMapError};
use crate::formatter::TextFormatter;
use crate::generator::FieldGenerationConvention;

/// Builds `ClassMapping<T>` constructor statements.
pub struct ByCodeMapper<'a> {
    prefs: &'a Preferences,
    flavor: SyntaxFlavor,
}

impl<'a> ByCodeMapper<'a> {
    pub fn new(prefs: &'a Preferences, flavor: SyntaxFlavor) -> Self {
        Self { prefs, flavor }
    }

    fn column_clause(&self, name: &str) -> String {
        format!("map.Column({})", self.flavor.literal(name))
    }

    /// `Id(x => x.Id, map => map.Generator(Generators.Identity));`
    pub fn id_map(&self, column: &Column, formatter: &dyn TextFormatter) -> String {
        let (property, override_name) = property_and_override(column, formatter);
        let mut statement = MappingStatement::new("Id", property);
        if let Some(name) = override_name {
            statement.push(self.column_clause(&name));
        }
        statement.push(if column.is_identity {
            "map.Generator(Generators.Identity)"
        } else {
            "map.Generator(Generators.Assigned)"
        });
        statement.render(self.flavor)
    }

    /// Id backed by a named sequence.
    pub fn id_sequence_map(
        &self,
        column: &Column,
        sequence: &str,
        formatter: &dyn TextFormatter,
    ) -> String {
        let (property, override_name) = property_and_override(column, formatter);
        let mut statement = MappingStatement::new("Id", property);
        if let Some(name) = override_name {
            statement.push(self.column_clause(&name));
        }

        let params = if self.flavor.is_vb() {
            format!("g.Params(New With {{ .sequence = {} }})", self.flavor.literal(sequence))
        } else {
            format!("g.Params(new {{ sequence = {} }})", self.flavor.literal(sequence))
        };
        statement.push(format!(
            "map.Generator(Generators.Sequence, {})",
            self.flavor.function("g", &params)
        ));
        statement.render(self.flavor)
    }

    /// `ComposedId` block with one property per key column, each naming its column.
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

        let inner = tabs(STATEMENT_DEPTH + 1);
        let lines: Vec<String> = columns
            .iter()
            .map(|column| {
                let property = formatter.format_text(&column.name);
                let column_map = self
                    .flavor
                    .action("m", &format!("m.Column({})", self.flavor.literal(&column.name)));
                let call = format!(
                    "compId.Property({}, {})",
                    self.flavor.selector(&property),
                    column_map
                );
                format!("{}{}", inner, self.flavor.statement(&call))
            })
            .collect();

        let code = if self.flavor.is_vb() {
            format!(
                "ComposedId(Sub(compId)\n{}\n{}End Sub)",
                lines.join("\n"),
                tabs(STATEMENT_DEPTH)
            )
        } else {
            format!(
                "ComposedId(compId =>\n{}{{\n{}\n{}}});",
                tabs(STATEMENT_DEPTH),
                lines.join("\n"),
                tabs(STATEMENT_DEPTH)
            )
        };
        Ok(code)
    }

    /// Plain property mapping.
    pub fn map(&self, column: &Column, formatter: &dyn TextFormatter) -> String {
        let (property, override_name) = property_and_override(column, formatter);
        let yes = self.flavor.bool_literal(true);
        let mut statement = MappingStatement::new("Property", property);

        if let Some(name) = override_name {
            statement.push(self.column_clause(&name));
        }
        if !column.is_nullable {
            statement.push(format!("map.NotNullable({})", yes));
        }
        if column.is_unique {
            statement.push(format!("map.Unique({})", yes));
        }
        if self.prefs.include_length_and_scale {
            if let Some(length) = column.length() {
                statement.push(format!("map.Length({})", length));
            } else {
                if let Some(precision) = column.positive_precision() {
                    statement.push(format!("map.Precision({})", precision));
                }
                if let Some(scale) = column.positive_scale() {
                    statement.push(format!("map.Scale({})", scale));
                }
            }
        }
        if self.prefs.field_generation == FieldGenerationConvention::Field {
            statement.push("map.Access(Accessor.Field)");
        }

        statement.render(self.flavor)
    }

    /// Inverse one-to-many bag keyed on the referencing column.
    pub fn bag(&self, has_many: &HasMany, formatter: &dyn TextFormatter) -> String {
        let property = formatter.format_plural(&has_many.reference);
        let key_column = self.flavor.function(
            "x",
            &format!("x.Column({})", self.flavor.literal(&has_many.reference_column)),
        );

        if self.flavor.is_vb() {
            format!(
                "Bag({}, Sub(colmap)\n{inner}colmap.Key({})\n{inner}colmap.Inverse(True)\n\
                 {outer}End Sub, Sub(map) map.OneToMany())",
                self.flavor.selector(&property),
                key_column,
                inner = tabs(STATEMENT_DEPTH + 1),
                outer = tabs(STATEMENT_DEPTH),
            )
        } else {
            format!(
                "Bag({}, colmap => {{ colmap.Key({}); colmap.Inverse(true); }}, \
                 map => {{ map.OneToMany(); }});",
                self.flavor.selector(&property),
                key_column
            )
        }
    }

    /// Many-to-one for a foreign key.
    ///
    /// A single-column key always names its column, adds `PropertyRef` when the key
    /// does not target the referenced primary key, `NotNullable(true)` when
    /// the column is nullable, and always `Cascade(Cascade.None)`. A composite
    /// key lists its columns in constraint order.
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

        if fk.is_composite() {
            let names: Vec<String> = fk
                .columns
                .iter()
                .map(|c| {
                    self.flavor
                        .action("x", &format!("x.Name({})", self.flavor.literal(&c.name)))
                })
                .collect();
            let code = if self.flavor.is_vb() {
                format!(
                    "ManyToOne({}, Sub(map) map.Columns(New Action(Of IColumnMapper)() {{ {} }}))",
                    self.flavor.selector(&property),
                    names.join(", ")
                )
            } else {
                format!(
                    "ManyToOne({}, map => map.Columns(new Action<IColumnMapper>[] {{ {} }}));",
                    self.flavor.selector(&property),
                    names.join(", ")
                )
            };
            return Ok(code);
        }

        let mut statement = MappingStatement::new("ManyToOne", property);
        statement.push(self.column_clause(&first.name));
        if let Some(target) = first.foreign_key.as_ref().filter(|t| !t.is_primary_key) {
            statement.push(format!(
                "map.PropertyRef({})",
                self.flavor.literal(&formatter.format_text(&target.column))
            ));
        }
        if first.is_nullable {
            statement.push(format!("map.NotNullable({})", self.flavor.bool_literal(true)));
        }
        statement.push("map.Cascade(Cascade.None)");

        Ok(statement.render(self.flavor))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ForeignKeyTarget;
    use crate::formatter::ConventionFormatter;
    use crate::mapping::Language;

    fn formatter() -> ConventionFormatter {
        ConventionFormatter::from_preferences(&Preferences::default())
    }

    fn cs(prefs: &Preferences) -> ByCodeMapper<'_> {
        ByCodeMapper::new(prefs, SyntaxFlavor::new(Language::CSharp))
    }

    fn vb(prefs: &Preferences) -> ByCodeMapper<'_> {
        ByCodeMapper::new(prefs, SyntaxFlavor::new(Language::VisualBasic))
    }

    fn varchar(name: &str, length: i32, nullable: bool) -> Column {
        Column {
            max_length: Some(length),
            is_nullable: nullable,
            ..Column::new(name, "character varying")
        }
    }

    fn fk_column(name: &str, target_table: &str, target_column: &str, position: i32) -> Column {
        Column {
            is_foreign_key: true,
            foreign_key: Some(ForeignKeyTarget {
                constraint_name: format!("{}_fkey", name),
                table: target_table.to_string(),
                column: target_column.to_string(),
                is_primary_key: true,
                position,
            }),
            ..Column::new(name, "integer")
        }
    }

    fn foreign_key(references: &str, columns: Vec<Column>) -> ForeignKey {
        ForeignKey {
            name: format!("{}_fkey", references),
            is_nullable: columns.iter().any(|c| c.is_nullable),
            references: references.to_string(),
            unique_property_name: references.to_string(),
            columns,
        }
    }

    #[test]
    fn test_users_scenario_properties() {
        let prefs = Preferences::default();
        let f = formatter();
        let mapper = cs(&prefs);

        assert_eq!(
            mapper.map(&varchar("user_name", 50, false), &f),
            "Property(x => x.UserName, map =>\n            {\n                map.Column(\"user_name\");\n                map.NotNullable(true);\n                map.Length(50);\n            });"
        );

        let mut email = varchar("email", 100, true);
        email.is_unique = true;
        assert_eq!(
            mapper.map(&email, &f),
            "Property(x => x.Email, map => { map.Unique(true); map.Length(100); });"
        );
    }

    #[test]
    fn test_map_without_clauses() {
        let prefs = Preferences::default();
        let mapper = cs(&prefs);
        assert_eq!(
            mapper.map(&Column::new("notes", "text"), &formatter()),
            "Property(x => x.Notes);"
        );
    }

    #[test]
    fn test_precision_and_scale_when_no_length() {
        let prefs = Preferences::default();
        let price = Column {
            precision: Some(10),
            scale: Some(2),
            ..Column::new("price", "numeric")
        };
        assert_eq!(
            cs(&prefs).map(&price, &formatter()),
            "Property(x => x.Price, map => { map.Precision(10); map.Scale(2); });"
        );

        let no_dimensions = Preferences {
            include_length_and_scale: false,
            ..Preferences::default()
        };
        assert_eq!(cs(&no_dimensions).map(&price, &formatter()), "Property(x => x.Price);");
    }

    #[test]
    fn test_field_access_clause() {
        let prefs = Preferences {
            field_generation: FieldGenerationConvention::Field,
            ..Preferences::default()
        };
        assert_eq!(
            cs(&prefs).map(&Column::new("notes", "text"), &formatter()),
            "Property(x => x.Notes, map => map.Access(Accessor.Field));"
        );
    }

    #[test]
    fn test_id_generators() {
        let prefs = Preferences::default();
        let mut id = Column::new("id", "integer");
        id.is_identity = true;
        assert_eq!(
            cs(&prefs).id_map(&id, &formatter()),
            "Id(x => x.Id, map => map.Generator(Generators.Identity));"
        );

        let code = Column::new("code", "character");
        assert_eq!(
            cs(&prefs).id_map(&code, &formatter()),
            "Id(x => x.Code, map => map.Generator(Generators.Assigned));"
        );

        let user_id = Column::new("user_id", "integer");
        assert_eq!(
            cs(&prefs).id_map(&user_id, &formatter()),
            "Id(x => x.UserId, map => { map.Column(\"user_id\"); map.Generator(Generators.Assigned); });"
        );
    }

    #[test]
    fn test_id_sequence_map() {
        let prefs = Preferences::default();
        let id = Column::new("id", "integer");
        assert_eq!(
            cs(&prefs).id_sequence_map(&id, "users_id_seq", &formatter()),
            "Id(x => x.Id, map => map.Generator(Generators.Sequence, g => g.Params(new { sequence = \"users_id_seq\" })));"
        );
        assert_eq!(
            vb(&prefs).id_sequence_map(&id, "users_id_seq", &formatter()),
            "Id(Function(x) x.Id, Sub(map) map.Generator(Generators.Sequence, Function(g) g.Params(New With { .sequence = \"users_id_seq\" })))"
        );
    }

    #[test]
    fn test_composite_id_lists_columns_in_order() {
        let prefs = Preferences::default();
        let columns = vec![Column::new("order_id", "integer"), Column::new("line_no", "integer")];
        assert_eq!(
            cs(&prefs).composite_id_map(&columns, &formatter()).unwrap(),
            "ComposedId(compId =>\n            {\n                compId.Property(x => x.OrderId, m => m.Column(\"order_id\"));\n                compId.Property(x => x.LineNo, m => m.Column(\"line_no\"));\n            });"
        );
        assert_eq!(
            vb(&prefs).composite_id_map(&columns, &formatter()).unwrap(),
            "ComposedId(Sub(compId)\n                compId.Property(Function(x) x.OrderId, Sub(m) m.Column(\"order_id\"))\n                compId.Property(Function(x) x.LineNo, Sub(m) m.Column(\"line_no\"))\n            End Sub)"
        );
    }

    #[test]
    fn test_composite_id_without_columns_is_error() {
        let prefs = Preferences::default();
        assert!(cs(&prefs).composite_id_map(&[], &formatter()).is_err());
    }

    #[test]
    fn test_single_column_reference_always_has_no_cascade() {
        let prefs = Preferences::default();
        let f = formatter();

        let mut required = fk_column("customer_id", "customers", "id", 1);
        required.is_nullable = false;
        assert_eq!(
            cs(&prefs).reference(&foreign_key("customers", vec![required]), &f).unwrap(),
            "ManyToOne(x => x.Customer, map => { map.Column(\"customer_id\"); map.Cascade(Cascade.None); });"
        );

        let optional = fk_column("customer_id", "customers", "id", 1);
        assert_eq!(
            cs(&prefs).reference(&foreign_key("customers", vec![optional]), &f).unwrap(),
            "ManyToOne(x => x.Customer, map =>\n            {\n                map.Column(\"customer_id\");\n                map.NotNullable(true);\n                map.Cascade(Cascade.None);\n            });"
        );
    }

    #[test]
    fn test_reference_names_column_matching_property() {
        let prefs = Preferences::default();
        let mut column = fk_column("customer", "customers", "id", 1);
        column.is_nullable = false;
        assert_eq!(
            cs(&prefs)
                .reference(&foreign_key("customers", vec![column]), &formatter())
                .unwrap(),
            "ManyToOne(x => x.Customer, map => { map.Column(\"customer\"); \
             map.Cascade(Cascade.None); });"
        );
    }

    #[test]
    fn test_reference_to_non_primary_key_uses_property_ref() {
        let prefs = Preferences::default();
        let mut column = fk_column("country_code", "countries", "iso_code", 1);
        column.is_nullable = false;
        if let Some(target) = column.foreign_key.as_mut() {
            target.is_primary_key = false;
        }

        let code = cs(&prefs)
            .reference(&foreign_key("countries", vec![column]), &formatter())
            .unwrap();
        assert!(code.contains("map.PropertyRef(\"IsoCode\")"));
        assert!(code.contains("map.Cascade(Cascade.None)"));
    }

    #[test]
    fn test_reference_named_after_column() {
        let prefs = Preferences {
            name_fk_as_foreign_table: false,
            ..Preferences::default()
        };
        let mut column = fk_column("owner_id", "users", "id", 1);
        column.is_nullable = false;
        let code = cs(&prefs)
            .reference(&foreign_key("users", vec![column]), &formatter())
            .unwrap();
        assert!(code.starts_with("ManyToOne(x => x.OwnerId, "));
    }

    #[test]
    fn test_composite_reference_lists_every_column() {
        let prefs = Preferences::default();
        let fk = foreign_key(
            "order_lines",
            vec![
                fk_column("order_id", "order_lines", "order_id", 1),
                fk_column("line_no", "order_lines", "line_no", 2),
            ],
        );

        assert_eq!(
            cs(&prefs).reference(&fk, &formatter()).unwrap(),
            "ManyToOne(x => x.OrderLine, map => map.Columns(new Action<IColumnMapper>[] { x => x.Name(\"order_id\"), x => x.Name(\"line_no\") }));"
        );
        assert_eq!(
            vb(&prefs).reference(&fk, &formatter()).unwrap(),
            "ManyToOne(Function(x) x.OrderLine, Sub(map) map.Columns(New Action(Of IColumnMapper)() { Sub(x) x.Name(\"order_id\"), Sub(x) x.Name(\"line_no\") }))"
        );
    }

    #[test]
    fn test_bag() {
        let prefs = Preferences::default();
        let has_many = HasMany {
            reference: "order".to_string(),
            reference_column: "customer_id".to_string(),
            constraint_name: "order_customer_id_fkey".to_string(),
        };
        assert_eq!(
            cs(&prefs).bag(&has_many, &formatter()),
            "Bag(x => x.Orders, colmap => { colmap.Key(x => x.Column(\"customer_id\")); colmap.Inverse(true); }, map => { map.OneToMany(); });"
        );
        assert_eq!(
            vb(&prefs).bag(&has_many, &formatter()),
            "Bag(Function(x) x.Orders, Sub(colmap)\n                colmap.Key(Function(x) x.Column(\"customer_id\"))\n                colmap.Inverse(True)\n            End Sub, Sub(map) map.OneToMany())"
        );
    }

    #[test]
    fn test_vb_literal_escaping() {
        let prefs = Preferences::default();
        let odd = Column {
            is_nullable: true,
            ..Column::new("odd\"col_name", "text")
        };
        let code = vb(&prefs).map(&odd, &formatter());
        assert!(code.contains("map.Column(\"odd\"\"col_name\")"));
    }
}
