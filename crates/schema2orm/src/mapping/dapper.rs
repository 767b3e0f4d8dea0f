//! Dapper.FluentMap (Dommel) statements.
//!
//! Dommel maps columns and keys only. Foreign keys are mapped as plain
//! columns by the generator.

use super::statement::ChainedStatement;
use super::{property_and_override, SyntaxFlavor};
use crate::core::Column;
use crate::error::{Result, SchemaMapError};
use crate::formatter::TextFormatter;

/// Builds `DommelEntityMap<T>` constructor statements.
pub struct DapperFluentColumnMapper {
    flavor: SyntaxFlavor,
}

impl DapperFluentColumnMapper {
    pub fn new(flavor: SyntaxFlavor) -> Self {
        Self { flavor }
    }

    fn column_statement(&self, column: &Column, formatter: &dyn TextFormatter) -> ChainedStatement {
        let (property, override_name) = property_and_override(column, formatter);
        let mut statement =
            ChainedStatement::new(format!("Map({})", self.flavor.selector(&property)));
        if let Some(name) = override_name {
            statement.push(format!("ToColumn({})", self.flavor.literal(&name)));
        }
        statement
    }

    /// `ToTable("users");`
    pub fn table(&self, name: &str) -> String {
        self.flavor
            .statement(&format!("ToTable({})", self.flavor.literal(name)))
    }

    pub fn map(&self, column: &Column, formatter: &dyn TextFormatter) -> String {
        self.column_statement(column, formatter).render(self.flavor)
    }

    /// Key column; database-generated keys are also marked `IsIdentity()`.
    pub fn id_map(&self, column: &Column, formatter: &dyn TextFormatter) -> String {
        let mut statement = self.column_statement(column, formatter);
        statement.push("IsKey()");
        if column.is_identity {
            statement.push("IsIdentity()");
        }
        statement.render(self.flavor)
    }

    /// Key filled from a sequence: generated by the database.
    pub fn id_sequence_map(&self, column: &Column, formatter: &dyn TextFormatter) -> String {
        let mut statement = self.column_statement(column, formatter);
        statement.push("IsKey()");
        statement.push("IsIdentity()");
        statement.render(self.flavor)
    }

    /// One key statement per composite key column, in key order.
    pub fn composite_id_map(
        &self,
        columns: &[Column],
        formatter: &dyn TextFormatter,
    ) -> Result<Vec<String>> {
        if columns.is_empty() {
            return Err(SchemaMapError::malformed(
                "composite primary key has no columns",
            ));
        }
        Ok(columns
            .iter()
            .map(|column| {
                let mut statement = self.column_statement(column, formatter);
                statement.push("IsKey()");
                statement.render(self.flavor)
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Preferences;
    use crate::formatter::ConventionFormatter;
    use crate::mapping::Language;

    fn formatter() -> ConventionFormatter {
        ConventionFormatter::from_preferences(&Preferences::default())
    }

    fn cs() -> DapperFluentColumnMapper {
        DapperFluentColumnMapper::new(SyntaxFlavor::new(Language::CSharp))
    }

    #[test]
    fn test_to_column_only_when_names_differ() {
        let f = formatter();
        assert_eq!(cs().map(&Column::new("email", "text"), &f), "Map(x => x.Email);");
        assert_eq!(
            cs().map(&Column::new("user_name", "text"), &f),
            "Map(x => x.UserName).ToColumn(\"user_name\");"
        );
    }

    #[test]
    fn test_keys() {
        let f = formatter();
        let mut id = Column::new("id", "integer");
        assert_eq!(cs().id_map(&id, &f), "Map(x => x.Id).IsKey();");
        id.is_identity = true;
        assert_eq!(cs().id_map(&id, &f), "Map(x => x.Id).IsKey().IsIdentity();");

        let keys = cs()
            .composite_id_map(
                &[Column::new("order_id", "integer"), Column::new("line_no", "integer")],
                &f,
            )
            .unwrap();
        assert_eq!(
            keys,
            vec![
                "Map(x => x.OrderId).ToColumn(\"order_id\").IsKey();".to_string(),
                "Map(x => x.LineNo).ToColumn(\"line_no\").IsKey();".to_string(),
            ]
        );
    }

    #[test]
    fn test_vb_table() {
        let mapper = DapperFluentColumnMapper::new(SyntaxFlavor::new(Language::VisualBasic));
        assert_eq!(mapper.table("users"), "ToTable(\"users\")");
    }
}
