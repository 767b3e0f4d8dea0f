//! The metadata reader contract.
//!
//! A reader discovers owners, tables and sequences, and describes a single
//! table as a populated [`Table`]. Implementations live under `drivers/`.

use async_trait::async_trait;

use crate::error::Result;

use super::schema::Table;

/// Read schema metadata from a database catalog.
///
/// Every method scopes its own connection: it is opened, used and released
/// before the call returns. Failures propagate unchanged; there are no retries.
#[async_trait]
pub trait MetadataReader: Send + Sync {
    /// List schemas/owners, sorted.
    async fn get_owners(&self) -> Result<Vec<String>>;

    /// List base tables in a schema, sorted by name.
    async fn get_tables(&self, owner: &str) -> Result<Vec<String>>;

    /// List sequence objects in a schema.
    async fn get_sequences(&self, owner: &str) -> Result<Vec<String>>;

    /// Find the sequence backing an identity column, if any.
    async fn get_sequence_for_column(
        &self,
        owner: &str,
        table: &str,
        column: &str,
    ) -> Result<Option<String>>;

    /// Describe a table: columns with key flags and references, primary key,
    /// foreign keys and has-many relationships.
    async fn get_table_details(&self, owner: &str, table: &str) -> Result<Table>;

    /// Check that the database is reachable.
    async fn ping(&self) -> Result<()>;

    /// Get the database type identifier (e.g. "postgres").
    fn db_type(&self) -> &str;
}
