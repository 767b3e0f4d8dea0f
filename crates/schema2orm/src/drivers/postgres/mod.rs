//! PostgreSQL driver.
//!
//! - [`PostgresMetadataReader`]: catalog reader for PostgreSQL databases

mod reader;

pub use reader::PostgresMetadataReader;
