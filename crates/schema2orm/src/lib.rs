//! # schema2orm
//!
//! Read PostgreSQL schema metadata and generate .NET ORM mapping classes.
//!
//! This library provides:
//!
//! - **Metadata reading** from the PostgreSQL information schema
//! - **Text formatting** of table and column names into .NET identifiers
//! - **Type mapping** from native database types to .NET types
//! - **Mapping generation** for NHibernate by-code, Fluent NHibernate and
//!   Dapper.FluentMap, in C# or Visual Basic
//! - **Entity generation** for the domain classes the mappings target
//!
//! ## Example
//!
//! ```rust,no_run
//! use schema2orm::{
//!     Config, ConventionFormatter, MappingGenerator, MetadataReader, PostgresMetadataReader,
//! };
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> schema2orm::Result<()> {
//!     let config = Config::load("schema2orm.yaml")?;
//!     let reader = PostgresMetadataReader::new(&config.connection)?;
//!     let table = reader.get_table_details("public", "users").await?;
//!
//!     let formatter = ConventionFormatter::from_preferences(&config.preferences);
//!     let generated = MappingGenerator::new(&config.preferences, &formatter).generate(&table)?;
//!     println!("{}", generated.code);
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod core;
pub mod drivers;
pub mod error;
pub mod formatter;
pub mod generator;
pub mod mapping;
pub mod typemap;

// Re-exports for convenient access
pub use config::{Config, ConnectionConfig, Preferences};
pub use crate::core::{
    Column, ForeignKey, HasMany, MetadataReader, PrimaryKey, PrimaryKeyKind, Table,
};
pub use drivers::{PostgresMetadataReader, SslMode};
pub use error::{Result, SchemaMapError};
pub use formatter::{ConventionFormatter, NamingConvention, TextFormatter};
pub use generator::{
    EntityGenerator, FieldGenerationConvention, GeneratedCode, MappingGenerator, MappingStyle,
};
pub use mapping::Language;
pub use typemap::{DotNetType, ServerKind};
