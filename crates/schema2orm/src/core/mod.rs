//! Core abstractions shared by readers, mappers and generators.
//!
//! - [`schema`]: Table, column, key and relationship types plus the pure
//!   functions that derive keys and relationships from classified columns
//! - [`traits`]: The [`MetadataReader`] contract implemented by drivers
//! - [`identifier`]: Identifier validation and literal escaping

pub mod identifier;
pub mod schema;
pub mod traits;

pub use schema::{
    Column, ForeignKey, ForeignKeyRow, ForeignKeyTarget, HasMany, HasManyRow, PrimaryKey,
    PrimaryKeyKind, Table,
};
pub use traits::MetadataReader;
