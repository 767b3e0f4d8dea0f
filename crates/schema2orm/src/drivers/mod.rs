//! Database driver implementations.
//!
//! - [`postgres`]: PostgreSQL metadata reader over `information_schema`
//! - [`common`]: Shared utilities (TLS)
//!
//! Each driver implements [`MetadataReader`](crate::core::MetadataReader).

pub mod common;
pub mod postgres;

pub use common::{SslMode, TlsBuilder};
pub use postgres::PostgresMetadataReader;
