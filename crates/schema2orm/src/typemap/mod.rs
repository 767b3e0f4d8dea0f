//! Type mapping from native database types to .NET types.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::core::schema::Column;
use crate::error::{Result, SchemaMapError};

/// Database server kind a native type name belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServerKind {
    #[default]
    #[serde(alias = "postgres")]
    PostgreSql,
    #[serde(alias = "mssql")]
    SqlServer,
    MySql,
}

impl fmt::Display for ServerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServerKind::PostgreSql => write!(f, "PostgreSQL"),
            ServerKind::SqlServer => write!(f, "SQL Server"),
            ServerKind::MySql => write!(f, "MySQL"),
        }
    }
}

/// .NET type a column maps to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DotNetType {
    Bool,
    Byte,
    Short,
    Int,
    Long,
    Float,
    Double,
    Decimal,
    Char,
    String,
    DateTime,
    DateTimeOffset,
    TimeSpan,
    Guid,
    ByteArray,
}

impl DotNetType {
    /// C# keyword or type name.
    pub fn csharp_name(&self) -> &'static str {
        match self {
            DotNetType::Bool => "bool",
            DotNetType::Byte => "byte",
            DotNetType::Short => "short",
            DotNetType::Int => "int",
            DotNetType::Long => "long",
            DotNetType::Float => "float",
            DotNetType::Double => "double",
            DotNetType::Decimal => "decimal",
            DotNetType::Char => "char",
            DotNetType::String => "string",
            DotNetType::DateTime => "DateTime",
            DotNetType::DateTimeOffset => "DateTimeOffset",
            DotNetType::TimeSpan => "TimeSpan",
            DotNetType::Guid => "Guid",
            DotNetType::ByteArray => "byte[]",
        }
    }

    /// Visual Basic keyword or type name.
    pub fn vb_name(&self) -> &'static str {
        match self {
            DotNetType::Bool => "Boolean",
            DotNetType::Byte => "Byte",
            DotNetType::Short => "Short",
            DotNetType::Int => "Integer",
            DotNetType::Long => "Long",
            DotNetType::Float => "Single",
            DotNetType::Double => "Double",
            DotNetType::Decimal => "Decimal",
            DotNetType::Char => "Char",
            DotNetType::String => "String",
            DotNetType::DateTime => "Date",
            DotNetType::DateTimeOffset => "DateTimeOffset",
            DotNetType::TimeSpan => "TimeSpan",
            DotNetType::Guid => "Guid",
            DotNetType::ByteArray => "Byte()",
        }
    }

    /// Whether the type is a value type (and so needs `Nullable<T>` for NULL).
    pub fn is_value_type(&self) -> bool {
        !matches!(self, DotNetType::String | DotNetType::ByteArray)
    }
}

impl fmt::Display for DotNetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.csharp_name())
    }
}

/// Map a native database type to a .NET type.
///
/// `length`, `precision` and `scale` only disambiguate sub-kinds: single
/// character columns map to `char`, and exact numerics with no fractional
/// digits map to the smallest integer type that holds their precision.
///
/// # Errors
///
/// Returns [`SchemaMapError::UnsupportedType`] for native types with no mapping.
pub fn map_from_db_type(
    server: ServerKind,
    data_type: &str,
    length: Option<i32>,
    precision: Option<i32>,
    scale: Option<i32>,
) -> Result<DotNetType> {
    let native = data_type.trim().to_lowercase();
    let mapped = match server {
        ServerKind::PostgreSql => postgres_type(&native, length, precision, scale),
        ServerKind::SqlServer => sqlserver_type(&native, length),
        ServerKind::MySql => mysql_type(&native, length, precision),
    };
    mapped.ok_or_else(|| SchemaMapError::unsupported(server, data_type))
}

/// Map a column's native type using its length/precision/scale.
pub fn map_column(server: ServerKind, column: &Column) -> Result<DotNetType> {
    map_from_db_type(
        server,
        &column.data_type,
        column.max_length,
        column.precision,
        column.scale,
    )
}

fn postgres_type(
    native: &str,
    length: Option<i32>,
    precision: Option<i32>,
    scale: Option<i32>,
) -> Option<DotNetType> {
    let mapped = match native {
        // Boolean
        "boolean" | "bool" => DotNetType::Bool,

        // Integer types
        "smallint" | "int2" | "smallserial" => DotNetType::Short,
        "integer" | "int" | "int4" | "serial" => DotNetType::Int,
        "bigint" | "int8" | "bigserial" => DotNetType::Long,

        // Decimal/numeric
        "numeric" | "decimal" => exact_numeric(precision, scale),
        "money" => DotNetType::Decimal,

        // Floating point
        "real" | "float4" => DotNetType::Float,
        "double precision" | "float8" => DotNetType::Double,

        // String types
        "character" | "char" | "bpchar" if length == Some(1) => DotNetType::Char,
        "character" | "char" | "bpchar" | "character varying" | "varchar" | "text" | "citext"
        | "name" | "json" | "jsonb" | "xml" | "inet" | "cidr" | "macaddr" => DotNetType::String,

        // Binary types
        "bytea" => DotNetType::ByteArray,

        // Date/time types
        "date" | "timestamp" | "timestamp without time zone" | "timestamp with time zone"
        | "timestamptz" => DotNetType::DateTime,
        "time" | "time without time zone" | "interval" => DotNetType::TimeSpan,
        "time with time zone" | "timetz" => DotNetType::DateTimeOffset,

        // GUID
        "uuid" => DotNetType::Guid,

        _ => return None,
    };
    Some(mapped)
}

fn sqlserver_type(native: &str, length: Option<i32>) -> Option<DotNetType> {
    let mapped = match native {
        "bit" => DotNetType::Bool,
        "tinyint" => DotNetType::Byte,
        "smallint" => DotNetType::Short,
        "int" => DotNetType::Int,
        "bigint" => DotNetType::Long,
        "decimal" | "numeric" | "money" | "smallmoney" => DotNetType::Decimal,
        "float" => DotNetType::Double,
        "real" => DotNetType::Float,
        "char" | "nchar" if length == Some(1) => DotNetType::Char,
        "char" | "nchar" | "varchar" | "nvarchar" | "text" | "ntext" | "xml" | "sysname" => {
            DotNetType::String
        }
        "date" | "datetime" | "datetime2" | "smalldatetime" => DotNetType::DateTime,
        "datetimeoffset" => DotNetType::DateTimeOffset,
        "time" => DotNetType::TimeSpan,
        "uniqueidentifier" => DotNetType::Guid,
        "binary" | "varbinary" | "image" | "timestamp" | "rowversion" => DotNetType::ByteArray,
        _ => return None,
    };
    Some(mapped)
}

fn mysql_type(native: &str, length: Option<i32>, precision: Option<i32>) -> Option<DotNetType> {
    let mapped = match native {
        "bit" | "bool" | "boolean" => DotNetType::Bool,
        // tinyint(1) is MySQL's boolean
        "tinyint" if length == Some(1) || precision == Some(1) => DotNetType::Bool,
        "tinyint" => DotNetType::Byte,
        "smallint" | "year" => DotNetType::Short,
        "mediumint" | "int" | "integer" => DotNetType::Int,
        "bigint" => DotNetType::Long,
        "decimal" | "numeric" => DotNetType::Decimal,
        "float" => DotNetType::Float,
        "double" | "real" => DotNetType::Double,
        "char" if length == Some(1) => DotNetType::Char,
        "char" | "varchar" | "tinytext" | "text" | "mediumtext" | "longtext" | "enum" | "set"
        | "json" => DotNetType::String,
        "date" | "datetime" | "timestamp" => DotNetType::DateTime,
        "time" => DotNetType::TimeSpan,
        "binary" | "varbinary" | "tinyblob" | "blob" | "mediumblob" | "longblob" => {
            DotNetType::ByteArray
        }
        _ => return None,
    };
    Some(mapped)
}

/// Exact numerics without fractional digits become integers when they fit.
fn exact_numeric(precision: Option<i32>, scale: Option<i32>) -> DotNetType {
    match (precision, scale.unwrap_or(0)) {
        (Some(p), 0) if p > 0 && p <= 4 => DotNetType::Short,
        (Some(p), 0) if p > 0 && p <= 9 => DotNetType::Int,
        (Some(p), 0) if p > 0 && p <= 18 => DotNetType::Long,
        _ => DotNetType::Decimal,
    }
}
