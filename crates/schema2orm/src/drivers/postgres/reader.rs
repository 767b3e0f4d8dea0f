//! PostgreSQL metadata reader implementation.
//!
//! Implements the `MetadataReader` trait over `information_schema` and
//! `pg_catalog`. Every operation opens its own connection, spawns the
//! connection driver on the current runtime and drops the client before
//! returning.

use std::time::Duration;

use async_trait::async_trait;
use tokio_postgres::config::SslMode as PgSslMode;
use tokio_postgres::{Client, Config as PgConfig, NoTls, Row};
use tokio_postgres_rustls::MakeRustlsConnect;
use tracing::{debug, info, warn};

use crate::config::ConnectionConfig;
use crate::core::identifier::validate_identifier;
use crate::core::schema::{
    determine_has_many, determine_primary_key, group_foreign_keys, Column, ForeignKeyRow,
    HasManyRow, Table,
};
use crate::core::traits::MetadataReader;
use crate::drivers::common::{SslMode, TlsBuilder};
use crate::error::{Result, SchemaMapError};

/// Classifies every column of a table exactly once: primary key columns,
/// then foreign key columns (by the `{table}_{column}_fkey` naming convention
/// or by membership in a FOREIGN KEY constraint), then everything else.
/// A column in both sets is classified as primary key.
///
/// Constraints are matched through `pg_constraint.conrelid`; constraint names
/// are only unique per table.
const TABLE_DETAILS_QUERY: &str = r#"
    WITH rel AS (
        SELECT t.oid, t.relname
        FROM pg_catalog.pg_class t
        JOIN pg_catalog.pg_namespace n ON n.oid = t.relnamespace
        WHERE n.nspname::text = $1
          AND t.relname::text = $2
    ),
    pk_columns AS (
        SELECT a.attname::text AS column_name
        FROM pg_catalog.pg_constraint con
        JOIN rel ON rel.oid = con.conrelid
        JOIN pg_catalog.pg_attribute a
          ON a.attrelid = con.conrelid
         AND a.attnum = ANY(con.conkey)
        WHERE con.contype = 'p'
    ),
    fk_columns AS (
        SELECT a.attname::text AS column_name
        FROM pg_catalog.pg_constraint con
        JOIN rel ON rel.oid = con.conrelid
        JOIN pg_catalog.pg_attribute a ON a.attrelid = con.conrelid
        WHERE con.contype = 'f'
          AND a.attnum > 0
          AND NOT a.attisdropped
          AND (
              a.attnum = ANY(con.conkey)
              OR con.conname::text = rel.relname::text || '_' || a.attname::text || '_fkey'
          )
    )
    SELECT
        c.column_name::text,
        c.data_type::text,
        c.character_maximum_length::int4,
        c.numeric_precision::int4,
        c.numeric_scale::int4,
        c.is_nullable::text,
        CASE
            WHEN c.column_name::text IN (SELECT column_name FROM pk_columns) THEN 'PRIMARY KEY'
            WHEN c.column_name::text IN (SELECT column_name FROM fk_columns) THEN 'FOREIGN KEY'
            ELSE NULL
        END::text AS constraint_type,
        c.column_default::text,
        c.is_identity::text,
        c.ordinal_position::int4
    FROM information_schema.columns c
    WHERE c.table_schema::text = $1
      AND c.table_name::text = $2
    ORDER BY c.ordinal_position
"#;

/// Columns that alone make up a UNIQUE constraint.
const UNIQUE_COLUMNS_QUERY: &str = r#"
    SELECT a.attname::text
    FROM pg_catalog.pg_constraint con
    JOIN pg_catalog.pg_class t ON t.oid = con.conrelid
    JOIN pg_catalog.pg_namespace n ON n.oid = t.relnamespace
    JOIN pg_catalog.pg_attribute a
      ON a.attrelid = con.conrelid
     AND a.attnum = con.conkey[1]
    WHERE n.nspname::text = $1
      AND t.relname::text = $2
      AND con.contype = 'u'
      AND array_length(con.conkey, 1) = 1
"#;

/// One row per column of every foreign key the table holds, paired with the
/// referenced column at the same position.
const FOREIGN_KEY_COLUMNS_QUERY: &str = r#"
    SELECT
        con.conname::text,
        a.attname::text,
        k.ord::int4,
        rt.relname::text,
        ra.attname::text,
        EXISTS (
            SELECT 1
            FROM pg_catalog.pg_constraint pk
            WHERE pk.conrelid = con.confrelid
              AND pk.contype = 'p'
              AND pk.conindid = con.conindid
        ) AS targets_primary_key
    FROM pg_catalog.pg_constraint con
    JOIN pg_catalog.pg_class t ON t.oid = con.conrelid
    JOIN pg_catalog.pg_namespace n ON n.oid = t.relnamespace
    JOIN pg_catalog.pg_class rt ON rt.oid = con.confrelid
    CROSS JOIN LATERAL unnest(con.conkey, con.confkey) WITH ORDINALITY AS k(attnum, refnum, ord)
    JOIN pg_catalog.pg_attribute a
      ON a.attrelid = con.conrelid
     AND a.attnum = k.attnum
    JOIN pg_catalog.pg_attribute ra
      ON ra.attrelid = con.confrelid
     AND ra.attnum = k.refnum
    WHERE n.nspname::text = $1
      AND t.relname::text = $2
      AND con.contype = 'f'
    ORDER BY con.conname, k.ord
"#;

/// Foreign key columns in other tables that point at this table.
const HAS_MANY_QUERY: &str = r#"
    SELECT
        t.relname::text,
        con.conname::text,
        a.attname::text,
        k.ord::int4
    FROM pg_catalog.pg_constraint con
    JOIN pg_catalog.pg_class rt ON rt.oid = con.confrelid
    JOIN pg_catalog.pg_namespace rn ON rn.oid = rt.relnamespace
    JOIN pg_catalog.pg_class t ON t.oid = con.conrelid
    CROSS JOIN LATERAL unnest(con.conkey) WITH ORDINALITY AS k(attnum, ord)
    JOIN pg_catalog.pg_attribute a
      ON a.attrelid = con.conrelid
     AND a.attnum = k.attnum
    WHERE rn.nspname::text = $1
      AND rt.relname::text = $2
      AND con.contype = 'f'
    ORDER BY 1, 2, 4
"#;

/// PostgreSQL metadata reader.
pub struct PostgresMetadataReader {
    pg_config: PgConfig,
    tls: Option<MakeRustlsConnect>,
    target: String,
}

impl PostgresMetadataReader {
    /// Create a reader from configuration. No connection is opened yet.
    pub fn new(config: &ConnectionConfig) -> Result<Self> {
        let ssl_mode = SslMode::parse(&config.ssl_mode)?;

        let mut pg_config = PgConfig::new();
        pg_config.host(&config.host);
        pg_config.port(config.port);
        pg_config.dbname(&config.database);
        pg_config.user(&config.user);
        pg_config.password(&config.password);
        pg_config.application_name("schema2orm");
        if let Some(secs) = config.connect_timeout_secs {
            pg_config.connect_timeout(Duration::from_secs(secs));
        }

        let target = format!("{}:{}/{}", config.host, config.port, config.database);
        Self::with_ssl_mode(pg_config, ssl_mode, target)
    }

    /// Create a reader from a libpq-style connection string
    /// (`host=... dbname=... user=...` or a `postgresql://` URL).
    ///
    /// `sslmode=require` in the string enables TLS without verification.
    pub fn from_connection_string(conn_str: &str) -> Result<Self> {
        let pg_config: PgConfig = conn_str
            .parse()
            .map_err(|e| SchemaMapError::Config(format!("Invalid connection string: {}", e)))?;

        let ssl_mode = match pg_config.get_ssl_mode() {
            PgSslMode::Require => SslMode::Require,
            _ => SslMode::Disable,
        };
        let target = pg_config.get_dbname().unwrap_or("<default>").to_string();
        Self::with_ssl_mode(pg_config, ssl_mode, target)
    }

    fn with_ssl_mode(mut pg_config: PgConfig, ssl_mode: SslMode, target: String) -> Result<Self> {
        let tls = TlsBuilder::new(ssl_mode).build()?;
        if tls.is_some() {
            pg_config.ssl_mode(PgSslMode::Require);
        } else {
            warn!("PostgreSQL TLS is disabled. Credentials will be transmitted in plaintext.");
            pg_config.ssl_mode(PgSslMode::Disable);
        }

        Ok(Self {
            pg_config,
            tls,
            target,
        })
    }

    /// Open a connection for a single operation.
    async fn connect(&self) -> Result<Client> {
        let client = match &self.tls {
            Some(tls) => {
                let (client, connection) = self.pg_config.connect(tls.clone()).await?;
                tokio::spawn(async move {
                    if let Err(e) = connection.await {
                        warn!("PostgreSQL connection error: {}", e);
                    }
                });
                client
            }
            None => {
                let (client, connection) = self.pg_config.connect(NoTls).await?;
                tokio::spawn(async move {
                    if let Err(e) = connection.await {
                        warn!("PostgreSQL connection error: {}", e);
                    }
                });
                client
            }
        };

        debug!("Connected to PostgreSQL: {}", self.target);
        Ok(client)
    }

    /// Flag columns that form a single-column UNIQUE constraint.
    async fn load_unique_columns(
        &self,
        client: &Client,
        owner: &str,
        table: &str,
        columns: &mut [Column],
    ) -> Result<()> {
        let rows = client.query(UNIQUE_COLUMNS_QUERY, &[&owner, &table]).await?;
        for row in rows {
            let name: String = row.get(0);
            if let Some(col) = columns.iter_mut().find(|c| c.name == name) {
                col.is_unique = true;
            }
        }
        Ok(())
    }

    /// Every foreign key column of the table, one row per constraint column.
    async fn load_foreign_key_rows(
        &self,
        client: &Client,
        owner: &str,
        table: &str,
    ) -> Result<Vec<ForeignKeyRow>> {
        let rows = client
            .query(FOREIGN_KEY_COLUMNS_QUERY, &[&owner, &table])
            .await?;
        Ok(rows
            .iter()
            .map(|row| ForeignKeyRow {
                constraint_name: row.get::<_, String>(0),
                column: row.get::<_, String>(1),
                position: row.get::<_, i32>(2),
                referenced_table: row.get::<_, String>(3),
                referenced_column: row.get::<_, String>(4),
                targets_primary_key: row.get::<_, bool>(5),
            })
            .collect())
    }

    async fn load_has_many(
        &self,
        client: &Client,
        owner: &str,
        table: &str,
    ) -> Result<Vec<HasManyRow>> {
        let rows = client.query(HAS_MANY_QUERY, &[&owner, &table]).await?;
        Ok(rows
            .iter()
            .map(|row| HasManyRow {
                referencing_table: row.get::<_, String>(0),
                constraint_name: row.get::<_, String>(1),
                column: row.get::<_, String>(2),
                position: row.get::<_, i32>(3),
            })
            .collect())
    }
}

#[async_trait]
impl MetadataReader for PostgresMetadataReader {
    async fn get_owners(&self) -> Result<Vec<String>> {
        let client = self.connect().await?;

        let query = r#"
            SELECT DISTINCT table_schema::text FROM information_schema.tables
            UNION
            SELECT schema_name::text FROM information_schema.schemata
            ORDER BY 1
        "#;

        let rows = client.query(query, &[]).await?;
        let owners: Vec<String> = rows.iter().map(|row| row.get::<_, String>(0)).collect();

        debug!("Found {} owners", owners.len());
        Ok(owners)
    }

    async fn get_tables(&self, owner: &str) -> Result<Vec<String>> {
        validate_identifier(owner)?;
        let client = self.connect().await?;

        let query = r#"
            SELECT table_name::text
            FROM information_schema.tables
            WHERE table_type = 'BASE TABLE'
              AND table_schema::text = $1
            ORDER BY table_name
        "#;

        let rows = client.query(query, &[&owner]).await?;
        let mut tables: Vec<String> = rows.iter().map(|row| row.get::<_, String>(0)).collect();
        // Collation order can differ from byte order.
        tables.sort();

        debug!("Found {} tables in schema '{}'", tables.len(), owner);
        Ok(tables)
    }

    async fn get_sequences(&self, owner: &str) -> Result<Vec<String>> {
        validate_identifier(owner)?;
        let client = self.connect().await?;

        let query = r#"
            SELECT sequence_name::text
            FROM information_schema.sequences
            WHERE sequence_schema::text = $1
            ORDER BY sequence_name
        "#;

        let rows = client.query(query, &[&owner]).await?;
        let sequences: Vec<String> = rows.iter().map(|row| row.get::<_, String>(0)).collect();

        debug!("Found {} sequences in schema '{}'", sequences.len(), owner);
        Ok(sequences)
    }

    async fn get_sequence_for_column(
        &self,
        owner: &str,
        table: &str,
        column: &str,
    ) -> Result<Option<String>> {
        validate_identifier(owner)?;
        validate_identifier(table)?;
        validate_identifier(column)?;
        let client = self.connect().await?;

        // serial columns: the default is nextval('seq'::regclass), possibly schema-qualified
        let query = r#"
            SELECT s.sequence_name::text
            FROM information_schema.columns c
            JOIN information_schema.sequences s
              ON s.sequence_schema = c.table_schema
             AND (c.column_default LIKE 'nextval(''' || s.sequence_name || '''%'
                  OR c.column_default LIKE
                     'nextval(''' || s.sequence_schema || '.' || s.sequence_name || '''%')
            WHERE c.table_schema::text = $1
              AND c.table_name::text = $2
              AND c.column_name::text = $3
            ORDER BY s.sequence_name
            LIMIT 1
        "#;

        if let Some(row) = client.query_opt(query, &[&owner, &table, &column]).await? {
            let name: String = row.get(0);
            debug!("Column {}.{}.{} uses sequence {}", owner, table, column, name);
            return Ok(Some(name));
        }

        // identity columns have no default; ask the catalog directly
        let query = r#"
            SELECT pg_get_serial_sequence(quote_ident($1) || '.' || quote_ident($2), $3)
        "#;
        let row = client.query_one(query, &[&owner, &table, &column]).await?;
        let qualified: Option<String> = row.get(0);

        Ok(qualified.map(|q| unqualify_sequence_name(&q)))
    }

    async fn get_table_details(&self, owner: &str, table: &str) -> Result<Table> {
        validate_identifier(owner)?;
        validate_identifier(table)?;
        let client = self.connect().await?;

        let rows = client.query(TABLE_DETAILS_QUERY, &[&owner, &table]).await?;
        if rows.is_empty() {
            return Err(SchemaMapError::malformed(format!(
                "table '{}.{}' does not exist or has no columns",
                owner, table
            )));
        }

        let mut columns: Vec<Column> = rows.iter().map(column_from_row).collect();
        debug!("Loaded {} columns for {}.{}", columns.len(), owner, table);

        self.load_unique_columns(&client, owner, table, &mut columns)
            .await?;

        let fk_rows = self.load_foreign_key_rows(&client, owner, table).await?;
        for col in columns.iter().filter(|c| c.is_foreign_key) {
            if !fk_rows.iter().any(|r| r.column == col.name) {
                warn!(
                    "No referential constraint found for foreign key column {}.{}.{}",
                    owner, table, col.name
                );
            }
        }
        let foreign_keys = group_foreign_keys(table, &mut columns, fk_rows)?;

        let has_many_rows = self.load_has_many(&client, owner, table).await?;

        let mut details = Table::new(owner, table);
        details.primary_key = determine_primary_key(&columns);
        details.foreign_keys = foreign_keys;
        details.has_many = determine_has_many(has_many_rows);
        details.columns = columns;

        info!(
            "Described {}: {} columns, {} foreign keys, {} has-many",
            details.full_name(),
            details.columns.len(),
            details.foreign_keys.len(),
            details.has_many.len()
        );
        Ok(details)
    }

    async fn ping(&self) -> Result<()> {
        let client = self.connect().await?;
        client.simple_query("SELECT 1").await?;
        info!("Connected to PostgreSQL: {}", self.target);
        Ok(())
    }

    fn db_type(&self) -> &str {
        "postgres"
    }
}

/// Raw values of one classified catalog row.
#[derive(Debug, Clone, Default)]
struct CatalogColumn {
    name: String,
    data_type: String,
    max_length: Option<i32>,
    precision: Option<i32>,
    scale: Option<i32>,
    is_nullable: String,
    constraint_type: Option<String>,
    column_default: Option<String>,
    is_identity: Option<String>,
    ordinal_pos: i32,
}

impl CatalogColumn {
    fn into_column(self) -> Column {
        let constraint = self.constraint_type.as_deref().unwrap_or_default();
        let is_primary_key = constraint.eq_ignore_ascii_case("PRIMARY KEY");
        let is_foreign_key = constraint.eq_ignore_ascii_case("FOREIGN KEY");

        let has_nextval_default = self
            .column_default
            .as_deref()
            .map(|d| d.to_lowercase().contains("nextval"))
            .unwrap_or(false);
        let is_identity_column = self
            .is_identity
            .as_deref()
            .map(|v| v.eq_ignore_ascii_case("YES"))
            .unwrap_or(false);

        Column {
            name: self.name,
            data_type: self.data_type,
            max_length: self.max_length,
            precision: self.precision,
            scale: self.scale,
            is_nullable: self.is_nullable.eq_ignore_ascii_case("YES"),
            is_unique: false,
            is_primary_key,
            is_foreign_key,
            is_identity: (has_nextval_default && is_primary_key) || is_identity_column,
            ordinal_pos: self.ordinal_pos,
            foreign_key: None,
        }
    }
}

fn column_from_row(row: &Row) -> Column {
    CatalogColumn {
        name: row.get::<_, String>(0),
        data_type: row.get::<_, String>(1),
        max_length: row.get::<_, Option<i32>>(2),
        precision: row.get::<_, Option<i32>>(3),
        scale: row.get::<_, Option<i32>>(4),
        is_nullable: row.get::<_, String>(5),
        constraint_type: row.get::<_, Option<String>>(6),
        column_default: row.get::<_, Option<String>>(7),
        is_identity: row.get::<_, Option<String>>(8),
        ordinal_pos: row.get::<_, i32>(9),
    }
    .into_column()
}

/// `public."Order Seq"` -> `Order Seq`.
fn unqualify_sequence_name(qualified: &str) -> String {
    let mut in_quotes = false;
    let mut last_dot = None;
    for (i, ch) in qualified.char_indices() {
        match ch {
            '"' => in_quotes = !in_quotes,
            '.' if !in_quotes => last_dot = Some(i),
            _ => {}
        }
    }
    let name = match last_dot {
        Some(i) => &qualified[i + 1..],
        None => qualified,
    };

    match name.strip_prefix('"').and_then(|n| n.strip_suffix('"')) {
        Some(quoted) => quoted.replace("\"\"", "\""),
        None => name.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog_column(name: &str, constraint: Option<&str>) -> CatalogColumn {
        CatalogColumn {
            name: name.to_string(),
            data_type: "integer".to_string(),
            precision: Some(32),
            scale: Some(0),
            is_nullable: "NO".to_string(),
            constraint_type: constraint.map(str::to_string),
            is_identity: Some("NO".to_string()),
            ordinal_pos: 1,
            ..Default::default()
        }
    }

    #[test]
    fn test_serial_primary_key_is_identity() {
        let mut raw = catalog_column("id", Some("PRIMARY KEY"));
        raw.column_default = Some("nextval('users_id_seq'::regclass)".to_string());
        let col = raw.into_column();
        assert!(col.is_primary_key);
        assert!(!col.is_foreign_key);
        assert!(col.is_identity);
        assert!(!col.is_nullable);
    }

    #[test]
    fn test_nextval_default_on_plain_column_is_not_identity() {
        let mut raw = catalog_column("ticket_no", None);
        raw.column_default = Some("nextval('tickets_seq'::regclass)".to_string());
        assert!(!raw.into_column().is_identity);
    }

    #[test]
    fn test_generated_identity_column() {
        let mut raw = catalog_column("id", Some("PRIMARY KEY"));
        raw.is_identity = Some("YES".to_string());
        assert!(raw.into_column().is_identity);
    }

    #[test]
    fn test_foreign_key_classification() {
        let mut raw = catalog_column("customer_id", Some("FOREIGN KEY"));
        raw.is_nullable = "YES".to_string();
        let col = raw.into_column();
        assert!(col.is_foreign_key);
        assert!(!col.is_primary_key);
        assert!(col.is_nullable);
        assert!(col.foreign_key.is_none());
    }

    #[test]
    fn test_plain_column_keeps_dimensions() {
        let raw = CatalogColumn {
            name: "user_name".to_string(),
            data_type: "character varying".to_string(),
            max_length: Some(50),
            is_nullable: "NO".to_string(),
            ordinal_pos: 2,
            ..Default::default()
        };
        let col = raw.into_column();
        assert_eq!(col.max_length, Some(50));
        assert_eq!(col.ordinal_pos, 2);
        assert!(!col.is_primary_key && !col.is_foreign_key && !col.is_identity);
    }

    #[test]
    fn test_constraint_queries_match_by_relation() {
        // Constraint names repeat across tables; joins must go through OIDs.
        for query in [
            TABLE_DETAILS_QUERY,
            UNIQUE_COLUMNS_QUERY,
            FOREIGN_KEY_COLUMNS_QUERY,
            HAS_MANY_QUERY,
        ] {
            assert!(query.contains("con.conrelid"));
            assert!(!query.contains("constraint_name ="));
            assert!(!query.contains("key_column_usage"));
        }
        assert!(HAS_MANY_QUERY.contains("rt.oid = con.confrelid"));
        assert!(FOREIGN_KEY_COLUMNS_QUERY.contains("WITH ORDINALITY"));
    }

    #[test]
    fn test_unqualify_sequence_name() {
        assert_eq!(unqualify_sequence_name("public.users_id_seq"), "users_id_seq");
        assert_eq!(unqualify_sequence_name("users_id_seq"), "users_id_seq");
        assert_eq!(unqualify_sequence_name("sales.\"Order.Seq\""), "Order.Seq");
        assert_eq!(unqualify_sequence_name("\"My \"\"Seq\"\"\""), "My \"Seq\"");
    }

    #[test]
    fn test_from_connection_string() {
        let reader =
            PostgresMetadataReader::from_connection_string("host=localhost dbname=shop user=app")
                .unwrap();
        assert_eq!(reader.db_type(), "postgres");
        assert_eq!(reader.target, "shop");
        assert!(reader.tls.is_none());

        let tls = PostgresMetadataReader::from_connection_string(
            "host=localhost dbname=shop user=app sslmode=require",
        )
        .unwrap();
        assert!(tls.tls.is_some());
    }

    #[test]
    fn test_invalid_connection_string_is_config_error() {
        let err = PostgresMetadataReader::from_connection_string("host=localhost port=notaport")
            .err()
            .unwrap();
        assert!(matches!(err, SchemaMapError::Config(_)));
    }

    #[test]
    fn test_new_rejects_bad_ssl_mode() {
        let config = ConnectionConfig {
            host: "localhost".to_string(),
            port: 5432,
            database: "shop".to_string(),
            user: "app".to_string(),
            password: String::new(),
            schema: "public".to_string(),
            ssl_mode: "sometimes".to_string(),
            connect_timeout_secs: Some(5),
        };
        assert!(PostgresMetadataReader::new(&config).is_err());
    }
}
