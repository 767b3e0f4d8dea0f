//! Schema graph types: tables, columns, keys and relationships.
//!
//! A [`Table`] is populated once per "describe this table" request by a
//! [`MetadataReader`](super::traits::MetadataReader) and is not mutated while
//! code is generated from it. The `determine_*` and `group_*` functions turn
//! the flat, classified column list returned by the catalog into grouped key
//! and relationship objects. They sort explicitly so the output does not depend
//! on the order rows come back from the database.

use std::collections::{BTreeMap, HashMap, HashSet};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Result, SchemaMapError};

/// Table metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Table {
    /// Owning schema name.
    pub schema: String,

    /// Table name.
    pub name: String,

    /// Column definitions in catalog (ordinal) order.
    pub columns: Vec<Column>,

    /// Primary key, if the table has one.
    pub primary_key: Option<PrimaryKey>,

    /// Foreign keys grouped by constraint.
    pub foreign_keys: Vec<ForeignKey>,

    /// One-to-many relationships from tables referencing this one.
    pub has_many: Vec<HasMany>,
}

impl Table {
    /// Create an empty table shell.
    pub fn new(schema: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            schema: schema.into(),
            name: name.into(),
            columns: Vec::new(),
            primary_key: None,
            foreign_keys: Vec::new(),
            has_many: Vec::new(),
        }
    }

    /// Get the fully qualified table name.
    pub fn full_name(&self) -> String {
        format!("{}.{}", self.schema, self.name)
    }

    /// Check if the table has a single-column primary key.
    pub fn has_single_pk(&self) -> bool {
        matches!(
            self.primary_key,
            Some(PrimaryKey {
                kind: PrimaryKeyKind::Single,
                ..
            })
        )
    }

    /// Look up a column by name (case-insensitive).
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name.eq_ignore_ascii_case(name))
    }
}

/// Column metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    /// Column name.
    pub name: String,

    /// Native data type as reported by the catalog (e.g. "integer", "character varying").
    pub data_type: String,

    /// Maximum character length for string types.
    pub max_length: Option<i32>,

    /// Numeric precision.
    pub precision: Option<i32>,

    /// Numeric scale.
    pub scale: Option<i32>,

    /// Whether the column allows NULL.
    pub is_nullable: bool,

    /// Whether the column alone forms a UNIQUE constraint.
    pub is_unique: bool,

    /// Whether the column is part of the primary key.
    pub is_primary_key: bool,

    /// Whether the column is part of a foreign key.
    pub is_foreign_key: bool,

    /// Whether the database generates the value (serial / identity).
    pub is_identity: bool,

    /// Ordinal position (1-based).
    pub ordinal_pos: i32,

    /// Resolved foreign key target. `None` for plain columns and for
    /// foreign-key columns whose referential constraint was not found.
    pub foreign_key: Option<ForeignKeyTarget>,
}

impl Column {
    /// Create a nullable plain column with no length, precision or flags.
    pub fn new(name: impl Into<String>, data_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data_type: data_type.into(),
            max_length: None,
            precision: None,
            scale: None,
            is_nullable: true,
            is_unique: false,
            is_primary_key: false,
            is_foreign_key: false,
            is_identity: false,
            ordinal_pos: 0,
            foreign_key: None,
        }
    }

    /// Positive character length, if any.
    pub fn length(&self) -> Option<i32> {
        self.max_length.filter(|l| *l > 0)
    }

    /// Positive numeric precision, if any.
    pub fn positive_precision(&self) -> Option<i32> {
        self.precision.filter(|p| *p > 0)
    }

    /// Positive numeric scale, if any.
    pub fn positive_scale(&self) -> Option<i32> {
        self.scale.filter(|s| *s > 0)
    }
}

/// Where a foreign-key column points.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForeignKeyTarget {
    /// Foreign key constraint name.
    pub constraint_name: String,

    /// Referenced table name.
    pub table: String,

    /// Referenced column name.
    pub column: String,

    /// Whether the referenced column is the referenced table's primary key.
    /// `false` makes the key a property reference.
    pub is_primary_key: bool,

    /// 1-based position of this column inside the constraint.
    pub position: i32,
}

/// Primary key shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PrimaryKeyKind {
    Single,
    Composite,
}

/// Primary key metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrimaryKey {
    pub kind: PrimaryKeyKind,

    /// Constituent columns in catalog order.
    pub columns: Vec<Column>,
}

/// Foreign key metadata, one per constraint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForeignKey {
    /// Constraint name.
    pub name: String,

    /// Whether any constituent column is nullable.
    pub is_nullable: bool,

    /// Referenced table name.
    pub references: String,

    /// Navigation property name, distinct across the table's foreign keys.
    pub unique_property_name: String,

    /// Constituent columns in constraint order.
    pub columns: Vec<Column>,
}

impl ForeignKey {
    /// Check if the key spans more than one column.
    pub fn is_composite(&self) -> bool {
        self.columns.len() > 1
    }
}

/// Inverse (one-to-many) side of a foreign key held by another table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HasMany {
    /// Referencing table name.
    pub reference: String,

    /// Foreign key column in the referencing table.
    pub reference_column: String,

    /// Constraint the relationship was derived from.
    pub constraint_name: String,
}

/// One row of the has-many constraint join: a column of a foreign key held by
/// `referencing_table` that points at the table being described.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HasManyRow {
    pub referencing_table: String,
    pub constraint_name: String,
    pub column: String,
    pub position: i32,
}

/// One row of the foreign-key constraint join: a column of a foreign key held
/// by the table being described, with the column it references.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForeignKeyRow {
    pub constraint_name: String,
    pub column: String,

    /// 1-based position of the column inside the constraint.
    pub position: i32,
    pub referenced_table: String,
    pub referenced_column: String,

    /// Whether the constraint references the target table's primary key.
    pub targets_primary_key: bool,
}

/// Derive the primary key from classified columns.
///
/// Returns `None` when no column is flagged, a single key for one column and
/// a composite key (columns in catalog order) otherwise.
pub fn determine_primary_key(columns: &[Column]) -> Option<PrimaryKey> {
    let mut pk_columns: Vec<Column> = columns
        .iter()
        .filter(|c| c.is_primary_key)
        .cloned()
        .collect();
    pk_columns.sort_by_key(|c| c.ordinal_pos);

    match pk_columns.len() {
        0 => None,
        1 => Some(PrimaryKey {
            kind: PrimaryKeyKind::Single,
            columns: pk_columns,
        }),
        _ => Some(PrimaryKey {
            kind: PrimaryKeyKind::Composite,
            columns: pk_columns,
        }),
    }
}

/// Group foreign-key columns into one [`ForeignKey`] per constraint.
///
/// Every foreign-key column must carry a resolved target; a column flagged as
/// foreign with no constraint or referenced table/column is a
/// [`SchemaMapError::MalformedSchema`]. Keys are sorted by referenced table then
/// constraint name, and their property names are made unique.
pub fn determine_foreign_keys(table_name: &str, columns: &[Column]) -> Result<Vec<ForeignKey>> {
    let mut groups: BTreeMap<String, Vec<Column>> = BTreeMap::new();

    for column in columns.iter().filter(|c| c.is_foreign_key) {
        let target = column.foreign_key.as_ref().ok_or_else(|| {
            SchemaMapError::malformed(format!(
                "column '{}.{}' is a foreign key but no referential constraint was found",
                table_name, column.name
            ))
        })?;

        if target.constraint_name.is_empty() || target.table.is_empty() || target.column.is_empty()
        {
            return Err(SchemaMapError::malformed(format!(
                "column '{}.{}' has an incomplete foreign key reference",
                table_name, column.name
            )));
        }

        groups
            .entry(target.constraint_name.clone())
            .or_default()
            .push(column.clone());
    }

    build_foreign_keys(table_name, groups)
}

/// Group constraint-level catalog rows into one [`ForeignKey`] per constraint.
///
/// Every row becomes one key column, so a column shared by two constraints
/// appears in both and a constraint over N columns always yields N columns.
/// Each constituent column carries the target of its own constraint; the
/// table's column list is annotated with the first target by constraint name.
///
/// Constraints made up only of primary key columns are skipped. A row naming
/// an unknown column, or a foreign key column no row covers, is a
/// [`SchemaMapError::MalformedSchema`].
pub fn group_foreign_keys(
    table_name: &str,
    columns: &mut [Column],
    mut rows: Vec<ForeignKeyRow>,
) -> Result<Vec<ForeignKey>> {
    rows.sort_by(|a, b| {
        a.constraint_name
            .cmp(&b.constraint_name)
            .then_with(|| a.position.cmp(&b.position))
    });

    let mut groups: BTreeMap<String, Vec<Column>> = BTreeMap::new();
    for row in rows {
        let column = columns
            .iter_mut()
            .find(|c| c.name == row.column)
            .ok_or_else(|| {
                SchemaMapError::malformed(format!(
                    "constraint '{}' names unknown column '{}.{}'",
                    row.constraint_name, table_name, row.column
                ))
            })?;

        let target = ForeignKeyTarget {
            constraint_name: row.constraint_name.clone(),
            table: row.referenced_table,
            column: row.referenced_column,
            is_primary_key: row.targets_primary_key,
            position: row.position,
        };
        if column.foreign_key.is_none() {
            column.foreign_key = Some(target.clone());
        }

        let mut key_column = column.clone();
        key_column.foreign_key = Some(target);
        groups.entry(row.constraint_name).or_default().push(key_column);
    }

    groups.retain(|name, key_columns| {
        let keep = key_columns.iter().any(|c| !c.is_primary_key);
        if !keep {
            debug!("Skipping foreign key {} over primary key columns", name);
        }
        keep
    });

    if let Some(orphan) = columns.iter().find(|c| {
        c.is_foreign_key
            && !groups
                .values()
                .any(|key_columns| key_columns.iter().any(|k| k.name == c.name))
    }) {
        return Err(SchemaMapError::malformed(format!(
            "column '{}.{}' is a foreign key but no referential constraint was found",
            table_name, orphan.name
        )));
    }

    build_foreign_keys(table_name, groups)
}

fn build_foreign_keys(
    table_name: &str,
    groups: BTreeMap<String, Vec<Column>>,
) -> Result<Vec<ForeignKey>> {
    let mut foreign_keys = Vec::with_capacity(groups.len());
    for (name, mut fk_columns) in groups {
        fk_columns.sort_by_key(|c| {
            (
                c.foreign_key.as_ref().map(|t| t.position).unwrap_or_default(),
                c.ordinal_pos,
            )
        });

        // Grouping guarantees at least one column with a target.
        let references = match fk_columns.first().and_then(|c| c.foreign_key.as_ref()) {
            Some(target) => target.table.clone(),
            None => {
                return Err(SchemaMapError::malformed(format!(
                    "foreign key '{}' has no columns",
                    name
                )))
            }
        };

        if let Some(other) = fk_columns
            .iter()
            .filter_map(|c| c.foreign_key.as_ref())
            .find(|t| t.table != references)
        {
            return Err(SchemaMapError::malformed(format!(
                "foreign key '{}' references both '{}' and '{}'",
                name, references, other.table
            )));
        }

        foreign_keys.push(ForeignKey {
            is_nullable: fk_columns.iter().any(|c| c.is_nullable),
            unique_property_name: references.clone(),
            references,
            columns: fk_columns,
            name,
        });
    }

    foreign_keys.sort_by(|a, b| a.references.cmp(&b.references).then_with(|| a.name.cmp(&b.name)));
    set_unique_foreign_key_property_names(&mut foreign_keys);

    debug!(
        "Derived {} foreign keys for {}",
        foreign_keys.len(),
        table_name
    );
    Ok(foreign_keys)
}

/// Make `unique_property_name` distinct across foreign keys.
///
/// A key that is the only one referencing its table keeps the table name.
/// Keys sharing a referenced table are suffixed with their column names, then
/// with a counter if that still collides. Processing follows slice order.
pub fn set_unique_foreign_key_property_names(foreign_keys: &mut [ForeignKey]) {
    let mut per_table: HashMap<String, usize> = HashMap::new();
    for fk in foreign_keys.iter() {
        *per_table.entry(fk.references.clone()).or_default() += 1;
    }

    let mut taken: HashSet<String> = HashSet::new();
    for fk in foreign_keys.iter_mut() {
        let base = if per_table.get(&fk.references).copied().unwrap_or_default() > 1 {
            let columns: Vec<&str> = fk.columns.iter().map(|c| c.name.as_str()).collect();
            format!("{}_{}", fk.references, columns.join("_"))
        } else {
            fk.references.clone()
        };

        let mut candidate = base.clone();
        let mut counter = 2;
        while !taken.insert(candidate.to_lowercase()) {
            candidate = format!("{}{}", base, counter);
            counter += 1;
        }
        fk.unique_property_name = candidate;
    }
}

/// Collapse has-many join rows into one relationship per referencing table.
///
/// Rows are sorted by referencing table, constraint and column position; the
/// first constraint of each referencing table wins.
pub fn determine_has_many(mut rows: Vec<HasManyRow>) -> Vec<HasMany> {
    rows.sort_by(|a, b| {
        a.referencing_table
            .cmp(&b.referencing_table)
            .then_with(|| a.constraint_name.cmp(&b.constraint_name))
            .then_with(|| a.position.cmp(&b.position))
    });

    let mut relationships: Vec<HasMany> = Vec::new();
    for row in rows {
        if relationships.iter().any(|r| r.reference == row.referencing_table) {
            continue;
        }
        relationships.push(HasMany {
            reference: row.referencing_table,
            reference_column: row.column,
            constraint_name: row.constraint_name,
        });
    }
    relationships
}
