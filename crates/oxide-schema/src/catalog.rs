//! Catalog reader: turns rows read from a database catalog into a [`Table`].
//!
//! Introspection itself is done by an [`Introspect`] implementation that
//! issues the dialect's catalog queries and fills a [`CatalogSnapshot`];
//! [`read_table`] then applies the same rules for every database.

use std::future::Future;

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::dialect::Dialect;
use crate::error::{Result, SchemaError};
use crate::model::{
    Column, ForeignKey, Index, IndexMethod, PartitionStrategy, Partitioning, SortOrder, Table,
    TableIdentifier, TableOptions,
};

/// One column of the table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnRow {
    /// Column name.
    pub name: String,
    /// Declared type, with length and precision.
    pub data_type: String,
    /// Whether NULL is allowed.
    pub nullable: bool,
    /// Default expression.
    #[serde(default)]
    pub default: Option<String>,
    /// Identity / auto-increment.
    #[serde(default)]
    pub auto_increment: bool,
    /// Generation expression of a generated column.
    #[serde(default)]
    pub generated: Option<String>,
    /// Collation, when it differs from the table default.
    #[serde(default)]
    pub collation: Option<String>,
    /// 1-based ordinal position.
    pub ordinal: i64,
}

/// One column of the primary key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrimaryKeyRow {
    /// Constraint name, if the catalog reports one.
    #[serde(default)]
    pub constraint_name: Option<String>,
    /// Key column.
    pub column_name: String,
    /// 1-based position within the key.
    pub position: i64,
}

/// One column pair of a foreign key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForeignKeyRow {
    /// Constraint name; SQLite leaves most constraints unnamed.
    #[serde(default)]
    pub constraint_name: Option<String>,
    /// Catalog id grouping the rows of an unnamed constraint.
    #[serde(default)]
    pub constraint_id: i64,
    /// Referencing column.
    pub column_name: String,
    /// 1-based position within the constraint.
    pub position: i64,
    /// Schema of the referenced table.
    #[serde(default)]
    pub referenced_schema: Option<String>,
    /// Referenced table.
    pub referenced_table: String,
    /// Referenced column.
    pub referenced_column: String,
    /// Raw ON DELETE description.
    pub on_delete: String,
    /// Raw ON UPDATE description.
    pub on_update: String,
}

/// One key part of an index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexRow {
    /// Index name.
    pub index_name: String,
    /// Key column; `None` for an expression part.
    #[serde(default)]
    pub column_name: Option<String>,
    /// 1-based position within the index.
    pub position: i64,
    /// Whether the index is unique.
    pub unique: bool,
    /// Access method as reported by the catalog.
    #[serde(default)]
    pub method: Option<String>,
    /// Whether the key part is descending.
    #[serde(default)]
    pub descending: bool,
    /// Full DDL of the index, when the catalog keeps it.
    #[serde(default)]
    pub definition: Option<String>,
    /// Partial-index predicate.
    #[serde(default)]
    pub predicate: Option<String>,
}

/// Partitioning of the table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartitionRow {
    /// Strategy (`RANGE`, or PostgreSQL's `r`/`l`/`h`).
    pub strategy: String,
    /// Key expressions, in order.
    pub expressions: Vec<String>,
}

/// Everything the catalog says about one table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogSnapshot {
    /// Column rows; empty when the table does not exist.
    #[serde(default)]
    pub columns: Vec<ColumnRow>,
    /// Primary key rows.
    #[serde(default)]
    pub primary_key: Vec<PrimaryKeyRow>,
    /// Foreign key rows.
    #[serde(default)]
    pub foreign_keys: Vec<ForeignKeyRow>,
    /// Index rows.
    #[serde(default)]
    pub indexes: Vec<IndexRow>,
    /// Partitioning, if any.
    #[serde(default)]
    pub partitioning: Option<PartitionRow>,
    /// Table options (MySQL).
    #[serde(default)]
    pub options: TableOptions,
}

/// A source of catalog snapshots, usually a live connection.
pub trait Introspect {
    /// Error raised while querying the catalog.
    type Error;

    /// Reads the catalog rows describing `table`.
    fn fetch_catalog(
        &self,
        table: &TableIdentifier,
    ) -> impl Future<Output = std::result::Result<CatalogSnapshot, Self::Error>> + Send;
}

/// Builds the actual table from a catalog snapshot. Returns `None` when the
/// snapshot has no columns, i.e. the table does not exist.
///
/// # Errors
///
/// Returns [`SchemaError::UnknownCascadeAction`] for a cascade description
/// the dialect cannot parse, and [`SchemaError::Catalog`] for index rows
/// that describe neither columns nor a definition or name an unknown
/// access method.
pub fn read_table<D: Dialect + ?Sized>(
    dialect: &D,
    identifier: &TableIdentifier,
    snapshot: &CatalogSnapshot,
) -> Result<Option<Table>> {
    if snapshot.columns.is_empty() {
        trace!(table = %identifier, "No catalog columns");
        return Ok(None);
    }

    let mut columns = snapshot.columns.clone();
    columns.sort_by_key(|c| c.ordinal);

    let mut primary_key = snapshot.primary_key.clone();
    primary_key.sort_by_key(|k| k.position);
    let is_key = |name: &str| primary_key.iter().any(|k| k.column_name.eq_ignore_ascii_case(name));

    let mut table = Table::new(identifier.clone());
    for row in &columns {
        let mut column = Column::new(&row.name, &row.data_type);
        column.nullable = row.nullable;
        column.default.clone_from(&row.default);
        column.auto_increment = row.auto_increment;
        column.generated.clone_from(&row.generated);
        column.collation.clone_from(&row.collation);
        if is_key(&row.name) {
            column = column.primary_key();
        }
        table.put_column(column);
    }

    let pk_name = primary_key.iter().find_map(|k| k.constraint_name.clone());
    table.primary_key_name.clone_from(&pk_name);

    table.foreign_keys = read_foreign_keys(dialect, identifier, &snapshot.foreign_keys)?;
    table.indexes = read_indexes(identifier, pk_name.as_deref(), &snapshot.indexes)?;

    if let Some(ref row) = snapshot.partitioning {
        let strategy = PartitionStrategy::parse(&row.strategy).ok_or_else(|| SchemaError::Catalog {
            table: identifier.to_string(),
            message: format!("unknown partition strategy '{}'", row.strategy),
        })?;
        table.partitioning = Some(Partitioning::new(strategy, row.expressions.clone()));
    }
    table.options = snapshot.options.clone();

    trace!(
        table = %identifier,
        columns = table.columns.len(),
        indexes = table.indexes.len(),
        foreign_keys = table.foreign_keys.len(),
        "Read table from catalog"
    );
    Ok(Some(table))
}

/// Groups foreign key rows by constraint, in first-seen order.
fn read_foreign_keys<D: Dialect + ?Sized>(
    dialect: &D,
    identifier: &TableIdentifier,
    rows: &[ForeignKeyRow],
) -> Result<Vec<ForeignKey>> {
    let mut groups: Vec<(String, Vec<&ForeignKeyRow>)> = Vec::new();
    for row in rows {
        let key = row
            .constraint_name
            .clone()
            .unwrap_or_else(|| format!("#{}", row.constraint_id));
        match groups.iter_mut().find(|(k, _)| *k == key) {
            Some((_, group)) => group.push(row),
            None => groups.push((key, vec![row])),
        }
    }

    groups
        .into_iter()
        .map(|(_, mut group)| {
            group.sort_by_key(|r| r.position);
            let first = group[0];
            let columns: Vec<String> = group.iter().map(|r| r.column_name.clone()).collect();
            let name = first
                .constraint_name
                .clone()
                .unwrap_or_else(|| ForeignKey::default_name(identifier, &columns));
            let linked = TableIdentifier::new(
                first.referenced_schema.clone().unwrap_or_default(),
                &first.referenced_table,
            );
            Ok(ForeignKey::new(name)
                .columns(columns)
                .references(linked, group.iter().map(|r| r.referenced_column.clone()))
                .on_delete(dialect.parse_cascade_action(&first.on_delete)?)
                .on_update(dialect.parse_cascade_action(&first.on_update)?))
        })
        .collect()
}

/// Groups index rows by name, skipping the index backing the primary key.
fn read_indexes(
    identifier: &TableIdentifier,
    pk_name: Option<&str>,
    rows: &[IndexRow],
) -> Result<Vec<Index>> {
    let backs_key = |name: &str| {
        name.eq_ignore_ascii_case("PRIMARY")
            || pk_name.is_some_and(|pk| pk.eq_ignore_ascii_case(name))
    };

    let mut groups: Vec<(&str, Vec<&IndexRow>)> = Vec::new();
    for row in rows.iter().filter(|r| !backs_key(&r.index_name)) {
        match groups.iter_mut().find(|(name, _)| *name == row.index_name) {
            Some((_, group)) => group.push(row),
            None => groups.push((row.index_name.as_str(), vec![row])),
        }
    }

    groups
        .into_iter()
        .map(|(name, mut group)| {
            group.sort_by_key(|r| r.position);
            let first = group[0];
            let catalog_error = |message: String| SchemaError::Catalog {
                table: identifier.to_string(),
                message,
            };

            let columns: Vec<&str> =
                group.iter().filter_map(|r| r.column_name.as_deref()).collect();
            let definition = group.iter().find_map(|r| r.definition.clone());
            if columns.is_empty() && definition.is_none() {
                return Err(catalog_error(format!(
                    "index {name} has neither columns nor a definition"
                )));
            }

            let mut index = match definition {
                Some(definition) => {
                    let mut index = Index::from_definition(name, definition);
                    index.columns = columns.iter().map(|c| (*c).to_string()).collect();
                    index
                }
                None => Index::new(name, columns),
            };
            index.unique = first.unique;
            if let Some(ref method) = first.method {
                index.method = IndexMethod::parse(method).ok_or_else(|| {
                    catalog_error(format!("index {name} uses unknown method '{method}'"))
                })?;
            }
            if group.iter().all(|r| r.descending) {
                index.sort_order = SortOrder::Desc;
            }
            index.predicate.clone_from(&first.predicate);
            Ok(index)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::{MySqlDialect, PostgresDialect, SqliteDialect};
    use crate::model::CascadeAction;

    fn column(name: &str, data_type: &str, nullable: bool, ordinal: i64) -> ColumnRow {
        ColumnRow {
            name: name.into(),
            data_type: data_type.into(),
            nullable,
            default: None,
            auto_increment: false,
            generated: None,
            collation: None,
            ordinal,
        }
    }

    fn index(name: &str, column: &str, position: i64) -> IndexRow {
        IndexRow {
            index_name: name.into(),
            column_name: Some(column.into()),
            position,
            unique: false,
            method: None,
            descending: false,
            definition: None,
            predicate: None,
        }
    }

    fn fk(name: Option<&str>, id: i64, column: &str, position: i64) -> ForeignKeyRow {
        ForeignKeyRow {
            constraint_name: name.map(Into::into),
            constraint_id: id,
            column_name: column.into(),
            position,
            referenced_schema: None,
            referenced_table: "orgs".into(),
            referenced_column: format!("{column}_ref"),
            on_delete: "CASCADE".into(),
            on_update: "NO ACTION".into(),
        }
    }

    fn users() -> TableIdentifier {
        TableIdentifier::new("main", "users")
    }

    #[test]
    fn missing_table_reads_as_none() {
        let table =
            read_table(&SqliteDialect::new(), &users(), &CatalogSnapshot::default()).unwrap();
        assert!(table.is_none());
    }

    #[test]
    fn key_columns_are_not_null_and_ordered() {
        let snapshot = CatalogSnapshot {
            columns: vec![
                column("email", "TEXT", true, 2),
                column("id", "INTEGER", true, 1),
            ],
            primary_key: vec![PrimaryKeyRow {
                constraint_name: None,
                column_name: "id".into(),
                position: 1,
            }],
            ..CatalogSnapshot::default()
        };
        let table = read_table(&SqliteDialect::new(), &users(), &snapshot).unwrap().unwrap();
        assert_eq!(table.columns[0].name, "id");
        assert!(!table.columns[0].nullable);
        assert!(table.columns[0].primary_key);
        assert!(table.columns[1].nullable);
    }

    #[test]
    fn foreign_keys_group_by_constraint() {
        let snapshot = CatalogSnapshot {
            columns: vec![column("a", "INTEGER", true, 1), column("b", "INTEGER", true, 2)],
            foreign_keys: vec![
                fk(None, 0, "b", 2),
                fk(None, 0, "a", 1),
                fk(Some("fk_named"), 1, "b", 1),
            ],
            ..CatalogSnapshot::default()
        };
        let table = read_table(&SqliteDialect::new(), &users(), &snapshot).unwrap().unwrap();
        assert_eq!(table.foreign_keys.len(), 2);

        let unnamed = &table.foreign_keys[0];
        assert_eq!(unnamed.name, "fk_users_a_b");
        assert_eq!(unnamed.columns, vec!["a", "b"]);
        assert_eq!(unnamed.linked_columns, vec!["a_ref", "b_ref"]);
        assert_eq!(unnamed.on_delete, CascadeAction::Cascade);
        assert_eq!(unnamed.on_update, CascadeAction::NoAction);
        assert_eq!(table.foreign_keys[1].name, "fk_named");
    }

    #[test]
    fn unknown_cascade_is_an_error() {
        let mut row = fk(Some("fk"), 0, "a", 1);
        row.on_delete = "EXPLODE".into();
        let snapshot = CatalogSnapshot {
            columns: vec![column("a", "INTEGER", true, 1)],
            foreign_keys: vec![row],
            ..CatalogSnapshot::default()
        };
        let err = read_table(&SqliteDialect::new(), &users(), &snapshot).unwrap_err();
        assert!(matches!(err, SchemaError::UnknownCascadeAction { .. }));
    }

    #[test]
    fn postgres_cascade_codes() {
        let mut row = fk(Some("fk"), 0, "a", 1);
        row.on_delete = "n".into();
        row.on_update = "a".into();
        let snapshot = CatalogSnapshot {
            columns: vec![column("a", "integer", true, 1)],
            foreign_keys: vec![row],
            ..CatalogSnapshot::default()
        };
        let table = read_table(&PostgresDialect::new(), &users(), &snapshot).unwrap().unwrap();
        assert_eq!(table.foreign_keys[0].on_delete, CascadeAction::SetNull);
    }

    #[test]
    fn indexes_skip_primary_key_and_keep_definitions() {
        let mut with_ddl = index("idx_users_email", "email", 1);
        with_ddl.definition = Some("CREATE INDEX idx_users_email ON users (email)".into());
        with_ddl.unique = true;
        let snapshot = CatalogSnapshot {
            columns: vec![column("id", "INT", false, 1), column("email", "TEXT", true, 2)],
            primary_key: vec![PrimaryKeyRow {
                constraint_name: Some("PRIMARY".into()),
                column_name: "id".into(),
                position: 1,
            }],
            indexes: vec![
                index("PRIMARY", "id", 1),
                with_ddl,
                index("idx_multi", "email", 2),
                index("idx_multi", "id", 1),
            ],
            ..CatalogSnapshot::default()
        };
        let table = read_table(&MySqlDialect::new(), &users(), &snapshot).unwrap().unwrap();
        assert_eq!(table.indexes.len(), 2);
        assert!(table.indexes[0].unique);
        assert!(table.indexes[0].definition.is_some());
        assert_eq!(table.indexes[1].columns, vec!["id", "email"]);
    }

    #[test]
    fn malformed_index_rows() {
        let mut empty = index("idx_empty", "x", 1);
        empty.column_name = None;
        let snapshot = CatalogSnapshot {
            columns: vec![column("x", "TEXT", true, 1)],
            indexes: vec![empty],
            ..CatalogSnapshot::default()
        };
        let err = read_table(&SqliteDialect::new(), &users(), &snapshot).unwrap_err();
        assert!(matches!(err, SchemaError::Catalog { .. }));

        let mut odd = index("idx_odd", "x", 1);
        odd.method = Some("rtree".into());
        let snapshot = CatalogSnapshot {
            columns: vec![column("x", "TEXT", true, 1)],
            indexes: vec![odd],
            ..CatalogSnapshot::default()
        };
        assert!(read_table(&SqliteDialect::new(), &users(), &snapshot).is_err());
    }

    #[test]
    fn snapshot_deserializes_with_defaults() {
        let snapshot: CatalogSnapshot = serde_json::from_str(
            r#"{"columns":[{"name":"id","data_type":"BIGINT","nullable":false,"ordinal":1}],
                "partitioning":{"strategy":"r","expressions":["id"]}}"#,
        )
        .unwrap();
        let table = read_table(&PostgresDialect::new(), &users(), &snapshot).unwrap().unwrap();
        assert_eq!(
            table.partitioning.map(|p| p.strategy),
            Some(PartitionStrategy::Range)
        );
    }
}
