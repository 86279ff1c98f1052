//! SQLite catalog introspection.
//!
//! Reads `pragma_table_xinfo`, `pragma_foreign_key_list`,
//! `pragma_index_list` / `pragma_index_xinfo` and the stored DDL in
//! `sqlite_master`, and turns them into a [`CatalogSnapshot`].

use std::collections::HashMap;
use std::sync::LazyLock;

use oxide_schema::catalog::{ColumnRow, ForeignKeyRow, IndexRow, PrimaryKeyRow};
use oxide_schema::{CatalogSnapshot, Introspect, TableIdentifier};
use regex::Regex;
use sqlx::sqlite::SqlitePool;
use tracing::debug;

static AUTOINCREMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bAUTOINCREMENT\b").expect("autoincrement regex"));

static NAMED_FOREIGN_KEY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)CONSTRAINT\s+["`\[]?([^"`\]\s]+)["`\]]?\s+FOREIGN\s+KEY\s*\(([^)]*)\)"#)
        .expect("foreign key regex")
});

type ColumnInfo = (i64, String, String, i64, Option<String>, i64, i64);
type ForeignKeyInfo = (i64, i64, String, String, Option<String>, String, String);
type IndexInfo = (String, i64, i64, Option<String>, i64, Option<String>);

/// Reads table catalogs from a SQLite database.
#[derive(Debug, Clone)]
pub struct SqliteIntrospector {
    pool: SqlitePool,
}

impl SqliteIntrospector {
    /// Creates an introspector over the pool.
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Returns the pool.
    #[must_use]
    pub const fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    async fn snapshot(&self, table: &TableIdentifier) -> Result<CatalogSnapshot, sqlx::Error> {
        let schema = if table.schema.is_empty() { "main" } else { table.schema.as_str() };
        let master = format!("\"{}\".sqlite_master", schema.replace('"', "\"\""));

        let ddl: Option<(Option<String>,)> =
            sqlx::query_as(&format!("SELECT sql FROM {master} WHERE type = 'table' AND name = ?1"))
                .bind(&table.name)
                .fetch_optional(&self.pool)
                .await?;
        let Some((ddl,)) = ddl else {
            debug!(table = %table, "Table not found in catalog");
            return Ok(CatalogSnapshot::default());
        };
        let ddl = ddl.unwrap_or_default();

        let column_info: Vec<ColumnInfo> = sqlx::query_as(
            "SELECT cid, name, type, \"notnull\", dflt_value, pk, hidden \
             FROM pragma_table_xinfo(?1, ?2) ORDER BY cid",
        )
        .bind(&table.name)
        .bind(schema)
        .fetch_all(&self.pool)
        .await?;

        let key_count = column_info.iter().filter(|c| c.5 > 0).count();
        let auto_increment = key_count == 1 && AUTOINCREMENT.is_match(&ddl);

        let mut snapshot = CatalogSnapshot::default();
        for (cid, name, data_type, not_null, default, pk, hidden) in column_info {
            if pk > 0 {
                snapshot.primary_key.push(PrimaryKeyRow {
                    constraint_name: None,
                    column_name: name.clone(),
                    position: pk,
                });
            }
            // hidden: 2 = virtual generated, 3 = stored generated
            let generated = matches!(hidden, 2 | 3)
                .then(|| generated_expression(&ddl, &name))
                .flatten();
            snapshot.columns.push(ColumnRow {
                generated,
                auto_increment: auto_increment && pk > 0,
                nullable: not_null == 0,
                name,
                data_type,
                default,
                collation: None,
                ordinal: cid + 1,
            });
        }

        let foreign_keys: Vec<ForeignKeyInfo> = sqlx::query_as(
            "SELECT id, seq, \"table\", \"from\", \"to\", on_update, on_delete \
             FROM pragma_foreign_key_list(?1, ?2) ORDER BY id, seq",
        )
        .bind(&table.name)
        .bind(schema)
        .fetch_all(&self.pool)
        .await?;

        let names = foreign_key_names(&ddl);
        let mut columns_by_id: HashMap<i64, Vec<String>> = HashMap::new();
        for fk in &foreign_keys {
            columns_by_id.entry(fk.0).or_default().push(fk.3.to_lowercase());
        }

        for (id, seq, referenced, column, to, on_update, on_delete) in foreign_keys {
            let referenced_column = match to {
                Some(to) => to,
                None => self.primary_key_column(schema, &referenced, seq).await?,
            };
            let constraint_name = columns_by_id
                .get(&id)
                .and_then(|cols| names.get(&cols.join(",")))
                .cloned();
            snapshot.foreign_keys.push(ForeignKeyRow {
                constraint_name,
                constraint_id: id,
                column_name: column,
                position: seq + 1,
                referenced_schema: None,
                referenced_table: referenced,
                referenced_column,
                on_delete,
                on_update,
            });
        }

        // origin 'c': created by CREATE INDEX. Constraint autoindexes
        // cannot be dropped and are not compared.
        let indexes: Vec<IndexInfo> = sqlx::query_as(&format!(
            "SELECT il.name, il.\"unique\", ix.seqno, ix.name, ix.\"desc\", m.sql \
             FROM pragma_index_list(?1, ?2) AS il \
             JOIN pragma_index_xinfo(il.name, ?2) AS ix \
             LEFT JOIN {master} AS m ON m.type = 'index' AND m.name = il.name \
             WHERE il.origin = 'c' AND ix.key = 1 \
             ORDER BY il.seq, ix.seqno"
        ))
        .bind(&table.name)
        .bind(schema)
        .fetch_all(&self.pool)
        .await?;

        for (index_name, unique, seqno, column_name, descending, definition) in indexes {
            snapshot.indexes.push(IndexRow {
                index_name,
                column_name,
                position: seqno + 1,
                unique: unique != 0,
                method: None,
                descending: descending != 0,
                definition,
                predicate: None,
            });
        }

        debug!(
            table = %table,
            columns = snapshot.columns.len(),
            foreign_keys = snapshot.foreign_keys.len(),
            indexes = snapshot.indexes.len(),
            "Read SQLite catalog"
        );
        Ok(snapshot)
    }

    /// The `seq`-th primary key column of `table`, for foreign keys that
    /// reference the key implicitly.
    async fn primary_key_column(
        &self,
        schema: &str,
        table: &str,
        seq: i64,
    ) -> Result<String, sqlx::Error> {
        let row: Option<(String,)> = sqlx::query_as(
            "SELECT name FROM pragma_table_info(?1, ?2) WHERE pk = ?3",
        )
        .bind(table)
        .bind(schema)
        .bind(seq + 1)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(|(name,)| name).unwrap_or_default())
    }
}

impl Introspect for SqliteIntrospector {
    type Error = sqlx::Error;

    async fn fetch_catalog(&self, table: &TableIdentifier) -> Result<CatalogSnapshot, sqlx::Error> {
        self.snapshot(table).await
    }
}

/// Constraint names declared in the table DDL, keyed by their lowercase,
/// comma-joined column list.
fn foreign_key_names(ddl: &str) -> HashMap<String, String> {
    NAMED_FOREIGN_KEY
        .captures_iter(ddl)
        .map(|caps| {
            let columns = caps[2]
                .split(',')
                .map(|c| {
                    c.trim()
                        .trim_matches(|ch| matches!(ch, '"' | '`' | '[' | ']'))
                        .to_lowercase()
                })
                .collect::<Vec<_>>()
                .join(",");
            (columns, caps[1].to_string())
        })
        .collect()
}

/// The expression of `GENERATED ALWAYS AS (...)` in the column's
/// definition within the table DDL.
fn generated_expression(ddl: &str, column: &str) -> Option<String> {
    let upper = ddl.to_ascii_uppercase();
    let name = column.to_ascii_uppercase();
    let start = [
        format!("\"{name}\""),
        format!("`{name}`"),
        format!("[{name}]"),
        format!(" {name} "),
    ]
    .iter()
    .find_map(|quoted| upper.find(quoted.as_str()))?;

    // The definition ends at the next top-level comma or the closing
    // parenthesis of the column list.
    let mut depth = 0usize;
    let mut end = upper.len();
    for (i, c) in upper[start..].char_indices() {
        match c {
            '(' => depth += 1,
            ')' if depth == 0 => {
                end = start + i;
                break;
            }
            ')' => depth -= 1,
            ',' if depth == 0 => {
                end = start + i;
                break;
            }
            _ => {}
        }
    }

    let open = upper[start..end].find(" AS (")? + start + " AS (".len();
    let mut depth = 1usize;
    for (i, c) in ddl[open..end].char_indices() {
        match c {
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth == 0 {
                    return Some(ddl[open..open + i].trim().to_string());
                }
            }
            _ => {}
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_foreign_key_names() {
        let names = foreign_key_names(
            "CREATE TABLE \"orders\" (\n  \"id\" INTEGER,\n  \"user_id\" INTEGER,\n  \
             CONSTRAINT \"fk_orders_user\" FOREIGN KEY (\"user_id\") REFERENCES \"users\" (\"id\")\n)",
        );
        assert_eq!(names.get("user_id").map(String::as_str), Some("fk_orders_user"));
    }

    #[test]
    fn test_generated_expression() {
        let ddl = "CREATE TABLE t (\n  \"a\" INTEGER,\n  \"b\" INTEGER GENERATED ALWAYS AS ((a * 2) + 1) STORED\n)";
        assert_eq!(generated_expression(ddl, "b").as_deref(), Some("(a * 2) + 1"));
        assert_eq!(generated_expression(ddl, "a"), None);
    }
}
