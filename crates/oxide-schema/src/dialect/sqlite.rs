//! SQLite dialect.
//!
//! SQLite cannot alter column types or add and drop constraints on an
//! existing table; such changes are carried out by rebuilding the table.

use super::{host_type_key, index_key, validate_index, Dialect};
use crate::error::{Result, SchemaError};
use crate::model::{base_type, Column, Index, Table, TableIdentifier};

/// SQLite dialect for DDL generation.
#[derive(Debug, Clone, Copy, Default)]
pub struct SqliteDialect;

impl SqliteDialect {
    /// Creates a new SQLite dialect.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// A single auto-increment key column is declared inline as
    /// `INTEGER PRIMARY KEY AUTOINCREMENT`.
    fn inline_key(table: &Table) -> Option<&Column> {
        let mut keys = table.columns.iter().filter(|c| c.primary_key);
        match (keys.next(), keys.next()) {
            (Some(column), None) if column.auto_increment => Some(column),
            _ => None,
        }
    }
}

impl Dialect for SqliteDialect {
    fn name(&self) -> &'static str {
        "sqlite"
    }

    fn default_schema(&self) -> &'static str {
        "main"
    }

    fn qualify(&self, table: &TableIdentifier) -> String {
        if table.schema.is_empty() || table.schema.eq_ignore_ascii_case("main") {
            self.quote_identifier(&table.name)
        } else {
            format!(
                "{}.{}",
                self.quote_identifier(&table.schema),
                self.quote_identifier(&table.name)
            )
        }
    }

    fn reference_name(&self, table: &TableIdentifier) -> String {
        // REFERENCES cannot be schema-qualified.
        self.quote_identifier(&table.name)
    }

    fn map_host_type(&self, host_type: &str) -> Option<&'static str> {
        Some(match host_type_key(host_type).as_str() {
            "i8" | "i16" | "i32" | "i64" | "u8" | "u16" | "u32" | "bool" => "INTEGER",
            "f32" | "f64" => "REAL",
            "String" | "str" | "char" | "Uuid" | "NaiveDate" | "NaiveTime" | "NaiveDateTime"
            | "DateTime<Utc>" | "DateTime<FixedOffset>" | "DateTime<Local>" | "Value" => "TEXT",
            "Vec<u8>" => "BLOB",
            "Decimal" => "NUMERIC",
            _ => return None,
        })
    }

    /// SQLite stores the declared type verbatim, so only spellings of the
    /// same name are folded.
    fn canonical_type(&self, column_type: &str) -> String {
        let base = base_type(column_type);
        let folded = match base.as_str() {
            "INT" => "INTEGER",
            "CHARACTER VARYING" => "VARCHAR",
            "CHARACTER" => "CHAR",
            "DOUBLE PRECISION" => "DOUBLE",
            "BOOL" => "BOOLEAN",
            _ => return base,
        };
        folded.to_string()
    }

    fn supports_alter_column(&self) -> bool {
        false
    }

    fn supports_alter_constraints(&self) -> bool {
        false
    }

    fn can_add_column(&self, column: &Column) -> bool {
        !column.primary_key
            && column.generated.is_none()
            && !column.auto_increment
            && (column.nullable || column.default.is_some())
    }

    fn can_drop_column(&self, column: &Column, table: &Table) -> bool {
        !column.primary_key
            && !table.foreign_keys.iter().any(|fk| {
                fk.columns
                    .iter()
                    .any(|c| c.eq_ignore_ascii_case(&column.name))
            })
    }

    fn auto_increment_clause(&self) -> Option<&'static str> {
        None
    }

    fn table_column_definition(&self, table: &Table, column: &Column) -> String {
        match Self::inline_key(table) {
            Some(key) if key.name == column.name => format!(
                "{} {} PRIMARY KEY AUTOINCREMENT NOT NULL",
                self.quote_identifier(&column.name),
                column.column_type
            ),
            _ => self.column_definition(column),
        }
    }

    fn primary_key_clause(&self, table: &Table) -> Option<String> {
        if Self::inline_key(table).is_some() {
            return None;
        }
        let columns = table.primary_key_columns();
        if columns.is_empty() {
            return None;
        }
        let list = super::quote_list(self, &columns);
        Some(match table.primary_key_name {
            Some(ref name) => format!(
                "CONSTRAINT {} PRIMARY KEY ({list})",
                self.quote_identifier(name)
            ),
            None => format!("PRIMARY KEY ({list})"),
        })
    }

    fn create_index(&self, table: &TableIdentifier, index: &Index) -> Result<String> {
        validate_index(self, index)?;
        if !index.include_columns.is_empty() {
            return Err(SchemaError::not_supported(self.name(), "index include columns"));
        }
        if !index.storage_parameters.is_empty() {
            return Err(SchemaError::not_supported(self.name(), "index storage parameters"));
        }

        // The schema qualifies the index name; the table must be bare.
        let mut sql = format!(
            "CREATE {}INDEX {} ON {} {}",
            if index.unique { "UNIQUE " } else { "" },
            self.qualify(&table.with_name(&index.name)),
            self.quote_identifier(&table.name),
            index_key(self, index)
        );
        if let Some(ref predicate) = index.predicate {
            sql.push_str(&format!(" WHERE {predicate}"));
        }
        Ok(sql)
    }
}
