//! SQL Server dialect.

use super::{host_type_key, index_key, quote_list, storage_parameters, validate_index, Dialect};
use crate::error::{Result, SchemaError};
use crate::model::{base_type, CascadeAction, CascadeEvent, Column, Index, TableIdentifier};

/// SQL Server dialect for DDL generation.
#[derive(Debug, Clone, Copy, Default)]
pub struct SqlServerDialect;

impl SqlServerDialect {
    /// Creates a new SQL Server dialect.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

/// Escapes a value for an `N'...'` literal.
fn literal(value: &str) -> String {
    format!("N'{}'", value.replace('\'', "''"))
}

impl Dialect for SqlServerDialect {
    fn name(&self) -> &'static str {
        "sqlserver"
    }

    fn default_schema(&self) -> &'static str {
        "dbo"
    }

    fn quote_identifier(&self, name: &str) -> String {
        format!("[{}]", name.replace(']', "]]"))
    }

    fn map_host_type(&self, host_type: &str) -> Option<&'static str> {
        Some(match host_type_key(host_type).as_str() {
            "u8" => "TINYINT",
            "i8" | "i16" => "SMALLINT",
            "i32" | "u16" => "INT",
            "i64" | "u32" => "BIGINT",
            "f32" => "REAL",
            "f64" => "FLOAT",
            "bool" => "BIT",
            "String" | "str" => "NVARCHAR(MAX)",
            "char" => "NCHAR(1)",
            "Vec<u8>" => "VARBINARY(MAX)",
            "Uuid" => "UNIQUEIDENTIFIER",
            "NaiveDate" => "DATE",
            "NaiveTime" => "TIME",
            "NaiveDateTime" => "DATETIME2",
            "DateTime<Utc>" | "DateTime<FixedOffset>" | "DateTime<Local>" => "DATETIMEOFFSET",
            "Decimal" => "DECIMAL(38, 10)",
            "Value" => "NVARCHAR(MAX)",
            _ => return None,
        })
    }

    fn canonical_type(&self, column_type: &str) -> String {
        let base = base_type(column_type);
        let folded = match base.as_str() {
            "INTEGER" => "INT",
            "DEC" | "NUMERIC" => "DECIMAL",
            "DOUBLE PRECISION" => "FLOAT",
            "CHARACTER VARYING" => "VARCHAR",
            "CHARACTER" => "CHAR",
            "NATIONAL CHARACTER VARYING" => "NVARCHAR",
            "TIMESTAMP" => "ROWVERSION",
            _ => return base,
        };
        folded.to_string()
    }

    fn supports_cascade(&self, action: CascadeAction, _event: CascadeEvent) -> bool {
        action != CascadeAction::Restrict
    }

    fn canonicalize_noise(&self, canonical: String) -> String {
        canonical.replace(" NONCLUSTERED", "")
    }

    fn auto_increment_clause(&self) -> Option<&'static str> {
        Some("IDENTITY(1,1)")
    }

    fn column_definition(&self, column: &Column) -> String {
        let Some(ref expression) = column.generated else {
            let mut parts = vec![self.quote_identifier(&column.name), column.column_type.clone()];
            if let Some(ref collation) = column.collation {
                parts.push(format!("COLLATE {collation}"));
            }
            if column.auto_increment {
                parts.push("IDENTITY(1,1)".to_string());
            } else if let Some(ref default) = column.default {
                parts.push(format!("DEFAULT {default}"));
            }
            parts.push(if column.nullable { "NULL" } else { "NOT NULL" }.to_string());
            return parts.join(" ");
        };

        let mut sql = format!(
            "{} AS ({expression}) PERSISTED",
            self.quote_identifier(&column.name)
        );
        if !column.nullable {
            sql.push_str(" NOT NULL");
        }
        sql
    }

    fn add_column(&self, table: &TableIdentifier, column: &Column) -> String {
        format!(
            "ALTER TABLE {} ADD {}",
            self.qualify(table),
            self.column_definition(column)
        )
    }

    fn alter_column(
        &self,
        table: &TableIdentifier,
        expected: &Column,
        actual: &Column,
    ) -> Result<Vec<String>> {
        let type_changed =
            self.canonical_type(&expected.column_type) != self.canonical_type(&actual.column_type);
        if !type_changed && expected.nullable == actual.nullable {
            return Ok(Vec::new());
        }
        Ok(vec![format!(
            "ALTER TABLE {} ALTER COLUMN {} {} {}",
            self.qualify(table),
            self.quote_identifier(&expected.name),
            expected.column_type,
            if expected.nullable { "NULL" } else { "NOT NULL" }
        )])
    }

    fn create_index(&self, table: &TableIdentifier, index: &Index) -> Result<String> {
        validate_index(self, index)?;
        if index.expression.is_some() {
            return Err(SchemaError::not_supported(self.name(), "expression indexes"));
        }

        let mut sql = format!(
            "CREATE {}INDEX {} ON {} {}",
            if index.unique { "UNIQUE " } else { "" },
            self.quote_identifier(&index.name),
            self.qualify(table),
            index_key(self, index)
        );
        if !index.include_columns.is_empty() {
            sql.push_str(&format!(" INCLUDE ({})", quote_list(self, &index.include_columns)));
        }
        if let Some(ref predicate) = index.predicate {
            sql.push_str(&format!(" WHERE {predicate}"));
        }
        if let Some(parameters) = storage_parameters(index) {
            sql.push(' ');
            sql.push_str(&parameters);
        }
        Ok(sql)
    }

    fn drop_index(&self, table: &TableIdentifier, index: &Index) -> String {
        format!(
            "DROP INDEX {} ON {}",
            self.quote_identifier(&index.name),
            self.qualify(table)
        )
    }

    fn rename_table(&self, table: &TableIdentifier, new_name: &str) -> String {
        format!(
            "EXEC sp_rename {}, {}",
            literal(&self.qualify(table)),
            literal(new_name)
        )
    }

    fn create_schema(&self, schema: &str) -> Option<String> {
        if schema.is_empty() {
            return None;
        }
        Some(format!(
            "IF SCHEMA_ID({}) IS NULL EXEC({})",
            literal(schema),
            literal(&format!("CREATE SCHEMA {}", self.quote_identifier(schema)))
        ))
    }
}
