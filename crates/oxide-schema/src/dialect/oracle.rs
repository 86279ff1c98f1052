//! Oracle dialect.

use super::{host_type_key, index_key, validate_index, Dialect};
use crate::error::{Result, SchemaError};
use crate::model::{
    base_type, CascadeAction, CascadeEvent, Column, Index, IndexMethod, TableIdentifier,
};

/// Oracle dialect for DDL generation.
#[derive(Debug, Clone, Copy, Default)]
pub struct OracleDialect;

impl OracleDialect {
    /// Creates a new Oracle dialect.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Dialect for OracleDialect {
    fn name(&self) -> &'static str {
        "oracle"
    }

    fn default_schema(&self) -> &'static str {
        ""
    }

    fn map_host_type(&self, host_type: &str) -> Option<&'static str> {
        Some(match host_type_key(host_type).as_str() {
            "i8" | "u8" => "NUMBER(3)",
            "i16" | "u16" => "NUMBER(5)",
            "i32" | "u32" => "NUMBER(10)",
            "i64" | "u64" => "NUMBER(19)",
            "f32" => "BINARY_FLOAT",
            "f64" => "BINARY_DOUBLE",
            "bool" => "NUMBER(1)",
            "String" | "str" => "VARCHAR2(4000)",
            "char" => "CHAR(1)",
            "Vec<u8>" => "BLOB",
            "Uuid" => "RAW(16)",
            "NaiveDate" => "DATE",
            "NaiveDateTime" => "TIMESTAMP",
            "DateTime<Utc>" | "DateTime<FixedOffset>" | "DateTime<Local>" => {
                "TIMESTAMP WITH TIME ZONE"
            }
            "Decimal" => "NUMBER",
            "Value" => "CLOB",
            _ => return None,
        })
    }

    fn canonical_type(&self, column_type: &str) -> String {
        let base = base_type(column_type);
        let folded = match base.as_str() {
            "NUMERIC" | "DECIMAL" | "DEC" | "INTEGER" | "INT" | "SMALLINT" => "NUMBER",
            "VARCHAR" | "CHARACTER VARYING" => "VARCHAR2",
            "DOUBLE PRECISION" | "REAL" => "FLOAT",
            "CHARACTER" => "CHAR",
            _ => return base,
        };
        folded.to_string()
    }

    fn supports_cascade(&self, action: CascadeAction, event: CascadeEvent) -> bool {
        match event {
            CascadeEvent::Delete => matches!(
                action,
                CascadeAction::NoAction | CascadeAction::Cascade | CascadeAction::SetNull
            ),
            CascadeEvent::Update => action == CascadeAction::NoAction,
        }
    }

    fn supports_index_method(&self, method: IndexMethod) -> bool {
        matches!(method, IndexMethod::BTree | IndexMethod::Bitmap)
    }

    fn auto_increment_clause(&self) -> Option<&'static str> {
        Some("GENERATED BY DEFAULT AS IDENTITY")
    }

    fn generated_clause(&self, expression: &str) -> String {
        format!("GENERATED ALWAYS AS ({expression}) VIRTUAL")
    }

    fn add_column(&self, table: &TableIdentifier, column: &Column) -> String {
        format!(
            "ALTER TABLE {} ADD ({})",
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
        let table = self.qualify(table);
        let column = self.quote_identifier(&expected.name);
        let mut statements = Vec::new();

        if self.canonical_type(&expected.column_type) != self.canonical_type(&actual.column_type) {
            statements.push(format!(
                "ALTER TABLE {table} MODIFY ({column} {})",
                expected.column_type
            ));
        }
        // Oracle raises ORA-01442 when NOT NULL is restated unchanged.
        if expected.nullable != actual.nullable {
            statements.push(format!(
                "ALTER TABLE {table} MODIFY ({column} {})",
                if expected.nullable { "NULL" } else { "NOT NULL" }
            ));
        }
        Ok(statements)
    }

    fn create_index(&self, table: &TableIdentifier, index: &Index) -> Result<String> {
        validate_index(self, index)?;
        if index.predicate.is_some() {
            return Err(SchemaError::not_supported(self.name(), "partial indexes"));
        }
        if !index.include_columns.is_empty() {
            return Err(SchemaError::not_supported(self.name(), "index include columns"));
        }
        if !index.storage_parameters.is_empty() {
            return Err(SchemaError::not_supported(self.name(), "index storage parameters"));
        }

        let kind = if index.method == IndexMethod::Bitmap {
            "BITMAP "
        } else if index.unique {
            "UNIQUE "
        } else {
            ""
        };
        Ok(format!(
            "CREATE {kind}INDEX {} ON {} {}",
            self.qualify(&table.with_name(&index.name)),
            self.qualify(table),
            index_key(self, index)
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ForeignKey, Table};

    fn dialect() -> OracleDialect {
        OracleDialect::new()
    }

    fn accounts() -> TableIdentifier {
        TableIdentifier::new("APP", "accounts")
    }

    #[test]
    fn test_identity_and_virtual_columns() {
        let table = Table::new(accounts())
            .column(Column::new("id", "NUMBER(19)").primary_key().auto_increment())
            .column(Column::new("balance", "NUMBER(12, 2)").not_null().default_value("0"))
            .column(Column::new("cents", "NUMBER").generated_as("balance * 100"));

        assert_eq!(
            dialect().create_table(&table).unwrap(),
            "CREATE TABLE \"APP\".\"accounts\" (\n  \
             \"id\" NUMBER(19) GENERATED BY DEFAULT AS IDENTITY NOT NULL,\n  \
             \"balance\" NUMBER(12, 2) DEFAULT 0 NOT NULL,\n  \
             \"cents\" NUMBER GENERATED ALWAYS AS (balance * 100) VIRTUAL,\n  \
             PRIMARY KEY (\"id\")\n)"
        );
    }

    #[test]
    fn test_cascade_restrictions() {
        let d = dialect();
        assert!(d.supports_cascade(CascadeAction::Cascade, CascadeEvent::Delete));
        assert!(!d.supports_cascade(CascadeAction::Restrict, CascadeEvent::Delete));
        assert!(!d.supports_cascade(CascadeAction::SetDefault, CascadeEvent::Delete));
        assert!(!d.supports_cascade(CascadeAction::Cascade, CascadeEvent::Update));

        let fk = ForeignKey::new("fk_acc_owner")
            .columns(["owner_id"])
            .references(TableIdentifier::new("APP", "owners"), ["id"])
            .on_update(CascadeAction::Cascade);
        assert!(matches!(
            d.foreign_key_clause(&fk),
            Err(SchemaError::Configuration { .. })
        ));
    }

    #[test]
    fn test_modify_column_only_restates_changed_nullability() {
        let sql = dialect()
            .alter_column(
                &accounts(),
                &Column::new("balance", "NUMBER(14, 2)").not_null(),
                &Column::new("balance", "NUMBER(12, 2)"),
            )
            .unwrap();
        assert_eq!(
            sql,
            vec!["ALTER TABLE \"APP\".\"accounts\" MODIFY (\"balance\" NOT NULL)"]
        );

        let sql = dialect()
            .alter_column(
                &accounts(),
                &Column::new("balance", "VARCHAR2(20)").not_null(),
                &Column::new("balance", "NUMBER").not_null(),
            )
            .unwrap();
        assert_eq!(
            sql,
            vec!["ALTER TABLE \"APP\".\"accounts\" MODIFY (\"balance\" VARCHAR2(20))"]
        );
    }

    #[test]
    fn test_bitmap_index_and_add_column() {
        let index = Index::new("ix_acc_status", ["status"]).method(IndexMethod::Bitmap);
        assert_eq!(
            dialect().create_index(&accounts(), &index).unwrap(),
            "CREATE BITMAP INDEX \"APP\".\"ix_acc_status\" ON \"APP\".\"accounts\" (\"status\")"
        );
        assert_eq!(
            dialect().add_column(&accounts(), &Column::new("note", "CLOB")),
            "ALTER TABLE \"APP\".\"accounts\" ADD (\"note\" CLOB)"
        );
        assert!(dialect().create_schema("APP").is_none());
    }
}
