//! PostgreSQL dialect.

use std::sync::LazyLock;

use regex::Regex;

use super::{host_type_key, index_key, quote_list, storage_parameters, validate_index, Dialect};
use crate::error::Result;
use crate::model::{base_type, CascadeAction, Column, Index, IndexMethod, Table, TableIdentifier};

static STORAGE_PARAMETERS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bWITH\(").expect("storage parameters regex"));

/// PostgreSQL dialect for DDL generation.
#[derive(Debug, Clone, Copy, Default)]
pub struct PostgresDialect;

impl PostgresDialect {
    /// Creates a new PostgreSQL dialect.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Dialect for PostgresDialect {
    fn name(&self) -> &'static str {
        "postgresql"
    }

    fn default_schema(&self) -> &'static str {
        "public"
    }

    fn map_host_type(&self, host_type: &str) -> Option<&'static str> {
        Some(match host_type_key(host_type).as_str() {
            "i8" | "i16" | "u8" => "SMALLINT",
            "i32" | "u16" => "INTEGER",
            "i64" | "u32" => "BIGINT",
            "f32" => "REAL",
            "f64" => "DOUBLE PRECISION",
            "bool" => "BOOLEAN",
            "String" | "str" | "char" => "TEXT",
            "Vec<u8>" => "BYTEA",
            "Uuid" => "UUID",
            "NaiveDate" => "DATE",
            "NaiveTime" => "TIME",
            "NaiveDateTime" => "TIMESTAMP",
            "DateTime<Utc>" | "DateTime<FixedOffset>" | "DateTime<Local>" => "TIMESTAMPTZ",
            "Decimal" => "NUMERIC",
            "Value" => "JSONB",
            _ => return None,
        })
    }

    fn canonical_type(&self, column_type: &str) -> String {
        let base = base_type(column_type);
        let folded = match base.as_str() {
            "INT" | "INT4" | "SERIAL" | "SERIAL4" => "INTEGER",
            "INT8" | "BIGSERIAL" | "SERIAL8" => "BIGINT",
            "INT2" | "SMALLSERIAL" | "SERIAL2" => "SMALLINT",
            "FLOAT8" | "FLOAT" => "DOUBLE PRECISION",
            "FLOAT4" => "REAL",
            "BOOL" => "BOOLEAN",
            "CHARACTER VARYING" => "VARCHAR",
            "CHARACTER" | "BPCHAR" => "CHAR",
            "DECIMAL" => "NUMERIC",
            "TIMESTAMP WITH TIME ZONE" => "TIMESTAMPTZ",
            "TIMESTAMP WITHOUT TIME ZONE" => "TIMESTAMP",
            "TIME WITH TIME ZONE" => "TIMETZ",
            "TIME WITHOUT TIME ZONE" => "TIME",
            _ => return base,
        };
        folded.to_string()
    }

    fn supports_index_method(&self, method: IndexMethod) -> bool {
        matches!(
            method,
            IndexMethod::BTree
                | IndexMethod::Hash
                | IndexMethod::Gist
                | IndexMethod::Gin
                | IndexMethod::Brin
        )
    }

    fn supports_partitioning(&self) -> bool {
        true
    }

    fn parse_cascade_action(&self, value: &str) -> Result<CascadeAction> {
        // pg_constraint.confdeltype / confupdtype codes
        match value.trim() {
            "a" => Ok(CascadeAction::NoAction),
            "r" => Ok(CascadeAction::Restrict),
            "c" => Ok(CascadeAction::Cascade),
            "n" => Ok(CascadeAction::SetNull),
            "d" => Ok(CascadeAction::SetDefault),
            other => CascadeAction::parse(other),
        }
    }

    fn canonicalize_noise(&self, canonical: String) -> String {
        let out = canonical
            .replace(" USING BTREE", "")
            .replace(" ON ONLY ", " ON ");
        unquote_storage_parameters(out)
    }

    fn column_type_sql(&self, column: &Column) -> String {
        if column.auto_increment {
            match self.canonical_type(&column.column_type).as_str() {
                "SMALLINT" => return "SMALLSERIAL".to_string(),
                "INTEGER" => return "SERIAL".to_string(),
                "BIGINT" => return "BIGSERIAL".to_string(),
                _ => {}
            }
        }
        column.column_type.clone()
    }

    fn auto_increment_clause(&self) -> Option<&'static str> {
        None
    }

    fn create_table_suffix(&self, table: &Table) -> Result<String> {
        Ok(table.partitioning.as_ref().map_or_else(String::new, |p| {
            format!(" PARTITION BY {} ({})", p.strategy, p.expressions.join(", "))
        }))
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
                "ALTER TABLE {table} ALTER COLUMN {column} TYPE {ty} USING {column}::{ty}",
                ty = expected.column_type
            ));
        }
        if expected.nullable != actual.nullable {
            statements.push(format!(
                "ALTER TABLE {table} ALTER COLUMN {column} {} NOT NULL",
                if expected.nullable { "DROP" } else { "SET" }
            ));
        }
        Ok(statements)
    }

    fn create_index(&self, table: &TableIdentifier, index: &Index) -> Result<String> {
        validate_index(self, index)?;

        let mut sql = format!(
            "CREATE {}INDEX {} ON {}",
            if index.unique { "UNIQUE " } else { "" },
            self.quote_identifier(&index.name),
            self.qualify(table)
        );
        if index.method != IndexMethod::BTree {
            sql.push_str(&format!(" USING {}", index.method.as_sql().to_lowercase()));
        }
        sql.push(' ');
        sql.push_str(&index_key(self, index));
        if !index.include_columns.is_empty() {
            sql.push_str(&format!(" INCLUDE ({})", quote_list(self, &index.include_columns)));
        }
        if let Some(parameters) = storage_parameters(index) {
            sql.push(' ');
            sql.push_str(&parameters);
        }
        if let Some(ref predicate) = index.predicate {
            sql.push_str(&format!(" WHERE {predicate}"));
        }
        Ok(sql)
    }

    fn drop_primary_key(&self, table: &Table) -> Result<String> {
        Ok(format!(
            "ALTER TABLE {} DROP CONSTRAINT IF EXISTS {}",
            self.qualify(&table.identifier),
            self.quote_identifier(&table.primary_key_constraint_name())
        ))
    }

    fn create_schema(&self, schema: &str) -> Option<String> {
        (!schema.is_empty())
            .then(|| format!("CREATE SCHEMA IF NOT EXISTS {}", self.quote_identifier(schema)))
    }
}

/// Storage parameter values are reported quoted (`fillfactor='70'`).
/// Quotes are dropped inside the `WITH (...)` list only.
fn unquote_storage_parameters(mut canonical: String) -> String {
    let Some(m) = STORAGE_PARAMETERS.find(&canonical) else {
        return canonical;
    };
    let open = m.end() - 1;
    let mut depth = 0usize;
    let mut close = None;
    for (i, c) in canonical[open..].char_indices() {
        match c {
            '(' => depth += 1,
            ')' => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    close = Some(open + i);
                    break;
                }
            }
            _ => {}
        }
    }
    let Some(close) = close else {
        return canonical;
    };
    let parameters = canonical[open..=close].replace('\'', "").to_uppercase();
    canonical.replace_range(open..=close, &parameters);
    canonical
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ForeignKey, PartitionStrategy};

    fn dialect() -> PostgresDialect {
        PostgresDialect::new()
    }

    fn users() -> TableIdentifier {
        TableIdentifier::new("public", "users")
    }

    #[test]
    fn test_create_table() {
        let table = Table::new(users())
            .column(Column::new("id", "BIGINT").primary_key().auto_increment())
            .column(Column::new("email", "VARCHAR(255)").not_null())
            .column(Column::new("created_at", "TIMESTAMPTZ").not_null().default_value("now()"));

        assert_eq!(
            dialect().create_table(&table).unwrap(),
            "CREATE TABLE \"public\".\"users\" (\n  \
             \"id\" BIGSERIAL NOT NULL,\n  \
             \"email\" VARCHAR(255) NOT NULL,\n  \
             \"created_at\" TIMESTAMPTZ DEFAULT now() NOT NULL,\n  \
             PRIMARY KEY (\"id\")\n)"
        );
    }

    #[test]
    fn test_named_primary_key_and_partitioning() {
        let table = Table::new(TableIdentifier::new("public", "events"))
            .column(Column::new("id", "BIGINT").primary_key())
            .column(Column::new("at", "DATE").primary_key())
            .primary_key_name("events_pk")
            .partition_by(PartitionStrategy::Range, ["at"]);

        let sql = dialect().create_table(&table).unwrap();
        assert!(sql.contains("CONSTRAINT \"events_pk\" PRIMARY KEY (\"id\", \"at\")"));
        assert!(sql.ends_with(") PARTITION BY RANGE (at)"));
    }

    #[test]
    fn test_foreign_key_clause() {
        let fk = ForeignKey::new("fk_orders_user")
            .columns(["user_id"])
            .references(users(), ["id"])
            .on_delete(CascadeAction::Cascade);
        assert_eq!(
            dialect()
                .add_foreign_key(&TableIdentifier::new("public", "orders"), &fk)
                .unwrap(),
            "ALTER TABLE \"public\".\"orders\" ADD CONSTRAINT \"fk_orders_user\" FOREIGN KEY (\"user_id\") \
             REFERENCES \"public\".\"users\" (\"id\") ON DELETE CASCADE"
        );
    }

    #[test]
    fn test_alter_column() {
        let expected = Column::new("age", "BIGINT").not_null();
        let actual = Column::new("age", "integer");
        let sql = dialect().alter_column(&users(), &expected, &actual).unwrap();
        assert_eq!(
            sql,
            vec![
                "ALTER TABLE \"public\".\"users\" ALTER COLUMN \"age\" TYPE BIGINT USING \"age\"::BIGINT",
                "ALTER TABLE \"public\".\"users\" ALTER COLUMN \"age\" SET NOT NULL",
            ]
        );

        let widened = Column::new("age", "int4");
        let sql = dialect()
            .alter_column(&users(), &Column::new("age", "INTEGER"), &widened)
            .unwrap();
        assert!(sql.is_empty());
    }

    #[test]
    fn test_create_index_features() {
        let index = Index::new("idx_users_email", ["email"])
            .unique()
            .method(IndexMethod::Hash)
            .include(["name"])
            .with_parameter("fillfactor", "70")
            .predicate("deleted_at IS NULL");
        assert_eq!(
            dialect().create_index(&users(), &index).unwrap(),
            "CREATE UNIQUE INDEX \"idx_users_email\" ON \"public\".\"users\" USING hash (\"email\") \
             INCLUDE (\"name\") WITH (fillfactor = 70) WHERE deleted_at IS NULL"
        );
    }

    #[test]
    fn test_rejects_unsupported_method() {
        let index = Index::new("idx", ["doc"]).method(IndexMethod::FullText);
        assert!(dialect().create_index(&users(), &index).is_err());
    }

    #[test]
    fn test_type_synonyms() {
        let d = dialect();
        assert_eq!(d.canonical_type("int4"), d.canonical_type("INTEGER"));
        assert_eq!(d.canonical_type("character varying(20)"), "VARCHAR");
        assert_eq!(d.canonical_type("timestamp with time zone"), "TIMESTAMPTZ");
        assert_ne!(d.canonical_type("INTEGER"), d.canonical_type("BIGINT"));
    }

    #[test]
    fn test_noise_unquotes_storage_parameters_only() {
        let d = dialect();
        assert_eq!(
            d.canonicalize_noise(
                "CREATE INDEX I ON T(A)WITH(FILLFACTOR='70',DEDUPLICATE_ITEMS='off') WHERE S='x'"
                    .into()
            ),
            "CREATE INDEX I ON T(A)WITH(FILLFACTOR=70,DEDUPLICATE_ITEMS=OFF) WHERE S='x'"
        );
        assert_eq!(
            d.canonicalize_noise("CREATE INDEX I ON T(A) WHERE S='x'".into()),
            "CREATE INDEX I ON T(A) WHERE S='x'"
        );
    }

    #[test]
    fn test_cascade_codes() {
        let d = dialect();
        assert_eq!(d.parse_cascade_action("c").unwrap(), CascadeAction::Cascade);
        assert_eq!(d.parse_cascade_action("a").unwrap(), CascadeAction::NoAction);
        assert_eq!(d.parse_cascade_action("SET NULL").unwrap(), CascadeAction::SetNull);
        assert!(d.parse_cascade_action("x").is_err());
    }

    #[test]
    fn test_schema_and_primary_key_statements() {
        let d = dialect();
        assert_eq!(
            d.create_schema("sales").as_deref(),
            Some("CREATE SCHEMA IF NOT EXISTS \"sales\"")
        );
        let table = Table::new(users()).column(Column::new("id", "BIGINT").primary_key());
        assert_eq!(
            d.drop_primary_key(&table).unwrap(),
            "ALTER TABLE \"public\".\"users\" DROP CONSTRAINT IF EXISTS \"pkey_users_id\""
        );
    }
}
