//! MySQL dialect.

use super::{host_type_key, quote_list, validate_index, Dialect};
use crate::error::{Result, SchemaError};
use crate::model::{
    base_type, Column, ForeignKey, Index, IndexMethod, SortOrder, Table, TableIdentifier,
    TableOptions,
};

/// MySQL dialect for DDL generation.
#[derive(Debug, Clone, Copy, Default)]
pub struct MySqlDialect;

impl MySqlDialect {
    /// Creates a new MySQL dialect.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    fn options_sql(options: &TableOptions) -> String {
        let mut parts = Vec::new();
        if let Some(ref engine) = options.engine {
            parts.push(format!("ENGINE={engine}"));
        }
        if let Some(ref charset) = options.charset {
            parts.push(format!("DEFAULT CHARSET={charset}"));
        }
        if let Some(ref collation) = options.collation {
            parts.push(format!("COLLATE={collation}"));
        }
        parts.join(" ")
    }
}

impl Dialect for MySqlDialect {
    fn name(&self) -> &'static str {
        "mysql"
    }

    fn default_schema(&self) -> &'static str {
        ""
    }

    fn quote_identifier(&self, name: &str) -> String {
        format!("`{}`", name.replace('`', "``"))
    }

    fn map_host_type(&self, host_type: &str) -> Option<&'static str> {
        Some(match host_type_key(host_type).as_str() {
            "i8" => "TINYINT",
            "u8" => "TINYINT UNSIGNED",
            "i16" => "SMALLINT",
            "u16" => "SMALLINT UNSIGNED",
            "i32" => "INT",
            "u32" => "INT UNSIGNED",
            "i64" => "BIGINT",
            "u64" => "BIGINT UNSIGNED",
            "f32" => "FLOAT",
            "f64" => "DOUBLE",
            "bool" => "TINYINT(1)",
            "String" | "str" => "VARCHAR(255)",
            "char" => "CHAR(1)",
            "Vec<u8>" => "BLOB",
            "Uuid" => "CHAR(36)",
            "NaiveDate" => "DATE",
            "NaiveTime" => "TIME",
            "NaiveDateTime" => "DATETIME",
            "DateTime<Utc>" | "DateTime<FixedOffset>" | "DateTime<Local>" => "TIMESTAMP",
            "Decimal" => "DECIMAL(65, 30)",
            "Value" => "JSON",
            _ => return None,
        })
    }

    fn canonical_type(&self, column_type: &str) -> String {
        let base = base_type(column_type);
        let folded = match base.as_str() {
            "INTEGER" => "INT",
            "INTEGER UNSIGNED" => "INT UNSIGNED",
            "BOOL" | "BOOLEAN" => "TINYINT",
            "DEC" | "NUMERIC" | "FIXED" => "DECIMAL",
            "DOUBLE PRECISION" | "REAL" => "DOUBLE",
            "CHARACTER VARYING" => "VARCHAR",
            "CHARACTER" => "CHAR",
            _ => return base,
        };
        folded.to_string()
    }

    fn supports_index_method(&self, method: IndexMethod) -> bool {
        matches!(
            method,
            IndexMethod::BTree | IndexMethod::Hash | IndexMethod::FullText | IndexMethod::Spatial
        )
    }

    fn supports_table_options(&self) -> bool {
        true
    }

    fn names_primary_key(&self) -> bool {
        false
    }

    fn canonicalize_noise(&self, canonical: String) -> String {
        canonical.replace(" USING BTREE", "")
    }

    fn auto_increment_clause(&self) -> Option<&'static str> {
        Some("AUTO_INCREMENT")
    }

    fn primary_key_clause(&self, table: &Table) -> Option<String> {
        // MySQL always names the primary key PRIMARY.
        let columns = table.primary_key_columns();
        (!columns.is_empty()).then(|| format!("PRIMARY KEY ({})", quote_list(self, &columns)))
    }

    fn create_table_suffix(&self, table: &Table) -> Result<String> {
        if table.partitioning.is_some() {
            return Err(SchemaError::not_supported(self.name(), "table partitioning"));
        }
        if table.options.is_empty() {
            return Ok(String::new());
        }
        Ok(format!(" {}", Self::options_sql(&table.options)))
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
            "ALTER TABLE {} MODIFY COLUMN {}",
            self.qualify(table),
            self.column_definition(expected)
        )])
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

        let kind = match index.method {
            IndexMethod::FullText => "FULLTEXT ",
            IndexMethod::Spatial => "SPATIAL ",
            _ if index.unique => "UNIQUE ",
            _ => "",
        };
        let using = if index.method == IndexMethod::Hash {
            " USING HASH"
        } else {
            ""
        };
        // Functional key parts need their own parentheses.
        let key = match index.expression {
            Some(ref expression) => format!("(({expression}))"),
            None => {
                let suffix = match index.sort_order {
                    SortOrder::Asc => "",
                    SortOrder::Desc => " DESC",
                };
                let parts: Vec<String> = index
                    .columns
                    .iter()
                    .map(|c| format!("{}{suffix}", self.quote_identifier(c)))
                    .collect();
                format!("({})", parts.join(", "))
            }
        };

        Ok(format!(
            "CREATE {kind}INDEX {}{using} ON {} {key}",
            self.quote_identifier(&index.name),
            self.qualify(table)
        ))
    }

    fn drop_index(&self, table: &TableIdentifier, index: &Index) -> String {
        format!(
            "DROP INDEX {} ON {}",
            self.quote_identifier(&index.name),
            self.qualify(table)
        )
    }

    fn drop_foreign_key(
        &self,
        table: &TableIdentifier,
        foreign_key: &ForeignKey,
    ) -> Result<String> {
        Ok(format!(
            "ALTER TABLE {} DROP FOREIGN KEY {}",
            self.qualify(table),
            self.quote_identifier(&foreign_key.name)
        ))
    }

    fn add_primary_key(&self, table: &Table) -> Result<String> {
        let columns = table.primary_key_columns();
        if columns.is_empty() {
            return Err(SchemaError::configuration(
                format!("table {}", table.identifier),
                "no primary key columns",
            ));
        }
        Ok(format!(
            "ALTER TABLE {} ADD PRIMARY KEY ({})",
            self.qualify(&table.identifier),
            quote_list(self, &columns)
        ))
    }

    fn drop_primary_key(&self, table: &Table) -> Result<String> {
        Ok(format!(
            "ALTER TABLE {} DROP PRIMARY KEY",
            self.qualify(&table.identifier)
        ))
    }

    fn rename_table(&self, table: &TableIdentifier, new_name: &str) -> String {
        format!(
            "RENAME TABLE {} TO {}",
            self.qualify(table),
            self.qualify(&table.with_name(new_name))
        )
    }

    fn create_schema(&self, schema: &str) -> Option<String> {
        (!schema.is_empty())
            .then(|| format!("CREATE DATABASE IF NOT EXISTS {}", self.quote_identifier(schema)))
    }

    fn alter_table_options(
        &self,
        table: &TableIdentifier,
        options: &TableOptions,
    ) -> Result<Option<String>> {
        if options.is_empty() {
            return Ok(None);
        }
        Ok(Some(format!(
            "ALTER TABLE {} {}",
            self.qualify(table),
            Self::options_sql(options)
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::CascadeAction;

    fn dialect() -> MySqlDialect {
        MySqlDialect::new()
    }

    fn posts() -> TableIdentifier {
        TableIdentifier::new("", "posts")
    }

    #[test]
    fn test_create_table_with_options() {
        let table = Table::new(posts())
            .column(Column::new("id", "BIGINT").primary_key().auto_increment())
            .column(Column::new("title", "VARCHAR(200)").not_null())
            .primary_key_name("ignored")
            .engine("InnoDB")
            .charset("utf8mb4");

        assert_eq!(
            dialect().create_table(&table).unwrap(),
            "CREATE TABLE `posts` (\n  \
             `id` BIGINT AUTO_INCREMENT NOT NULL,\n  \
             `title` VARCHAR(200) NOT NULL,\n  \
             PRIMARY KEY (`id`)\n) ENGINE=InnoDB DEFAULT CHARSET=utf8mb4"
        );
    }

    #[test]
    fn test_modify_column() {
        let sql = dialect()
            .alter_column(
                &posts(),
                &Column::new("title", "TEXT").not_null(),
                &Column::new("title", "varchar(200)").not_null(),
            )
            .unwrap();
        assert_eq!(sql, vec!["ALTER TABLE `posts` MODIFY COLUMN `title` TEXT NOT NULL"]);
    }

    #[test]
    fn test_fulltext_and_functional_indexes() {
        let fulltext = Index::new("ft_posts_body", ["body"]).method(IndexMethod::FullText);
        assert_eq!(
            dialect().create_index(&posts(), &fulltext).unwrap(),
            "CREATE FULLTEXT INDEX `ft_posts_body` ON `posts` (`body`)"
        );

        let functional = Index::on_expression("idx_posts_lower", "lower(title)").unique();
        assert_eq!(
            dialect().create_index(&posts(), &functional).unwrap(),
            "CREATE UNIQUE INDEX `idx_posts_lower` ON `posts` ((lower(title)))"
        );

        let partial = Index::new("idx_p", ["title"]).predicate("id > 0");
        assert!(matches!(
            dialect().create_index(&posts(), &partial),
            Err(SchemaError::NotSupported { .. })
        ));
    }

    #[test]
    fn test_constraint_statements() {
        let fk = ForeignKey::new("fk_posts_author")
            .columns(["author_id"])
            .references(TableIdentifier::new("", "users"), ["id"])
            .on_delete(CascadeAction::SetNull);
        assert_eq!(
            dialect().drop_foreign_key(&posts(), &fk).unwrap(),
            "ALTER TABLE `posts` DROP FOREIGN KEY `fk_posts_author`"
        );
        let table = Table::new(posts()).column(Column::new("id", "BIGINT").primary_key());
        assert_eq!(
            dialect().drop_primary_key(&table).unwrap(),
            "ALTER TABLE `posts` DROP PRIMARY KEY"
        );
        assert_eq!(
            dialect().add_primary_key(&table).unwrap(),
            "ALTER TABLE `posts` ADD PRIMARY KEY (`id`)"
        );
    }

    #[test]
    fn test_rename_and_options() {
        let shadow = TableIdentifier::new("blog", "posts__rebuild");
        assert_eq!(
            dialect().rename_table(&shadow, "posts"),
            "RENAME TABLE `blog`.`posts__rebuild` TO `blog`.`posts`"
        );
        let options = TableOptions {
            engine: Some("InnoDB".into()),
            ..TableOptions::default()
        };
        assert_eq!(
            dialect().alter_table_options(&posts(), &options).unwrap().as_deref(),
            Some("ALTER TABLE `posts` ENGINE=InnoDB")
        );
    }
}
