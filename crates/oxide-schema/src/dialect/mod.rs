//! Database dialects.
//!
//! A dialect decides what the engine may do against a database and how
//! each change is written as DDL. The [`Dialect`] trait carries a default
//! rendering for every statement; each database overrides the parts where
//! its syntax or capabilities differ.

mod mysql;
mod oracle;
mod postgres;
mod sqlite;
mod sqlserver;

pub use mysql::MySqlDialect;
pub use oracle::OracleDialect;
pub use postgres::PostgresDialect;
pub use sqlite::SqliteDialect;
pub use sqlserver::SqlServerDialect;

use std::sync::LazyLock;

use regex::Regex;

use crate::error::{Result, SchemaError};
use crate::model::{
    base_type, CascadeAction, CascadeEvent, Column, ForeignKey, Index, IndexMethod, SortOrder,
    Table, TableIdentifier, TableOptions,
};

/// Suffix appended to a table name for the shadow copy built by a rebuild.
pub const REBUILD_SUFFIX: &str = "__rebuild";

/// Database-specific policy and DDL generation.
pub trait Dialect: Send + Sync {
    /// Returns the dialect name.
    fn name(&self) -> &'static str;

    /// Schema assumed for unqualified names. Empty means the connection's
    /// current schema.
    fn default_schema(&self) -> &'static str;

    /// Quotes an identifier.
    fn quote_identifier(&self, name: &str) -> String {
        format!("\"{}\"", name.replace('"', "\"\""))
    }

    /// Renders a schema-qualified table name.
    fn qualify(&self, table: &TableIdentifier) -> String {
        if table.schema.is_empty() {
            self.quote_identifier(&table.name)
        } else {
            format!(
                "{}.{}",
                self.quote_identifier(&table.schema),
                self.quote_identifier(&table.name)
            )
        }
    }

    /// Renders the target of a `REFERENCES` clause.
    fn reference_name(&self, table: &TableIdentifier) -> String {
        self.qualify(table)
    }

    /// Maps a Rust host type (`i64`, `String`, `Uuid`, ...) to a column type.
    /// `Option<_>` must already be stripped.
    fn map_host_type(&self, host_type: &str) -> Option<&'static str>;

    /// Base type with synonyms folded (`int4` and `integer` both become
    /// `INTEGER` on PostgreSQL).
    fn canonical_type(&self, column_type: &str) -> String {
        base_type(column_type)
    }

    /// Column equivalence with synonym folding applied.
    fn columns_equivalent(&self, expected: &Column, actual: &Column) -> bool {
        self.canonical_type(&expected.column_type) == self.canonical_type(&actual.column_type)
            && expected.nullable == actual.nullable
            && expected.primary_key == actual.primary_key
    }

    /// Whether column types and nullability can be altered in place.
    fn supports_alter_column(&self) -> bool {
        true
    }

    /// Whether constraints can be added or dropped on an existing table.
    fn supports_alter_constraints(&self) -> bool {
        true
    }

    /// Whether the referential action is accepted for the event.
    fn supports_cascade(&self, _action: CascadeAction, _event: CascadeEvent) -> bool {
        true
    }

    /// Whether the index access method is available.
    fn supports_index_method(&self, method: IndexMethod) -> bool {
        method == IndexMethod::BTree
    }

    /// Whether primary key constraints carry a user-chosen name.
    fn names_primary_key(&self) -> bool {
        true
    }

    /// Whether `PARTITION BY` can be rendered.
    fn supports_partitioning(&self) -> bool {
        false
    }

    /// Whether [`TableOptions`] are rendered and compared.
    fn supports_table_options(&self) -> bool {
        false
    }

    /// Whether the column can be added to a populated table with ALTER.
    fn can_add_column(&self, column: &Column) -> bool {
        column.nullable
            || column.default.is_some()
            || column.auto_increment
            || column.generated.is_some()
    }

    /// Whether `actual` can be altered into `expected` in place.
    fn can_alter_column(&self, _expected: &Column, _actual: &Column) -> bool {
        self.supports_alter_column()
    }

    /// Whether the column can be dropped from `table` with ALTER.
    fn can_drop_column(&self, _column: &Column, _table: &Table) -> bool {
        true
    }

    /// Parses a catalog cascade description.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::UnknownCascadeAction`] for unrecognized values.
    fn parse_cascade_action(&self, value: &str) -> Result<CascadeAction> {
        CascadeAction::parse(value)
    }

    /// Removes dialect noise from an already canonicalized DDL string.
    fn canonicalize_noise(&self, canonical: String) -> String {
        canonical
    }

    /// Type rendered for the column.
    fn column_type_sql(&self, column: &Column) -> String {
        column.column_type.clone()
    }

    /// Keyword making a column auto-increment, if the dialect uses one.
    fn auto_increment_clause(&self) -> Option<&'static str>;

    /// Generated column clause.
    fn generated_clause(&self, expression: &str) -> String {
        format!("GENERATED ALWAYS AS ({expression}) STORED")
    }

    /// Generates a column definition.
    fn column_definition(&self, column: &Column) -> String {
        let mut parts = vec![
            self.quote_identifier(&column.name),
            self.column_type_sql(column),
        ];

        if let Some(ref collation) = column.collation {
            parts.push(format!("COLLATE {collation}"));
        }

        if let Some(ref expression) = column.generated {
            parts.push(self.generated_clause(expression));
        } else if let Some(ref default) = column.default {
            parts.push(format!("DEFAULT {default}"));
        }

        if column.auto_increment {
            if let Some(keyword) = self.auto_increment_clause() {
                parts.push(keyword.to_string());
            }
        }

        if !column.nullable {
            parts.push("NOT NULL".to_string());
        }

        parts.join(" ")
    }

    /// Column definition inside CREATE TABLE, where the dialect may need
    /// the rest of the table.
    fn table_column_definition(&self, _table: &Table, column: &Column) -> String {
        self.column_definition(column)
    }

    /// Table-level primary key clause.
    fn primary_key_clause(&self, table: &Table) -> Option<String> {
        let columns = table.primary_key_columns();
        if columns.is_empty() {
            return None;
        }
        let list = quote_list(self, &columns);
        Some(match table.primary_key_name {
            Some(ref name) => format!(
                "CONSTRAINT {} PRIMARY KEY ({list})",
                self.quote_identifier(name)
            ),
            None => format!("PRIMARY KEY ({list})"),
        })
    }

    /// `CONSTRAINT .. FOREIGN KEY .. REFERENCES ..` clause.
    ///
    /// # Errors
    ///
    /// Returns a configuration error when the referenced table is unset,
    /// the column lists are empty or of different lengths, or a cascade
    /// action is not supported by the dialect.
    fn foreign_key_clause(&self, foreign_key: &ForeignKey) -> Result<String> {
        let object = format!("foreign key {}", foreign_key.name);
        let linked = foreign_key
            .linked_table
            .as_ref()
            .ok_or_else(|| SchemaError::configuration(&object, "no referenced table set"))?;

        if foreign_key.columns.is_empty()
            || foreign_key.columns.len() != foreign_key.linked_columns.len()
        {
            return Err(SchemaError::configuration(
                &object,
                "source and referenced column lists must be non-empty and of equal length",
            ));
        }

        for (action, event) in [
            (foreign_key.on_delete, CascadeEvent::Delete),
            (foreign_key.on_update, CascadeEvent::Update),
        ] {
            if !self.supports_cascade(action, event) {
                return Err(SchemaError::configuration(
                    &object,
                    format!("{} {action} is not supported by {}", event_sql(event), self.name()),
                ));
            }
        }

        let mut sql = format!(
            "CONSTRAINT {} FOREIGN KEY ({}) REFERENCES {} ({})",
            self.quote_identifier(&foreign_key.name),
            quote_list(self, &foreign_key.columns),
            self.reference_name(linked),
            quote_list(self, &foreign_key.linked_columns),
        );
        if foreign_key.on_delete != CascadeAction::NoAction {
            sql.push_str(&format!(" ON DELETE {}", foreign_key.on_delete));
        }
        if foreign_key.on_update != CascadeAction::NoAction {
            sql.push_str(&format!(" ON UPDATE {}", foreign_key.on_update));
        }
        Ok(sql)
    }

    /// Text appended after the closing parenthesis of CREATE TABLE.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::NotSupported`] for a partitioned table.
    fn create_table_suffix(&self, table: &Table) -> Result<String> {
        if table.partitioning.is_some() {
            return Err(SchemaError::not_supported(self.name(), "table partitioning"));
        }
        Ok(String::new())
    }

    /// Generates CREATE TABLE with columns, primary key and foreign keys.
    ///
    /// # Errors
    ///
    /// Returns an error for a table without columns or any constraint that
    /// cannot be rendered.
    fn create_table(&self, table: &Table) -> Result<String> {
        if table.columns.is_empty() {
            return Err(SchemaError::configuration(
                format!("table {}", table.identifier),
                "a table needs at least one column",
            ));
        }

        let mut lines: Vec<String> = table
            .columns
            .iter()
            .map(|c| self.table_column_definition(table, c))
            .collect();

        if let Some(pk) = self.primary_key_clause(table) {
            lines.push(pk);
        }

        for foreign_key in &table.foreign_keys {
            lines.push(self.foreign_key_clause(foreign_key)?);
        }

        Ok(format!(
            "CREATE TABLE {} (\n  {}\n){}",
            self.qualify(&table.identifier),
            lines.join(",\n  "),
            self.create_table_suffix(table)?
        ))
    }

    /// Generates DROP TABLE.
    fn drop_table(&self, table: &TableIdentifier) -> String {
        format!("DROP TABLE {}", self.qualify(table))
    }

    /// Generates ADD COLUMN.
    fn add_column(&self, table: &TableIdentifier, column: &Column) -> String {
        format!(
            "ALTER TABLE {} ADD COLUMN {}",
            self.qualify(table),
            self.column_definition(column)
        )
    }

    /// Generates the statements altering `actual` into `expected`.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::NotSupported`] on dialects that cannot alter
    /// columns.
    fn alter_column(
        &self,
        _table: &TableIdentifier,
        expected: &Column,
        _actual: &Column,
    ) -> Result<Vec<String>> {
        Err(SchemaError::not_supported(
            self.name(),
            format!("altering column {}", expected.name),
        ))
    }

    /// Generates DROP COLUMN.
    fn drop_column(&self, table: &TableIdentifier, column: &Column) -> String {
        format!(
            "ALTER TABLE {} DROP COLUMN {}",
            self.qualify(table),
            self.quote_identifier(&column.name)
        )
    }

    /// DDL denoting the index: the catalog definition when there is one,
    /// the rendered CREATE INDEX otherwise.
    ///
    /// # Errors
    ///
    /// See [`Dialect::create_index`].
    fn index_ddl(&self, table: &TableIdentifier, index: &Index) -> Result<String> {
        match index.definition {
            Some(ref definition) => Ok(definition.clone()),
            None => self.create_index(table, index),
        }
    }

    /// Generates CREATE INDEX.
    ///
    /// # Errors
    ///
    /// Returns a configuration error for an index without columns or
    /// expression or with an unsupported method, and
    /// [`SchemaError::NotSupported`] for features the dialect lacks.
    fn create_index(&self, table: &TableIdentifier, index: &Index) -> Result<String> {
        validate_index(self, index)?;
        if !index.include_columns.is_empty() {
            return Err(SchemaError::not_supported(self.name(), "index include columns"));
        }
        if !index.storage_parameters.is_empty() {
            return Err(SchemaError::not_supported(self.name(), "index storage parameters"));
        }

        let mut sql = format!(
            "CREATE {}INDEX {} ON {} {}",
            if index.unique { "UNIQUE " } else { "" },
            self.quote_identifier(&index.name),
            self.qualify(table),
            index_key(self, index)
        );
        if let Some(ref predicate) = index.predicate {
            sql.push_str(&format!(" WHERE {predicate}"));
        }
        Ok(sql)
    }

    /// Generates DROP INDEX.
    fn drop_index(&self, table: &TableIdentifier, index: &Index) -> String {
        format!("DROP INDEX {}", self.qualify(&table.with_name(&index.name)))
    }

    /// Generates ADD CONSTRAINT .. FOREIGN KEY.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::NotSupported`] when constraints cannot be
    /// altered, or any error of [`Dialect::foreign_key_clause`].
    fn add_foreign_key(&self, table: &TableIdentifier, foreign_key: &ForeignKey) -> Result<String> {
        if !self.supports_alter_constraints() {
            return Err(SchemaError::not_supported(self.name(), "adding a foreign key"));
        }
        Ok(format!(
            "ALTER TABLE {} ADD {}",
            self.qualify(table),
            self.foreign_key_clause(foreign_key)?
        ))
    }

    /// Generates DROP CONSTRAINT for a foreign key.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::NotSupported`] when constraints cannot be
    /// altered.
    fn drop_foreign_key(
        &self,
        table: &TableIdentifier,
        foreign_key: &ForeignKey,
    ) -> Result<String> {
        if !self.supports_alter_constraints() {
            return Err(SchemaError::not_supported(self.name(), "dropping a foreign key"));
        }
        Ok(format!(
            "ALTER TABLE {} DROP CONSTRAINT {}",
            self.qualify(table),
            self.quote_identifier(&foreign_key.name)
        ))
    }

    /// Generates ADD CONSTRAINT .. PRIMARY KEY for the table's key columns.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::NotSupported`] when constraints cannot be
    /// altered, or a configuration error when no column is a key column.
    fn add_primary_key(&self, table: &Table) -> Result<String> {
        if !self.supports_alter_constraints() {
            return Err(SchemaError::not_supported(self.name(), "adding a primary key"));
        }
        let columns = table.primary_key_columns();
        if columns.is_empty() {
            return Err(SchemaError::configuration(
                format!("table {}", table.identifier),
                "no primary key columns",
            ));
        }
        Ok(format!(
            "ALTER TABLE {} ADD CONSTRAINT {} PRIMARY KEY ({})",
            self.qualify(&table.identifier),
            self.quote_identifier(&table.primary_key_constraint_name()),
            quote_list(self, &columns)
        ))
    }

    /// Generates DROP CONSTRAINT for the table's primary key.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::NotSupported`] when constraints cannot be
    /// altered.
    fn drop_primary_key(&self, table: &Table) -> Result<String> {
        if !self.supports_alter_constraints() {
            return Err(SchemaError::not_supported(self.name(), "dropping a primary key"));
        }
        Ok(format!(
            "ALTER TABLE {} DROP CONSTRAINT {}",
            self.qualify(&table.identifier),
            self.quote_identifier(&table.primary_key_constraint_name())
        ))
    }

    /// Generates a rename of `table` to `new_name` in the same schema.
    fn rename_table(&self, table: &TableIdentifier, new_name: &str) -> String {
        format!(
            "ALTER TABLE {} RENAME TO {}",
            self.qualify(table),
            self.quote_identifier(new_name)
        )
    }

    /// Generates the statements rebuilding `actual` into `expected`:
    /// create a shadow table with the expected shape, copy the common
    /// columns, drop the original, rename the shadow into place, then
    /// recreate indexes (and foreign keys, where they can be added later).
    ///
    /// # Errors
    ///
    /// Propagates any rendering error of the statements above.
    fn rebuild_table(&self, expected: &Table, actual: &Table) -> Result<Vec<String>> {
        let mut shadow = expected.renamed(format!("{}{REBUILD_SUFFIX}", expected.identifier.name));
        // Constraint names are unique per schema where constraints can be
        // altered: the shadow key gets its own name until the rename.
        let restore_key = self.supports_alter_constraints()
            && self.names_primary_key()
            && expected.primary_key_name.is_some()
            && !expected.primary_key_columns().is_empty();
        if restore_key {
            shadow.primary_key_name = None;
            let shadow_key = shadow.primary_key_constraint_name();
            shadow.primary_key_name = Some(shadow_key);
        }
        shadow.indexes.clear();
        if self.supports_alter_constraints() {
            shadow.foreign_keys.clear();
        }

        let mut statements = vec![self.create_table(&shadow)?];

        let common: Vec<&str> = expected
            .columns
            .iter()
            .filter(|c| c.generated.is_none())
            .filter(|c| {
                actual
                    .find_column(&c.name)
                    .is_some_and(|a| a.generated.is_none())
            })
            .map(|c| c.name.as_str())
            .collect();
        if !common.is_empty() {
            let list = quote_list(self, &common);
            statements.push(format!(
                "INSERT INTO {} ({list}) SELECT {list} FROM {}",
                self.qualify(&shadow.identifier),
                self.qualify(&actual.identifier)
            ));
        }

        statements.push(self.drop_table(&actual.identifier));
        statements.push(self.rename_table(&shadow.identifier, &expected.identifier.name));
        if restore_key {
            let placed = shadow.renamed(expected.identifier.name.clone());
            statements.push(self.drop_primary_key(&placed)?);
            statements.push(self.add_primary_key(expected)?);
        }

        for index in &expected.indexes {
            statements.push(self.index_ddl(&expected.identifier, index)?);
        }
        if self.supports_alter_constraints() {
            for foreign_key in &expected.foreign_keys {
                statements.push(self.add_foreign_key(&expected.identifier, foreign_key)?);
            }
        }
        Ok(statements)
    }

    /// Statement creating the schema if it does not exist, for dialects
    /// where schemas are created independently of users.
    fn create_schema(&self, _schema: &str) -> Option<String> {
        None
    }

    /// Statement changing table options.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::NotSupported`] on dialects without options.
    fn alter_table_options(
        &self,
        _table: &TableIdentifier,
        options: &TableOptions,
    ) -> Result<Option<String>> {
        if options.is_empty() {
            return Ok(None);
        }
        Err(SchemaError::not_supported(self.name(), "table options"))
    }
}

/// Quotes and comma-joins identifiers.
pub(crate) fn quote_list<D, S>(dialect: &D, names: &[S]) -> String
where
    D: Dialect + ?Sized,
    S: AsRef<str>,
{
    names
        .iter()
        .map(|n| dialect.quote_identifier(n.as_ref()))
        .collect::<Vec<_>>()
        .join(", ")
}

/// The parenthesized key of an index: `("a" DESC, "b" DESC)` or `(expr)`.
pub(crate) fn index_key<D: Dialect + ?Sized>(dialect: &D, index: &Index) -> String {
    if let Some(ref expression) = index.expression {
        return format!("({expression})");
    }
    let suffix = match index.sort_order {
        SortOrder::Asc => "",
        SortOrder::Desc => " DESC",
    };
    let columns: Vec<String> = index
        .columns
        .iter()
        .map(|c| format!("{}{suffix}", dialect.quote_identifier(c)))
        .collect();
    format!("({})", columns.join(", "))
}

/// Checks the parts of an index every dialect requires.
pub(crate) fn validate_index<D: Dialect + ?Sized>(dialect: &D, index: &Index) -> Result<()> {
    let object = format!("index {}", index.name);
    if index.columns.is_empty() && index.expression.is_none() {
        return Err(SchemaError::configuration(
            object,
            "an index needs columns or an expression",
        ));
    }
    if !dialect.supports_index_method(index.method) {
        return Err(SchemaError::configuration(
            object,
            format!("index method {} is not supported by {}", index.method, dialect.name()),
        ));
    }
    Ok(())
}

/// `WITH (key = value, ...)` storage parameter list.
pub(crate) fn storage_parameters(index: &Index) -> Option<String> {
    if index.storage_parameters.is_empty() {
        return None;
    }
    let parameters: Vec<String> = index
        .storage_parameters
        .iter()
        .map(|(k, v)| format!("{k} = {v}"))
        .collect();
    Some(format!("WITH ({})", parameters.join(", ")))
}

const fn event_sql(event: CascadeEvent) -> &'static str {
    match event {
        CascadeEvent::Delete => "ON DELETE",
        CascadeEvent::Update => "ON UPDATE",
    }
}

static PATH_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b[A-Za-z_][A-Za-z0-9_]*::").expect("path prefix regex"));

/// Normalizes a host type for lookup: whitespace, references, lifetimes
/// and module paths are removed (`&'static str` -> `str`,
/// `chrono::DateTime<chrono::Utc>` -> `DateTime<Utc>`).
pub(crate) fn host_type_key(host_type: &str) -> String {
    let compact: String = host_type
        .replace("'static", "")
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '&')
        .collect();
    PATH_PREFIX.replace_all(&compact, "").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn host_type_key_strips_paths_and_references() {
        assert_eq!(host_type_key("&'static str"), "str");
        assert_eq!(host_type_key("chrono::DateTime<chrono::Utc>"), "DateTime<Utc>");
        assert_eq!(host_type_key("Vec< u8 >"), "Vec<u8>");
        assert_eq!(host_type_key("uuid::Uuid"), "Uuid");
    }

    #[test]
    fn index_key_renders_sort_order_and_expressions() {
        let dialect = PostgresDialect::new();
        let index = Index::new("idx", ["a", "b"]).descending();
        assert_eq!(index_key(&dialect, &index), "(\"a\" DESC, \"b\" DESC)");
        let index = Index::on_expression("idx", "lower(email)");
        assert_eq!(index_key(&dialect, &index), "(lower(email))");
    }

    #[test]
    fn foreign_key_without_target_is_a_configuration_error() {
        let dialect = PostgresDialect::new();
        let fk = ForeignKey::new("fk_orders_user").columns(["user_id"]);
        let err = dialect.foreign_key_clause(&fk).unwrap_err();
        assert!(matches!(err, SchemaError::Configuration { .. }));
    }

    #[test]
    fn index_without_columns_is_a_configuration_error() {
        let dialect = SqliteDialect::new();
        let index = Index::new("idx_empty", Vec::<String>::new());
        let err = dialect
            .create_index(&TableIdentifier::new("main", "t"), &index)
            .unwrap_err();
        assert!(matches!(err, SchemaError::Configuration { .. }));
    }

    #[test]
    fn rebuild_copies_common_columns_through_shadow() {
        let dialect = SqliteDialect::new();
        let actual = Table::new(TableIdentifier::new("main", "items"))
            .column(Column::new("id", "INTEGER").primary_key())
            .column(Column::new("qty", "INTEGER"))
            .column(Column::new("legacy", "TEXT"));
        let expected = Table::new(TableIdentifier::new("main", "items"))
            .column(Column::new("id", "INTEGER").primary_key())
            .column(Column::new("qty", "TEXT"))
            .column(Column::new("note", "TEXT"))
            .index(Index::new("idx_items_qty", ["qty"]));

        let statements = dialect.rebuild_table(&expected, &actual).unwrap();
        assert_eq!(statements.len(), 5);
        assert!(statements[0].starts_with("CREATE TABLE \"items__rebuild\" ("));
        assert_eq!(
            statements[1],
            "INSERT INTO \"items__rebuild\" (\"id\", \"qty\") SELECT \"id\", \"qty\" FROM \"items\""
        );
        assert_eq!(statements[2], "DROP TABLE \"items\"");
        assert_eq!(statements[3], "ALTER TABLE \"items__rebuild\" RENAME TO \"items\"");
        assert_eq!(
            statements[4],
            "CREATE INDEX \"idx_items_qty\" ON \"items\" (\"qty\")"
        );
    }

    #[test]
    fn rebuild_restores_explicit_primary_key_name() {
        let dialect = PostgresDialect::new();
        let actual = Table::new(TableIdentifier::new("public", "items"))
            .column(Column::new("id", "BIGINT").primary_key())
            .column(Column::new("qty", "INTEGER"));
        let expected = actual.clone().primary_key_name("items_pk");

        let statements = dialect.rebuild_table(&expected, &actual).unwrap();
        assert!(statements[0]
            .contains("CONSTRAINT \"pkey_items__rebuild_id\" PRIMARY KEY (\"id\")"));
        assert_eq!(
            &statements[4..],
            [
                "ALTER TABLE \"public\".\"items\" DROP CONSTRAINT IF EXISTS \"pkey_items__rebuild_id\"",
                "ALTER TABLE \"public\".\"items\" ADD CONSTRAINT \"items_pk\" PRIMARY KEY (\"id\")",
            ]
        );

        let sqlite = SqliteDialect::new();
        let statements = sqlite.rebuild_table(&expected, &actual).unwrap();
        assert!(statements[0].contains("CONSTRAINT \"items_pk\" PRIMARY KEY (\"id\")"));
        assert_eq!(statements.len(), 4);
    }
}
