//! Table definitions.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::column::Column;
use super::foreign_key::ForeignKey;
use super::identifier::TableIdentifier;
use super::index::Index;

/// Storage options that only MySQL expresses (`ENGINE=`, `DEFAULT CHARSET=`,
/// `COLLATE=`). Unset fields are not compared.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableOptions {
    /// Storage engine (`InnoDB`).
    #[serde(default)]
    pub engine: Option<String>,
    /// Default character set.
    #[serde(default)]
    pub charset: Option<String>,
    /// Default collation.
    #[serde(default)]
    pub collation: Option<String>,
}

impl TableOptions {
    /// Returns true when no option is set.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.engine.is_none() && self.charset.is_none() && self.collation.is_none()
    }

    /// Returns true if every option set here has the same value in `actual`.
    #[must_use]
    pub fn is_satisfied_by(&self, actual: &Self) -> bool {
        fn same(expected: Option<&String>, actual: Option<&String>) -> bool {
            expected.is_none_or(|e| actual.is_some_and(|a| a.eq_ignore_ascii_case(e)))
        }
        same(self.engine.as_ref(), actual.engine.as_ref())
            && same(self.charset.as_ref(), actual.charset.as_ref())
            && same(self.collation.as_ref(), actual.collation.as_ref())
    }
}

/// Partitioning strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PartitionStrategy {
    /// PARTITION BY RANGE.
    Range,
    /// PARTITION BY LIST.
    List,
    /// PARTITION BY HASH.
    Hash,
}

impl PartitionStrategy {
    /// Returns the SQL keyword.
    #[must_use]
    pub const fn as_sql(self) -> &'static str {
        match self {
            Self::Range => "RANGE",
            Self::List => "LIST",
            Self::Hash => "HASH",
        }
    }

    /// Parses a catalog strategy (`RANGE`, or PostgreSQL's `r`/`l`/`h`).
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_uppercase().as_str() {
            "RANGE" | "R" => Some(Self::Range),
            "LIST" | "L" => Some(Self::List),
            "HASH" | "H" => Some(Self::Hash),
            _ => None,
        }
    }
}

impl fmt::Display for PartitionStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_sql())
    }
}

/// Table partitioning: a strategy and the partition key expressions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Partitioning {
    /// Strategy.
    pub strategy: PartitionStrategy,
    /// Key expressions, in order.
    pub expressions: Vec<String>,
}

impl Partitioning {
    /// Creates a partitioning definition.
    #[must_use]
    pub fn new<S: Into<String>>(
        strategy: PartitionStrategy,
        expressions: impl IntoIterator<Item = S>,
    ) -> Self {
        Self {
            strategy,
            expressions: expressions.into_iter().map(Into::into).collect(),
        }
    }

    /// Same strategy and the same key expressions, ignoring case,
    /// whitespace and identifier quotes.
    #[must_use]
    pub fn is_equivalent_to(&self, other: &Self) -> bool {
        fn key(expression: &str) -> String {
            expression
                .chars()
                .filter(|c| !c.is_whitespace() && *c != '"')
                .collect::<String>()
                .to_uppercase()
        }
        self.strategy == other.strategy
            && self.expressions.len() == other.expressions.len()
            && self
                .expressions
                .iter()
                .zip(&other.expressions)
                .all(|(a, b)| key(a) == key(b))
    }
}

/// A table: identity, ordered columns, indexes, foreign keys and the
/// dialect-specific attributes compared alongside them.
///
/// ```rust
/// use oxide_schema::model::{Column, Index, Table, TableIdentifier};
///
/// let users = Table::new(TableIdentifier::new("public", "users"))
///     .column(Column::new("id", "BIGINT").primary_key())
///     .column(Column::new("email", "VARCHAR(255)").not_null())
///     .index(Index::new("idx_users_email", ["email"]).unique());
///
/// assert_eq!(users.primary_key_columns(), vec!["id"]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Table {
    /// Qualified name.
    pub identifier: TableIdentifier,
    /// Columns, in rendering order.
    pub columns: Vec<Column>,
    /// Indexes.
    #[serde(default)]
    pub indexes: Vec<Index>,
    /// Foreign keys.
    #[serde(default)]
    pub foreign_keys: Vec<ForeignKey>,
    /// Explicit primary key constraint name.
    #[serde(default)]
    pub primary_key_name: Option<String>,
    /// MySQL table options.
    #[serde(default)]
    pub options: TableOptions,
    /// Partitioning, if the table is partitioned.
    #[serde(default)]
    pub partitioning: Option<Partitioning>,
}

impl Table {
    /// Creates an empty table.
    #[must_use]
    pub fn new(identifier: TableIdentifier) -> Self {
        Self {
            identifier,
            columns: Vec::new(),
            indexes: Vec::new(),
            foreign_keys: Vec::new(),
            primary_key_name: None,
            options: TableOptions::default(),
            partitioning: None,
        }
    }

    /// Adds a column. A column with the same name (case-insensitive)
    /// is replaced in place.
    #[must_use]
    pub fn column(mut self, column: Column) -> Self {
        self.put_column(column);
        self
    }

    /// In-place variant of [`Table::column`].
    pub fn put_column(&mut self, column: Column) {
        match self
            .columns
            .iter_mut()
            .find(|c| c.name.eq_ignore_ascii_case(&column.name))
        {
            Some(existing) => *existing = column,
            None => self.columns.push(column),
        }
    }

    /// Adds an index.
    #[must_use]
    pub fn index(mut self, index: Index) -> Self {
        self.indexes.push(index);
        self
    }

    /// Adds a foreign key.
    #[must_use]
    pub fn foreign_key(mut self, foreign_key: ForeignKey) -> Self {
        self.foreign_keys.push(foreign_key);
        self
    }

    /// Names the primary key constraint.
    #[must_use]
    pub fn primary_key_name(mut self, name: impl Into<String>) -> Self {
        self.primary_key_name = Some(name.into());
        self
    }

    /// Sets the MySQL storage engine.
    #[must_use]
    pub fn engine(mut self, engine: impl Into<String>) -> Self {
        self.options.engine = Some(engine.into());
        self
    }

    /// Sets the MySQL default character set.
    #[must_use]
    pub fn charset(mut self, charset: impl Into<String>) -> Self {
        self.options.charset = Some(charset.into());
        self
    }

    /// Sets the MySQL default collation.
    #[must_use]
    pub fn collation(mut self, collation: impl Into<String>) -> Self {
        self.options.collation = Some(collation.into());
        self
    }

    /// Partitions the table.
    #[must_use]
    pub fn partition_by<S: Into<String>>(
        mut self,
        strategy: PartitionStrategy,
        expressions: impl IntoIterator<Item = S>,
    ) -> Self {
        self.partitioning = Some(Partitioning::new(strategy, expressions));
        self
    }

    /// Looks up a column by name (case-insensitive).
    #[must_use]
    pub fn find_column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name.eq_ignore_ascii_case(name))
    }

    /// Primary key columns in column order.
    #[must_use]
    pub fn primary_key_columns(&self) -> Vec<&str> {
        self.columns
            .iter()
            .filter(|c| c.primary_key)
            .map(|c| c.name.as_str())
            .collect()
    }

    /// Returns true if any column belongs to the primary key.
    #[must_use]
    pub fn has_primary_key(&self) -> bool {
        self.columns.iter().any(|c| c.primary_key)
    }

    /// The explicit constraint name, or `pkey_<table>_<col>_<col>`.
    #[must_use]
    pub fn primary_key_constraint_name(&self) -> String {
        self.primary_key_name.clone().unwrap_or_else(|| {
            format!(
                "pkey_{}_{}",
                self.identifier.name,
                self.primary_key_columns().join("_")
            )
            .to_lowercase()
        })
    }

    /// Returns a copy of this table under another name. Used for the
    /// shadow table of a rebuild.
    #[must_use]
    pub fn renamed(&self, name: impl Into<String>) -> Self {
        let mut table = self.clone();
        table.identifier = self.identifier.with_name(name);
        table
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn users() -> Table {
        Table::new(TableIdentifier::new("public", "users"))
            .column(Column::new("tenant", "INTEGER").primary_key())
            .column(Column::new("id", "BIGINT").primary_key())
            .column(Column::new("name", "TEXT"))
    }

    #[test]
    fn adding_same_name_replaces_in_place() {
        let table = users().column(Column::new("NAME", "VARCHAR(50)").not_null());
        assert_eq!(table.columns.len(), 3);
        assert_eq!(table.columns[2].column_type, "VARCHAR(50)");
        assert!(!table.columns[2].nullable);
    }

    #[test]
    fn primary_key_follows_column_order() {
        let table = users();
        assert_eq!(table.primary_key_columns(), vec!["tenant", "id"]);
        assert_eq!(table.primary_key_constraint_name(), "pkey_users_tenant_id");
        assert_eq!(
            table.primary_key_name("users_pk").primary_key_constraint_name(),
            "users_pk"
        );
    }

    #[test]
    fn options_only_compare_set_fields() {
        let desired = TableOptions {
            engine: Some("InnoDB".into()),
            ..TableOptions::default()
        };
        let actual = TableOptions {
            engine: Some("INNODB".into()),
            charset: Some("utf8mb4".into()),
            collation: None,
        };
        assert!(desired.is_satisfied_by(&actual));
        assert!(TableOptions::default().is_satisfied_by(&actual));
        assert!(!actual.is_satisfied_by(&desired));
    }

    #[test]
    fn partitioning_equivalence() {
        let a = Partitioning::new(PartitionStrategy::Range, ["\"created_at\""]);
        let b = Partitioning::new(PartitionStrategy::Range, ["CREATED_AT"]);
        let c = Partitioning::new(PartitionStrategy::List, ["created_at"]);
        assert!(a.is_equivalent_to(&b));
        assert!(!a.is_equivalent_to(&c));
        assert_eq!(PartitionStrategy::parse("r"), Some(PartitionStrategy::Range));
    }
}
