//! Index definitions.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Index access method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum IndexMethod {
    /// B-tree (the default on every dialect).
    #[default]
    BTree,
    /// Hash index.
    Hash,
    /// GiST (PostgreSQL).
    Gist,
    /// GIN (PostgreSQL).
    Gin,
    /// BRIN (PostgreSQL).
    Brin,
    /// Full-text index (MySQL).
    FullText,
    /// Spatial index (MySQL).
    Spatial,
    /// Bitmap index (Oracle).
    Bitmap,
}

impl IndexMethod {
    /// Returns the SQL keyword for this method.
    #[must_use]
    pub const fn as_sql(self) -> &'static str {
        match self {
            Self::BTree => "BTREE",
            Self::Hash => "HASH",
            Self::Gist => "GIST",
            Self::Gin => "GIN",
            Self::Brin => "BRIN",
            Self::FullText => "FULLTEXT",
            Self::Spatial => "SPATIAL",
            Self::Bitmap => "BITMAP",
        }
    }

    /// Parses a catalog method name (`btree`, `FULLTEXT`, ...).
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_uppercase().as_str() {
            "BTREE" | "B-TREE" | "NORMAL" => Some(Self::BTree),
            "HASH" => Some(Self::Hash),
            "GIST" => Some(Self::Gist),
            "GIN" => Some(Self::Gin),
            "BRIN" => Some(Self::Brin),
            "FULLTEXT" => Some(Self::FullText),
            "SPATIAL" => Some(Self::Spatial),
            "BITMAP" => Some(Self::Bitmap),
            _ => None,
        }
    }
}

impl fmt::Display for IndexMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_sql())
    }
}

/// Sort direction applied to the indexed columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SortOrder {
    /// Ascending (default, not rendered).
    #[default]
    Asc,
    /// Descending.
    Desc,
}

/// An index on a table.
///
/// Indexes are compared through their canonical DDL text rather than
/// field by field, because several catalogs only report the index as DDL.
/// When read from such a catalog, [`Index::definition`] carries that text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Index {
    /// Index name.
    pub name: String,
    /// Indexed columns, in order.
    #[serde(default)]
    pub columns: Vec<String>,
    /// Raw expression for expression indexes (replaces `columns`).
    #[serde(default)]
    pub expression: Option<String>,
    /// Access method.
    #[serde(default)]
    pub method: IndexMethod,
    /// Whether this is a UNIQUE index.
    #[serde(default)]
    pub unique: bool,
    /// Sort direction.
    #[serde(default)]
    pub sort_order: SortOrder,
    /// Partial index predicate (WHERE clause body).
    #[serde(default)]
    pub predicate: Option<String>,
    /// Non-key columns stored in the index.
    #[serde(default)]
    pub include_columns: Vec<String>,
    /// Storage parameters (`fillfactor = 70`).
    #[serde(default)]
    pub storage_parameters: Vec<(String, String)>,
    /// DDL text as reported by the catalog, if any.
    #[serde(default)]
    pub definition: Option<String>,
}

impl Index {
    /// Creates an index over the given columns.
    #[must_use]
    pub fn new<S: Into<String>>(
        name: impl Into<String>,
        columns: impl IntoIterator<Item = S>,
    ) -> Self {
        Self {
            name: name.into(),
            columns: columns.into_iter().map(Into::into).collect(),
            expression: None,
            method: IndexMethod::BTree,
            unique: false,
            sort_order: SortOrder::Asc,
            predicate: None,
            include_columns: Vec::new(),
            storage_parameters: Vec::new(),
            definition: None,
        }
    }

    /// Creates an expression index.
    #[must_use]
    pub fn on_expression(name: impl Into<String>, expression: impl Into<String>) -> Self {
        let mut index = Self::new(name, Vec::<String>::new());
        index.expression = Some(expression.into());
        index
    }

    /// Creates an index known only by the DDL text a catalog reported.
    #[must_use]
    pub fn from_definition(name: impl Into<String>, definition: impl Into<String>) -> Self {
        let mut index = Self::new(name, Vec::<String>::new());
        index.definition = Some(definition.into());
        index
    }

    /// Makes the index UNIQUE.
    #[must_use]
    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    /// Sets the access method.
    #[must_use]
    pub fn method(mut self, method: IndexMethod) -> Self {
        self.method = method;
        self
    }

    /// Sorts the indexed columns descending.
    #[must_use]
    pub fn descending(mut self) -> Self {
        self.sort_order = SortOrder::Desc;
        self
    }

    /// Makes this a partial index.
    #[must_use]
    pub fn predicate(mut self, predicate: impl Into<String>) -> Self {
        self.predicate = Some(predicate.into());
        self
    }

    /// Adds non-key include columns.
    #[must_use]
    pub fn include<S: Into<String>>(mut self, columns: impl IntoIterator<Item = S>) -> Self {
        self.include_columns.extend(columns.into_iter().map(Into::into));
        self
    }

    /// Adds a storage parameter.
    #[must_use]
    pub fn with_parameter(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.storage_parameters.push((key.into(), value.into()));
        self
    }

    /// Returns true if the index covers the given column.
    #[must_use]
    pub fn covers(&self, column: &str) -> bool {
        self.columns.iter().any(|c| c.eq_ignore_ascii_case(column))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_sets_fields() {
        let idx = Index::new("idx_users_email", ["email"])
            .unique()
            .method(IndexMethod::Hash)
            .descending()
            .predicate("deleted_at IS NULL")
            .include(["name"])
            .with_parameter("fillfactor", "70");

        assert!(idx.unique);
        assert_eq!(idx.method, IndexMethod::Hash);
        assert_eq!(idx.sort_order, SortOrder::Desc);
        assert_eq!(idx.predicate.as_deref(), Some("deleted_at IS NULL"));
        assert_eq!(idx.include_columns, vec!["name"]);
        assert_eq!(idx.storage_parameters, vec![("fillfactor".into(), "70".into())]);
        assert!(idx.covers("EMAIL"));
    }

    #[test]
    fn method_parse() {
        assert_eq!(IndexMethod::parse("btree"), Some(IndexMethod::BTree));
        assert_eq!(IndexMethod::parse("FULLTEXT"), Some(IndexMethod::FullText));
        assert_eq!(IndexMethod::parse("rtree"), None);
    }
}
