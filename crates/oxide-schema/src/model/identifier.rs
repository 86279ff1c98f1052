//! Two-part table identity.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A schema-qualified table name.
///
/// An empty schema stands for the connection's current schema (or
/// database, on MySQL) and is never rendered as a qualifier.
#[derive(Debug, Clone, Eq, Serialize, Deserialize)]
pub struct TableIdentifier {
    /// Schema (namespace) name.
    pub schema: String,
    /// Table name.
    pub name: String,
}

impl TableIdentifier {
    /// Creates a new identifier.
    #[must_use]
    pub fn new(schema: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            schema: schema.into(),
            name: name.into(),
        }
    }

    /// Parses `schema.table` or a bare `table`, falling back to
    /// `default_schema` when no schema is given.
    #[must_use]
    pub fn parse(qualified: &str, default_schema: &str) -> Self {
        match qualified.split_once('.') {
            Some((schema, name)) => Self::new(schema.trim(), name.trim()),
            None => Self::new(default_schema, qualified.trim()),
        }
    }

    /// Returns a copy with the table name replaced.
    #[must_use]
    pub fn with_name(&self, name: impl Into<String>) -> Self {
        Self::new(self.schema.clone(), name)
    }

    /// Returns true if the schema part is empty.
    #[must_use]
    pub fn is_unqualified(&self) -> bool {
        self.schema.is_empty()
    }
}

impl PartialEq for TableIdentifier {
    fn eq(&self, other: &Self) -> bool {
        self.schema.eq_ignore_ascii_case(&other.schema)
            && self.name.eq_ignore_ascii_case(&other.name)
    }
}

impl fmt::Display for TableIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.schema.is_empty() {
            write!(f, "{}", self.name)
        } else {
            write!(f, "{}.{}", self.schema, self.name)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_qualified_and_bare() {
        let id = TableIdentifier::parse("sales.orders", "public");
        assert_eq!(id.schema, "sales");
        assert_eq!(id.name, "orders");

        let id = TableIdentifier::parse("orders", "public");
        assert_eq!(id.schema, "public");
        assert_eq!(id.to_string(), "public.orders");
    }

    #[test]
    fn equality_ignores_case() {
        assert_eq!(
            TableIdentifier::new("Public", "Users"),
            TableIdentifier::new("public", "users")
        );
        assert_ne!(
            TableIdentifier::new("public", "users"),
            TableIdentifier::new("other", "users")
        );
    }

    #[test]
    fn unqualified_display() {
        let id = TableIdentifier::new("", "users");
        assert!(id.is_unqualified());
        assert_eq!(id.to_string(), "users");
    }
}
