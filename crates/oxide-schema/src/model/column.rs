//! Column definitions.

use serde::{Deserialize, Serialize};

use crate::dialect::Dialect;
use crate::error::{Result, SchemaError};

/// A column of a desired or actual table.
///
/// Built with by-value setters, each returning the updated column:
///
/// ```rust
/// use oxide_schema::model::Column;
///
/// let id = Column::new("id", "BIGINT").primary_key().auto_increment();
/// let email = Column::new("email", "VARCHAR(255)").not_null().default_value("''");
/// assert!(!id.nullable);
/// assert_eq!(email.default.as_deref(), Some("''"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    /// Column name.
    pub name: String,
    /// Declared type as written in DDL (`VARCHAR(100)`, `integer`).
    pub column_type: String,
    /// Whether the column allows NULL values.
    pub nullable: bool,
    /// Whether the column belongs to the primary key.
    pub primary_key: bool,
    /// Whether the column auto-increments.
    pub auto_increment: bool,
    /// Default value expression, rendered verbatim.
    #[serde(default)]
    pub default: Option<String>,
    /// Generated-column expression.
    #[serde(default)]
    pub generated: Option<String>,
    /// Column collation.
    #[serde(default)]
    pub collation: Option<String>,
}

impl Column {
    /// Creates a nullable column of the given type.
    #[must_use]
    pub fn new(name: impl Into<String>, column_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            column_type: column_type.into(),
            nullable: true,
            primary_key: false,
            auto_increment: false,
            default: None,
            generated: None,
            collation: None,
        }
    }

    /// Creates a column from a Rust host type through the dialect's type
    /// mapping. `Option<T>` maps `T` and makes the column nullable.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::UnknownHostType`] when the dialect has no
    /// mapping for the host type.
    pub fn from_host_type(
        name: impl Into<String>,
        host_type: &str,
        dialect: &impl Dialect,
    ) -> Result<Self> {
        let inner = strip_option(host_type);
        let column_type = dialect
            .map_host_type(inner)
            .ok_or_else(|| SchemaError::UnknownHostType {
                host_type: host_type.to_string(),
            })?;
        let column = Self::new(name, column_type);
        Ok(if inner.len() == host_type.trim().len() {
            column.not_null()
        } else {
            column
        })
    }

    /// Sets the column as NOT NULL.
    #[must_use]
    pub fn not_null(mut self) -> Self {
        self.nullable = false;
        self
    }

    /// Sets the column as nullable.
    #[must_use]
    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    /// Marks the column as part of the primary key.
    #[must_use]
    pub fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self.nullable = false;
        self
    }

    /// Sets the column to auto-increment.
    #[must_use]
    pub fn auto_increment(mut self) -> Self {
        self.auto_increment = true;
        self
    }

    /// Sets the default value expression.
    #[must_use]
    pub fn default_value(mut self, expression: impl Into<String>) -> Self {
        self.default = Some(expression.into());
        self
    }

    /// Makes this a generated column computed from `expression`.
    #[must_use]
    pub fn generated_as(mut self, expression: impl Into<String>) -> Self {
        self.generated = Some(expression.into());
        self
    }

    /// Sets the column collation.
    #[must_use]
    pub fn collate(mut self, collation: impl Into<String>) -> Self {
        self.collation = Some(collation.into());
        self
    }

    /// The declared type without length/precision qualifiers,
    /// whitespace-collapsed and upper-cased (`varchar(100)` -> `VARCHAR`).
    #[must_use]
    pub fn base_type(&self) -> String {
        base_type(&self.column_type)
    }

    /// Structural equivalence used for diffing: base type name,
    /// nullability and primary-key membership. Length and precision
    /// qualifiers, defaults and collation are ignored.
    #[must_use]
    pub fn is_equivalent_to(&self, other: &Self) -> bool {
        self.base_type() == other.base_type()
            && self.nullable == other.nullable
            && self.primary_key == other.primary_key
    }
}

/// Strips length/precision qualifiers from a type name.
#[must_use]
pub fn base_type(column_type: &str) -> String {
    let mut out = String::with_capacity(column_type.len());
    let mut depth = 0usize;
    for c in column_type.chars() {
        match c {
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            _ if depth == 0 => out.push(c),
            _ => {}
        }
    }
    out.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_uppercase()
}

/// Strips a wrapping `Option<...>` from a host type name.
pub(crate) fn strip_option(host_type: &str) -> &str {
    let trimmed = host_type.trim();
    trimmed
        .strip_prefix("Option<")
        .and_then(|rest| rest.strip_suffix('>'))
        .map_or(trimmed, str::trim)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::{PostgresDialect, SqliteDialect};

    #[test]
    fn base_type_strips_qualifiers() {
        assert_eq!(base_type("varchar(100)"), "VARCHAR");
        assert_eq!(base_type("NUMERIC(10, 2)"), "NUMERIC");
        assert_eq!(base_type("timestamp(3)  with time zone"), "TIMESTAMP WITH TIME ZONE");
        assert_eq!(base_type("integer[]"), "INTEGER[]");
    }

    #[test]
    fn equivalence_ignores_length() {
        let a = Column::new("name", "VARCHAR(100)");
        let b = Column::new("name", "varchar(255)");
        assert!(a.is_equivalent_to(&b));
    }

    #[test]
    fn equivalence_sensitive_to_type_nullability_and_pk() {
        let base = Column::new("age", "INTEGER");
        assert!(!base.is_equivalent_to(&Column::new("age", "BIGINT")));
        assert!(!base.is_equivalent_to(&Column::new("age", "INTEGER").not_null()));
        assert!(!base.is_equivalent_to(&Column::new("age", "INTEGER").primary_key()));
        assert!(base.is_equivalent_to(&Column::new("age", "INTEGER").default_value("0")));
    }

    #[test]
    fn primary_key_implies_not_null() {
        let col = Column::new("id", "BIGINT").primary_key();
        assert!(col.primary_key);
        assert!(!col.nullable);
    }

    #[test]
    fn from_host_type_maps_option_to_nullable() {
        let dialect = PostgresDialect::new();
        let score = Column::from_host_type("score", "Option<f64>", &dialect).unwrap();
        assert_eq!(score.column_type, "DOUBLE PRECISION");
        assert!(score.nullable);

        let id = Column::from_host_type("id", "i64", &dialect).unwrap();
        assert_eq!(id.column_type, "BIGINT");
        assert!(!id.nullable);
    }

    #[test]
    fn from_host_type_unknown() {
        let err = Column::from_host_type("x", "MyStruct", &SqliteDialect::new()).unwrap_err();
        assert!(matches!(err, SchemaError::UnknownHostType { .. }));
    }
}
