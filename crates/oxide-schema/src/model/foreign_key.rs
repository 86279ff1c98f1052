//! Foreign key constraints.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::identifier::TableIdentifier;
use crate::error::{Result, SchemaError};

/// Referential action for ON DELETE / ON UPDATE.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum CascadeAction {
    /// No action (checked at end of statement).
    #[default]
    NoAction,
    /// Cascade the delete/update to referencing rows.
    Cascade,
    /// Set referencing columns to NULL.
    SetNull,
    /// Set referencing columns to their default.
    SetDefault,
    /// Reject immediately.
    Restrict,
}

impl CascadeAction {
    /// Returns the SQL phrase for this action.
    #[must_use]
    pub const fn as_sql(self) -> &'static str {
        match self {
            Self::NoAction => "NO ACTION",
            Self::Cascade => "CASCADE",
            Self::SetNull => "SET NULL",
            Self::SetDefault => "SET DEFAULT",
            Self::Restrict => "RESTRICT",
        }
    }

    /// Parses a catalog description. Accepts spaces or underscores
    /// between words (`SET NULL`, `SET_NULL`) in any case.
    ///
    /// # Errors
    ///
    /// Unrecognized values are rejected with
    /// [`SchemaError::UnknownCascadeAction`] rather than read as
    /// `NoAction`.
    pub fn parse(value: &str) -> Result<Self> {
        let normalized = value.trim().to_ascii_uppercase().replace(['_', ' '], "");
        match normalized.as_str() {
            "NOACTION" => Ok(Self::NoAction),
            "CASCADE" => Ok(Self::Cascade),
            "SETNULL" => Ok(Self::SetNull),
            "SETDEFAULT" => Ok(Self::SetDefault),
            "RESTRICT" => Ok(Self::Restrict),
            _ => Err(SchemaError::UnknownCascadeAction {
                value: value.to_string(),
            }),
        }
    }
}

impl fmt::Display for CascadeAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_sql())
    }
}

/// Which referential event an action applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CascadeEvent {
    /// ON DELETE.
    Delete,
    /// ON UPDATE.
    Update,
}

/// A foreign key constraint owned by a table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForeignKey {
    /// Constraint name.
    pub name: String,
    /// Referencing columns in the owning table.
    pub columns: Vec<String>,
    /// Referenced table. Required at render time.
    #[serde(default)]
    pub linked_table: Option<TableIdentifier>,
    /// Referenced columns.
    pub linked_columns: Vec<String>,
    /// ON DELETE action.
    #[serde(default)]
    pub on_delete: CascadeAction,
    /// ON UPDATE action.
    #[serde(default)]
    pub on_update: CascadeAction,
}

impl ForeignKey {
    /// Creates a foreign key with no referenced table yet.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            columns: Vec::new(),
            linked_table: None,
            linked_columns: Vec::new(),
            on_delete: CascadeAction::NoAction,
            on_update: CascadeAction::NoAction,
        }
    }

    /// Conventional name used when a catalog does not expose one:
    /// `fk_<table>_<col>_<col>`.
    #[must_use]
    pub fn default_name(table: &TableIdentifier, columns: &[String]) -> String {
        format!("fk_{}_{}", table.name, columns.join("_")).to_lowercase()
    }

    /// Sets the referencing columns.
    #[must_use]
    pub fn columns<S: Into<String>>(mut self, columns: impl IntoIterator<Item = S>) -> Self {
        self.columns = columns.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the referenced table and columns.
    #[must_use]
    pub fn references<S: Into<String>>(
        mut self,
        table: TableIdentifier,
        columns: impl IntoIterator<Item = S>,
    ) -> Self {
        self.linked_table = Some(table);
        self.linked_columns = columns.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the ON DELETE action.
    #[must_use]
    pub fn on_delete(mut self, action: CascadeAction) -> Self {
        self.on_delete = action;
        self
    }

    /// Sets the ON UPDATE action.
    #[must_use]
    pub fn on_update(mut self, action: CascadeAction) -> Self {
        self.on_update = action;
        self
    }

    /// Equivalence used for diffing: name, referenced table, both column
    /// lists (order-sensitive) and both actions. Names compare
    /// case-insensitively.
    #[must_use]
    pub fn is_equivalent_to(&self, other: &Self) -> bool {
        self.name.eq_ignore_ascii_case(&other.name)
            && self.linked_table == other.linked_table
            && names_equal(&self.columns, &other.columns)
            && names_equal(&self.linked_columns, &other.linked_columns)
            && self.on_delete == other.on_delete
            && self.on_update == other.on_update
    }
}

/// Order-sensitive, case-insensitive comparison of identifier lists.
#[must_use]
pub fn names_equal(a: &[String], b: &[String]) -> bool {
    a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.eq_ignore_ascii_case(y))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fk() -> ForeignKey {
        ForeignKey::new("fk_orders_user")
            .columns(["user_id"])
            .references(TableIdentifier::new("public", "users"), ["id"])
    }

    #[test]
    fn parse_cascade_descriptions() {
        assert_eq!(CascadeAction::parse("NO ACTION").unwrap(), CascadeAction::NoAction);
        assert_eq!(CascadeAction::parse("NO_ACTION").unwrap(), CascadeAction::NoAction);
        assert_eq!(CascadeAction::parse("set_null").unwrap(), CascadeAction::SetNull);
        assert_eq!(CascadeAction::parse("SET DEFAULT").unwrap(), CascadeAction::SetDefault);
        assert_eq!(CascadeAction::parse("Restrict").unwrap(), CascadeAction::Restrict);
    }

    #[test]
    fn parse_unknown_cascade_is_an_error() {
        let err = CascadeAction::parse("DETONATE").unwrap_err();
        assert_eq!(
            err,
            SchemaError::UnknownCascadeAction {
                value: "DETONATE".into()
            }
        );
    }

    #[test]
    fn equivalence_checks_actions_and_columns() {
        assert!(fk().is_equivalent_to(&fk()));
        assert!(!fk().is_equivalent_to(&fk().on_delete(CascadeAction::Cascade)));
        assert!(!fk().is_equivalent_to(&fk().on_update(CascadeAction::SetNull)));
        assert!(!fk().is_equivalent_to(&fk().columns(["owner_id"])));
        assert!(!fk().is_equivalent_to(
            &fk().references(TableIdentifier::new("public", "accounts"), ["id"])
        ));
    }

    #[test]
    fn column_order_matters() {
        let a = ForeignKey::new("fk").columns(["a", "b"]);
        let b = ForeignKey::new("fk").columns(["b", "a"]);
        assert!(!a.is_equivalent_to(&b));
        assert!(a.is_equivalent_to(&ForeignKey::new("FK").columns(["A", "B"])));
    }

    #[test]
    fn default_name_convention() {
        let table = TableIdentifier::new("main", "Orders");
        assert_eq!(
            ForeignKey::default_name(&table, &["user_id".to_string()]),
            "fk_orders_user_id"
        );
    }
}
