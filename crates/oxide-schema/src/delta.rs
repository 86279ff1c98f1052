//! Per-table delta: what differs between a desired and an actual table,
//! how severe it is, and the statements that apply or undo it.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::canonical::canonicalize;
use crate::dialect::Dialect;
use crate::diff::ItemDelta;
use crate::error::Result;
use crate::model::{Column, ForeignKey, Index, Table, TableIdentifier};

/// How disruptive a change is. Ordered from most to least severe, so the
/// severity of a set of changes is their minimum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Severity {
    /// Cannot be applied in place; the table must be rebuilt.
    Invalid,
    /// Applied with ALTER statements.
    Update,
    /// The table does not exist yet.
    Create,
    /// Nothing to do.
    None,
}

impl Severity {
    /// The most severe of the given severities; `None` for an empty input.
    #[must_use]
    pub fn most_severe(severities: impl IntoIterator<Item = Self>) -> Self {
        severities.into_iter().min().unwrap_or(Self::None)
    }

    /// Returns the severity name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Invalid => "invalid",
            Self::Update => "update",
            Self::Create => "create",
            Self::None => "none",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The difference between a desired table and the table found in the
/// database, with its forward and rollback statements.
///
/// Built once from snapshots of both tables; never mutated afterwards.
///
/// ```rust
/// use oxide_schema::delta::{Severity, TableDelta};
/// use oxide_schema::dialect::SqliteDialect;
/// use oxide_schema::model::{Column, Table, TableIdentifier};
///
/// let dialect = SqliteDialect::new();
/// let actual = Table::new(TableIdentifier::new("main", "users"))
///     .column(Column::new("id", "INTEGER").primary_key());
/// let expected = actual.clone().column(Column::new("email", "TEXT"));
///
/// let delta = TableDelta::new(&expected, Some(&actual), &dialect).unwrap();
/// assert_eq!(delta.severity(), Severity::Update);
/// assert_eq!(
///     delta.forward_statements(),
///     ["ALTER TABLE \"users\" ADD COLUMN \"email\" TEXT"]
/// );
/// ```
#[derive(Debug, Clone)]
pub struct TableDelta {
    /// The desired table.
    pub expected: Table,
    /// The table found in the database, if any.
    pub actual: Option<Table>,
    /// Column classification.
    pub columns: ItemDelta<Column>,
    /// Index classification, by canonical DDL.
    pub indexes: ItemDelta<Index>,
    /// Foreign key classification.
    pub foreign_keys: ItemDelta<ForeignKey>,
    /// Whether the primary key columns differ.
    pub primary_key_changed: bool,
    /// Whether partitioning differs.
    pub partitioning_changed: bool,
    /// Whether table options differ.
    pub options_changed: bool,
    severity: Severity,
    forward: Vec<String>,
    rollback: Vec<String>,
}

impl TableDelta {
    /// Compares `expected` with `actual` and renders the statements for
    /// the dialect.
    ///
    /// # Errors
    ///
    /// Returns an error if the desired table cannot be rendered for the
    /// dialect (missing referenced table, unsupported method or cascade,
    /// partitioning outside PostgreSQL), or if a statement of the plan
    /// cannot be expressed.
    pub fn new<D: Dialect + ?Sized>(
        expected: &Table,
        actual: Option<&Table>,
        dialect: &D,
    ) -> Result<Self> {
        let expected = expected.clone();
        let create = dialect.create_table(&expected)?;
        let create_indexes = expected
            .indexes
            .iter()
            .map(|index| dialect.index_ddl(&expected.identifier, index))
            .collect::<Result<Vec<_>>>()?;

        let Some(actual) = actual.cloned() else {
            debug!(table = %expected.identifier, dialect = dialect.name(), "Table does not exist");
            let mut forward = vec![create];
            forward.extend(create_indexes);
            return Ok(Self {
                columns: ItemDelta::compare(&expected.columns, &[], |_, _| false),
                indexes: ItemDelta::compare(&expected.indexes, &[], |_, _| false),
                foreign_keys: ItemDelta::compare(&expected.foreign_keys, &[], |_, _| false),
                primary_key_changed: false,
                partitioning_changed: false,
                options_changed: false,
                severity: Severity::Create,
                rollback: vec![dialect.drop_table(&expected.identifier)],
                forward,
                actual: None,
                expected,
            });
        };

        let identifier = expected.identifier.clone();
        for index in &actual.indexes {
            dialect.index_ddl(&identifier, index)?;
        }

        let columns = ItemDelta::compare(&expected.columns, &actual.columns, |e, a| {
            dialect.columns_equivalent(e, a)
        });
        let indexes = ItemDelta::compare(&expected.indexes, &actual.indexes, |e, a| {
            canonical_index(dialect, &identifier, e) == canonical_index(dialect, &identifier, a)
        });
        let foreign_keys = ItemDelta::compare(&expected.foreign_keys, &actual.foreign_keys, |e, a| {
            resolve_linked(e, &identifier).is_equivalent_to(&resolve_linked(a, &identifier))
        });

        let primary_key_changed = !same_names(
            &expected.primary_key_columns(),
            &actual.primary_key_columns(),
        );
        let partitioning_changed = match (&expected.partitioning, &actual.partitioning) {
            (None, None) => false,
            (Some(e), Some(a)) => !e.is_equivalent_to(a),
            _ => true,
        };
        let options_changed =
            dialect.supports_table_options() && !expected.options.is_satisfied_by(&actual.options);

        trace!(
            table = %identifier,
            columns = ?columns.severity(),
            indexes = ?indexes.severity(),
            foreign_keys = ?foreign_keys.severity(),
            primary_key_changed,
            partitioning_changed,
            options_changed,
            "Compared table"
        );

        let mut severities = vec![
            columns.severity(),
            indexes.severity(),
            foreign_keys.severity(),
        ];
        if primary_key_changed || options_changed {
            severities.push(Severity::Update);
        }
        let needs_rebuild = partitioning_changed
            || columns
                .different
                .iter()
                .any(|c| !dialect.can_alter_column(&c.expected, &c.actual))
            || columns.missing.iter().any(|c| !dialect.can_add_column(c))
            || columns.extra.iter().any(|c| !dialect.can_drop_column(c, &actual))
            || (!dialect.supports_alter_constraints()
                && (foreign_keys.has_changes() || primary_key_changed));
        if needs_rebuild {
            severities.push(Severity::Invalid);
        }
        let severity = Severity::most_severe(severities);

        let (forward, rollback) = match severity {
            Severity::Invalid => (
                dialect.rebuild_table(&expected, &actual)?,
                dialect.rebuild_table(&actual, &expected)?,
            ),
            Severity::Update => {
                let changes = Changes {
                    columns: &columns,
                    indexes: &indexes,
                    foreign_keys: &foreign_keys,
                    primary_key_changed,
                    options_changed,
                };
                let forward = changes.statements(dialect, &expected, &actual)?;
                let inverted = Changes {
                    columns: &columns.inverted(),
                    indexes: &indexes.inverted(),
                    foreign_keys: &foreign_keys.inverted(),
                    ..changes
                };
                let rollback = inverted.statements(dialect, &actual, &expected)?;
                (forward, rollback)
            }
            Severity::Create | Severity::None => (Vec::new(), Vec::new()),
        };

        debug!(
            table = %identifier,
            dialect = dialect.name(),
            severity = ?severity,
            statements = forward.len(),
            "Computed table delta"
        );

        Ok(Self {
            expected,
            actual: Some(actual),
            columns,
            indexes,
            foreign_keys,
            primary_key_changed,
            partitioning_changed,
            options_changed,
            severity,
            forward,
            rollback,
        })
    }

    /// The table this delta applies to.
    #[must_use]
    pub const fn identifier(&self) -> &TableIdentifier {
        &self.expected.identifier
    }

    /// Most severe sub-difference.
    #[must_use]
    pub const fn severity(&self) -> Severity {
        self.severity
    }

    /// Returns true unless the tables already match.
    #[must_use]
    pub fn has_changes(&self) -> bool {
        self.severity != Severity::None
    }

    /// Returns true when the table must be rebuilt.
    #[must_use]
    pub fn requires_rebuild(&self) -> bool {
        self.severity == Severity::Invalid
    }

    /// Statements that make the database match the desired table.
    #[must_use]
    pub fn forward_statements(&self) -> &[String] {
        &self.forward
    }

    /// Statements that undo [`TableDelta::forward_statements`].
    #[must_use]
    pub fn rollback_statements(&self) -> &[String] {
        &self.rollback
    }
}

/// The sub-deltas of an in-place update, from `source` towards `target`.
#[derive(Clone, Copy)]
struct Changes<'a> {
    columns: &'a ItemDelta<Column>,
    indexes: &'a ItemDelta<Index>,
    foreign_keys: &'a ItemDelta<ForeignKey>,
    primary_key_changed: bool,
    options_changed: bool,
}

impl Changes<'_> {
    /// Statements in dependency order: indexes and foreign keys that may
    /// reference changing columns go first and come back last, the primary
    /// key is replaced at the end.
    fn statements<D: Dialect + ?Sized>(
        &self,
        dialect: &D,
        target: &Table,
        source: &Table,
    ) -> Result<Vec<String>> {
        let id = &target.identifier;
        let mut statements = Vec::new();

        for index in &self.indexes.extra {
            statements.push(dialect.drop_index(id, index));
        }
        for change in &self.indexes.different {
            statements.push(dialect.drop_index(id, &change.actual));
        }

        for foreign_key in &self.foreign_keys.extra {
            statements.push(dialect.drop_foreign_key(id, foreign_key)?);
        }
        for change in &self.foreign_keys.different {
            statements.push(dialect.drop_foreign_key(id, &change.actual)?);
        }

        for column in &self.columns.missing {
            statements.push(dialect.add_column(id, column));
        }
        for change in &self.columns.different {
            statements.extend(dialect.alter_column(id, &change.expected, &change.actual)?);
        }
        for column in &self.columns.extra {
            statements.push(dialect.drop_column(id, column));
        }

        for index in &self.indexes.missing {
            statements.push(dialect.index_ddl(id, index)?);
        }
        for change in &self.indexes.different {
            statements.push(dialect.index_ddl(id, &change.expected)?);
        }

        for foreign_key in &self.foreign_keys.missing {
            statements.push(dialect.add_foreign_key(id, foreign_key)?);
        }
        for change in &self.foreign_keys.different {
            statements.push(dialect.add_foreign_key(id, &change.expected)?);
        }

        if self.primary_key_changed {
            if source.has_primary_key() {
                statements.push(dialect.drop_primary_key(source)?);
            }
            if target.has_primary_key() {
                statements.push(dialect.add_primary_key(target)?);
            }
        }

        if self.options_changed {
            if let Some(sql) = dialect.alter_table_options(id, &target.options)? {
                statements.push(sql);
            }
        }

        Ok(statements)
    }
}

fn canonical_index<D: Dialect + ?Sized>(
    dialect: &D,
    table: &TableIdentifier,
    index: &Index,
) -> String {
    // Both sides were rendered successfully before comparison.
    dialect
        .index_ddl(table, index)
        .map(|ddl| canonicalize(&ddl, dialect))
        .unwrap_or_default()
}

/// A referenced table without schema lives in the owning table's schema.
fn resolve_linked(foreign_key: &ForeignKey, owner: &TableIdentifier) -> ForeignKey {
    let mut foreign_key = foreign_key.clone();
    if let Some(linked) = foreign_key.linked_table.as_mut() {
        if linked.schema.is_empty() {
            linked.schema.clone_from(&owner.schema);
        }
    }
    foreign_key
}

fn same_names(a: &[&str], b: &[&str]) -> bool {
    a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.eq_ignore_ascii_case(y))
}
