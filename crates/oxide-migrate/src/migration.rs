//! A planned schema migration: the ordered table deltas of one run.

use oxide_schema::{Severity, TableDelta, TableIdentifier};

use crate::error::{MigrateError, Result, TableFailure};

/// Table deltas in the order the caller listed the tables, plus the tables
/// that could not be classified. Failed tables are left out of every
/// script and run; the others are unaffected by them.
#[derive(Debug, Default)]
pub struct SchemaMigration {
    deltas: Vec<TableDelta>,
    failures: Vec<TableFailure>,
}

impl SchemaMigration {
    /// Creates a migration from deltas, kept in the given order.
    #[must_use]
    pub const fn new(deltas: Vec<TableDelta>) -> Self {
        Self {
            deltas,
            failures: Vec::new(),
        }
    }

    /// Records tables that failed classification.
    #[must_use]
    pub fn with_failures(mut self, failures: Vec<TableFailure>) -> Self {
        self.failures = failures;
        self
    }

    /// The deltas, in order.
    #[must_use]
    pub fn deltas(&self) -> &[TableDelta] {
        &self.deltas
    }

    /// Tables that could not be classified.
    #[must_use]
    pub fn failures(&self) -> &[TableFailure] {
        &self.failures
    }

    /// Returns true if every desired table was classified.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }

    /// Fails with [`MigrateError::Classification`] if any table could not
    /// be classified.
    ///
    /// # Errors
    ///
    /// Returns the recorded failures as one error.
    pub fn into_complete(self) -> Result<Self> {
        if self.failures.is_empty() {
            Ok(self)
        } else {
            Err(MigrateError::Classification(self.failures))
        }
    }

    /// Most severe delta; `None` for an empty migration.
    #[must_use]
    pub fn severity(&self) -> Severity {
        Severity::most_severe(self.deltas.iter().map(TableDelta::severity))
    }

    /// Returns true if any table needs a change.
    #[must_use]
    pub fn has_changes(&self) -> bool {
        self.deltas.iter().any(TableDelta::has_changes)
    }

    /// Tables whose delta has the given severity.
    #[must_use]
    pub fn tables_with(&self, severity: Severity) -> Vec<TableIdentifier> {
        self.deltas
            .iter()
            .filter(|d| d.severity() == severity)
            .map(|d| d.identifier().clone())
            .collect()
    }

    /// Distinct schemas of the tables that change, in first-seen order.
    #[must_use]
    pub fn schemas(&self) -> Vec<String> {
        let mut schemas: Vec<String> = Vec::new();
        for delta in self.deltas.iter().filter(|d| d.has_changes()) {
            let schema = &delta.identifier().schema;
            if !schema.is_empty() && !schemas.iter().any(|s| s.eq_ignore_ascii_case(schema)) {
                schemas.push(schema.clone());
            }
        }
        schemas
    }

    /// All forward statements as one script.
    #[must_use]
    pub fn forward_script(&self) -> String {
        script(self.deltas.iter().flat_map(TableDelta::forward_statements))
    }

    /// All rollback statements as one script.
    #[must_use]
    pub fn rollback_script(&self) -> String {
        script(self.deltas.iter().flat_map(TableDelta::rollback_statements))
    }
}

fn script<'a>(statements: impl Iterator<Item = &'a String>) -> String {
    statements
        .map(|s| format!("{s};"))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use oxide_schema::{Column, PostgresDialect, Table};

    fn table(schema: &str, name: &str) -> Table {
        Table::new(TableIdentifier::new(schema, name))
            .column(Column::new("id", "BIGINT").primary_key())
    }

    #[test]
    fn test_severity_and_scripts() {
        let dialect = PostgresDialect::new();
        let created = TableDelta::new(&table("app", "a"), None, &dialect).unwrap();
        let unchanged =
            TableDelta::new(&table("audit", "b"), Some(&table("audit", "b")), &dialect).unwrap();
        let migration = SchemaMigration::new(vec![created, unchanged]);

        assert_eq!(migration.severity(), Severity::Create);
        assert!(migration.has_changes());
        assert_eq!(migration.schemas(), vec!["app"]);
        assert_eq!(migration.tables_with(Severity::None), vec![TableIdentifier::new("audit", "b")]);
        assert!(migration.forward_script().starts_with("CREATE TABLE \"app\".\"a\""));
        assert!(migration.forward_script().ends_with(");"));
        assert_eq!(migration.rollback_script(), "DROP TABLE \"app\".\"a\";");
    }

    #[test]
    fn test_empty_migration() {
        let migration = SchemaMigration::default();
        assert_eq!(migration.severity(), Severity::None);
        assert!(!migration.has_changes());
        assert!(migration.forward_script().is_empty());
        assert!(migration.is_complete());
    }

    #[test]
    fn test_failures_keep_healthy_deltas() {
        let dialect = PostgresDialect::new();
        let created = TableDelta::new(&table("app", "a"), None, &dialect).unwrap();
        let failure = TableFailure {
            table: TableIdentifier::new("app", "broken"),
            source: MigrateError::Schema(oxide_schema::SchemaError::Configuration {
                object: "foreign key fk_broken".to_string(),
                message: "no referenced table".to_string(),
            }),
        };
        let migration = SchemaMigration::new(vec![created]).with_failures(vec![failure]);

        assert!(!migration.is_complete());
        assert_eq!(migration.failures()[0].table, TableIdentifier::new("app", "broken"));
        assert_eq!(migration.severity(), Severity::Create);
        assert!(migration.forward_script().starts_with("CREATE TABLE \"app\".\"a\""));
        assert!(matches!(
            migration.into_complete(),
            Err(MigrateError::Classification(failures)) if failures.len() == 1
        ));
    }
}
