//! Error types for planning and applying schema migrations.

use oxide_schema::{SchemaError, Severity, TableIdentifier};

use crate::policy::ApplyPolicy;

/// A table whose delta could not be computed.
#[derive(Debug)]
pub struct TableFailure {
    /// The table being classified.
    pub table: TableIdentifier,
    /// Why classification failed.
    pub source: MigrateError,
}

/// Errors that can occur while planning or applying a migration.
#[derive(Debug, thiserror::Error)]
pub enum MigrateError {
    /// A delta requires a table rebuild and the policy does not allow it.
    #[error("Policy {policy} refuses to rebuild tables: {}", join(.tables))]
    InvalidPatch {
        /// The active policy.
        policy: ApplyPolicy,
        /// Tables that would be rebuilt.
        tables: Vec<TableIdentifier>,
    },

    /// The migration contains changes the policy forbids.
    #[error("Policy {policy} forbids {severity} changes to: {}", join(.tables))]
    PolicyViolation {
        /// The active policy.
        policy: ApplyPolicy,
        /// Most severe change found.
        severity: Severity,
        /// Tables with forbidden changes.
        tables: Vec<TableIdentifier>,
    },

    /// One or more tables could not be classified.
    #[error(
        "Failed to classify {} table(s):\n{}",
        .0.len(),
        .0.iter().map(|f| format!("  - {}: {}", f.table, f.source)).collect::<Vec<_>>().join("\n")
    )]
    Classification(Vec<TableFailure>),

    /// A statement failed to execute.
    #[error("Statement for {table} failed: {statement}: {source}")]
    Execution {
        /// Table the statement belongs to.
        table: TableIdentifier,
        /// The failing statement.
        statement: String,
        /// Underlying database error.
        source: sqlx::Error,
    },

    /// A statement did not complete within the configured timeout.
    #[error("Statement for {table} timed out: {statement}")]
    Timeout {
        /// Table the statement belongs to.
        table: TableIdentifier,
        /// The statement that timed out.
        statement: String,
    },

    /// The schema engine rejected a table.
    #[error("Schema error: {0}")]
    Schema(#[from] SchemaError),

    /// Database error outside statement execution (catalog reads).
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Configuration could not be parsed.
    #[error("Configuration error: {0}")]
    Config(#[from] serde_json::Error),
}

fn join(tables: &[TableIdentifier]) -> String {
    tables
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Result type for migration operations.
pub type Result<T> = std::result::Result<T, MigrateError>;
