//! Migration planner.
//!
//! Classifies desired tables against the database, enforces the apply
//! policy, and runs forward or rollback statements in order.

use oxide_schema::{read_table, Dialect, Introspect, Severity, Table, TableDelta, TableIdentifier};
use tracing::{debug, info, warn};

use crate::config::PlannerConfig;
use crate::error::{MigrateError, Result, TableFailure};
use crate::executor::StatementExecutor;
use crate::migration::SchemaMigration;
use crate::policy::ApplyPolicy;

/// What to do after a statement fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FailureAction {
    /// Stop and return the error.
    #[default]
    Abort,
    /// Record the failure and go on with the next statement.
    Continue,
}

/// A statement that failed but was skipped by the failure hook.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailedStatement {
    /// Table the statement belongs to.
    pub table: TableIdentifier,
    /// The statement.
    pub statement: String,
    /// Error message.
    pub message: String,
}

/// Outcome of an apply or rollback run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApplyReport {
    /// Statements executed successfully.
    pub executed: usize,
    /// Statements logged but not executed (dry run).
    pub skipped: usize,
    /// Statements that failed and were continued past.
    pub failures: Vec<FailedStatement>,
}

impl ApplyReport {
    /// Returns true if no statement failed.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

type FailureHook = Box<dyn Fn(&TableIdentifier, &str, &sqlx::Error) -> FailureAction + Send + Sync>;

#[derive(Clone, Copy)]
enum Direction {
    Forward,
    Rollback,
}

/// Plans and applies schema migrations for one dialect.
pub struct MigrationPlanner<D: Dialect> {
    dialect: D,
    config: PlannerConfig,
    on_failure: Option<FailureHook>,
}

impl<D: Dialect> MigrationPlanner<D> {
    /// Creates a planner with the default configuration.
    pub fn new(dialect: D) -> Self {
        Self {
            dialect,
            config: PlannerConfig::default(),
            on_failure: None,
        }
    }

    /// Replaces the configuration.
    #[must_use]
    pub fn with_config(mut self, config: PlannerConfig) -> Self {
        self.config = config;
        self
    }

    /// Sets the apply policy.
    #[must_use]
    pub fn policy(mut self, policy: ApplyPolicy) -> Self {
        self.config.policy = policy;
        self
    }

    /// Enables dry-run mode (statements are logged, not executed).
    #[must_use]
    pub fn dry_run(mut self, enabled: bool) -> Self {
        self.config.dry_run = enabled;
        self
    }

    /// Installs a hook deciding whether to continue after a failed
    /// statement. Without a hook every failure aborts.
    #[must_use]
    pub fn on_failure<F>(mut self, hook: F) -> Self
    where
        F: Fn(&TableIdentifier, &str, &sqlx::Error) -> FailureAction + Send + Sync + 'static,
    {
        self.on_failure = Some(Box::new(hook));
        self
    }

    /// Returns the dialect.
    #[must_use]
    pub const fn dialect(&self) -> &D {
        &self.dialect
    }

    /// Returns the configuration.
    #[must_use]
    pub const fn config(&self) -> &PlannerConfig {
        &self.config
    }

    /// Computes the delta of one table.
    ///
    /// # Errors
    ///
    /// Returns [`MigrateError::Schema`] if the table cannot be rendered.
    pub fn diff(&self, desired: &Table, actual: Option<&Table>) -> Result<TableDelta> {
        Ok(TableDelta::new(desired, actual, &self.dialect)?)
    }

    /// Reads every desired table from the database and computes its delta.
    /// Every table is classified even when some fail: failed tables are
    /// recorded on the migration ([`SchemaMigration::failures`]) and the
    /// others can still be applied. Use [`SchemaMigration::into_complete`]
    /// to treat any failure as fatal.
    ///
    /// # Errors
    ///
    /// Per-table errors never fail the plan; they are collected on the
    /// returned migration.
    pub async fn plan<I>(&self, introspector: &I, desired: &[Table]) -> Result<SchemaMigration>
    where
        I: Introspect + Sync,
        MigrateError: From<I::Error>,
    {
        let mut deltas = Vec::with_capacity(desired.len());
        let mut failures = Vec::new();

        for table in desired {
            match self.classify(introspector, table).await {
                Ok(delta) => {
                    debug!(
                        table = %table.identifier,
                        severity = ?delta.severity(),
                        "Classified table"
                    );
                    deltas.push(delta);
                }
                Err(source) => {
                    warn!(table = %table.identifier, error = %source, "Failed to classify table");
                    failures.push(TableFailure {
                        table: table.identifier.clone(),
                        source,
                    });
                }
            }
        }

        Ok(SchemaMigration::new(deltas).with_failures(failures))
    }

    async fn classify<I>(&self, introspector: &I, table: &Table) -> Result<TableDelta>
    where
        I: Introspect + Sync,
        MigrateError: From<I::Error>,
    {
        let snapshot = introspector.fetch_catalog(&table.identifier).await?;
        let actual = read_table(&self.dialect, &table.identifier, &snapshot)?;
        self.diff(table, actual.as_ref())
    }

    /// Fails if the migration contains changes the policy forbids.
    ///
    /// # Errors
    ///
    /// Returns [`MigrateError::InvalidPatch`] when only table rebuilds are
    /// refused, [`MigrateError::PolicyViolation`] otherwise.
    pub fn assert_policy(&self, migration: &SchemaMigration) -> Result<()> {
        let policy = self.config.policy;
        let severity = migration.severity();
        if policy.permits(severity) {
            return Ok(());
        }

        if severity == Severity::Invalid && policy.permits(Severity::Update) {
            return Err(MigrateError::InvalidPatch {
                policy,
                tables: migration.tables_with(Severity::Invalid),
            });
        }

        let tables = migration
            .deltas()
            .iter()
            .filter(|d| !policy.permits(d.severity()))
            .map(|d| d.identifier().clone())
            .collect();
        Err(MigrateError::PolicyViolation {
            policy,
            severity,
            tables,
        })
    }

    /// Applies the forward statements of every delta, in order.
    ///
    /// # Errors
    ///
    /// Returns a policy error before anything runs, or the first failure
    /// the failure hook does not continue past.
    pub async fn apply<E: StatementExecutor>(
        &self,
        migration: &SchemaMigration,
        executor: &mut E,
    ) -> Result<ApplyReport> {
        self.run(migration, executor, Direction::Forward).await
    }

    /// Runs the rollback statements of every delta, in the same order as
    /// [`MigrationPlanner::apply`].
    ///
    /// # Errors
    ///
    /// See [`MigrationPlanner::apply`].
    pub async fn rollback<E: StatementExecutor>(
        &self,
        migration: &SchemaMigration,
        executor: &mut E,
    ) -> Result<ApplyReport> {
        self.run(migration, executor, Direction::Rollback).await
    }

    async fn run<E: StatementExecutor>(
        &self,
        migration: &SchemaMigration,
        executor: &mut E,
        direction: Direction,
    ) -> Result<ApplyReport> {
        self.assert_policy(migration)?;
        let mut report = ApplyReport::default();
        for failure in migration.failures() {
            warn!(table = %failure.table, error = %failure.source, "Skipping unclassified table");
        }

        if self.config.ensure_schemas && matches!(direction, Direction::Forward) {
            for schema in migration.schemas() {
                if let Some(sql) = self.dialect.create_schema(&schema) {
                    let owner = TableIdentifier::new(schema, "");
                    self.execute(executor, &owner, &sql, &mut report).await?;
                }
            }
        }

        for delta in migration.deltas().iter().filter(|d| d.has_changes()) {
            let (statements, message) = match direction {
                Direction::Forward => (delta.forward_statements(), "Applying table delta"),
                Direction::Rollback => (delta.rollback_statements(), "Rolling back table delta"),
            };
            info!(
                table = %delta.identifier(),
                severity = ?delta.severity(),
                statements = statements.len(),
                "{message}"
            );
            for sql in statements {
                self.execute(executor, delta.identifier(), sql, &mut report).await?;
            }
        }

        info!(
            executed = report.executed,
            skipped = report.skipped,
            failures = report.failures.len(),
            "Migration run finished"
        );
        Ok(report)
    }

    async fn execute<E: StatementExecutor>(
        &self,
        executor: &mut E,
        table: &TableIdentifier,
        sql: &str,
        report: &mut ApplyReport,
    ) -> Result<()> {
        if self.config.dry_run {
            warn!(table = %table, sql = %sql, "Dry run, statement not executed");
            report.skipped += 1;
            return Ok(());
        }

        debug!(table = %table, sql = %sql, "Executing SQL");
        let outcome = match self.config.timeout() {
            Some(limit) => tokio::time::timeout(limit, executor.execute(sql))
                .await
                .map_err(|_| MigrateError::Timeout {
                    table: table.clone(),
                    statement: sql.to_string(),
                })?,
            None => executor.execute(sql).await,
        };

        match outcome {
            Ok(()) => {
                report.executed += 1;
                Ok(())
            }
            Err(error) => {
                let action = self
                    .on_failure
                    .as_ref()
                    .map_or(FailureAction::Abort, |hook| hook(table, sql, &error));
                match action {
                    FailureAction::Abort => Err(MigrateError::Execution {
                        table: table.clone(),
                        statement: sql.to_string(),
                        source: error,
                    }),
                    FailureAction::Continue => {
                        warn!(
                            table = %table,
                            sql = %sql,
                            error = %error,
                            "Statement failed, continuing"
                        );
                        report.failures.push(FailedStatement {
                            table: table.clone(),
                            statement: sql.to_string(),
                            message: error.to_string(),
                        });
                        Ok(())
                    }
                }
            }
        }
    }
}
