//! Statement executors.
//!
//! The planner hands every statement to a [`StatementExecutor`]; this
//! module provides one over a SQLite pool and one that only records.

use std::future::Future;

use sqlx::sqlite::SqlitePool;
use tracing::debug;

/// Runs one DDL statement at a time.
pub trait StatementExecutor {
    /// Executes `sql`.
    fn execute(&mut self, sql: &str) -> impl Future<Output = Result<(), sqlx::Error>> + Send;
}

impl StatementExecutor for SqlitePool {
    async fn execute(&mut self, sql: &str) -> Result<(), sqlx::Error> {
        debug!(sql = %sql, "Executing SQL");
        sqlx::query(sql).execute(&*self).await?;
        Ok(())
    }
}

/// Collects statements instead of running them.
#[derive(Debug, Clone, Default)]
pub struct RecordingExecutor {
    statements: Vec<String>,
}

impl RecordingExecutor {
    /// Creates an empty recorder.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            statements: Vec::new(),
        }
    }

    /// Statements received so far, in order.
    #[must_use]
    pub fn statements(&self) -> &[String] {
        &self.statements
    }

    /// The received statements as one script.
    #[must_use]
    pub fn script(&self) -> String {
        self.statements
            .iter()
            .map(|s| format!("{s};"))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl StatementExecutor for RecordingExecutor {
    async fn execute(&mut self, sql: &str) -> Result<(), sqlx::Error> {
        self.statements.push(sql.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::sqlite::SqlitePoolOptions;

    #[tokio::test]
    async fn test_sqlite_pool_executes() {
        let mut pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect(":memory:")
            .await
            .expect("Failed to create in-memory SQLite pool");

        pool.execute("CREATE TABLE t (id INTEGER)").await.unwrap();
        let row: Option<(String,)> =
            sqlx::query_as("SELECT name FROM sqlite_master WHERE type='table' AND name='t'")
                .fetch_optional(&pool)
                .await
                .unwrap();
        assert!(row.is_some());

        assert!(pool.execute("CREATE TABLE t (id INTEGER)").await.is_err());
    }

    #[tokio::test]
    async fn test_recording_executor() {
        let mut recorder = RecordingExecutor::new();
        recorder.execute("DROP TABLE a").await.unwrap();
        recorder.execute("DROP TABLE b").await.unwrap();
        assert_eq!(recorder.statements(), ["DROP TABLE a", "DROP TABLE b"]);
        assert_eq!(recorder.script(), "DROP TABLE a;\nDROP TABLE b;");
    }
}
