//! Plans and applies declarative table migrations.
//!
//! `oxide-migrate` drives the `oxide-schema` engine against a live
//! database:
//!
//! - **Planner** - Reads the catalog of every desired table, computes the
//!   deltas, enforces the [`ApplyPolicy`] and runs the statements
//! - **Executor** - Runs statements one at a time (`SqlitePool`, or a
//!   recorder for scripts and dry runs)
//! - **Introspector** - Reads the SQLite catalog into a snapshot
//!
//! # Example
//!
//! ```rust,no_run
//! use oxide_migrate::{MigrationPlanner, SqliteIntrospector};
//! use oxide_schema::{Column, SqliteDialect, Table, TableIdentifier};
//! use sqlx::sqlite::SqlitePoolOptions;
//!
//! # async fn run() -> oxide_migrate::Result<()> {
//! let mut pool = SqlitePoolOptions::new().connect("sqlite:app.db").await?;
//! let users = Table::new(TableIdentifier::new("main", "users"))
//!     .column(Column::new("id", "INTEGER").primary_key().auto_increment())
//!     .column(Column::new("email", "TEXT").not_null());
//!
//! let planner = MigrationPlanner::new(SqliteDialect::new());
//! let introspector = SqliteIntrospector::new(pool.clone());
//! let migration = planner.plan(&introspector, &[users]).await?;
//! println!("{}", migration.forward_script());
//! planner.apply(&migration, &mut pool).await?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod executor;
pub mod migration;
pub mod planner;
pub mod policy;
pub mod sqlite;

pub use config::PlannerConfig;
pub use error::{MigrateError, Result, TableFailure};
pub use executor::{RecordingExecutor, StatementExecutor};
pub use migration::SchemaMigration;
pub use planner::{ApplyReport, FailedStatement, FailureAction, MigrationPlanner};
pub use policy::ApplyPolicy;
pub use sqlite::SqliteIntrospector;
