//! # oxide-schema
//!
//! Declarative table reconciliation: describe the tables you want, compare
//! them with what a database catalog reports, and get the DDL that closes
//! the gap, for PostgreSQL, MySQL, SQL Server, Oracle and SQLite.
//!
//! This crate provides:
//! - An entity model for tables, columns, indexes and foreign keys
//! - Name-keyed set diffs and per-table deltas graded by [`Severity`]
//! - A [`Dialect`] per database deciding what can be altered in place and
//!   rendering every statement, with table rebuilds where it cannot
//! - Textual canonicalization so catalog-reported index DDL compares equal
//!   to the DDL this crate renders
//! - A catalog reader turning catalog rows into an actual [`Table`]
//!
//! The engine is synchronous and does no I/O; fetching catalogs and running
//! statements belongs to the caller (see the `oxide-migrate` crate).
//!
//! ## Computing a delta
//!
//! ```rust
//! use oxide_schema::{Column, Index, PostgresDialect, Severity, Table, TableDelta, TableIdentifier};
//!
//! let dialect = PostgresDialect::new();
//! let actual = Table::new(TableIdentifier::new("public", "users"))
//!     .column(Column::new("id", "BIGINT").primary_key())
//!     .index(Index::new("idx_users_legacy", ["id"]).unique());
//! let expected = Table::new(TableIdentifier::new("public", "users"))
//!     .column(Column::new("id", "BIGINT").primary_key());
//!
//! let delta = TableDelta::new(&expected, Some(&actual), &dialect).unwrap();
//! assert_eq!(delta.severity(), Severity::Update);
//! assert_eq!(
//!     delta.forward_statements(),
//!     [r#"DROP INDEX "public"."idx_users_legacy""#]
//! );
//! ```

pub mod canonical;
pub mod catalog;
pub mod delta;
pub mod dialect;
pub mod diff;
pub mod error;
pub mod model;

pub use canonical::{canonicalize, same_definition};
pub use catalog::{read_table, CatalogSnapshot, Introspect};
pub use delta::{Severity, TableDelta};
pub use dialect::{
    Dialect, MySqlDialect, OracleDialect, PostgresDialect, SqlServerDialect, SqliteDialect,
};
pub use diff::{Change, ItemDelta, Named};
pub use error::{Result, SchemaError};
pub use model::{
    CascadeAction, Column, ForeignKey, Index, IndexMethod, PartitionStrategy, SortOrder, Table,
    TableIdentifier, TableOptions,
};
