//! Schema entity model: tables and the objects they own.

mod column;
mod foreign_key;
mod identifier;
mod index;
mod table;

pub use column::{base_type, Column};
pub use foreign_key::{names_equal, CascadeAction, CascadeEvent, ForeignKey};
pub use identifier::TableIdentifier;
pub use index::{Index, IndexMethod, SortOrder};
pub use table::{PartitionStrategy, Partitioning, Table, TableOptions};
