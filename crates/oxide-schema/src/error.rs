//! Error types for schema reconciliation.

/// Errors raised while rendering, comparing or reading schema objects.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SchemaError {
    /// An entity is missing data required to render it.
    #[error("Invalid configuration for {object}: {message}")]
    Configuration {
        /// The offending object (e.g. `foreign key fk_orders_user`).
        object: String,
        /// What is missing or wrong.
        message: String,
    },

    /// The dialect cannot express the requested operation as DDL.
    #[error("{dialect} does not support {operation}")]
    NotSupported {
        /// Dialect name.
        dialect: &'static str,
        /// The operation that was requested.
        operation: String,
    },

    /// A catalog reported a cascade action this engine does not know.
    #[error("Unknown cascade action '{value}'")]
    UnknownCascadeAction {
        /// The raw catalog value.
        value: String,
    },

    /// No column type is mapped for the given host type.
    #[error("No column type mapping for host type '{host_type}'")]
    UnknownHostType {
        /// The host (Rust) type name.
        host_type: String,
    },

    /// Catalog rows could not be turned into a table.
    #[error("Malformed catalog data for {table}: {message}")]
    Catalog {
        /// Table being read.
        table: String,
        /// Error message.
        message: String,
    },
}

impl SchemaError {
    pub(crate) fn configuration(object: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Configuration {
            object: object.into(),
            message: message.into(),
        }
    }

    pub(crate) fn not_supported(dialect: &'static str, operation: impl Into<String>) -> Self {
        Self::NotSupported {
            dialect,
            operation: operation.into(),
        }
    }
}

/// Result type for schema operations.
pub type Result<T> = std::result::Result<T, SchemaError>;
