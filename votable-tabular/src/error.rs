//! Error types for the table model.

/// Error type for schema construction and row validation.
#[derive(Debug, thiserror::Error)]
pub enum TabularError {
    /// Schema-level error (duplicate names, bad sentinel, empty schema).
    #[error("schema error: {0}")]
    Schema(String),

    /// Row-level error (arity or cell type disagrees with the schema).
    #[error("row error: {0}")]
    Row(String),

    /// Unrecognized VOTable datatype token.
    #[error("invalid datatype token: `{0}`")]
    Datatype(String),

    /// Malformed VOTable arraysize token.
    #[error("invalid arraysize token: `{0}`")]
    ArraySize(String),
}

/// Result type for table model operations.
pub type Result<T> = std::result::Result<T, TabularError>;

impl TabularError {
    /// Create a schema error.
    pub fn schema(message: impl Into<String>) -> Self {
        Self::Schema(message.into())
    }

    /// Create a row error.
    pub fn row(message: impl Into<String>) -> Self {
        Self::Row(message.into())
    }
}
