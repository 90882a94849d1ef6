use thiserror::Error;

/// Problems building a schema or resolving one from a [`Catalog`](crate::Catalog).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    #[error("entity {0:?} is already defined")]
    AlreadyDefined(String),

    #[error("unknown entity {0:?}")]
    UnknownEntity(String),

    #[error("invalid schema expression at {path:?}: {reason}")]
    InvalidExpression { path: String, reason: String },

    #[error("malformed catalog: {0}")]
    Catalog(String),
}
