//! Error types shared by every normchain layer.

use thiserror::Error;

/// Failure raised by a [`Normalizer`](crate::Normalizer).
///
/// `path` fields are JSON-pointer-like locations inside the payload
/// (`/articles/0/author`), `""` for the payload root.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NormalizeError {
    #[error("schema mismatch at {path:?}: expected {expected}, found {found}")]
    SchemaMismatch {
        path: String,
        expected: &'static str,
        found: &'static str,
    },

    #[error("{entity} entity at {path:?} has no id")]
    MissingId { entity: String, path: String },

    #[error("{entity} entity at {path:?} has an id that is neither a string nor a number")]
    InvalidId { entity: String, path: String },

    #[error("{0}")]
    Other(String),
}

/// Failure surfaced by [`Chain::dispatch`](crate::Chain::dispatch).
#[derive(Debug, Error)]
pub enum DispatchError {
    /// The normalizer failed; passed through as raised.
    #[error(transparent)]
    Normalize(#[from] NormalizeError),

    /// A link refused to forward the message.
    #[error("message {kind:?} rejected: {reason}")]
    Rejected { kind: String, reason: String },

    /// The terminal sink failed.
    #[error("sink failed: {0}")]
    Sink(String),
}

/// Short JSON type name, used in mismatch reports.
pub fn json_type_name(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}
