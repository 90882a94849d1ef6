//! The normalizer contract.
//!
//! A normalizer flattens nested data into a [`Normalized`] `{result, entities}`
//! graph according to a schema descriptor `S`. The descriptor is opaque to
//! the chain; only the normalizer understands it.

use crate::{NormalizeError, Normalized};
use serde_json::Value;

/// Pure function `(data, schema) -> {result, entities}`.
pub trait Normalizer<S>: Send + Sync {
    fn normalize(&self, data: &Value, schema: &S) -> Result<Normalized, NormalizeError>;
}

/// Closures with the right shape are normalizers.
impl<S, F> Normalizer<S> for F
where
    F: Fn(&Value, &S) -> Result<Normalized, NormalizeError> + Send + Sync,
{
    fn normalize(&self, data: &Value, schema: &S) -> Result<Normalized, NormalizeError> {
        self(data, schema)
    }
}
