//! normchain-schema — the default normalizer for normchain.
//!
//! Describes entity relationships with [`Schema`] values and flattens nested
//! JSON into a `{result, entities}` graph. [`SchemaNormalizer`] plugs this
//! into the [`Normalizer`] contract the normalization step consumes.
//!
//! Schemas can be built in code ([`EntitySchema`], [`array_of`],
//! [`Schema::object`]) or resolved from a JSON [`Catalog`].

pub mod catalog;
pub mod error;
pub mod normalize;
pub mod schema;

pub use catalog::Catalog;
pub use error::SchemaError;
pub use normalize::normalize;
pub use schema::{array_of, EntitySchema, Schema};

use normchain_core::{NormalizeError, Normalized, Normalizer};
use serde_json::Value;

/// [`Normalizer`] backed by [`normalize`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SchemaNormalizer;

impl Normalizer<Schema> for SchemaNormalizer {
    fn normalize(&self, data: &Value, schema: &Schema) -> Result<Normalized, NormalizeError> {
        normalize(data, schema)
    }
}
