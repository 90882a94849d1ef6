//! JSON-declared schemas.
//!
//! A catalog names every entity once and lets messages refer to schemas with
//! a small expression language:
//!
//! | Expression        | Schema                         |
//! |-------------------|--------------------------------|
//! | `"user"`          | the entity named `user`        |
//! | `["user"]`        | array of that entity           |
//! | `{"author": ..}`  | object with per-key schemas    |
//!
//! Catalog document:
//!
//! ```json
//! {
//!   "entities": {
//!     "articles":    { "fields": { "author": "users", "collections": ["collections"] } },
//!     "collections": { "fields": { "curator": "users" } },
//!     "users":       { "id_attribute": "id" }
//!   }
//! }
//! ```
//!
//! An entity's `key` (the `entities` table it fills) defaults to its name.

use crate::schema::{array_of, EntitySchema, Schema, DEFAULT_ID_ATTRIBUTE};
use crate::SchemaError;
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct CatalogDoc {
    #[serde(default)]
    entities: BTreeMap<String, EntityDecl>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct EntityDecl {
    key: Option<String>,
    #[serde(default = "default_id_attribute")]
    id_attribute: String,
    #[serde(default)]
    fields: BTreeMap<String, Value>,
}

fn default_id_attribute() -> String { DEFAULT_ID_ATTRIBUTE.to_string() }

/// Named entities resolved from a catalog document.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    entities: BTreeMap<String, EntitySchema>,
}

impl Catalog {
    /// Parse a catalog from JSON text.
    pub fn from_json(text: &str) -> Result<Self, SchemaError> {
        let value: Value =
            serde_json::from_str(text).map_err(|e| SchemaError::Catalog(e.to_string()))?;
        Self::from_value(value)
    }

    /// Build a catalog from an already-parsed document.
    pub fn from_value(value: Value) -> Result<Self, SchemaError> {
        let doc: CatalogDoc =
            serde_json::from_value(value).map_err(|e| SchemaError::Catalog(e.to_string()))?;

        // Create every entity first so definitions can refer to any of them.
        let entities = doc
            .entities
            .iter()
            .map(|(name, decl)| {
                let key = decl.key.clone().unwrap_or_else(|| name.clone());
                let entity = EntitySchema::declared(name.clone(), key, decl.id_attribute.clone());
                (name.clone(), entity)
            })
            .collect();
        let catalog = Catalog { entities };

        for (name, decl) in &doc.entities {
            let fields = decl
                .fields
                .iter()
                .map(|(field, expr)| {
                    catalog
                        .resolve_at(expr, &format!("/entities/{name}/fields/{field}"))
                        .map(|schema| (field.clone(), schema))
                })
                .collect::<Result<Vec<_>, _>>()?;
            catalog.entities[name].define(fields)?;
        }

        tracing::debug!(entities = catalog.entities.len(), "schema catalog loaded");
        Ok(catalog)
    }

    /// Look up an entity by catalog name.
    pub fn entity(&self, name: &str) -> Option<&EntitySchema> {
        self.entities.get(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entities.keys().map(String::as_str)
    }

    /// Turn a schema expression into a [`Schema`].
    pub fn resolve(&self, expr: &Value) -> Result<Schema, SchemaError> {
        self.resolve_at(expr, "")
    }

    fn resolve_at(&self, expr: &Value, path: &str) -> Result<Schema, SchemaError> {
        match expr {
            Value::String(name) => self
                .entity(name)
                .map(Schema::from)
                .ok_or_else(|| SchemaError::UnknownEntity(name.clone())),
            Value::Array(items) => match items.as_slice() {
                [inner] => Ok(array_of(self.resolve_at(inner, &format!("{path}/0"))?)),
                _ => Err(SchemaError::InvalidExpression {
                    path: path.to_string(),
                    reason: format!("array expression needs exactly one element, got {}", items.len()),
                }),
            },
            Value::Object(fields) => fields
                .iter()
                .map(|(key, inner)| {
                    self.resolve_at(inner, &format!("{path}/{key}"))
                        .map(|schema| (key.clone(), schema))
                })
                .collect::<Result<BTreeMap<_, _>, _>>()
                .map(Schema::Object),
            other => Err(SchemaError::InvalidExpression {
                path: path.to_string(),
                reason: format!(
                    "expected an entity name, array or object, found {}",
                    normchain_core::error::json_type_name(other)
                ),
            }),
        }
    }
}
