//! Schema descriptors: entities, arrays of a schema, and object shapes.
//!
//! ```rust
//! use normchain_schema::{array_of, EntitySchema, Schema};
//!
//! let user = EntitySchema::new("users");
//! let article = EntitySchema::new("articles");
//! article.define([("author", Schema::from(&user))]).unwrap();
//!
//! let schema = Schema::object([("articles", array_of(&article))]);
//! ```
//!
//! Entities are shared handles: cloning an [`EntitySchema`] or embedding it in
//! several schemas refers to the same definition, so definitions may point at
//! each other. A definition that refers back to its own entity forms an `Arc`
//! cycle and is never freed; schemas are expected to live for the process.

use crate::SchemaError;
use serde::{Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, OnceLock};

pub const DEFAULT_ID_ATTRIBUTE: &str = "id";

// ---------------------------------------------------------------------------
// EntitySchema
// ---------------------------------------------------------------------------

/// A named entity type whose records are collected under `entities[key]`.
#[derive(Clone)]
pub struct EntitySchema(Arc<EntityInner>);

struct EntityInner {
    name: String,
    key: String,
    id_attribute: String,
    definition: OnceLock<BTreeMap<String, Schema>>,
}

impl EntitySchema {
    pub fn new(key: impl Into<String>) -> Self {
        Self::with_id_attribute(key, DEFAULT_ID_ATTRIBUTE)
    }

    /// An entity whose id lives under `id_attribute` instead of `"id"`.
    pub fn with_id_attribute(key: impl Into<String>, id_attribute: impl Into<String>) -> Self {
        let key = key.into();
        Self::declared(key.clone(), key, id_attribute)
    }

    /// An entity referred to as `name` in schema expressions while filling
    /// `entities[key]`.
    pub fn declared(
        name: impl Into<String>,
        key: impl Into<String>,
        id_attribute: impl Into<String>,
    ) -> Self {
        Self(Arc::new(EntityInner {
            name: name.into(),
            key: key.into(),
            id_attribute: id_attribute.into(),
            definition: OnceLock::new(),
        }))
    }

    /// Declare which fields of this entity hold nested schemas.
    ///
    /// May be called once; entities without a definition are stored as-is.
    pub fn define<K, I>(&self, fields: I) -> Result<(), SchemaError>
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, Schema)>,
    {
        let fields = fields.into_iter().map(|(k, s)| (k.into(), s)).collect();
        self.0
            .definition
            .set(fields)
            .map_err(|_| SchemaError::AlreadyDefined(self.0.key.clone()))
    }

    /// Name used in schema expressions. Equal to the key unless declared
    /// otherwise.
    pub fn name(&self) -> &str {
        &self.0.name
    }

    pub fn key(&self) -> &str {
        &self.0.key
    }

    pub fn id_attribute(&self) -> &str {
        &self.0.id_attribute
    }

    /// Nested field schemas, empty until [`define`](Self::define) is called.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &Schema)> {
        self.0
            .definition
            .get()
            .into_iter()
            .flat_map(|def| def.iter().map(|(k, s)| (k.as_str(), s)))
    }

    pub fn ptr_eq(&self, other: &EntitySchema) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

// Definitions are left out: they may be cyclic.
impl fmt::Debug for EntitySchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntitySchema")
            .field("name", &self.0.name)
            .field("key", &self.0.key)
            .field("id_attribute", &self.0.id_attribute)
            .finish_non_exhaustive()
    }
}

// ---------------------------------------------------------------------------
// Schema
// ---------------------------------------------------------------------------

/// A schema descriptor.
#[derive(Debug, Clone)]
pub enum Schema {
    /// One entity record.
    Entity(EntitySchema),
    /// An array whose every element follows the inner schema.
    Array(Box<Schema>),
    /// An object whose listed keys follow their schemas; other keys are copied.
    Object(BTreeMap<String, Schema>),
}

impl Schema {
    pub fn object<K, I>(fields: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, Schema)>,
    {
        Schema::Object(fields.into_iter().map(|(k, s)| (k.into(), s)).collect())
    }
}

/// Schema for an array of `schema`.
pub fn array_of(schema: impl Into<Schema>) -> Schema {
    Schema::Array(Box::new(schema.into()))
}

impl From<EntitySchema> for Schema {
    fn from(entity: EntitySchema) -> Self {
        Schema::Entity(entity)
    }
}

impl From<&EntitySchema> for Schema {
    fn from(entity: &EntitySchema) -> Self {
        Schema::Entity(entity.clone())
    }
}

/// Serializes to the expression form a [`Catalog`](crate::Catalog) reads:
/// an entity is its name, an array is a one-element array, an object is an
/// object of expressions.
impl Serialize for Schema {
    fn serialize<Ser: Serializer>(&self, serializer: Ser) -> Result<Ser::Ok, Ser::Error> {
        match self {
            Schema::Entity(entity) => serializer.serialize_str(entity.name()),
            Schema::Array(inner) => [inner.as_ref()].serialize(serializer),
            Schema::Object(fields) => fields.serialize(serializer),
        }
    }
}
