//! Core types for normchain-core.
//!
//! This module defines the data that flows through a dispatch chain: the
//! immutable [`Message`], its optional [`Meta`] block carrying the schema
//! directive, the [`Payload`] it transports, and the [`Normalized`] entity
//! graph a normalizer produces.
//!
//! Messages are always handled behind an [`Arc`]. Every field is itself an
//! `Arc`, so deriving a new message from an old one is a shallow copy: the
//! untouched fields stay pointer-equal to the original.

use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Normalized entity tables: entity-type name -> (id -> entity record).
///
/// Ids are stored as their string form because they become JSON object keys.
pub type Entities = BTreeMap<String, BTreeMap<String, Value>>;

// ---------------------------------------------------------------------------
// Normalized
// ---------------------------------------------------------------------------

/// The `{ result, entities }` graph produced by a normalizer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Normalized {
    /// The input with every entity replaced by its id.
    pub result: Value,
    /// Flattened entity records, grouped by entity type.
    #[serde(default)]
    pub entities: Entities,
}

impl Normalized {
    /// Render as the plain JSON object `{"result": .., "entities": ..}`.
    pub fn to_value(&self) -> Value {
        let entities = self
            .entities
            .iter()
            .map(|(kind, table)| {
                let table: Map<String, Value> = table
                    .iter()
                    .map(|(id, entity)| (id.clone(), entity.clone()))
                    .collect();
                (kind.clone(), Value::Object(table))
            })
            .collect();

        let mut out = Map::with_capacity(2);
        out.insert("result".to_string(), self.result.clone());
        out.insert("entities".to_string(), Value::Object(entities));
        Value::Object(out)
    }
}

// ---------------------------------------------------------------------------
// Payload
// ---------------------------------------------------------------------------

/// The data a message carries.
///
/// Incoming JSON always deserializes as [`Payload::Raw`]; only a normalizer
/// step produces [`Payload::Normalized`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Payload {
    Raw(Value),
    Normalized(Normalized),
}

impl Default for Payload {
    fn default() -> Self {
        Payload::Raw(Value::Null)
    }
}

impl<'de> Deserialize<'de> for Payload {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Value::deserialize(deserializer).map(Payload::Raw)
    }
}

impl From<Value> for Payload {
    fn from(value: Value) -> Self {
        Payload::Raw(value)
    }
}

impl From<Normalized> for Payload {
    fn from(normalized: Normalized) -> Self {
        Payload::Normalized(normalized)
    }
}

impl Payload {
    /// The raw value, if this payload has not been normalized.
    pub fn as_raw(&self) -> Option<&Value> {
        match self {
            Payload::Raw(v) => Some(v),
            Payload::Normalized(_) => None,
        }
    }

    /// The normalized graph, if any.
    pub fn as_normalized(&self) -> Option<&Normalized> {
        match self {
            Payload::Normalized(n) => Some(n),
            Payload::Raw(_) => None,
        }
    }

    /// JSON view of the payload. Borrowed for raw payloads; a normalized
    /// payload is rendered as `{result, entities}`.
    pub fn to_value(&self) -> std::borrow::Cow<'_, Value> {
        match self {
            Payload::Raw(v) => std::borrow::Cow::Borrowed(v),
            Payload::Normalized(n) => std::borrow::Cow::Owned(n.to_value()),
        }
    }
}

// ---------------------------------------------------------------------------
// Meta
// ---------------------------------------------------------------------------

/// The `meta` block of a message.
///
/// `schema` is the normalization directive. A missing key and an explicit
/// `null` both deserialize to `None`; an explicit `null` is written back on
/// serialization. Every other key lands in `rest` and is never touched by the
/// chain.
#[derive(Debug, Clone, PartialEq)]
pub struct Meta<S> {
    pub schema: Option<S>,
    pub rest: Map<String, Value>,
    null_schema: bool,
}

impl<S> Default for Meta<S> {
    fn default() -> Self {
        Self {
            schema: None,
            rest: Map::new(),
            null_schema: false,
        }
    }
}

/// Wire form of [`Meta`]: `Some(None)` is `"schema": null`.
#[derive(Deserialize)]
#[serde(bound(deserialize = "S: Deserialize<'de>"))]
struct RawMeta<S> {
    #[serde(default, deserialize_with = "present")]
    schema: Option<Option<S>>,
    #[serde(flatten)]
    rest: Map<String, Value>,
}

fn present<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}

impl<'de, S: Deserialize<'de>> Deserialize<'de> for Meta<S> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = RawMeta::<S>::deserialize(deserializer)?;
        Ok(Self {
            null_schema: matches!(raw.schema, Some(None)),
            schema: raw.schema.flatten(),
            rest: raw.rest,
        })
    }
}

impl<S: Serialize> Serialize for Meta<S> {
    fn serialize<Ser: Serializer>(&self, serializer: Ser) -> Result<Ser::Ok, Ser::Error> {
        let with_schema = self.schema.is_some() || self.null_schema;
        let mut map = serializer.serialize_map(Some(self.rest.len() + usize::from(with_schema)))?;
        if with_schema {
            map.serialize_entry("schema", &self.schema)?;
        }
        for (key, value) in &self.rest {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

impl<S> Meta<S> {
    /// A meta block carrying only a schema directive.
    pub fn with_schema(schema: S) -> Self {
        Self {
            schema: Some(schema),
            ..Self::default()
        }
    }

    /// Add a sibling field next to the directive.
    pub fn field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.rest.insert(key.into(), value.into());
        self
    }

    /// Convert the directive, keeping every sibling field.
    pub fn try_map_schema<T, E>(self, f: impl FnOnce(S) -> Result<T, E>) -> Result<Meta<T>, E> {
        Ok(Meta {
            schema: self.schema.map(f).transpose()?,
            rest: self.rest,
            null_schema: self.null_schema,
        })
    }
}

// ---------------------------------------------------------------------------
// Message
// ---------------------------------------------------------------------------

/// A dispatched message (action).
///
/// On the wire the discriminator is `"type"`; any top-level key other than
/// `type`, `payload` and `meta` is kept verbatim in [`Message::fields`].
#[derive(Debug, PartialEq, Serialize, Deserialize)]
pub struct Message<S> {
    #[serde(rename = "type")]
    pub kind: Arc<str>,
    #[serde(default)]
    pub payload: Arc<Payload>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<Arc<Meta<S>>>,
    #[serde(flatten)]
    pub fields: Arc<Map<String, Value>>,
}

// Manual impl: cloning shares every field, so `S` need not be `Clone`.
impl<S> Clone for Message<S> {
    fn clone(&self) -> Self {
        Self {
            kind: Arc::clone(&self.kind),
            payload: Arc::clone(&self.payload),
            meta: self.meta.clone(),
            fields: Arc::clone(&self.fields),
        }
    }
}

impl<S> Message<S> {
    /// A message of the given kind with a `null` payload and no meta.
    pub fn new(kind: impl Into<Arc<str>>) -> Self {
        Self {
            kind: kind.into(),
            payload: Arc::new(Payload::default()),
            meta: None,
            fields: Arc::new(Map::new()),
        }
    }

    pub fn with_payload(mut self, payload: impl Into<Payload>) -> Self {
        self.payload = Arc::new(payload.into());
        self
    }

    pub fn with_meta(mut self, meta: Meta<S>) -> Self {
        self.meta = Some(Arc::new(meta));
        self
    }

    /// Add a custom top-level field.
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        Arc::make_mut(&mut self.fields).insert(key.into(), value.into());
        self
    }

    /// The normalization directive, read from `meta.schema`.
    pub fn schema(&self) -> Option<&S> {
        self.meta.as_deref().and_then(|meta| meta.schema.as_ref())
    }

    /// Derive a new message with `payload` replaced.
    ///
    /// `kind`, `meta` and `fields` are shared with `self`, never cloned deeply.
    pub fn replace_payload(&self, payload: impl Into<Payload>) -> Self {
        Self {
            payload: Arc::new(payload.into()),
            ..self.clone()
        }
    }

    /// Resolve the directive into another schema representation.
    ///
    /// Used to turn a message parsed from JSON (`Message<Value>`) into a
    /// message whose directive is a real schema. `kind`, `payload` and
    /// `fields` stay shared.
    pub fn try_map_schema<T, E>(
        self,
        f: impl FnOnce(S) -> Result<T, E>,
    ) -> Result<Message<T>, E>
    where
        S: Clone,
    {
        let meta = match self.meta {
            Some(meta) => {
                let meta = Arc::try_unwrap(meta).unwrap_or_else(|shared| (*shared).clone());
                Some(Arc::new(meta.try_map_schema(f)?))
            }
            None => None,
        };
        Ok(Message {
            kind: self.kind,
            payload: self.payload,
            meta,
            fields: self.fields,
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
