//! The normalization walk.
//!
//! `normalize` walks `data` alongside a [`Schema`]. Every object matched by
//! an entity schema is moved into `entities[key][id]` and replaced by its id
//! in the result. Records seen twice are shallow-merged, later fields win.
//!
//! `null` and scalars are returned unchanged whatever the schema says, so a
//! missing relation (`"author": null`) or an already-flattened id passes
//! through.

use crate::schema::{EntitySchema, Schema};
use normchain_core::error::json_type_name;
use normchain_core::{Entities, NormalizeError, Normalized};
use serde_json::{Map, Value};

/// Flatten `data` according to `schema`.
pub fn normalize(data: &Value, schema: &Schema) -> Result<Normalized, NormalizeError> {
    let mut entities = Entities::new();
    let result = visit(data, schema, &mut entities, "")?;
    tracing::trace!(entity_types = entities.len(), "payload normalized");
    Ok(Normalized { result, entities })
}

fn visit(
    data: &Value,
    schema: &Schema,
    entities: &mut Entities,
    path: &str,
) -> Result<Value, NormalizeError> {
    if !matches!(data, Value::Object(_) | Value::Array(_)) {
        return Ok(data.clone());
    }
    match schema {
        Schema::Entity(entity) => visit_entity(data, entity, entities, path),
        Schema::Array(inner) => visit_array(data, inner, entities, path),
        Schema::Object(fields) => {
            let obj = expect_object(data, path)?;
            visit_fields(obj, fields.iter().map(|(k, s)| (k.as_str(), s)), entities, path)
                .map(Value::Object)
        }
    }
}

fn visit_entity(
    data: &Value,
    entity: &EntitySchema,
    entities: &mut Entities,
    path: &str,
) -> Result<Value, NormalizeError> {
    let obj = expect_object(data, path)?;
    let id = obj.get(entity.id_attribute()).cloned().unwrap_or(Value::Null);
    let id_key = match &id {
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.clone(),
        Value::Null => {
            return Err(NormalizeError::MissingId {
                entity: entity.key().to_string(),
                path: path.to_string(),
            })
        }
        _ => {
            return Err(NormalizeError::InvalidId {
                entity: entity.key().to_string(),
                path: path.to_string(),
            })
        }
    };

    let record = visit_fields(obj, entity.fields(), entities, path)?;

    let table = entities.entry(entity.key().to_string()).or_default();
    match table.get_mut(&id_key) {
        Some(Value::Object(existing)) => existing.extend(record),
        _ => {
            table.insert(id_key, Value::Object(record));
        }
    }
    Ok(id)
}

fn visit_array(
    data: &Value,
    inner: &Schema,
    entities: &mut Entities,
    path: &str,
) -> Result<Value, NormalizeError> {
    let Value::Array(items) = data else {
        return Err(mismatch(path, "array", data));
    };
    items
        .iter()
        .enumerate()
        .map(|(i, item)| visit(item, inner, entities, &format!("{path}/{i}")))
        .collect::<Result<Vec<_>, _>>()
        .map(Value::Array)
}

/// Copy `obj`, replacing each listed field that is present with its
/// normalized form.
fn visit_fields<'s>(
    obj: &Map<String, Value>,
    fields: impl IntoIterator<Item = (&'s str, &'s Schema)>,
    entities: &mut Entities,
    path: &str,
) -> Result<Map<String, Value>, NormalizeError> {
    let mut out = obj.clone();
    for (name, schema) in fields {
        if let Some(value) = obj.get(name) {
            let child = visit(value, schema, entities, &format!("{path}/{name}"))?;
            out.insert(name.to_string(), child);
        }
    }
    Ok(out)
}

fn expect_object<'v>(data: &'v Value, path: &str) -> Result<&'v Map<String, Value>, NormalizeError> {
    data.as_object().ok_or_else(|| mismatch(path, "object", data))
}

fn mismatch(path: &str, expected: &'static str, found: &Value) -> NormalizeError {
    NormalizeError::SchemaMismatch {
        path: path.to_string(),
        expected,
        found: json_type_name(found),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
