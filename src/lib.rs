//! normchain — payload normalization for middleware dispatch chains.
//!
//! A [`NormalizeStep`] sits in a [`Chain`] and watches for messages whose
//! `meta.schema` is set. Such a message is forwarded as a copy whose payload
//! has been flattened into a `{result, entities}` graph; every other message
//! passes through untouched.
//!
//! # Architecture
//!
//! ```text
//! dispatch ──► … ──► NormalizeStep ──► … ──► sink
//!                         │
//!                         └──► Normalizer (normchain-schema by default)
//! ```
//!
//! # Example
//!
//! ```rust
//! use normchain::{array_of, create_step, Chain, EntitySchema, Message, Meta, Schema};
//! use serde_json::json;
//! use std::sync::Arc;
//!
//! let user = EntitySchema::new("users");
//! let chain = Chain::builder()
//!     .with(create_step())
//!     .build(|m: Arc<Message<Schema>>| Ok(m));
//!
//! let out = chain
//!     .dispatch(
//!         Message::new("USERS_LOADED")
//!             .with_payload(json!([{"id": 1, "name": "Ann"}]))
//!             .with_meta(Meta::with_schema(array_of(&user))),
//!     )
//!     .unwrap();
//! assert_eq!(out.payload.as_normalized().unwrap().result, json!([1]));
//! ```

pub mod step;

pub use normchain_core::config::Config;
pub use normchain_core::{
    middleware_fn, Chain, ChainBuilder, DispatchError, Entities, Message, Meta, Middleware, Next,
    NormalizeError, Normalized, Normalizer, Payload,
};
pub use normchain_schema::{array_of, Catalog, EntitySchema, Schema, SchemaError, SchemaNormalizer};
pub use step::{create_step, NormalizeStep, StepOptions};

/// A message whose directive is a [`Schema`].
pub type Action = Message<Schema>;
