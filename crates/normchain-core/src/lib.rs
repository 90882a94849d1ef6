//! normchain-core — message model and dispatch chain for normchain.
//!
//! This crate holds everything the normalization step and its host share:
//! the immutable [`Message`] record, the [`Normalizer`] contract, the
//! [`Middleware`] chain that carries messages to a sink, and configuration.
//!
//! # Architecture
//!
//! ```text
//! dispatch ──► Middleware ──► Middleware ──► … ──► sink
//!                  │
//!                  └──► Normalizer (payload, schema) -> {result, entities}
//! ```
//!
//! Everything is synchronous; a dispatch returns once the sink returns.

pub mod chain;
pub mod config;
pub mod error;
pub mod normalizer;
pub mod types;

pub use chain::{middleware_fn, Chain, ChainBuilder, FnMiddleware, Middleware, Next, Sink};
pub use error::{DispatchError, NormalizeError};
pub use normalizer::Normalizer;
pub use types::{Entities, Message, Meta, Normalized, Payload};
