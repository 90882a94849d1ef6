//! Test builders: message constructors and a recording sink.
//!
//! These are designed for readability in test assertions, not for production
//! use. They panic on invalid input rather than returning `Result`.

use crate::common::fixtures::{article_response, article_schema};
use normchain::{Action, Chain, DispatchError, Message, Meta, Middleware, Schema};
use serde_json::Value;
use std::sync::{Arc, Mutex};

// ---------------------------------------------------------------------------
// Messages
// ---------------------------------------------------------------------------

/// `{type: "FOO", payload: article_response(), meta: {schema: article_schema()}}`
pub fn foo_action() -> Arc<Action> {
    Arc::new(
        Message::new("FOO")
            .with_payload(article_response())
            .with_meta(Meta::with_schema(article_schema())),
    )
}

/// Like [`foo_action`] but `meta` also carries unrelated siblings.
pub fn foo_action_with_siblings() -> Arc<Action> {
    Arc::new(
        Message::new("FOO")
            .with_payload(article_response())
            .with_meta(
                Meta::with_schema(article_schema())
                    .field("some", "other")
                    .field("meta", "data"),
            ),
    )
}

/// A message of `kind` with `payload` and no directive.
pub fn plain_action(kind: &str, payload: Value) -> Arc<Action> {
    Arc::new(Message::new(kind).with_payload(payload))
}

// ---------------------------------------------------------------------------
// Recorder
// ---------------------------------------------------------------------------

/// Sink that keeps every message it receives, in order.
#[derive(Default)]
pub struct Recorder {
    seen: Mutex<Vec<Arc<Action>>>,
}

impl Recorder {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn record(&self, message: Arc<Action>) {
        self.seen.lock().unwrap().push(message);
    }

    pub fn calls(&self) -> usize {
        self.seen.lock().unwrap().len()
    }

    pub fn all(&self) -> Vec<Arc<Action>> {
        self.seen.lock().unwrap().clone()
    }

    /// The only recorded message; panics unless exactly one was seen.
    pub fn single(&self) -> Arc<Action> {
        let seen = self.seen.lock().unwrap();
        assert_eq!(seen.len(), 1, "expected exactly one forwarded message");
        Arc::clone(&seen[0])
    }
}

/// Chain of `links` ending in a sink that records into `recorder`.
pub fn recording_chain(
    links: Vec<Box<dyn Middleware<Schema, ()>>>,
    recorder: &Arc<Recorder>,
) -> Chain<Schema, ()> {
    let recorder = Arc::clone(recorder);
    links
        .into_iter()
        .fold(Chain::builder(), |builder, link| builder.with(link))
        .build(move |message| {
            recorder.record(message);
            Ok::<(), DispatchError>(())
        })
}
