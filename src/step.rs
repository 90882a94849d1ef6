//! The chain link that rewrites payloads into normalized entity graphs.
//!
//! A message whose `meta.schema` is set is forwarded as a new message whose
//! payload is `normalize(payload, schema)`. The new message shares `kind`,
//! `meta` (directive included) and every custom field with the original.
//! A message without a directive is forwarded as the very same `Arc`.
//!
//! Normalizer failures surface as [`DispatchError::Normalize`] unchanged, and
//! nothing is forwarded in that case.

use normchain_core::config::StepConfig;
use normchain_core::{DispatchError, Message, Middleware, Next, Normalizer};
use normchain_schema::{Schema, SchemaNormalizer};
use std::fmt;
use std::sync::Arc;

// ---------------------------------------------------------------------------
// Options
// ---------------------------------------------------------------------------

/// Settings for a [`NormalizeStep`].
pub struct StepOptions<S> {
    /// Normalizer invoked for messages carrying a directive.
    pub normalizer: Arc<dyn Normalizer<S>>,
    /// Emit a debug event for every rewritten message.
    pub trace_directives: bool,
}

impl<S> StepOptions<S> {
    pub fn new(normalizer: impl Normalizer<S> + 'static) -> Self {
        Self {
            normalizer: Arc::new(normalizer),
            trace_directives: false,
        }
    }

    pub fn trace_directives(mut self, on: bool) -> Self {
        self.trace_directives = on;
        self
    }
}

impl StepOptions<Schema> {
    /// Default options with tracing taken from the `[step]` config section.
    pub fn from_config(config: &StepConfig) -> Self {
        Self::default().trace_directives(config.trace_directives)
    }
}

impl Default for StepOptions<Schema> {
    fn default() -> Self {
        Self::new(SchemaNormalizer)
    }
}

impl<S> Clone for StepOptions<S> {
    fn clone(&self) -> Self {
        Self {
            normalizer: Arc::clone(&self.normalizer),
            trace_directives: self.trace_directives,
        }
    }
}

// ---------------------------------------------------------------------------
// NormalizeStep
// ---------------------------------------------------------------------------

/// Chain link that normalizes payloads carrying a `meta.schema` directive.
pub struct NormalizeStep<S> {
    normalizer: Arc<dyn Normalizer<S>>,
    trace_directives: bool,
}

/// A step with the default [`SchemaNormalizer`].
pub fn create_step() -> NormalizeStep<Schema> {
    NormalizeStep::new(StepOptions::default())
}

impl<S> NormalizeStep<S> {
    pub fn new(options: StepOptions<S>) -> Self {
        Self {
            normalizer: options.normalizer,
            trace_directives: options.trace_directives,
        }
    }

    /// Process one message, handing the result to `forward`.
    ///
    /// `forward` runs exactly once unless the normalizer fails.
    pub fn apply<R>(
        &self,
        message: Arc<Message<S>>,
        forward: impl FnOnce(Arc<Message<S>>) -> Result<R, DispatchError>,
    ) -> Result<R, DispatchError> {
        let Some(schema) = message.schema() else {
            return forward(message);
        };

        let normalized = self.normalizer.normalize(&message.payload.to_value(), schema)?;

        if self.trace_directives {
            tracing::debug!(
                kind = %message.kind,
                entity_types = normalized.entities.len(),
                "payload normalized"
            );
        }

        forward(Arc::new(message.replace_payload(normalized)))
    }

    /// Bind the step to `forward`, producing the `message -> result` entry
    /// point of this link.
    pub fn link<R, F>(self, forward: F) -> impl Fn(Arc<Message<S>>) -> Result<R, DispatchError>
    where
        F: Fn(Arc<Message<S>>) -> Result<R, DispatchError>,
    {
        move |message| self.apply(message, &forward)
    }
}

impl<S, R> Middleware<S, R> for NormalizeStep<S> {
    fn handle(&self, message: Arc<Message<S>>, next: Next<'_, S, R>) -> Result<R, DispatchError> {
        self.apply(message, |message| next.run(message))
    }
}

impl<S> fmt::Debug for NormalizeStep<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NormalizeStep")
            .field("trace_directives", &self.trace_directives)
            .finish_non_exhaustive()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
