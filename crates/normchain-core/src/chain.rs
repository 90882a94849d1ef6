//! Dispatch chain: an ordered list of [`Middleware`] links ending in a sink.
//!
//! ```text
//! dispatch(msg) ──► link 0 ──► link 1 ──► … ──► sink
//! ```
//!
//! Each link receives the message and a [`Next`] handle. Calling
//! [`Next::run`] forwards a message to the following link (or the sink when
//! no link is left). `Next` is consumed by `run`, so a link can forward at
//! most once per message.
//!
//! Links are registered in order with [`ChainBuilder::with`]; the first
//! registered link sees the message first.

use crate::{DispatchError, Message};
use std::fmt;
use std::sync::Arc;

/// Terminal consumer of a chain.
pub type Sink<S, R> = dyn Fn(Arc<Message<S>>) -> Result<R, DispatchError> + Send + Sync;

// ---------------------------------------------------------------------------
// Middleware
// ---------------------------------------------------------------------------

/// A chain link.
pub trait Middleware<S, R>: Send + Sync {
    fn handle(&self, message: Arc<Message<S>>, next: Next<'_, S, R>) -> Result<R, DispatchError>;
}

impl<S, R, M> Middleware<S, R> for Arc<M>
where
    M: Middleware<S, R> + ?Sized,
{
    fn handle(&self, message: Arc<Message<S>>, next: Next<'_, S, R>) -> Result<R, DispatchError> {
        (**self).handle(message, next)
    }
}

impl<S, R, M> Middleware<S, R> for Box<M>
where
    M: Middleware<S, R> + ?Sized,
{
    fn handle(&self, message: Arc<Message<S>>, next: Next<'_, S, R>) -> Result<R, DispatchError> {
        (**self).handle(message, next)
    }
}

/// Closure-backed link, built with [`middleware_fn`].
pub struct FnMiddleware<F>(F);

/// Turn a closure into a [`Middleware`].
///
/// ```rust
/// # use normchain_core::{middleware_fn, Middleware};
/// let passthrough = middleware_fn::<(), (), _>(|message, next| next.run(message));
/// # fn check<M: Middleware<(), ()>>(_: &M) {}
/// # check(&passthrough);
/// ```
pub fn middleware_fn<S, R, F>(f: F) -> FnMiddleware<F>
where
    F: for<'a> Fn(Arc<Message<S>>, Next<'a, S, R>) -> Result<R, DispatchError> + Send + Sync,
{
    FnMiddleware(f)
}

impl<S, R, F> Middleware<S, R> for FnMiddleware<F>
where
    F: for<'a> Fn(Arc<Message<S>>, Next<'a, S, R>) -> Result<R, DispatchError> + Send + Sync,
{
    fn handle(&self, message: Arc<Message<S>>, next: Next<'_, S, R>) -> Result<R, DispatchError> {
        (self.0)(message, next)
    }
}

// ---------------------------------------------------------------------------
// Next
// ---------------------------------------------------------------------------

/// Continuation handed to a link: the rest of the chain.
pub struct Next<'a, S, R> {
    rest: &'a [Box<dyn Middleware<S, R>>],
    sink: &'a Sink<S, R>,
}

impl<'a, S, R> Next<'a, S, R> {
    /// Forward `message` to the following link, or to the sink.
    pub fn run(self, message: Arc<Message<S>>) -> Result<R, DispatchError> {
        match self.rest.split_first() {
            Some((link, rest)) => link.handle(
                message,
                Next {
                    rest,
                    sink: self.sink,
                },
            ),
            None => (self.sink)(message),
        }
    }

    /// Number of links still ahead, not counting the sink.
    pub fn remaining(&self) -> usize {
        self.rest.len()
    }
}

impl<S, R> fmt::Debug for Next<'_, S, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Next")
            .field("remaining", &self.rest.len())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Chain
// ---------------------------------------------------------------------------

/// A composed dispatch chain.
pub struct Chain<S, R> {
    links: Vec<Box<dyn Middleware<S, R>>>,
    sink: Box<Sink<S, R>>,
}

impl<S, R> Chain<S, R> {
    pub fn builder() -> ChainBuilder<S, R> {
        ChainBuilder { links: Vec::new() }
    }

    /// Run one message through every link and the sink.
    pub fn dispatch(&self, message: impl Into<Arc<Message<S>>>) -> Result<R, DispatchError> {
        let message = message.into();
        tracing::trace!(kind = %message.kind, links = self.links.len(), "dispatch");
        Next {
            rest: &self.links,
            sink: &*self.sink,
        }
        .run(message)
    }

    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }
}

impl<S, R> fmt::Debug for Chain<S, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Chain")
            .field("links", &self.links.len())
            .finish_non_exhaustive()
    }
}

/// Collects links before the sink is known.
pub struct ChainBuilder<S, R> {
    links: Vec<Box<dyn Middleware<S, R>>>,
}

impl<S, R> ChainBuilder<S, R> {
    /// Append a link. Links run in the order they are added.
    pub fn with<M>(mut self, link: M) -> Self
    where
        M: Middleware<S, R> + 'static,
    {
        self.links.push(Box::new(link));
        self
    }

    /// Close the chain with its terminal sink.
    pub fn build<F>(self, sink: F) -> Chain<S, R>
    where
        F: Fn(Arc<Message<S>>) -> Result<R, DispatchError> + Send + Sync + 'static,
    {
        Chain {
            links: self.links,
            sink: Box::new(sink),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
