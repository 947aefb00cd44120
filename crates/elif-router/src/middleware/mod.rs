//! Middleware for routed requests
//!
//! Middleware follows the `handle(request, next)` pattern. Routes, route
//! groups and the router each carry a [`MiddlewareStack`]; a dispatcher
//! snapshots those stacks into a [`MiddlewarePipeline`] per request instead
//! of draining the shared stacks.

pub mod prefix;
pub mod stack;

pub use prefix::RoutePrefixMiddleware;
pub use stack::{CursorStep, MiddlewareAware, MiddlewareCursor, MiddlewareEntry, MiddlewareStack};

use crate::handler::HandlerFn;
use axum::extract::Request;
use axum::response::Response;
use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

/// Future produced by a middleware step
pub type NextFuture<'a> = Pin<Box<dyn Future<Output = Response> + Send + 'a>>;

type Continuation = Box<dyn FnOnce(Request) -> NextFuture<'static> + Send>;

/// Remainder of the chain after the current middleware
pub struct Next {
    rest: Continuation,
}

impl Next {
    pub fn new<F>(rest: F) -> Self
    where
        F: FnOnce(Request) -> NextFuture<'static> + Send + 'static,
    {
        Self { rest: Box::new(rest) }
    }

    /// Hand `request` to the remaining middleware and the handler
    pub async fn run(self, request: Request) -> Response {
        (self.rest)(request).await
    }
}

/// Request middleware
///
/// Implementations may inspect or replace the request, short-circuit with
/// their own response, or call `next` and post-process what comes back.
pub trait Middleware: Send + Sync + std::fmt::Debug {
    fn handle(&self, request: Request, next: Next) -> NextFuture<'static>;

    /// Label used in logs
    fn name(&self) -> &'static str {
        "Middleware"
    }
}

/// Turns middleware identifiers into instances
pub trait MiddlewareResolver: Send + Sync {
    fn resolve(&self, id: &str) -> Option<Arc<dyn Middleware>>;
}

impl MiddlewareResolver for HashMap<String, Arc<dyn Middleware>> {
    fn resolve(&self, id: &str) -> Option<Arc<dyn Middleware>> {
        self.get(id).cloned()
    }
}

/// Resolved middleware for a single dispatch, outermost first
#[derive(Debug, Clone, Default)]
pub struct MiddlewarePipeline {
    layers: Vec<Arc<dyn Middleware>>,
}

impl MiddlewarePipeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an innermost layer
    pub fn push(&mut self, middleware: Arc<dyn Middleware>) {
        self.layers.push(middleware);
    }

    /// Run `request` through every layer and finally `handler`
    pub async fn execute(&self, request: Request, handler: HandlerFn) -> Response {
        let innermost: Continuation = Box::new(move |req: Request| handler(req));
        let chain = self.layers.iter().rev().fold(innermost, |rest, layer| {
            let layer = Arc::clone(layer);
            Box::new(move |req: Request| layer.handle(req, Next { rest })) as Continuation
        });
        chain(request).await
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.layers.iter().map(|layer| layer.name()).collect()
    }
}

impl From<Vec<Arc<dyn Middleware>>> for MiddlewarePipeline {
    fn from(layers: Vec<Arc<dyn Middleware>>) -> Self {
        Self { layers }
    }
}
