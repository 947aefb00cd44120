//! In-process service container
//!
//! Maps identifiers to middleware and handlers so routes can refer to them
//! by name. Applications with their own DI container implement
//! [`MiddlewareResolver`] and [`HandlerResolver`] directly instead.

use crate::handler::{handler_fn, Handler, HandlerFn, HandlerResolver, ACTION_SEPARATOR};
use crate::middleware::{Middleware, MiddlewareResolver};
use axum::extract::Request;
use axum::response::IntoResponse;
use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

/// Named middleware and handlers
#[derive(Clone, Default)]
pub struct ServiceContainer {
    middleware: HashMap<String, Arc<dyn Middleware>>,
    handlers: HashMap<String, HandlerFn>,
}

impl ServiceContainer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register middleware under `id`
    pub fn register_middleware<I, M>(&mut self, id: I, middleware: M) -> &mut Self
    where
        I: Into<String>,
        M: Middleware + 'static,
    {
        self.middleware.insert(id.into(), Arc::new(middleware));
        self
    }

    /// Register a handler for `Handler::Service(id)`
    pub fn register_handler<I, F, Fut, R>(&mut self, id: I, handler: F) -> &mut Self
    where
        I: Into<String>,
        F: Fn(Request) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = R> + Send + 'static,
        R: IntoResponse + 'static,
    {
        self.handlers.insert(id.into(), handler_fn(handler));
        self
    }

    /// Register a handler for `Handler::ClassMethod { class, method }`
    pub fn register_action<F, Fut, R>(&mut self, class: &str, method: &str, handler: F) -> &mut Self
    where
        F: Fn(Request) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = R> + Send + 'static,
        R: IntoResponse + 'static,
    {
        let key = format!("{}{}{}", class, ACTION_SEPARATOR, method);
        self.register_handler(key, handler)
    }

    pub fn has_middleware(&self, id: &str) -> bool {
        self.middleware.contains_key(id)
    }

    pub fn has_handler(&self, key: &str) -> bool {
        self.handlers.contains_key(key)
    }
}

impl MiddlewareResolver for ServiceContainer {
    fn resolve(&self, id: &str) -> Option<Arc<dyn Middleware>> {
        self.middleware.get(id).cloned()
    }
}

impl HandlerResolver for ServiceContainer {
    fn resolve_handler(&self, handler: &Handler) -> Option<HandlerFn> {
        match handler {
            Handler::Function(function) => Some(Arc::clone(function)),
            named => named.key().and_then(|key| self.handlers.get(&key).cloned()),
        }
    }
}

impl fmt::Debug for ServiceContainer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut middleware: Vec<&String> = self.middleware.keys().collect();
        middleware.sort();
        let mut handlers: Vec<&String> = self.handlers.keys().collect();
        handlers.sort();

        f.debug_struct("ServiceContainer")
            .field("middleware", &middleware)
            .field("handlers", &handlers)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::middleware::testing::JournalMiddleware;
    use axum::body::Body;
    use axum::http::StatusCode;
    use std::sync::Mutex;

    #[test]
    fn test_middleware_resolution() {
        let journal = Arc::new(Mutex::new(Vec::new()));
        let mut container = ServiceContainer::new();
        container.register_middleware("auth", JournalMiddleware::new("auth", &journal));

        assert!(container.has_middleware("auth"));
        assert_eq!(container.resolve("auth").map(|m| m.name()), Some("auth"));
        assert!(container.resolve("csrf").is_none());
    }

    #[tokio::test]
    async fn test_handler_resolution() {
        let mut container = ServiceContainer::new();
        container
            .register_handler("home", |_req: Request| async { "home" })
            .register_action("Posts", "index", |_req: Request| async { StatusCode::ACCEPTED });

        assert!(container.has_handler("Posts::index"));

        let action = container
            .resolve_handler(&Handler::from("Posts::index"))
            .unwrap();
        assert_eq!(action(Request::new(Body::empty())).await.status(), StatusCode::ACCEPTED);

        assert!(container.resolve_handler(&Handler::service("home")).is_some());
        assert!(container.resolve_handler(&Handler::service("missing")).is_none());
        assert!(container
            .resolve_handler(&Handler::function(|_req: Request| async { "inline" }))
            .is_some());
    }
}
