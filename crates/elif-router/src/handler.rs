//! Handler identity for registered routes
//!
//! A route refers to its handler either directly (a function) or by name
//! (a service id or a `Class::method` action). Named handlers are resolved
//! lazily through a [`HandlerResolver`] when a request is dispatched.

use axum::extract::Request;
use axum::response::{IntoResponse, Response};
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

/// Boxed future returned by handlers
pub type HandlerFuture = Pin<Box<dyn Future<Output = Response> + Send + 'static>>;

/// Type-erased request handler
pub type HandlerFn = Arc<dyn Fn(Request) -> HandlerFuture + Send + Sync>;

/// Separator between the class and the method of an action handler
pub const ACTION_SEPARATOR: &str = "::";

/// Reference to the code that serves a route
#[derive(Clone)]
pub enum Handler {
    /// A handler function
    Function(HandlerFn),
    /// A service identifier resolved at dispatch time
    Service(String),
    /// A controller action resolved at dispatch time
    ClassMethod { class: String, method: String },
}

impl Handler {
    /// Wrap an async function as a handler
    pub fn function<F, Fut, R>(handler: F) -> Self
    where
        F: Fn(Request) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = R> + Send + 'static,
        R: IntoResponse + 'static,
    {
        Handler::Function(handler_fn(handler))
    }

    /// Reference a service by identifier
    pub fn service<S: Into<String>>(id: S) -> Self {
        Handler::Service(id.into())
    }

    /// Reference a controller action
    pub fn action<C: Into<String>, M: Into<String>>(class: C, method: M) -> Self {
        Handler::ClassMethod {
            class: class.into(),
            method: method.into(),
        }
    }

    /// Key under which a named handler is looked up, `None` for functions
    pub fn key(&self) -> Option<String> {
        match self {
            Handler::Function(_) => None,
            Handler::Service(id) => Some(id.clone()),
            Handler::ClassMethod { class, method } => {
                Some(format!("{}{}{}", class, ACTION_SEPARATOR, method))
            }
        }
    }

    /// Whether the handler must go through a resolver
    pub fn is_named(&self) -> bool {
        !matches!(self, Handler::Function(_))
    }
}

impl fmt::Debug for Handler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Handler::Function(_) => f.write_str("Handler::Function(..)"),
            Handler::Service(id) => f.debug_tuple("Handler::Service").field(id).finish(),
            Handler::ClassMethod { class, method } => f
                .debug_struct("Handler::ClassMethod")
                .field("class", class)
                .field("method", method)
                .finish(),
        }
    }
}

impl From<&str> for Handler {
    fn from(value: &str) -> Self {
        match value.split_once(ACTION_SEPARATOR) {
            Some((class, method)) if !class.is_empty() && !method.is_empty() => {
                Handler::action(class, method)
            }
            _ => Handler::service(value),
        }
    }
}

impl From<String> for Handler {
    fn from(value: String) -> Self {
        Handler::from(value.as_str())
    }
}

impl From<HandlerFn> for Handler {
    fn from(value: HandlerFn) -> Self {
        Handler::Function(value)
    }
}

/// Erase an async function into a [`HandlerFn`]
pub fn handler_fn<F, Fut, R>(handler: F) -> HandlerFn
where
    F: Fn(Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResponse + 'static,
{
    Arc::new(move |request: Request| {
        let future = handler(request);
        Box::pin(async move { future.await.into_response() }) as HandlerFuture
    })
}

/// Resolves named handlers into callable functions
pub trait HandlerResolver: Send + Sync {
    /// Resolve a handler; functions resolve to themselves
    fn resolve_handler(&self, handler: &Handler) -> Option<HandlerFn>;
}
