//! Ordered middleware stacks attached to routes, groups and routers

use super::{Middleware, MiddlewarePipeline, MiddlewareResolver, RoutePrefixMiddleware};
use std::fmt;
use std::sync::Arc;

/// One declared middleware
#[derive(Clone)]
pub enum MiddlewareEntry {
    /// Identifier resolved through a [`MiddlewareResolver`]
    Named(String),
    /// Concrete middleware instance
    Instance(Arc<dyn Middleware>),
    /// Named middleware that only runs for paths under `prefix`
    Prefixed { prefix: String, middleware: String },
}

impl MiddlewareEntry {
    /// Wrap a concrete middleware
    pub fn instance<M: Middleware + 'static>(middleware: M) -> Self {
        MiddlewareEntry::Instance(Arc::new(middleware))
    }

    /// Human readable label, used in logs and introspection
    pub fn label(&self) -> String {
        match self {
            MiddlewareEntry::Named(id) => id.clone(),
            MiddlewareEntry::Instance(middleware) => middleware.name().to_string(),
            MiddlewareEntry::Prefixed { prefix, middleware } => {
                format!("{}@{}", middleware, prefix)
            }
        }
    }

    fn resolve(&self, resolver: &dyn MiddlewareResolver) -> CursorStep {
        match self {
            MiddlewareEntry::Named(id) => match resolver.resolve(id) {
                Some(middleware) => CursorStep::Ready(middleware),
                None => CursorStep::Unresolved(id.clone()),
            },
            MiddlewareEntry::Instance(middleware) => CursorStep::Ready(Arc::clone(middleware)),
            MiddlewareEntry::Prefixed { prefix, middleware } => match resolver.resolve(middleware) {
                Some(inner) => CursorStep::Ready(Arc::new(RoutePrefixMiddleware::new(prefix.clone(), inner))),
                None => CursorStep::Unresolved(middleware.clone()),
            },
        }
    }
}

impl fmt::Debug for MiddlewareEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MiddlewareEntry::Named(id) => f.debug_tuple("Named").field(id).finish(),
            MiddlewareEntry::Instance(middleware) => {
                f.debug_tuple("Instance").field(&middleware.name()).finish()
            }
            MiddlewareEntry::Prefixed { prefix, middleware } => f
                .debug_struct("Prefixed")
                .field("prefix", prefix)
                .field("middleware", middleware)
                .finish(),
        }
    }
}

impl From<&str> for MiddlewareEntry {
    fn from(id: &str) -> Self {
        MiddlewareEntry::Named(id.to_string())
    }
}

impl From<String> for MiddlewareEntry {
    fn from(id: String) -> Self {
        MiddlewareEntry::Named(id)
    }
}

impl From<Arc<dyn Middleware>> for MiddlewareEntry {
    fn from(middleware: Arc<dyn Middleware>) -> Self {
        MiddlewareEntry::Instance(middleware)
    }
}

/// Ordered, mutable list of middleware entries
#[derive(Debug, Clone, Default)]
pub struct MiddlewareStack {
    entries: Vec<MiddlewareEntry>,
}

impl MiddlewareStack {
    /// Create an empty stack
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry
    pub fn push(&mut self, entry: MiddlewareEntry) {
        self.entries.push(entry);
    }

    /// Append each entry in order
    pub fn extend<I>(&mut self, entries: I)
    where
        I: IntoIterator<Item = MiddlewareEntry>,
    {
        self.entries.extend(entries);
    }

    /// Insert an entry in front of the others
    pub fn prepend(&mut self, entry: MiddlewareEntry) {
        self.entries.insert(0, entry);
    }

    /// Append a middleware that only runs when the request path starts with `prefix`
    pub fn route_prefix<P: Into<String>, M: Into<String>>(&mut self, prefix: P, middleware: M) {
        self.entries.push(MiddlewareEntry::Prefixed {
            prefix: prefix.into(),
            middleware: middleware.into(),
        });
    }

    /// Remove the front entry and resolve it
    ///
    /// Destructive: repeated calls drain the stack. Returns `None` once the
    /// stack is exhausted and also when the front identifier cannot be
    /// resolved; the unresolved entry is consumed either way. Dispatchers that
    /// need to tell the two apart use [`MiddlewareStack::cursor`].
    pub fn shift(&mut self, resolver: &dyn MiddlewareResolver) -> Option<Arc<dyn Middleware>> {
        if self.entries.is_empty() {
            return None;
        }

        let entry = self.entries.remove(0);
        match entry.resolve(resolver) {
            CursorStep::Ready(middleware) => Some(middleware),
            CursorStep::Unresolved(id) => {
                tracing::warn!(middleware = %id, "Middleware could not be resolved; skipping");
                None
            }
        }
    }

    /// The current entries, front first
    pub fn entries(&self) -> &[MiddlewareEntry] {
        &self.entries
    }

    /// Labels of the current entries, front first
    pub fn labels(&self) -> Vec<String> {
        self.entries.iter().map(MiddlewareEntry::label).collect()
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the stack has no entries
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Non-destructive cursor over the current entries
    pub fn cursor<'a>(&'a self, resolver: &'a dyn MiddlewareResolver) -> MiddlewareCursor<'a> {
        MiddlewareCursor::new(&self.entries, resolver)
    }
}

impl FromIterator<MiddlewareEntry> for MiddlewareStack {
    fn from_iter<I: IntoIterator<Item = MiddlewareEntry>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

/// Outcome of resolving one entry through a cursor
#[derive(Debug, Clone)]
pub enum CursorStep {
    /// The entry resolved to a middleware
    Ready(Arc<dyn Middleware>),
    /// The identifier is unknown to the resolver
    Unresolved(String),
}

/// Iterates over a snapshot of middleware entries without consuming them
///
/// `next()` returns `None` only when every entry has been visited, so an
/// unresolvable identifier is never mistaken for the end of the pipeline.
pub struct MiddlewareCursor<'a> {
    entries: &'a [MiddlewareEntry],
    position: usize,
    resolver: &'a dyn MiddlewareResolver,
}

impl<'a> MiddlewareCursor<'a> {
    /// Create a cursor positioned before the first entry
    pub fn new(entries: &'a [MiddlewareEntry], resolver: &'a dyn MiddlewareResolver) -> Self {
        Self {
            entries,
            position: 0,
            resolver,
        }
    }

    /// Number of entries not yet visited
    pub fn remaining(&self) -> usize {
        self.entries.len() - self.position
    }

    /// Resolve every remaining entry into a pipeline
    ///
    /// Fails with the first identifier that cannot be resolved.
    pub fn into_pipeline(self) -> Result<MiddlewarePipeline, String> {
        let mut pipeline = MiddlewarePipeline::new();
        for step in self {
            match step {
                CursorStep::Ready(middleware) => pipeline.push(middleware),
                CursorStep::Unresolved(id) => return Err(id),
            }
        }
        Ok(pipeline)
    }
}

impl Iterator for MiddlewareCursor<'_> {
    type Item = CursorStep;

    fn next(&mut self) -> Option<Self::Item> {
        let entry = self.entries.get(self.position)?;
        self.position += 1;
        Some(entry.resolve(self.resolver))
    }
}

/// Fluent middleware API shared by routes, route groups and routers
pub trait MiddlewareAware {
    /// The stack being configured
    fn middleware_stack(&self) -> &MiddlewareStack;

    /// Mutable access to the stack being configured
    fn middleware_stack_mut(&mut self) -> &mut MiddlewareStack;

    /// Append a middleware
    fn middleware<E: Into<MiddlewareEntry>>(&mut self, entry: E) -> &mut Self {
        self.middleware_stack_mut().push(entry.into());
        self
    }

    /// Append several middleware, keeping their order
    fn middlewares<I, E>(&mut self, entries: I) -> &mut Self
    where
        I: IntoIterator<Item = E>,
        E: Into<MiddlewareEntry>,
    {
        self.middleware_stack_mut()
            .extend(entries.into_iter().map(Into::into));
        self
    }

    /// Insert a middleware in front of the others
    fn prepend_middleware<E: Into<MiddlewareEntry>>(&mut self, entry: E) -> &mut Self {
        self.middleware_stack_mut().prepend(entry.into());
        self
    }

    /// Append a named middleware that only runs for paths under `prefix`
    fn route_prefix(&mut self, prefix: &str, middleware: &str) -> &mut Self {
        self.middleware_stack_mut().route_prefix(prefix, middleware);
        self
    }

    /// Remove and resolve the front middleware, see [`MiddlewareStack::shift`]
    fn shift_middleware(&mut self, resolver: &dyn MiddlewareResolver) -> Option<Arc<dyn Middleware>> {
        self.middleware_stack_mut().shift(resolver)
    }
}
