//! Path-prefix scoped middleware

use super::{Middleware, Next, NextFuture};
use axum::extract::Request;
use std::sync::Arc;

/// Runs the wrapped middleware only for requests whose path starts with `prefix`
///
/// Other requests go straight to the rest of the chain.
#[derive(Debug)]
pub struct RoutePrefixMiddleware {
    prefix: String,
    inner: Arc<dyn Middleware>,
}

impl RoutePrefixMiddleware {
    pub fn new<P: Into<String>>(prefix: P, inner: Arc<dyn Middleware>) -> Self {
        Self {
            prefix: prefix.into(),
            inner,
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Whether the wrapped middleware applies to `path`
    pub fn applies_to(&self, path: &str) -> bool {
        path.starts_with(&self.prefix)
    }
}

impl Middleware for RoutePrefixMiddleware {
    fn handle(&self, request: Request, next: Next) -> NextFuture<'static> {
        if self.applies_to(request.uri().path()) {
            self.inner.handle(request, next)
        } else {
            Box::pin(next.run(request))
        }
    }

    fn name(&self) -> &'static str {
        "RoutePrefixMiddleware"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::Handler;
    use crate::middleware::testing::JournalMiddleware;
    use crate::middleware::MiddlewarePipeline;
    use axum::body::Body;
    use axum::http::StatusCode;
    use std::sync::Mutex;

    fn request(path: &str) -> Request {
        Request::builder().uri(path).body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn test_runs_only_under_prefix() {
        let journal = Arc::new(Mutex::new(Vec::new()));
        let inner: Arc<dyn Middleware> = Arc::new(JournalMiddleware::new("admin", &journal));
        let mut pipeline = MiddlewarePipeline::new();
        pipeline.push(Arc::new(RoutePrefixMiddleware::new("/admin", inner)));

        let Handler::Function(handler) = Handler::function(|_req: Request| async { StatusCode::OK }) else {
            unreachable!()
        };

        pipeline.execute(request("/admin/users"), handler.clone()).await;
        assert_eq!(*journal.lock().unwrap(), vec!["before:admin", "after:admin"]);

        journal.lock().unwrap().clear();
        let response = pipeline.execute(request("/blog"), handler).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert!(journal.lock().unwrap().is_empty());
    }
}
