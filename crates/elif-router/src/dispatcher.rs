//! Request dispatch
//!
//! Matches a request, builds the middleware pipeline for the matched route
//! from a snapshot of the router, group and route stacks, and runs the
//! resolved handler at the end of it.

use crate::container::ServiceContainer;
use crate::handler::HandlerResolver;
use crate::matcher::{PatternMatcher, RouteMatcher};
use crate::route::Route;
use crate::router::Router;
use axum::extract::Request;
use axum::http::{header, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use std::collections::HashMap;
use std::convert::Infallible;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use tower::Service;
use tracing::error;

/// Parameters of the matched route, stored in request extensions
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouteParams(pub HashMap<String, String>);

impl RouteParams {
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }
}

/// The matched route, stored in request extensions
#[derive(Debug, Clone)]
pub struct MatchedRoute(pub Arc<Route>);

/// Routes requests to handlers through their middleware
pub struct Dispatcher<M: PatternMatcher = RouteMatcher> {
    router: Arc<Router<M>>,
    container: Arc<ServiceContainer>,
}

impl<M: PatternMatcher> Clone for Dispatcher<M> {
    fn clone(&self) -> Self {
        Self {
            router: Arc::clone(&self.router),
            container: Arc::clone(&self.container),
        }
    }
}

impl<M: PatternMatcher> Dispatcher<M> {
    pub fn new(router: Arc<Router<M>>, container: Arc<ServiceContainer>) -> Self {
        Self { router, container }
    }

    pub fn router(&self) -> &Router<M> {
        &self.router
    }

    /// Route a request and produce its response
    ///
    /// Unknown paths give 404 and known paths with the wrong method give 405
    /// with an `Allow` header. A route whose middleware or handler cannot be
    /// resolved gives 500.
    pub async fn dispatch(&self, mut request: Request) -> Response {
        let result = self.router.match_request(&request);

        if result.is_method_failure() {
            return method_not_allowed(result.allowed_methods().unwrap_or_default());
        }
        let Some(route) = result.matched_route().cloned() else {
            return StatusCode::NOT_FOUND.into_response();
        };

        let snapshot = self.router.middleware_snapshot(&route);
        let pipeline = match snapshot.cursor(self.container.as_ref()).into_pipeline() {
            Ok(pipeline) => pipeline,
            Err(id) => {
                error!(route = %route.name(), middleware = %id, "Middleware could not be resolved");
                return StatusCode::INTERNAL_SERVER_ERROR.into_response();
            }
        };

        let Some(handler) = self.container.resolve_handler(route.handler()) else {
            error!(route = %route.name(), handler = ?route.handler(), "Handler could not be resolved");
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        };

        let extensions = request.extensions_mut();
        extensions.insert(RouteParams(result.matched_params().clone()));
        extensions.insert(MatchedRoute(route));

        pipeline.execute(request, handler).await
    }
}

fn method_not_allowed(allowed: &[Method]) -> Response {
    let allow = allowed
        .iter()
        .map(Method::as_str)
        .collect::<Vec<_>>()
        .join(", ");
    (StatusCode::METHOD_NOT_ALLOWED, [(header::ALLOW, allow)]).into_response()
}

impl<M: PatternMatcher + 'static> Service<Request> for Dispatcher<M> {
    type Response = Response;
    type Error = Infallible;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, request: Request) -> Self::Future {
        let dispatcher = self.clone();
        Box::pin(async move { Ok(dispatcher.dispatch(request).await) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collection::RouteCollection;
    use crate::middleware::testing::JournalMiddleware;
    use crate::middleware::MiddlewareAware;
    use axum::body::{to_bytes, Body};
    use std::sync::Mutex;
    use tower::ServiceExt;
    use tracing_test::traced_test;

    fn request(method: Method, uri: &str) -> Request {
        Request::builder().method(method).uri(uri).body(Body::empty()).unwrap()
    }

    async fn body_text(response: Response) -> String {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    fn container(journal: &Arc<Mutex<Vec<String>>>) -> ServiceContainer {
        let mut container = ServiceContainer::new();
        container
            .register_middleware("auth", JournalMiddleware::new("auth", journal))
            .register_middleware("admin", JournalMiddleware::new("admin", journal))
            .register_action("Posts", "edit", |req: Request| async move {
                let id = req
                    .extensions()
                    .get::<RouteParams>()
                    .and_then(|params| params.get("id"))
                    .unwrap_or("none")
                    .to_string();
                format!("edit {}", id)
            });
        container
    }

    fn dispatcher(router: Router, journal: &Arc<Mutex<Vec<String>>>) -> Dispatcher {
        Dispatcher::new(Arc::new(router), Arc::new(container(journal)))
    }

    #[tokio::test]
    async fn test_not_found_and_method_not_allowed() {
        let journal = Arc::new(Mutex::new(Vec::new()));
        let mut router = Router::new();
        router.get("/posts", "Posts::index", None).unwrap();
        router.post("/posts", "Posts::store", None).unwrap();
        let dispatcher = dispatcher(router, &journal);

        let response = dispatcher.dispatch(request(Method::GET, "/nope")).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let response = dispatcher.dispatch(request(Method::DELETE, "/posts")).await;
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(response.headers()[header::ALLOW], "GET, POST");
    }

    #[tokio::test]
    async fn test_runs_group_then_route_middleware() {
        let journal = Arc::new(Mutex::new(Vec::new()));
        let mut router = Router::new();
        router.middleware("auth");
        router
            .crud("/admin/posts", "Posts", "posts")
            .unwrap()
            .middleware("admin");
        let dispatcher = dispatcher(router, &journal);

        let response = dispatcher.dispatch(request(Method::GET, "/admin/posts/12")).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_text(response).await, "edit 12");
        assert_eq!(
            *journal.lock().unwrap(),
            vec!["before:auth", "before:admin", "after:admin", "after:auth"]
        );
    }

    #[tokio::test]
    async fn test_matched_route_extension() {
        let journal = Arc::new(Mutex::new(Vec::new()));
        let mut router = Router::new();
        router
            .get(
                "/whoami",
                crate::handler::Handler::function(|req: Request| async move {
                    req.extensions()
                        .get::<MatchedRoute>()
                        .map(|matched| matched.0.name().to_string())
                        .unwrap_or_default()
                }),
                Some("whoami"),
            )
            .unwrap();
        let dispatcher = dispatcher(router, &journal);

        let response = dispatcher.dispatch(request(Method::GET, "/whoami")).await;
        assert_eq!(body_text(response).await, "whoami");
    }

    #[tokio::test]
    #[traced_test]
    async fn test_unresolved_middleware_fails_closed() {
        let journal = Arc::new(Mutex::new(Vec::new()));
        let mut router = Router::new();
        router
            .get("/posts/{id}", "Posts::edit", Some("posts.edit"))
            .unwrap()
            .middleware("auth")
            .middleware("csrf");
        let dispatcher = dispatcher(router, &journal);

        let response = dispatcher.dispatch(request(Method::GET, "/posts/1")).await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(journal.lock().unwrap().is_empty());
        assert!(logs_contain("Middleware could not be resolved"));
    }

    #[tokio::test]
    #[traced_test]
    async fn test_unresolved_handler_fails_closed() {
        let journal = Arc::new(Mutex::new(Vec::new()));
        let mut router = Router::new();
        router.get("/home", "home", None).unwrap();
        let dispatcher = dispatcher(router, &journal);

        let response = dispatcher.dispatch(request(Method::GET, "/home")).await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(logs_contain("Handler could not be resolved"));
    }

    #[tokio::test]
    async fn test_tower_service() {
        let journal = Arc::new(Mutex::new(Vec::new()));
        let mut router = Router::new();
        router.get("/posts/{id}", "Posts::edit", None).unwrap();
        let dispatcher = dispatcher(router, &journal);

        let response = dispatcher
            .clone()
            .oneshot(request(Method::GET, "/posts/5"))
            .await
            .unwrap();
        assert_eq!(body_text(response).await, "edit 5");

        let response = dispatcher
            .oneshot(request(Method::GET, "/missing"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
