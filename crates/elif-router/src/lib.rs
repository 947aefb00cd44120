//! # elif-router
//!
//! Named-route registry for the elif.rs web framework.
//!
//! - Routes with names, method sets, handler references and middleware stacks
//! - Route groups that share a path prefix and their own middleware
//! - Duplicate detection on path and methods
//! - Match results that tell a 404 from a 405
//! - URI generation from route names
//! - A dispatcher that runs router, group and route middleware around the handler
//!
//! ```ignore
//! use elif_router::{Router, RouteCollection, MiddlewareAware};
//!
//! let mut router = Router::new();
//! router.get("/", "HomeController::index", Some("home"))?;
//! router
//!     .crud("/posts", "PostController", "posts")?
//!     .middleware("auth");
//!
//! let result = router.resolve(&Method::GET, "/posts/12");
//! assert_eq!(result.matched_route_name(), Some("posts.edit"));
//! ```

pub mod collection;
pub mod config;
pub mod container;
pub mod dispatcher;
pub mod duplicate;
pub mod error;
pub mod group;
pub mod handler;
pub mod logging;
pub mod matcher;
pub mod method;
pub mod middleware;
pub mod pattern;
pub mod result;
pub mod route;
pub mod router;

pub use collection::RouteCollection;
pub use config::{ConfigError, RouterConfig, RouterDefaults};
pub use container::ServiceContainer;
pub use dispatcher::{Dispatcher, MatchedRoute, RouteParams};
pub use duplicate::DuplicateDetector;
pub use error::{RouterError, RouterResult};
pub use group::{GroupDefinition, GroupId, RouteGroup};
pub use handler::{handler_fn, Handler, HandlerFn, HandlerFuture, HandlerResolver};
pub use logging::{init_logging, LogFormat, LoggingConfig};
pub use matcher::{MatchOutcome, MatcherStats, PatternMatcher, RouteDefinition, RouteMatcher, UriOptions};
pub use method::{MethodList, MethodSet};
pub use middleware::{
    CursorStep, Middleware, MiddlewareAware, MiddlewareCursor, MiddlewareEntry, MiddlewarePipeline,
    MiddlewareResolver, MiddlewareStack, Next, NextFuture, RoutePrefixMiddleware,
};
pub use pattern::{ParamConstraint, PathSegment, RoutePattern, RoutePatternError};
pub use result::{RouteOutcome, RouteResult};
pub use route::Route;
pub use router::Router;

// Common HTTP types
pub use axum::http::Method;
