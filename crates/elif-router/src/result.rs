//! Outcome of matching a request against the router

use crate::route::Route;
use axum::http::Method;
use std::collections::HashMap;
use std::sync::Arc;

/// Which way a match attempt went
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteOutcome {
    Success,
    /// The path exists but not for the request method
    MethodFailure,
    NotFound,
}

/// Result of routing a request
#[derive(Debug, Clone)]
pub struct RouteResult {
    outcome: RouteOutcome,
    params: HashMap<String, String>,
    route: Option<Arc<Route>>,
    allowed_methods: Option<Vec<Method>>,
}

impl RouteResult {
    /// Successful match carrying the route and its parameters
    pub fn from_route(route: Arc<Route>, params: HashMap<String, String>) -> Self {
        Self {
            outcome: RouteOutcome::Success,
            params,
            route: Some(route),
            allowed_methods: None,
        }
    }

    /// Path matched, method did not
    pub fn from_method_failure(allowed_methods: Vec<Method>) -> Self {
        Self {
            outcome: RouteOutcome::MethodFailure,
            params: HashMap::new(),
            route: None,
            allowed_methods: Some(allowed_methods),
        }
    }

    pub fn not_found() -> Self {
        Self {
            outcome: RouteOutcome::NotFound,
            params: HashMap::new(),
            route: None,
            allowed_methods: None,
        }
    }

    pub fn outcome(&self) -> RouteOutcome {
        self.outcome
    }

    pub fn is_success(&self) -> bool {
        self.outcome == RouteOutcome::Success
    }

    /// Anything but a success
    pub fn is_failure(&self) -> bool {
        !self.is_success()
    }

    pub fn is_method_failure(&self) -> bool {
        self.outcome == RouteOutcome::MethodFailure
    }

    pub fn matched_route(&self) -> Option<&Arc<Route>> {
        self.route.as_ref()
    }

    pub fn matched_route_name(&self) -> Option<&str> {
        self.route.as_deref().map(Route::name)
    }

    /// Matched parameters; empty unless the match succeeded
    pub fn matched_params(&self) -> &HashMap<String, String> {
        &self.params
    }

    /// Methods the path accepts; only set on a method failure
    pub fn allowed_methods(&self) -> Option<&[Method]> {
        self.allowed_methods.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success() {
        let route = Arc::new(Route::new("/users/{id}", "Users::show", Some("users.show"), Method::GET.into()));
        let mut params = HashMap::new();
        params.insert("id".to_string(), "7".to_string());

        let result = RouteResult::from_route(route, params);
        assert!(result.is_success());
        assert!(!result.is_failure());
        assert!(!result.is_method_failure());
        assert_eq!(result.matched_route_name(), Some("users.show"));
        assert_eq!(result.matched_params().get("id"), Some(&"7".to_string()));
        assert!(result.allowed_methods().is_none());
    }

    #[test]
    fn test_method_failure() {
        let result = RouteResult::from_method_failure(vec![Method::GET, Method::POST]);
        assert!(result.is_failure());
        assert!(result.is_method_failure());
        assert_eq!(result.outcome(), RouteOutcome::MethodFailure);
        assert!(result.matched_route().is_none());
        assert!(result.matched_params().is_empty());
        assert_eq!(result.allowed_methods(), Some(&[Method::GET, Method::POST][..]));
    }

    #[test]
    fn test_not_found() {
        let result = RouteResult::not_found();
        assert!(result.is_failure());
        assert!(!result.is_method_failure());
        assert!(result.matched_route_name().is_none());
        assert!(result.allowed_methods().is_none());
    }
}
