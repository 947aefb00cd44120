//! Route matching engine
//!
//! The router hands compiled route definitions to a [`PatternMatcher`] and
//! asks it to resolve request paths and to build URIs back from route names.
//! [`RouteMatcher`] is the default engine: static paths are looked up
//! directly, dynamic patterns are tried in priority order.

use crate::error::{RouterError, RouterResult};
use crate::method::MethodSet;
use crate::pattern::{normalize_path, RoutePattern};
use axum::http::Method;
use std::collections::HashMap;

/// Definition of a route to be compiled
#[derive(Debug, Clone)]
pub struct RouteDefinition {
    pub name: String,
    pub path: String,
    pub methods: MethodSet,
}

impl RouteDefinition {
    pub fn new<N: Into<String>, P: Into<String>>(name: N, path: P, methods: MethodSet) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            methods,
        }
    }
}

/// Options for URI generation
#[derive(Debug, Clone, Default)]
pub struct UriOptions {
    /// Values used for placeholders missing from the substitutions
    pub defaults: HashMap<String, String>,
}

impl UriOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a default placeholder value
    pub fn with_default<K: Into<String>, V: Into<String>>(mut self, key: K, value: V) -> Self {
        self.defaults.insert(key.into(), value.into());
        self
    }
}

/// Result of resolving a path and method
#[derive(Debug, Clone, PartialEq)]
pub enum MatchOutcome {
    /// A route accepts both path and method
    Matched {
        name: String,
        path: String,
        methods: MethodSet,
        params: HashMap<String, String>,
    },
    /// The path is known but no route on it accepts the method
    MethodNotAllowed { allowed: Vec<Method> },
    /// Nothing matches the path
    NotFound,
}

/// Pattern compilation, matching and reverse routing
pub trait PatternMatcher: Send + Sync + std::fmt::Debug {
    /// Compile and register a route definition
    fn compile(&mut self, definition: RouteDefinition) -> RouterResult<()>;

    /// Resolve a request path and method
    fn match_path(&self, path: &str, method: &Method) -> MatchOutcome;

    /// Build a URI for the route registered under `name`
    fn generate_uri(
        &self,
        name: &str,
        substitutions: &HashMap<String, String>,
        options: &UriOptions,
    ) -> RouterResult<String>;
}

#[derive(Debug, Clone)]
struct CompiledRoute {
    definition: RouteDefinition,
    pattern: RoutePattern,
    priority: usize,
}

/// Default pattern matcher
#[derive(Debug, Default)]
pub struct RouteMatcher {
    /// Every compiled route, in registration order
    routes: Vec<CompiledRoute>,
    /// Normalized static path -> route indices
    static_routes: HashMap<String, Vec<usize>>,
    /// Dynamic route indices sorted by priority
    dynamic_routes: Vec<usize>,
    /// Route name -> route index; the latest registration wins
    named: HashMap<String, usize>,
}

impl RouteMatcher {
    /// Create a new empty route matcher
    pub fn new() -> Self {
        Self::default()
    }

    /// Routes whose pattern matches `path`, most specific first
    fn candidates<'a>(
        &'a self,
        path: &'a str,
    ) -> impl Iterator<Item = (&'a CompiledRoute, HashMap<String, String>)> + 'a {
        let statics: &'a [usize] = self
            .static_routes
            .get(&normalize_path(path))
            .map(Vec::as_slice)
            .unwrap_or(&[]);

        let routes = &self.routes;
        statics
            .iter()
            .map(move |&index| (&routes[index], HashMap::new()))
            .chain(self.dynamic_routes.iter().filter_map(move |&index| {
                let route = &routes[index];
                route.pattern.capture(path).map(|params| (route, params))
            }))
    }

    /// Get statistics about the matcher
    pub fn stats(&self) -> MatcherStats {
        MatcherStats {
            static_routes: self.static_routes.values().map(Vec::len).sum(),
            dynamic_routes: self.dynamic_routes.len(),
            total_routes: self.routes.len(),
        }
    }

    /// Clear all routes
    pub fn clear(&mut self) {
        self.routes.clear();
        self.static_routes.clear();
        self.dynamic_routes.clear();
        self.named.clear();
    }
}

impl PatternMatcher for RouteMatcher {
    fn compile(&mut self, definition: RouteDefinition) -> RouterResult<()> {
        let pattern = RoutePattern::parse(&definition.path)?;
        let priority = pattern.priority();
        let index = self.routes.len();

        if pattern.is_static() {
            self.static_routes
                .entry(pattern.normalized_path())
                .or_default()
                .push(index);
        } else {
            // Stable insert: equal priorities keep registration order
            let position = self
                .dynamic_routes
                .partition_point(|&existing| self.routes[existing].priority <= priority);
            self.dynamic_routes.insert(position, index);
        }

        self.named.insert(definition.name.clone(), index);
        self.routes.push(CompiledRoute {
            definition,
            pattern,
            priority,
        });
        Ok(())
    }

    fn match_path(&self, path: &str, method: &Method) -> MatchOutcome {
        let mut allowed: Vec<Method> = Vec::new();
        let mut path_matched = false;

        for (route, params) in self.candidates(path) {
            if route.definition.methods.allows(method) {
                return MatchOutcome::Matched {
                    name: route.definition.name.clone(),
                    path: route.definition.path.clone(),
                    methods: route.definition.methods.clone(),
                    params,
                };
            }
            path_matched = true;
            if let Some(methods) = route.definition.methods.methods() {
                allowed.extend(methods.iter().cloned());
            }
        }

        if !path_matched {
            return MatchOutcome::NotFound;
        }

        allowed.sort_by(|a, b| a.as_str().cmp(b.as_str()));
        allowed.dedup();
        MatchOutcome::MethodNotAllowed { allowed }
    }

    fn generate_uri(
        &self,
        name: &str,
        substitutions: &HashMap<String, String>,
        options: &UriOptions,
    ) -> RouterResult<String> {
        let index = self
            .named
            .get(name)
            .ok_or_else(|| RouterError::route_not_found(name))?;
        self.routes[*index]
            .pattern
            .expand(name, substitutions, &options.defaults)
    }
}

/// Statistics about the route matcher
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatcherStats {
    pub static_routes: usize,
    pub dynamic_routes: usize,
    pub total_routes: usize,
}
