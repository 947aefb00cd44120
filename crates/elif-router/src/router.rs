//! Route registry
//!
//! The router owns every registered route, hands their patterns to a
//! [`PatternMatcher`] and turns matcher outcomes into [`RouteResult`]s.
//! Registration needs `&mut Router`; once built the router can be shared
//! behind an `Arc` and matched from any number of tasks.

use crate::collection::RouteCollection;
use crate::config::RouterConfig;
use crate::duplicate::DuplicateDetector;
use crate::error::RouterResult;
use crate::group::{GroupDefinition, GroupId};
use crate::handler::Handler;
use crate::matcher::{MatchOutcome, PatternMatcher, RouteDefinition, RouteMatcher, UriOptions};
use crate::method::MethodSet;
use crate::middleware::{MiddlewareAware, MiddlewareStack};
use crate::result::RouteResult;
use crate::route::Route;
use axum::http::{Method, Request};
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};
use tracing::{debug, info, trace};

/// Main router
#[derive(Debug)]
pub struct Router<M: PatternMatcher = RouteMatcher> {
    config: RouterConfig,
    matcher: M,
    /// Registered routes by name; a later registration replaces an earlier one
    routes: HashMap<String, Arc<Route>>,
    detector: Option<DuplicateDetector>,
    groups: Vec<GroupDefinition>,
    middleware: MiddlewareStack,
    /// Routes built on the fly for matcher entries unknown to `routes`
    synthesized: RwLock<HashMap<String, Arc<Route>>>,
}

impl Router {
    /// Create a router with the default matcher and configuration
    pub fn new() -> Self {
        Self::with_config(RouterConfig::default())
    }

    pub fn with_config(config: RouterConfig) -> Self {
        Self::with_matcher(RouteMatcher::new(), config)
    }
}

impl Default for Router {
    fn default() -> Self {
        Self::new()
    }
}

impl<M: PatternMatcher> Router<M> {
    /// Create a router on top of a custom pattern matcher
    pub fn with_matcher(matcher: M, config: RouterConfig) -> Self {
        let detector = config.detect_duplicates.then(DuplicateDetector::new);
        Self {
            config,
            matcher,
            routes: HashMap::new(),
            detector,
            groups: Vec::new(),
            middleware: MiddlewareStack::new(),
            synthesized: RwLock::new(HashMap::new()),
        }
    }

    pub fn config(&self) -> &RouterConfig {
        &self.config
    }

    pub fn detects_duplicates(&self) -> bool {
        self.detector.is_some()
    }

    pub fn matcher(&self) -> &M {
        &self.matcher
    }

    /// Direct access to the matcher
    ///
    /// Patterns compiled here bypass the registry; matching one of them
    /// yields a synthesized route.
    pub fn matcher_mut(&mut self) -> &mut M {
        &mut self.matcher
    }

    /// Look up a route by name
    pub fn get_route(&self, name: &str) -> Option<Arc<Route>> {
        if let Some(route) = self.routes.get(name) {
            return Some(Arc::clone(route));
        }
        self.synthesized
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .cloned()
    }

    /// Every registered route, in no particular order
    pub fn routes(&self) -> impl Iterator<Item = &Arc<Route>> {
        self.routes.values()
    }

    pub fn route_count(&self) -> usize {
        self.routes.len()
    }

    pub fn group_definition(&self, id: GroupId) -> Option<&GroupDefinition> {
        self.groups.get(id.index())
    }

    pub fn groups(&self) -> &[GroupDefinition] {
        &self.groups
    }

    /// Groups enclosing `route`, outermost first
    pub fn group_chain(&self, route: &Route) -> Vec<&GroupDefinition> {
        let mut chain = Vec::new();
        let mut current = route.parent_group();
        while let Some(id) = current {
            let Some(definition) = self.group_definition(id) else {
                break;
            };
            chain.push(definition);
            current = definition.parent;
        }
        chain.reverse();
        chain
    }

    /// Everything that runs before `route`'s handler, in order
    ///
    /// Router middleware first, then each enclosing group from the outermost
    /// in, then the route's own stack. The stored stacks are left untouched.
    pub fn middleware_snapshot(&self, route: &Route) -> MiddlewareStack {
        let mut snapshot = self.middleware.clone();
        for group in self.group_chain(route) {
            snapshot.extend(group.middleware.entries().iter().cloned());
        }
        snapshot.extend(route.middleware_stack().entries().iter().cloned());
        snapshot
    }

    /// Match a method and path
    pub fn resolve(&self, method: &Method, path: &str) -> RouteResult {
        match self.matcher.match_path(path, method) {
            MatchOutcome::Matched {
                name,
                path: template,
                methods,
                params,
            } => {
                let route = match self.get_route(&name) {
                    Some(route) => route,
                    None => self.synthesize(name, &template, methods),
                };
                debug!(route = %route.name(), method = %method, path = %path, "Route matched");
                RouteResult::from_route(route, params)
            }
            MatchOutcome::MethodNotAllowed { allowed } => {
                debug!(method = %method, path = %path, "Method not allowed");
                RouteResult::from_method_failure(allowed)
            }
            MatchOutcome::NotFound => {
                trace!(method = %method, path = %path, "No route matched");
                RouteResult::not_found()
            }
        }
    }

    /// Match an incoming request by its method and URI path
    pub fn match_request<B>(&self, request: &Request<B>) -> RouteResult {
        self.resolve(request.method(), request.uri().path())
    }

    /// Build the URI of the route named `name`
    pub fn generate_uri(
        &self,
        name: &str,
        substitutions: &HashMap<String, String>,
        options: &UriOptions,
    ) -> RouterResult<String> {
        self.matcher.generate_uri(name, substitutions, options)
    }

    fn synthesize(&self, name: String, template: &str, methods: MethodSet) -> Arc<Route> {
        let route = Arc::new(Route::new(
            template,
            Handler::service(name.clone()),
            Some(&name),
            methods,
        ));
        debug!(route = %name, path = %template, "Synthesized route for matcher-only pattern");

        if self.config.cache_synthesized_routes {
            self.synthesized
                .write()
                .unwrap_or_else(PoisonError::into_inner)
                .insert(name, Arc::clone(&route));
        }
        route
    }
}

impl<M: PatternMatcher> RouteCollection for Router<M> {
    fn add_route(&mut self, route: Route) -> RouterResult<&mut Route> {
        if let Some(detector) = &self.detector {
            detector.check(&route)?;
        }

        self.matcher.compile(RouteDefinition::new(
            route.name(),
            route.path(),
            route.methods().clone(),
        ))?;

        if let Some(detector) = &mut self.detector {
            detector.record(&route);
        }

        debug!(
            route = %route.name(),
            path = %route.path(),
            methods = %route.methods(),
            "Registered route"
        );

        let slot = match self.routes.entry(route.name().to_string()) {
            Entry::Occupied(mut entry) => {
                debug!(route = %route.name(), "Route name already registered, replacing");
                entry.insert(Arc::new(route));
                entry.into_mut()
            }
            Entry::Vacant(entry) => entry.insert(Arc::new(route)),
        };
        Ok(Arc::make_mut(slot))
    }

    fn route(
        &mut self,
        path: &str,
        handler: Handler,
        name: Option<&str>,
        methods: MethodSet,
    ) -> RouterResult<&mut Route> {
        self.add_route(Route::new(path, handler, name, methods))
    }

    fn register_group(&mut self, prefix: String, parent: Option<GroupId>) -> GroupId {
        let id = GroupId::new(self.groups.len());
        info!(group = %id, prefix = %prefix, "Registered route group");
        self.groups.push(GroupDefinition::new(id, prefix, parent));
        id
    }

    fn group_entry(&self, id: GroupId) -> &GroupDefinition {
        &self.groups[id.index()]
    }

    fn group_entry_mut(&mut self, id: GroupId) -> &mut GroupDefinition {
        &mut self.groups[id.index()]
    }

    fn nested_scope(&self, prefix: &str) -> (String, Option<GroupId>) {
        (prefix.to_string(), None)
    }
}

impl<M: PatternMatcher> MiddlewareAware for Router<M> {
    fn middleware_stack(&self) -> &MiddlewareStack {
        &self.middleware
    }

    fn middleware_stack_mut(&mut self) -> &mut MiddlewareStack {
        &mut self.middleware
    }
}
