//! Route definitions
//!
//! A [`Route`] describes one endpoint: its path template, name, accepted
//! methods, handler reference and middleware stack, plus optional
//! host/port/scheme metadata and a free-form options bag.

use crate::group::GroupId;
use crate::handler::Handler;
use crate::method::{MethodSet, METHOD_SEPARATOR};
use crate::middleware::{MiddlewareAware, MiddlewareStack};
use axum::http::Method;
use serde_json::Value;
use std::collections::HashMap;

/// Separator between path and methods in generated route names
pub const NAME_METHOD_SEPARATOR: &str = "^";

/// A single registered endpoint
#[derive(Debug, Clone)]
pub struct Route {
    path: String,
    name: String,
    methods: MethodSet,
    handler: Handler,
    middleware: MiddlewareStack,
    options: HashMap<String, Value>,
    host: Option<String>,
    port: Option<u16>,
    schemes: Option<Vec<String>>,
    group: Option<GroupId>,
}

impl Route {
    /// Create a route
    ///
    /// Without an explicit name the route is named after its path, followed
    /// by `^` and the sorted methods joined with `:` unless it accepts any
    /// method (`/test^GET:POST`).
    pub fn new<H: Into<Handler>>(path: &str, handler: H, name: Option<&str>, methods: MethodSet) -> Self {
        let name = name
            .map(str::to_string)
            .unwrap_or_else(|| default_name(path, &methods));

        Self {
            path: path.to_string(),
            name,
            methods,
            handler: handler.into(),
            middleware: MiddlewareStack::new(),
            options: HashMap::new(),
            host: None,
            port: None,
            schemes: None,
            group: None,
        }
    }

    /// The path template
    pub fn path(&self) -> &str {
        &self.path
    }

    /// The unique route name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The accepted methods
    pub fn methods(&self) -> &MethodSet {
        &self.methods
    }

    /// The explicit accepted methods, `None` when any method is accepted
    pub fn allowed_methods(&self) -> Option<&[Method]> {
        self.methods.methods()
    }

    /// The handler reference
    pub fn handler(&self) -> &Handler {
        &self.handler
    }

    /// Whether `method` is accepted (case-insensitive)
    pub fn allows_method(&self, method: &str) -> bool {
        self.methods.allows_str(method)
    }

    /// Whether every method is accepted
    pub fn allows_any_method(&self) -> bool {
        self.methods.is_any()
    }

    pub fn options(&self) -> &HashMap<String, Value> {
        &self.options
    }

    /// Replace the options bag
    pub fn set_options(&mut self, options: HashMap<String, Value>) -> &mut Self {
        self.options = options;
        self
    }

    /// Set a single option
    pub fn option<K: Into<String>, V: Into<Value>>(&mut self, key: K, value: V) -> &mut Self {
        self.options.insert(key.into(), value.into());
        self
    }

    pub fn host(&self) -> Option<&str> {
        self.host.as_deref()
    }

    pub fn set_host<H: Into<String>>(&mut self, host: H) -> &mut Self {
        self.host = Some(host.into());
        self
    }

    pub fn port(&self) -> Option<u16> {
        self.port
    }

    pub fn set_port(&mut self, port: u16) -> &mut Self {
        self.port = Some(port);
        self
    }

    /// Accepted schemes, `None` when any scheme is accepted
    pub fn schemes(&self) -> Option<&[String]> {
        self.schemes.as_deref()
    }

    /// Restrict the route to the given schemes (stored lowercase)
    pub fn set_schemes<I, S>(&mut self, schemes: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut schemes: Vec<String> = schemes
            .into_iter()
            .map(|scheme| scheme.as_ref().to_ascii_lowercase())
            .collect();
        schemes.sort();
        schemes.dedup();
        self.schemes = if schemes.is_empty() { None } else { Some(schemes) };
        self
    }

    /// Shorthand for a single scheme
    pub fn set_scheme(&mut self, scheme: &str) -> &mut Self {
        self.set_schemes([scheme])
    }

    /// Whether `scheme` is accepted (case-insensitive)
    pub fn allows_scheme(&self, scheme: &str) -> bool {
        match &self.schemes {
            None => true,
            Some(schemes) => schemes.iter().any(|s| s.eq_ignore_ascii_case(scheme)),
        }
    }

    pub fn allows_any_scheme(&self) -> bool {
        self.schemes.is_none()
    }

    /// The innermost group that registered this route
    pub fn parent_group(&self) -> Option<GroupId> {
        self.group
    }

    /// Attach the route to a group
    ///
    /// The assignment only happens when the route path starts with the
    /// group prefix; otherwise the route is left ungrouped and `false` is
    /// returned.
    pub fn set_parent_group(&mut self, group: GroupId, prefix: &str) -> bool {
        if !self.path.starts_with(prefix) {
            tracing::warn!(
                route = %self.name,
                path = %self.path,
                prefix = %prefix,
                "Route path is outside the group prefix; group not assigned"
            );
            return false;
        }
        self.group = Some(group);
        true
    }
}

impl MiddlewareAware for Route {
    fn middleware_stack(&self) -> &MiddlewareStack {
        &self.middleware
    }

    fn middleware_stack_mut(&mut self) -> &mut MiddlewareStack {
        &mut self.middleware
    }
}

/// Default route name for `path` and `methods`
pub fn default_name(path: &str, methods: &MethodSet) -> String {
    match methods {
        MethodSet::Any => path.to_string(),
        MethodSet::Only(_) => format!(
            "{}{}{}",
            path,
            NAME_METHOD_SEPARATOR,
            methods.joined(METHOD_SEPARATOR)
        ),
    }
}
