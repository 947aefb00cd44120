//! Route groups for organizing related routes
//!
//! A group registers routes under a shared path prefix through its parent
//! collection (the router or an enclosing group) and stamps each of them
//! with its id. Group middleware lives in the router's group table and is
//! never copied into the routes' own stacks.

use crate::collection::RouteCollection;
use crate::error::{RouterError, RouterResult};
use crate::handler::Handler;
use crate::method::MethodSet;
use crate::middleware::{MiddlewareAware, MiddlewareStack};
use crate::route::Route;
use axum::http::Method;
use std::fmt;

/// Identifier of a group inside its router
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GroupId(usize);

impl GroupId {
    pub(crate) fn new(index: usize) -> Self {
        GroupId(index)
    }

    /// Position of the group in the router's group table
    pub fn index(&self) -> usize {
        self.0
    }
}

impl fmt::Display for GroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "group#{}", self.0)
    }
}

/// Stored state of a group, kept by the router after the builder returns
#[derive(Debug, Clone)]
pub struct GroupDefinition {
    pub id: GroupId,
    /// Full prefix, including enclosing group prefixes
    pub prefix: String,
    /// Enclosing group, if any
    pub parent: Option<GroupId>,
    pub middleware: MiddlewareStack,
}

impl GroupDefinition {
    pub fn new(id: GroupId, prefix: String, parent: Option<GroupId>) -> Self {
        Self {
            id,
            prefix,
            parent,
            middleware: MiddlewareStack::new(),
        }
    }
}

/// Registration scope sharing a path prefix
pub struct RouteGroup<'r> {
    id: GroupId,
    prefix: String,
    parent: &'r mut dyn RouteCollection,
}

impl<'r> RouteGroup<'r> {
    pub(crate) fn new(id: GroupId, prefix: String, parent: &'r mut dyn RouteCollection) -> Self {
        Self { id, prefix, parent }
    }

    pub fn id(&self) -> GroupId {
        self.id
    }

    /// Full prefix of this group
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Path of `path` inside this group
    ///
    /// `/` maps to the prefix itself; anything else is appended after a
    /// single slash.
    pub fn full_path(&self, path: &str) -> String {
        if path == "/" {
            self.prefix.clone()
        } else {
            format!("{}/{}", self.prefix, path.trim_start_matches('/'))
        }
    }

    /// Register the six conventional CRUD routes for `handler_base`
    pub fn crud_actions(&mut self, handler_base: &str, name_prefix: &str) -> RouterResult<()> {
        let id_path = r"/{id:\d+}";
        let actions: [(&str, Method, &str, &str); 6] = [
            ("/", Method::GET, "index", "index"),
            ("/new", Method::GET, "create", "create"),
            ("/new", Method::POST, "create", "create.post"),
            (id_path, Method::GET, "edit", "edit"),
            (id_path, Method::POST, "edit", "edit.post"),
            (id_path, Method::DELETE, "delete", "delete"),
        ];

        for (path, method, action, suffix) in actions {
            let name = format!("{}.{}", name_prefix, suffix);
            self.route(
                path,
                Handler::action(handler_base, action),
                Some(name.as_str()),
                method.into(),
            )?;
        }
        Ok(())
    }
}

impl fmt::Debug for RouteGroup<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouteGroup")
            .field("id", &self.id)
            .field("prefix", &self.prefix)
            .finish()
    }
}

impl RouteCollection for RouteGroup<'_> {
    fn add_route(&mut self, route: Route) -> RouterResult<&mut Route> {
        if !route.path().starts_with(&self.prefix) {
            return Err(RouterError::invalid_argument(format!(
                "Route path \"{}\" is outside group prefix \"{}\"",
                route.path(),
                self.prefix
            )));
        }

        let id = self.id;
        let prefix = self.prefix.clone();
        let route = self.parent.add_route(route)?;
        route.set_parent_group(id, &prefix);
        Ok(route)
    }

    fn route(
        &mut self,
        path: &str,
        handler: Handler,
        name: Option<&str>,
        methods: MethodSet,
    ) -> RouterResult<&mut Route> {
        let route = Route::new(&self.full_path(path), handler, name, methods);
        self.add_route(route)
    }

    fn register_group(&mut self, prefix: String, parent: Option<GroupId>) -> GroupId {
        self.parent.register_group(prefix, parent)
    }

    fn group_entry(&self, id: GroupId) -> &GroupDefinition {
        self.parent.group_entry(id)
    }

    fn group_entry_mut(&mut self, id: GroupId) -> &mut GroupDefinition {
        self.parent.group_entry_mut(id)
    }

    fn nested_scope(&self, prefix: &str) -> (String, Option<GroupId>) {
        (self.full_path(prefix), Some(self.id))
    }
}

impl MiddlewareAware for RouteGroup<'_> {
    fn middleware_stack(&self) -> &MiddlewareStack {
        &self.parent.group_entry(self.id).middleware
    }

    fn middleware_stack_mut(&mut self) -> &mut MiddlewareStack {
        &mut self.parent.group_entry_mut(self.id).middleware
    }
}
