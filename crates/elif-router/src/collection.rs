//! Route registration shared by the router and route groups

use crate::error::{RouterError, RouterResult};
use crate::group::{GroupDefinition, GroupId, RouteGroup};
use crate::handler::Handler;
use crate::method::MethodSet;
use crate::route::Route;
use axum::http::Method;

/// Anything routes can be registered on
///
/// [`Router`](crate::Router) persists routes; [`RouteGroup`] prefixes them
/// and forwards to its parent collection.
pub trait RouteCollection {
    /// Persist a fully built route
    fn add_route(&mut self, route: Route) -> RouterResult<&mut Route>;

    /// Build and persist a route
    ///
    /// Without a name the route is named after its final path and methods.
    fn route(
        &mut self,
        path: &str,
        handler: Handler,
        name: Option<&str>,
        methods: MethodSet,
    ) -> RouterResult<&mut Route>;

    /// Allocate a group entry in the owning router
    fn register_group(&mut self, prefix: String, parent: Option<GroupId>) -> GroupId;

    /// Group entry created by [`register_group`](Self::register_group)
    fn group_entry(&self, id: GroupId) -> &GroupDefinition;

    fn group_entry_mut(&mut self, id: GroupId) -> &mut GroupDefinition;

    /// Full prefix and parent group for a group opened on this collection
    fn nested_scope(&self, prefix: &str) -> (String, Option<GroupId>);

    fn get<H: Into<Handler>>(&mut self, path: &str, handler: H, name: Option<&str>) -> RouterResult<&mut Route>
    where
        Self: Sized,
    {
        self.route(path, handler.into(), name, Method::GET.into())
    }

    fn post<H: Into<Handler>>(&mut self, path: &str, handler: H, name: Option<&str>) -> RouterResult<&mut Route>
    where
        Self: Sized,
    {
        self.route(path, handler.into(), name, Method::POST.into())
    }

    fn put<H: Into<Handler>>(&mut self, path: &str, handler: H, name: Option<&str>) -> RouterResult<&mut Route>
    where
        Self: Sized,
    {
        self.route(path, handler.into(), name, Method::PUT.into())
    }

    fn patch<H: Into<Handler>>(&mut self, path: &str, handler: H, name: Option<&str>) -> RouterResult<&mut Route>
    where
        Self: Sized,
    {
        self.route(path, handler.into(), name, Method::PATCH.into())
    }

    fn delete<H: Into<Handler>>(&mut self, path: &str, handler: H, name: Option<&str>) -> RouterResult<&mut Route>
    where
        Self: Sized,
    {
        self.route(path, handler.into(), name, Method::DELETE.into())
    }

    fn head<H: Into<Handler>>(&mut self, path: &str, handler: H, name: Option<&str>) -> RouterResult<&mut Route>
    where
        Self: Sized,
    {
        self.route(path, handler.into(), name, Method::HEAD.into())
    }

    fn options<H: Into<Handler>>(&mut self, path: &str, handler: H, name: Option<&str>) -> RouterResult<&mut Route>
    where
        Self: Sized,
    {
        self.route(path, handler.into(), name, Method::OPTIONS.into())
    }

    /// Register a route answering to every method
    fn any<H: Into<Handler>>(&mut self, path: &str, handler: H, name: Option<&str>) -> RouterResult<&mut Route>
    where
        Self: Sized,
    {
        self.route(path, handler.into(), name, MethodSet::any())
    }

    /// Open a group under `prefix` and run `builder` on it once
    ///
    /// The group is returned so more middleware or routes can be attached
    /// after the builder ran.
    fn group<F>(&mut self, prefix: &str, builder: F) -> RouterResult<RouteGroup<'_>>
    where
        Self: Sized,
        F: FnOnce(&mut RouteGroup<'_>) -> RouterResult<()>,
    {
        if prefix.trim_matches('/').is_empty() {
            return Err(RouterError::invalid_argument(format!(
                "Route group prefix cannot be empty: \"{}\"",
                prefix
            )));
        }

        let (full_prefix, parent) = self.nested_scope(prefix);
        let id = self.register_group(full_prefix.clone(), parent);
        let mut group = RouteGroup::new(id, full_prefix, self);
        builder(&mut group)?;
        Ok(group)
    }

    /// Register the conventional CRUD routes under `prefix`
    ///
    /// See [`RouteGroup::crud_actions`] for the six routes.
    fn crud(&mut self, prefix: &str, handler_base: &str, name_prefix: &str) -> RouterResult<RouteGroup<'_>>
    where
        Self: Sized,
    {
        self.group(prefix, |group| group.crud_actions(handler_base, name_prefix))
    }
}
