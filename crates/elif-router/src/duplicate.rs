//! Duplicate route detection
//!
//! Two routes collide when their paths are the same template up to
//! placeholder names and their method sets overlap, or when they share a
//! name. The index lives and dies with the router that owns it.

use crate::error::{RouterError, RouterResult};
use crate::method::{MethodSet, METHOD_SEPARATOR};
use crate::pattern::split_path;
use crate::route::Route;
use std::collections::HashMap;

#[derive(Debug, Clone)]
struct RouteKey {
    methods: MethodSet,
    name: String,
}

/// Per-router index of registered paths and methods
#[derive(Debug, Default)]
pub struct DuplicateDetector {
    index: HashMap<String, Vec<RouteKey>>,
    names: HashMap<String, String>,
}

impl DuplicateDetector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail if `route` collides with a recorded route
    pub fn check(&self, route: &Route) -> RouterResult<()> {
        self.check_path(route)?;
        match self.names.get(route.name()) {
            Some(existing_path) => Err(RouterError::DuplicateName {
                name: route.name().to_string(),
                path: route.path().to_string(),
                existing_path: existing_path.clone(),
            }),
            None => Ok(()),
        }
    }

    fn check_path(&self, route: &Route) -> RouterResult<()> {
        let key = canonical_path(route.path());
        let Some(existing) = self.index.get(&key) else {
            return Ok(());
        };

        match existing.iter().find(|other| other.methods.overlaps(route.methods())) {
            Some(other) => Err(RouterError::DuplicateRoute {
                path: route.path().to_string(),
                methods: route.methods().joined(METHOD_SEPARATOR),
                name: route.name().to_string(),
                existing: other.name.clone(),
            }),
            None => Ok(()),
        }
    }

    /// Record `route` without checking it
    pub fn record(&mut self, route: &Route) {
        self.names
            .insert(route.name().to_string(), route.path().to_string());
        self.index
            .entry(canonical_path(route.path()))
            .or_default()
            .push(RouteKey {
                methods: route.methods().clone(),
                name: route.name().to_string(),
            });
    }

    /// Check `route` and record it when it does not collide
    pub fn detect_duplicate(&mut self, route: &Route) -> RouterResult<()> {
        self.check(route)?;
        self.record(route);
        Ok(())
    }

    /// Number of recorded routes
    pub fn len(&self) -> usize {
        self.index.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }
}

/// Path template with placeholder names erased (`/users/{id:\d+}` becomes `/users/{:\d+}`)
pub(crate) fn canonical_path(path: &str) -> String {
    let segments: Vec<String> = split_path(path)
        .into_iter()
        .map(|segment| {
            if segment.starts_with('{') && segment.ends_with('}') {
                match segment[1..segment.len() - 1].split_once(':') {
                    Some((_, constraint)) => format!("{{:{}}}", constraint.trim()),
                    None => "{}".to_string(),
                }
            } else if segment.starts_with('*') {
                "*".to_string()
            } else {
                segment.to_string()
            }
        })
        .collect();

    format!("/{}", segments.join("/"))
}
