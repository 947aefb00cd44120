//! Router error types
//!
//! Registration and URI generation failures. Normal routing misses and
//! method mismatches are never errors; they are reported through
//! [`RouteResult`](crate::RouteResult).

use crate::pattern::RoutePatternError;
use thiserror::Error;

/// Result type for router operations
pub type RouterResult<T> = Result<T, RouterError>;

/// Errors raised while declaring routes or generating URIs
#[derive(Error, Debug)]
pub enum RouterError {
    #[error("Duplicate route detected; path \"{path}\" answering to methods [{methods}] (route \"{name}\" collides with \"{existing}\")")]
    DuplicateRoute {
        path: String,
        methods: String,
        name: String,
        existing: String,
    },

    #[error("Duplicate route name \"{name}\"; path \"{path}\" would shadow \"{existing_path}\"")]
    DuplicateName {
        name: String,
        path: String,
        existing_path: String,
    },

    #[error("Invalid argument: {message}")]
    InvalidArgument { message: String },

    #[error("Route not found: {name}")]
    RouteNotFound { name: String },

    #[error("Missing parameter \"{parameter}\" for route \"{route}\"")]
    MissingParameter { route: String, parameter: String },

    #[error("Parameter \"{parameter}\" for route \"{route}\" does not match `{constraint}`: {value}")]
    InvalidParameter {
        route: String,
        parameter: String,
        value: String,
        constraint: String,
    },

    #[error("Route pattern error: {0}")]
    Pattern(#[from] RoutePatternError),
}

impl RouterError {
    /// Create an invalid argument error
    pub fn invalid_argument<T: Into<String>>(message: T) -> Self {
        RouterError::InvalidArgument {
            message: message.into(),
        }
    }

    /// Create a route not found error
    pub fn route_not_found<T: Into<String>>(name: T) -> Self {
        RouterError::RouteNotFound { name: name.into() }
    }

    /// Create a missing parameter error
    pub fn missing_parameter<R: Into<String>, P: Into<String>>(route: R, parameter: P) -> Self {
        RouterError::MissingParameter {
            route: route.into(),
            parameter: parameter.into(),
        }
    }

    /// Whether this error reports a registration collision
    pub fn is_duplicate(&self) -> bool {
        matches!(
            self,
            RouterError::DuplicateRoute { .. } | RouterError::DuplicateName { .. }
        )
    }

    /// Whether this error reports a malformed argument
    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, RouterError::InvalidArgument { .. })
    }
}
