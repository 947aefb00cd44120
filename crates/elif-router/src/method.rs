//! HTTP method sets accepted by a route

use crate::error::{RouterError, RouterResult};
use axum::http::Method;
use std::fmt;
use std::ops::Deref;

/// Separator used when a method set is folded into a route name
pub const METHOD_SEPARATOR: &str = ":";

/// The HTTP methods a route answers to
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum MethodSet {
    /// Any method is accepted
    Any,
    /// Only the listed methods are accepted
    Only(MethodList),
}

/// Non-empty, de-duplicated list of methods sorted by name
///
/// Only constructible through [`MethodSet`], so two equal sets always
/// produce the same default route name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MethodList(Vec<Method>);

impl MethodList {
    pub fn as_slice(&self) -> &[Method] {
        &self.0
    }
}

impl Deref for MethodList {
    type Target = [Method];

    fn deref(&self) -> &[Method] {
        &self.0
    }
}

impl MethodSet {
    /// Accept every method
    pub fn any() -> Self {
        MethodSet::Any
    }

    /// Accept a single method
    pub fn single(method: Method) -> Self {
        MethodSet::Only(MethodList(vec![method]))
    }

    /// Parse a list of method tokens
    ///
    /// Tokens are case-insensitive. An empty list and any token that is not
    /// purely alphabetic are rejected with [`RouterError::InvalidArgument`].
    pub fn parse<I, S>(tokens: I) -> RouterResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let tokens: Vec<String> = tokens
            .into_iter()
            .map(|token| token.as_ref().trim().to_string())
            .collect();

        if tokens.is_empty() {
            return Err(empty_methods());
        }

        let invalid: Vec<&str> = tokens
            .iter()
            .filter(|token| !is_method_token(token))
            .map(String::as_str)
            .collect();
        if !invalid.is_empty() {
            return Err(RouterError::invalid_argument(format!(
                "One or more HTTP methods were invalid: [{}]",
                invalid.join(", ")
            )));
        }

        let mut methods = Vec::with_capacity(tokens.len());
        for token in tokens {
            let method = Method::from_bytes(token.to_ascii_uppercase().as_bytes()).map_err(|_| {
                RouterError::invalid_argument(format!(
                    "One or more HTTP methods were invalid: [{}]",
                    token
                ))
            })?;
            methods.push(method);
        }

        Self::from_methods(methods)
    }

    /// Build an explicit set; fails on an empty list
    pub fn from_methods(mut methods: Vec<Method>) -> RouterResult<Self> {
        if methods.is_empty() {
            return Err(empty_methods());
        }
        methods.sort_by(|a, b| a.as_str().cmp(b.as_str()));
        methods.dedup();
        Ok(MethodSet::Only(MethodList(methods)))
    }

    /// Whether every method is accepted
    pub fn is_any(&self) -> bool {
        matches!(self, MethodSet::Any)
    }

    /// Whether `method` is accepted
    pub fn allows(&self, method: &Method) -> bool {
        match self {
            MethodSet::Any => true,
            MethodSet::Only(methods) => methods.contains(method),
        }
    }

    /// Case-insensitive variant of [`MethodSet::allows`]
    pub fn allows_str(&self, method: &str) -> bool {
        match self {
            MethodSet::Any => true,
            MethodSet::Only(methods) => methods
                .iter()
                .any(|allowed| allowed.as_str().eq_ignore_ascii_case(method)),
        }
    }

    /// The explicit methods, or `None` for [`MethodSet::Any`]
    pub fn methods(&self) -> Option<&[Method]> {
        match self {
            MethodSet::Any => None,
            MethodSet::Only(methods) => Some(methods.as_slice()),
        }
    }

    /// Whether a request could be accepted by both sets
    pub fn overlaps(&self, other: &MethodSet) -> bool {
        match (self, other) {
            (MethodSet::Any, _) | (_, MethodSet::Any) => true,
            (MethodSet::Only(left), MethodSet::Only(right)) => {
                left.iter().any(|method| right.contains(method))
            }
        }
    }

    /// Join the method names, `*` for any
    pub fn joined(&self, separator: &str) -> String {
        match self {
            MethodSet::Any => "*".to_string(),
            MethodSet::Only(methods) => methods
                .iter()
                .map(Method::as_str)
                .collect::<Vec<_>>()
                .join(separator),
        }
    }
}

impl Default for MethodSet {
    fn default() -> Self {
        MethodSet::Any
    }
}

impl From<Method> for MethodSet {
    fn from(method: Method) -> Self {
        MethodSet::single(method)
    }
}

impl TryFrom<Vec<Method>> for MethodSet {
    type Error = RouterError;

    fn try_from(methods: Vec<Method>) -> RouterResult<Self> {
        MethodSet::from_methods(methods)
    }
}

impl<const N: usize> TryFrom<[Method; N]> for MethodSet {
    type Error = RouterError;

    fn try_from(methods: [Method; N]) -> RouterResult<Self> {
        MethodSet::from_methods(methods.to_vec())
    }
}

impl fmt::Display for MethodSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.joined(", "))
    }
}

fn empty_methods() -> RouterError {
    RouterError::invalid_argument("HTTP methods argument was empty; must contain at least one method")
}

fn is_method_token(token: &str) -> bool {
    !token.is_empty() && token.chars().all(|c| c.is_ascii_alphabetic())
}
