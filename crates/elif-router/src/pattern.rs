//! Path templates
//!
//! A template is split on `/` into segments. Each segment is literal text,
//! a placeholder (`{name}` or `{name:regex}`), or a trailing catch-all
//! (`*name`) that swallows the rest of the path. A regex must match the
//! whole segment.

use crate::error::{RouterError, RouterResult};
use regex::Regex;
use std::collections::HashMap;
use thiserror::Error;

/// Template compile errors
#[derive(Error, Debug)]
pub enum RoutePatternError {
    #[error("Invalid pattern syntax: {0}")]
    InvalidSyntax(String),
    #[error("Only one catch-all segment is allowed")]
    MultipleCatchAll,
    #[error("Catch-all must be the final segment")]
    CatchAllNotLast,
    #[error("Invalid placeholder regex: {0}")]
    InvalidConstraint(String),
    #[error("Placeholder `{0}` appears more than once")]
    DuplicateParameter(String),
}

/// What a placeholder accepts
#[derive(Debug, Clone)]
pub enum ParamConstraint {
    /// Any non-empty segment
    None,
    /// Segments matching `source` in full
    Regex { source: String, regex: Regex },
}

impl ParamConstraint {
    /// Compile a constraint from its regex source
    ///
    /// A placeholder covers a single segment, so a regex that accepts `/`
    /// is rejected; multi-segment values belong in a `*name` catch-all.
    pub fn regex(source: &str) -> Result<Self, RoutePatternError> {
        let regex = Regex::new(&format!("^(?:{})$", source))
            .map_err(|e| RoutePatternError::InvalidConstraint(format!("{}: {}", source, e)))?;

        if ["/", "a/b", "/a", "a/"].iter().any(|sample| regex.is_match(sample)) {
            return Err(RoutePatternError::InvalidConstraint(format!(
                "{} can match `/`; use a trailing `*name` catch-all for values spanning segments",
                source
            )));
        }

        Ok(ParamConstraint::Regex {
            source: source.to_string(),
            regex,
        })
    }

    /// Whether `value` may fill the placeholder
    pub fn accepts(&self, value: &str) -> bool {
        !value.is_empty()
            && match self {
                ParamConstraint::None => true,
                ParamConstraint::Regex { regex, .. } => regex.is_match(value),
            }
    }

    /// The regex source, if constrained
    pub fn source(&self) -> Option<&str> {
        match self {
            ParamConstraint::None => None,
            ParamConstraint::Regex { source, .. } => Some(source),
        }
    }
}

impl PartialEq for ParamConstraint {
    fn eq(&self, other: &Self) -> bool {
        self.source() == other.source()
    }
}

/// One `/`-separated piece of a template
#[derive(Debug, Clone, PartialEq)]
pub enum PathSegment {
    Static(String),
    Parameter { name: String, constraint: ParamConstraint },
    CatchAll { name: String },
}

impl PathSegment {
    fn parse(raw: &str) -> Result<Self, RoutePatternError> {
        if let Some(inner) = raw.strip_prefix('{').and_then(|rest| rest.strip_suffix('}')) {
            let (name, constraint) = match inner.split_once(':') {
                Some((name, source)) => (name.trim(), ParamConstraint::regex(source.trim())?),
                None => (inner.trim(), ParamConstraint::None),
            };
            if name.is_empty() {
                return Err(RoutePatternError::InvalidSyntax(format!(
                    "placeholder without a name in `{}`",
                    raw
                )));
            }
            return Ok(PathSegment::Parameter {
                name: name.to_string(),
                constraint,
            });
        }

        if let Some(name) = raw.strip_prefix('*') {
            if name.is_empty() {
                return Err(RoutePatternError::InvalidSyntax(
                    "catch-all without a name".to_string(),
                ));
            }
            return Ok(PathSegment::CatchAll { name: name.to_string() });
        }

        if raw.contains(['{', '}']) {
            return Err(RoutePatternError::InvalidSyntax(format!(
                "placeholder must span the whole segment in `{}`",
                raw
            )));
        }
        Ok(PathSegment::Static(raw.to_string()))
    }

    /// Placeholder or catch-all name
    pub fn name(&self) -> Option<&str> {
        match self {
            PathSegment::Static(_) => None,
            PathSegment::Parameter { name, .. } | PathSegment::CatchAll { name } => Some(name),
        }
    }

    /// Specificity weight; smaller sorts first
    fn weight(&self) -> usize {
        match self {
            PathSegment::Static(_) => 1,
            PathSegment::Parameter {
                constraint: ParamConstraint::Regex { .. },
                ..
            } => 6,
            PathSegment::Parameter { .. } => 10,
            PathSegment::CatchAll { .. } => 100,
        }
    }
}

/// Compiled path template
#[derive(Debug, Clone)]
pub struct RoutePattern {
    template: String,
    segments: Vec<PathSegment>,
}

impl RoutePattern {
    /// Compile `template`
    pub fn parse(template: &str) -> Result<Self, RoutePatternError> {
        let pieces = split_path(template);
        let mut segments: Vec<PathSegment> = Vec::with_capacity(pieces.len());

        for (position, piece) in pieces.iter().enumerate() {
            let segment = PathSegment::parse(piece.trim())?;

            if let PathSegment::CatchAll { .. } = segment {
                if segments.iter().any(|s| matches!(s, PathSegment::CatchAll { .. })) {
                    return Err(RoutePatternError::MultipleCatchAll);
                }
                if position + 1 != pieces.len() {
                    return Err(RoutePatternError::CatchAllNotLast);
                }
            }
            if let Some(name) = segment.name() {
                if segments.iter().any(|s| s.name() == Some(name)) {
                    return Err(RoutePatternError::DuplicateParameter(name.to_string()));
                }
            }
            segments.push(segment);
        }

        Ok(RoutePattern {
            template: template.to_string(),
            segments,
        })
    }

    /// The template as written
    pub fn template(&self) -> &str {
        &self.template
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    /// Placeholder and catch-all names, left to right
    pub fn placeholders(&self) -> Vec<&str> {
        self.segments.iter().filter_map(PathSegment::name).collect()
    }

    pub fn has_catch_all(&self) -> bool {
        matches!(self.segments.last(), Some(PathSegment::CatchAll { .. }))
    }

    /// Whether the template has no placeholders
    pub fn is_static(&self) -> bool {
        self.segments.iter().all(|s| matches!(s, PathSegment::Static(_)))
    }

    /// Sum of segment weights; among patterns matching the same path the
    /// lowest wins
    pub fn priority(&self) -> usize {
        self.segments.iter().map(PathSegment::weight).sum()
    }

    /// Template with repeated and trailing slashes collapsed
    pub fn normalized_path(&self) -> String {
        normalize_path(&self.template)
    }

    pub fn matches(&self, path: &str) -> bool {
        self.capture(path).is_some()
    }

    /// Match `path`, returning its placeholder values
    pub fn capture(&self, path: &str) -> Option<HashMap<String, String>> {
        let mut pieces = split_path(path).into_iter();
        let mut params = HashMap::new();

        for segment in &self.segments {
            match segment {
                PathSegment::Static(text) => {
                    if pieces.next()? != text.as_str() {
                        return None;
                    }
                }
                PathSegment::Parameter { name, constraint } => {
                    let value = pieces.next()?;
                    if !constraint.accepts(value) {
                        return None;
                    }
                    params.insert(name.clone(), value.to_string());
                }
                PathSegment::CatchAll { name } => {
                    let rest: Vec<&str> = pieces.by_ref().collect();
                    if rest.is_empty() {
                        return None;
                    }
                    params.insert(name.clone(), rest.join("/"));
                }
            }
        }

        pieces.next().is_none().then_some(params)
    }

    /// Build a concrete path for the route named `route`
    ///
    /// Placeholders missing from `substitutions` fall back to `defaults`.
    /// Every value must satisfy its placeholder's constraint.
    pub fn expand(
        &self,
        route: &str,
        substitutions: &HashMap<String, String>,
        defaults: &HashMap<String, String>,
    ) -> RouterResult<String> {
        let mut pieces = Vec::with_capacity(self.segments.len());

        for segment in &self.segments {
            match segment {
                PathSegment::Static(text) => pieces.push(text.clone()),
                PathSegment::Parameter { name, constraint } => {
                    let value = substitution(route, name, substitutions, defaults)?;
                    if !constraint.accepts(value) {
                        return Err(RouterError::InvalidParameter {
                            route: route.to_string(),
                            parameter: name.clone(),
                            value: value.to_string(),
                            constraint: constraint.source().unwrap_or(".+").to_string(),
                        });
                    }
                    pieces.push(value.to_string());
                }
                PathSegment::CatchAll { name } => {
                    let value = substitution(route, name, substitutions, defaults)?;
                    pieces.push(value.trim_matches('/').to_string());
                }
            }
        }

        Ok(format!("/{}", pieces.join("/")))
    }
}

fn substitution<'a>(
    route: &str,
    name: &str,
    substitutions: &'a HashMap<String, String>,
    defaults: &'a HashMap<String, String>,
) -> RouterResult<&'a str> {
    substitutions
        .get(name)
        .or_else(|| defaults.get(name))
        .map(String::as_str)
        .ok_or_else(|| RouterError::missing_parameter(route, name))
}

/// Non-empty segments of `path`
pub(crate) fn split_path(path: &str) -> Vec<&str> {
    path.split('/').filter(|s| !s.is_empty()).collect()
}

/// Collapse repeated and trailing slashes (`/users//1/` becomes `/users/1`)
pub(crate) fn normalize_path(path: &str) -> String {
    format!("/{}", split_path(path).join("/"))
}
