//! Route registration and resolution.

use std::collections::HashMap;
use std::fmt;

use log::debug;

use crate::routing::error::Error;
use crate::routing::method::Method;
use crate::routing::regex_route::RegexRoute;
use crate::routing::wildcard::Args;
use crate::routing::wildcard_route::WildcardRoute;

/// The tier a route pattern is stored in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatternKind {
    Literal,
    Wildcard,
    Regex,
}

impl PatternKind {
    /// Classify `pattern`, returning its tier and the pattern with any
    /// `literal:`, `wildcard:` or `regex:` prefix removed.
    ///
    /// Without a prefix, anything containing a group is a regex, then
    /// anything containing a wildcard token is a wildcard route, and
    /// everything else is literal.
    pub fn classify(pattern: &str) -> (Self, &str) {
        if let Some(rest) = pattern.strip_prefix("regex:") {
            (PatternKind::Regex, rest)
        } else if let Some(rest) = pattern.strip_prefix("wildcard:") {
            (PatternKind::Wildcard, rest)
        } else if let Some(rest) = pattern.strip_prefix("literal:") {
            (PatternKind::Literal, rest)
        } else if RegexRoute::<()>::like(pattern) {
            (PatternKind::Regex, pattern)
        } else if WildcardRoute::<()>::like(pattern) {
            (PatternKind::Wildcard, pattern)
        } else {
            (PatternKind::Literal, pattern)
        }
    }
}

impl fmt::Display for PatternKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PatternKind::Literal => f.write_str("literal"),
            PatternKind::Wildcard => f.write_str("wildcard"),
            PatternKind::Regex => f.write_str("regex"),
        }
    }
}

/// A handler resolved for a request, together with its arguments.
#[derive(Debug, PartialEq, Eq)]
pub struct Resolution<'a, H> {
    pub handler: &'a H,
    pub args: Args,
}

/// Per-method route tables for the literal, wildcard and regex tiers.
///
/// Tables are filled during application setup and only read while
/// requests are served.
#[derive(Debug, Clone)]
pub struct Router<H> {
    literal: HashMap<Method, HashMap<String, H>>,
    wildcard: HashMap<Method, Vec<WildcardRoute<H>>>,
    regex: HashMap<Method, Vec<RegexRoute<H>>>,
}

impl<H> Default for Router<H> {
    fn default() -> Self {
        Self {
            literal: HashMap::new(),
            wildcard: HashMap::new(),
            regex: HashMap::new(),
        }
    }
}

impl<H> Router<H> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a route.
    ///
    /// A literal route replaces any handler already registered for the
    /// same method and path. Wildcard and regex routes are appended; the
    /// most recently added one wins when several match.
    pub fn add(&mut self, method: Method, pattern: &str, handler: H) -> Result<PatternKind, Error> {
        let (kind, pattern) = PatternKind::classify(pattern);
        match kind {
            PatternKind::Literal => {
                self.literal
                    .entry(method.clone())
                    .or_default()
                    .insert(pattern.to_string(), handler);
            }
            PatternKind::Wildcard => {
                let route = WildcardRoute::new(pattern, handler)?;
                self.wildcard.entry(method.clone()).or_default().push(route);
            }
            PatternKind::Regex => {
                let route = RegexRoute::new(pattern, handler)?;
                self.regex.entry(method.clone()).or_default().push(route);
            }
        }
        debug!("Added {kind} route {method} {pattern}");
        Ok(kind)
    }

    /// Resolve a request to the handler registered for it.
    ///
    /// Literal routes are checked first, then wildcard routes and then
    /// regex routes, each list newest first.
    pub fn resolve(&self, method: &Method, path: &str) -> Option<Resolution<'_, H>> {
        if let Some(handler) = self.literal.get(method).and_then(|routes| routes.get(path)) {
            debug!("Resolved {method} {path} to literal route");
            return Some(Resolution {
                handler,
                args: Args::default(),
            });
        }

        let resolved = self
            .wildcard
            .get(method)
            .and_then(|routes| routes.iter().rev().find_map(|route| route.matches(path)))
            .or_else(|| {
                self.regex
                    .get(method)
                    .and_then(|routes| routes.iter().rev().find_map(|route| route.matches(path)))
            });

        match resolved {
            Some((handler, args)) => {
                debug!("Resolved {method} {path} with args {args:?}");
                Some(Resolution { handler, args })
            }
            None => {
                debug!("No route matches {method} {path}");
                None
            }
        }
    }

    /// Whether at least one route of any tier exists for `method`.
    pub fn contains_method(&self, method: &Method) -> bool {
        self.literal.get(method).is_some_and(|r| !r.is_empty())
            || self.wildcard.get(method).is_some_and(|r| !r.is_empty())
            || self.regex.get(method).is_some_and(|r| !r.is_empty())
    }
}
