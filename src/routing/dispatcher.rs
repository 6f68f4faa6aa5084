//! Compiled route matcher.
//!
//! # Design Decisions
//! - Immutable after construction (thread-safe without locks)
//! - O(1) path lookup via HashMap, exact and case-sensitive
//! - Trailing slashes are significant
//! - First registration wins for a repeated (verb, path)
//! - Explicit NotFound / MethodNotAllowed rather than a silent default

use std::collections::HashMap;
use serde::Serialize;

use crate::routing::table::{Handler, Route};

/// Outcome of resolving a (verb, path) pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Resolution {
    /// The path and verb matched a route.
    Match { handler: Handler },
    /// The path exists, but not for this verb.
    MethodNotAllowed { allowed: Vec<String> },
    /// No route has this path.
    NotFound,
}

impl Resolution {
    /// Short label used for logs and metrics.
    pub fn outcome(&self) -> &'static str {
        match self {
            Resolution::Match { .. } => "match",
            Resolution::MethodNotAllowed { .. } => "method_not_allowed",
            Resolution::NotFound => "not_found",
        }
    }

    pub fn handler(&self) -> Option<&Handler> {
        match self {
            Resolution::Match { handler } => Some(handler),
            _ => None,
        }
    }
}

/// Handlers registered for one path, one per verb, in registration order.
#[derive(Debug, Default)]
struct PathEntry {
    verbs: Vec<(String, Handler)>,
}

impl PathEntry {
    fn handler(&self, verb: &str) -> Option<&Handler> {
        self.verbs.iter().find(|(v, _)| v == verb).map(|(_, h)| h)
    }
}

/// Read-only matcher compiled from a route table snapshot.
#[derive(Debug, Default)]
pub struct Dispatcher {
    paths: HashMap<String, PathEntry>,
    route_count: usize,
}

impl Dispatcher {
    /// Compile a dispatcher from routes in registration order.
    pub fn from_routes(routes: &[Route]) -> Self {
        let mut paths: HashMap<String, PathEntry> = HashMap::new();
        let mut route_count = 0;

        for route in routes {
            let entry = paths.entry(route.path.clone()).or_default();
            if let Some(existing) = entry.handler(&route.verb) {
                tracing::warn!(
                    verb = %route.verb,
                    path = %route.path,
                    kept = %existing,
                    shadowed = %route.handler,
                    "Duplicate route ignored, first registration wins"
                );
                continue;
            }
            entry.verbs.push((route.verb.clone(), route.handler.clone()));
            route_count += 1;
        }

        Self { paths, route_count }
    }

    /// Resolve a request to a handler or an explicit miss.
    pub fn dispatch(&self, verb: &str, path: &str) -> Resolution {
        let Some(entry) = self.paths.get(path) else {
            return Resolution::NotFound;
        };

        match entry.handler(verb) {
            Some(handler) => Resolution::Match {
                handler: handler.clone(),
            },
            None => Resolution::MethodNotAllowed {
                allowed: entry.verbs.iter().map(|(v, _)| v.clone()).collect(),
            },
        }
    }

    /// Number of distinct (verb, path) routes.
    pub fn route_count(&self) -> usize {
        self.route_count
    }
}
