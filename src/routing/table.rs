//! Per-server route tables.
//!
//! A table is an append-only list of routes. It never deduplicates;
//! duplicates are settled when the table is compiled into a
//! [`Dispatcher`], where the first registration wins.

use std::fmt;
use serde::{Deserialize, Serialize};

use crate::routing::dispatcher::Dispatcher;

/// Verb used for every service-derived route.
pub const SERVICE_VERB: &str = "POST";

/// A handler recorded as data: the type and the method to call on it.
///
/// Binding this to something callable is the request layer's job.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub struct Handler {
    pub type_name: String,
    pub method: String,
}

impl Handler {
    pub fn new(type_name: impl Into<String>, method: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            method: method.into(),
        }
    }
}

impl fmt::Display for Handler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}::{}", self.type_name, self.method)
    }
}

/// One (verb, path) → handler binding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    pub verb: String,
    pub path: String,
    pub handler: Handler,
}

/// Ordered routes for one server.
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    routes: Vec<Route>,
}

impl RouteTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a route. Never fails and never deduplicates.
    pub fn add_route(&mut self, verb: impl Into<String>, path: impl Into<String>, handler: Handler) {
        self.routes.push(Route {
            verb: verb.into(),
            path: path.into(),
            handler,
        });
    }

    /// Routes in registration order.
    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Compile the current routes into an immutable dispatcher.
    pub fn compile(&self) -> Dispatcher {
        Dispatcher::from_routes(&self.routes)
    }
}
