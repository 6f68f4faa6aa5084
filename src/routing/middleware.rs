//! Middleware chain resolution and lookup.
//!
//! # Responsibilities
//! - Validate one declaration level (single XOR multiple)
//! - Merge method-level and service-level chains
//! - Store resolved chains per (server, path, verb) for later lookup
//!
//! # Design Decisions
//! - Exclusivity is checked per level, never across levels
//! - Merge order is method level first, then service level
//! - Deduplication keeps the first occurrence, so order is deterministic

use std::collections::HashSet;
use dashmap::DashMap;

use crate::error::{RouterError, RouterResult};
use crate::routing::descriptor::MiddlewareDeclaration;

/// Ordered, duplicate-free list of middleware identifiers.
pub type MiddlewareChain = Vec<String>;

/// Resolve one declaration level to a list of identifiers.
///
/// `level` only labels the error.
pub fn resolve(declaration: &MiddlewareDeclaration, level: &str) -> RouterResult<MiddlewareChain> {
    match (&declaration.single, &declaration.multiple) {
        (Some(_), Some(_)) => Err(RouterError::ConflictingMiddlewareDeclaration {
            level: level.to_string(),
        }),
        (None, Some(many)) => Ok(many.clone()),
        (Some(one), None) => Ok(vec![one.clone()]),
        (None, None) => Ok(Vec::new()),
    }
}

/// Concatenate `method_level + class_level` and drop repeats.
pub fn merge(method_level: &[String], class_level: &[String]) -> MiddlewareChain {
    let mut seen = HashSet::new();
    method_level
        .iter()
        .chain(class_level)
        .filter(|id| seen.insert(id.as_str()))
        .cloned()
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct ChainKey {
    server: String,
    path: String,
    verb: String,
}

/// Resolved middleware chains keyed by (server, path, verb).
///
/// Kept apart from the route tables so callers that already know a path
/// can fetch its chain without compiling a dispatcher.
#[derive(Debug, Default)]
pub struct MiddlewareRegistry {
    chains: DashMap<ChainKey, MiddlewareChain>,
}

impl MiddlewareRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the chain for a route. The first registration for a key is kept.
    pub fn add(&self, server: &str, path: &str, verb: &str, chain: MiddlewareChain) {
        let key = ChainKey {
            server: server.to_string(),
            path: path.to_string(),
            verb: verb.to_string(),
        };
        self.chains.entry(key).or_insert(chain);
    }

    /// The chain for a route, empty if none was registered.
    pub fn get(&self, server: &str, verb: &str, path: &str) -> MiddlewareChain {
        let key = ChainKey {
            server: server.to_string(),
            path: path.to_string(),
            verb: verb.to_string(),
        };
        self.chains
            .get(&key)
            .map(|chain| chain.value().clone())
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.chains.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chains.is_empty()
    }
}
