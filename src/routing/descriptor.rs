//! Service descriptors produced by service discovery.
//!
//! A descriptor is the materialized form of one declared RPC service:
//! the handler type, the server it belongs to, an optional explicit path
//! name, its middleware declarations and its public methods in order.
//! Descriptors are plain data and deserialize straight from the
//! `[[services]]` tables of the router config.

use std::collections::HashMap;
use serde::{Deserialize, Serialize};

/// Server name used when a service does not name one.
pub const DEFAULT_SERVER: &str = "jsonrpc-http";

/// Middleware declared at one level (service or method).
///
/// The two forms are mutually exclusive; having both set is reported
/// as a conflict when the declaration is resolved, not when parsed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct MiddlewareDeclaration {
    /// A single middleware identifier.
    #[serde(rename = "middleware", skip_serializing_if = "Option::is_none")]
    pub single: Option<String>,

    /// An ordered list of middleware identifiers.
    #[serde(rename = "middlewares", skip_serializing_if = "Option::is_none")]
    pub multiple: Option<Vec<String>>,
}

impl MiddlewareDeclaration {
    pub fn single(id: impl Into<String>) -> Self {
        Self {
            single: Some(id.into()),
            multiple: None,
        }
    }

    pub fn multiple<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            single: None,
            multiple: Some(ids.into_iter().map(Into::into).collect()),
        }
    }

    /// True if neither form is declared.
    pub fn is_empty(&self) -> bool {
        self.single.is_none() && self.multiple.is_none()
    }
}

/// Declared metadata for one RPC service type.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ServiceDescriptor {
    /// Fully qualified handler type name, e.g. `App\Service\UserService`.
    pub type_name: String,

    /// Server whose route table receives this service's routes.
    #[serde(default = "default_server")]
    pub server: String,

    /// Explicit path prefix. Empty means "derive from the type name".
    #[serde(default)]
    pub name: String,

    /// Service-level middleware.
    #[serde(flatten)]
    pub middleware: MiddlewareDeclaration,

    /// Per-method middleware, keyed by method name.
    #[serde(default)]
    pub method_middleware: HashMap<String, MiddlewareDeclaration>,

    /// Public method names in declaration order.
    #[serde(default)]
    pub methods: Vec<String>,
}

fn default_server() -> String {
    DEFAULT_SERVER.to_string()
}

impl ServiceDescriptor {
    /// A descriptor for `type_name` on `server` with no prefix, middleware or methods.
    pub fn new(type_name: impl Into<String>, server: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            server: server.into(),
            name: String::new(),
            middleware: MiddlewareDeclaration::default(),
            method_middleware: HashMap::new(),
            methods: Vec::new(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_methods<I, S>(mut self, methods: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.methods = methods.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_middleware(mut self, declaration: MiddlewareDeclaration) -> Self {
        self.middleware = declaration;
        self
    }

    pub fn with_method_middleware(
        mut self,
        method: impl Into<String>,
        declaration: MiddlewareDeclaration,
    ) -> Self {
        self.method_middleware.insert(method.into(), declaration);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_defaults() {
        let desc: ServiceDescriptor = toml::from_str(
            r#"
            type_name = 'App\Service\UserService'
            methods = ["getProfile", "update"]
            "#,
        )
        .unwrap();

        assert_eq!(desc.server, DEFAULT_SERVER);
        assert!(desc.name.is_empty());
        assert!(desc.middleware.is_empty());
        assert_eq!(desc.methods, vec!["getProfile", "update"]);
    }

    #[test]
    fn test_deserialize_middleware_forms() {
        let desc: ServiceDescriptor = toml::from_str(
            r#"
            type_name = "UserService"
            server = "jsonrpc"
            middleware = "auth"

            [method_middleware.getProfile]
            middlewares = ["trace", "auth"]
            "#,
        )
        .unwrap();

        assert_eq!(desc.middleware, MiddlewareDeclaration::single("auth"));
        assert_eq!(
            desc.method_middleware["getProfile"],
            MiddlewareDeclaration::multiple(["trace", "auth"])
        );
    }
}
