//! Configuration schema definitions.
//!
//! A router config lists the discovered services, the hand-written routes
//! to add after them, and logging settings. All types deserialize from TOML.

use serde::Deserialize;

use crate::routing::descriptor::{ServiceDescriptor, DEFAULT_SERVER};
use crate::routing::table::{Handler, SERVICE_VERB};

/// Root configuration for the router.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RouterConfig {
    /// Logging settings.
    pub observability: ObservabilityConfig,

    /// Discovered RPC services, registered in order.
    pub services: Vec<ServiceDescriptor>,

    /// Hand-written routes, registered after all services.
    pub routes: Vec<ManualRouteConfig>,
}

/// A single hand-written route.
#[derive(Debug, Clone, Deserialize)]
pub struct ManualRouteConfig {
    /// Server whose table receives the route.
    #[serde(default = "default_server")]
    pub server: String,

    /// Request verb (default: POST).
    #[serde(default = "default_verb")]
    pub verb: String,

    /// Exact request path.
    pub path: String,

    /// Target type and method.
    pub handler: Handler,

    /// Middleware chain for this route.
    #[serde(default)]
    pub middlewares: Vec<String>,
}

fn default_server() -> String {
    DEFAULT_SERVER.to_string()
}

fn default_verb() -> String {
    SERVICE_VERB.to_string()
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Output format for log lines.
    pub log_format: LogFormat,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
        }
    }
}
