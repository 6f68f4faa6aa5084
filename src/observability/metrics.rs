//! Router metrics.
//!
//! # Metrics
//! - `rpc_router_routes_registered_total` (counter): routes added, by server and source
//! - `rpc_router_dispatcher_compilations_total` (counter): dispatcher builds, by server
//! - `rpc_router_routes` (gauge): distinct routes in the last compiled dispatcher
//! - `rpc_router_resolutions_total` (counter): lookups, by server and outcome
//!
//! The library only records. Installing an exporter is left to the
//! embedding process; without one these calls are no-ops.

use metrics::{counter, gauge};

/// Where a route came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteSource {
    Service,
    Manual,
}

impl RouteSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            RouteSource::Service => "service",
            RouteSource::Manual => "manual",
        }
    }
}

pub fn record_route_registered(server: &str, source: RouteSource) {
    counter!(
        "rpc_router_routes_registered_total",
        "server" => server.to_string(),
        "source" => source.as_str()
    )
    .increment(1);
}

pub fn record_compilation(server: &str, route_count: usize) {
    counter!("rpc_router_dispatcher_compilations_total", "server" => server.to_string()).increment(1);
    gauge!("rpc_router_routes", "server" => server.to_string()).set(route_count as f64);
}

pub fn record_resolution(server: &str, outcome: &'static str) {
    counter!(
        "rpc_router_resolutions_total",
        "server" => server.to_string(),
        "outcome" => outcome
    )
    .increment(1);
}
