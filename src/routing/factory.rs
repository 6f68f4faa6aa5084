//! Per-server route tables and their compiled dispatchers.
//!
//! # Responsibilities
//! - Own one route table and one middleware registry for every server name
//! - Compile a server's dispatcher on first request and cache it
//! - Answer resolution and middleware lookups
//!
//! # Design Decisions
//! - Register first, then serve. Routes added after a server's dispatcher
//!   was compiled are not visible until [`DispatcherFactory::invalidate`]
//! - Compilation runs under the cache entry's shard lock, so concurrent
//!   first requests for a server compile it exactly once
//! - Cached dispatchers are immutable and shared via `Arc`
//! - Each table sits behind its own mutex; the map's shard lock is never
//!   held while a table is in use
//! - Servers without a table share one empty dispatcher that is not cached

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use dashmap::DashMap;

use crate::config::schema::{ManualRouteConfig, RouterConfig};
use crate::error::RouterResult;
use crate::observability::metrics::{self, RouteSource};
use crate::routing::descriptor::ServiceDescriptor;
use crate::routing::dispatcher::{Dispatcher, Resolution};
use crate::routing::middleware::{MiddlewareChain, MiddlewareRegistry};
use crate::routing::registrar::{LogObserver, RouteObserver, RouteScript, ServiceRegistrar};
use crate::routing::table::{Handler, Route, RouteTable};

/// A server's route table, shared with route scripts.
pub type SharedRouteTable = Arc<Mutex<RouteTable>>;

/// Lock a table. Tables are append-only, so a poisoned one is still usable.
pub fn lock_table(table: &Mutex<RouteTable>) -> MutexGuard<'_, RouteTable> {
    table.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Single process-wide authority for route state.
#[derive(Debug, Default)]
pub struct DispatcherFactory {
    tables: DashMap<String, SharedRouteTable>,
    dispatchers: DashMap<String, Arc<Dispatcher>>,
    middleware: MiddlewareRegistry,
    unknown_server: Arc<Dispatcher>,
}

impl DispatcherFactory {
    /// A factory with no routes.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Register all service descriptors, then run the route script once.
    pub fn new(
        descriptors: &[ServiceDescriptor],
        observer: &dyn RouteObserver,
        script: &dyn RouteScript,
    ) -> RouterResult<Self> {
        let factory = Self::empty();
        ServiceRegistrar::new(&factory, observer).register_all(descriptors)?;
        script.define(&factory);
        Ok(factory)
    }

    /// Build from a loaded config: its services, then its manual routes.
    pub fn from_config(config: &RouterConfig) -> RouterResult<Self> {
        Self::new(&config.services, &LogObserver, &ConfigRoutes(&config.routes))
    }

    /// The route table for a server, created empty on first access.
    ///
    /// Holding the table's lock blocks registration for that server only;
    /// release it before calling `add_route` for the same server.
    pub fn route_table(&self, server: &str) -> SharedRouteTable {
        let entry = self.tables.entry(server.to_string()).or_default();
        Arc::clone(entry.value())
    }

    /// Snapshot of a server's routes in registration order.
    pub fn routes(&self, server: &str) -> Vec<Route> {
        match self.existing_table(server) {
            Some(table) => lock_table(&table).routes().to_vec(),
            None => Vec::new(),
        }
    }

    fn existing_table(&self, server: &str) -> Option<SharedRouteTable> {
        self.tables.get(server).map(|entry| Arc::clone(entry.value()))
    }

    /// Register a single route.
    pub fn add_route(&self, server: &str, verb: &str, path: &str, handler: Handler) {
        self.add_route_with_middleware(server, verb, path, handler, Vec::new());
    }

    /// Register a single route together with its middleware chain.
    pub fn add_route_with_middleware(
        &self,
        server: &str,
        verb: &str,
        path: &str,
        handler: Handler,
        chain: MiddlewareChain,
    ) {
        if self.dispatchers.contains_key(server) {
            tracing::warn!(
                server = %server,
                verb = %verb,
                path = %path,
                "Route added after dispatcher was compiled; it stays hidden until invalidated"
            );
        }

        tracing::debug!(server = %server, verb = %verb, path = %path, handler = %handler, "Route registered");
        self.push_route(server, verb, path, handler, chain);
        metrics::record_route_registered(server, RouteSource::Manual);
    }

    /// Append to a server's table and record the route's chain.
    pub(crate) fn push_route(
        &self,
        server: &str,
        verb: &str,
        path: &str,
        handler: Handler,
        chain: MiddlewareChain,
    ) {
        let table = self.route_table(server);
        lock_table(&table).add_route(verb, path, handler);
        // Empty chains are recorded too, so a later duplicate cannot claim the key.
        self.middleware.add(server, path, verb, chain);
    }

    /// The compiled dispatcher for a server, compiling it on first use.
    ///
    /// A server with no route table gets a shared empty dispatcher that is
    /// not cached, so unknown names never grow the cache.
    pub fn get_dispatcher(&self, server: &str) -> Arc<Dispatcher> {
        if let Some(cached) = self.dispatchers.get(server) {
            return Arc::clone(cached.value());
        }

        let Some(table) = self.existing_table(server) else {
            return Arc::clone(&self.unknown_server);
        };

        let entry = self
            .dispatchers
            .entry(server.to_string())
            .or_insert_with(|| Arc::new(compile(server, &table)));
        Arc::clone(entry.value())
    }

    /// Drop a server's cached dispatcher. Returns whether one was cached.
    pub fn invalidate(&self, server: &str) -> bool {
        let removed = self.dispatchers.remove(server).is_some();
        if removed {
            tracing::info!(server = %server, "Dispatcher invalidated");
        }
        removed
    }

    /// Resolve a request for a server.
    pub fn resolve(&self, server: &str, verb: &str, path: &str) -> Resolution {
        let resolution = self.get_dispatcher(server).dispatch(verb, path);
        metrics::record_resolution(server, resolution.outcome());
        resolution
    }

    /// Middleware chain for a route, empty if none was registered.
    pub fn middlewares_for(&self, server: &str, verb: &str, path: &str) -> MiddlewareChain {
        self.middleware.get(server, verb, path)
    }

    /// Server names that have a route table, sorted.
    pub fn server_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.tables.iter().map(|e| e.key().clone()).collect();
        names.sort();
        names
    }

    /// Number of compiled dispatchers currently cached.
    pub fn cached_dispatchers(&self) -> usize {
        self.dispatchers.len()
    }
}

fn compile(server: &str, table: &Mutex<RouteTable>) -> Dispatcher {
    let dispatcher = lock_table(table).compile();
    tracing::info!(server = %server, routes = dispatcher.route_count(), "Dispatcher compiled");
    metrics::record_compilation(server, dispatcher.route_count());
    dispatcher
}

/// Route script backed by the `[[routes]]` tables of a config file.
#[derive(Debug, Clone, Copy)]
pub struct ConfigRoutes<'a>(pub &'a [ManualRouteConfig]);

impl RouteScript for ConfigRoutes<'_> {
    fn define(&self, routes: &DispatcherFactory) {
        for route in self.0 {
            routes.add_route_with_middleware(
                &route.server,
                &route.verb,
                &route.path,
                route.handler.clone(),
                route.middlewares.clone(),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routing::registrar::NoRoutes;

    fn factory() -> DispatcherFactory {
        let factory = DispatcherFactory::empty();
        factory.add_route(
            "jsonrpc",
            "POST",
            "/user/getProfile",
            Handler::new("UserService", "getProfile"),
        );
        factory
    }

    #[test]
    fn test_resolve_outcomes() {
        let factory = factory();
        assert_eq!(
            factory.resolve("jsonrpc", "POST", "/user/getProfile"),
            Resolution::Match {
                handler: Handler::new("UserService", "getProfile")
            }
        );
        assert_eq!(
            factory.resolve("jsonrpc", "GET", "/user/getProfile"),
            Resolution::MethodNotAllowed {
                allowed: vec!["POST".into()]
            }
        );
        assert_eq!(factory.resolve("jsonrpc", "POST", "/user/unknown"), Resolution::NotFound);
    }

    #[test]
    fn test_servers_are_independent() {
        let factory = factory();
        assert_eq!(factory.resolve("other", "POST", "/user/getProfile"), Resolution::NotFound);
        assert_eq!(factory.server_names(), vec!["jsonrpc"]);
    }

    #[test]
    fn test_unknown_servers_are_not_cached() {
        let factory = factory();
        for i in 0..100 {
            let server = format!("caller-{i}");
            assert_eq!(factory.resolve(&server, "POST", "/x"), Resolution::NotFound);
        }
        assert_eq!(factory.cached_dispatchers(), 0);
        assert!(!factory.invalidate("caller-0"));

        factory.get_dispatcher("jsonrpc");
        assert_eq!(factory.cached_dispatchers(), 1);
    }

    #[test]
    fn test_unknown_server_compiles_once_routes_exist() {
        let factory = DispatcherFactory::empty();
        assert_eq!(factory.resolve("late", "POST", "/a"), Resolution::NotFound);

        factory.add_route("late", "POST", "/a", Handler::new("Late", "run"));
        assert!(factory.resolve("late", "POST", "/a").handler().is_some());
    }

    #[test]
    fn test_duplicate_manual_route_keeps_first_chain() {
        let factory = DispatcherFactory::empty();
        factory.add_route("s", "POST", "/a", Handler::new("First", "run"));
        factory.add_route_with_middleware(
            "s",
            "POST",
            "/a",
            Handler::new("Second", "run"),
            vec!["x".into()],
        );

        assert_eq!(
            factory.resolve("s", "POST", "/a").handler(),
            Some(&Handler::new("First", "run"))
        );
        assert!(factory.middlewares_for("s", "POST", "/a").is_empty());
    }

    #[test]
    fn test_held_table_does_not_block_other_servers() {
        use std::sync::mpsc;
        use std::time::Duration;

        let factory = Arc::new(DispatcherFactory::empty());
        let (done_tx, done_rx) = mpsc::channel();

        let worker = Arc::clone(&factory);
        std::thread::spawn(move || {
            let table = worker.route_table("a");
            let mut guard = lock_table(&table);
            guard.add_route("POST", "/held", Handler::new("Held", "run"));

            for i in 0..512 {
                let server = format!("srv{i}");
                worker.add_route(&server, "POST", "/x", Handler::new("Other", "run"));
                worker.get_dispatcher(&server);
            }
            drop(guard);
            let _ = done_tx.send(());
        });

        assert!(done_rx.recv_timeout(Duration::from_secs(5)).is_ok());
        assert_eq!(factory.routes("a").len(), 1);
        assert_eq!(factory.server_names().len(), 513);
    }

    #[test]
    fn test_compile_once() {
        let factory = factory();
        let first = factory.get_dispatcher("jsonrpc");

        factory.add_route("jsonrpc", "POST", "/late", Handler::new("Late", "run"));
        let second = factory.get_dispatcher("jsonrpc");

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(second.dispatch("POST", "/late"), Resolution::NotFound);
        assert_eq!(factory.routes("jsonrpc").len(), 2);
    }

    #[test]
    fn test_invalidate_recompiles() {
        let factory = factory();
        let first = factory.get_dispatcher("jsonrpc");
        factory.add_route("jsonrpc", "POST", "/late", Handler::new("Late", "run"));

        assert!(factory.invalidate("jsonrpc"));
        assert!(!factory.invalidate("jsonrpc"));

        let second = factory.get_dispatcher("jsonrpc");
        assert!(!Arc::ptr_eq(&first, &second));
        assert!(second.dispatch("POST", "/late").handler().is_some());
    }

    #[test]
    fn test_manual_route_middleware() {
        let factory = DispatcherFactory::empty();
        factory.add_route_with_middleware(
            "jsonrpc",
            "GET",
            "/health",
            Handler::new("HealthController", "check"),
            vec!["metrics".into()],
        );
        assert_eq!(factory.middlewares_for("jsonrpc", "GET", "/health"), vec!["metrics"]);
        assert!(factory.middlewares_for("jsonrpc", "POST", "/health").is_empty());
    }

    #[test]
    fn test_script_runs_after_services() {
        let services = [ServiceDescriptor::new("App\\UserService", "jsonrpc").with_methods(["get"])];
        let script = |routes: &DispatcherFactory| {
            // Same (verb, path) as the service route; the service registered first.
            routes.add_route("jsonrpc", "POST", "/user/get", Handler::new("Manual", "get"));
            routes.add_route("jsonrpc", "GET", "/ping", Handler::new("Manual", "ping"));
        };

        let factory = DispatcherFactory::new(&services, &LogObserver, &script).unwrap();
        assert_eq!(
            factory.resolve("jsonrpc", "POST", "/user/get").handler(),
            Some(&Handler::new("App\\UserService", "get"))
        );
        assert!(factory.resolve("jsonrpc", "GET", "/ping").handler().is_some());
    }

    #[test]
    fn test_new_propagates_conflict() {
        use crate::routing::descriptor::MiddlewareDeclaration;

        let services = [ServiceDescriptor::new("App\\UserService", "jsonrpc")
            .with_methods(["get"])
            .with_middleware(MiddlewareDeclaration {
                single: Some("a".into()),
                multiple: Some(vec!["b".into()]),
            })];
        assert!(DispatcherFactory::new(&services, &LogObserver, &NoRoutes).is_err());
    }
}
