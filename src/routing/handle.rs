//! Swappable handle to the live dispatcher factory.
//!
//! A factory never changes its compiled dispatchers once they are cached.
//! To pick up a new route configuration a fresh factory is built and
//! swapped in atomically; requests already holding the old one finish
//! against it.

use std::sync::Arc;
use arc_swap::ArcSwap;

use crate::config::schema::RouterConfig;
use crate::error::RouterResult;
use crate::routing::factory::DispatcherFactory;

/// Shared pointer to the current [`DispatcherFactory`].
#[derive(Debug)]
pub struct RouterHandle {
    current: ArcSwap<DispatcherFactory>,
}

impl RouterHandle {
    pub fn new(factory: DispatcherFactory) -> Self {
        Self {
            current: ArcSwap::from_pointee(factory),
        }
    }

    /// The factory in effect right now.
    pub fn load(&self) -> Arc<DispatcherFactory> {
        self.current.load_full()
    }

    /// Replace the factory, returning the previous one.
    pub fn replace(&self, factory: DispatcherFactory) -> Arc<DispatcherFactory> {
        self.current.swap(Arc::new(factory))
    }

    /// Rebuild from config and swap in the result.
    ///
    /// On a registration error the current factory is kept.
    pub fn reload(&self, config: &RouterConfig) -> RouterResult<()> {
        let factory = DispatcherFactory::from_config(config)?;
        let servers = factory.server_names();
        self.replace(factory);
        tracing::info!(servers = ?servers, "Route configuration reloaded");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::ManualRouteConfig;
    use crate::routing::descriptor::{MiddlewareDeclaration, ServiceDescriptor};
    use crate::routing::table::Handler;

    fn config_with_route(path: &str) -> RouterConfig {
        RouterConfig {
            routes: vec![ManualRouteConfig {
                server: "jsonrpc".into(),
                verb: "POST".into(),
                path: path.into(),
                handler: Handler::new("Ping", "run"),
                middlewares: Vec::new(),
            }],
            ..RouterConfig::default()
        }
    }

    #[test]
    fn test_reload_swaps_factory() {
        let handle = RouterHandle::new(DispatcherFactory::from_config(&config_with_route("/a")).unwrap());
        let before = handle.load();
        assert!(before.resolve("jsonrpc", "POST", "/a").handler().is_some());

        handle.reload(&config_with_route("/b")).unwrap();
        let after = handle.load();
        assert!(after.resolve("jsonrpc", "POST", "/b").handler().is_some());
        assert!(after.resolve("jsonrpc", "POST", "/a").handler().is_none());

        // The old factory is untouched.
        assert!(before.resolve("jsonrpc", "POST", "/a").handler().is_some());
    }

    #[test]
    fn test_failed_reload_keeps_current() {
        let handle = RouterHandle::new(DispatcherFactory::from_config(&config_with_route("/a")).unwrap());

        let mut bad = config_with_route("/b");
        bad.services.push(
            ServiceDescriptor::new("App\\UserService", "jsonrpc")
                .with_methods(["get"])
                .with_middleware(MiddlewareDeclaration {
                    single: Some("a".into()),
                    multiple: Some(vec!["b".into()]),
                }),
        );

        assert!(handle.reload(&bad).is_err());
        assert!(handle.load().resolve("jsonrpc", "POST", "/a").handler().is_some());
    }
}
