//! Service route registration.
//!
//! # Responsibilities
//! - Turn each service descriptor into one POST route per public method
//! - Resolve the middleware chain for every route
//! - Notify an observer once per registered service route
//! - Run the supplementary route script after all services
//!
//! # Design Decisions
//! - A descriptor is resolved completely before any of its routes are
//!   added, so a middleware conflict leaves nothing behind for it
//! - The first failing descriptor aborts registration; the error is fatal
//! - Notifications are synchronous and in registration order

use crate::error::RouterResult;
use crate::observability::metrics::{self, RouteSource};
use crate::routing::descriptor::ServiceDescriptor;
use crate::routing::factory::DispatcherFactory;
use crate::routing::middleware::{self, MiddlewareChain};
use crate::routing::prefix::derive_prefix;
use crate::routing::table::{Handler, SERVICE_VERB};

/// Emitted after a service method has been registered as a route.
#[derive(Debug, Clone, Copy)]
pub struct PathRegistered<'a> {
    pub path: &'a str,
    pub handler: &'a Handler,
    pub descriptor: &'a ServiceDescriptor,
}

/// Receives one notification per registered service route.
pub trait RouteObserver {
    fn path_registered(&self, event: &PathRegistered<'_>);
}

impl<F> RouteObserver for F
where
    F: Fn(&PathRegistered<'_>),
{
    fn path_registered(&self, event: &PathRegistered<'_>) {
        self(event)
    }
}

/// Observer that only logs.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogObserver;

impl RouteObserver for LogObserver {
    fn path_registered(&self, event: &PathRegistered<'_>) {
        tracing::debug!(
            server = %event.descriptor.server,
            path = %event.path,
            handler = %event.handler,
            "Service route registered"
        );
    }
}

/// Hand-written routes registered after the service routes.
///
/// Implementations call [`DispatcherFactory::add_route`] (or its middleware
/// variant) for each route they define.
pub trait RouteScript {
    fn define(&self, routes: &DispatcherFactory);
}

impl<F> RouteScript for F
where
    F: Fn(&DispatcherFactory),
{
    fn define(&self, routes: &DispatcherFactory) {
        self(routes)
    }
}

/// A script that defines nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoRoutes;

impl RouteScript for NoRoutes {
    fn define(&self, _routes: &DispatcherFactory) {}
}

/// A route waiting to be added, with its resolved chain.
struct PendingRoute {
    path: String,
    handler: Handler,
    chain: MiddlewareChain,
}

/// Registers service descriptors into a factory's route tables.
pub struct ServiceRegistrar<'a> {
    factory: &'a DispatcherFactory,
    observer: &'a dyn RouteObserver,
}

impl<'a> ServiceRegistrar<'a> {
    pub fn new(factory: &'a DispatcherFactory, observer: &'a dyn RouteObserver) -> Self {
        Self { factory, observer }
    }

    /// Register every descriptor in order. Stops at the first error.
    pub fn register_all(&self, descriptors: &[ServiceDescriptor]) -> RouterResult<usize> {
        let mut total = 0;
        for descriptor in descriptors {
            total += self.register_service(descriptor)?;
        }
        tracing::info!(services = descriptors.len(), routes = total, "Service routes registered");
        Ok(total)
    }

    /// Register one descriptor's methods. Returns the number of routes added.
    pub fn register_service(&self, descriptor: &ServiceDescriptor) -> RouterResult<usize> {
        let pending = plan_routes(descriptor)?;
        if pending.is_empty() {
            tracing::debug!(service = %descriptor.type_name, "Service has no public methods");
            return Ok(0);
        }

        let server = descriptor.server.as_str();
        for route in &pending {
            self.factory.push_route(
                server,
                SERVICE_VERB,
                &route.path,
                route.handler.clone(),
                route.chain.clone(),
            );
            metrics::record_route_registered(server, RouteSource::Service);

            self.observer.path_registered(&PathRegistered {
                path: &route.path,
                handler: &route.handler,
                descriptor,
            });
        }

        Ok(pending.len())
    }
}

/// Build every route of a descriptor without touching any table.
fn plan_routes(descriptor: &ServiceDescriptor) -> RouterResult<Vec<PendingRoute>> {
    let class_chain = middleware::resolve(&descriptor.middleware, &descriptor.type_name)?;
    let prefix = derive_prefix(&descriptor.type_name, &descriptor.name);

    descriptor
        .methods
        .iter()
        .map(|method| {
            let method_chain = match descriptor.method_middleware.get(method) {
                Some(declaration) => {
                    let level = format!("{}::{}", descriptor.type_name, method);
                    middleware::resolve(declaration, &level)?
                }
                None => Vec::new(),
            };

            Ok(PendingRoute {
                path: format!("{prefix}/{method}"),
                handler: Handler::new(descriptor.type_name.as_str(), method.as_str()),
                chain: middleware::merge(&method_chain, &class_chain),
            })
        })
        .collect()
}
