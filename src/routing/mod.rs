//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Route Registration (at startup):
//!     ServiceDescriptor[]
//!     → registrar.rs (prefix.rs + middleware.rs per method)
//!     → table.rs (append to the server's RouteTable)
//!     → route script (manual routes through the same API)
//!
//! Dispatch (per request):
//!     (server, verb, path)
//!     → factory.rs (compile once, cache per server)
//!     → dispatcher.rs (exact path lookup)
//!     → Return: Match, MethodNotAllowed or NotFound
//! ```
//!
//! # Design Decisions
//! - Dispatchers compiled on first use, immutable afterwards
//! - Exact static paths only (no templates, no regex)
//! - Deterministic: first registration of a (verb, path) wins
//! - Middleware chains stored apart from routes, keyed by (server, path, verb)

pub mod descriptor;
pub mod dispatcher;
pub mod factory;
pub mod handle;
pub mod middleware;
pub mod prefix;
pub mod registrar;
pub mod table;

pub use descriptor::{MiddlewareDeclaration, ServiceDescriptor};
pub use dispatcher::{Dispatcher, Resolution};
pub use factory::{lock_table, ConfigRoutes, DispatcherFactory, SharedRouteTable};
pub use handle::RouterHandle;
pub use middleware::MiddlewareChain;
pub use registrar::{LogObserver, NoRoutes, PathRegistered, RouteObserver, RouteScript, ServiceRegistrar};
pub use table::{Handler, Route, RouteTable, SERVICE_VERB};
