//! RPC route table library.
//!
//! Builds one route table per logical server from declared RPC services,
//! compiles each table on first use into an immutable dispatcher, and
//! resolves `(server, verb, path)` to a handler plus its middleware chain.

pub mod config;
pub mod error;
pub mod observability;
pub mod routing;

pub use config::RouterConfig;
pub use error::{RouterError, RouterResult};
pub use routing::{DispatcherFactory, Handler, Resolution, RouterHandle, ServiceDescriptor};
