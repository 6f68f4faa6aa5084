//! Error types for route registration.
//!
//! Only configuration-time failures are errors. Request-time lookups
//! return a [`Resolution`](crate::routing::Resolution) instead.

use thiserror::Error;

/// Errors raised while building route tables.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouterError {
    /// Both `middleware` and `middlewares` were declared at one level.
    #[error("could not use `middleware` and `middlewares` at the same time at the same level ({level})")]
    ConflictingMiddlewareDeclaration {
        /// The declaring level, e.g. `App\UserService` or `App\UserService::getProfile`.
        level: String,
    },
}

/// Result type for registration operations.
pub type RouterResult<T> = Result<T, RouterError>;
