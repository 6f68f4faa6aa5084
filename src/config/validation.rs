//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Reject empty names and malformed manual paths
//! - Detect methods listed twice for one service
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: RouterConfig → Result<(), Vec<ValidationError>>
//! - Middleware exclusivity is left to registration, which reports the level

use std::collections::HashSet;
use thiserror::Error;

use crate::config::schema::RouterConfig;

/// A single semantic problem in a router config.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("services[{index}]: type_name is empty")]
    EmptyTypeName { index: usize },

    #[error("services[{index}] ({type_name}): server is empty")]
    EmptyServiceServer { index: usize, type_name: String },

    #[error("services[{index}] ({type_name}): method name is empty")]
    EmptyMethod { index: usize, type_name: String },

    #[error("services[{index}] ({type_name}): method `{method}` listed more than once")]
    DuplicateMethod { index: usize, type_name: String, method: String },

    #[error("routes[{index}]: server is empty")]
    EmptyRouteServer { index: usize },

    #[error("routes[{index}]: verb is empty")]
    EmptyVerb { index: usize },

    #[error("routes[{index}]: path `{path}` must start with '/'")]
    RelativePath { index: usize, path: String },
}

/// Check a parsed config, collecting every problem found.
pub fn validate_config(config: &RouterConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    for (index, service) in config.services.iter().enumerate() {
        if service.type_name.is_empty() {
            errors.push(ValidationError::EmptyTypeName { index });
        }
        if service.server.is_empty() {
            errors.push(ValidationError::EmptyServiceServer {
                index,
                type_name: service.type_name.clone(),
            });
        }

        let mut seen = HashSet::new();
        for method in &service.methods {
            if method.is_empty() {
                errors.push(ValidationError::EmptyMethod {
                    index,
                    type_name: service.type_name.clone(),
                });
            } else if !seen.insert(method.as_str()) {
                errors.push(ValidationError::DuplicateMethod {
                    index,
                    type_name: service.type_name.clone(),
                    method: method.clone(),
                });
            }
        }
    }

    for (index, route) in config.routes.iter().enumerate() {
        if route.server.is_empty() {
            errors.push(ValidationError::EmptyRouteServer { index });
        }
        if route.verb.is_empty() {
            errors.push(ValidationError::EmptyVerb { index });
        }
        if !route.path.starts_with('/') {
            errors.push(ValidationError::RelativePath {
                index,
                path: route.path.clone(),
            });
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
