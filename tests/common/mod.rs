//! Shared fixtures for integration tests.

use rpc_router::routing::{MiddlewareDeclaration, ServiceDescriptor};

#[allow(dead_code)]
pub const SERVER: &str = "jsonrpc";

/// A user service with middleware at both levels.
#[allow(dead_code)]
pub fn user_service() -> ServiceDescriptor {
    ServiceDescriptor::new("Foo\\Bar\\UserService", SERVER)
        .with_methods(["getProfile", "updateProfile", "delete"])
        .with_middleware(MiddlewareDeclaration::single("B"))
        .with_method_middleware("getProfile", MiddlewareDeclaration::multiple(["A", "B"]))
}

/// A calculator service with an explicit prefix on another server.
#[allow(dead_code)]
pub fn calculator_service() -> ServiceDescriptor {
    ServiceDescriptor::new("App\\JsonRpc\\CalculatorService", "jsonrpc-tcp")
        .with_name("calc/v1")
        .with_methods(["add", "sum"])
}

/// A TOML router config exercising services and manual routes.
#[allow(dead_code)]
pub const SAMPLE_CONFIG: &str = r#"
[observability]
log_level = "debug"

[[services]]
type_name = 'App\Service\OrderItemService'
server = "jsonrpc"
middlewares = ["auth", "trace"]
methods = ["create", "cancel"]

[services.method_middleware.cancel]
middleware = "audit"

[[services]]
type_name = 'App\Service\CalculatorService'
methods = ["add"]

[[routes]]
server = "jsonrpc"
verb = "GET"
path = "/health"
handler = { type_name = 'App\Controller\HealthController', method = "check" }
middlewares = ["metrics"]
"#;
