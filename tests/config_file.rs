//! Building a factory from a config file on disk.

use std::io::Write;
use rpc_router::config::{load_config, ConfigError};
use rpc_router::routing::{DispatcherFactory, Handler, Resolution, RouterHandle};

mod common;

fn write_config(content: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

#[test]
fn test_sample_config_routes() {
    let file = write_config(common::SAMPLE_CONFIG);
    let config = load_config(file.path()).unwrap();
    let factory = DispatcherFactory::from_config(&config).unwrap();

    assert_eq!(
        factory.resolve("jsonrpc", "POST", "/order_item/cancel"),
        Resolution::Match {
            handler: Handler::new("App\\Service\\OrderItemService", "cancel")
        }
    );
    assert_eq!(
        factory.middlewares_for("jsonrpc", "POST", "/order_item/cancel"),
        vec!["audit", "auth", "trace"]
    );
    assert_eq!(
        factory.middlewares_for("jsonrpc", "POST", "/order_item/create"),
        vec!["auth", "trace"]
    );

    // Default server for services without one.
    assert!(factory.resolve("jsonrpc-http", "POST", "/calculator/add").handler().is_some());

    // Manual route from the [[routes]] table.
    assert!(factory.resolve("jsonrpc", "GET", "/health").handler().is_some());
    assert_eq!(factory.middlewares_for("jsonrpc", "GET", "/health"), vec!["metrics"]);
}

#[test]
fn test_invalid_file_rejected() {
    let file = write_config(
        r#"
        [[services]]
        type_name = ""
        "#,
    );
    let err = load_config(file.path()).unwrap_err();
    assert!(matches!(err, ConfigError::Validation(ref errors) if errors.len() == 1));
}

#[test]
fn test_handle_reload_from_file() {
    let file = write_config(common::SAMPLE_CONFIG);
    let config = load_config(file.path()).unwrap();
    let handle = RouterHandle::new(DispatcherFactory::empty());
    assert_eq!(handle.load().resolve("jsonrpc", "GET", "/health"), Resolution::NotFound);

    handle.reload(&config).unwrap();
    assert!(handle.load().resolve("jsonrpc", "GET", "/health").handler().is_some());
}
