#![allow(clippy::unwrap_used, clippy::expect_used)]

//! Configuration loading and its effect on routing

mod common;

use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

use common::{body, get, ShopApp};
use cprouter::handler::text;
use cprouter::registry::ContinuationRegistry;
use cprouter::runtime_config::{ConfigError, RuntimeConfig};
use cprouter::{CaseSensitivity, Router};
use http::StatusCode;

#[test]
fn test_config_file_round_trips_into_router() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        "case_sensitivity: sensitive\nresume_marker: resume\nfactory_key_width: 2\ninstance_key_len: 12\ncontinuation_ttl_secs: 30"
    )
    .unwrap();

    let config = RuntimeConfig::from_file(file.path()).unwrap();
    assert_eq!(config.case_sensitivity, CaseSensitivity::Sensitive);
    assert_eq!(config.continuation_ttl(), Duration::from_secs(30));

    let registry = Arc::new(ContinuationRegistry::new(config.registry_config()));
    let router = Router::with_config(ShopApp::new(), Arc::clone(&registry), &config);
    assert_eq!(router.resume_marker(), "resume");
    assert_eq!(router.case_sensitivity(), CaseSensitivity::Sensitive);

    let key = registry.mint_handler(text("configured")).unwrap();
    assert_eq!(key.len(), 14);
    assert_eq!(body(&get(&router, &format!("/resume/{key}"))), "configured");
    assert_eq!(get(&router, "/home").status(), StatusCode::NOT_FOUND);
}

#[test]
fn test_partial_file_keeps_defaults() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "instance_key_len: 16").unwrap();

    let config = RuntimeConfig::from_file(file.path()).unwrap();
    assert_eq!(config.instance_key_len, 16);
    assert_eq!(config.factory_key_width, 3);
    assert_eq!(config.resume_marker, "x");
    assert_eq!(config.case_sensitivity, CaseSensitivity::Insensitive);
}

#[test]
fn test_missing_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = RuntimeConfig::from_file(dir.path().join("absent.yaml")).unwrap_err();
    assert!(matches!(err, ConfigError::Io { .. }));
    assert!(err.to_string().contains("absent.yaml"));
}

#[test]
fn test_zero_width_in_file_is_rejected() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "factory_key_width: 0").unwrap();
    let err = RuntimeConfig::from_file(file.path()).unwrap_err();
    assert!(matches!(err, ConfigError::Invalid { field: "factory_key_width", .. }));
}
