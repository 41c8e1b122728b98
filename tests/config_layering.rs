//! Configuration resolution: environment over file over defaults.

use serial_test::serial;
use std::env;
use std::fs;
use stockroom::ServiceConfig;

const ENV_VARS: &[&str] = &[
    "STOCKROOM_MAX_LINE_ITEMS",
    "STOCKROOM_ROLLBACK_RETRY_ATTEMPTS",
    "STOCKROOM_ROLLBACK_RETRY_DELAY_MS",
];

fn clear_env() {
    for name in ENV_VARS {
        unsafe {
            env::remove_var(name);
        }
    }
}

#[test]
#[serial]
fn defaults_apply_when_nothing_is_configured() {
    clear_env();
    let config = ServiceConfig::load(None).expect("config");
    assert_eq!(config.max_line_items, 100);
    assert_eq!(config.rollback_retry_attempts, 3);
    assert_eq!(config.rollback_retry_delay_ms, 50);
}

#[test]
#[serial]
fn yaml_file_overrides_defaults() {
    clear_env();
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("stockroom.yaml");
    fs::write(&path, "max_line_items: 25\nrollback_retry_attempts: 5\n").expect("write config");

    let config = ServiceConfig::load(Some(&path)).expect("config");
    assert_eq!(config.max_line_items, 25);
    assert_eq!(config.rollback_retry_attempts, 5);
    assert_eq!(config.rollback_retry_delay_ms, 50);
}

#[test]
#[serial]
fn json_file_overrides_defaults() {
    clear_env();
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("stockroom.json");
    fs::write(&path, r#"{"rollback_retry_delay_ms": 250}"#).expect("write config");

    let config = ServiceConfig::load(Some(&path)).expect("config");
    assert_eq!(config.rollback_retry_delay_ms, 250);
    assert_eq!(config.max_line_items, 100);
}

#[test]
#[serial]
fn environment_beats_config_file() {
    clear_env();
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("stockroom.yaml");
    fs::write(&path, "max_line_items: 25\n").expect("write config");

    unsafe {
        env::set_var("STOCKROOM_MAX_LINE_ITEMS", "7");
    }
    let config = ServiceConfig::load(Some(&path)).expect("config");
    clear_env();

    assert_eq!(config.max_line_items, 7);
}

#[test]
#[serial]
fn invalid_values_are_rejected() {
    clear_env();
    let dir = tempfile::tempdir().expect("tempdir");

    let path = dir.path().join("stockroom.yaml");
    fs::write(&path, "max_line_items: 0\n").expect("write config");
    let err = ServiceConfig::load(Some(&path)).expect_err("zero line items");
    assert!(err.to_string().contains("max_line_items"));

    unsafe {
        env::set_var("STOCKROOM_ROLLBACK_RETRY_ATTEMPTS", "not-a-number");
    }
    let err = ServiceConfig::load(None).expect_err("bad env value");
    clear_env();
    assert!(err.to_string().contains("STOCKROOM_ROLLBACK_RETRY_ATTEMPTS"));
}

#[test]
#[serial]
fn unsupported_config_extension_is_rejected() {
    clear_env();
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("stockroom.toml");
    fs::write(&path, "max_line_items = 25\n").expect("write config");

    let err = ServiceConfig::load(Some(&path)).expect_err("unsupported extension");
    assert!(err.to_string().contains("unsupported config extension"));
}
