//! Integration tests for layered configuration.

use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use outfit_advisor_app::{
    AppConfig, DEFAULT_BASE_URL, DEFAULT_LOG_FILTER, ENV_BASE_URL, ENV_LOG, ENV_STORAGE,
    ENV_TIMEOUT_SECS,
};

fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs
        .iter()
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .collect();
    move |key: &str| map.get(key).cloned()
}

#[test]
fn config_env_tests_defaults_without_file_or_env() {
    let mut config = AppConfig::default();
    config.apply_env_from(lookup(&[])).expect("no overrides");

    assert_eq!(config.base_url, DEFAULT_BASE_URL);
    assert_eq!(config.log_filter, DEFAULT_LOG_FILTER);
    assert_eq!(config.storage_path, None);
    assert_eq!(config.request_timeout(), None);
}

#[test]
fn config_env_tests_env_overrides_file_values() {
    let mut config = AppConfig::from_toml_str(
        r#"
base_url = "https://advisor.example.test"
log_filter = "warn"
request_timeout_secs = 10
"#,
    )
    .expect("valid toml");

    config
        .apply_env_from(lookup(&[
            (ENV_BASE_URL, "https://staging.example.test"),
            (ENV_STORAGE, "/tmp/advisor.json"),
            (ENV_LOG, "  "),
            (ENV_TIMEOUT_SECS, "30"),
        ]))
        .expect("valid overrides");

    assert_eq!(config.base_url, "https://staging.example.test");
    assert_eq!(config.storage_path, Some(PathBuf::from("/tmp/advisor.json")));
    assert_eq!(config.log_filter, "warn");
    assert_eq!(config.request_timeout(), Some(Duration::from_secs(30)));
}

#[test]
fn config_env_tests_bad_timeout_is_config_error() {
    let mut config = AppConfig::default();
    let error = config
        .apply_env_from(lookup(&[(ENV_TIMEOUT_SECS, "soon")]))
        .expect_err("non-numeric timeout");
    assert!(error.to_string().contains(ENV_TIMEOUT_SECS));
}

#[test]
fn config_env_tests_load_reads_file() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("advisor.toml");
    std::fs::write(&path, "storage_path = \"state/client.json\"\n").expect("write config");

    let config = AppConfig::from_toml_str(&std::fs::read_to_string(&path).expect("read"))
        .expect("parse");
    assert_eq!(config.storage_path, Some(PathBuf::from("state/client.json")));
    assert!(AppConfig::load(Some(&dir.path().join("missing.toml"))).is_err());
}
