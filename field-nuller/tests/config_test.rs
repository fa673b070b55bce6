use field_nuller::{Config, NullerError};
use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

fn config_from(pairs: &[(&str, &str)]) -> field_nuller::Result<Config> {
    let values: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    Config::from_lookup(|key| values.get(key).cloned())
}

#[test]
fn test_defaults_apply_when_nothing_is_set() {
    let config = config_from(&[]).unwrap();
    assert_eq!(config.update_url(), "https://api.example.com/v1/contacts/update");
    assert_eq!(config.flow, "client_credentials");
    assert_eq!(config.batch_size, 100);
    assert_eq!(config.staging_path(), PathBuf::from("output").join("batches.json"));
    assert_eq!(config.results_dir(), PathBuf::from("output").join("results"));
    assert!(config.api_key.is_none());
}

#[test]
fn test_values_override_defaults() {
    let config = config_from(&[
        ("BASE_URL", "https://crm.internal/api/"),
        ("TOKEN_URL", "https://crm.internal/token"),
        ("FLOW", "client_credentials"),
        ("SCOPE", "contacts"),
        ("BATCH_SIZE", "250"),
        ("DISPATCH_DELAY_MS", "0"),
        ("REQUEST_TIMEOUT_SECS", "10"),
        ("OUTPUT_DIR", "/tmp/nuller"),
        ("API_KEY", " key "),
        ("API_SECRET", ""),
    ])
    .unwrap();

    assert_eq!(config.update_url(), "https://crm.internal/api/contacts/update");
    assert_eq!(config.scope, "contacts");
    assert_eq!(config.batch_size, 100);
    assert_eq!(config.dispatch_delay, Duration::ZERO);
    assert_eq!(config.request_timeout, Duration::from_secs(10));
    assert_eq!(config.results_dir(), PathBuf::from("/tmp/nuller/results"));
    assert_eq!(config.api_key.as_deref(), Some("key"));
    assert!(config.api_secret.is_none());
}

#[test]
fn test_malformed_values_are_rejected() {
    assert!(matches!(
        config_from(&[("BATCH_SIZE", "lots")]),
        Err(NullerError::Config(_))
    ));
    assert!(matches!(
        config_from(&[("BASE_URL", "not a url")]),
        Err(NullerError::InvalidUrl(_))
    ));
    assert!(matches!(
        config_from(&[("TOKEN_URL", "ftp://auth.example.com")]),
        Err(NullerError::Config(_))
    ));
}
