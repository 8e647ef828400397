// SPDX-FileCopyrightText: 2026 Pushline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Integration tests for the settings system.

use pushline_config::diagnostic::ConfigError;
use pushline_config::{load_and_validate_path, load_and_validate_str, load_settings_from_str};
use pushline_core::OperationKind;

#[test]
fn full_settings_deserialize() {
    let toml = r#"
[storage]
database_path = "/tmp/pushline-test.db"
wal_mode = false

[retry]
subscribe_max_retries = 5
token_update_max_retries = 6
push_event_max_retries = 7
mobile_event_max_retries = 8
backoff_secs = 10
max_backoff_secs = 600
periodic_interval_secs = 1800

[network]
timeout_secs = 12
user_agent = "demo-host/1.0"

[foreground]
window_timeout_secs = 45
default_message = "Syncing"

[logging]
level = "debug"
"#;

    let settings = load_settings_from_str(toml).expect("valid TOML should deserialize");
    assert_eq!(settings.storage.database_path, "/tmp/pushline-test.db");
    assert!(!settings.storage.wal_mode);
    assert_eq!(settings.retry.max_retry_count(OperationKind::Subscribe), 5);
    assert_eq!(settings.retry.max_retry_count(OperationKind::TokenUpdate), 6);
    assert_eq!(settings.retry.max_retry_count(OperationKind::PushEvent), 7);
    assert_eq!(settings.retry.max_retry_count(OperationKind::MobileEvent), 8);
    assert_eq!(settings.retry.backoff().as_secs(), 10);
    assert_eq!(settings.retry.periodic_interval().as_secs(), 1800);
    assert_eq!(settings.network.timeout().as_secs(), 12);
    assert_eq!(settings.network.user_agent, "demo-host/1.0");
    assert_eq!(settings.foreground.window_timeout().as_secs(), 45);
    assert_eq!(settings.foreground.default_message, "Syncing");
    assert_eq!(settings.logging.level, "debug");
}

#[test]
fn empty_settings_use_defaults() {
    let settings = load_settings_from_str("").expect("empty TOML should use defaults");
    assert!(settings.storage.database_path.ends_with("pushline.db"));
    assert!(settings.storage.wal_mode);
    assert_eq!(settings.retry.max_retry_count(OperationKind::Subscribe), 15);
    assert_eq!(settings.retry.backoff_secs, 30);
    assert_eq!(settings.retry.periodic_interval_secs, 900);
    assert_eq!(settings.network.timeout_secs, 30);
    assert!(settings.network.user_agent.starts_with("pushline/"));
    assert_eq!(settings.foreground.window_timeout_secs, 60);
    assert_eq!(settings.logging.level, "info");
}

#[test]
fn unknown_key_is_rejected_with_suggestion() {
    let toml = r#"
[retry]
backof_secs = 5
"#;
    let errors = load_and_validate_str(toml).expect_err("unknown key should fail");
    assert_eq!(errors.len(), 1);
    match &errors[0] {
        ConfigError::UnknownKey {
            key, suggestion, ..
        } => {
            assert_eq!(key, "backof_secs");
            assert_eq!(suggestion.as_deref(), Some("backoff_secs"));
        }
        other => panic!("expected UnknownKey, got {other:?}"),
    }
}

#[test]
fn wrong_type_is_reported() {
    let toml = r#"
[network]
timeout_secs = "soon"
"#;
    let errors = load_and_validate_str(toml).expect_err("wrong type should fail");
    assert!(
        matches!(&errors[0], ConfigError::InvalidType { key, .. } if key.contains("timeout_secs")),
        "got {errors:?}"
    );
}

#[test]
fn semantic_validation_runs_after_parse() {
    let toml = r#"
[retry]
backoff_secs = 0
"#;
    let errors = load_and_validate_str(toml).expect_err("zero backoff should fail");
    assert!(errors.iter().any(|e| e.to_string().contains("backoff_secs")));
}

#[test]
fn settings_file_is_loaded_from_path() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("pushline.toml");
    std::fs::write(&path, "[logging]\nlevel = \"warn\"\n").unwrap();

    let settings = load_and_validate_path(&path).expect("file should load");
    assert_eq!(settings.logging.level, "warn");
}

#[test]
fn env_override_is_applied_to_file_settings() {
    figment::Jail::expect_with(|jail| {
        jail.create_file("pushline.toml", "[network]\ntimeout_secs = 10\n")?;
        jail.set_env("PUSHLINE_NETWORK_TIMEOUT_SECS", "3");

        let settings = load_and_validate_path(std::path::Path::new("pushline.toml"))
            .expect("env override should load");
        assert_eq!(settings.network.timeout_secs, 3);
        Ok(())
    });
}

#[test]
fn misspelled_env_variable_names_the_right_one() {
    figment::Jail::expect_with(|jail| {
        jail.create_file("pushline.toml", "")?;
        jail.set_env("PUSHLINE_RETRY_BACKOF_SECS", "5");

        let errors = load_and_validate_path(std::path::Path::new("pushline.toml"))
            .expect_err("unknown variable should fail");
        match &errors[0] {
            ConfigError::UnknownKey {
                key,
                env_hint,
                origin,
                ..
            } => {
                assert_eq!(key, "backof_secs");
                assert_eq!(env_hint.as_deref(), Some("PUSHLINE_RETRY_BACKOFF_SECS"));
                assert!(origin.contains("PUSHLINE_"), "origin was {origin}");
            }
            other => panic!("expected UnknownKey, got {other:?}"),
        }
        Ok(())
    });
}
