//! Shared fixtures and helper functions for config tests.

use std::sync::Arc;

use ortho_config::MergeComposer;
use rstest::fixture;

use crate::config::{HarnessConfig, PortSetting, ServerSection};

/// Fixture providing a `HarnessConfig` parsed from a full YAML example.
#[fixture]
pub fn harness_config_from_full_yaml() -> HarnessConfig {
    let yaml = r"
log_level: debug
server-settings:
  host: notebook.internal
  port: ':8080'
  api:
    prefix: /api/v1
client-settings:
  timeout-ms: 2500
fixture-settings:
  users-path: /accounts
  sets-path: /workouts
  login-path: /session
  password: hunter22
";

    serde_yaml::from_str(yaml).expect("YAML parsing should succeed")
}

/// Fixture providing a `HarnessConfig` parsed from a minimal YAML example.
#[fixture]
pub fn harness_config_from_partial_yaml() -> HarnessConfig {
    let yaml = r"
server-settings:
  host: localhost
  port: 8080
";

    serde_yaml::from_str(yaml).expect("YAML parsing should succeed")
}

/// Fixture providing a complete `server-settings` section.
#[fixture]
pub fn server_section_complete() -> ServerSection {
    ServerSection {
        host: Some(String::from("localhost")),
        port: Some(PortSetting::Number(8080)),
        ..ServerSection::default()
    }
}

/// Helper: Creates a `MergeComposer` with defaults layer already pushed.
pub fn create_composer_with_defaults() -> Result<MergeComposer, serde_json::Error> {
    let mut composer = MergeComposer::new();
    let defaults = serde_json::to_value(HarnessConfig::default())?;
    composer.push_defaults(defaults);
    Ok(composer)
}

/// Helper: Merges layers from a composer into `HarnessConfig`.
pub fn merge_config(
    composer: MergeComposer,
) -> Result<HarnessConfig, Arc<ortho_config::OrthoError>> {
    HarnessConfig::merge_from_layers(composer.layers())
}

/// Helper: Asserts that a config has all default values.
pub fn assert_config_has_defaults(config: &HarnessConfig) {
    assert!(config.log_level.is_none(), "log_level should be None");
    assert!(config.server.host.is_none(), "server host should be None");
    assert!(config.server.port.is_none(), "server port should be None");
    assert!(
        config.server.api.prefix.is_none(),
        "api prefix should be None"
    );
    assert_eq!(config.client.timeout_ms, 10_000, "timeout should be 10 s");
    assert_eq!(config.fixtures.users_path, "/users");
    assert_eq!(config.fixtures.sets_path, "/sets");
    assert_eq!(config.fixtures.login_path, "/login");
}
