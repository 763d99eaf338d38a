//! Configuration loading with layered precedence.
//!
//! This module loads configuration with the precedence order (lowest to
//! highest): application defaults, YAML configuration file, environment
//! variables, command-line arguments.
//!
//! Layers are composed manually with `MergeComposer` rather than through the
//! derive's `load()`, because configuration files are YAML with hyphenated
//! section names and because typed environment values must fail fast instead
//! of being silently ignored.
//!
//! # Environment Variable Handling
//!
//! Environment variables with unparseable values (e.g.
//! `NOTEBOOK_HARNESS_SERVER_PORT=http`) return an error immediately. String
//! fields such as `NOTEBOOK_HARNESS_SERVER_HOST` are always accepted.

use camino::{Utf8Path, Utf8PathBuf};
use cap_std::ambient_authority;
use cap_std::fs_utf8::Dir;
use mockable::DefaultEnv;
use ortho_config::MergeComposer;
use ortho_config::discovery::ConfigDiscovery;
use serde_json::{Map, Value};

use crate::config::{Cli, HarnessConfig, ServerSettings};
use crate::error::{ConfigError, Result};

// ============================================================================
// Environment Variable Specification Table
// ============================================================================

/// The type of value expected from an environment variable.
#[derive(Clone, Copy)]
enum EnvVarType {
    /// String value (always accepted).
    String,
    /// TCP port. Invalid values return an error.
    Port,
    /// Unsigned 64-bit integer. Invalid values return an error.
    U64,
}

/// Specification for a single environment variable mapping.
struct EnvVarSpec {
    /// The environment variable name.
    env_var: &'static str,
    /// The JSON path segments, using the file's key names.
    path: &'static [&'static str],
    /// The expected value type.
    var_type: EnvVarType,
}

/// Table of all environment variables and their JSON paths.
const ENV_VAR_SPECS: &[EnvVarSpec] = &[
    EnvVarSpec {
        env_var: "NOTEBOOK_HARNESS_LOG_LEVEL",
        path: &["log_level"],
        var_type: EnvVarType::String,
    },
    EnvVarSpec {
        env_var: "NOTEBOOK_HARNESS_SERVER_HOST",
        path: &["server-settings", "host"],
        var_type: EnvVarType::String,
    },
    EnvVarSpec {
        env_var: "NOTEBOOK_HARNESS_SERVER_PORT",
        path: &["server-settings", "port"],
        var_type: EnvVarType::Port,
    },
    EnvVarSpec {
        env_var: "NOTEBOOK_HARNESS_API_PREFIX",
        path: &["server-settings", "api", "prefix"],
        var_type: EnvVarType::String,
    },
    EnvVarSpec {
        env_var: "NOTEBOOK_HARNESS_TIMEOUT_MS",
        path: &["client-settings", "timeout-ms"],
        var_type: EnvVarType::U64,
    },
];

/// Returns the list of environment variable names recognised by the config loader.
///
/// Tests use this to clear every `NOTEBOOK_HARNESS_*` variable without keeping
/// a second hard-coded list in sync.
#[must_use]
pub fn env_var_names() -> Vec<&'static str> {
    ENV_VAR_SPECS.iter().map(|spec| spec.env_var).collect()
}

/// Read a YAML configuration file into a JSON value.
///
/// Uses `cap_std::fs_utf8` for capability-oriented filesystem access: the
/// parent directory is opened first and the file is read from there.
fn read_config_file(path: &Utf8Path) -> Result<Value> {
    let current_dir = Utf8PathBuf::from(".");
    let parent = path
        .parent()
        .filter(|p| !p.as_str().is_empty())
        .unwrap_or_else(|| current_dir.as_ref());
    let file_name = path.file_name().unwrap_or(path.as_str());

    let dir = Dir::open_ambient_dir(parent, ambient_authority()).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            ConfigError::FileNotFound {
                path: path.as_std_path().to_path_buf(),
            }
        } else {
            ConfigError::ParseError {
                message: format!("failed to open directory {parent}: {e}"),
            }
        }
    })?;

    if !dir.exists(file_name) {
        return Err(ConfigError::FileNotFound {
            path: path.as_std_path().to_path_buf(),
        }
        .into());
    }

    let content = dir
        .read_to_string(file_name)
        .map_err(|e| ConfigError::ParseError {
            message: format!("failed to read {path}: {e}"),
        })?;

    parse_yaml(path, &content)
}

/// Parse YAML text, requiring a mapping (or an empty document) at the root.
fn parse_yaml(path: &Utf8Path, content: &str) -> Result<Value> {
    if content.trim().is_empty() {
        return Ok(Value::Null);
    }
    let value =
        serde_yaml::from_str::<Value>(content).map_err(|e| ConfigError::ParseError {
            message: format!("failed to parse {path}: {e}"),
        })?;

    match value {
        Value::Object(_) | Value::Null => Ok(value),
        _ => Err(ConfigError::ParseError {
            message: format!("failed to parse {path}: expected a mapping at the top level"),
        }
        .into()),
    }
}

/// Push the serialised application defaults onto `composer`.
fn push_defaults(composer: &mut MergeComposer) -> Result<()> {
    let defaults =
        serde_json::to_value(HarnessConfig::default()).map_err(|e| ConfigError::ParseError {
            message: format!("failed to serialise defaults: {e}"),
        })?;
    composer.push_defaults(defaults);
    Ok(())
}

/// Load a single configuration file over the defaults.
///
/// # Errors
///
/// Returns `ConfigError::FileNotFound` if the file does not exist,
/// `ConfigError::ParseError` if it is not valid YAML,
/// `ConfigError::OrthoConfig` if its values do not fit the schema, and
/// `ConfigError::InvalidValue` if the client timeout is zero.
pub fn load_config_file(path: &Utf8Path) -> Result<HarnessConfig> {
    let mut composer = MergeComposer::new();
    push_defaults(&mut composer)?;

    let value = read_config_file(path)?;
    if !value.is_null() {
        composer.push_file(value, Some(path.to_path_buf()));
    }

    let config =
        HarnessConfig::merge_from_layers(composer.layers()).map_err(ConfigError::OrthoConfig)?;
    config.client.validate()?;
    Ok(config)
}

/// Load the `server-settings` section of a configuration file.
///
/// This is the once-per-run entry point for test suites that only need the
/// server location.
///
/// # Errors
///
/// Returns the errors of [`load_config_file`], plus
/// `ConfigError::MissingRequired` when `host` or `port` is absent and
/// `ConfigError::InvalidValue` when the port is unusable.
pub fn load_server_settings(path: &Utf8Path) -> Result<ServerSettings> {
    load_config_file(path)?.server.validate()
}

/// Load configuration with full layer precedence from the process environment.
///
/// # Errors
///
/// As [`load_config_with_env`].
pub fn load_config(cli: &Cli) -> Result<HarnessConfig> {
    load_config_with_env(cli, &DefaultEnv::new())
}

/// Load configuration with full layer precedence.
///
/// This function loads configuration from all available sources:
/// 1. Application defaults defined in the struct
/// 2. Configuration file (`--config`, or discovered via `NOTEBOOK_HARNESS_CONFIG_PATH`
///    and XDG paths)
/// 3. Environment variables prefixed with `NOTEBOOK_HARNESS_`
/// 4. Command-line arguments (from the provided `Cli`)
///
/// Later sources override earlier ones.
///
/// # Errors
///
/// Returns `ConfigError` if:
/// - An explicit `--config` path does not exist
/// - A configuration file is malformed
/// - A typed environment variable has an invalid value
/// - The merged layers do not fit the schema
/// - The merged client timeout is zero
pub fn load_config_with_env<E: mockable::Env>(cli: &Cli, env: &E) -> Result<HarnessConfig> {
    let mut composer = MergeComposer::new();

    // Layer 1: Defaults.
    push_defaults(&mut composer)?;

    // Layer 2: Configuration file. An explicit path must exist.
    let config_path = match cli.config.clone() {
        Some(path) => Some(path),
        None => discover_config_file(),
    };
    if let Some(ref path) = config_path {
        let value = read_config_file(path)?;
        if !value.is_null() {
            composer.push_file(value, Some(path.clone()));
        }
    }

    // Layer 3: Environment variables.
    let env_values = collect_env_vars(env)?;
    if !env_values.is_null() {
        composer.push_environment(env_values);
    }

    // Layer 4: CLI overrides.
    let cli_overrides = build_cli_overrides(cli);
    if !cli_overrides.is_null() {
        composer.push_cli(cli_overrides);
    }

    let config =
        HarnessConfig::merge_from_layers(composer.layers()).map_err(ConfigError::OrthoConfig)?;
    config.client.validate()?;

    Ok(config)
}

/// Find the first existing configuration file among the discovery candidates.
fn discover_config_file() -> Option<Utf8PathBuf> {
    let discovery = ConfigDiscovery::builder("notebook-harness")
        .env_var("NOTEBOOK_HARNESS_CONFIG_PATH")
        .config_file_name("config.yaml")
        .dotfile_name(".notebook-harness.yaml")
        .build();
    discovery
        .candidates()
        .into_iter()
        .filter(|p| p.exists())
        .find_map(|p| Utf8PathBuf::try_from(p).ok())
}

/// Collect `NOTEBOOK_HARNESS_*` environment variables into a JSON value.
///
/// # Errors
///
/// Returns `ConfigError::InvalidValue` if a typed environment variable has an
/// unparseable value.
fn collect_env_vars<E: mockable::Env>(env: &E) -> Result<Value> {
    let mut root = Map::new();

    for spec in ENV_VAR_SPECS {
        let Some(raw_value) = env.string(spec.env_var) else {
            continue;
        };

        let json_value = match spec.var_type {
            EnvVarType::String => Value::String(raw_value),
            EnvVarType::Port => match raw_value.trim().trim_start_matches(':').parse::<u16>() {
                Ok(port) if port != 0 => Value::Number(port.into()),
                _ => {
                    return Err(ConfigError::InvalidValue {
                        field: spec.env_var.to_owned(),
                        reason: format!("expected a port between 1 and 65535, got '{raw_value}'"),
                    }
                    .into());
                }
            },
            EnvVarType::U64 => match raw_value.parse::<u64>() {
                Ok(n) => Value::Number(n.into()),
                Err(_) => {
                    return Err(ConfigError::InvalidValue {
                        field: spec.env_var.to_owned(),
                        reason: format!("expected unsigned integer, got '{raw_value}'"),
                    }
                    .into());
                }
            },
        };

        insert_at_path(&mut root, spec.path, json_value);
    }

    if root.is_empty() {
        Ok(Value::Null)
    } else {
        Ok(Value::Object(root))
    }
}

/// Insert a value at a nested path in a JSON map, creating parents as needed.
fn insert_at_path(root: &mut Map<String, Value>, path: &[&str], value: Value) {
    let Some((&field, parents)) = path.split_last() else {
        return;
    };

    let mut current = root;
    for &segment in parents {
        let entry = current
            .entry(segment.to_owned())
            .or_insert_with(|| Value::Object(Map::new()));
        let Some(obj) = entry.as_object_mut() else {
            return;
        };
        current = obj;
    }

    current.insert(field.to_owned(), value);
}

/// Build a JSON value containing CLI overrides.
fn build_cli_overrides(cli: &Cli) -> Value {
    let mut overrides = Map::new();

    if let Some(ref host) = cli.host {
        insert_at_path(
            &mut overrides,
            &["server-settings", "host"],
            Value::String(host.clone()),
        );
    }

    if let Some(port) = cli.port {
        insert_at_path(
            &mut overrides,
            &["server-settings", "port"],
            Value::Number(port.into()),
        );
    }

    if let Some(ref level) = cli.log_level {
        overrides.insert("log_level".to_owned(), Value::String(level.clone()));
    }

    if overrides.is_empty() {
        Value::Null
    } else {
        Value::Object(overrides)
    }
}
