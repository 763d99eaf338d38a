//! Configuration data types for the notebook harness.

use ortho_config::{OrthoConfig, OrthoResult, PostMergeContext, PostMergeHook};
use serde::{Deserialize, Serialize};
use smart_default::SmartDefault;

use crate::error::ConfigError;

/// A port as written in configuration: `8080`, `"8080"` or `":8080"`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum PortSetting {
    /// A bare integer.
    Number(u64),
    /// A string, optionally with a leading colon.
    Text(String),
}

impl PortSetting {
    /// Parse the setting into a non-zero TCP port.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` for non-numeric, zero, or
    /// out-of-range ports.
    pub fn to_port(&self) -> Result<u16, ConfigError> {
        let invalid = |reason: String| ConfigError::InvalidValue {
            field: String::from("server-settings.port"),
            reason,
        };
        let port = match self {
            Self::Number(n) => {
                u16::try_from(*n).map_err(|_| invalid(format!("{n} is out of range")))?
            }
            Self::Text(raw) => {
                let digits = raw.trim().trim_start_matches(':');
                digits
                    .parse::<u16>()
                    .map_err(|_| invalid(format!("expected a port number, got '{raw}'")))?
            }
        };
        if port == 0 {
            return Err(invalid(String::from("must be between 1 and 65535")));
        }
        Ok(port)
    }
}

/// API routing configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ApiSection {
    /// Path prefix under which the API is mounted, such as `/api/v1`.
    pub prefix: Option<String>,
}

/// The `server-settings` section as written in the configuration file.
///
/// Every field is optional here so that layers can be merged; call
/// [`validate`](Self::validate) to obtain a complete [`ServerSettings`].
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ServerSection {
    /// Host name or address, optionally with a scheme.
    pub host: Option<String>,

    /// TCP port of the API server.
    pub port: Option<PortSetting>,

    /// API routing configuration.
    #[serde(default)]
    pub api: ApiSection,
}

impl ServerSection {
    /// Validate the section into immutable [`ServerSettings`].
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::MissingRequired` listing every missing field, or
    /// `ConfigError::InvalidValue` if the port cannot be used. No partially
    /// populated settings are ever returned.
    pub fn validate(&self) -> crate::error::Result<ServerSettings> {
        let host = self
            .host
            .as_deref()
            .map(str::trim)
            .filter(|host| !host.is_empty());

        let (host, port) = match (host, self.port.as_ref()) {
            (Some(host), Some(port)) => (host, port),
            (host, port) => {
                let mut missing = Vec::new();
                if host.is_none() {
                    missing.push("server-settings.host");
                }
                if port.is_none() {
                    missing.push("server-settings.port");
                }
                return Err(ConfigError::MissingRequired {
                    field: missing.join(", "),
                }
                .into());
            }
        };

        let settings = ServerSettings::new(host, port.to_port()?);
        Ok(match self.api.prefix.as_deref() {
            Some(prefix) => settings.with_api_prefix(prefix),
            None => settings,
        })
    }
}

/// Validated server location. Immutable once loaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerSettings {
    host: String,
    port: u16,
    api_prefix: Option<String>,
}

impl ServerSettings {
    /// Create settings for `host` and `port` with no API prefix.
    #[must_use]
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            api_prefix: None,
        }
    }

    /// Mount the API under `prefix`. Empty prefixes are ignored.
    #[must_use]
    pub fn with_api_prefix(mut self, prefix: &str) -> Self {
        let trimmed = prefix.trim().trim_end_matches('/');
        self.api_prefix = if trimmed.is_empty() {
            None
        } else if trimmed.starts_with('/') {
            Some(trimmed.to_owned())
        } else {
            Some(format!("/{trimmed}"))
        };
        self
    }

    /// The configured host.
    #[must_use]
    pub fn host(&self) -> &str {
        &self.host
    }

    /// The configured port.
    #[must_use]
    pub const fn port(&self) -> u16 {
        self.port
    }

    /// The API prefix, if any.
    #[must_use]
    pub fn api_prefix(&self) -> Option<&str> {
        self.api_prefix.as_deref()
    }

    /// The URL that endpoint paths are appended to.
    ///
    /// Hosts without a scheme are served over `http://`. Host and port are
    /// always separated by exactly one colon.
    #[must_use]
    pub fn base_url(&self) -> String {
        let host = self.host.trim_end_matches('/');
        let prefix = self.api_prefix.as_deref().unwrap_or_default();
        if host.contains("://") {
            format!("{host}:{}{prefix}", self.port)
        } else {
            format!("http://{host}:{}{prefix}", self.port)
        }
    }
}

/// HTTP client limits.
#[derive(Debug, Clone, Deserialize, Serialize, SmartDefault)]
#[serde(default, rename_all = "kebab-case")]
pub struct ClientSettings {
    /// Upper bound on a single request, in milliseconds.
    #[default = 10_000]
    pub timeout_ms: u64,
}

impl ClientSettings {
    /// Check that the limits allow a request to complete at all.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` when the timeout is zero.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.timeout_ms == 0 {
            return Err(ConfigError::InvalidValue {
                field: String::from("client-settings.timeout-ms"),
                reason: String::from("must be greater than zero"),
            });
        }
        Ok(())
    }
}

/// Endpoints and credentials used to create fixtures.
#[derive(Debug, Clone, Deserialize, Serialize, SmartDefault)]
#[serde(default, rename_all = "kebab-case")]
pub struct FixtureSettings {
    /// Path of the user collection.
    #[default = "/users"]
    pub users_path: String,

    /// Path of the set collection.
    #[default = "/sets"]
    pub sets_path: String,

    /// Path of the login endpoint.
    #[default = "/login"]
    pub login_path: String,

    /// Password given to every fixture user.
    #[default = "bdd-fixture-password"]
    pub password: String,
}

/// Root harness configuration.
///
/// This structure is loaded from configuration files, environment variables,
/// and command-line arguments with layered precedence. The precedence order
/// (lowest to highest) is: defaults, configuration file, environment variables,
/// command-line arguments.
///
/// Configuration files are discovered in this order:
/// 1. Path specified via `NOTEBOOK_HARNESS_CONFIG_PATH` environment variable
/// 2. `.notebook-harness.yaml` in the current working directory
/// 3. `.notebook-harness.yaml` in the home directory
/// 4. `~/.config/notebook-harness/config.yaml` (XDG default)
#[derive(Debug, Clone, Default, Deserialize, Serialize, OrthoConfig)]
#[ortho_config(
    prefix = "NOTEBOOK_HARNESS",
    post_merge_hook,
    discovery(
        app_name = "notebook-harness",
        env_var = "NOTEBOOK_HARNESS_CONFIG_PATH",
        config_file_name = "config.yaml",
        dotfile_name = ".notebook-harness.yaml",
        config_cli_long = "config",
        config_cli_visible = true,
    )
)]
pub struct HarnessConfig {
    /// Default `tracing` filter directive when `RUST_LOG` is unset.
    pub log_level: Option<String>,

    /// Location of the API server under test.
    #[serde(default, rename = "server-settings")]
    #[ortho_config(skip_cli)]
    pub server: ServerSection,

    /// HTTP client limits.
    #[serde(default, rename = "client-settings")]
    #[ortho_config(skip_cli)]
    pub client: ClientSettings,

    /// Fixture creation endpoints.
    #[serde(default, rename = "fixture-settings")]
    #[ortho_config(skip_cli)]
    pub fixtures: FixtureSettings,
}

impl PostMergeHook for HarnessConfig {
    fn post_merge(&mut self, _ctx: &PostMergeContext) -> OrthoResult<()> {
        if let Some(host) = self.server.host.as_mut() {
            *host = host.trim().trim_end_matches('/').to_owned();
        }
        if let Some(prefix) = self.server.api.prefix.as_mut() {
            let trimmed = prefix.trim().trim_end_matches('/');
            *prefix = if trimmed.is_empty() || trimmed.starts_with('/') {
                trimmed.to_owned()
            } else {
                format!("/{trimmed}")
            };
        }
        Ok(())
    }
}
