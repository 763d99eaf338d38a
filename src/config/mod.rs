//! Configuration system for the notebook harness.
//!
//! This module provides the configuration structures and CLI definitions for
//! the harness. Layers are merged with `ortho_config`: CLI flags override
//! environment variables, which override the YAML configuration file, which
//! overrides defaults.
//!
//! The configuration file is expected at `~/.config/notebook-harness/config.yaml`
//! by default.
//!
//! # Example Configuration
//!
//! ```yaml
//! log_level: info
//!
//! server-settings:
//!   host: localhost
//!   port: 8080
//!   api:
//!     prefix: /api/v1
//!
//! client-settings:
//!   timeout-ms: 10000
//!
//! fixture-settings:
//!   users-path: /users
//!   sets-path: /sets
//!   login-path: /login
//!   password: bdd-fixture-password
//! ```

mod cli;
mod loader;
mod types;


pub use cli::{Cli, Commands, ProbeArgs};
pub use loader::{
    env_var_names, load_config, load_config_file, load_config_with_env, load_server_settings,
};
pub use types::{
    ApiSection, ClientSettings, FixtureSettings, HarnessConfig, PortSetting, ServerSection,
    ServerSettings,
};
