//! Semantic error types for the notebook harness.
//!
//! This module defines the error hierarchy for the harness, following the
//! principle of using semantic error enums (via `thiserror`) for conditions a
//! scenario might inspect or report, while reserving opaque errors
//! (`eyre::Report`) for the binary boundary.

use std::path::PathBuf;
use std::sync::Arc;

use thiserror::Error;

use crate::fixtures::FixtureKind;

/// Errors that can occur during configuration loading and validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file was not found at the expected path.
    #[error("configuration file not found: {path}")]
    FileNotFound {
        /// The path where the configuration file was expected.
        path: PathBuf,
    },

    /// The configuration file could not be parsed.
    #[error("failed to parse configuration file: {message}")]
    ParseError {
        /// A description of the parse error.
        message: String,
    },

    /// A required configuration value is missing.
    #[error("missing required configuration: {field}")]
    MissingRequired {
        /// The name of the missing field.
        field: String,
    },

    /// A configuration value failed validation.
    #[error("invalid configuration value for '{field}': {reason}")]
    InvalidValue {
        /// The name of the invalid field.
        field: String,
        /// The reason the value is invalid.
        reason: String,
    },

    /// The `OrthoConfig` library returned an error while merging layers.
    #[error("configuration loading failed: {0}")]
    OrthoConfig(Arc<ortho_config::OrthoError>),
}

/// Errors raised while creating fixtures or authenticating fixture users.
#[derive(Debug, Error)]
pub enum FixtureError {
    /// The server rejected a fixture creation request.
    #[error("failed to create {kind} fixture: server responded with {status}: {body}")]
    CreationFailed {
        /// The kind of fixture being created.
        kind: FixtureKind,
        /// The HTTP status code returned by the server.
        status: u16,
        /// The response body, kept for diagnosis.
        body: String,
    },

    /// The server rejected a login request for a fixture user.
    #[error("authentication failed for user '{user_id}': server responded with {status}")]
    AuthenticationFailed {
        /// The fixture user that attempted to log in.
        user_id: String,
        /// The HTTP status code returned by the server.
        status: u16,
    },

    /// A success response did not carry the expected field.
    #[error("malformed {operation} response: {message}")]
    MalformedResponse {
        /// The operation whose response was malformed.
        operation: &'static str,
        /// A description of what was missing or invalid.
        message: String,
    },

    /// A set fixture was requested without an owner token.
    #[error("cannot create a set fixture without an owner token")]
    MissingOwner,
}

/// Errors raised while resolving endpoint templates.
#[derive(Debug, Error)]
pub enum TemplateError {
    /// A placeholder in the template had no bound value.
    #[error("unresolved placeholder '{placeholder}' in endpoint '{template}'")]
    UnresolvedPlaceholder {
        /// The placeholder token left in the template.
        placeholder: String,
        /// The endpoint template as written in the step.
        template: String,
    },
}

/// Errors raised by the HTTP step executor.
#[derive(Debug, Error)]
pub enum HttpError {
    /// The request did not complete within the configured timeout.
    #[error("request to {url} timed out after {millis} ms")]
    Timeout {
        /// The request URL.
        url: String,
        /// The timeout that elapsed, in milliseconds.
        millis: u64,
    },

    /// The request could not be built, sent, or its body read.
    #[error("request to {url} failed: {message}")]
    RequestFailed {
        /// The request URL.
        url: String,
        /// A description of the transport failure.
        message: String,
    },

    /// The HTTP client could not be constructed.
    #[error("failed to build HTTP client: {message}")]
    ClientBuildFailed {
        /// A description of the build failure.
        message: String,
    },

    /// The Tokio runtime backing synchronous requests could not be created.
    #[error("failed to create async runtime: {message}")]
    RuntimeCreationFailed {
        /// A description of the runtime failure.
        message: String,
    },
}

/// Failures of response expectations.
#[derive(Debug, Error)]
pub enum AssertionError {
    /// The observed status code differs from the expected one.
    #[error("expected status code {expected} but server responded with {observed}")]
    StatusMismatch {
        /// The status code the step expected.
        expected: u16,
        /// The status code the server returned.
        observed: u16,
        /// The response body, kept for diagnosis.
        body: String,
    },

    /// A status assertion ran before any request was sent.
    #[error("no response recorded: send a request before asserting on it")]
    NoResponse,
}

/// Top-level error type for the notebook harness.
///
/// This enum aggregates all domain-specific errors into a single type used
/// throughout the library. The binary converts it into `eyre::Report`; the
/// behaviour tests render it into step failures.
#[derive(Debug, Error)]
pub enum HarnessError {
    /// An error occurred during configuration.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// An error occurred while preparing fixtures.
    #[error(transparent)]
    Fixture(#[from] FixtureError),

    /// An endpoint template could not be resolved.
    #[error(transparent)]
    Template(#[from] TemplateError),

    /// An error occurred at the HTTP boundary.
    #[error(transparent)]
    Http(#[from] HttpError),

    /// A response expectation failed.
    #[error(transparent)]
    Assertion(#[from] AssertionError),
}

/// A specialised `Result` type for harness operations.
pub type Result<T> = std::result::Result<T, HarnessError>;
