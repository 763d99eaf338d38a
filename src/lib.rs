//! Behaviour-driven HTTP checks for the training-notebook API.
//!
//! `notebook_harness` drives a running notebook server the way a client would:
//! it creates real users and sets through the API, logs fixture users in to
//! obtain bearer tokens, substitutes fixture ids into endpoint templates, and
//! asserts on the status codes the server returns.
//!
//! Behaviour scenarios bind their step phrases to the handlers in
//! [`scenario::steps`], each of which operates on a fresh
//! [`scenario::ScenarioContext`].
//!
//! # Modules
//!
//! - [`config`]: Configuration system with layered precedence (CLI > env > file > defaults)
//! - [`error`]: Semantic error types for the harness
//! - [`fixtures`]: Fixture creation and login against the notebook API
//! - [`http`]: HTTP step execution with bounded timeouts
//! - [`scenario`]: Per-scenario state and step handlers
//! - [`template`]: Endpoint template resolution

pub mod config;
pub mod error;
pub mod fixtures;
pub mod http;
pub mod scenario;
pub mod template;
