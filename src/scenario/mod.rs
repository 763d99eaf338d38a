//! Per-scenario state for behaviour tests against the notebook API.
//!
//! A [`ScenarioContext`] is created fresh for every scenario, mutated by its
//! steps, and dropped when the scenario ends. It holds the client's
//! authentication, the placeholder bindings used to resolve endpoint
//! templates, and the last response received.
//!
//! The functions in [`steps`] implement the step vocabulary on top of it.

pub mod steps;


use std::collections::BTreeMap;

use crate::error::{AssertionError, Result};
use crate::fixtures::FixtureId;
use crate::http::{self, BearerToken, HttpExecutor, HttpResponse};

/// Placeholder bound to the subject user's id.
pub const USER_ID_PLACEHOLDER: &str = "_user_id";

/// Placeholder bound to the subject set's id.
pub const SET_ID_PLACEHOLDER: &str = "_set_id";

/// Whether requests are sent with credentials.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthState {
    /// Requests carry no `Authorization` header.
    Unauthenticated,
    /// Requests carry the client's bearer token.
    Authenticated,
}

/// Mutable state of one scenario.
#[derive(Debug, Clone, Default)]
pub struct ScenarioContext {
    token: Option<BearerToken>,
    client_id: Option<FixtureId>,
    url_params: BTreeMap<String, String>,
    response: Option<HttpResponse>,
}

impl ScenarioContext {
    /// Create an unauthenticated context with no bindings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The client's current authentication state.
    #[must_use]
    pub const fn auth_state(&self) -> AuthState {
        if self.token.is_some() {
            AuthState::Authenticated
        } else {
            AuthState::Unauthenticated
        }
    }

    /// Drop the client's credentials.
    pub fn set_unauthenticated(&mut self) {
        self.token = None;
        self.client_id = None;
    }

    /// Act as `client` from now on, sending `token` with every request.
    pub fn authenticate_as(&mut self, client: FixtureId, token: BearerToken) {
        self.client_id = Some(client);
        self.token = Some(token);
    }

    /// The bearer token sent with requests, if any.
    #[must_use]
    pub const fn token(&self) -> Option<&BearerToken> {
        self.token.as_ref()
    }

    /// The user the client is authenticated as, if any.
    #[must_use]
    pub const fn client_id(&self) -> Option<&FixtureId> {
        self.client_id.as_ref()
    }

    /// Bind `placeholder` to `value`, replacing any earlier binding.
    pub fn bind_param(&mut self, placeholder: impl Into<String>, value: impl Into<String>) {
        self.url_params.insert(placeholder.into(), value.into());
    }

    /// Remove every placeholder binding.
    pub fn clear_params(&mut self) {
        self.url_params.clear();
    }

    /// The current placeholder bindings.
    #[must_use]
    pub const fn params(&self) -> &BTreeMap<String, String> {
        &self.url_params
    }

    /// Remember `response` as the outcome of the last request.
    pub fn record_response(&mut self, response: HttpResponse) {
        self.response = Some(response);
    }

    /// The last response received, if a request has been sent.
    #[must_use]
    pub const fn response(&self) -> Option<&HttpResponse> {
        self.response.as_ref()
    }

    /// Send a GET request for `endpoint_template` with this context's
    /// bindings and credentials, and record the response.
    ///
    /// # Errors
    ///
    /// Returns a template error if a placeholder is unbound, or an HTTP error
    /// if the request fails. The previous response is kept on failure.
    pub fn send_get(
        &mut self,
        executor: &HttpExecutor,
        endpoint_template: &str,
    ) -> Result<&HttpResponse> {
        let response =
            executor.send_get(endpoint_template, &self.url_params, self.token.as_ref())?;
        Ok(&*self.response.insert(response))
    }

    /// Check the last response's status code.
    ///
    /// # Errors
    ///
    /// Returns [`AssertionError::NoResponse`] if no request has been sent, or
    /// [`AssertionError::StatusMismatch`] if the codes differ.
    pub fn assert_status(&self, expected: u16) -> std::result::Result<(), AssertionError> {
        let response = self.response.as_ref().ok_or(AssertionError::NoResponse)?;
        http::assert_status(response, expected)
    }
}
