//! [`FixtureApi`] over the notebook's HTTP API.

use tracing::info;
use uuid::Uuid;

use super::payload::{self, Credentials, Document, SetAttributes, UserAttributes};
use super::{FixtureApi, FixtureId, FixtureKind};
use crate::config::FixtureSettings;
use crate::error::{FixtureError, Result};
use crate::http::{BearerToken, HttpExecutor, HttpResponse};

/// Creates fixtures by calling the notebook API.
#[derive(Debug)]
pub struct NotebookFixtures<'a> {
    executor: &'a HttpExecutor,
    settings: FixtureSettings,
}

impl<'a> NotebookFixtures<'a> {
    /// Create fixtures through `executor` using the paths in `settings`.
    #[must_use]
    pub const fn new(executor: &'a HttpExecutor, settings: FixtureSettings) -> Self {
        Self { executor, settings }
    }

    /// Check a creation response and pull the new fixture's id out of it.
    fn created_id(kind: FixtureKind, response: HttpResponse) -> Result<FixtureId> {
        if !response.is_success() {
            return Err(FixtureError::CreationFailed {
                kind,
                status: response.status,
                body: response.body,
            }
            .into());
        }
        let id = response
            .json()
            .as_ref()
            .and_then(payload::resource_id)
            .ok_or_else(|| FixtureError::MalformedResponse {
                operation: match kind {
                    FixtureKind::User => "create user",
                    FixtureKind::Set => "create set",
                },
                message: String::from("missing data.id"),
            })?;
        Ok(FixtureId::new(id))
    }
}

/// An email address no earlier run has registered.
///
/// Emails must be 6 to 32 characters long; this one is 28.
fn unique_email() -> String {
    let simple = Uuid::new_v4().simple().to_string();
    let tag = simple.get(..12).unwrap_or(&simple);
    format!("bdd-{tag}@example.com")
}

impl FixtureApi for NotebookFixtures<'_> {
    fn create_user(&self) -> Result<FixtureId> {
        let body = Document::new(
            "user",
            UserAttributes {
                first_name: "Fixture",
                last_name: "User",
                email: unique_email(),
                password: self.settings.password.clone(),
            },
        );
        let response = self
            .executor
            .post_json(&self.settings.users_path, &body, None)?;
        let id = Self::created_id(FixtureKind::User, response)?;
        info!(user_id = %id, "created user fixture");
        Ok(id)
    }

    fn create_set(&self, owner: &BearerToken) -> Result<FixtureId> {
        let body = Document::new(
            "set",
            SetAttributes {
                movement: "Squat",
                volume: 5.0,
                intensity: 80.0,
            },
        );
        let response = self
            .executor
            .post_json(&self.settings.sets_path, &body, Some(owner))?;
        let id = Self::created_id(FixtureKind::Set, response)?;
        info!(set_id = %id, "created set fixture");
        Ok(id)
    }

    fn login(&self, user: &FixtureId) -> Result<BearerToken> {
        let body = Credentials {
            user_id: user.as_str(),
            password: &self.settings.password,
        };
        let response = self
            .executor
            .post_json(&self.settings.login_path, &body, None)?;
        if !response.is_success() {
            return Err(FixtureError::AuthenticationFailed {
                user_id: user.to_string(),
                status: response.status,
            }
            .into());
        }
        let token = response
            .json()
            .as_ref()
            .and_then(payload::login_token)
            .ok_or_else(|| FixtureError::MalformedResponse {
                operation: "login",
                message: String::from("missing token"),
            })?;
        info!(user_id = %user, "logged in fixture user");
        Ok(BearerToken::new(token))
    }
}
