//! Fixture registry for the notebook API.
//!
//! Scenarios need real users and sets on the server under test before they
//! can probe access rules. [`FixtureApi`] is the capability to create them
//! and to log fixture users in; [`NotebookFixtures`] implements it with real
//! HTTP calls through an [`HttpExecutor`](crate::http::HttpExecutor).

mod notebook;
mod payload;


use std::fmt;

use crate::error::{FixtureError, Result};
use crate::http::BearerToken;

pub use notebook::NotebookFixtures;

/// A user id that no server will ever have assigned.
///
/// Twenty-four zeroes: the length of a MongoDB `ObjectId` in hex.
pub const INVALID_USER_ID: &str = "000000000000000000000000";

/// A set id that no server will ever have assigned.
pub const INVALID_SET_ID: &str = "000000000000000000000000";

/// The kinds of fixture a scenario can create.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FixtureKind {
    /// A registered user.
    User,
    /// A training set owned by a user.
    Set,
}

impl fmt::Display for FixtureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::User => f.write_str("user"),
            Self::Set => f.write_str("set"),
        }
    }
}

/// Opaque identifier assigned to a fixture by the server.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FixtureId(String);

impl FixtureId {
    /// Wrap a server-assigned id.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Return the id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FixtureId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Creates fixtures on the server under test.
///
/// Every call reaches the server; nothing is cached between calls, so each
/// scenario sees freshly created records.
#[cfg_attr(test, mockall::automock)]
pub trait FixtureApi {
    /// Register a new user with a unique email address.
    ///
    /// # Errors
    ///
    /// Returns [`FixtureError::CreationFailed`] if the server rejects the
    /// request, or [`FixtureError::MalformedResponse`] if no id comes back.
    fn create_user(&self) -> Result<FixtureId>;

    /// Create a set owned by the user that `owner` authenticates.
    ///
    /// # Errors
    ///
    /// As [`FixtureApi::create_user`].
    fn create_set(&self, owner: &BearerToken) -> Result<FixtureId>;

    /// Log `user` in with the fixture password.
    ///
    /// # Errors
    ///
    /// Returns [`FixtureError::AuthenticationFailed`] if the server rejects
    /// the credentials, or [`FixtureError::MalformedResponse`] if no token
    /// comes back.
    fn login(&self, user: &FixtureId) -> Result<BearerToken>;
}

/// Create a fixture of `kind`, owned by `owner` where the kind needs one.
///
/// # Errors
///
/// Returns [`FixtureError::MissingOwner`] when a set is requested without an
/// owner token, and otherwise whatever the underlying call returns.
pub fn create_fixture(
    api: &dyn FixtureApi,
    kind: FixtureKind,
    owner: Option<&BearerToken>,
) -> Result<FixtureId> {
    match kind {
        FixtureKind::User => api.create_user(),
        FixtureKind::Set => {
            let token = owner.ok_or(FixtureError::MissingOwner)?;
            api.create_set(token)
        }
    }
}
