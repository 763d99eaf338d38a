//! Step handlers for the notebook step vocabulary.
//!
//! Each function implements one phrase. Fixture steps go through a
//! [`FixtureApi`] so they can run against the real server or a mock; request
//! steps go through an [`HttpExecutor`].
//!
//! | Phrase | Handler |
//! | --- | --- |
//! | the client is not authenticated | [`client_is_not_authenticated`] |
//! | the client is authenticated | [`client_is_authenticated`] |
//! | a user exists with id P | [`user_exists`] |
//! | the user does not exist | [`user_does_not_exist`] |
//! | the authenticated client is that user | [`client_is_that_user`] |
//! | the authenticated client is not that user | [`client_is_not_that_user`] |
//! | a set exists with id P | [`set_exists`] |
//! | no set exists with id P | [`no_set_exists`] |
//! | the authenticated client is the owner of the set | [`client_is_set_owner`] |
//! | the authenticated client is not the owner of the set | [`client_is_not_set_owner`] |
//! | the client sends GET request to E | [`send_get_request`] |
//! | the server responds with status code N | [`server_responds_with`] |

use tracing::debug;

use super::{SET_ID_PLACEHOLDER, ScenarioContext, USER_ID_PLACEHOLDER};
use crate::error::Result;
use crate::fixtures::{
    FixtureApi, FixtureId, FixtureKind, INVALID_SET_ID, INVALID_USER_ID, create_fixture,
};
use crate::http::{BearerToken, HttpExecutor};

/// Create a user and log it in.
fn new_logged_in_user(api: &dyn FixtureApi) -> Result<(FixtureId, BearerToken)> {
    let user = create_fixture(api, FixtureKind::User, None)?;
    let token = api.login(&user)?;
    Ok((user, token))
}

/// Create a set owned by a freshly created user.
fn new_owned_set(api: &dyn FixtureApi) -> Result<(FixtureId, FixtureId, BearerToken)> {
    let (owner, token) = new_logged_in_user(api)?;
    let set = create_fixture(api, FixtureKind::Set, Some(&token))?;
    Ok((set, owner, token))
}

/// Send later requests without credentials.
pub fn client_is_not_authenticated(ctx: &mut ScenarioContext) {
    ctx.set_unauthenticated();
}

/// Authenticate the client as a new user with no particular access rights.
///
/// # Errors
///
/// Returns a fixture error if the user cannot be created or logged in.
pub fn client_is_authenticated(ctx: &mut ScenarioContext, api: &dyn FixtureApi) -> Result<()> {
    let (user, token) = new_logged_in_user(api)?;
    debug!(client_id = %user, "client authenticated");
    ctx.authenticate_as(user, token);
    Ok(())
}

/// Create a user and bind its id to `placeholder`.
///
/// # Errors
///
/// Returns a fixture error if the user cannot be created.
pub fn user_exists(
    ctx: &mut ScenarioContext,
    api: &dyn FixtureApi,
    placeholder: &str,
) -> Result<()> {
    let user = create_fixture(api, FixtureKind::User, None)?;
    ctx.bind_param(placeholder, user.as_str());
    Ok(())
}

/// Bind the user placeholder to an id no user has.
pub fn user_does_not_exist(ctx: &mut ScenarioContext) {
    ctx.bind_param(USER_ID_PLACEHOLDER, INVALID_USER_ID);
}

/// Create a user, bind it as the subject, and authenticate as it.
///
/// # Errors
///
/// Returns a fixture error if the user cannot be created or logged in.
pub fn client_is_that_user(ctx: &mut ScenarioContext, api: &dyn FixtureApi) -> Result<()> {
    let (user, token) = new_logged_in_user(api)?;
    ctx.bind_param(USER_ID_PLACEHOLDER, user.as_str());
    ctx.authenticate_as(user, token);
    Ok(())
}

/// Create a subject user, then authenticate as a second, different user.
///
/// # Errors
///
/// Returns a fixture error if either user cannot be created or the second
/// cannot be logged in.
pub fn client_is_not_that_user(ctx: &mut ScenarioContext, api: &dyn FixtureApi) -> Result<()> {
    let subject = create_fixture(api, FixtureKind::User, None)?;
    ctx.bind_param(USER_ID_PLACEHOLDER, subject.as_str());
    let (other, token) = new_logged_in_user(api)?;
    ctx.authenticate_as(other, token);
    Ok(())
}

/// Create a set owned by a new user and bind its id to `placeholder`.
///
/// The client's own authentication is left unchanged.
///
/// # Errors
///
/// Returns a fixture error if the owner or the set cannot be created.
pub fn set_exists(
    ctx: &mut ScenarioContext,
    api: &dyn FixtureApi,
    placeholder: &str,
) -> Result<()> {
    let (set, _, _) = new_owned_set(api)?;
    ctx.bind_param(placeholder, set.as_str());
    Ok(())
}

/// Bind `placeholder` to an id no set has.
pub fn no_set_exists(ctx: &mut ScenarioContext, placeholder: &str) {
    ctx.bind_param(placeholder, INVALID_SET_ID);
}

/// Create a set and authenticate as its owner.
///
/// # Errors
///
/// Returns a fixture error if the owner or the set cannot be created.
pub fn client_is_set_owner(ctx: &mut ScenarioContext, api: &dyn FixtureApi) -> Result<()> {
    let (set, owner, token) = new_owned_set(api)?;
    ctx.bind_param(SET_ID_PLACEHOLDER, set.as_str());
    ctx.authenticate_as(owner, token);
    Ok(())
}

/// Create a set, then authenticate as a user who does not own it.
///
/// # Errors
///
/// Returns a fixture error if any fixture cannot be created or logged in.
pub fn client_is_not_set_owner(ctx: &mut ScenarioContext, api: &dyn FixtureApi) -> Result<()> {
    let (set, _, _) = new_owned_set(api)?;
    ctx.bind_param(SET_ID_PLACEHOLDER, set.as_str());
    let (other, token) = new_logged_in_user(api)?;
    ctx.authenticate_as(other, token);
    Ok(())
}

/// Send a GET request for `endpoint` and record the response.
///
/// # Errors
///
/// Returns a template error for unbound placeholders, or an HTTP error if the
/// request fails or times out.
pub fn send_get_request(
    ctx: &mut ScenarioContext,
    executor: &HttpExecutor,
    endpoint: &str,
) -> Result<()> {
    ctx.send_get(executor, endpoint)?;
    Ok(())
}

/// Check that the last response carried `status_code`.
///
/// # Errors
///
/// Returns an assertion error naming both codes if they differ, or if no
/// request was sent.
pub fn server_responds_with(ctx: &ScenarioContext, status_code: u16) -> Result<()> {
    Ok(ctx.assert_status(status_code)?)
}
