//! Request bodies and response readers for fixture calls.

use serde::Serialize;
use serde_json::Value;

/// A JSON:API top-level document carrying one resource.
#[derive(Debug, Serialize)]
pub(super) struct Document<A> {
    data: Resource<A>,
}

#[derive(Debug, Serialize)]
struct Resource<A> {
    #[serde(rename = "type")]
    resource_type: &'static str,
    attributes: A,
}

impl<A> Document<A> {
    pub(super) const fn new(resource_type: &'static str, attributes: A) -> Self {
        Self {
            data: Resource {
                resource_type,
                attributes,
            },
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "kebab-case")]
pub(super) struct UserAttributes {
    pub first_name: &'static str,
    pub last_name: &'static str,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub(super) struct SetAttributes {
    pub movement: &'static str,
    pub volume: f64,
    pub intensity: f64,
}

/// Login credentials, sent as a flat document rather than a JSON:API resource.
#[derive(Debug, Serialize)]
#[serde(rename_all = "kebab-case")]
pub(super) struct Credentials<'a> {
    pub user_id: &'a str,
    pub password: &'a str,
}

/// Read `data.id` from a creation response. Numeric ids are stringified.
pub(super) fn resource_id(body: &Value) -> Option<String> {
    match body.pointer("/data/id")? {
        Value::String(id) if !id.is_empty() => Some(id.clone()),
        Value::Number(id) => Some(id.to_string()),
        _ => None,
    }
}

/// Read the token from a login response.
///
/// Accepts a bare JSON string, `data.attributes.token`, or a top-level
/// `token`, in that order.
pub(super) fn login_token(body: &Value) -> Option<String> {
    let token = match body {
        Value::String(token) => Some(token.as_str()),
        _ => body
            .pointer("/data/attributes/token")
            .or_else(|| body.get("token"))
            .and_then(Value::as_str),
    }?;
    (!token.is_empty()).then(|| token.to_owned())
}
