//! In-process stand-in for the notebook API.
//!
//! Serves the user, set and login routes the harness exercises, on an
//! ephemeral port, with the notebook's access rules:
//!
//! - `GET /users/{id}` and `GET /sets/{id}` answer 401 without a valid
//!   bearer token, 404 for unknown ids, 403 when the caller is not the user
//!   or the set's owner, and 200 otherwise.
//! - `POST /login` answers 404 for unknown users, 401 for a wrong password,
//!   and a bare JSON string token otherwise.
//! - `GET /slow` sleeps before answering, for timeout checks.

use std::collections::HashMap;
use std::io::Read;
use std::sync::{Arc, Mutex, PoisonError};
use std::thread;
use std::time::Duration;

use serde_json::{Value, json};
use tiny_http::{Method, Request, Response, Server};

/// How long `GET /slow` waits before answering.
pub(crate) const SLOW_ROUTE_DELAY: Duration = Duration::from_millis(600);

/// A request as received by the stub.
#[derive(Debug, Clone)]
pub(crate) struct RecordedRequest {
    pub(crate) method: String,
    pub(crate) path: String,
    pub(crate) authorization: Option<String>,
}

#[derive(Debug, Default)]
struct Store {
    next_id: u64,
    /// User id to password.
    users: HashMap<String, String>,
    /// Set id to owner id.
    sets: HashMap<String, String>,
    /// Token to user id.
    tokens: HashMap<String, String>,
    requests: Vec<RecordedRequest>,
}

impl Store {
    /// Allocate a 24-hex-digit id, the shape of a MongoDB `ObjectId`.
    fn allocate_id(&mut self) -> String {
        self.next_id += 1;
        format!("{:024x}", self.next_id)
    }

    fn caller(&self, authorization: Option<&str>) -> Option<String> {
        let token = authorization?.strip_prefix("Bearer ")?;
        self.tokens.get(token).cloned()
    }
}

/// A running stub server. Stops when dropped.
pub(crate) struct StubServer {
    server: Arc<Server>,
    port: u16,
    store: Arc<Mutex<Store>>,
    worker: Option<thread::JoinHandle<()>>,
}

impl std::fmt::Debug for StubServer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StubServer")
            .field("port", &self.port)
            .finish_non_exhaustive()
    }
}

impl StubServer {
    /// Start the stub on an ephemeral localhost port.
    pub(crate) fn start() -> Result<Self, String> {
        let server = Server::http("127.0.0.1:0").map_err(|e| e.to_string())?;
        let port = server
            .server_addr()
            .to_ip()
            .ok_or_else(|| String::from("stub server is not listening on IP"))?
            .port();
        let server = Arc::new(server);
        let store = Arc::new(Mutex::new(Store::default()));

        let worker = {
            let server = Arc::clone(&server);
            let store = Arc::clone(&store);
            thread::spawn(move || {
                for request in server.incoming_requests() {
                    handle(request, &store);
                }
            })
        };

        Ok(Self {
            server,
            port,
            store,
            worker: Some(worker),
        })
    }

    /// The port the stub listens on.
    pub(crate) const fn port(&self) -> u16 {
        self.port
    }

    /// The most recent request the stub received.
    pub(crate) fn last_request(&self) -> Option<RecordedRequest> {
        lock(&self.store).requests.last().cloned()
    }
}

impl Drop for StubServer {
    fn drop(&mut self) {
        self.server.unblock();
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}

fn lock(store: &Mutex<Store>) -> std::sync::MutexGuard<'_, Store> {
    store.lock().unwrap_or_else(PoisonError::into_inner)
}

fn handle(mut request: Request, store: &Mutex<Store>) {
    let method = request.method().clone();
    let path = request.url().to_owned();
    let authorization = request
        .headers()
        .iter()
        .find(|h| h.field.equiv("Authorization"))
        .map(|h| h.value.as_str().to_owned());
    let mut raw = String::new();
    let _ = request.as_reader().read_to_string(&mut raw);
    let body: Value = serde_json::from_str(&raw).unwrap_or(Value::Null);

    if method == Method::Get && path == "/slow" {
        thread::sleep(SLOW_ROUTE_DELAY);
        let _ = request.respond(Response::from_string("slow").with_status_code(200));
        return;
    }

    let (status, reply) = {
        let mut guard = lock(store);
        guard.requests.push(RecordedRequest {
            method: method.to_string(),
            path: path.clone(),
            authorization: authorization.clone(),
        });
        route(&mut guard, &method, &path, authorization.as_deref(), &body)
    };
    let _ = request.respond(Response::from_string(reply.to_string()).with_status_code(status));
}

fn message(text: &str) -> Value {
    json!({ "message": text })
}

fn route(
    store: &mut Store,
    method: &Method,
    path: &str,
    authorization: Option<&str>,
    body: &Value,
) -> (u16, Value) {
    let route_path = path.split_once('?').map_or(path, |(route_path, _)| route_path);
    let segments: Vec<&str> = route_path.trim_matches('/').split('/').collect();
    match (method, segments.as_slice()) {
        (Method::Post, ["users"]) => create_user(store, body),
        (Method::Post, ["login"]) => login(store, body),
        (Method::Post, ["sets"]) => create_set(store, authorization, body),
        (Method::Get, ["users", id]) => read_user(store, authorization, id),
        (Method::Get, ["sets", id]) => read_set(store, authorization, id),
        _ => (404, message("no such route")),
    }
}

/// Check the JSON:API resource type of a creation request.
fn has_resource_type(body: &Value, expected: &str) -> bool {
    body.pointer("/data/type").and_then(Value::as_str) == Some(expected)
}

fn create_user(store: &mut Store, body: &Value) -> (u16, Value) {
    if !has_resource_type(body, "user") {
        return (400, message("resource type must be 'user'"));
    }
    let attributes = body.pointer("/data/attributes");
    let email = attributes
        .and_then(|a| a.get("email"))
        .and_then(Value::as_str);
    let password = attributes
        .and_then(|a| a.get("password"))
        .and_then(Value::as_str);
    let (Some(email), Some(password)) = (email, password) else {
        return (400, message("email and password are required"));
    };
    if !(6..=32).contains(&email.len()) {
        return (400, message("'Email' field must be 6 to 32 characters."));
    }
    let id = store.allocate_id();
    store.users.insert(id.clone(), password.to_owned());
    (201, json!({ "data": { "type": "user", "id": id } }))
}

fn login(store: &mut Store, body: &Value) -> (u16, Value) {
    let user_id = body.get("user-id").and_then(Value::as_str);
    let password = body.get("password").and_then(Value::as_str);
    let (Some(user_id), Some(password)) = (user_id, password) else {
        return (400, message("user-id and password are required"));
    };
    match store.users.get(user_id) {
        None => (404, message("user not found")),
        Some(expected) if expected != password => (401, message("incorrect password")),
        Some(_) => {
            let token = format!("token-{user_id}-{}", store.tokens.len());
            store.tokens.insert(token.clone(), user_id.to_owned());
            (200, Value::String(token))
        }
    }
}

fn create_set(store: &mut Store, authorization: Option<&str>, body: &Value) -> (u16, Value) {
    let Some(owner) = store.caller(authorization) else {
        return (401, message("authentication required"));
    };
    if !has_resource_type(body, "set") {
        return (400, message("resource type must be 'set'"));
    }
    let id = store.allocate_id();
    store.sets.insert(id.clone(), owner);
    (201, json!({ "data": { "type": "set", "id": id } }))
}

fn read_user(store: &Store, authorization: Option<&str>, id: &str) -> (u16, Value) {
    let Some(caller) = store.caller(authorization) else {
        return (401, message("authentication required"));
    };
    if !store.users.contains_key(id) {
        return (404, message("user not found"));
    }
    if caller != id {
        return (403, message("forbidden"));
    }
    (200, json!({ "data": { "type": "user", "id": id } }))
}

fn read_set(store: &Store, authorization: Option<&str>, id: &str) -> (u16, Value) {
    let Some(caller) = store.caller(authorization) else {
        return (401, message("authentication required"));
    };
    let Some(owner) = store.sets.get(id) else {
        return (404, message("set not found"));
    };
    if *owner != caller {
        return (403, message("forbidden"));
    }
    (200, json!({ "data": { "type": "set", "id": id } }))
}
