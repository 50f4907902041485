//! Transport-independent HTTP surface.
//!
//! The Worker entrypoint turns a request into `(Verb, path, body)` and an [`ApiReply`]
//! back into a response; routing, decoding and error shaping all live here.

use serde_json::{json, Value};

use crate::error::{FieldError, RegistrarError};
use crate::notify::Mailer;
use crate::service::VerificationService;
use crate::store::VerificationStore;
use crate::submission::SubmitVerification;

pub const SERVICE_NAME: &str = "registrar";

pub const SUBMITTED_MESSAGE: &str = "Verification request submitted successfully.";
pub const APPROVED_MESSAGE: &str = "User approved successfully.";

/// Mount point used by the original web frontend; routes answer with or without it.
const MOUNT_PREFIX: &str = "/api/verification";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verb {
    Get,
    Post,
    Options,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Health,
    SubmitVerification,
    ListPending,
    ApproveUser(i32),
}

impl Route {
    fn verb(self) -> Verb {
        match self {
            Route::Health | Route::ListPending => Verb::Get,
            Route::SubmitVerification | Route::ApproveUser(_) => Verb::Post,
        }
    }
}

/// Maps a path to a route. Trailing slashes are optional; approval ids must be plain digits.
pub fn resolve(path: &str) -> Option<Route> {
    let path = path
        .strip_prefix(MOUNT_PREFIX)
        .filter(|rest| rest.starts_with('/'))
        .unwrap_or(path);
    let path = path.strip_suffix('/').unwrap_or(path);

    match path {
        "/health" => Some(Route::Health),
        "/submit-verification" => Some(Route::SubmitVerification),
        "/get-users" => Some(Route::ListPending),
        _ => {
            let id = path.strip_prefix("/approve-user/")?;
            if id.is_empty() || !id.bytes().all(|b| b.is_ascii_digit()) {
                return None;
            }
            id.parse().ok().map(Route::ApproveUser)
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ApiReply {
    pub status: u16,
    pub body: Option<Value>,
}

impl ApiReply {
    pub fn json(status: u16, body: Value) -> Self {
        Self {
            status,
            body: Some(body),
        }
    }

    pub fn empty(status: u16) -> Self {
        Self { status, body: None }
    }

    pub fn message(message: &str) -> Self {
        Self::json(200, json!({ "message": message }))
    }

    pub fn error(status: u16, code: &str, message: &str) -> Self {
        Self::json(
            status,
            json!({
                "success": false,
                "error": {
                    "code": code,
                    "message": message
                }
            }),
        )
    }

    fn validation(fields: &[FieldError]) -> Self {
        Self::json(
            400,
            json!({
                "success": false,
                "error": {
                    "code": "validation_failed",
                    "message": "Invalid verification request",
                    "fields": fields,
                }
            }),
        )
    }
}

pub fn health() -> ApiReply {
    ApiReply::json(200, json!({ "ok": true, "service": SERVICE_NAME }))
}

pub fn not_found() -> ApiReply {
    ApiReply::error(404, "not_found", "Not found")
}

fn internal_error() -> ApiReply {
    ApiReply::error(500, "internal_error", "Internal server error")
}

/// Validation failures are the only client errors. An unknown approval id is a server
/// error, as is any storage failure; details go to the log, not the reply.
fn error_reply(err: &RegistrarError) -> ApiReply {
    match err {
        RegistrarError::Validation(fields) => ApiReply::validation(fields),
        RegistrarError::NotFound(id) => {
            tracing::error!(id, "approval of unknown verification request");
            internal_error()
        }
        RegistrarError::Database(e) => {
            tracing::error!(error = %e, "database operation failed");
            internal_error()
        }
    }
}

/// Resolves the route and checks the verb without touching storage.
///
/// `Err` carries the final reply: the preflight 204, 404 for unknown paths or 405.
pub fn route(verb: Verb, path: &str) -> Result<Route, ApiReply> {
    if verb == Verb::Options {
        return Err(ApiReply::empty(204));
    }

    let route = resolve(path).ok_or_else(not_found)?;
    if verb != route.verb() {
        return Err(ApiReply::error(405, "method_not_allowed", "Method not allowed"));
    }
    Ok(route)
}

/// Handles one request against `service`.
pub async fn handle<S, M>(
    service: &VerificationService<S, M>,
    verb: Verb,
    path: &str,
    body: &[u8],
) -> ApiReply
where
    S: VerificationStore,
    M: Mailer,
{
    match route(verb, path) {
        Ok(route) => dispatch(service, route, body).await,
        Err(reply) => reply,
    }
}

/// Runs an already resolved route.
pub async fn dispatch<S, M>(service: &VerificationService<S, M>, route: Route, body: &[u8]) -> ApiReply
where
    S: VerificationStore,
    M: Mailer,
{
    match route {
        Route::Health => health(),
        Route::SubmitVerification => {
            let payload: SubmitVerification = match serde_json::from_slice(body) {
                Ok(p) => p,
                Err(_) => return ApiReply::error(400, "invalid_json", "Invalid JSON body"),
            };
            match service.submit(payload).await {
                Ok(_) => ApiReply::message(SUBMITTED_MESSAGE),
                Err(e) => error_reply(&e),
            }
        }
        Route::ListPending => match service.list_pending().await {
            Ok(pending) => ApiReply::json(200, json!(pending)),
            Err(e) => error_reply(&e),
        },
        Route::ApproveUser(id) => match service.approve(id).await {
            Ok(_) => ApiReply::message(APPROVED_MESSAGE),
            Err(e) => error_reply(&e),
        },
    }
}
