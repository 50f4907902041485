use std::fmt::Display;

use worker::{Headers, Request, Response, Result};

use crate::api::ApiReply;

fn cors_headers(req: &Request) -> Result<Headers> {
    let headers = Headers::new();

    // Reflect Origin when present; otherwise allow all.
    // The submission form and review page are served from a different origin.
    let origin = req.headers().get("Origin")?.unwrap_or_else(|| "*".to_string());

    headers.set("Access-Control-Allow-Origin", &origin)?;
    headers.set("Vary", "Origin")?;
    headers.set("Access-Control-Allow-Credentials", "true")?;
    headers.set("Access-Control-Allow-Methods", "GET,POST,OPTIONS")?;
    headers.set(
        "Access-Control-Allow-Headers",
        "Authorization,Content-Type,Accept,X-Requested-With",
    )?;

    Ok(headers)
}

pub fn json_with_cors(req: &Request, mut resp: Response) -> Result<Response> {
    let headers = cors_headers(req)?;
    let resp_headers = resp.headers_mut();
    for (k, v) in headers.entries() {
        resp_headers.set(&k, &v)?;
    }

    Ok(resp)
}

pub fn reply_response(req: &Request, reply: ApiReply) -> Result<Response> {
    let resp = match reply.body {
        Some(body) => Response::from_json(&body)?.with_status(reply.status),
        None => Response::empty()?.with_status(reply.status),
    };
    json_with_cors(req, resp)
}

pub fn error_response(req: &Request, status: u16, code: &str, message: &str) -> Result<Response> {
    reply_response(req, ApiReply::error(status, code, message))
}

pub fn internal_error_response<E: Display>(req: &Request, context: &str, err: &E) -> Result<Response> {
    tracing::error!(error = %err, "{context}");
    error_response(req, 500, "internal_error", "Internal server error")
}
