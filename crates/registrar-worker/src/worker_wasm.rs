use std::sync::Once;

use worker::*;

#[path = "wasm/d1.rs"]
pub mod d1;
#[path = "wasm/env.rs"]
pub mod env;
#[path = "wasm/http.rs"]
pub mod http;

use crate::api::{self, Route, Verb};
use crate::brevo::ConfiguredMailer;
use crate::service::VerificationService;
use http::{internal_error_response, reply_response};

static LOGGING: Once = Once::new();

fn init_logging() {
    LOGGING.call_once(|| {
        let subscriber = crate::logging::line_subscriber(|line: &str| console_log!("{line}"));
        // Fails only when another default is already installed.
        let _ = tracing::subscriber::set_global_default(subscriber);
    });
}

fn verb(method: &Method) -> Verb {
    match method {
        Method::Get => Verb::Get,
        Method::Post => Verb::Post,
        Method::Options => Verb::Options,
        _ => Verb::Other,
    }
}

#[event(fetch)]
pub async fn fetch(mut req: Request, env: Env, _ctx: Context) -> Result<Response> {
    console_error_panic_hook::set_once();
    init_logging();

    let url = req.url()?;
    let path = url.path().to_string();

    // Preflight, unknown paths and wrong verbs are answered before any binding is touched.
    let route = match api::route(verb(&req.method()), &path) {
        Ok(route) => route,
        Err(reply) => return reply_response(&req, reply),
    };
    if route == Route::Health {
        return reply_response(&req, api::health());
    }

    let body = match req.bytes().await {
        Ok(body) => body,
        Err(e) => return internal_error_response(&req, "failed to read request body", &e),
    };

    let config = env::app_config(&env);
    let store = match d1::D1Store::from_env(&env) {
        Ok(store) => store,
        Err(e) => return internal_error_response(&req, "D1 binding unavailable", &e),
    };
    let service = VerificationService::new(
        store,
        ConfiguredMailer::from_settings(config.mail),
        config.registration_url,
    );

    let reply = api::dispatch(&service, route, &body).await;
    reply_response(&req, reply)
}
