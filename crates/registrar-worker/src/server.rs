//! Native HTTP server: the same routes as the Worker, served by axum over SQLite.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use axum::http::{HeaderName, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::{Json, Router};
use migration::{Migrator, MigratorTrait};
use sea_orm::DbErr;
use thiserror::Error;
use tokio::net::TcpListener;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::api::{self, ApiReply, Verb};
use crate::brevo::ConfiguredMailer;
use crate::config::AppConfig;
use crate::notify::Mailer;
use crate::service::VerificationService;
use crate::store::{SeaOrmStore, VerificationStore};

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("database: {0}")]
    Database(#[from] DbErr),

    #[error("listener: {0}")]
    Io(#[from] std::io::Error),
}

fn verb(method: &Method) -> Verb {
    match *method {
        Method::GET => Verb::Get,
        Method::POST => Verb::Post,
        Method::OPTIONS => Verb::Options,
        _ => Verb::Other,
    }
}

fn into_response(reply: ApiReply) -> Response {
    let status = StatusCode::from_u16(reply.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    match reply.body {
        Some(body) => (status, Json(body)).into_response(),
        None => status.into_response(),
    }
}

async fn dispatch<S, M>(
    State(service): State<Arc<VerificationService<S, M>>>,
    method: Method,
    uri: Uri,
    body: Bytes,
) -> Response
where
    S: VerificationStore + Send + Sync + 'static,
    M: Mailer + Send + Sync + 'static,
{
    let reply = api::handle(&service, verb(&method), uri.path(), &body).await;
    into_response(reply)
}

/// Same policy as the Worker: reflect the caller's origin and allow credentials.
fn cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(AllowOrigin::mirror_request())
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([
            AUTHORIZATION,
            CONTENT_TYPE,
            ACCEPT,
            HeaderName::from_static("x-requested-with"),
        ])
}

/// Every path goes through [`api::handle`], so routing stays identical across targets.
pub fn router<S, M>(service: Arc<VerificationService<S, M>>) -> Router
where
    S: VerificationStore + Send + Sync + 'static,
    M: Mailer + Send + Sync + 'static,
{
    Router::new()
        .fallback(dispatch::<S, M>)
        .layer(cors())
        .layer(TraceLayer::new_for_http())
        .with_state(service)
}

/// Connects, brings the schema up to date and wires the configured mailer.
pub async fn build_service(
    config: &AppConfig,
) -> Result<VerificationService<SeaOrmStore, ConfiguredMailer>, ServerError> {
    let db = crate::db::connect(&config.database_url).await?;
    Migrator::up(&db, None).await?;

    let mailer = ConfiguredMailer::from_settings(config.mail.clone());
    if matches!(mailer, ConfiguredMailer::Log(_)) {
        tracing::warn!("Brevo is not configured; approval emails will only be logged");
    }

    Ok(VerificationService::new(
        SeaOrmStore::new(db),
        mailer,
        config.registration_url.clone(),
    ))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to install Ctrl+C handler");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutting down");
}

/// Serves until Ctrl+C.
pub async fn serve(config: AppConfig) -> Result<(), ServerError> {
    let service = build_service(&config).await?;

    let listener = TcpListener::bind(&config.listen_addr).await?;
    tracing::info!(addr = %config.listen_addr, "registrar listening");

    axum::serve(listener, router(Arc::new(service)))
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}
