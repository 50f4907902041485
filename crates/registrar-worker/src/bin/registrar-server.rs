//! Native entry point. Configuration comes from the process environment.

#[cfg(not(target_arch = "wasm32"))]
#[tokio::main]
async fn main() -> Result<(), registrar_worker::server::ServerError> {
    use registrar_worker::config::AppConfig;
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    tracing::info!("registrar v{}", env!("CARGO_PKG_VERSION"));

    let config = AppConfig::from_lookup(|key| std::env::var(key).ok());
    registrar_worker::server::serve(config).await
}

#[cfg(target_arch = "wasm32")]
fn main() {}
