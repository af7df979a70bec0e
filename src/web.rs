use std::net::SocketAddr;

use anyhow::{Context, Result};
use axum::Router;
use axum::http::HeaderValue;
use tower::ServiceBuilder;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::api::{self, AppState};
use crate::config::ServerConfig;

/// Permissive CORS unless a single origin is configured
pub fn cors_layer(origin: Option<&str>) -> Result<CorsLayer> {
    let allow_origin = match origin {
        Some(origin) => AllowOrigin::exact(
            HeaderValue::from_str(origin)
                .with_context(|| format!("Invalid CORS origin '{origin}'"))?,
        ),
        None => AllowOrigin::any(),
    };

    Ok(CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods(Any)
        .allow_headers(Any))
}

/// Full application: routes plus tracing and CORS layers
pub fn app(state: AppState, config: &ServerConfig) -> Result<Router> {
    let cors = cors_layer(config.cors_origin.as_deref())?;
    Ok(api::router(state).layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(cors),
    ))
}

pub async fn run(state: AppState, config: &ServerConfig) -> Result<()> {
    let app = app(state, config)?;
    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .with_context(|| format!("Invalid listen address {}:{}", config.host, config.port))?;

    #[cfg(feature = "tls")]
    if let (Some(cert), Some(key)) = (&config.tls_cert_path, &config.tls_key_path) {
        return serve_tls(app, addr, cert, key).await;
    }

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind listener on {addr}"))?;
    tracing::info!("Web server running at http://{}", addr);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Web server failed")?;
    tracing::info!("Web server stopped");
    Ok(())
}

#[cfg(feature = "tls")]
async fn serve_tls(
    app: Router,
    addr: SocketAddr,
    cert: &std::path::Path,
    key: &std::path::Path,
) -> Result<()> {
    use axum_server::tls_rustls::RustlsConfig;

    let tls = RustlsConfig::from_pem_file(cert, key)
        .await
        .with_context(|| format!("Failed to load TLS material from {}", cert.display()))?;

    let handle = axum_server::Handle::new();
    let shutdown_handle = handle.clone();
    tokio::spawn(async move {
        shutdown_signal().await;
        shutdown_handle.graceful_shutdown(None);
    });

    tracing::info!("Web server running at https://{}", addr);
    axum_server::bind_rustls(addr, tls)
        .handle(handle)
        .serve(app.into_make_service())
        .await
        .context("Web server failed")?;
    tracing::info!("Web server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
