//! Router construction and the serve loop.

use crate::handlers::{self, SharedState};
use crate::state::ServiceState;
use axum::http::HeaderValue;
use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use trendcast_core::{AppConfig, AppError, AppResult};

/// Every route, with CORS and request tracing applied.
///
/// `cors_origin` restricts browsers to a single origin; `None` allows any.
pub fn create_router(state: SharedState, cors_origin: Option<&str>) -> AppResult<Router> {
    let cors = match cors_origin {
        Some(origin) => {
            let origin = HeaderValue::from_str(origin).map_err(|e| {
                AppError::Config(format!("Invalid server.cors_origin '{}': {}", origin, e))
            })?;
            CorsLayer::permissive().allow_origin(AllowOrigin::exact(origin))
        }
        None => CorsLayer::permissive(),
    };

    let router = Router::new()
        .route("/generate-hashtags", post(handlers::generate_hashtags))
        .route("/generate-content", post(handlers::generate_content))
        .route("/askai", post(handlers::ask_ai))
        .route("/reload-data", post(handlers::reload_data))
        .route("/health", get(handlers::health))
        .route("/trends/twitter", get(handlers::twitter_trends))
        .route("/trends/reels", get(handlers::current_reels))
        .route("/trends/reels/archived", get(handlers::archived_reels))
        .route("/trends/audio", get(handlers::trending_audio))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    Ok(router)
}

/// Build the service from `config` and serve until Ctrl-C.
pub async fn serve(config: &AppConfig) -> AppResult<()> {
    config.validate_for_serve()?;
    let addr = config.bind_addr()?;

    let state = ServiceState::from_config(config).await?.initialize().await;
    let app = create_router(Arc::new(state), config.server.cors_origin.as_deref())?;

    let listener = TcpListener::bind(addr).await?;
    tracing::info!(%addr, "Listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shut down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown requested");
}
