//! HTTP server implementation for the leaderboard API

use std::future::Future;
use std::net::SocketAddr;

use axum::{
    http::{
        header::{AUTHORIZATION, CONTENT_TYPE},
        Method, StatusCode,
    },
    response::IntoResponse,
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::{handlers, stream};
use crate::core::{AppState, Result};
use crate::system::metrics;
use crate::log_info;

/// Creates the main application router with all routes and middleware
pub fn create_app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE, AUTHORIZATION])
        .allow_origin(Any);

    Router::new()
        // Root route
        .route("/", get(handlers::root_handler))

        // Leaderboard routes
        .route("/api/leaderboard", get(handlers::get_leaderboard))
        .route("/api/stats", get(handlers::get_stats))

        // User routes
        .route("/api/users", post(handlers::create_user))
        .route("/api/users/search", get(handlers::search_users))
        .route("/api/users/:username", get(handlers::get_user))

        // Live streams
        .route("/api/stream", get(stream::stream_leaderboard))
        .route("/api/stream/search", get(stream::stream_search))

        // System routes
        .route("/health", get(handlers::health_check))

        // Apply middleware
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors)
        )
        .with_state(state)
}

/// Start the HTTP server and serve until `shutdown` resolves
pub async fn start_server<F>(state: AppState, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let addr = state.config.server.http_addr;
    let app = create_app(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    log_info!("Leaderboard API listening on http://{}", addr);
    log_info!("Health check available at http://{}/health", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;

    log_info!("HTTP server stopped");
    Ok(())
}

/// Router serving the Prometheus text export
pub fn create_metrics_app() -> Router {
    Router::new().route("/metrics", get(metrics_handler))
}

async fn metrics_handler() -> impl IntoResponse {
    match metrics::gather_text() {
        Ok(body) => (StatusCode::OK, body),
        Err(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
    }
}

/// Serve `/metrics` on its own listener until `shutdown` resolves
pub async fn start_metrics_server<F>(addr: SocketAddr, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let listener = tokio::net::TcpListener::bind(addr).await?;
    log_info!("Metrics available at http://{}/metrics", addr);

    axum::serve(listener, create_metrics_app())
        .with_graceful_shutdown(shutdown)
        .await?;
    Ok(())
}
