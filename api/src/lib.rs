//! HTTP surface of the review service.
//!
//! Routes:
//! - `POST /api/v1/review`  — run a review synchronously
//! - `GET  /api/v1/health`  — liveness probe
//! - `POST /feishu/events`  — Feishu event subscription webhook

use std::{env, error::Error, sync::Arc};

pub mod core;
mod routes;

use axum::{
    Router,
    routing::{get, post},
};
use tokio::signal;

use crate::core::app_state::AppState;
use crate::routes::{
    feishu::feishu_events_route::feishu_events, health::health_route::health_check,
    review::review_route::create_review,
};

pub async fn start() -> Result<(), Box<dyn Error>> {
    let host_url = env::var("API_ADDRESS").expect("API_ADDRESS must be set in environment");

    let state = Arc::new(AppState::from_env());

    let app = Router::new()
        .route("/api/v1/review", post(create_review))
        .route("/api/v1/health", get(health_check))
        .route("/feishu/events", post(feishu_events))
        .with_state(state);

    let listener = tokio::net::TcpListener::bind(&host_url).await?;

    // Start server with graceful shutdown on Ctrl+C
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

/// Returns a future that resolves when Ctrl+C is pressed
async fn shutdown_signal() {
    signal::ctrl_c()
        .await
        .expect("Failed to listen for shutdown signal");
}
