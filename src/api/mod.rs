//! HTTP API module
//!
//! This module contains all HTTP endpoint handlers and response structures.

pub mod handlers;
pub mod responses;

use std::sync::Arc;
use axum::{
    routing::{delete, get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::state::AppState;
use handlers::*;

/// Create the HTTP router with all endpoints
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/play", post(play_handler))
        .route("/reset", post(reset_handler))
        .route("/status", get(status_handler))
        .route("/timer/stream", get(timer_stream_handler))
        .route("/schedule", get(schedule_handler))
        .route("/schedule/events", post(add_event_handler))
        .route("/schedule/events/:index", delete(remove_event_handler))
        .route("/schedule/events/:index/move", post(move_event_handler))
        .route("/health", get(health_handler))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
