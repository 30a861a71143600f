//! Router configuration for the Tickets Service API

use axum::{routing::get, Router};

use crate::handlers;
use crate::AppState;

/// Create the main router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health & Metrics
        .route("/health", get(handlers::health))
        .route("/ready", get(handlers::ready))
        .route("/stats", get(handlers::stats))
        // Tickets
        .route("/api/tickets", get(handlers::list_tickets))
        .route("/api/tickets/{id}", get(handlers::show_ticket))
        .with_state(state)
}
