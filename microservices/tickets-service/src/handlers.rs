//! HTTP handlers for the Tickets Service API

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use ticketing_core::{probe_dependency, HealthStatus, ReadinessStatus};
use ticketing_store::Ticket;
use ticketing_telemetry::HistogramSummary;

use crate::{AppState, Error, Result, TicketLookup, SERVICE_NAME};

/// Stats response
#[derive(Serialize)]
pub struct StatsResponse {
    pub uptime_secs: u64,
    pub listings: u64,
    pub lookups: u64,
    pub lookups_not_found: u64,
    pub store_errors: u64,
    pub store_connected: bool,
    pub store_latency_ms: HistogramSummary,
}

// ============================================
// Health & Metrics Handlers
// ============================================

pub async fn health(State(state): State<AppState>) -> Json<HealthStatus> {
    Json(HealthStatus {
        healthy: true,
        service_id: SERVICE_NAME.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.start_time.elapsed().as_secs(),
    })
}

pub async fn ready(State(state): State<AppState>) -> (StatusCode, Json<ReadinessStatus>) {
    let status = probe_dependency(
        "store",
        state.store_health.as_ref(),
        &state.readiness,
        state.store_timeout,
    )
    .await;

    let code = if status.ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (code, Json(status))
}

pub async fn stats(State(state): State<AppState>) -> Json<StatsResponse> {
    let metrics = state.queries.metrics();

    Json(StatsResponse {
        uptime_secs: state.start_time.elapsed().as_secs(),
        listings: metrics.listings.get(),
        lookups: metrics.lookups.get(),
        lookups_not_found: metrics.not_found.get(),
        store_errors: metrics.store_errors.get(),
        store_connected: state.readiness.store_connected(),
        store_latency_ms: metrics.store_latency_ms.summary(),
    })
}

// ============================================
// Ticket Handlers
// ============================================

pub async fn list_tickets(State(state): State<AppState>) -> Result<Json<Vec<Ticket>>> {
    let tickets = state.queries.list_available().await?;
    Ok(Json(tickets))
}

pub async fn show_ticket(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Ticket>> {
    match state.queries.get(&id).await? {
        TicketLookup::Found(ticket) => Ok(Json(ticket)),
        TicketLookup::NotFound => Err(Error::TicketNotFound(id)),
    }
}
