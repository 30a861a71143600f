//! Auth Service
//!
//! Resolves its signing key and store connection before it binds, then
//! serves liveness and readiness probes. Token issuing lives elsewhere.

use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use ticketing_core::{
    probe_dependency, Bootstrapped, HealthCheck, HealthStatus, Readiness, ReadinessStatus,
};
use tracing::info;

pub const SERVICE_NAME: &str = "auth-service";

#[derive(Clone)]
pub struct AuthState {
    pub store_health: Arc<dyn HealthCheck>,
    pub readiness: Readiness,
    pub store_timeout: Duration,
    pub start_time: Instant,
}

impl AuthState {
    pub fn from_bootstrap<S: HealthCheck + 'static>(booted: &Bootstrapped<S>) -> Self {
        let store_health: Arc<dyn HealthCheck> = booted.store.clone();
        Self {
            store_health,
            readiness: booted.readiness.clone(),
            store_timeout: booted.settings.store_timeout,
            start_time: Instant::now(),
        }
    }
}

pub fn create_router(state: AuthState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/ready", get(ready))
        .with_state(state)
}

async fn health(State(state): State<AuthState>) -> Json<HealthStatus> {
    Json(HealthStatus {
        healthy: true,
        service_id: SERVICE_NAME.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.start_time.elapsed().as_secs(),
    })
}

async fn ready(State(state): State<AuthState>) -> (StatusCode, Json<ReadinessStatus>) {
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

/// Serve the probes on the bootstrapped listener until `shutdown` resolves.
pub async fn serve<S, F>(booted: Bootstrapped<S>, shutdown: F) -> ticketing_core::Result<()>
where
    S: HealthCheck + 'static,
    F: Future<Output = ()> + Send + 'static,
{
    let state = AuthState::from_bootstrap(&booted);
    let app = create_router(state);

    info!(
        addr = %booted.listener.local_addr()?,
        store_connected = booted.readiness.store_connected(),
        "Auth service accepting requests"
    );

    axum::serve(booted.listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;

    Ok(())
}
