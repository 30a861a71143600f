//! Tickets Service
//!
//! Read-only ticket visibility over the shared ticket collection:
//! - `GET /api/tickets` lists tickets that are not reserved by an order
//! - `GET /api/tickets/{id}` returns one ticket or a structured 404
//! - `/health`, `/ready` and `/stats` probes

pub mod error;
pub mod handlers;
pub mod query;
pub mod routes;

use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use ticketing_core::{Bootstrapped, HealthCheck, Readiness};
use ticketing_store::TicketStore;
use tracing::info;

pub use error::{Error, Result};
pub use query::{QueryMetrics, TicketLookup, TicketQueryService};

pub const SERVICE_NAME: &str = "tickets-service";

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub queries: TicketQueryService,
    pub store_health: Arc<dyn HealthCheck>,
    pub readiness: Readiness,
    pub store_timeout: Duration,
    pub start_time: Instant,
}

impl AppState {
    /// Wire request-path state from a finished bootstrap.
    pub fn from_bootstrap<S>(booted: &Bootstrapped<S>) -> Self
    where
        S: TicketStore + HealthCheck + 'static,
    {
        let store: Arc<dyn TicketStore> = booted.store.clone();
        let store_health: Arc<dyn HealthCheck> = booted.store.clone();

        Self {
            queries: TicketQueryService::new(store, booted.settings.store_timeout),
            store_health,
            readiness: booted.readiness.clone(),
            store_timeout: booted.settings.store_timeout,
            start_time: Instant::now(),
        }
    }
}

/// Serve the API on the bootstrapped listener until `shutdown` resolves.
pub async fn serve<S, F>(booted: Bootstrapped<S>, shutdown: F) -> ticketing_core::Result<()>
where
    S: TicketStore + HealthCheck + 'static,
    F: Future<Output = ()> + Send + 'static,
{
    let state = AppState::from_bootstrap(&booted);
    let app = routes::create_router(state);

    info!(
        addr = %booted.listener.local_addr()?,
        store_connected = booted.readiness.store_connected(),
        "Tickets service accepting requests"
    );

    axum::serve(booted.listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;

    Ok(())
}
