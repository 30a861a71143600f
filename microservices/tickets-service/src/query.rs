//! Ticket visibility queries
//!
//! Both operations are plain reads against the store. Every store call is
//! bounded by the configured timeout and timed into the latency histogram.

use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use ticketing_core::{Result, TicketingError};
use ticketing_store::{StoreError, Ticket, TicketFilter, TicketStore};
use ticketing_telemetry::{Counter, Histogram};
use tracing::{debug, instrument, warn};

/// Outcome of a lookup by identifier.
#[derive(Debug, Clone, PartialEq)]
pub enum TicketLookup {
    Found(Ticket),
    NotFound,
}

impl TicketLookup {
    pub fn into_option(self) -> Option<Ticket> {
        match self {
            TicketLookup::Found(ticket) => Some(ticket),
            TicketLookup::NotFound => None,
        }
    }
}

/// Counters and latency for the query paths
#[derive(Clone)]
pub struct QueryMetrics {
    pub listings: Counter,
    pub lookups: Counter,
    pub not_found: Counter,
    pub store_errors: Counter,
    pub store_latency_ms: Histogram,
}

impl Default for QueryMetrics {
    fn default() -> Self {
        Self {
            listings: Counter::new("tickets_listings_total"),
            lookups: Counter::new("tickets_lookups_total"),
            not_found: Counter::new("tickets_lookups_not_found_total"),
            store_errors: Counter::new("tickets_store_errors_total"),
            store_latency_ms: Histogram::new("tickets_store_latency_ms"),
        }
    }
}

#[derive(Clone)]
pub struct TicketQueryService {
    store: Arc<dyn TicketStore>,
    timeout: Duration,
    metrics: QueryMetrics,
}

impl TicketQueryService {
    pub fn new(store: Arc<dyn TicketStore>, timeout: Duration) -> Self {
        Self {
            store,
            timeout,
            metrics: QueryMetrics::default(),
        }
    }

    pub fn metrics(&self) -> &QueryMetrics {
        &self.metrics
    }

    /// Tickets without an order reference, in store order.
    #[instrument(skip(self))]
    pub async fn list_available(&self) -> Result<Vec<Ticket>> {
        self.metrics.listings.inc();

        let filter = TicketFilter::available();
        let tickets = self.bounded("find_many", self.store.find_many(&filter)).await?;

        debug!(count = tickets.len(), "Listed available tickets");
        Ok(tickets)
    }

    /// The ticket with `id`, exactly as stored.
    #[instrument(skip(self))]
    pub async fn get(&self, id: &str) -> Result<TicketLookup> {
        self.metrics.lookups.inc();

        match self.bounded("find_by_id", self.store.find_by_id(id)).await? {
            Some(ticket) => Ok(TicketLookup::Found(ticket)),
            None => {
                self.metrics.not_found.inc();
                debug!(id, "Ticket not found");
                Ok(TicketLookup::NotFound)
            }
        }
    }

    /// Like [`get`](Self::get) but absent tickets are an error.
    pub async fn require(&self, id: &str) -> Result<Ticket> {
        self.get(id)
            .await?
            .into_option()
            .ok_or_else(|| TicketingError::NotFound(format!("ticket {}", id)))
    }

    async fn bounded<T, F>(&self, op: &'static str, call: F) -> Result<T>
    where
        F: Future<Output = ticketing_store::Result<T>>,
    {
        let started = Instant::now();
        let outcome = tokio::time::timeout(self.timeout, call).await;
        self.metrics
            .store_latency_ms
            .record(started.elapsed().as_secs_f64() * 1000.0);

        match outcome {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(e)) => {
                self.metrics.store_errors.inc();
                warn!(op, error = %e, "Store call failed");
                Err(e.into())
            }
            Err(_) => {
                self.metrics.store_errors.inc();
                warn!(op, timeout_ms = self.timeout.as_millis() as u64, "Store call timed out");
                Err(StoreError::Timeout(self.timeout).into())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use ticketing_store::MemoryTicketStore;

    fn ticket(id: &str, order_id: Option<&str>) -> Ticket {
        Ticket {
            id: id.to_string(),
            title: format!("show {}", id),
            price: 25.5,
            user_id: "u1".to_string(),
            order_id: order_id.map(String::from),
        }
    }

    fn service(store: &MemoryTicketStore) -> TicketQueryService {
        TicketQueryService::new(Arc::new(store.clone()), Duration::from_secs(1))
    }

    #[tokio::test]
    async fn test_list_excludes_reserved_tickets() {
        let store = MemoryTicketStore::new();
        store.put(ticket("t1", None));
        store.put(ticket("t2", Some("o1")));

        let listed = service(&store).list_available().await.unwrap();
        assert_eq!(listed, vec![ticket("t1", None)]);
    }

    #[tokio::test]
    async fn test_list_empty_store_is_empty() {
        let store = MemoryTicketStore::new();
        assert!(service(&store).list_available().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_get_returns_stored_record() {
        let store = MemoryTicketStore::new();
        store.put(ticket("t2", Some("o1")));

        let queries = service(&store);
        let found = queries.get("t2").await.unwrap();
        assert_eq!(found, TicketLookup::Found(ticket("t2", Some("o1"))));
        assert_eq!(queries.metrics().lookups.get(), 1);
        assert_eq!(queries.metrics().not_found.get(), 0);
    }

    #[tokio::test]
    async fn test_get_missing_is_not_found() {
        let store = MemoryTicketStore::new();
        let queries = service(&store);

        assert_eq!(queries.get("nonexistent").await.unwrap(), TicketLookup::NotFound);
        assert_eq!(queries.metrics().not_found.get(), 1);

        let err = queries.require("nonexistent").await.unwrap_err();
        assert!(matches!(err, TicketingError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_store_failure_is_surfaced() {
        let store = MemoryTicketStore::new();
        store.set_online(false);
        let queries = service(&store);

        let err = queries.list_available().await.unwrap_err();
        assert!(matches!(err, TicketingError::Unavailable(_)));
        assert_eq!(queries.metrics().store_errors.get(), 1);
    }

    struct SlowStore;

    #[async_trait]
    impl TicketStore for SlowStore {
        async fn find_many(&self, _filter: &TicketFilter) -> ticketing_store::Result<Vec<Ticket>> {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(Vec::new())
        }

        async fn find_by_id(&self, _id: &str) -> ticketing_store::Result<Option<Ticket>> {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(None)
        }
    }

    #[tokio::test]
    async fn test_slow_store_times_out() {
        let queries = TicketQueryService::new(Arc::new(SlowStore), Duration::from_millis(20));

        let err = queries.get("t1").await.unwrap_err();
        assert!(matches!(err, TicketingError::Timeout(_)));
        assert_eq!(queries.metrics().store_latency_ms.summary().count, 1);
    }
}
