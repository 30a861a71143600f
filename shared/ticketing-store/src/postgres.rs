//! PostgreSQL-backed ticket store
//!
//! The `tickets` table is created on first contact with the database and
//! retried on every call until that succeeds, so a store that comes up after
//! the service still ends up with a usable schema.

use std::sync::Arc;

use async_trait::async_trait;
use ticketing_core::{HealthCheck, RuntimeSettings, ServiceConfig, StoreConnector};
use tokio::sync::OnceCell;
use tokio_postgres::Row;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::pool::{PoolConfig, StorePool};
use crate::{NewTicket, OrderFilter, Result, StoreError, Ticket, TicketFilter, TicketStore};

const SELECT_TICKETS: &str = "SELECT id, title, price, user_id, order_id FROM tickets";
const LIST_ORDER: &str = "ORDER BY created_at, id";

/// Ticket collection backed by a `tickets` table.
#[derive(Clone)]
pub struct PgTicketStore {
    pool: StorePool,
    schema: Arc<OnceCell<()>>,
}

impl PgTicketStore {
    pub fn new(config: PoolConfig) -> Result<Self> {
        Ok(Self {
            pool: StorePool::new(config)?,
            schema: Arc::new(OnceCell::new()),
        })
    }

    /// Whether the `tickets` table is known to exist.
    pub fn schema_ready(&self) -> bool {
        self.schema.initialized()
    }

    /// Create the `tickets` table if it does not exist yet.
    ///
    /// Succeeds once per store handle; failures are retried on the next call.
    pub async fn ensure_schema(&self) -> Result<()> {
        self.schema.get_or_try_init(|| self.create_schema()).await?;
        Ok(())
    }

    async fn create_schema(&self) -> Result<()> {
        let client = self.pool.get().await?;
        client
            .batch_execute(
                r#"
                CREATE TABLE IF NOT EXISTS tickets (
                    id       TEXT PRIMARY KEY,
                    title    TEXT NOT NULL,
                    price    DOUBLE PRECISION NOT NULL,
                    user_id  TEXT NOT NULL,
                    order_id TEXT,
                    created_at TIMESTAMPTZ NOT NULL DEFAULT now()
                );
                CREATE INDEX IF NOT EXISTS tickets_unreserved_idx
                    ON tickets (id) WHERE order_id IS NULL;
                "#,
            )
            .await
            .map_err(StoreError::Query)?;

        info!("Tickets schema ready");
        Ok(())
    }

    /// Store a new ticket under a freshly assigned id.
    pub async fn insert(&self, ticket: NewTicket) -> Result<Ticket> {
        self.ensure_schema().await?;
        let ticket = ticket.into_ticket(Uuid::new_v4().to_string());
        let client = self.pool.get().await?;
        client
            .execute(
                "INSERT INTO tickets (id, title, price, user_id, order_id) VALUES ($1, $2, $3, $4, $5)",
                &[
                    &ticket.id,
                    &ticket.title,
                    &ticket.price,
                    &ticket.user_id,
                    &ticket.order_id,
                ],
            )
            .await
            .map_err(StoreError::Query)?;
        Ok(ticket)
    }

    fn row_to_ticket(row: &Row) -> Result<Ticket> {
        Ok(Ticket {
            id: row.try_get("id").map_err(StoreError::Query)?,
            title: row.try_get("title").map_err(StoreError::Query)?,
            price: row.try_get("price").map_err(StoreError::Query)?,
            user_id: row.try_get("user_id").map_err(StoreError::Query)?,
            order_id: row.try_get("order_id").map_err(StoreError::Query)?,
        })
    }
}

fn select_for(filter: &TicketFilter) -> String {
    match filter.order {
        OrderFilter::Any => format!("{} {}", SELECT_TICKETS, LIST_ORDER),
        OrderFilter::Unreserved => format!("{} WHERE order_id IS NULL {}", SELECT_TICKETS, LIST_ORDER),
        OrderFilter::Reserved => format!("{} WHERE order_id IS NOT NULL {}", SELECT_TICKETS, LIST_ORDER),
    }
}

#[async_trait]
impl TicketStore for PgTicketStore {
    #[instrument(skip(self))]
    async fn find_many(&self, filter: &TicketFilter) -> Result<Vec<Ticket>> {
        self.ensure_schema().await?;
        let sql = select_for(filter);
        let client = self.pool.get().await?;
        let rows = client.query(sql.as_str(), &[]).await.map_err(StoreError::Query)?;

        rows.iter().map(Self::row_to_ticket).collect()
    }

    #[instrument(skip(self))]
    async fn find_by_id(&self, id: &str) -> Result<Option<Ticket>> {
        self.ensure_schema().await?;
        let sql = format!("{} WHERE id = $1", SELECT_TICKETS);
        let client = self.pool.get().await?;
        let row = client
            .query_opt(sql.as_str(), &[&id])
            .await
            .map_err(StoreError::Query)?;

        row.as_ref().map(Self::row_to_ticket).transpose()
    }
}

#[async_trait]
impl HealthCheck for PgTicketStore {
    /// Reachable and able to serve queries, schema included.
    async fn ping(&self) -> ticketing_core::Result<()> {
        self.pool.ping().await?;
        Ok(self.ensure_schema().await?)
    }
}

/// Builds a [`PgTicketStore`] from the resolved store URI.
#[derive(Debug, Clone, Copy, Default)]
pub struct PgConnector;

#[async_trait]
impl StoreConnector for PgConnector {
    type Store = PgTicketStore;

    async fn open(&self, config: &ServiceConfig, settings: &RuntimeSettings) -> ticketing_core::Result<PgTicketStore> {
        Ok(PgTicketStore::new(PoolConfig::from_settings(config, settings))?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_available_filter_selects_null_order() {
        let sql = select_for(&TicketFilter::available());
        assert!(sql.contains("WHERE order_id IS NULL"));
        assert!(sql.ends_with(LIST_ORDER));
        assert!(!select_for(&TicketFilter::all()).contains("WHERE"));
    }

    #[tokio::test]
    async fn test_unreachable_store_has_no_schema_and_fails_ping() {
        let store = PgTicketStore::new(PoolConfig {
            url: "postgres://tickets@127.0.0.1:1/tickets".to_string(),
            max_size: 2,
            connect_timeout: Some(Duration::from_millis(200)),
        })
        .unwrap();

        assert!(store.ping().await.is_err());
        assert!(store.find_many(&TicketFilter::available()).await.is_err());
        assert!(!store.schema_ready());
    }

    #[tokio::test]
    async fn test_round_trip_against_live_store() {
        // Requires a running PostgreSQL instance
        let Ok(url) = std::env::var("TEST_STORE_URI") else {
            return;
        };

        let store = PgTicketStore::new(PoolConfig {
            url,
            max_size: 4,
            connect_timeout: Some(Duration::from_secs(2)),
        })
        .unwrap();

        // Start from a database without the table; first contact creates it.
        let client = store.pool.get().await.unwrap();
        client.batch_execute("DROP TABLE IF EXISTS tickets").await.unwrap();
        drop(client);
        assert!(!store.schema_ready());

        assert!(store.find_many(&TicketFilter::available()).await.unwrap().is_empty());
        assert!(store.schema_ready());

        let open = store
            .insert(NewTicket {
                title: "open".to_string(),
                price: 15.0,
                user_id: "u1".to_string(),
                order_id: None,
            })
            .await
            .unwrap();
        let sold = store
            .insert(NewTicket {
                title: "sold".to_string(),
                price: 15.0,
                user_id: "u1".to_string(),
                order_id: Some("o1".to_string()),
            })
            .await
            .unwrap();

        let available = store.find_many(&TicketFilter::available()).await.unwrap();
        assert!(available.contains(&open));
        assert!(!available.contains(&sold));
        assert_eq!(store.find_by_id(&open.id).await.unwrap(), Some(open));
        assert!(store.find_by_id("nonexistent").await.unwrap().is_none());
        assert!(store.ping().await.is_ok());
    }
}
