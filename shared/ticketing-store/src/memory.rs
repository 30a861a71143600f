//! In-process ticket store

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use ticketing_core::{HealthCheck, RuntimeSettings, ServiceConfig, StoreConnector};
use uuid::Uuid;

use crate::{NewTicket, Result, StoreError, Ticket, TicketFilter, TicketStore};

/// Concurrent in-memory ticket collection.
///
/// Clones share the same collection. Listing returns tickets in insertion
/// order.
#[derive(Clone)]
pub struct MemoryTicketStore {
    tickets: Arc<DashMap<String, (u64, Ticket)>>,
    seq: Arc<AtomicU64>,
    online: Arc<AtomicBool>,
}

impl MemoryTicketStore {
    pub fn new() -> Self {
        Self {
            tickets: Arc::new(DashMap::new()),
            seq: Arc::new(AtomicU64::new(0)),
            online: Arc::new(AtomicBool::new(true)),
        }
    }

    /// Store a new ticket under a freshly assigned id.
    pub fn insert(&self, ticket: NewTicket) -> Ticket {
        let ticket = ticket.into_ticket(Uuid::new_v4().to_string());
        self.put(ticket.clone());
        ticket
    }

    /// Store a ticket as-is, replacing any ticket with the same id.
    pub fn put(&self, ticket: Ticket) {
        let seq = self.seq.fetch_add(1, Ordering::Relaxed);
        self.tickets.insert(ticket.id.clone(), (seq, ticket));
    }

    pub fn len(&self) -> usize {
        self.tickets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tickets.is_empty()
    }

    /// Simulate the store going away (or coming back).
    pub fn set_online(&self, online: bool) {
        self.online.store(online, Ordering::Release);
    }

    fn ensure_online(&self) -> Result<()> {
        if self.online.load(Ordering::Acquire) {
            Ok(())
        } else {
            Err(StoreError::Unavailable("in-memory store is offline".to_string()))
        }
    }
}

impl Default for MemoryTicketStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TicketStore for MemoryTicketStore {
    async fn find_many(&self, filter: &TicketFilter) -> Result<Vec<Ticket>> {
        self.ensure_online()?;

        let mut matched: Vec<(u64, Ticket)> = self
            .tickets
            .iter()
            .filter(|entry| filter.matches(&entry.1))
            .map(|entry| entry.value().clone())
            .collect();
        matched.sort_by_key(|(seq, _)| *seq);

        Ok(matched.into_iter().map(|(_, ticket)| ticket).collect())
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Ticket>> {
        self.ensure_online()?;
        Ok(self.tickets.get(id).map(|entry| entry.1.clone()))
    }
}

#[async_trait]
impl HealthCheck for MemoryTicketStore {
    async fn ping(&self) -> ticketing_core::Result<()> {
        Ok(self.ensure_online()?)
    }
}

/// Hands out a shared [`MemoryTicketStore`] during bootstrap.
#[derive(Clone, Default)]
pub struct MemoryConnector {
    store: MemoryTicketStore,
}

impl MemoryConnector {
    pub fn new(store: MemoryTicketStore) -> Self {
        Self { store }
    }
}

#[async_trait]
impl StoreConnector for MemoryConnector {
    type Store = MemoryTicketStore;

    async fn open(&self, _config: &ServiceConfig, _settings: &RuntimeSettings) -> ticketing_core::Result<MemoryTicketStore> {
        Ok(self.store.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_ticket(title: &str, order_id: Option<&str>) -> NewTicket {
        NewTicket {
            title: title.to_string(),
            price: 10.0,
            user_id: "u1".to_string(),
            order_id: order_id.map(String::from),
        }
    }

    #[tokio::test]
    async fn test_insert_assigns_unique_ids() {
        let store = MemoryTicketStore::new();
        let a = store.insert(new_ticket("a", None));
        let b = store.insert(new_ticket("b", None));

        assert_ne!(a.id, b.id);
        assert_eq!(store.len(), 2);
        assert_eq!(store.find_by_id(&a.id).await.unwrap(), Some(a));
    }

    #[tokio::test]
    async fn test_find_many_filters_and_keeps_insertion_order() {
        let store = MemoryTicketStore::new();
        let first = store.insert(new_ticket("first", None));
        store.insert(new_ticket("sold", Some("o1")));
        let last = store.insert(new_ticket("last", None));

        let available = store.find_many(&TicketFilter::available()).await.unwrap();
        assert_eq!(available, vec![first, last]);

        let all = store.find_many(&TicketFilter::all()).await.unwrap();
        assert_eq!(all.len(), 3);
    }

    #[tokio::test]
    async fn test_missing_id_is_none() {
        let store = MemoryTicketStore::new();
        assert!(store.find_by_id("nonexistent").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_offline_store_errors() {
        let store = MemoryTicketStore::new();
        store.set_online(false);

        assert!(matches!(
            store.ping().await,
            Err(ticketing_core::TicketingError::Unavailable(_))
        ));
        assert!(store.find_many(&TicketFilter::all()).await.is_err());

        store.set_online(true);
        assert!(store.ping().await.is_ok());
    }

    #[tokio::test]
    async fn test_connector_shares_collection() {
        let store = MemoryTicketStore::new();
        let connector = MemoryConnector::new(store.clone());
        let config = ServiceConfig {
            signing_key: ticketing_core::SecretValue::new("abc"),
            store_uri: "memory://".to_string(),
        };

        let opened = connector.open(&config, &RuntimeSettings::default()).await.unwrap();
        store.insert(new_ticket("late", None));

        assert_eq!(opened.len(), 1);
        assert!(opened.ping().await.is_ok());
    }
}
