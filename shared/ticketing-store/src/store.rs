//! Store boundary consumed by the query service

use async_trait::async_trait;

use crate::{Result, Ticket, TicketFilter};

/// Read access to the ticket collection.
///
/// Implementations must not retain or mutate the filter. Connectivity is
/// reported separately through [`ticketing_core::HealthCheck`].
#[async_trait]
pub trait TicketStore: Send + Sync {
    /// All tickets matching `filter`, in store order.
    async fn find_many(&self, filter: &TicketFilter) -> Result<Vec<Ticket>>;

    /// The ticket with `id`, if any.
    async fn find_by_id(&self, id: &str) -> Result<Option<Ticket>>;
}
