//! Ticketing Store
//!
//! Typed access to the ticket collection. The query service only relies on
//! the [`TicketStore`] trait; two adapters are provided:
//! - [`PgTicketStore`]: pooled PostgreSQL wire-protocol store
//! - [`MemoryTicketStore`]: in-process store for tests and local runs

mod error;
mod memory;
mod pool;
mod postgres;
mod store;
mod ticket;

pub use error::{Result, StoreError};
pub use memory::{MemoryConnector, MemoryTicketStore};
pub use pool::{PoolConfig, PoolConnector, StorePool};
pub use postgres::{PgConnector, PgTicketStore};
pub use store::TicketStore;
pub use ticket::{NewTicket, OrderFilter, Ticket, TicketFilter};

/// Re-export so adapters and services agree on the connectivity seam
pub use ticketing_core::HealthCheck;
