//! Ticket model and query filters

use serde::{Deserialize, Serialize};

/// A ticket as stored and as served.
///
/// `order_id` is the reservation marker: absent means the ticket can still
/// be bought.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ticket {
    pub id: String,
    pub title: String,
    pub price: f64,
    pub user_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_id: Option<String>,
}

impl Ticket {
    pub fn is_available(&self) -> bool {
        self.order_id.is_none()
    }
}

/// Ticket fields supplied on creation; the store assigns the id.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTicket {
    pub title: String,
    pub price: f64,
    pub user_id: String,
    #[serde(default)]
    pub order_id: Option<String>,
}

impl NewTicket {
    pub fn into_ticket(self, id: String) -> Ticket {
        Ticket {
            id,
            title: self.title,
            price: self.price,
            user_id: self.user_id,
            order_id: self.order_id,
        }
    }
}

/// Selection on the reservation marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OrderFilter {
    #[default]
    Any,
    /// No order reference
    Unreserved,
    /// Has an order reference
    Reserved,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TicketFilter {
    pub order: OrderFilter,
}

impl TicketFilter {
    pub fn all() -> Self {
        Self::default()
    }

    /// Tickets that are still purchasable.
    pub fn available() -> Self {
        Self {
            order: OrderFilter::Unreserved,
        }
    }

    pub fn matches(&self, ticket: &Ticket) -> bool {
        match self.order {
            OrderFilter::Any => true,
            OrderFilter::Unreserved => ticket.order_id.is_none(),
            OrderFilter::Reserved => ticket.order_id.is_some(),
        }
    }
}
