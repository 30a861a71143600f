//! Error types for the Tickets Service HTTP boundary

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use ticketing_core::TicketingError;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Errors a request handler can surface to a client
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Ticket not found: {0}")]
    TicketNotFound(String),

    #[error(transparent)]
    Service(#[from] TicketingError),
}

impl Error {
    fn into_service(self) -> TicketingError {
        match self {
            Error::TicketNotFound(id) => TicketingError::NotFound(format!("ticket {}", id)),
            Error::Service(err) => err,
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let err = self.into_service();
        let status =
            StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        // Only not-found keeps a specific message; everything else is generic.
        let message = match &err {
            TicketingError::NotFound(_) => "Not Found",
            TicketingError::Timeout(_) => {
                tracing::warn!("Store timeout: {:?}", err);
                "Store timed out"
            }
            TicketingError::Unavailable(_) | TicketingError::StoreConnection(_) => {
                tracing::warn!("Store unavailable: {:?}", err);
                "Service unavailable"
            }
            _ => {
                tracing::error!("Internal error: {:?}", err);
                "Internal server error"
            }
        };

        let body = Json(json!({
            "error": message,
            "code": status.as_u16(),
            "kind": err.error_code(),
        }));

        (status, body).into_response()
    }
}
