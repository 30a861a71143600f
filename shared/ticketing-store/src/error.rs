//! Store error types

use std::time::Duration;

use thiserror::Error;
use ticketing_core::TicketingError;

pub type Result<T> = std::result::Result<T, StoreError>;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Connection error: {0}")]
    Connection(tokio_postgres::Error),

    #[error("Query error: {0}")]
    Query(tokio_postgres::Error),

    #[error("Pool error: {0}")]
    Pool(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Store unavailable: {0}")]
    Unavailable(String),

    #[error("Store call exceeded {0:?}")]
    Timeout(Duration),
}

impl From<StoreError> for TicketingError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Configuration(msg) => TicketingError::Config(msg),
            StoreError::Timeout(_) => TicketingError::Timeout(err.to_string()),
            StoreError::Query(_) => TicketingError::Store(err.to_string()),
            StoreError::Connection(_) | StoreError::Pool(_) | StoreError::Unavailable(_) => {
                TicketingError::Unavailable(err.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conversion_to_service_errors() {
        let err: TicketingError = StoreError::Configuration("bad url".into()).into();
        assert!(matches!(err, TicketingError::Config(_)));

        let err: TicketingError = StoreError::Timeout(Duration::from_millis(5)).into();
        assert_eq!(err.status_code(), 504);

        let err: TicketingError = StoreError::Unavailable("offline".into()).into();
        assert_eq!(err.status_code(), 503);
    }
}
