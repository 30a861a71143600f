//! Error types shared by ticketing services

use thiserror::Error;

pub type Result<T> = std::result::Result<T, TicketingError>;

#[derive(Error, Debug)]
pub enum TicketingError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Store connection error: {0}")]
    StoreConnection(String),

    #[error("Store error: {0}")]
    Store(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Service unavailable: {0}")]
    Unavailable(String),

    #[error("Timeout: {0}")]
    Timeout(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl TicketingError {
    pub fn status_code(&self) -> u16 {
        match self {
            Self::NotFound(_) => 404,
            Self::Unavailable(_) | Self::StoreConnection(_) => 503,
            Self::Timeout(_) => 504,
            _ => 500,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Config(_) => "CONFIG_ERROR",
            Self::StoreConnection(_) => "STORE_CONNECTION_ERROR",
            Self::Store(_) => "STORE_ERROR",
            Self::Network(_) => "NETWORK_ERROR",
            Self::NotFound(_) => "NOT_FOUND",
            Self::Unavailable(_) => "UNAVAILABLE",
            Self::Timeout(_) => "TIMEOUT",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Errors that must abort startup rather than reach a client.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Config(_) | Self::StoreConnection(_))
    }
}

impl From<std::io::Error> for TicketingError {
    fn from(err: std::io::Error) -> Self {
        TicketingError::Network(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_maps_to_404() {
        let err = TicketingError::NotFound("ticket t1".to_string());
        assert_eq!(err.status_code(), 404);
        assert_eq!(err.error_code(), "NOT_FOUND");
        assert!(!err.is_fatal());
    }

    #[test]
    fn test_config_error_is_fatal() {
        let err = TicketingError::Config("JWT_KEY must be defined".to_string());
        assert!(err.is_fatal());
        assert_eq!(err.status_code(), 500);
        assert_eq!(err.to_string(), "Configuration error: JWT_KEY must be defined");
    }

    #[test]
    fn test_timeout_maps_to_504() {
        assert_eq!(TicketingError::Timeout("find_many".into()).status_code(), 504);
    }
}
