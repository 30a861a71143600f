//! Ticketing Core - Shared service infrastructure
//!
//! This crate provides:
//! - Error taxonomy shared by every ticketing service
//! - Secret/config resolution with mounted-secret fallback
//! - The fail-fast bootstrap sequencer
//! - Health and readiness types

pub mod bootstrap;
pub mod config;
pub mod error;
pub mod secrets;
pub mod service;

pub use bootstrap::{
    BootstrapSequencer, BootstrapState, Bootstrapped, Readiness, StoreConnector, StoreFailurePolicy,
};
pub use config::{RuntimeSettings, ServiceConfig};
pub use error::{Result, TicketingError};
pub use secrets::{Environment, ProcessEnv, RequiredKey, SecretResolver, SecretValue, Source};
pub use service::{
    probe_dependency, shutdown_signal, DependencyStatus, HealthCheck, HealthStatus, ReadinessStatus,
};
