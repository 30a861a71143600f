//! Probe types and process lifecycle helpers

use std::time::{Duration, Instant};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::signal;
use tracing::{error, info, warn};

use crate::bootstrap::Readiness;
use crate::error::Result;

/// A dependency that can be asked whether it is reachable.
#[async_trait]
pub trait HealthCheck: Send + Sync {
    async fn ping(&self) -> Result<()>;
}

/// Health status for liveness probes
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthStatus {
    pub healthy: bool,
    pub service_id: String,
    pub version: String,
    pub uptime_seconds: u64,
}

/// Readiness status for readiness probes
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReadinessStatus {
    pub ready: bool,
    pub dependencies: Vec<DependencyStatus>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DependencyStatus {
    pub name: String,
    pub available: bool,
    pub latency_ms: Option<u64>,
}

impl ReadinessStatus {
    /// Ready only when every dependency is available.
    pub fn from_dependencies(dependencies: Vec<DependencyStatus>) -> Self {
        Self {
            ready: dependencies.iter().all(|d| d.available),
            dependencies,
        }
    }
}

/// Ping a dependency and record the outcome in the shared readiness flag.
pub async fn probe_dependency(
    name: &str,
    check: &dyn HealthCheck,
    readiness: &Readiness,
    timeout: Duration,
) -> ReadinessStatus {
    let started = Instant::now();
    let available = match tokio::time::timeout(timeout, check.ping()).await {
        Ok(Ok(())) => true,
        Ok(Err(e)) => {
            warn!(dependency = name, error = %e, "Readiness probe failed");
            false
        }
        Err(_) => {
            warn!(dependency = name, timeout_ms = timeout.as_millis() as u64, "Readiness probe timed out");
            false
        }
    };

    readiness.set_store_connected(available);

    ReadinessStatus::from_dependencies(vec![DependencyStatus {
        name: name.to_string(),
        available,
        latency_ms: available.then(|| started.elapsed().as_millis() as u64),
    }])
}

/// Resolves when the process receives Ctrl+C or SIGTERM.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received, gracefully stopping...");
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dep(name: &str, available: bool) -> DependencyStatus {
        DependencyStatus {
            name: name.to_string(),
            available,
            latency_ms: None,
        }
    }

    #[test]
    fn test_ready_requires_all_dependencies() {
        assert!(ReadinessStatus::from_dependencies(vec![dep("store", true)]).ready);
        assert!(!ReadinessStatus::from_dependencies(vec![dep("store", true), dep("cache", false)]).ready);
    }

    struct Flaky(bool);

    #[async_trait]
    impl HealthCheck for Flaky {
        async fn ping(&self) -> Result<()> {
            if self.0 {
                Ok(())
            } else {
                Err(crate::TicketingError::Unavailable("down".to_string()))
            }
        }
    }

    #[tokio::test]
    async fn test_probe_updates_readiness() {
        let readiness = Readiness::new(true);

        let status = probe_dependency("store", &Flaky(false), &readiness, Duration::from_secs(1)).await;
        assert!(!status.ready);
        assert!(!readiness.store_connected());

        let status = probe_dependency("store", &Flaky(true), &readiness, Duration::from_secs(1)).await;
        assert!(status.ready);
        assert!(status.dependencies[0].latency_ms.is_some());
        assert!(readiness.store_connected());
    }

    #[test]
    fn test_readiness_serializes() {
        let status = ReadinessStatus::from_dependencies(vec![dep("store", false)]);
        let json = serde_json::to_value(&status).unwrap();
        assert_eq!(json["ready"], false);
        assert_eq!(json["dependencies"][0]["name"], "store");
    }
}
