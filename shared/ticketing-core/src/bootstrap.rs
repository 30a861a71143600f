//! Fail-fast service bootstrap
//!
//! Every service walks the same ordered sequence exactly once:
//!
//! ```text
//! Unconfigured -> ConfigResolved -> StoreConnecting -> StoreConnected -> Listening
//!       \               \                 \                  \
//!        +---------------+-----------------+------------------+--> Failed
//! ```
//!
//! A missing required value always ends in `Failed` before any store
//! connection is attempted or any socket is bound. Store reachability is
//! governed by [`StoreFailurePolicy`].

use std::str::FromStr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::net::TcpListener;
use tracing::{error, info, warn};

use crate::config::{RuntimeSettings, ServiceConfig};
use crate::error::{Result, TicketingError};
use crate::secrets::{Environment, ProcessEnv, SecretResolver};
use crate::service::HealthCheck;

/// Bootstrap lifecycle states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BootstrapState {
    Unconfigured,
    ConfigResolved,
    StoreConnecting,
    StoreConnected,
    Listening,
    Failed,
}

/// How an unreachable store is treated at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StoreFailurePolicy {
    /// Abort startup before binding the listener.
    #[default]
    Fatal,
    /// Log the failure, mark the service not ready, and bind anyway.
    Continue,
}

impl FromStr for StoreFailurePolicy {
    type Err = TicketingError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fatal" => Ok(Self::Fatal),
            "continue" => Ok(Self::Continue),
            other => Err(TicketingError::Config(format!(
                "Invalid STORE_FAILURE_POLICY: {} (expected 'fatal' or 'continue')",
                other
            ))),
        }
    }
}

/// Opens a handle to the backing store.
#[async_trait]
pub trait StoreConnector: Send + Sync {
    type Store: HealthCheck + 'static;

    /// Build a store handle from the resolved configuration.
    ///
    /// Failing here means no handle exists at all, so it is always fatal.
    async fn open(&self, config: &ServiceConfig, settings: &RuntimeSettings) -> Result<Self::Store>;
}

/// Shared view of whether the store is reachable.
#[derive(Debug, Clone, Default)]
pub struct Readiness {
    store_connected: Arc<AtomicBool>,
}

impl Readiness {
    pub fn new(store_connected: bool) -> Self {
        Self {
            store_connected: Arc::new(AtomicBool::new(store_connected)),
        }
    }

    pub fn store_connected(&self) -> bool {
        self.store_connected.load(Ordering::Acquire)
    }

    pub fn set_store_connected(&self, connected: bool) {
        self.store_connected.store(connected, Ordering::Release);
    }
}

/// Everything a service needs once bootstrap reaches `Listening`.
pub struct Bootstrapped<S> {
    pub config: Arc<ServiceConfig>,
    pub settings: RuntimeSettings,
    pub store: Arc<S>,
    pub listener: TcpListener,
    pub readiness: Readiness,
}

/// Drives a service from process start to a bound listener.
pub struct BootstrapSequencer<E = ProcessEnv> {
    service_name: &'static str,
    resolver: SecretResolver<E>,
    settings: RuntimeSettings,
    state: BootstrapState,
    history: Vec<BootstrapState>,
}

impl BootstrapSequencer<ProcessEnv> {
    /// Sequencer reading the process environment and mounted secrets.
    pub fn from_process(service_name: &'static str) -> Result<Self> {
        let resolver = SecretResolver::from_process();
        let settings = RuntimeSettings::from_env(resolver.env())?;
        Ok(Self::new(service_name, resolver, settings))
    }
}

impl<E: Environment> BootstrapSequencer<E> {
    pub fn new(service_name: &'static str, resolver: SecretResolver<E>, settings: RuntimeSettings) -> Self {
        Self {
            service_name,
            resolver,
            settings,
            state: BootstrapState::Unconfigured,
            history: vec![BootstrapState::Unconfigured],
        }
    }

    pub fn state(&self) -> BootstrapState {
        self.state
    }

    /// Every state visited so far, in order.
    pub fn history(&self) -> &[BootstrapState] {
        &self.history
    }

    pub fn settings(&self) -> &RuntimeSettings {
        &self.settings
    }

    /// Run the full sequence. Must be called at most once.
    pub async fn run<C: StoreConnector>(&mut self, connector: &C) -> Result<Bootstrapped<C::Store>> {
        if self.state != BootstrapState::Unconfigured {
            return Err(TicketingError::Internal(format!(
                "bootstrap already ran (state: {:?})",
                self.state
            )));
        }

        let config = self.resolve_config().map_err(|e| self.fail(e))?;
        let (store, readiness) = self
            .connect_store(connector, &config)
            .await
            .map_err(|e| self.fail(e))?;
        let listener = self.bind().await.map_err(|e| self.fail(e))?;

        Ok(Bootstrapped {
            config: Arc::new(config),
            settings: self.settings.clone(),
            store: Arc::new(store),
            listener,
            readiness,
        })
    }

    fn resolve_config(&mut self) -> Result<ServiceConfig> {
        let config = ServiceConfig::resolve(&self.resolver)?;

        info!(
            service = self.service_name,
            signing_key_resolved = true,
            store_uri_resolved = true,
            "Starting service"
        );

        self.transition(BootstrapState::ConfigResolved);
        Ok(config)
    }

    async fn connect_store<C: StoreConnector>(
        &mut self,
        connector: &C,
        config: &ServiceConfig,
    ) -> Result<(C::Store, Readiness)> {
        self.transition(BootstrapState::StoreConnecting);

        let store = connector.open(config, &self.settings).await?;

        let check = match tokio::time::timeout(self.settings.store_timeout, store.ping()).await {
            Ok(result) => result,
            Err(_) => Err(TicketingError::Timeout(format!(
                "store did not answer within {:?}",
                self.settings.store_timeout
            ))),
        };

        match check {
            Ok(()) => {
                info!(service = self.service_name, "Connected to store");
                self.transition(BootstrapState::StoreConnected);
                Ok((store, Readiness::new(true)))
            }
            Err(e) => match self.settings.store_failure_policy {
                StoreFailurePolicy::Fatal => Err(match e {
                    TicketingError::StoreConnection(_) => e,
                    other => TicketingError::StoreConnection(other.to_string()),
                }),
                StoreFailurePolicy::Continue => {
                    error!(
                        service = self.service_name,
                        error = %e,
                        "Store connection failed, continuing startup"
                    );
                    Ok((store, Readiness::new(false)))
                }
            },
        }
    }

    async fn bind(&mut self) -> Result<TcpListener> {
        let addr = self.settings.bind_address()?;
        let listener = TcpListener::bind(addr).await?;

        info!(
            service = self.service_name,
            addr = %listener.local_addr()?,
            "Listening"
        );

        self.transition(BootstrapState::Listening);
        Ok(listener)
    }

    fn transition(&mut self, next: BootstrapState) {
        tracing::debug!(from = ?self.state, to = ?next, "Bootstrap transition");
        self.state = next;
        self.history.push(next);
    }

    fn fail(&mut self, err: TicketingError) -> TicketingError {
        warn!(
            service = self.service_name,
            state = ?self.state,
            error = %err,
            "Bootstrap failed"
        );
        self.transition(BootstrapState::Failed);
        err
    }
}
