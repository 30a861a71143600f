//! Connection pool for the backing store

use std::time::Duration;

use async_trait::async_trait;
use deadpool_postgres::{Manager, ManagerConfig, Object, Pool, RecyclingMethod};
use ticketing_core::{HealthCheck, RuntimeSettings, ServiceConfig, StoreConnector};
use tokio_postgres::NoTls;
use tracing::{debug, info};

use crate::{Result, StoreError};

/// Pool configuration
#[derive(Debug, Clone)]
pub struct PoolConfig {
    pub url: String,
    pub max_size: usize,
    pub connect_timeout: Option<Duration>,
}

impl PoolConfig {
    pub fn from_settings(config: &ServiceConfig, settings: &RuntimeSettings) -> Self {
        Self {
            url: config.store_uri.clone(),
            max_size: settings.store_pool_size,
            connect_timeout: Some(settings.store_timeout),
        }
    }
}

/// Pooled PostgreSQL wire-protocol connections.
#[derive(Clone)]
pub struct StorePool {
    pool: Pool,
}

impl StorePool {
    /// Create the pool. No connection is opened until first use.
    pub fn new(config: PoolConfig) -> Result<Self> {
        info!(max_size = config.max_size, "Creating store connection pool");

        let mut pg_config: tokio_postgres::Config = config
            .url
            .parse()
            .map_err(|e| StoreError::Configuration(format!("Invalid store URI: {}", e)))?;
        if let Some(timeout) = config.connect_timeout {
            pg_config.connect_timeout(timeout);
        }

        let manager_config = ManagerConfig {
            recycling_method: RecyclingMethod::Fast,
        };

        let manager = Manager::from_config(pg_config, NoTls, manager_config);

        let pool = Pool::builder(manager)
            .max_size(config.max_size)
            .build()
            .map_err(|e| StoreError::Pool(e.to_string()))?;

        debug!("Store pool created successfully");

        Ok(Self { pool })
    }

    /// Get a connection from the pool
    pub async fn get(&self) -> Result<Object> {
        self.pool
            .get()
            .await
            .map_err(|e| StoreError::Pool(e.to_string()))
    }
}

#[async_trait]
impl HealthCheck for StorePool {
    async fn ping(&self) -> ticketing_core::Result<()> {
        let client = self.get().await?;
        client
            .simple_query("SELECT 1")
            .await
            .map_err(StoreError::Connection)?;
        Ok(())
    }
}

/// Opens a bare [`StorePool`] for services that only need connectivity.
#[derive(Debug, Clone, Copy, Default)]
pub struct PoolConnector;

#[async_trait]
impl StoreConnector for PoolConnector {
    type Store = StorePool;

    async fn open(&self, config: &ServiceConfig, settings: &RuntimeSettings) -> ticketing_core::Result<StorePool> {
        Ok(StorePool::new(PoolConfig::from_settings(config, settings))?)
    }
}
