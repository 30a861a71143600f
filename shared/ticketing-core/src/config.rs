//! Configuration management for ticketing services

use std::fmt;
use std::net::SocketAddr;
use std::time::Duration;

use crate::bootstrap::StoreFailurePolicy;
use crate::error::{Result, TicketingError};
use crate::secrets::{Environment, RequiredKey, SecretResolver, SecretValue};

/// Required, process-wide configuration.
///
/// Resolved once during bootstrap and shared read-only afterwards.
#[derive(Clone)]
pub struct ServiceConfig {
    pub signing_key: SecretValue,
    pub store_uri: String,
}

impl ServiceConfig {
    /// Keys every ticketing service needs before it may connect or listen.
    pub const REQUIRED_KEYS: [RequiredKey; 2] = [RequiredKey::SIGNING_KEY, RequiredKey::STORE_URI];

    /// Resolve every required key, failing if any of them is absent.
    pub fn resolve<E: Environment>(resolver: &SecretResolver<E>) -> Result<Self> {
        let [signing_key_req, store_uri_req] = Self::REQUIRED_KEYS;
        let signing_key = resolver.resolve(&signing_key_req)?;
        let store_uri = resolver.resolve(&store_uri_req)?;

        match (signing_key, store_uri) {
            (Some(signing_key), Some(store_uri)) => Ok(Self {
                signing_key: SecretValue::new(signing_key.value),
                store_uri: store_uri.value,
            }),
            (signing_key, store_uri) => {
                let missing: Vec<&str> = [
                    (signing_key.is_none(), signing_key_req.name),
                    (store_uri.is_none(), store_uri_req.name),
                ]
                .into_iter()
                .filter_map(|(absent, name)| absent.then_some(name))
                .collect();

                Err(TicketingError::Config(format!(
                    "{} must be defined",
                    missing.join(", ")
                )))
            }
        }
    }
}

impl fmt::Debug for ServiceConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Connection strings routinely embed credentials.
        f.debug_struct("ServiceConfig")
            .field("signing_key", &self.signing_key)
            .field("store_uri", &"[REDACTED]")
            .finish()
    }
}

/// Optional settings with defaults.
#[derive(Debug, Clone)]
pub struct RuntimeSettings {
    /// HTTP bind host
    pub host: String,
    /// HTTP port
    pub port: u16,
    /// What to do when the store cannot be reached at startup
    pub store_failure_policy: StoreFailurePolicy,
    /// Upper bound on a single store call
    pub store_timeout: Duration,
    /// Maximum pooled store connections
    pub store_pool_size: usize,
}

impl RuntimeSettings {
    pub const DEFAULT_PORT: u16 = 3000;

    /// Load settings from an environment source.
    pub fn from_env<E: Environment>(env: &E) -> Result<Self> {
        let port = match env.var("PORT") {
            Some(raw) => raw
                .parse()
                .map_err(|e| TicketingError::Config(format!("Invalid PORT: {}", e)))?,
            None => Self::DEFAULT_PORT,
        };

        let store_failure_policy = match env.var("STORE_FAILURE_POLICY") {
            Some(raw) => raw.parse()?,
            None => StoreFailurePolicy::default(),
        };

        let store_timeout_ms: u64 = env
            .var("STORE_TIMEOUT_MS")
            .unwrap_or_else(|| "5000".to_string())
            .parse()
            .map_err(|e| TicketingError::Config(format!("Invalid STORE_TIMEOUT_MS: {}", e)))?;
        if store_timeout_ms == 0 {
            return Err(TicketingError::Config("STORE_TIMEOUT_MS must be greater than 0".to_string()));
        }

        let store_pool_size: usize = env
            .var("STORE_POOL_SIZE")
            .unwrap_or_else(|| "16".to_string())
            .parse()
            .map_err(|e| TicketingError::Config(format!("Invalid STORE_POOL_SIZE: {}", e)))?;
        if store_pool_size == 0 {
            return Err(TicketingError::Config("STORE_POOL_SIZE must be greater than 0".to_string()));
        }

        Ok(Self {
            host: env.var("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port,
            store_failure_policy,
            store_timeout: Duration::from_millis(store_timeout_ms),
            store_pool_size,
        })
    }

    /// Socket address for binding
    pub fn bind_address(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| TicketingError::Config(format!("Invalid bind address: {}", e)))
    }
}

impl Default for RuntimeSettings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: Self::DEFAULT_PORT,
            store_failure_policy: StoreFailurePolicy::default(),
            store_timeout: Duration::from_millis(5000),
            store_pool_size: 16,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::secrets::tests::{env, temp_secrets_dir};

    #[test]
    fn test_resolve_full_config() {
        let dir = temp_secrets_dir();
        let resolver = SecretResolver::new(env(&[("JWT_KEY", "abc"), ("MONGO_URI", "valid")]), dir.path());

        let config = ServiceConfig::resolve(&resolver).unwrap();
        assert_eq!(config.signing_key.expose(), "abc");
        assert_eq!(config.store_uri, "valid");
    }

    #[test]
    fn test_resolve_reports_every_missing_key() {
        let dir = temp_secrets_dir();
        let resolver = SecretResolver::new(env(&[]), dir.path());

        let err = ServiceConfig::resolve(&resolver).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Configuration error: JWT_KEY, MONGO_URI must be defined"
        );
    }

    #[test]
    fn test_signing_key_from_mounted_secret() {
        let dir = temp_secrets_dir();
        std::fs::write(dir.path().join("jwt_secret"), "mounted\n").unwrap();
        let resolver = SecretResolver::new(env(&[("MONGO_URI", "valid")]), dir.path());

        let config = ServiceConfig::resolve(&resolver).unwrap();
        assert_eq!(config.signing_key.expose(), "mounted");
    }

    #[test]
    fn test_debug_output_is_redacted() {
        let config = ServiceConfig {
            signing_key: SecretValue::new("abc"),
            store_uri: "postgres://user:hunter2@db/tickets".to_string(),
        };
        let rendered = format!("{:?}", config);
        assert!(!rendered.contains("abc"));
        assert!(!rendered.contains("hunter2"));
    }

    #[test]
    fn test_runtime_settings_defaults() {
        let settings = RuntimeSettings::from_env(&env(&[])).unwrap();
        assert_eq!(settings.port, 3000);
        assert_eq!(settings.store_failure_policy, StoreFailurePolicy::Fatal);
        assert_eq!(settings.store_timeout, Duration::from_secs(5));
        assert_eq!(settings.bind_address().unwrap().port(), 3000);
    }

    #[test]
    fn test_runtime_settings_invalid_port() {
        let err = RuntimeSettings::from_env(&env(&[("PORT", "not-a-port")])).unwrap_err();
        assert!(matches!(err, TicketingError::Config(_)));
    }

    #[test]
    fn test_runtime_settings_overrides() {
        let settings = RuntimeSettings::from_env(&env(&[
            ("HOST", "127.0.0.1"),
            ("PORT", "4100"),
            ("STORE_FAILURE_POLICY", "continue"),
            ("STORE_TIMEOUT_MS", "250"),
        ]))
        .unwrap();

        assert_eq!(settings.bind_address().unwrap().to_string(), "127.0.0.1:4100");
        assert_eq!(settings.store_failure_policy, StoreFailurePolicy::Continue);
        assert_eq!(settings.store_timeout, Duration::from_millis(250));
    }

    #[test]
    fn test_runtime_settings_reject_zero_limits() {
        let err = RuntimeSettings::from_env(&env(&[("STORE_TIMEOUT_MS", "0")])).unwrap_err();
        assert!(matches!(err, TicketingError::Config(ref msg) if msg.contains("STORE_TIMEOUT_MS")));

        let err = RuntimeSettings::from_env(&env(&[("STORE_POOL_SIZE", "0")])).unwrap_err();
        assert!(matches!(err, TicketingError::Config(ref msg) if msg.contains("STORE_POOL_SIZE")));
    }
}
