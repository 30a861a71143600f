//! Secret and configuration value resolution
//!
//! A required value is looked up in a fixed order:
//! 1. the environment, when the variable is set and non-empty
//! 2. a mounted secret file (e.g. `/run/secrets/jwt_secret`), trimmed
//! 3. otherwise the value is absent
//!
//! Values are never logged. Only the key name, the source that supplied it
//! and whether it resolved at all.
//!
//! Binaries load `.env` before anything reads the environment.

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{Result, TicketingError};

/// Default directory orchestrators mount secrets into.
pub const DEFAULT_SECRETS_DIR: &str = "/run/secrets";

/// Key/value lookup for environment-style overrides.
pub trait Environment: Send + Sync {
    fn var(&self, key: &str) -> Option<String>;
}

/// The real process environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl Environment for ProcessEnv {
    fn var(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

impl Environment for HashMap<String, String> {
    fn var(&self, key: &str) -> Option<String> {
        self.get(key).cloned()
    }
}

/// A value the service cannot start without.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequiredKey {
    /// Environment variable name
    pub name: &'static str,
    /// File name under the secrets directory, if the value may be mounted
    pub secret_file: Option<&'static str>,
    /// Secret-classified values are redacted everywhere
    pub secret: bool,
}

impl RequiredKey {
    /// Token signing secret.
    pub const SIGNING_KEY: RequiredKey = RequiredKey {
        name: "JWT_KEY",
        secret_file: Some("jwt_secret"),
        secret: true,
    };

    /// Backing store connection string. The variable name is shared with the
    /// rest of the mesh's deployment manifests.
    pub const STORE_URI: RequiredKey = RequiredKey {
        name: "MONGO_URI",
        secret_file: None,
        secret: false,
    };
}

/// Where a resolved value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    Environment,
    SecretFile,
}

/// A resolved value together with its source.
#[derive(Clone, PartialEq, Eq)]
pub struct Resolved {
    pub value: String,
    pub source: Source,
}

impl fmt::Debug for Resolved {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Resolved")
            .field("value", &"[REDACTED]")
            .field("source", &self.source)
            .finish()
    }
}

/// String wrapper whose `Debug` and `Display` never reveal the contents.
#[derive(Clone, PartialEq, Eq)]
pub struct SecretValue(String);

impl SecretValue {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Access the raw value. Callers must not log the result.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for SecretValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SecretValue([REDACTED])")
    }
}

impl fmt::Display for SecretValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}

/// Resolves required values from the environment and mounted secret files.
pub struct SecretResolver<E = ProcessEnv> {
    env: E,
    secrets_dir: PathBuf,
}

impl SecretResolver<ProcessEnv> {
    /// Resolver over the process environment, honouring `SECRETS_DIR` for
    /// the mount location.
    pub fn from_process() -> Self {
        let secrets_dir = std::env::var("SECRETS_DIR")
            .ok()
            .filter(|dir| !dir.is_empty())
            .unwrap_or_else(|| DEFAULT_SECRETS_DIR.to_string());
        Self::new(ProcessEnv, secrets_dir)
    }
}

impl<E: Environment> SecretResolver<E> {
    pub fn new(env: E, secrets_dir: impl Into<PathBuf>) -> Self {
        Self {
            env,
            secrets_dir: secrets_dir.into(),
        }
    }

    pub fn env(&self) -> &E {
        &self.env
    }

    pub fn secrets_dir(&self) -> &Path {
        &self.secrets_dir
    }

    /// Resolve a single key, returning `None` when no source supplies it.
    pub fn resolve(&self, key: &RequiredKey) -> Result<Option<Resolved>> {
        let resolved = match self.env.var(key.name).filter(|v| !v.is_empty()) {
            Some(value) => Some(Resolved {
                value,
                source: Source::Environment,
            }),
            None => self.read_secret_file(key)?,
        };

        debug!(
            key = key.name,
            secret = key.secret,
            source = ?resolved.as_ref().map(|r| r.source),
            resolved = resolved.is_some(),
            "Configuration value lookup"
        );

        Ok(resolved)
    }

    /// Resolve a key that must be present.
    pub fn require(&self, key: &RequiredKey) -> Result<String> {
        self.resolve(key)?
            .map(|r| r.value)
            .ok_or_else(|| TicketingError::Config(format!("{} must be defined", key.name)))
    }

    fn read_secret_file(&self, key: &RequiredKey) -> Result<Option<Resolved>> {
        let Some(file) = key.secret_file else {
            return Ok(None);
        };

        let path = self.secrets_dir.join(file);
        if !path.exists() {
            return Ok(None);
        }

        let contents = std::fs::read_to_string(&path).map_err(|e| {
            TicketingError::Config(format!("Unable to read secret file {}: {}", path.display(), e))
        })?;

        let value = contents.trim();
        if value.is_empty() {
            return Ok(None);
        }

        Ok(Some(Resolved {
            value: value.to_string(),
            source: Source::SecretFile,
        }))
    }
}
