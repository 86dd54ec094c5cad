//! Engine endpoint configuration, resolved once at startup.

use std::fmt;
use std::time::Duration;
use thiserror::Error;
use tracing::warn;

pub const DOCKER_HOST_VAR: &str = "DOCKER_HOST";
pub const DOCKER_TIMEOUT_VAR: &str = "DOCKER_TIMEOUT_SECS";

pub const DEFAULT_DOCKER_HOST: &str = "unix:///var/run/docker.sock";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineConfigError {
    #[error("Unsupported engine endpoint: {0} (expected unix://, tcp:// or http://)")]
    UnsupportedEndpoint(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEndpoint {
    /// Local socket, e.g. `unix:///var/run/docker.sock`.
    Unix(String),
    /// Remote daemon, e.g. `tcp://10.0.0.5:2375`.
    Http(String),
}

impl EngineEndpoint {
    pub fn parse(raw: &str) -> Result<Self, EngineConfigError> {
        let raw = raw.trim();
        if raw.starts_with("unix://") {
            Ok(EngineEndpoint::Unix(raw.to_string()))
        } else if raw.starts_with("tcp://") || raw.starts_with("http://") {
            Ok(EngineEndpoint::Http(raw.to_string()))
        } else {
            Err(EngineConfigError::UnsupportedEndpoint(raw.to_string()))
        }
    }
}

impl fmt::Display for EngineEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineEndpoint::Unix(addr) | EngineEndpoint::Http(addr) => f.write_str(addr),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    pub endpoint: EngineEndpoint,
    /// Transport timeout of every engine call.
    pub timeout: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            endpoint: EngineEndpoint::Unix(DEFAULT_DOCKER_HOST.to_string()),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl EngineConfig {
    pub fn from_env() -> Result<Self, EngineConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolve from an arbitrary key lookup. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, EngineConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let endpoint = match get(DOCKER_HOST_VAR) {
            Some(raw) => EngineEndpoint::parse(&raw)?,
            None => EngineEndpoint::Unix(DEFAULT_DOCKER_HOST.to_string()),
        };

        let timeout = match get(DOCKER_TIMEOUT_VAR) {
            Some(raw) => match raw.trim().parse::<u64>() {
                Ok(secs) => Duration::from_secs(secs),
                Err(_) => {
                    warn!(value = %raw, "Invalid {}, using default", DOCKER_TIMEOUT_VAR);
                    DEFAULT_TIMEOUT
                }
            },
            None => DEFAULT_TIMEOUT,
        };

        Ok(Self { endpoint, timeout })
    }
}
