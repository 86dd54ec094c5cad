//! Server configuration, resolved once at startup.

use dockgate_engine::{EngineConfig, EngineConfigError};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use tracing::warn;

pub const HOST_VAR: &str = "DOCKGATE_HOST";
pub const PORT_VAR: &str = "DOCKGATE_PORT";

pub const DEFAULT_HOST: IpAddr = IpAddr::V4(Ipv4Addr::UNSPECIFIED);
pub const DEFAULT_PORT: u16 = 8080;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayConfig {
    pub host: IpAddr,
    pub port: u16,
    pub engine: EngineConfig,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST,
            port: DEFAULT_PORT,
            engine: EngineConfig::default(),
        }
    }
}

impl GatewayConfig {
    pub fn from_env() -> Result<Self, EngineConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, EngineConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let engine = EngineConfig::from_lookup(&lookup)?;
        let host = parse_or_default(&lookup, HOST_VAR, DEFAULT_HOST);
        let port = parse_or_default(&lookup, PORT_VAR, DEFAULT_PORT);

        Ok(Self { host, port, engine })
    }

    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

fn parse_or_default<F, T>(lookup: &F, key: &str, default: T) -> T
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(key).filter(|value| !value.trim().is_empty()) {
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            warn!(value = %raw, "Invalid {}, using default", key);
            default
        }),
        None => default,
    }
}
