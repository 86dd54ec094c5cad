// Re-export dependencies used in public interfaces of common types

use std::fmt::{self, Display};
use std::str::FromStr;

pub use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Caller-facing error taxonomy. Every failure leaving the gateway is one of
/// these three.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GatewayError {
    /// Caller input is structurally invalid.
    #[error("{0}")]
    Validation(String),

    /// The referenced container does not exist at the engine.
    #[error("{0}")]
    NotFound(String),

    /// Anything else that went wrong talking to the engine.
    #[error("{0}")]
    Engine(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Validation,
    NotFound,
    Engine,
}

impl GatewayError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            GatewayError::Validation(_) => ErrorKind::Validation,
            GatewayError::NotFound(_) => ErrorKind::NotFound,
            GatewayError::Engine(_) => ErrorKind::Engine,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            GatewayError::Validation(msg) | GatewayError::NotFound(msg) | GatewayError::Engine(msg) => {
                msg
            }
        }
    }
}

// Define the primary Result type for gateway operations
pub type Result<T> = std::result::Result<T, GatewayError>;

/// Engine-assigned container identifier. Never blank.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ContainerId(String);

impl ContainerId {
    pub fn new(id: impl Into<String>) -> Result<Self> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(GatewayError::Validation("invalid container id".to_string()));
        }
        Ok(Self(id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for ContainerId {
    type Error = GatewayError;

    fn try_from(value: String) -> Result<Self> {
        Self::new(value)
    }
}

impl From<ContainerId> for String {
    fn from(id: ContainerId) -> Self {
        id.0
    }
}

impl AsRef<str> for ContainerId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Display for ContainerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Which containers a listing should return.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusFilter {
    #[default]
    All,
    /// Containers the engine reports as `running`.
    Active,
    /// Containers the engine reports as `exited`.
    Inactive,
}

impl StatusFilter {
    /// Resolve a raw caller token. Absent or blank means [`StatusFilter::All`];
    /// anything other than `active`/`inactive` (any case) is rejected.
    pub fn resolve(token: Option<&str>) -> Result<Self> {
        let token = match token.map(str::trim) {
            None | Some("") => return Ok(StatusFilter::All),
            Some(token) => token,
        };

        if token.eq_ignore_ascii_case("active") {
            Ok(StatusFilter::Active)
        } else if token.eq_ignore_ascii_case("inactive") {
            Ok(StatusFilter::Inactive)
        } else {
            Err(GatewayError::Validation("invalid container status".to_string()))
        }
    }

    /// The engine-level `status` value this filter selects, if any.
    pub fn engine_state(&self) -> Option<&'static str> {
        match self {
            StatusFilter::All => None,
            StatusFilter::Active => Some("running"),
            StatusFilter::Inactive => Some("exited"),
        }
    }
}

impl FromStr for StatusFilter {
    type Err = GatewayError;

    fn from_str(s: &str) -> Result<Self> {
        Self::resolve(Some(s))
    }
}

impl Display for StatusFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StatusFilter::All => "all",
            StatusFilter::Active => "active",
            StatusFilter::Inactive => "inactive",
        };
        f.write_str(name)
    }
}
