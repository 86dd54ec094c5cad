//! Ordered, fail-fast application of one lifecycle action to a batch of
//! containers.

use dockgate_common::{ContainerId, ErrorKind, GatewayError};
use std::fmt;
use std::future::Future;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

/// How long the engine waits for a graceful exit on stop and restart before
/// killing the process.
pub const STOP_GRACE_PERIOD: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LifecycleAction {
    Start,
    Stop,
    Kill,
    Restart,
}

impl LifecycleAction {
    pub fn grace_period(self) -> Option<Duration> {
        match self {
            LifecycleAction::Stop | LifecycleAction::Restart => Some(STOP_GRACE_PERIOD),
            LifecycleAction::Start | LifecycleAction::Kill => None,
        }
    }

    /// Resolve a route segment such as `restart`. Exact, lowercase match.
    pub fn parse(segment: &str) -> Option<Self> {
        match segment {
            "start" => Some(LifecycleAction::Start),
            "stop" => Some(LifecycleAction::Stop),
            "kill" => Some(LifecycleAction::Kill),
            "restart" => Some(LifecycleAction::Restart),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            LifecycleAction::Start => "start",
            LifecycleAction::Stop => "stop",
            LifecycleAction::Kill => "kill",
            LifecycleAction::Restart => "restart",
        }
    }
}

impl fmt::Display for LifecycleAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The item a batch stopped at. Every id before it was applied; none after it
/// was attempted.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{action} failed for container {id}: {error}")]
pub struct BulkFailure {
    pub action: LifecycleAction,
    pub id: ContainerId,
    #[source]
    pub error: GatewayError,
}

impl BulkFailure {
    pub fn kind(&self) -> ErrorKind {
        self.error.kind()
    }
}

/// Apply `operation` to each id in order, stopping at the first failure.
///
/// Duplicates are applied as many times as they appear. Nothing runs
/// concurrently and nothing is retried.
pub async fn execute<F, Fut>(
    action: LifecycleAction,
    ids: &[ContainerId],
    mut operation: F,
) -> Result<(), BulkFailure>
where
    F: FnMut(ContainerId) -> Fut,
    Fut: Future<Output = dockgate_common::Result<()>>,
{
    for (position, id) in ids.iter().enumerate() {
        if let Err(error) = operation(id.clone()).await {
            warn!(
                %action,
                container_id = %id,
                position,
                skipped = ids.len() - position - 1,
                %error,
                "Bulk operation aborted"
            );
            return Err(BulkFailure {
                action,
                id: id.clone(),
                error,
            });
        }
        debug!(%action, container_id = %id, grace = ?action.grace_period(), "Applied");
    }
    Ok(())
}
