use async_trait::async_trait;
use bollard::container::{
    InspectContainerOptions, KillContainerOptions, ListContainersOptions, LogOutput, LogsOptions,
    RemoveContainerOptions, RestartContainerOptions, StartContainerOptions, StopContainerOptions,
};
use bollard::errors::Error as BollardError;
use bollard::models::{ContainerInspectResponse, ContainerSummary};
use bollard::Docker;
use dockgate_common::{ContainerId, StatusFilter};
use futures::stream::BoxStream;
use futures::StreamExt;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, instrument};

// Re-export dependencies potentially needed by consumers (like the gateway)
pub use bollard;

pub mod config;
#[cfg(any(test, feature = "mock"))]
pub mod mock;
pub mod test_utils;
pub mod translate;

pub use config::{EngineConfig, EngineConfigError, EngineEndpoint};
pub use translate::translate;

/// Raw engine result. Failures are the engine client's own error type and are
/// only normalised by [`translate`].
pub type EngineResult<T> = std::result::Result<T, BollardError>;

/// Combined stdout/stderr frames of one container. Dropping the stream
/// releases the underlying engine connection.
pub type LogStream = BoxStream<'static, EngineResult<LogOutput>>;

/// The calls the gateway needs from a container engine.
///
/// Implementations must be safe to share between concurrent requests.
#[async_trait]
pub trait ContainerEngine: Send + Sync {
    /// List containers, stopped ones included, narrowed by `filter`.
    async fn list_containers(&self, filter: StatusFilter) -> EngineResult<Vec<ContainerSummary>>;

    async fn inspect_container(&self, id: &ContainerId) -> EngineResult<ContainerInspectResponse>;

    /// Open a non-following stream over stdout and stderr. An unknown id
    /// surfaces as the first item of the stream.
    fn logs(&self, id: &ContainerId) -> LogStream;

    async fn remove_container(&self, id: &ContainerId) -> EngineResult<()>;

    async fn start_container(&self, id: &ContainerId) -> EngineResult<()>;

    /// Ask the process to stop, killing it after `grace`.
    async fn stop_container(&self, id: &ContainerId, grace: Duration) -> EngineResult<()>;

    async fn kill_container(&self, id: &ContainerId) -> EngineResult<()>;

    async fn restart_container(&self, id: &ContainerId, grace: Duration) -> EngineResult<()>;

    async fn ping(&self) -> EngineResult<()>;
}

// --- DockerEngine Implementation ---

#[derive(Clone)]
pub struct DockerEngine {
    docker_client: Arc<Docker>,
}

impl DockerEngine {
    pub fn new(docker_client: Arc<Docker>) -> Self {
        Self { docker_client }
    }

    /// Connect to the endpoint named by `config`. No request is made; use
    /// [`ContainerEngine::ping`] to check reachability.
    pub fn connect(config: &EngineConfig) -> EngineResult<Self> {
        let timeout = config.timeout.as_secs();
        let docker = match &config.endpoint {
            EngineEndpoint::Unix(path) => {
                Docker::connect_with_unix(path, timeout, bollard::API_DEFAULT_VERSION)?
            }
            EngineEndpoint::Http(addr) => {
                Docker::connect_with_http(addr, timeout, bollard::API_DEFAULT_VERSION)?
            }
        };
        info!(endpoint = %config.endpoint, timeout_secs = timeout, "Docker client configured");
        Ok(Self::new(Arc::new(docker)))
    }
}

/// The engine answers 304 when a container is already in the requested state.
fn ignore_not_modified(result: EngineResult<()>) -> EngineResult<()> {
    match result {
        Err(BollardError::DockerResponseServerError {
            status_code: 304, ..
        }) => Ok(()),
        other => other,
    }
}

#[async_trait]
impl ContainerEngine for DockerEngine {
    #[instrument(skip(self))]
    async fn list_containers(&self, filter: StatusFilter) -> EngineResult<Vec<ContainerSummary>> {
        let mut filters = HashMap::new();
        if let Some(state) = filter.engine_state() {
            filters.insert("status".to_string(), vec![state.to_string()]);
        }
        let options = ListContainersOptions::<String> {
            all: true,
            filters,
            ..Default::default()
        };
        self.docker_client.list_containers(Some(options)).await
    }

    #[instrument(skip(self), fields(container_id = %id))]
    async fn inspect_container(&self, id: &ContainerId) -> EngineResult<ContainerInspectResponse> {
        self.docker_client
            .inspect_container(id.as_str(), None::<InspectContainerOptions>)
            .await
    }

    fn logs(&self, id: &ContainerId) -> LogStream {
        let docker = Arc::clone(&self.docker_client);
        let container_id = id.to_string();
        debug!(%container_id, "Opening log stream");

        async_stream::stream! {
            let options = LogsOptions::<String> {
                follow: false,
                stdout: true,
                stderr: true,
                tail: "all".to_string(),
                ..Default::default()
            };
            let mut frames = Box::pin(docker.logs(&container_id, Some(options)));
            while let Some(frame) = frames.next().await {
                yield frame;
            }
        }
        .boxed()
    }

    #[instrument(skip(self), fields(container_id = %id))]
    async fn remove_container(&self, id: &ContainerId) -> EngineResult<()> {
        self.docker_client
            .remove_container(id.as_str(), None::<RemoveContainerOptions>)
            .await
    }

    #[instrument(skip(self), fields(container_id = %id))]
    async fn start_container(&self, id: &ContainerId) -> EngineResult<()> {
        ignore_not_modified(
            self.docker_client
                .start_container(id.as_str(), None::<StartContainerOptions<String>>)
                .await,
        )
    }

    #[instrument(skip(self), fields(container_id = %id))]
    async fn stop_container(&self, id: &ContainerId, grace: Duration) -> EngineResult<()> {
        let options = StopContainerOptions {
            t: grace.as_secs() as i64,
        };
        ignore_not_modified(
            self.docker_client
                .stop_container(id.as_str(), Some(options))
                .await,
        )
    }

    #[instrument(skip(self), fields(container_id = %id))]
    async fn kill_container(&self, id: &ContainerId) -> EngineResult<()> {
        self.docker_client
            .kill_container(id.as_str(), None::<KillContainerOptions<String>>)
            .await
    }

    #[instrument(skip(self), fields(container_id = %id))]
    async fn restart_container(&self, id: &ContainerId, grace: Duration) -> EngineResult<()> {
        let options = RestartContainerOptions {
            t: grace.as_secs() as isize,
        };
        self.docker_client
            .restart_container(id.as_str(), Some(options))
            .await
    }

    async fn ping(&self) -> EngineResult<()> {
        self.docker_client.ping().await.map(|_| ())
    }
}
