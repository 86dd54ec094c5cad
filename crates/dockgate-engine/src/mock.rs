//! In-memory engine for tests: scripted containers, log frames and failures,
//! with every call recorded in order.

use crate::{ContainerEngine, EngineResult, LogStream};
use async_trait::async_trait;
use bollard::container::LogOutput;
use bollard::errors::Error as BollardError;
use bollard::models::{
    ContainerInspectResponse, ContainerState, ContainerStateStatusEnum, ContainerSummary,
};
use dockgate_common::{ContainerId, StatusFilter};
use futures::stream::{self, StreamExt};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// One recorded engine call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineCall {
    List(StatusFilter),
    Inspect(String),
    Logs(String),
    Remove(String),
    Start(String),
    Stop(String, Duration),
    Kill(String),
    Restart(String, Duration),
    Ping,
}

/// A failure the mock should answer with.
#[derive(Debug, Clone)]
pub enum MockFailure {
    /// Engine answers 404 for the id.
    NotFound,
    /// Engine answers with the given status code.
    Server(u16),
    /// Transport times out.
    Timeout,
}

impl MockFailure {
    fn to_error(&self, id: &str) -> BollardError {
        match self {
            MockFailure::NotFound => not_found(id),
            MockFailure::Server(status_code) => BollardError::DockerResponseServerError {
                status_code: *status_code,
                message: format!("engine failure for {id}"),
            },
            MockFailure::Timeout => BollardError::RequestTimeoutError,
        }
    }
}

/// A scripted log frame.
#[derive(Debug, Clone)]
pub enum MockLogFrame {
    Stdout(String),
    Stderr(String),
    /// The stream breaks at this point.
    Fault,
}

#[derive(Debug, Clone)]
struct MockContainer {
    id: String,
    name: String,
    state: ContainerStateStatusEnum,
}

pub fn not_found(id: &str) -> BollardError {
    BollardError::DockerResponseServerError {
        status_code: 404,
        message: format!("No such container: {id}"),
    }
}

/// Counts log-stream releases; one increment per dropped stream.
struct ReleaseProbe(Arc<AtomicUsize>);

impl Drop for ReleaseProbe {
    fn drop(&mut self) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }
}

#[derive(Default)]
pub struct MockEngine {
    containers: Mutex<Vec<MockContainer>>,
    logs: HashMap<String, Vec<MockLogFrame>>,
    failures: HashMap<String, MockFailure>,
    list_failure: Option<MockFailure>,
    calls: Mutex<Vec<EngineCall>>,
    released_streams: Arc<AtomicUsize>,
}

impl MockEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a container in the given engine state. Listing order is insertion
    /// order.
    pub fn with_container(self, id: &str, state: ContainerStateStatusEnum) -> Self {
        self.lock_containers().push(MockContainer {
            id: id.to_string(),
            name: format!("/{id}"),
            state,
        });
        self
    }

    pub fn with_logs(mut self, id: &str, frames: Vec<MockLogFrame>) -> Self {
        self.logs.insert(id.to_string(), frames);
        self
    }

    /// Every call naming `id` fails with `failure`.
    pub fn with_failure(mut self, id: &str, failure: MockFailure) -> Self {
        self.failures.insert(id.to_string(), failure);
        self
    }

    pub fn with_list_failure(mut self, failure: MockFailure) -> Self {
        self.list_failure = Some(failure);
        self
    }

    pub fn calls(&self) -> Vec<EngineCall> {
        self.lock_calls().clone()
    }

    pub fn call_count(&self) -> usize {
        self.lock_calls().len()
    }

    /// Number of log streams that have been dropped so far.
    pub fn released_streams(&self) -> usize {
        self.released_streams.load(Ordering::SeqCst)
    }

    fn lock_containers(&self) -> std::sync::MutexGuard<'_, Vec<MockContainer>> {
        self.containers.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn lock_calls(&self) -> std::sync::MutexGuard<'_, Vec<EngineCall>> {
        self.calls.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn record(&self, call: EngineCall) {
        self.lock_calls().push(call);
    }

    /// Scripted failure first, then existence check.
    fn check(&self, id: &ContainerId) -> EngineResult<MockContainer> {
        if let Some(failure) = self.failures.get(id.as_str()) {
            return Err(failure.to_error(id.as_str()));
        }
        self.lock_containers()
            .iter()
            .find(|c| c.id == id.as_str())
            .cloned()
            .ok_or_else(|| not_found(id.as_str()))
    }

    fn set_state(&self, id: &ContainerId, state: ContainerStateStatusEnum) {
        if let Some(container) = self
            .lock_containers()
            .iter_mut()
            .find(|c| c.id == id.as_str())
        {
            container.state = state;
        }
    }
}

fn summary(container: &MockContainer) -> ContainerSummary {
    ContainerSummary {
        id: Some(container.id.clone()),
        names: Some(vec![container.name.clone()]),
        image: Some("alpine:latest".to_string()),
        state: Some(container.state.to_string()),
        status: Some(container.state.to_string()),
        created: Some(1_700_000_000),
        ..Default::default()
    }
}

#[async_trait]
impl ContainerEngine for MockEngine {
    async fn list_containers(&self, filter: StatusFilter) -> EngineResult<Vec<ContainerSummary>> {
        self.record(EngineCall::List(filter));
        if let Some(failure) = &self.list_failure {
            return Err(failure.to_error("list"));
        }
        Ok(self
            .lock_containers()
            .iter()
            .filter(|c| {
                filter
                    .engine_state()
                    .map_or(true, |state| c.state.to_string() == state)
            })
            .map(summary)
            .collect())
    }

    async fn inspect_container(&self, id: &ContainerId) -> EngineResult<ContainerInspectResponse> {
        self.record(EngineCall::Inspect(id.to_string()));
        let container = self.check(id)?;
        let running = container.state == ContainerStateStatusEnum::RUNNING;
        Ok(ContainerInspectResponse {
            id: Some(container.id),
            name: Some(container.name),
            image: Some("sha256:mock".to_string()),
            state: Some(ContainerState {
                status: Some(container.state),
                running: Some(running),
                ..Default::default()
            }),
            ..Default::default()
        })
    }

    fn logs(&self, id: &ContainerId) -> LogStream {
        self.record(EngineCall::Logs(id.to_string()));
        let probe = ReleaseProbe(Arc::clone(&self.released_streams));

        let items: Vec<EngineResult<LogOutput>> = match self.check(id) {
            Err(err) => vec![Err(err)],
            Ok(_) => self
                .logs
                .get(id.as_str())
                .cloned()
                .unwrap_or_default()
                .into_iter()
                .map(|frame| match frame {
                    MockLogFrame::Stdout(text) => Ok(LogOutput::StdOut {
                        message: text.into_bytes().into(),
                    }),
                    MockLogFrame::Stderr(text) => Ok(LogOutput::StdErr {
                        message: text.into_bytes().into(),
                    }),
                    MockLogFrame::Fault => Err(BollardError::RequestTimeoutError),
                })
                .collect(),
        };

        stream::iter(items)
            .map(move |item| {
                let _held = &probe;
                item
            })
            .boxed()
    }

    async fn remove_container(&self, id: &ContainerId) -> EngineResult<()> {
        self.record(EngineCall::Remove(id.to_string()));
        self.check(id)?;
        self.lock_containers().retain(|c| c.id != id.as_str());
        Ok(())
    }

    async fn start_container(&self, id: &ContainerId) -> EngineResult<()> {
        self.record(EngineCall::Start(id.to_string()));
        self.check(id)?;
        self.set_state(id, ContainerStateStatusEnum::RUNNING);
        Ok(())
    }

    async fn stop_container(&self, id: &ContainerId, grace: Duration) -> EngineResult<()> {
        self.record(EngineCall::Stop(id.to_string(), grace));
        self.check(id)?;
        self.set_state(id, ContainerStateStatusEnum::EXITED);
        Ok(())
    }

    async fn kill_container(&self, id: &ContainerId) -> EngineResult<()> {
        self.record(EngineCall::Kill(id.to_string()));
        self.check(id)?;
        self.set_state(id, ContainerStateStatusEnum::EXITED);
        Ok(())
    }

    async fn restart_container(&self, id: &ContainerId, grace: Duration) -> EngineResult<()> {
        self.record(EngineCall::Restart(id.to_string(), grace));
        self.check(id)?;
        self.set_state(id, ContainerStateStatusEnum::RUNNING);
        Ok(())
    }

    async fn ping(&self) -> EngineResult<()> {
        self.record(EngineCall::Ping);
        Ok(())
    }
}
