use crate::bulk::{self, BulkFailure, LifecycleAction};
use crate::logs;
use dockgate_common::{ContainerId, Result, StatusFilter};
use dockgate_engine::bollard::models::{ContainerInspectResponse, ContainerSummary};
use dockgate_engine::{translate, ContainerEngine, EngineResult};
use std::sync::Arc;
use tracing::{debug, instrument};

/// Validates caller input, runs the operation against the engine and
/// normalises every failure. Engine records are returned as the engine
/// produced them.
#[derive(Clone)]
pub struct LifecycleGateway {
    engine: Arc<dyn ContainerEngine>,
}

impl LifecycleGateway {
    pub fn new(engine: Arc<dyn ContainerEngine>) -> Self {
        Self { engine }
    }

    /// List containers, optionally narrowed by a raw status token. An invalid
    /// token is rejected before the engine is contacted.
    #[instrument(skip(self))]
    pub async fn list(&self, status: Option<&str>) -> Result<Vec<ContainerSummary>> {
        let filter = StatusFilter::resolve(status)?;
        debug!(%filter, "Listing containers");
        self.engine.list_containers(filter).await.map_err(translate)
    }

    #[instrument(skip(self), fields(container_id = %id))]
    pub async fn inspect(&self, id: &ContainerId) -> Result<ContainerInspectResponse> {
        self.engine.inspect_container(id).await.map_err(translate)
    }

    #[instrument(skip(self), fields(container_id = %id))]
    pub async fn logs(&self, id: &ContainerId) -> Result<String> {
        logs::read_logs(self.engine.as_ref(), id).await
    }

    #[instrument(skip(self), fields(container_id = %id))]
    pub async fn delete(&self, id: &ContainerId) -> Result<()> {
        self.engine.remove_container(id).await.map_err(translate)
    }

    pub async fn start(&self, ids: &[ContainerId]) -> std::result::Result<(), BulkFailure> {
        self.apply(LifecycleAction::Start, ids).await
    }

    pub async fn stop(&self, ids: &[ContainerId]) -> std::result::Result<(), BulkFailure> {
        self.apply(LifecycleAction::Stop, ids).await
    }

    pub async fn kill(&self, ids: &[ContainerId]) -> std::result::Result<(), BulkFailure> {
        self.apply(LifecycleAction::Kill, ids).await
    }

    pub async fn restart(&self, ids: &[ContainerId]) -> std::result::Result<(), BulkFailure> {
        self.apply(LifecycleAction::Restart, ids).await
    }

    /// Apply `action` to `ids` in order, aborting at the first failure.
    #[instrument(skip(self, ids), fields(batch = ids.len()))]
    pub async fn apply(
        &self,
        action: LifecycleAction,
        ids: &[ContainerId],
    ) -> std::result::Result<(), BulkFailure> {
        let engine = self.engine.as_ref();
        bulk::execute(action, ids, move |id| async move {
            apply_one(engine, action, &id).await.map_err(translate)
        })
        .await
    }

    /// Check that the engine answers at all.
    pub async fn ping(&self) -> Result<()> {
        self.engine.ping().await.map_err(translate)
    }
}

async fn apply_one(
    engine: &dyn ContainerEngine,
    action: LifecycleAction,
    id: &ContainerId,
) -> EngineResult<()> {
    let grace = action.grace_period().unwrap_or_default();
    match action {
        LifecycleAction::Start => engine.start_container(id).await,
        LifecycleAction::Stop => engine.stop_container(id, grace).await,
        LifecycleAction::Kill => engine.kill_container(id).await,
        LifecycleAction::Restart => engine.restart_container(id, grace).await,
    }
}
