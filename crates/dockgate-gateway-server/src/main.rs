use anyhow::Context;
use dockgate_engine::DockerEngine;
use dockgate_gateway::LifecycleGateway;
use dockgate_gateway_server::{create_app, AppState, GatewayConfig};
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                EnvFilter::new("info,dockgate_gateway=debug,dockgate_gateway_server=debug")
            }),
        )
        .init();

    let config = GatewayConfig::from_env().context("Failed to load configuration")?;
    let engine = DockerEngine::connect(&config.engine)
        .with_context(|| format!("Failed to connect to engine at {}", config.engine.endpoint))?;
    let gateway = LifecycleGateway::new(Arc::new(engine));

    match gateway.ping().await {
        Ok(()) => info!("Engine reachable at {}", config.engine.endpoint),
        Err(e) => warn!("Engine not reachable at {}: {}", config.engine.endpoint, e),
    }

    let app = create_app(AppState::new(gateway));

    let addr = config.bind_addr();
    info!("Container gateway listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    axum::serve(listener, app).await?;

    Ok(())
}
