//! Container lifecycle gateway.
//!
//! Sits between the HTTP layer and a [`ContainerEngine`]: resolves status
//! filters, runs single and bulk operations, drains log streams and maps every
//! engine failure onto [`GatewayError`].

pub mod bulk;
pub mod gateway;
pub mod logs;

pub use bulk::{BulkFailure, LifecycleAction, STOP_GRACE_PERIOD};
pub use dockgate_common::{ContainerId, ErrorKind, GatewayError, Result, StatusFilter};
pub use dockgate_engine::ContainerEngine;
pub use gateway::LifecycleGateway;
