//! Drain-to-completion log reading.

use dockgate_common::{ContainerId, Result};
use dockgate_engine::bollard::container::LogOutput;
use dockgate_engine::{translate, ContainerEngine, LogStream};
use futures::StreamExt;
use tracing::trace;

/// An open log stream. The engine connection is released when this is
/// dropped, whichever way the read ends.
struct ScopedLogStream<'a> {
    id: &'a ContainerId,
    stream: LogStream,
}

impl<'a> ScopedLogStream<'a> {
    fn open(engine: &dyn ContainerEngine, id: &'a ContainerId) -> Self {
        Self {
            id,
            stream: engine.logs(id),
        }
    }
}

impl Drop for ScopedLogStream<'_> {
    fn drop(&mut self) {
        trace!(container_id = %self.id, "Log stream released");
    }
}

/// Read the combined stdout and stderr of `id` into memory.
///
/// Any failure, including one on the very first frame, fails the whole read;
/// a partial buffer is never returned.
pub async fn read_logs(engine: &dyn ContainerEngine, id: &ContainerId) -> Result<String> {
    let mut logs = ScopedLogStream::open(engine, id);
    let mut buffer = Vec::new();

    while let Some(frame) = logs.stream.next().await {
        match frame.map_err(translate)? {
            LogOutput::StdOut { message }
            | LogOutput::StdErr { message }
            | LogOutput::Console { message } => buffer.extend_from_slice(&message),
            LogOutput::StdIn { .. } => {}
        }
    }
    drop(logs);

    Ok(String::from_utf8_lossy(&buffer).into_owned())
}
