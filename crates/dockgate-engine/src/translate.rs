//! Mapping from raw engine failures onto the gateway error taxonomy.

use bollard::errors::Error as BollardError;
use dockgate_common::GatewayError;

/// Classify a failed engine call. Only an explicit 404 from the engine means
/// the container is unknown; everything else is an engine fault.
pub fn translate(err: BollardError) -> GatewayError {
    match err {
        BollardError::DockerResponseServerError {
            status_code: 404,
            message,
        } => GatewayError::NotFound(message),
        other => GatewayError::Engine(other.to_string()),
    }
}
