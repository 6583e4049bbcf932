//! Port resolution against a container's declared ports

use crate::container::ContainerSpec;
use crate::errors::HookError;
use crate::hook::PortSpec;
use tracing::debug;

/// Resolve a port reference to a number.
///
/// Numbers pass through unchanged. Names that parse as decimal integers are
/// used as that integer; otherwise the first declared port with that name
/// wins.
pub fn resolve_port(spec: &PortSpec, container: &ContainerSpec) -> Result<i32, HookError> {
    let name = match spec {
        PortSpec::Numeric(port) => return Ok(*port),
        PortSpec::Named(name) => name,
    };

    if let Ok(port) = name.parse::<i32>() {
        return Ok(port);
    }

    if let Some(declared) = container
        .ports
        .iter()
        .find(|port| port.name.as_deref() == Some(name.as_str()))
    {
        debug!(
            "Resolved named port '{}' to {} on container {}",
            name, declared.container_port, container.name
        );
        return Ok(declared.container_port);
    }

    Err(HookError::PortResolution {
        port: name.clone(),
        container: container.name.clone(),
    })
}
