//! Container and pod projections consumed by the hook runner
//!
//! The runner never sees the hosting platform's full pod or container objects.
//! It works from these small immutable snapshots: enough to address the exec
//! collaborator, resolve named ports, and compose diagnostic text.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Runtime-qualified container identifier, rendered as `type://id`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContainerId {
    /// Runtime type tag (e.g. "docker", "containerd")
    pub runtime_type: String,
    /// Runtime-specific container id
    pub id: String,
}

impl ContainerId {
    pub fn new(runtime_type: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            runtime_type: runtime_type.into(),
            id: id.into(),
        }
    }
}

impl fmt::Display for ContainerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}://{}", self.runtime_type, self.id)
    }
}

impl FromStr for ContainerId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once("://") {
            Some((runtime_type, id)) if !runtime_type.is_empty() && !id.is_empty() => {
                Ok(Self::new(runtime_type, id))
            }
            _ => Err(format!(
                "Invalid container ID '{}': expected <type>://<container-id>",
                s
            )),
        }
    }
}

/// Pod identity used only for diagnostics and host fallback
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PodIdentity {
    pub namespace: String,
    pub name: String,
    /// Pod UID; rendered inside parentheses in diagnostics, empty when unknown
    #[serde(default)]
    pub uid: Option<String>,
    /// Primary pod IP, used as the HTTP host when a hook leaves it empty
    #[serde(default, rename = "podIP")]
    pub pod_ip: Option<String>,
}

impl PodIdentity {
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_uid(mut self, uid: impl Into<String>) -> Self {
        self.uid = Some(uid.into());
        self
    }

    pub fn with_pod_ip(mut self, pod_ip: impl Into<String>) -> Self {
        self.pod_ip = Some(pod_ip.into());
        self
    }
}

/// A port declared on a container
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContainerPort {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub container_port: i32,
}

impl ContainerPort {
    pub fn new(container_port: i32) -> Self {
        Self {
            name: None,
            container_port,
        }
    }

    pub fn named(name: impl Into<String>, container_port: i32) -> Self {
        Self {
            name: Some(name.into()),
            container_port,
        }
    }
}

/// Container snapshot: its name and declared ports, in declaration order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContainerSpec {
    pub name: String,
    #[serde(default)]
    pub ports: Vec<ContainerPort>,
}

impl ContainerSpec {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ports: Vec::new(),
        }
    }

    pub fn with_port(mut self, port: ContainerPort) -> Self {
        self.ports.push(port);
        self
    }
}
