//! Hook manifests
//!
//! A manifest is a JSON (comments and trailing commas allowed) document
//! describing one container's hooks:
//!
//! ```jsonc
//! {
//!   "pod": { "namespace": "default", "name": "web-0", "uid": "1234", "podIP": "10.0.0.7" },
//!   "container": {
//!     "name": "app",
//!     "ports": [{ "name": "http", "containerPort": 8080 }],
//!     "lifecycle": {
//!       "postStart": { "httpGet": { "path": "/warmup", "port": "http" } },
//!       "preStop": { "exec": { "command": ["/bin/drain"] } }
//!     }
//!   }
//! }
//! ```

use crate::container::{ContainerSpec, PodIdentity};
use crate::errors::{ConfigError, LifehookError, Result};
use crate::hook::{Handler, Lifecycle, LifecyclePhase};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

/// Root of a hook manifest
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    pub pod: PodIdentity,
    pub container: ContainerManifest,
}

/// Container projection plus its declared hooks
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContainerManifest {
    #[serde(flatten)]
    pub spec: ContainerSpec,
    #[serde(default)]
    pub lifecycle: Lifecycle,
}

impl Manifest {
    /// Handler declared for `phase`, if any
    pub fn handler(&self, phase: LifecyclePhase) -> Option<&Handler> {
        self.container.lifecycle.handler(phase)
    }
}

/// Manifest loader
pub struct ManifestLoader;

impl ManifestLoader {
    /// Load and validate a manifest from a file
    pub fn load_from_path(path: &Path) -> Result<Manifest> {
        debug!("Loading hook manifest from {}", path.display());

        if !path.exists() {
            return Err(LifehookError::Config(ConfigError::NotFound {
                path: path.display().to_string(),
            }));
        }

        let content = std::fs::read_to_string(path).map_err(|e| {
            debug!("Failed to read manifest: {}", e);
            LifehookError::Config(ConfigError::Io(e))
        })?;

        let manifest = Self::load_from_str(&content)?;

        debug!(
            "Loaded manifest for container {:?} in pod {}/{}",
            manifest.container.spec.name, manifest.pod.namespace, manifest.pod.name
        );
        Ok(manifest)
    }

    /// Parse and validate manifest text
    pub fn load_from_str(content: &str) -> Result<Manifest> {
        let raw_value: serde_json::Value = json5::from_str(content).map_err(|e| {
            LifehookError::Config(ConfigError::Parsing {
                message: format!("JSON parsing error: {}", e),
            })
        })?;

        if !raw_value.is_object() {
            return Err(LifehookError::Config(ConfigError::Validation {
                message: "Hook manifest must contain a JSON object literal.".to_string(),
            }));
        }

        let manifest: Manifest = serde_json::from_value(raw_value).map_err(|e| {
            LifehookError::Config(ConfigError::Validation {
                message: format!("Deserialization error: {}", e),
            })
        })?;

        Self::validate(&manifest)?;
        Ok(manifest)
    }

    fn validate(manifest: &Manifest) -> Result<()> {
        if manifest.container.spec.name.trim().is_empty() {
            return Err(LifehookError::Config(ConfigError::Validation {
                message: "container.name must not be empty".to_string(),
            }));
        }
        if manifest.pod.name.trim().is_empty() {
            return Err(LifehookError::Config(ConfigError::Validation {
                message: "pod.name must not be empty".to_string(),
            }));
        }
        Ok(())
    }
}
