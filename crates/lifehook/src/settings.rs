//! Host CLI settings
//!
//! Values come from, in increasing precedence: built-in defaults, the TOML
//! file given with `--config`, environment variables, command-line flags.
//!
//! ```toml
//! runtime = "podman"
//! runtime_path = "/usr/bin/podman"
//! exec_timeout_secs = 30
//! http_timeout_secs = 10
//!
//! [feature_gates]
//! LifecycleHandlerHTTPS = false
//! ```

use anyhow::{Context, Result};
use lifehook_core::errors::ConfigError;
use lifehook_core::feature_gate::StaticFeatureGate;
use lifehook_core::runtime::RuntimeKind;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;
use tracing::debug;

pub const FEATURE_GATES_ENV: &str = "LIFEHOOK_FEATURE_GATES";
pub const RUNTIME_ENV: &str = "LIFEHOOK_RUNTIME";

/// Contents of the TOML settings file
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileSettings {
    pub runtime: Option<String>,
    pub runtime_path: Option<String>,
    pub exec_timeout_secs: Option<u64>,
    pub http_timeout_secs: Option<u64>,
    #[serde(default)]
    pub feature_gates: BTreeMap<String, bool>,
}

impl FileSettings {
    /// Load the settings file, or defaults when no path is given
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        debug!("Loading settings from {}", path.display());

        if !path.exists() {
            return Err(ConfigError::NotFound {
                path: path.display().to_string(),
            }
            .into());
        }
        let content = std::fs::read_to_string(path).map_err(ConfigError::Io)?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content)
            .map_err(|e| ConfigError::Parsing {
                message: format!("TOML parsing error: {}", e),
            })
            .map_err(Into::into)
    }
}

/// Values given on the command line
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub runtime: Option<RuntimeKind>,
    pub runtime_path: Option<String>,
    pub feature_gates: Option<String>,
    pub exec_timeout_secs: Option<u64>,
    pub http_timeout_secs: Option<u64>,
}

/// Effective settings after layering
#[derive(Debug, Clone)]
pub struct Settings {
    pub runtime: RuntimeKind,
    pub runtime_path: String,
    pub feature_gate: StaticFeatureGate,
    /// Zero leaves exec hooks unbounded
    pub exec_timeout: Duration,
    pub http_timeout: Option<Duration>,
}

impl Settings {
    /// Resolve settings from the file, the process environment, and flags
    pub fn resolve(file: &FileSettings, cli: &CliOverrides) -> Result<Self> {
        Self::resolve_with_env(file, cli, |key| std::env::var(key).ok())
    }

    /// Like [`resolve`](Self::resolve) with an injectable environment lookup
    pub fn resolve_with_env(
        file: &FileSettings,
        cli: &CliOverrides,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self> {
        let file_runtime = file
            .runtime
            .as_deref()
            .map(str::parse::<RuntimeKind>)
            .transpose()
            .context("Invalid runtime in settings file")?;
        let env_runtime = env(RUNTIME_ENV)
            .map(|value| value.parse::<RuntimeKind>())
            .transpose()
            .with_context(|| format!("Invalid {}", RUNTIME_ENV))?;
        let runtime = cli
            .runtime
            .or(env_runtime)
            .or(file_runtime)
            .unwrap_or_default();

        // An explicit path only applies when the runtime was not switched by a higher layer
        let runtime_path = cli
            .runtime_path
            .clone()
            .or_else(|| {
                file.runtime_path
                    .clone()
                    .filter(|_| cli.runtime.is_none() && file_runtime.map_or(true, |r| r == runtime))
            })
            .unwrap_or_else(|| runtime.as_str().to_string());

        let mut feature_gate = StaticFeatureGate::default();
        for (name, value) in &file.feature_gates {
            feature_gate.set(name, *value)?;
        }
        if let Some(spec) = env(FEATURE_GATES_ENV) {
            feature_gate
                .apply(&spec)
                .with_context(|| format!("Invalid {}", FEATURE_GATES_ENV))?;
        }
        if let Some(spec) = &cli.feature_gates {
            feature_gate.apply(spec)?;
        }

        let exec_timeout = cli
            .exec_timeout_secs
            .or(file.exec_timeout_secs)
            .map(Duration::from_secs)
            .unwrap_or(Duration::ZERO);
        let http_timeout = cli
            .http_timeout_secs
            .or(file.http_timeout_secs)
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs);

        debug!(
            "Resolved settings: runtime={} path={} exec_timeout={:?} http_timeout={:?}",
            runtime, runtime_path, exec_timeout, http_timeout
        );

        Ok(Self {
            runtime,
            runtime_path,
            feature_gate,
            exec_timeout,
            http_timeout,
        })
    }
}
