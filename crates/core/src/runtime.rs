//! Container runtime command execution
//!
//! [`CommandExecutor`] is the seam the hook runner uses to run a command in a
//! container. [`CliExecutor`] implements it by shelling out to a
//! Docker-compatible CLI (`docker exec` / `podman exec`).

use crate::container::ContainerId;
use crate::errors::{CommandFailure, LifehookError};
use std::process::Stdio;
use std::time::Duration;
use tracing::{debug, instrument};

/// Runs a command inside an addressed container
#[async_trait::async_trait]
pub trait CommandExecutor: Send + Sync {
    /// Run `command` in the container and return its combined output.
    ///
    /// A zero `timeout` means no bound is enforced here.
    async fn run_in_container(
        &self,
        container_id: &ContainerId,
        command: &[String],
        timeout: Duration,
    ) -> Result<Vec<u8>, CommandFailure>;
}

/// Runtime selection options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RuntimeKind {
    /// Docker runtime
    #[default]
    Docker,
    /// Podman runtime
    Podman,
}

impl RuntimeKind {
    /// Get string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Docker => "docker",
            Self::Podman => "podman",
        }
    }
}

impl std::str::FromStr for RuntimeKind {
    type Err = LifehookError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "docker" => Ok(Self::Docker),
            "podman" => Ok(Self::Podman),
            _ => Err(LifehookError::Runtime(format!(
                "Unknown runtime: {}. Supported runtimes: docker, podman",
                s
            ))),
        }
    }
}

impl std::fmt::Display for RuntimeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// CLI-based executor for Docker-compatible runtimes
#[derive(Debug, Clone)]
pub struct CliExecutor {
    /// Container runtime CLI binary path (e.g., "docker" or "podman")
    runtime_path: String,
}

impl CliExecutor {
    /// Create an executor with a custom runtime binary path
    pub fn with_runtime_path(runtime_path: String) -> Self {
        Self { runtime_path }
    }
}

#[async_trait::async_trait]
impl CommandExecutor for CliExecutor {
    #[instrument(skip(self, command), fields(container = %container_id))]
    async fn run_in_container(
        &self,
        container_id: &ContainerId,
        command: &[String],
        timeout: Duration,
    ) -> Result<Vec<u8>, CommandFailure> {
        debug!(
            "Executing in container via {}: {:?}",
            self.runtime_path, command
        );

        let mut exec = tokio::process::Command::new(&self.runtime_path);
        exec.arg("exec")
            .arg(&container_id.id)
            .args(command)
            .stdin(Stdio::null())
            .kill_on_drop(true);

        let output = if timeout.is_zero() {
            exec.output().await
        } else {
            match tokio::time::timeout(timeout, exec.output()).await {
                Ok(result) => result,
                Err(_) => {
                    return Err(CommandFailure::new(
                        Vec::new(),
                        format!("command timed out after {:?}", timeout),
                    ))
                }
            }
        }
        .map_err(|e| {
            CommandFailure::new(
                Vec::new(),
                format!("failed to execute {} exec: {}", self.runtime_path, e),
            )
        })?;

        let mut combined = output.stdout;
        combined.extend_from_slice(&output.stderr);

        if output.status.success() {
            return Ok(combined);
        }

        let code = output
            .status
            .code()
            .map(|c| c.to_string())
            .unwrap_or_else(|| "signal".to_string());
        debug!("Runtime exec exited with {}", code);
        Err(CommandFailure::new(
            combined,
            format!("command '{}' exited with {}", command.join(" "), code),
        ))
    }
}

pub mod mock {
    //! Mock executor for testing the exec branch without a container runtime

    use super::CommandExecutor;
    use crate::container::ContainerId;
    use crate::errors::CommandFailure;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    /// Canned response returned by [`MockExecutor`]
    #[derive(Debug, Clone, Default)]
    pub struct MockExecResponse {
        /// Output returned on success, or attached to the failure
        pub output: Vec<u8>,
        /// When set, the call fails with this error text
        pub error: Option<String>,
    }

    impl MockExecResponse {
        pub fn success(output: impl Into<Vec<u8>>) -> Self {
            Self {
                output: output.into(),
                error: None,
            }
        }

        pub fn failure(error: impl Into<String>, output: impl Into<Vec<u8>>) -> Self {
            Self {
                output: output.into(),
                error: Some(error.into()),
            }
        }
    }

    /// Record of an exec call for verification in tests
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct MockExecCall {
        pub container_id: ContainerId,
        pub command: Vec<String>,
        pub timeout: Duration,
    }

    /// Executor that records calls and returns a configured response
    #[derive(Debug, Clone, Default)]
    pub struct MockExecutor {
        response: Arc<Mutex<MockExecResponse>>,
        history: Arc<Mutex<Vec<MockExecCall>>>,
    }

    impl MockExecutor {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_response(response: MockExecResponse) -> Self {
            let executor = Self::new();
            executor.set_response(response);
            executor
        }

        pub fn set_response(&self, response: MockExecResponse) {
            *self.response.lock().unwrap() = response;
        }

        /// Get history of exec calls made
        pub fn get_exec_history(&self) -> Vec<MockExecCall> {
            self.history.lock().unwrap().clone()
        }
    }

    #[async_trait::async_trait]
    impl CommandExecutor for MockExecutor {
        async fn run_in_container(
            &self,
            container_id: &ContainerId,
            command: &[String],
            timeout: Duration,
        ) -> Result<Vec<u8>, CommandFailure> {
            self.history.lock().unwrap().push(MockExecCall {
                container_id: container_id.clone(),
                command: command.to_vec(),
                timeout,
            });

            let response = self.response.lock().unwrap().clone();
            match response.error {
                Some(error) => Err(CommandFailure::new(response.output, error)),
                None => Ok(response.output),
            }
        }
    }
}
