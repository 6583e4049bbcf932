//! Lifecycle hook handler runner
//!
//! [`HandlerRunner::run`] validates a [`Handler`], dispatches it to the
//! command executor (exec hooks) or the HTTP doer (HTTP GET hooks), and turns
//! the outcome into a message plus, on failure, a classified [`HookError`].
//!
//! HTTP GET hooks go through three sequential stages before any network
//! call: scheme/default-port compatibility, port resolution, URL formatting.
//! The first failing stage aborts the hook. A received response is always a
//! success regardless of its status; only transport failures are errors.
//! When an HTTPS hook is answered in plaintext the request is repeated once
//! over HTTP on the same host, port and path, without `Authorization`.

use crate::compat::{resolve_scheme, DefaultPorts};
use crate::container::{ContainerId, ContainerSpec, PodIdentity};
use crate::errors::{HookError, HookFailure};
use crate::feature_gate::{FeatureGate, LIFECYCLE_HANDLER_HTTPS};
use crate::format::{format_command, format_pod, quote, quote_bytes};
use crate::hook::{ExecAction, Handler, HookAction, HttpGetAction, UriScheme};
use crate::http::{HookRequest, HookResponse, HttpDoer};
use crate::ports::resolve_port;
use crate::runtime::CommandExecutor;
use crate::url::format_url;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, instrument, warn};

/// Runs lifecycle hooks against a container
#[derive(Clone)]
pub struct HandlerRunner {
    http_doer: Arc<dyn HttpDoer>,
    command_executor: Arc<dyn CommandExecutor>,
    feature_gate: Arc<dyn FeatureGate>,
    /// Passed to the executor; zero means no explicit bound
    exec_timeout: Duration,
    default_ports: DefaultPorts,
}

impl std::fmt::Debug for HandlerRunner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HandlerRunner")
            .field("exec_timeout", &self.exec_timeout)
            .field("default_ports", &self.default_ports)
            .finish_non_exhaustive()
    }
}

impl HandlerRunner {
    pub fn new(
        http_doer: Arc<dyn HttpDoer>,
        command_executor: Arc<dyn CommandExecutor>,
        feature_gate: Arc<dyn FeatureGate>,
    ) -> Self {
        Self {
            http_doer,
            command_executor,
            feature_gate,
            exec_timeout: Duration::ZERO,
            default_ports: DefaultPorts::default(),
        }
    }

    pub fn with_exec_timeout(mut self, timeout: Duration) -> Self {
        self.exec_timeout = timeout;
        self
    }

    /// Override the ports used when an HTTP GET hook leaves its port empty
    pub fn with_default_ports(mut self, default_ports: DefaultPorts) -> Self {
        self.default_ports = default_ports;
        self
    }

    /// Run `handler` for `container` of `pod`.
    ///
    /// On success returns the exec output or the HTTP response body. On
    /// failure the [`HookFailure`] carries the composed diagnostic.
    #[instrument(skip_all, fields(container_id = %container_id, container = %container.name))]
    pub async fn run(
        &self,
        container_id: &ContainerId,
        pod: &PodIdentity,
        container: &ContainerSpec,
        handler: &Handler,
    ) -> Result<String, HookFailure> {
        let action = match handler.action() {
            Ok(action) => action,
            Err(err) => {
                let message = format!("Cannot run handler: {}", err);
                error!("{}", message);
                return Err(HookFailure::new(message, err));
            }
        };

        match action {
            HookAction::Exec(exec) => self.run_exec(container_id, pod, container, exec).await,
            HookAction::HttpGet(http_get) => self.run_http_get(pod, container, http_get).await,
        }
    }

    async fn run_exec(
        &self,
        container_id: &ContainerId,
        pod: &PodIdentity,
        container: &ContainerSpec,
        exec: &ExecAction,
    ) -> Result<String, HookFailure> {
        debug!("Running exec lifecycle hook: {:?}", exec.command);
        match self
            .command_executor
            .run_in_container(container_id, &exec.command, self.exec_timeout)
            .await
        {
            Ok(output) => Ok(String::from_utf8_lossy(&output).into_owned()),
            Err(failure) => {
                let error = HookError::Execution {
                    source: failure.source,
                };
                warn!(
                    command = ?exec.command,
                    "Exec lifecycle hook failed: {}", error.detail()
                );
                let message =
                    failure_message(HookAction::Exec(exec), pod, container, &error, &failure.output);
                Err(HookFailure::new(message, error))
            }
        }
    }

    async fn run_http_get(
        &self,
        pod: &PodIdentity,
        container: &ContainerSpec,
        action: &HttpGetAction,
    ) -> Result<String, HookFailure> {
        let fail = |err: HookError, body: &[u8]| {
            warn!(path = %action.path, "HTTP lifecycle hook failed: {}", err.detail());
            let message = failure_message(HookAction::HttpGet(action), pod, container, &err, body);
            HookFailure::new(message, err)
        };

        let gate_enabled = self.feature_gate.enabled(LIFECYCLE_HANDLER_HTTPS);
        let target = resolve_scheme(action.scheme, gate_enabled, self.default_ports);

        let port = if action.port.is_empty() {
            target.default_port
        } else {
            resolve_port(&action.port, container).map_err(|err| fail(err, &[][..]))?
        };

        let host = match (action.host.as_str(), pod.pod_ip.as_deref()) {
            ("", Some(pod_ip)) if !pod_ip.is_empty() => pod_ip,
            ("", _) => {
                return Err(fail(
                    HookError::InvalidHandlerSpec {
                        detail: "httpGet host is empty and the pod has no IP".to_string(),
                    },
                    &[][..],
                ))
            }
            (host, _) => host,
        };

        let url = format_url(target.scheme.as_str(), host, port, &action.path);
        debug!(
            gate_enabled,
            declared = %action.scheme,
            "Running HTTP lifecycle hook: GET {}", url
        );

        let failure = match self
            .http_doer
            .execute(HookRequest::get(url.clone(), action.http_headers.clone()))
            .await
        {
            Ok(response) => return Ok(response_body(response)),
            Err(failure) => failure,
        };

        // An HTTPS hook answered in plaintext is retried once over HTTP
        if target.scheme == UriScheme::Https && failure.plaintext_reply {
            let fallback_url = format_url(UriScheme::Http.as_str(), host, port, &action.path);
            warn!(
                "HTTPS lifecycle hook {} got an HTTP response, retrying with {}",
                url, fallback_url
            );
            let headers = action
                .http_headers
                .iter()
                .filter(|header| !header.name.eq_ignore_ascii_case("authorization"))
                .cloned()
                .collect();
            match self
                .http_doer
                .execute(HookRequest::get(fallback_url, headers))
                .await
            {
                Ok(response) => return Ok(response_body(response)),
                Err(retry) => debug!("HTTP retry of lifecycle hook failed: {}", retry),
            }
        }

        let body = failure.partial_body.unwrap_or_default();
        Err(fail(
            HookError::Transport {
                source: failure.source,
            },
            &body[..],
        ))
    }
}

fn response_body(response: HookResponse) -> String {
    debug!("HTTP lifecycle hook answered with status {}", response.status);
    String::from_utf8_lossy(&response.body).into_owned()
}

/// `<Kind> lifecycle hook (<target>) for Container "c" in Pod "p" failed - ...`
fn failure_message(
    action: HookAction<'_>,
    pod: &PodIdentity,
    container: &ContainerSpec,
    error: &HookError,
    output: &[u8],
) -> String {
    let target = match action {
        HookAction::Exec(exec) => format_command(&exec.command),
        HookAction::HttpGet(http_get) => http_get.path.clone(),
    };
    format!(
        "{} lifecycle hook ({}) for Container {} in Pod {} failed - error: {}, message: {}",
        action.kind(),
        target,
        quote(&container.name),
        quote(&format_pod(pod)),
        error.detail(),
        quote_bytes(output),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::container::ContainerPort;
    use crate::errors::HookErrorKind;
    use crate::hook::{HttpHeader, PortSpec, UriScheme};
    use crate::http::mock::MockDoer;
    use crate::runtime::mock::{MockExecResponse, MockExecutor};

    fn gate(enabled: bool) -> Arc<dyn FeatureGate> {
        Arc::new(move |_: &str| enabled)
    }

    fn runner(doer: &MockDoer, executor: &MockExecutor, gate_enabled: bool) -> HandlerRunner {
        HandlerRunner::new(
            Arc::new(doer.clone()),
            Arc::new(executor.clone()),
            gate(gate_enabled),
        )
    }

    fn pod() -> PodIdentity {
        PodIdentity::new("nsFoo", "podFoo")
    }

    fn container_id() -> ContainerId {
        ContainerId::new("test", "abc1234")
    }

    #[tokio::test]
    async fn test_exec_success_returns_output() {
        let doer = MockDoer::new();
        let executor = MockExecutor::with_response(MockExecResponse::success("total 0\n"));
        let handler = Handler::exec(ExecAction::new(["ls", "-a"]));

        let message = runner(&doer, &executor, true)
            .with_exec_timeout(Duration::from_secs(3))
            .run(&container_id(), &pod(), &ContainerSpec::new("containerFoo"), &handler)
            .await
            .unwrap();

        assert_eq!(message, "total 0\n");
        let history = executor.get_exec_history();
        assert_eq!(history[0].timeout, Duration::from_secs(3));
        assert!(doer.requests().is_empty());
    }

    #[tokio::test]
    async fn test_exec_failure_message_shape() {
        let doer = MockDoer::new();
        let executor = MockExecutor::with_response(MockExecResponse::failure(
            "invalid command",
            "invalid command",
        ));
        let handler = Handler::exec(ExecAction::new(["ls", "--a"]));

        let failure = runner(&doer, &executor, true)
            .run(&container_id(), &pod(), &ContainerSpec::new("containerFoo"), &handler)
            .await
            .unwrap_err();

        assert_eq!(failure.kind(), HookErrorKind::Execution);
        assert_eq!(
            failure.message,
            "Exec lifecycle hook ([ls --a]) for Container \"containerFoo\" in Pod \"podFoo_nsFoo()\" failed - error: invalid command, message: \"invalid command\""
        );
    }

    #[tokio::test]
    async fn test_http_path_and_headers() {
        let doer = MockDoer::new();
        let executor = MockExecutor::new();
        let handler = Handler::http_get(HttpGetAction {
            host: "foo".to_string(),
            port: PortSpec::Numeric(8080),
            path: "/bar".to_string(),
            http_headers: vec![HttpHeader::new("Foo", "bar")],
            ..Default::default()
        });

        runner(&doer, &executor, true)
            .run(&container_id(), &pod(), &ContainerSpec::new("containerFoo"), &handler)
            .await
            .unwrap();

        let requests = doer.requests();
        assert_eq!(requests[0].url, "http://foo:8080/bar");
        assert_eq!(requests[0].headers, vec![HttpHeader::new("Foo", "bar")]);
        assert!(executor.get_exec_history().is_empty());
    }

    #[tokio::test]
    async fn test_http_named_port() {
        let doer = MockDoer::new();
        let handler = Handler::http_get(HttpGetAction {
            host: "foo".to_string(),
            port: PortSpec::Named("web".to_string()),
            path: "healthz".to_string(),
            ..Default::default()
        });
        let container = ContainerSpec::new("containerFoo").with_port(ContainerPort::named("web", 9090));

        runner(&doer, &MockExecutor::new(), true)
            .run(&container_id(), &pod(), &container, &handler)
            .await
            .unwrap();
        assert_eq!(doer.last_url().as_deref(), Some("http://foo:9090/healthz"));
    }

    #[tokio::test]
    async fn test_https_default_port_follows_gate() {
        let handler = Handler::http_get(HttpGetAction {
            scheme: UriScheme::Https,
            host: "foo".to_string(),
            path: "bar".to_string(),
            ..Default::default()
        });
        let container = ContainerSpec::new("containerFoo");

        let doer = MockDoer::new();
        runner(&doer, &MockExecutor::new(), true)
            .run(&container_id(), &pod(), &container, &handler)
            .await
            .unwrap();
        assert_eq!(doer.last_url().as_deref(), Some("https://foo:443/bar"));

        let doer = MockDoer::new();
        runner(&doer, &MockExecutor::new(), false)
            .run(&container_id(), &pod(), &container, &handler)
            .await
            .unwrap();
        assert_eq!(doer.last_url().as_deref(), Some("http://foo:80/bar"));
    }

    #[tokio::test]
    async fn test_https_plaintext_reply_retries_over_http() {
        let doer = MockDoer::plaintext_only("OK http");
        let handler = Handler::http_get(HttpGetAction {
            scheme: UriScheme::Https,
            host: "foo".to_string(),
            port: PortSpec::Numeric(8443),
            path: "/bar".to_string(),
            http_headers: vec![
                HttpHeader::new("Authorization", "Bearer secret"),
                HttpHeader::new("Foo", "bar"),
            ],
        });

        let message = runner(&doer, &MockExecutor::new(), true)
            .run(&container_id(), &pod(), &ContainerSpec::new("containerFoo"), &handler)
            .await
            .unwrap();
        assert_eq!(message, "OK http");

        let requests = doer.requests();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[0].url, "https://foo:8443/bar");
        assert_eq!(requests[0].headers.len(), 2);
        assert_eq!(requests[1].url, "http://foo:8443/bar");
        assert_eq!(requests[1].headers, vec![HttpHeader::new("Foo", "bar")]);
    }

    #[tokio::test]
    async fn test_https_other_failures_are_not_retried() {
        let doer = MockDoer::with_failure("handshake failure", None);
        let handler = Handler::http_get(HttpGetAction {
            scheme: UriScheme::Https,
            host: "foo".to_string(),
            port: PortSpec::Numeric(8443),
            ..Default::default()
        });

        let failure = runner(&doer, &MockExecutor::new(), true)
            .run(&container_id(), &pod(), &ContainerSpec::new("containerFoo"), &handler)
            .await
            .unwrap_err();
        assert_eq!(failure.kind(), HookErrorKind::Transport);
        assert!(failure.message.contains("error: handshake failure"));
        assert_eq!(doer.requests().len(), 1);
    }

    #[tokio::test]
    async fn test_port_resolution_failure_skips_network() {
        let doer = MockDoer::new();
        let handler = Handler::http_get(HttpGetAction {
            host: "foo".to_string(),
            port: PortSpec::Named("missing".to_string()),
            path: "bar".to_string(),
            ..Default::default()
        });

        let failure = runner(&doer, &MockExecutor::new(), true)
            .run(&container_id(), &pod(), &ContainerSpec::new("containerFoo"), &handler)
            .await
            .unwrap_err();

        assert_eq!(failure.kind(), HookErrorKind::PortResolution);
        assert!(failure
            .message
            .starts_with("HTTP lifecycle hook (bar) for Container \"containerFoo\""));
        assert!(failure.message.ends_with("message: \"\""));
        assert!(doer.requests().is_empty());
    }

    #[tokio::test]
    async fn test_empty_host_uses_pod_ip() {
        let doer = MockDoer::new();
        let handler = Handler::http_get(HttpGetAction {
            port: PortSpec::Numeric(8080),
            path: "/ready".to_string(),
            ..Default::default()
        });
        let pod = pod().with_pod_ip("10.1.2.3");

        runner(&doer, &MockExecutor::new(), true)
            .run(&container_id(), &pod, &ContainerSpec::new("containerFoo"), &handler)
            .await
            .unwrap();
        assert_eq!(doer.last_url().as_deref(), Some("http://10.1.2.3:8080/ready"));
    }

    #[tokio::test]
    async fn test_empty_host_without_pod_ip_is_invalid() {
        let doer = MockDoer::new();
        let handler = Handler::http_get(HttpGetAction {
            port: PortSpec::Numeric(8080),
            ..Default::default()
        });

        let failure = runner(&doer, &MockExecutor::new(), true)
            .run(&container_id(), &pod(), &ContainerSpec::new("containerFoo"), &handler)
            .await
            .unwrap_err();
        assert_eq!(failure.kind(), HookErrorKind::InvalidHandlerSpec);
        assert!(doer.requests().is_empty());
    }

    #[tokio::test]
    async fn test_empty_handler_is_invalid() {
        let doer = MockDoer::new();
        let executor = MockExecutor::new();
        let failure = runner(&doer, &executor, true)
            .run(
                &container_id(),
                &pod(),
                &ContainerSpec::new("containerFoo"),
                &Handler::default(),
            )
            .await
            .unwrap_err();

        assert_eq!(failure.kind(), HookErrorKind::InvalidHandlerSpec);
        assert!(failure.message.starts_with("Cannot run handler: invalid handler"));
        assert!(doer.requests().is_empty());
        assert!(executor.get_exec_history().is_empty());
    }
}
