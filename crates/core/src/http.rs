//! HTTP transport for HTTP GET hooks
//!
//! [`HttpDoer`] performs exactly one request and reports a failure only when
//! no response was obtained. Status codes are never interpreted here.

use crate::errors::{LifehookError, Result, TransportFailure};
use crate::hook::HttpHeader;
use bytes::Bytes;
use std::time::Duration;
use tracing::debug;

/// Request issued for an HTTP GET hook
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HookRequest {
    pub method: reqwest::Method,
    /// Absolute URL, passed through without re-encoding
    pub url: String,
    /// Headers in declaration order; duplicates are sent as repeated fields
    pub headers: Vec<HttpHeader>,
}

impl HookRequest {
    pub fn get(url: impl Into<String>, headers: Vec<HttpHeader>) -> Self {
        Self {
            method: reqwest::Method::GET,
            url: url.into(),
            headers,
        }
    }
}

/// Response received for a hook request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HookResponse {
    pub status: u16,
    pub body: Bytes,
}

/// Performs one HTTP request
#[async_trait::async_trait]
pub trait HttpDoer: Send + Sync {
    async fn execute(&self, request: HookRequest)
        -> std::result::Result<HookResponse, TransportFailure>;
}

/// Settings for [`ReqwestDoer`]
#[derive(Debug, Clone)]
pub struct HttpDoerConfig {
    /// Whole-request timeout; `None` leaves requests unbounded
    pub timeout: Option<Duration>,
    /// Skip certificate verification (hooks target pod-local endpoints)
    pub accept_invalid_certs: bool,
}

impl Default for HttpDoerConfig {
    fn default() -> Self {
        Self {
            timeout: None,
            accept_invalid_certs: true,
        }
    }
}

/// Default HTTP doer implementation using reqwest
#[derive(Debug, Clone)]
pub struct ReqwestDoer {
    client: reqwest::Client,
}

impl ReqwestDoer {
    /// Create a new ReqwestDoer with default configuration
    pub fn new() -> Result<Self> {
        Self::with_config(&HttpDoerConfig::default())
    }

    pub fn with_config(config: &HttpDoerConfig) -> Result<Self> {
        let mut client_builder =
            reqwest::Client::builder().danger_accept_invalid_certs(config.accept_invalid_certs);

        if let Some(timeout) = config.timeout {
            client_builder = client_builder.timeout(timeout);
            debug!("Configured hook HTTP client with timeout: {:?}", timeout);
        }

        let client = client_builder
            .build()
            .map_err(|e| LifehookError::HttpClient {
                message: e.to_string(),
            })?;
        Ok(Self { client })
    }
}

/// Record-layer error rustls reports when the peer's first bytes are not TLS,
/// as when a plaintext HTTP server answers a ClientHello.
const PLAINTEXT_REPLY_MARKER: &str = "InvalidContentType";

/// True when an HTTPS request failed because the server spoke plaintext HTTP
fn is_plaintext_reply(url: &str, err: &reqwest::Error) -> bool {
    if !url.starts_with("https://") {
        return false;
    }
    let mut cause: Option<&(dyn std::error::Error + 'static)> = Some(err);
    while let Some(current) = cause {
        if current.to_string().contains(PLAINTEXT_REPLY_MARKER) {
            return true;
        }
        cause = current.source();
    }
    false
}

#[async_trait::async_trait]
impl HttpDoer for ReqwestDoer {
    async fn execute(
        &self,
        request: HookRequest,
    ) -> std::result::Result<HookResponse, TransportFailure> {
        let mut builder = self.client.request(request.method, &request.url);
        for header in &request.headers {
            builder = builder.header(header.name.as_str(), header.value.as_str());
        }

        let response = builder.send().await.map_err(|err| {
            if is_plaintext_reply(&request.url, &err) {
                debug!("HTTPS request to {} got a plaintext reply", request.url);
                TransportFailure::new(err).with_plaintext_reply()
            } else {
                TransportFailure::new(err)
            }
        })?;
        let status = response.status().as_u16();
        debug!("Hook request to {} returned {}", request.url, status);

        let body = response.bytes().await.map_err(TransportFailure::new)?;
        Ok(HookResponse { status, body })
    }
}

pub mod mock {
    //! Mock HTTP doer for testing the HTTP GET branch without a network

    use super::*;
    use std::sync::{Arc, Mutex};

    /// Doer that records requests and replays a configured outcome
    #[derive(Debug, Clone)]
    pub struct MockDoer {
        outcome: Arc<Mutex<MockOutcome>>,
        requests: Arc<Mutex<Vec<HookRequest>>>,
    }

    #[derive(Debug, Clone)]
    enum MockOutcome {
        Response(HookResponse),
        Failure {
            error: String,
            partial_body: Option<Bytes>,
        },
        /// Plaintext-only server: `https://` requests fail as a plaintext reply
        PlaintextOnly(HookResponse),
    }

    impl MockDoer {
        /// Doer answering every request with `200` and an empty body
        pub fn new() -> Self {
            Self::with_response(200, Bytes::new())
        }

        pub fn with_response(status: u16, body: impl Into<Bytes>) -> Self {
            Self {
                outcome: Arc::new(Mutex::new(MockOutcome::Response(HookResponse {
                    status,
                    body: body.into(),
                }))),
                requests: Arc::new(Mutex::new(Vec::new())),
            }
        }

        pub fn with_failure(error: impl Into<String>, partial_body: Option<Bytes>) -> Self {
            Self {
                outcome: Arc::new(Mutex::new(MockOutcome::Failure {
                    error: error.into(),
                    partial_body,
                })),
                requests: Arc::new(Mutex::new(Vec::new())),
            }
        }

        /// Doer behaving like a plaintext-only server answering `body`
        pub fn plaintext_only(body: impl Into<Bytes>) -> Self {
            Self {
                outcome: Arc::new(Mutex::new(MockOutcome::PlaintextOnly(HookResponse {
                    status: 200,
                    body: body.into(),
                }))),
                requests: Arc::new(Mutex::new(Vec::new())),
            }
        }

        /// Requests received so far
        pub fn requests(&self) -> Vec<HookRequest> {
            self.requests.lock().unwrap().clone()
        }

        /// URL of the most recent request
        pub fn last_url(&self) -> Option<String> {
            self.requests.lock().unwrap().last().map(|r| r.url.clone())
        }
    }

    impl Default for MockDoer {
        fn default() -> Self {
            Self::new()
        }
    }

    #[async_trait::async_trait]
    impl HttpDoer for MockDoer {
        async fn execute(
            &self,
            request: HookRequest,
        ) -> std::result::Result<HookResponse, TransportFailure> {
            let https = request.url.starts_with("https://");
            self.requests.lock().unwrap().push(request);
            let outcome = self.outcome.lock().unwrap().clone();
            match outcome {
                MockOutcome::Response(response) => Ok(response),
                MockOutcome::PlaintextOnly(_) if https => Err(TransportFailure::new(
                    "received corrupt message of type InvalidContentType",
                )
                .with_plaintext_reply()),
                MockOutcome::PlaintextOnly(response) => Ok(response),
                MockOutcome::Failure {
                    error,
                    partial_body: Some(body),
                } => Err(TransportFailure::new(error).with_partial_body(body)),
                MockOutcome::Failure { error, .. } => Err(TransportFailure::new(error)),
            }
        }
    }
}
