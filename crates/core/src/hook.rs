//! Lifecycle hook declarations
//!
//! [`Handler`] is the declarative wire shape of a hook: two optional actions,
//! of which exactly one must be present. [`Handler::action`] validates that
//! and yields the closed [`HookAction`] the runner dispatches on.

use crate::errors::HookError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Port reference: a number, or a name declared on the container.
///
/// `Named("")` is the empty specification, which selects the scheme's
/// default port. Numbers are never range-checked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PortSpec {
    Numeric(i32),
    Named(String),
}

impl PortSpec {
    /// True for the empty named specification
    pub fn is_empty(&self) -> bool {
        matches!(self, PortSpec::Named(name) if name.is_empty())
    }
}

impl Default for PortSpec {
    fn default() -> Self {
        PortSpec::Named(String::new())
    }
}

impl fmt::Display for PortSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PortSpec::Numeric(port) => write!(f, "{}", port),
            PortSpec::Named(name) => f.write_str(name),
        }
    }
}

/// Scheme declared on an HTTP GET hook
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum UriScheme {
    #[default]
    #[serde(rename = "HTTP")]
    Http,
    #[serde(rename = "HTTPS")]
    Https,
}

impl UriScheme {
    /// Lowercase form used in URLs
    pub fn as_str(&self) -> &'static str {
        match self {
            UriScheme::Http => "http",
            UriScheme::Https => "https",
        }
    }
}

impl fmt::Display for UriScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Header sent with an HTTP GET hook; order and duplicates are preserved
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HttpHeader {
    pub name: String,
    pub value: String,
}

impl HttpHeader {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Command run inside the container
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecAction {
    #[serde(default)]
    pub command: Vec<String>,
}

impl ExecAction {
    pub fn new<I, S>(command: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            command: command.into_iter().map(Into::into).collect(),
        }
    }
}

/// HTTP GET request issued against the container
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HttpGetAction {
    /// Target host; empty means the pod IP
    #[serde(default)]
    pub host: String,
    #[serde(default)]
    pub port: PortSpec,
    #[serde(default)]
    pub path: String,
    #[serde(default)]
    pub scheme: UriScheme,
    #[serde(default)]
    pub http_headers: Vec<HttpHeader>,
}

/// Declarative hook: exactly one of `exec` / `http_get` must be set
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Handler {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exec: Option<ExecAction>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub http_get: Option<HttpGetAction>,
}

impl Handler {
    pub fn exec(action: ExecAction) -> Self {
        Self {
            exec: Some(action),
            http_get: None,
        }
    }

    pub fn http_get(action: HttpGetAction) -> Self {
        Self {
            exec: None,
            http_get: Some(action),
        }
    }

    /// Validate the handler and select its single action
    pub fn action(&self) -> Result<HookAction<'_>, HookError> {
        match (&self.exec, &self.http_get) {
            (Some(exec), None) => Ok(HookAction::Exec(exec)),
            (None, Some(http_get)) => Ok(HookAction::HttpGet(http_get)),
            _ => Err(HookError::InvalidHandlerSpec {
                detail: format!("{:?}", self),
            }),
        }
    }
}

/// The validated action of a [`Handler`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookAction<'a> {
    Exec(&'a ExecAction),
    HttpGet(&'a HttpGetAction),
}

impl HookAction<'_> {
    /// Hook kind as used in diagnostics
    pub fn kind(&self) -> &'static str {
        match self {
            HookAction::Exec(_) => "Exec",
            HookAction::HttpGet(_) => "HTTP",
        }
    }
}

/// Container lifecycle transition points
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LifecyclePhase {
    PostStart,
    PreStop,
}

impl LifecyclePhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            LifecyclePhase::PostStart => "postStart",
            LifecyclePhase::PreStop => "preStop",
        }
    }
}

impl fmt::Display for LifecyclePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Hooks declared for a container
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Lifecycle {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub post_start: Option<Handler>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pre_stop: Option<Handler>,
}

impl Lifecycle {
    pub fn handler(&self, phase: LifecyclePhase) -> Option<&Handler> {
        match phase {
            LifecyclePhase::PostStart => self.post_start.as_ref(),
            LifecyclePhase::PreStop => self.pre_stop.as_ref(),
        }
    }
}
