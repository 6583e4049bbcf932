//! Error types and handling
//!
//! Hook execution failures are classified by [`HookError`] and paired with the
//! composed diagnostic message in [`HookFailure`]. Ambient failures (manifest
//! loading, configuration, feature gate parsing) use [`ConfigError`]. Both are
//! wrapped in [`LifehookError`] for callers that want a single error type.

use thiserror::Error;

/// Boxed error used at collaborator seams (runtime exec, HTTP transport)
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Classification of a failed lifecycle hook
#[derive(Error, Debug)]
pub enum HookError {
    /// Neither (or both) of exec/httpGet populated, or no usable target
    #[error("invalid handler: {detail}")]
    InvalidHandlerSpec { detail: String },

    /// Named port absent from the container's declared ports
    #[error("couldn't find port: {port} in container {container:?}")]
    PortResolution { port: String, container: String },

    /// Command-execution collaborator returned a failure
    #[error("{source}")]
    Execution {
        #[source]
        source: BoxError,
    },

    /// HTTP collaborator returned a failure
    #[error("{source}")]
    Transport {
        #[source]
        source: BoxError,
    },
}

impl HookError {
    /// Stable kind tag for this error
    pub fn kind(&self) -> HookErrorKind {
        match self {
            Self::InvalidHandlerSpec { .. } => HookErrorKind::InvalidHandlerSpec,
            Self::PortResolution { .. } => HookErrorKind::PortResolution,
            Self::Execution { .. } => HookErrorKind::Execution,
            Self::Transport { .. } => HookErrorKind::Transport,
        }
    }

    /// Text embedded in hook diagnostics.
    ///
    /// Collaborator failures render their whole cause chain, so a refused
    /// connection and a TLS handshake failure read differently.
    pub fn detail(&self) -> String {
        match self {
            Self::Execution { source } | Self::Transport { source } => {
                error_chain(&**source)
            }
            other => other.to_string(),
        }
    }
}

/// Render `err` followed by each of its causes, joined with `": "`.
///
/// A cause whose text already ends the rendering is skipped.
pub fn error_chain(err: &(dyn std::error::Error + 'static)) -> String {
    let mut rendered = err.to_string();
    let mut cause = err.source();
    while let Some(current) = cause {
        let text = current.to_string();
        if !text.is_empty() && !rendered.ends_with(&text) {
            rendered.push_str(": ");
            rendered.push_str(&text);
        }
        cause = current.source();
    }
    rendered
}

/// Copyable tag mirroring the [`HookError`] variants
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookErrorKind {
    InvalidHandlerSpec,
    PortResolution,
    Execution,
    Transport,
}

impl HookErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InvalidHandlerSpec => "InvalidHandlerSpec",
            Self::PortResolution => "PortResolutionError",
            Self::Execution => "ExecutionError",
            Self::Transport => "TransportError",
        }
    }
}

impl std::fmt::Display for HookErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A failed hook run: the human-readable diagnostic plus its classified cause.
///
/// `Display` renders the diagnostic; `source()` yields the [`HookError`].
#[derive(Error, Debug)]
#[error("{message}")]
pub struct HookFailure {
    /// Composed diagnostic, suitable for surfacing as a container event
    pub message: String,
    /// Classified cause
    #[source]
    pub error: HookError,
}

impl HookFailure {
    pub fn new(message: impl Into<String>, error: HookError) -> Self {
        Self {
            message: message.into(),
            error,
        }
    }

    pub fn kind(&self) -> HookErrorKind {
        self.error.kind()
    }
}

/// Failure reported by a [`crate::runtime::CommandExecutor`].
///
/// Carries whatever output the command produced before failing.
#[derive(Error, Debug)]
#[error("{source}")]
pub struct CommandFailure {
    /// Combined output captured before the failure (may be empty)
    pub output: Vec<u8>,
    #[source]
    pub source: BoxError,
}

impl CommandFailure {
    pub fn new(output: impl Into<Vec<u8>>, source: impl Into<BoxError>) -> Self {
        Self {
            output: output.into(),
            source: source.into(),
        }
    }
}

/// Failure reported by a [`crate::http::HttpDoer`].
#[derive(Error, Debug)]
#[error("{source}")]
pub struct TransportFailure {
    /// Any body bytes received before the failure
    pub partial_body: Option<bytes::Bytes>,
    /// An HTTPS request was answered with plaintext HTTP
    pub plaintext_reply: bool,
    #[source]
    pub source: BoxError,
}

impl TransportFailure {
    pub fn new(source: impl Into<BoxError>) -> Self {
        Self {
            partial_body: None,
            plaintext_reply: false,
            source: source.into(),
        }
    }

    pub fn with_partial_body(mut self, body: bytes::Bytes) -> Self {
        self.partial_body = Some(body);
        self
    }

    pub fn with_plaintext_reply(mut self) -> Self {
        self.plaintext_reply = true;
        self
    }
}

/// Configuration-related errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Manifest or settings file parsing error
    #[error("Failed to parse configuration file: {message}")]
    Parsing { message: String },

    /// Manifest or settings validation error
    #[error("Configuration validation error: {message}")]
    Validation { message: String },

    /// Feature gate specification error
    #[error("Invalid feature gate specification: {message}")]
    FeatureGate { message: String },

    /// Configuration file I/O error
    #[error("Failed to read configuration file")]
    Io(#[from] std::io::Error),

    /// Configuration file not found
    #[error("Configuration file not found: {path}")]
    NotFound { path: String },
}

/// Main error enum wrapping all domain-specific errors
#[derive(Error, Debug)]
pub enum LifehookError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Hook execution errors
    #[error("Hook error: {0}")]
    Hook(#[from] HookError),

    /// HTTP client construction errors
    #[error("HTTP client error: {message}")]
    HttpClient { message: String },

    /// Container runtime errors
    #[error("Runtime error: {0}")]
    Runtime(String),
}

/// Convenience type alias for Results with LifehookError
pub type Result<T> = std::result::Result<T, LifehookError>;
