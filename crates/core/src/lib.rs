//! Core library for lifehook
//!
//! This crate runs container lifecycle hooks: exec commands inside a
//! container and HTTP GET requests against it, with legacy-compatible
//! scheme/port fallback controlled by a feature gate and diagnostics in the
//! historical message format.

pub mod compat;
pub mod container;
pub mod errors;
pub mod feature_gate;
pub mod format;
pub mod hook;
pub mod http;
pub mod logging;
pub mod manifest;
pub mod ports;
pub mod runner;
pub mod runtime;
pub mod url;

pub use container::{ContainerId, ContainerPort, ContainerSpec, PodIdentity};
pub use errors::{HookError, HookErrorKind, HookFailure};
pub use hook::{ExecAction, Handler, HookAction, HttpGetAction, HttpHeader, PortSpec, UriScheme};
pub use runner::HandlerRunner;

