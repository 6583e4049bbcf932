//! Logging
//!
//! Structured logging through tracing-subscriber, either human-readable text
//! or JSON, selected at runtime. All output goes to stderr so stdout stays
//! reserved for hook messages.
//!
//! ## Environment Variables
//!
//! * `LIFEHOOK_LOG_FORMAT` - `json` for JSON lines, anything else for text
//! * `LIFEHOOK_LOG` - filter directive (e.g. `debug`, `lifehook_core=trace`)
//! * `RUST_LOG` - fallback filter when `LIFEHOOK_LOG` is unset

use anyhow::Result;
use std::{io, sync::Once};
use tracing_subscriber::fmt::{self, format::FmtSpan};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const FORMAT_ENV: &str = "LIFEHOOK_LOG_FORMAT";
const FILTER_ENV: &str = "LIFEHOOK_LOG";

static INIT: Once = Once::new();

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    /// `explicit` wins over `LIFEHOOK_LOG_FORMAT`; unknown names mean text
    fn select(explicit: Option<&str>) -> Self {
        let from_env = std::env::var(FORMAT_ENV).ok();
        match explicit.or(from_env.as_deref()) {
            Some("json") => OutputFormat::Json,
            _ => OutputFormat::Text,
        }
    }

    /// JSON output records when each hook span opens and closes
    fn span_events(self) -> FmtSpan {
        match self {
            OutputFormat::Json => FmtSpan::NEW | FmtSpan::CLOSE,
            OutputFormat::Text => FmtSpan::NONE,
        }
    }
}

/// Initialize logging. Later calls are no-ops.
///
/// `format` wins over `LIFEHOOK_LOG_FORMAT`; `level` wins over the filter
/// environment variables.
///
/// ```rust
/// use lifehook_core::logging;
///
/// logging::init(Some("json"), None).expect("Failed to initialize logging");
/// ```
pub fn init(format: Option<&str>, level: Option<&str>) -> Result<()> {
    let mut result = Ok(());
    INIT.call_once(|| {
        result = install(OutputFormat::select(format), create_env_filter(level));
    });
    result
}

fn install(format: OutputFormat, filter: EnvFilter) -> Result<()> {
    let layer = fmt::layer()
        .with_target(true)
        .with_span_events(format.span_events())
        .with_writer(io::stderr);
    let registry = tracing_subscriber::registry().with(filter);

    match format {
        OutputFormat::Json => registry.with(layer.json()).try_init()?,
        OutputFormat::Text => registry.with(layer).try_init()?,
    }

    tracing::debug!("Logging initialized with format: {:?}", format);
    Ok(())
}

fn create_env_filter(level: Option<&str>) -> EnvFilter {
    if let Some(level) = level {
        return EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("info"));
    }

    match std::env::var(FILTER_ENV) {
        Ok(spec) => EnvFilter::try_new(&spec).unwrap_or_else(|_| {
            eprintln!("Invalid {} specification '{}', using 'info'", FILTER_ENV, spec);
            EnvFilter::new("info")
        }),
        Err(_) => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    }
}

/// Check if logging has been initialized
pub fn is_initialized() -> bool {
    INIT.is_completed()
}
