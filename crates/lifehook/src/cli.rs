use crate::settings::{CliOverrides, FileSettings, Settings};
use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use lifehook_core::hook::LifecyclePhase;
use std::path::PathBuf;

/// Runtime selection options
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq)]
pub enum RuntimeOption {
    /// Docker runtime
    Docker,
    /// Podman runtime
    Podman,
}

impl From<RuntimeOption> for lifehook_core::runtime::RuntimeKind {
    fn from(runtime: RuntimeOption) -> Self {
        match runtime {
            RuntimeOption::Docker => lifehook_core::runtime::RuntimeKind::Docker,
            RuntimeOption::Podman => lifehook_core::runtime::RuntimeKind::Podman,
        }
    }
}

/// Lifecycle phase to run
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq)]
pub enum PhaseOption {
    /// Hook run right after the container starts
    PostStart,
    /// Hook run before the container is stopped
    PreStop,
}

impl From<PhaseOption> for LifecyclePhase {
    fn from(phase: PhaseOption) -> Self {
        match phase {
            PhaseOption::PostStart => LifecyclePhase::PostStart,
            PhaseOption::PreStop => LifecyclePhase::PreStop,
        }
    }
}

/// Output format options
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq)]
pub enum OutputFormat {
    /// Human-readable text format
    Text,
    /// JSON structured format
    Json,
}

/// Log format options
#[derive(Debug, Clone, ValueEnum)]
pub enum LogFormat {
    /// Human-readable text format
    Text,
    /// JSON structured format
    Json,
}

/// Log level options
#[derive(Debug, Clone, ValueEnum)]
pub enum LogLevel {
    /// Error messages only
    Error,
    /// Warning and error messages
    Warn,
    /// Informational messages and above
    Info,
    /// Debug messages and above
    Debug,
    /// All messages including trace
    Trace,
}

impl LogLevel {
    fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

/// Run container lifecycle hooks from a manifest
#[derive(Debug, Parser)]
#[command(name = "lifehook", version, about)]
pub struct Cli {
    /// Log format (text or json, defaults to text, can be set via LIFEHOOK_LOG_FORMAT env var)
    #[arg(long, global = true, value_enum)]
    pub log_format: Option<LogFormat>,

    /// Log level (defaults to LIFEHOOK_LOG, then RUST_LOG, then info)
    #[arg(long, global = true, value_enum)]
    pub log_level: Option<LogLevel>,

    /// Settings file path (TOML)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Feature gate overrides (Name=true|false, comma separated; also LIFEHOOK_FEATURE_GATES)
    #[arg(long, global = true, value_name = "GATES")]
    pub feature_gates: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Run one lifecycle hook declared in a manifest
    Run {
        /// Hook manifest (JSON or JSONC)
        #[arg(long, value_name = "PATH")]
        manifest: PathBuf,
        /// Target container as <type>://<id>
        #[arg(long, value_name = "ID")]
        container_id: String,
        /// Lifecycle phase whose handler runs
        #[arg(long, value_enum, default_value = "post-start")]
        phase: PhaseOption,
        /// Container runtime used for exec hooks (can be set via LIFEHOOK_RUNTIME env var)
        #[arg(long, value_enum)]
        runtime: Option<RuntimeOption>,
        /// Path to the container runtime executable
        #[arg(long, value_name = "PATH")]
        runtime_path: Option<String>,
        /// Exec hook timeout in seconds (0 = unbounded)
        #[arg(long, value_name = "SECS")]
        exec_timeout: Option<u64>,
        /// HTTP hook timeout in seconds (0 = unbounded)
        #[arg(long, value_name = "SECS")]
        http_timeout: Option<u64>,
        /// Output format
        #[arg(long, value_enum, default_value = "text")]
        output: OutputFormat,
    },
    /// List known feature gates and their effective values
    Gates {
        /// Output format
        #[arg(long, value_enum, default_value = "text")]
        output: OutputFormat,
    },
}

impl Cli {
    pub async fn dispatch(self) -> Result<()> {
        let log_format = match self.log_format {
            Some(LogFormat::Text) => Some("text"),
            Some(LogFormat::Json) => Some("json"),
            None => None, // Let logging module check environment variable
        };
        let log_filter = self
            .log_level
            .as_ref()
            .map(|level| format!("lifehook={0},lifehook_core={0}", level.as_str()));
        lifehook_core::logging::init(log_format, log_filter.as_deref())?;

        tracing::debug!("CLI initialized with log filter: {:?}", log_filter);

        let file_settings = FileSettings::load(self.config.as_deref())?;

        match self.command {
            Commands::Run {
                manifest,
                container_id,
                phase,
                runtime,
                runtime_path,
                exec_timeout,
                http_timeout,
                output,
            } => {
                use crate::commands::run::{execute_run, RunArgs};

                let overrides = CliOverrides {
                    runtime: runtime.map(Into::into),
                    runtime_path,
                    feature_gates: self.feature_gates,
                    exec_timeout_secs: exec_timeout,
                    http_timeout_secs: http_timeout,
                };
                let settings = Settings::resolve(&file_settings, &overrides)?;

                let args = RunArgs {
                    manifest_path: manifest,
                    container_id,
                    phase: phase.into(),
                    output,
                    settings,
                };
                execute_run(args).await
            }
            Commands::Gates { output } => {
                use crate::commands::gates::execute_gates;

                let overrides = CliOverrides {
                    feature_gates: self.feature_gates,
                    ..Default::default()
                };
                let settings = Settings::resolve(&file_settings, &overrides)?;
                execute_gates(&settings.feature_gate, output)
            }
        }
    }
}
