//! Run command: execute one lifecycle hook declared in a manifest

use crate::cli::OutputFormat;
use crate::settings::Settings;
use anyhow::{Context, Result};
use lifehook_core::container::ContainerId;
use lifehook_core::hook::LifecyclePhase;
use lifehook_core::http::{HttpDoerConfig, ReqwestDoer};
use lifehook_core::manifest::ManifestLoader;
use lifehook_core::runner::HandlerRunner;
use lifehook_core::runtime::CliExecutor;
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, instrument};

/// Arguments for the run command
#[derive(Debug, Clone)]
pub struct RunArgs {
    pub manifest_path: PathBuf,
    /// Target container as `<type>://<id>`
    pub container_id: String,
    pub phase: LifecyclePhase,
    pub output: OutputFormat,
    pub settings: Settings,
}

/// Error used to exit non-zero after a hook failure has been printed
#[derive(Debug)]
pub struct HookExitCode(pub i32);

impl std::fmt::Display for HookExitCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Exit with code {} due to lifecycle hook failure", self.0)
    }
}

impl std::error::Error for HookExitCode {}

/// JSON document printed with `--output json`
#[derive(Debug, Serialize)]
pub struct RunOutput {
    pub phase: LifecyclePhase,
    pub message: String,
    pub error: Option<String>,
    pub kind: Option<&'static str>,
    /// True when the manifest declares no handler for the phase
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub skipped: bool,
}

#[instrument(skip(args), fields(phase = %args.phase))]
pub async fn execute_run(args: RunArgs) -> Result<()> {
    let container_id: ContainerId = args
        .container_id
        .parse()
        .map_err(anyhow::Error::msg)?;
    let manifest = ManifestLoader::load_from_path(&args.manifest_path)
        .with_context(|| format!("Failed to load manifest {}", args.manifest_path.display()))?;

    let Some(handler) = manifest.handler(args.phase) else {
        info!(
            "No {} handler declared for container {:?}",
            args.phase, manifest.container.spec.name
        );
        if args.output == OutputFormat::Json {
            print_json(&RunOutput {
                phase: args.phase,
                message: String::new(),
                error: None,
                kind: None,
                skipped: true,
            })?;
        }
        return Ok(());
    };

    let settings = &args.settings;
    let http_doer = ReqwestDoer::with_config(&HttpDoerConfig {
        timeout: settings.http_timeout,
        ..Default::default()
    })?;
    let executor = CliExecutor::with_runtime_path(settings.runtime_path.clone());
    let runner = HandlerRunner::new(
        Arc::new(http_doer),
        Arc::new(executor),
        Arc::new(settings.feature_gate.clone()),
    )
    .with_exec_timeout(settings.exec_timeout);

    let result = runner
        .run(
            &container_id,
            &manifest.pod,
            &manifest.container.spec,
            handler,
        )
        .await;

    let output = match &result {
        Ok(message) => RunOutput {
            phase: args.phase,
            message: message.clone(),
            error: None,
            kind: None,
            skipped: false,
        },
        Err(failure) => RunOutput {
            phase: args.phase,
            message: failure.message.clone(),
            error: Some(failure.error.detail()),
            kind: Some(failure.kind().as_str()),
            skipped: false,
        },
    };

    match args.output {
        OutputFormat::Json => print_json(&output)?,
        OutputFormat::Text => {
            if !output.message.is_empty() {
                println!("{}", output.message.trim_end_matches('\n'));
            }
        }
    }

    match result {
        Ok(_) => Ok(()),
        Err(_) => Err(HookExitCode(1).into()),
    }
}

fn print_json(output: &RunOutput) -> Result<()> {
    println!("{}", serde_json::to_string(output)?);
    Ok(())
}
