//! Gates command: list known feature gates

use crate::cli::OutputFormat;
use anyhow::Result;
use lifehook_core::feature_gate::StaticFeatureGate;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct GateEntry {
    pub name: &'static str,
    pub default: bool,
    pub enabled: bool,
    pub description: &'static str,
}

pub fn gate_entries(gate: &StaticFeatureGate) -> Vec<GateEntry> {
    gate.effective()
        .into_iter()
        .map(|(spec, enabled)| GateEntry {
            name: spec.name,
            default: spec.default,
            enabled,
            description: spec.description,
        })
        .collect()
}

pub fn execute_gates(gate: &StaticFeatureGate, output: OutputFormat) -> Result<()> {
    let entries = gate_entries(gate);
    match output {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&entries)?),
        OutputFormat::Text => {
            for entry in &entries {
                println!(
                    "{}={} (default: {})\n    {}",
                    entry.name, entry.enabled, entry.default, entry.description
                );
            }
        }
    }
    Ok(())
}
