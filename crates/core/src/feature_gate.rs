//! Feature gates
//!
//! The runner reads gates through the [`FeatureGate`] capability it is given
//! at construction; it never owns or mutates gate state. [`StaticFeatureGate`]
//! is a fixed snapshot parsed from `Name=bool,Name=bool` strings. Plain
//! closures also implement [`FeatureGate`], which keeps tests deterministic.

use crate::errors::ConfigError;
use std::collections::BTreeMap;
use tracing::debug;

/// Honor a declared HTTPS scheme on HTTP GET hooks and default its port to 443
pub const LIFECYCLE_HANDLER_HTTPS: &str = "LifecycleHandlerHTTPS";

/// A gate known to this build and its default value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeatureSpec {
    pub name: &'static str,
    pub default: bool,
    pub description: &'static str,
}

/// Gates known to this build
pub const KNOWN_FEATURES: &[FeatureSpec] = &[FeatureSpec {
    name: LIFECYCLE_HANDLER_HTTPS,
    default: true,
    description: "Send HTTP GET lifecycle hooks with their declared scheme; empty HTTPS ports default to 443",
}];

/// Read-only feature gate query
pub trait FeatureGate: Send + Sync {
    fn enabled(&self, name: &str) -> bool;
}

impl<F> FeatureGate for F
where
    F: Fn(&str) -> bool + Send + Sync,
{
    fn enabled(&self, name: &str) -> bool {
        self(name)
    }
}

/// Immutable gate snapshot: known defaults plus explicit overrides
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StaticFeatureGate {
    overrides: BTreeMap<String, bool>,
}

impl StaticFeatureGate {
    /// Parse `Name=true,Other=false`. Empty input yields the defaults.
    ///
    /// Unknown gate names and non-boolean values are rejected.
    pub fn parse(spec: &str) -> Result<Self, ConfigError> {
        let mut gate = Self::default();
        gate.apply(spec)?;
        Ok(gate)
    }

    /// Layer `Name=bool,...` overrides on top of the current values
    pub fn apply(&mut self, spec: &str) -> Result<(), ConfigError> {
        for entry in spec.split(',').map(str::trim).filter(|e| !e.is_empty()) {
            let (name, value) = entry.split_once('=').ok_or_else(|| ConfigError::FeatureGate {
                message: format!("missing '=' in '{}', expected Name=true|false", entry),
            })?;
            let value = value.trim().parse::<bool>().map_err(|_| ConfigError::FeatureGate {
                message: format!("invalid value '{}' for feature gate '{}'", value.trim(), name),
            })?;
            self.set(name.trim(), value)?;
        }
        Ok(())
    }

    /// Override a known gate
    pub fn set(&mut self, name: &str, value: bool) -> Result<(), ConfigError> {
        if Self::spec(name).is_none() {
            return Err(ConfigError::FeatureGate {
                message: format!("unrecognized feature gate: {}", name),
            });
        }
        debug!("Feature gate {}={}", name, value);
        self.overrides.insert(name.to_string(), value);
        Ok(())
    }

    /// Builder-style [`set`](Self::set)
    pub fn with(mut self, name: &str, value: bool) -> Result<Self, ConfigError> {
        self.set(name, value)?;
        Ok(self)
    }

    /// Known gate lookup
    pub fn spec(name: &str) -> Option<&'static FeatureSpec> {
        KNOWN_FEATURES.iter().find(|spec| spec.name == name)
    }

    /// Effective value of every known gate
    pub fn effective(&self) -> Vec<(&'static FeatureSpec, bool)> {
        KNOWN_FEATURES
            .iter()
            .map(|spec| (spec, self.enabled(spec.name)))
            .collect()
    }
}

impl FeatureGate for StaticFeatureGate {
    fn enabled(&self, name: &str) -> bool {
        self.overrides
            .get(name)
            .copied()
            .or_else(|| Self::spec(name).map(|spec| spec.default))
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let gate = StaticFeatureGate::default();
        assert!(gate.enabled(LIFECYCLE_HANDLER_HTTPS));
        assert!(!gate.enabled("SomethingElse"));
    }

    #[test]
    fn test_parse_overrides() {
        let gate = StaticFeatureGate::parse("LifecycleHandlerHTTPS=false").unwrap();
        assert!(!gate.enabled(LIFECYCLE_HANDLER_HTTPS));

        let gate = StaticFeatureGate::parse(" LifecycleHandlerHTTPS = true , ").unwrap();
        assert!(gate.enabled(LIFECYCLE_HANDLER_HTTPS));

        let gate = StaticFeatureGate::parse("").unwrap();
        assert_eq!(gate, StaticFeatureGate::default());
    }

    #[test]
    fn test_parse_rejects_bad_input() {
        assert!(matches!(
            StaticFeatureGate::parse("Unknown=true"),
            Err(ConfigError::FeatureGate { .. })
        ));
        assert!(StaticFeatureGate::parse("LifecycleHandlerHTTPS").is_err());
        assert!(StaticFeatureGate::parse("LifecycleHandlerHTTPS=yes").is_err());
    }

    #[test]
    fn test_apply_layers_overrides() {
        let mut gate = StaticFeatureGate::parse("LifecycleHandlerHTTPS=false").unwrap();
        gate.apply("LifecycleHandlerHTTPS=true").unwrap();
        assert!(gate.enabled(LIFECYCLE_HANDLER_HTTPS));
        assert!(gate.apply("Bogus=false").is_err());
    }

    #[test]
    fn test_effective_lists_known_gates() {
        let gate = StaticFeatureGate::default()
            .with(LIFECYCLE_HANDLER_HTTPS, false)
            .unwrap();
        let effective = gate.effective();
        assert_eq!(effective.len(), KNOWN_FEATURES.len());
        assert_eq!(effective[0].0.name, LIFECYCLE_HANDLER_HTTPS);
        assert!(!effective[0].1);
    }

    #[test]
    fn test_closure_gate() {
        let gate = |name: &str| name == LIFECYCLE_HANDLER_HTTPS;
        assert!(FeatureGate::enabled(&gate, LIFECYCLE_HANDLER_HTTPS));
        assert!(!FeatureGate::enabled(&gate, "Other"));
    }
}
