//! Engine configuration.

use crate::errors::ProvisionError;
use crate::policy::{PropagationPolicy, StabilizationPolicy};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;

/// Overrides the number of propagation cycles.
pub const ENV_PROPAGATION_CYCLES: &str = "PROVISIONFLOW_PROPAGATION_CYCLES";
/// Overrides the propagation delay.
pub const ENV_PROPAGATION_DELAY_SECONDS: &str = "PROVISIONFLOW_PROPAGATION_DELAY_SECONDS";
/// Overrides the stabilization attempt bound.
pub const ENV_STABILIZATION_MAX_ATTEMPTS: &str = "PROVISIONFLOW_STABILIZATION_MAX_ATTEMPTS";
/// Overrides the stabilization delay.
pub const ENV_STABILIZATION_DELAY_SECONDS: &str = "PROVISIONFLOW_STABILIZATION_DELAY_SECONDS";
/// Overrides the delay before retrying a transient conflict.
pub const ENV_CONFLICT_RETRY_DELAY_SECONDS: &str = "PROVISIONFLOW_CONFLICT_RETRY_DELAY_SECONDS";

/// Tunables shared by every resource pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EngineConfig {
    /// Forced delay after creation.
    #[serde(default)]
    pub propagation: PropagationPolicy,
    /// Convergence checks after mutation.
    #[serde(default)]
    pub stabilization: StabilizationPolicy,
    /// Delay before retrying a transient conflict, in seconds.
    #[serde(default = "default_conflict_retry_delay")]
    pub conflict_retry_delay_seconds: u32,
}

fn default_conflict_retry_delay() -> u32 {
    20
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            propagation: PropagationPolicy::default(),
            stabilization: StabilizationPolicy::default(),
            conflict_retry_delay_seconds: default_conflict_retry_delay(),
        }
    }
}

impl EngineConfig {
    /// Parses a JSON document. Missing fields take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self, ProvisionError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads a JSON file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ProvisionError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|err| {
            ProvisionError::config(format!("cannot read {}: {err}", path.display()))
        })?;
        Self::from_json_str(&contents)
    }

    /// Defaults overridden from the process environment.
    pub fn from_env() -> Result<Self, ProvisionError> {
        Self::default().apply_overrides(|key| std::env::var(key).ok())
    }

    /// Applies overrides looked up by variable name.
    pub fn apply_overrides<F>(mut self, lookup: F) -> Result<Self, ProvisionError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = parse_override(&lookup, ENV_PROPAGATION_CYCLES)? {
            self.propagation.cycles = v;
        }
        if let Some(v) = parse_override(&lookup, ENV_PROPAGATION_DELAY_SECONDS)? {
            self.propagation.delay_seconds = v;
        }
        if let Some(v) = parse_override(&lookup, ENV_STABILIZATION_MAX_ATTEMPTS)? {
            self.stabilization.max_attempts = v;
        }
        if let Some(v) = parse_override(&lookup, ENV_STABILIZATION_DELAY_SECONDS)? {
            self.stabilization.delay_seconds = v;
        }
        if let Some(v) = parse_override(&lookup, ENV_CONFLICT_RETRY_DELAY_SECONDS)? {
            self.conflict_retry_delay_seconds = v;
        }
        self.validate()?;
        Ok(self)
    }

    /// Rejects settings that would produce invalid envelopes.
    pub fn validate(&self) -> Result<(), ProvisionError> {
        let delays = [
            ("propagation.delaySeconds", self.propagation.delay_seconds),
            ("stabilization.delaySeconds", self.stabilization.delay_seconds),
            ("conflictRetryDelaySeconds", self.conflict_retry_delay_seconds),
        ];
        for (field, value) in delays {
            if value == 0 {
                return Err(ProvisionError::config(format!("{field} must be positive")));
            }
        }
        Ok(())
    }
}

fn parse_override<F, T>(lookup: &F, key: &str) -> Result<Option<T>, ProvisionError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|err| ProvisionError::config(format!("{key}={raw}: {err}"))),
    }
}
