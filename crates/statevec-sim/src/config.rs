//! Simulator configuration.
//!
//! Supports loading configuration from:
//! 1. Configuration files (YAML)
//! 2. Environment variables (with `STATEVEC_` prefix)
//!
//! Environment variables override file values, which override defaults.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::backend::BackendKind;
use crate::error::{SimError, SimResult};
use crate::noise::NoiseModel;

/// Largest register simulated unless configured otherwise (256 MiB of amplitudes).
pub const DEFAULT_MAX_QUBITS: u32 = 24;

/// Hard ceiling on `max_qubits`; 2^34 amplitudes is 256 GiB.
const MAX_QUBITS_CEILING: u32 = 34;

/// Largest useful `min_block_len`: one block spanning the largest register.
const MAX_MIN_BLOCK_LEN: u64 = 1 << MAX_QUBITS_CEILING;

/// Complete simulator configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulatorConfig {
    /// Execution backend to build.
    #[serde(default)]
    pub backend: BackendKind,

    /// Worker threads for the parallel backend (host parallelism if unset).
    #[serde(default)]
    pub threads: Option<usize>,

    /// Fall back to the sequential backend if the parallel one is unavailable.
    #[serde(default)]
    pub fallback_to_sequential: bool,

    /// Largest register the simulator will allocate.
    #[serde(default = "default_max_qubits")]
    pub max_qubits: u32,

    /// Smallest block of amplitudes handed to one parallel worker.
    #[serde(default = "default_min_block_len")]
    pub min_block_len: usize,

    /// Seed for noise and sampling RNGs (entropy if unset).
    #[serde(default)]
    pub seed: Option<u64>,

    /// Post-circuit noise channels.
    #[serde(default)]
    pub noise: NoiseModel,
}

fn default_max_qubits() -> u32 {
    DEFAULT_MAX_QUBITS
}

fn default_min_block_len() -> usize {
    1 << 10
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            backend: BackendKind::default(),
            threads: None,
            fallback_to_sequential: false,
            max_qubits: default_max_qubits(),
            min_block_len: default_min_block_len(),
            seed: None,
            noise: NoiseModel::default(),
        }
    }
}

impl SimulatorConfig {
    /// Load configuration from a YAML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> SimResult<Self> {
        let contents = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            SimError::Config(format!("{}: {e}", path.as_ref().display()))
        })?;
        Self::from_yaml_str(&contents)
    }

    /// Parse configuration from YAML text.
    pub fn from_yaml_str(yaml: &str) -> SimResult<Self> {
        let config: SimulatorConfig =
            serde_yaml_ng::from_str(yaml).map_err(|e| SimError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Apply `STATEVEC_*` environment variable overrides.
    ///
    /// - `STATEVEC_BACKEND`: `sequential` or `parallel`
    /// - `STATEVEC_THREADS`: worker thread count
    /// - `STATEVEC_SEED`: RNG seed
    pub fn apply_env(&mut self) -> SimResult<()> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary key lookup.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> SimResult<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(backend) = lookup("STATEVEC_BACKEND") {
            self.backend = backend.parse()?;
        }
        if let Some(threads) = lookup("STATEVEC_THREADS") {
            let threads = threads
                .parse()
                .map_err(|e| SimError::Config(format!("STATEVEC_THREADS: {e}")))?;
            self.threads = Some(threads);
        }
        if let Some(seed) = lookup("STATEVEC_SEED") {
            let seed = seed
                .parse()
                .map_err(|e| SimError::Config(format!("STATEVEC_SEED: {e}")))?;
            self.seed = Some(seed);
        }
        self.validate()
    }

    /// Validate configuration values.
    pub fn validate(&self) -> SimResult<()> {
        if self.max_qubits == 0 || self.max_qubits > MAX_QUBITS_CEILING {
            return Err(SimError::Config(format!(
                "max_qubits must be within 1..={MAX_QUBITS_CEILING}, got {}",
                self.max_qubits
            )));
        }
        if self.threads == Some(0) {
            return Err(SimError::Config("threads must be at least 1".into()));
        }
        if self.min_block_len == 0 || self.min_block_len as u64 > MAX_MIN_BLOCK_LEN {
            return Err(SimError::Config(format!(
                "min_block_len must be within 1..={MAX_MIN_BLOCK_LEN}, got {}",
                self.min_block_len
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::noise::NoiseKind;
    use std::collections::HashMap;

    #[test]
    fn test_defaults_from_empty_yaml() {
        let config = SimulatorConfig::from_yaml_str("{}").unwrap();
        assert_eq!(config, SimulatorConfig::default());
        assert_eq!(config.max_qubits, DEFAULT_MAX_QUBITS);
    }

    #[test]
    fn test_yaml_fields() {
        let yaml = "
backend: parallel
threads: 4
fallback_to_sequential: true
seed: 42
noise:
  depolarizing: 0.05
";
        let config = SimulatorConfig::from_yaml_str(yaml).unwrap();
        assert_eq!(config.backend, BackendKind::Parallel);
        assert_eq!(config.threads, Some(4));
        assert!(config.fallback_to_sequential);
        assert_eq!(config.seed, Some(42));
        assert_eq!(config.noise.probability(NoiseKind::Depolarizing), Some(0.05));
    }

    #[test]
    fn test_yaml_rejects_bad_probability() {
        let err = SimulatorConfig::from_yaml_str("noise:\n  depolarizing: 1.5\n").unwrap_err();
        assert!(matches!(err, SimError::Config(_)));
    }

    #[test]
    fn test_validate_max_qubits() {
        let config = SimulatorConfig {
            max_qubits: 0,
            ..SimulatorConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_overrides() {
        let vars: HashMap<&str, &str> = [
            ("STATEVEC_BACKEND", "parallel"),
            ("STATEVEC_THREADS", "3"),
            ("STATEVEC_SEED", "9"),
        ]
        .into_iter()
        .collect();

        let mut config = SimulatorConfig::default();
        config
            .apply_overrides(|key| vars.get(key).map(|v| (*v).to_string()))
            .unwrap();
        assert_eq!(config.backend, BackendKind::Parallel);
        assert_eq!(config.threads, Some(3));
        assert_eq!(config.seed, Some(9));
    }

    #[test]
    fn test_override_parse_error() {
        let mut config = SimulatorConfig::default();
        let err = config
            .apply_overrides(|key| (key == "STATEVEC_THREADS").then(|| "many".to_string()))
            .unwrap_err();
        assert!(err.to_string().contains("STATEVEC_THREADS"));
    }
}
