//! Execution backends.
//!
//! An [`ExecutionBackend`] applies one gate to a mutable amplitude buffer.
//! The simulator holds exactly one backend, chosen at construction:
//!
//! | Backend | Strategy | Availability |
//! |---------|----------|--------------|
//! | [`SequentialBackend`] | Indexed loops on the calling thread | Always |
//! | `ParallelBackend` | Pair-owning blocks on a rayon pool | `parallel` feature + host threads |
//!
//! Both backends must agree (within floating tolerance) for every gate.
//! The sequential backend is the reference.

use num_complex::Complex64;
use serde::{Deserialize, Serialize};
use statevec_ir::Gate;
use tracing::warn;

use crate::config::SimulatorConfig;
use crate::error::{SimError, SimResult};

#[cfg(feature = "parallel")]
mod parallel;
mod sequential;

#[cfg(feature = "parallel")]
pub use parallel::{DEFAULT_MIN_BLOCK_LEN, ParallelBackend};
pub use sequential::SequentialBackend;

/// Which execution strategy a backend implements.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// Single-threaded reference loops.
    #[default]
    Sequential,
    /// Data-parallel kernel over disjoint amplitude blocks.
    Parallel,
}

impl BackendKind {
    /// Get the lowercase name of this kind.
    pub fn name(&self) -> &'static str {
        match self {
            BackendKind::Sequential => "sequential",
            BackendKind::Parallel => "parallel",
        }
    }
}

impl std::fmt::Display for BackendKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl std::str::FromStr for BackendKind {
    type Err = SimError;

    fn from_str(s: &str) -> SimResult<Self> {
        match s.to_lowercase().as_str() {
            "sequential" | "cpu" | "seq" => Ok(BackendKind::Sequential),
            "parallel" | "gpu" | "par" => Ok(BackendKind::Parallel),
            other => Err(SimError::Config(format!(
                "Unknown backend: '{other}'. Available: sequential, parallel"
            ))),
        }
    }
}

/// Strategy that applies a gate to an amplitude buffer.
///
/// # Contract
///
/// - `amplitudes.len()` is `2^n` and every operand of `gate` is below `n`.
/// - `apply` returns only once the whole gate has been applied; no work for
///   this gate may still be in flight when the next gate starts.
/// - Measurement markers leave the buffer untouched.
pub trait ExecutionBackend: Send + Sync {
    /// Get the name of this backend.
    fn name(&self) -> &str;

    /// The strategy this backend implements.
    fn kind(&self) -> BackendKind;

    /// Apply `gate` to `amplitudes` in place.
    fn apply(&self, gate: &Gate, amplitudes: &mut [Complex64]);
}

/// Whether a parallel backend can be built on this host.
pub fn parallel_available() -> bool {
    cfg!(feature = "parallel") && std::thread::available_parallelism().is_ok()
}

/// Build the backend a configuration asks for.
///
/// When the parallel backend is unavailable and the configuration allows
/// it, falls back to the sequential backend with a warning; otherwise the
/// [`SimError::BackendUnavailable`] is returned to the caller.
pub fn build(config: &SimulatorConfig) -> SimResult<Box<dyn ExecutionBackend>> {
    match config.backend {
        BackendKind::Sequential => Ok(Box::new(SequentialBackend::new())),
        BackendKind::Parallel => match build_parallel(config) {
            Ok(backend) => Ok(backend),
            Err(SimError::BackendUnavailable(reason)) if config.fallback_to_sequential => {
                warn!(
                    %reason,
                    "Parallel backend unavailable, falling back to sequential"
                );
                Ok(Box::new(SequentialBackend::new()))
            }
            Err(e) => Err(e),
        },
    }
}

#[cfg(feature = "parallel")]
fn build_parallel(config: &SimulatorConfig) -> SimResult<Box<dyn ExecutionBackend>> {
    Ok(Box::new(ParallelBackend::with_block_len(
        config.threads,
        config.min_block_len,
    )?))
}

#[cfg(not(feature = "parallel"))]
fn build_parallel(_config: &SimulatorConfig) -> SimResult<Box<dyn ExecutionBackend>> {
    Err(SimError::BackendUnavailable(
        "statevec-sim was built without the `parallel` feature".into(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_from_str() {
        assert_eq!(
            "Sequential".parse::<BackendKind>().unwrap(),
            BackendKind::Sequential
        );
        assert_eq!("gpu".parse::<BackendKind>().unwrap(), BackendKind::Parallel);
        assert!("tpu".parse::<BackendKind>().is_err());
    }

    #[test]
    fn test_build_sequential() {
        let config = SimulatorConfig::default();
        let backend = build(&config).unwrap();
        assert_eq!(backend.kind(), BackendKind::Sequential);
    }

    #[cfg(feature = "parallel")]
    #[test]
    fn test_build_parallel() {
        let config = SimulatorConfig {
            backend: BackendKind::Parallel,
            threads: Some(2),
            ..SimulatorConfig::default()
        };
        let backend = build(&config).unwrap();
        assert_eq!(backend.kind(), BackendKind::Parallel);
    }

    #[cfg(feature = "parallel")]
    #[test]
    fn test_unavailable_without_fallback_is_error() {
        let config = SimulatorConfig {
            backend: BackendKind::Parallel,
            threads: Some(0),
            fallback_to_sequential: false,
            ..SimulatorConfig::default()
        };
        assert!(matches!(
            build(&config),
            Err(SimError::BackendUnavailable(_))
        ));
    }

    #[cfg(feature = "parallel")]
    #[test]
    fn test_unavailable_with_fallback_is_sequential() {
        let config = SimulatorConfig {
            backend: BackendKind::Parallel,
            threads: Some(0),
            fallback_to_sequential: true,
            ..SimulatorConfig::default()
        };
        let backend = build(&config).unwrap();
        assert_eq!(backend.kind(), BackendKind::Sequential);
    }
}
