//! Statevector simulation engine.
//!
//! Simulates [`statevec_ir::Circuit`]s on a dense buffer of `2^n` complex
//! amplitudes. Gates are applied in circuit order by an
//! [`ExecutionBackend`] chosen once per simulator:
//!
//! - [`SequentialBackend`]: indexed loops on the calling thread.
//! - `ParallelBackend`: the same kernels over disjoint blocks on a rayon
//!   pool (cargo feature `parallel`, on by default).
//!
//! After a run, callers read probabilities, ⟨Z⟩ expectation values or
//! sampled counts. [`NoisySimulator`] adds an explicit post-circuit noise
//! step.
//!
//! # Example
//!
//! ```
//! use statevec_ir::Circuit;
//! use statevec_sim::{SimulatorConfig, StatevectorSimulator};
//!
//! let circuit = Circuit::ghz(3).unwrap();
//! let mut sim = StatevectorSimulator::from_config(3, &SimulatorConfig::default()).unwrap();
//! sim.run(&circuit).unwrap();
//!
//! let probs = sim.probabilities().unwrap();
//! assert!((probs[0] - 0.5).abs() < 1e-12);
//! assert!((probs[7] - 0.5).abs() < 1e-12);
//! ```

pub mod backend;
pub mod config;
pub mod error;
pub mod noise;
pub mod simulator;
pub mod state;

#[cfg(feature = "parallel")]
pub use backend::ParallelBackend;
pub use backend::{BackendKind, ExecutionBackend, SequentialBackend};
pub use config::{DEFAULT_MAX_QUBITS, SimulatorConfig};
pub use error::{SimError, SimResult};
pub use noise::{NoiseKind, NoiseModel, NoisySimulator};
pub use simulator::StatevectorSimulator;
pub use state::{Statevector, index_to_bitstring};
