//! The statevector simulator.

use num_complex::Complex64;
use rand::Rng;
use statevec_ir::{Circuit, QubitId};
use std::collections::BTreeMap;
use std::time::Instant;
use tracing::{debug, instrument};

use crate::backend::{self, BackendKind, ExecutionBackend, SequentialBackend};
use crate::config::{DEFAULT_MAX_QUBITS, SimulatorConfig};
use crate::error::{SimError, SimResult};
use crate::noise::NoiseModel;
use crate::state::Statevector;

/// Lifecycle of the owned state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SimulatorState {
    /// |0...0⟩, nothing run since construction or reset.
    Idle,
    /// A circuit has been run; extraction is allowed.
    Ready,
}

/// Owns one amplitude buffer and one execution backend.
///
/// ```
/// use statevec_ir::Circuit;
/// use statevec_sim::StatevectorSimulator;
///
/// let mut sim = StatevectorSimulator::sequential(2).unwrap();
/// sim.run(&Circuit::bell().unwrap()).unwrap();
/// let probs = sim.probabilities().unwrap();
/// assert!((probs[0] - 0.5).abs() < 1e-12);
/// assert!((probs[3] - 0.5).abs() < 1e-12);
/// ```
pub struct StatevectorSimulator {
    state: Statevector,
    backend: Box<dyn ExecutionBackend>,
    status: SimulatorState,
}

impl StatevectorSimulator {
    /// Create a simulator for `num_qubits` qubits on `backend`.
    ///
    /// Registers above [`DEFAULT_MAX_QUBITS`] are rejected; use
    /// [`StatevectorSimulator::from_config`] to raise the limit.
    pub fn new(num_qubits: usize, backend: Box<dyn ExecutionBackend>) -> SimResult<Self> {
        Self::with_limit(num_qubits, backend, DEFAULT_MAX_QUBITS)
    }

    /// Create a simulator on the sequential backend.
    pub fn sequential(num_qubits: usize) -> SimResult<Self> {
        Self::new(num_qubits, Box::new(SequentialBackend::new()))
    }

    /// Create a simulator with the backend and limits from `config`.
    pub fn from_config(num_qubits: usize, config: &SimulatorConfig) -> SimResult<Self> {
        config.validate()?;
        check_size(num_qubits, config.max_qubits)?;
        let backend = backend::build(config)?;
        Self::with_limit(num_qubits, backend, config.max_qubits)
    }

    fn with_limit(
        num_qubits: usize,
        backend: Box<dyn ExecutionBackend>,
        max_qubits: u32,
    ) -> SimResult<Self> {
        check_size(num_qubits, max_qubits)?;
        debug!(num_qubits, backend = backend.name(), "Created simulator");
        Ok(Self {
            state: Statevector::new(num_qubits),
            backend,
            status: SimulatorState::Idle,
        })
    }

    /// Run `circuit` from |0...0⟩.
    ///
    /// The buffer is reinitialized first, so running the same circuit twice
    /// yields identical amplitudes.
    #[instrument(skip(self, circuit), fields(backend = self.backend.name()))]
    pub fn run(&mut self, circuit: &Circuit) -> SimResult<()> {
        let expected = self.state.num_qubits();
        if circuit.num_qubits() != expected {
            return Err(SimError::DimensionMismatch {
                expected,
                got: circuit.num_qubits(),
            });
        }

        let start = Instant::now();
        self.reinitialize();
        let amplitudes = self.state.amplitudes_mut();
        for gate in circuit.gates() {
            self.backend.apply(gate, amplitudes);
        }
        self.status = SimulatorState::Ready;

        debug!(
            gates = circuit.len(),
            elapsed = ?start.elapsed(),
            "Simulation completed"
        );
        Ok(())
    }

    /// Drop the current state and return to `Idle`.
    pub fn reset(&mut self) {
        self.state = Statevector::new(self.state.num_qubits());
        self.status = SimulatorState::Idle;
    }

    /// `|a_i|²` for every basis index.
    pub fn probabilities(&self) -> SimResult<Vec<f64>> {
        Ok(self.ready_state()?.probabilities())
    }

    /// Borrow the amplitudes of the current state.
    pub fn statevector(&self) -> SimResult<&[Complex64]> {
        Ok(self.ready_state()?.amplitudes())
    }

    /// ⟨Z⟩ on one qubit.
    pub fn expectation_z(&self, qubit: QubitId) -> SimResult<f64> {
        self.ready_state()?.expectation_z(qubit.index())
    }

    /// ⟨Z⟩ for every qubit, in qubit order.
    pub fn expectation_values(&self) -> SimResult<Vec<f64>> {
        let state = self.ready_state()?;
        (0..state.num_qubits())
            .map(|q| state.expectation_z(q))
            .collect()
    }

    /// Draw one basis index from the current state.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> SimResult<usize> {
        self.ready_state()?.sample(rng)
    }

    /// Draw `shots` outcomes and count them by bitstring (qubit 0 first).
    pub fn sample_counts<R: Rng + ?Sized>(
        &self,
        shots: u32,
        rng: &mut R,
    ) -> SimResult<BTreeMap<String, u64>> {
        let state = self.ready_state()?;
        let mut by_index: BTreeMap<usize, u64> = BTreeMap::new();
        for _ in 0..shots {
            *by_index.entry(state.sample(rng)?).or_insert(0) += 1;
        }
        Ok(by_index
            .into_iter()
            .map(|(outcome, count)| (state.outcome_to_bitstring(outcome), count))
            .collect())
    }

    /// Inject `noise` into the current state. Returns the zeroed amplitude count.
    pub fn apply_noise<R: Rng + ?Sized>(
        &mut self,
        noise: &NoiseModel,
        rng: &mut R,
    ) -> SimResult<usize> {
        if self.status != SimulatorState::Ready {
            return Err(SimError::NotReady);
        }
        Ok(noise.apply(self.state.amplitudes_mut(), rng))
    }

    /// The strategy of the owned backend.
    pub fn backend_kind(&self) -> BackendKind {
        self.backend.kind()
    }

    /// Name of the owned backend.
    pub fn backend_name(&self) -> &str {
        self.backend.name()
    }

    /// Number of simulated qubits.
    pub fn num_qubits(&self) -> usize {
        self.state.num_qubits()
    }

    /// True once a circuit has run since construction or the last reset.
    pub fn is_ready(&self) -> bool {
        self.status == SimulatorState::Ready
    }

    fn ready_state(&self) -> SimResult<&Statevector> {
        match self.status {
            SimulatorState::Ready => Ok(&self.state),
            SimulatorState::Idle => Err(SimError::NotReady),
        }
    }

    fn reinitialize(&mut self) {
        let amplitudes = self.state.amplitudes_mut();
        amplitudes.fill(Complex64::new(0.0, 0.0));
        amplitudes[0] = Complex64::new(1.0, 0.0);
    }
}

impl std::fmt::Debug for StatevectorSimulator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StatevectorSimulator")
            .field("num_qubits", &self.state.num_qubits())
            .field("backend", &self.backend.name())
            .field("status", &self.status)
            .finish()
    }
}

fn check_size(num_qubits: usize, max_qubits: u32) -> SimResult<()> {
    if num_qubits == 0 {
        return Err(SimError::InvalidQubitCount);
    }
    if num_qubits > max_qubits as usize {
        return Err(SimError::TooManyQubits {
            requested: num_qubits,
            max: max_qubits,
        });
    }
    Ok(())
}
