//! Error types for the simulation engine.

use thiserror::Error;

/// Errors produced while configuring or running a simulation.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SimError {
    /// Circuit and simulator disagree on the register size.
    #[error("Circuit has {got} qubits but simulator state holds {expected}")]
    DimensionMismatch {
        /// Qubits allocated by the simulator.
        expected: usize,
        /// Qubits declared by the circuit.
        got: usize,
    },

    /// The requested execution backend cannot run on this host.
    #[error("Execution backend not available: {0}")]
    BackendUnavailable(String),

    /// Extraction or noise requested before any circuit has run.
    #[error("Simulator has not run a circuit since construction or reset")]
    NotReady,

    /// Simulator constructed with zero qubits.
    #[error("Simulator needs at least one qubit")]
    InvalidQubitCount,

    /// Register too large for the configured memory limit.
    #[error("{requested} qubits exceeds the configured maximum of {max}")]
    TooManyQubits {
        /// Qubits requested.
        requested: usize,
        /// Configured ceiling.
        max: u32,
    },

    /// Qubit index outside the simulated register.
    #[error("Qubit {qubit} out of range for {num_qubits}-qubit state")]
    QubitOutOfRange {
        /// The offending qubit index.
        qubit: u32,
        /// Number of simulated qubits.
        num_qubits: usize,
    },

    /// Noise probability outside `[0, 1]`.
    #[error("Noise probability for '{kind}' must be within [0, 1], got {value}")]
    InvalidProbability {
        /// Noise kind the probability was given for.
        kind: String,
        /// The rejected value.
        value: f64,
    },

    /// Sampling from a state whose amplitudes are all zero.
    #[error("Cannot sample from a state with zero norm")]
    DegenerateState,

    /// Configuration could not be read or is inconsistent.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Circuit builder returned an error.
    #[error("Circuit IR error: {0}")]
    Ir(#[from] statevec_ir::IrError),
}

/// Result type for simulation operations.
pub type SimResult<T> = Result<T, SimError>;
