//! Reference backend: direct indexed loops on the calling thread.

use num_complex::Complex64;
use statevec_ir::{Gate, GateKind};
use std::f64::consts::FRAC_1_SQRT_2;

use super::{BackendKind, ExecutionBackend};

/// Single-threaded backend with ground-truth semantics.
///
/// Each kernel walks every index `i` whose target bit is clear and pairs it
/// with `j = i | mask`, so every pair is touched exactly once.
#[derive(Debug, Clone, Copy, Default)]
pub struct SequentialBackend;

impl SequentialBackend {
    /// Create a sequential backend.
    pub fn new() -> Self {
        Self
    }
}

impl ExecutionBackend for SequentialBackend {
    fn name(&self) -> &str {
        "sequential"
    }

    fn kind(&self) -> BackendKind {
        BackendKind::Sequential
    }

    fn apply(&self, gate: &Gate, amplitudes: &mut [Complex64]) {
        let qubits = gate.qubits();
        match gate.kind() {
            GateKind::H => apply_h(amplitudes, qubits[0].index()),
            GateKind::Cnot => apply_cnot(amplitudes, qubits[0].index(), qubits[1].index()),
            GateKind::Rx => apply_rx(amplitudes, qubits[0].index(), gate.params()[0]),
            GateKind::Measure => {}
        }
    }
}

fn apply_h(amplitudes: &mut [Complex64], qubit: usize) {
    let mask = 1 << qubit;
    for i in 0..amplitudes.len() {
        if i & mask == 0 {
            let j = i | mask;
            let a = amplitudes[i];
            let b = amplitudes[j];
            amplitudes[i] = FRAC_1_SQRT_2 * (a + b);
            amplitudes[j] = FRAC_1_SQRT_2 * (a - b);
        }
    }
}

fn apply_cnot(amplitudes: &mut [Complex64], control: usize, target: usize) {
    let ctrl_mask = 1 << control;
    let tgt_mask = 1 << target;
    for i in 0..amplitudes.len() {
        if (i & ctrl_mask != 0) && (i & tgt_mask == 0) {
            let j = i | tgt_mask;
            amplitudes.swap(i, j);
        }
    }
}

fn apply_rx(amplitudes: &mut [Complex64], qubit: usize, theta: f64) {
    let mask = 1 << qubit;
    let c = (theta / 2.0).cos();
    let s = (theta / 2.0).sin();
    let neg_i_s = Complex64::new(0.0, -s);
    for i in 0..amplitudes.len() {
        if i & mask == 0 {
            let j = i | mask;
            let a = amplitudes[i];
            let b = amplitudes[j];
            amplitudes[i] = c * a + neg_i_s * b;
            amplitudes[j] = neg_i_s * a + c * b;
        }
    }
}
