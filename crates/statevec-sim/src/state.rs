//! Dense amplitude buffer.

use num_complex::Complex64;
use rand::Rng;

use crate::error::{SimError, SimResult};

/// A statevector representing a pure quantum state.
///
/// Index `i` is the basis state whose bit `b` is the value of qubit `b`.
#[derive(Debug, Clone, PartialEq)]
pub struct Statevector {
    /// The state amplitudes (2^n complex numbers).
    amplitudes: Vec<Complex64>,
    /// Number of qubits.
    num_qubits: usize,
}

impl Statevector {
    /// Create a new statevector initialized to |0...0⟩.
    pub fn new(num_qubits: usize) -> Self {
        let size = 1 << num_qubits;
        let mut amplitudes = vec![Complex64::new(0.0, 0.0); size];
        amplitudes[0] = Complex64::new(1.0, 0.0);
        Self {
            amplitudes,
            num_qubits,
        }
    }

    /// Get the number of qubits.
    pub fn num_qubits(&self) -> usize {
        self.num_qubits
    }

    /// Number of amplitudes (2^n).
    pub fn len(&self) -> usize {
        self.amplitudes.len()
    }

    /// Always false; a statevector holds at least one amplitude.
    pub fn is_empty(&self) -> bool {
        self.amplitudes.is_empty()
    }

    /// Borrow the amplitudes.
    pub fn amplitudes(&self) -> &[Complex64] {
        &self.amplitudes
    }

    /// Mutably borrow the amplitudes.
    pub fn amplitudes_mut(&mut self) -> &mut [Complex64] {
        &mut self.amplitudes
    }

    /// `|a_i|²` for every basis index.
    pub fn probabilities(&self) -> Vec<f64> {
        self.amplitudes.iter().map(|a| a.norm_sqr()).collect()
    }

    /// Sum of `|a_i|²`; 1 for any state reached by unitary gates only.
    pub fn norm_sqr(&self) -> f64 {
        self.amplitudes.iter().map(|a| a.norm_sqr()).sum()
    }

    /// Expectation value of Pauli-Z on `qubit`: `P(0) - P(1)`.
    pub fn expectation_z(&self, qubit: usize) -> SimResult<f64> {
        if qubit >= self.num_qubits {
            return Err(SimError::QubitOutOfRange {
                qubit: qubit as u32,
                num_qubits: self.num_qubits,
            });
        }
        let mask = 1 << qubit;
        Ok(self
            .amplitudes
            .iter()
            .enumerate()
            .map(|(i, a)| {
                let p = a.norm_sqr();
                if i & mask == 0 { p } else { -p }
            })
            .sum())
    }

    /// Sample a measurement outcome.
    ///
    /// Draws against the actual norm of the buffer, so states thinned by
    /// noise still sample in proportion to their remaining weight.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> SimResult<usize> {
        let total = self.norm_sqr();
        if total <= 0.0 {
            return Err(SimError::DegenerateState);
        }
        let r: f64 = rng.r#gen::<f64>() * total;

        let mut cumulative = 0.0;
        for (i, amp) in self.amplitudes.iter().enumerate() {
            cumulative += amp.norm_sqr();
            if r < cumulative {
                return Ok(i);
            }
        }

        // Rounding can leave `r` at the very top of the range.
        Ok(self
            .amplitudes
            .iter()
            .rposition(|a| a.norm_sqr() > 0.0)
            .unwrap_or(self.amplitudes.len() - 1))
    }

    /// Convert measurement outcome to bitstring, qubit 0 first.
    pub fn outcome_to_bitstring(&self, outcome: usize) -> String {
        index_to_bitstring(outcome, self.num_qubits)
    }
}

/// Render basis index `index` of a `num_qubits`-qubit register, qubit 0 first.
pub fn index_to_bitstring(index: usize, num_qubits: usize) -> String {
    format!("{:0width$b}", index, width = num_qubits)
        .chars()
        .rev()
        .collect()
}
