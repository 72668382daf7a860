//! Data-parallel backend on a dedicated rayon thread pool.
//!
//! The amplitude buffer is cut into blocks whose length is a power of two
//! and at least twice the target stride. A block then contains both halves
//! of every butterfly pair that starts inside it, so each pair is owned by
//! exactly one worker and workers never share an index. `apply` runs the
//! whole gate inside `ThreadPool::install`, which returns only when every
//! block has been processed.

use num_complex::Complex64;
use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};
use statevec_ir::{Gate, GateKind};
use std::f64::consts::FRAC_1_SQRT_2;
use tracing::debug;

use super::{BackendKind, ExecutionBackend};
use crate::error::{SimError, SimResult};

/// Smallest block handed to a worker, in amplitudes.
///
/// Gates on low qubits have tiny strides; batching many pairs per block
/// keeps scheduling overhead below the arithmetic.
pub const DEFAULT_MIN_BLOCK_LEN: usize = 1 << 10;

/// Backend that applies each gate across a worker pool.
pub struct ParallelBackend {
    pool: ThreadPool,
    min_block_len: usize,
}

impl ParallelBackend {
    /// Create a parallel backend.
    ///
    /// `threads` defaults to the host's available parallelism.
    pub fn new(threads: Option<usize>) -> SimResult<Self> {
        Self::with_block_len(threads, DEFAULT_MIN_BLOCK_LEN)
    }

    /// Create a parallel backend with a custom minimum block length.
    ///
    /// `min_block_len` is rounded up to a power of two (at least 2).
    pub fn with_block_len(threads: Option<usize>, min_block_len: usize) -> SimResult<Self> {
        let min_block_len = min_block_len
            .max(2)
            .checked_next_power_of_two()
            .ok_or_else(|| {
                SimError::Config(format!("min_block_len {min_block_len} has no power-of-two block"))
            })?;
        let available = std::thread::available_parallelism().map_err(|e| {
            SimError::BackendUnavailable(format!("host reports no usable parallelism: {e}"))
        })?;
        let threads = threads.unwrap_or(available.get());
        if threads == 0 {
            return Err(SimError::BackendUnavailable(
                "worker pool needs at least one thread".into(),
            ));
        }

        let pool = ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|i| format!("statevec-worker-{i}"))
            .build()
            .map_err(|e| SimError::BackendUnavailable(format!("worker pool: {e}")))?;

        debug!(threads, min_block_len, "Parallel backend ready");

        Ok(Self {
            pool,
            min_block_len,
        })
    }

    /// Number of worker threads.
    pub fn num_threads(&self) -> usize {
        self.pool.current_num_threads()
    }

    /// Minimum block length in amplitudes.
    pub fn min_block_len(&self) -> usize {
        self.min_block_len
    }

    /// Block length for a gate whose pairs are `stride` apart.
    ///
    /// Always a power of two that divides `len` and is a multiple of
    /// `2 * stride`.
    fn block_len(&self, stride: usize, len: usize) -> usize {
        (2 * stride).max(self.min_block_len).min(len)
    }

    /// Run `update` on every pair `(i, i + stride)` with bit `stride` of `i` clear.
    fn butterfly<F>(&self, amplitudes: &mut [Complex64], stride: usize, update: F)
    where
        F: Fn(Complex64, Complex64) -> (Complex64, Complex64) + Sync,
    {
        let block_len = self.block_len(stride, amplitudes.len());
        self.pool.install(|| {
            amplitudes.par_chunks_mut(block_len).for_each(|block| {
                for pair in block.chunks_exact_mut(2 * stride) {
                    let (lo, hi) = pair.split_at_mut(stride);
                    for (a, b) in lo.iter_mut().zip(hi.iter_mut()) {
                        (*a, *b) = update(*a, *b);
                    }
                }
            });
        });
    }

    fn apply_cnot(&self, amplitudes: &mut [Complex64], control: usize, target: usize) {
        let ctrl_mask = 1 << control;
        let stride = 1 << target;
        let block_len = self.block_len(stride, amplitudes.len());
        self.pool.install(|| {
            amplitudes
                .par_chunks_mut(block_len)
                .enumerate()
                .for_each(|(block_idx, block)| {
                    let base = block_idx * block_len;
                    for (p, pair) in block.chunks_exact_mut(2 * stride).enumerate() {
                        let offset = base + p * 2 * stride;
                        let (lo, hi) = pair.split_at_mut(stride);
                        for (k, (a, b)) in lo.iter_mut().zip(hi.iter_mut()).enumerate() {
                            if (offset + k) & ctrl_mask != 0 {
                                std::mem::swap(a, b);
                            }
                        }
                    }
                });
        });
    }
}

impl std::fmt::Debug for ParallelBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ParallelBackend")
            .field("threads", &self.num_threads())
            .field("min_block_len", &self.min_block_len)
            .finish()
    }
}

impl ExecutionBackend for ParallelBackend {
    fn name(&self) -> &str {
        "parallel"
    }

    fn kind(&self) -> BackendKind {
        BackendKind::Parallel
    }

    fn apply(&self, gate: &Gate, amplitudes: &mut [Complex64]) {
        let qubits = gate.qubits();
        match gate.kind() {
            GateKind::H => {
                self.butterfly(amplitudes, qubits[0].mask(), |a, b| {
                    (FRAC_1_SQRT_2 * (a + b), FRAC_1_SQRT_2 * (a - b))
                });
            }
            GateKind::Cnot => {
                self.apply_cnot(amplitudes, qubits[0].index(), qubits[1].index());
            }
            GateKind::Rx => {
                let theta = gate.params()[0];
                let c = (theta / 2.0).cos();
                let neg_i_s = Complex64::new(0.0, -(theta / 2.0).sin());
                self.butterfly(amplitudes, qubits[0].mask(), |a, b| {
                    (c * a + neg_i_s * b, neg_i_s * a + c * b)
                });
            }
            GateKind::Measure => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::SequentialBackend;
    use crate::state::Statevector;
    use statevec_ir::QubitId;

    fn max_diff(a: &Statevector, b: &Statevector) -> f64 {
        a.amplitudes()
            .iter()
            .zip(b.amplitudes())
            .map(|(x, y)| (x - y).norm())
            .fold(0.0, f64::max)
    }

    #[test]
    fn test_zero_threads_unavailable() {
        assert!(matches!(
            ParallelBackend::new(Some(0)),
            Err(SimError::BackendUnavailable(_))
        ));
    }

    #[test]
    fn test_block_len_owns_whole_pairs() {
        let backend = ParallelBackend::with_block_len(Some(2), 4).unwrap();
        assert_eq!(backend.min_block_len(), 4);
        // stride 1 -> min block
        assert_eq!(backend.block_len(1, 64), 4);
        // stride 8 -> pair span
        assert_eq!(backend.block_len(8, 64), 16);
        // never longer than the buffer
        assert_eq!(backend.block_len(1, 2), 2);
    }

    #[test]
    fn test_oversized_block_len_is_error() {
        assert!(matches!(
            ParallelBackend::with_block_len(Some(1), usize::MAX),
            Err(SimError::Config(_))
        ));
    }

    #[test]
    fn test_block_len_rounds_to_power_of_two() {
        let backend = ParallelBackend::with_block_len(Some(1), 100).unwrap();
        assert_eq!(backend.min_block_len(), 128);
    }

    #[test]
    fn test_matches_sequential_with_small_blocks() {
        // Block length 2 forces one block per pair on qubit 0 and exercises
        // the block offset arithmetic for the CNOT control test.
        let parallel = ParallelBackend::with_block_len(Some(4), 2).unwrap();
        let gates = [
            Gate::h(QubitId(0)),
            Gate::h(QubitId(2)),
            Gate::rx(QubitId(1), 0.7),
            Gate::cnot(QubitId(2), QubitId(0)),
            Gate::cnot(QubitId(0), QubitId(3)),
            Gate::rx(QubitId(3), -1.3),
            Gate::cnot(QubitId(3), QubitId(1)),
            Gate::h(QubitId(1)),
        ];

        let mut seq = Statevector::new(4);
        let mut par = Statevector::new(4);
        for gate in &gates {
            SequentialBackend.apply(gate, seq.amplitudes_mut());
            parallel.apply(gate, par.amplitudes_mut());
        }
        assert!(max_diff(&seq, &par) < 1e-12);
    }
}
