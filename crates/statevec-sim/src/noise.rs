//! Post-circuit noise injection.
//!
//! The only channel is a stochastic proxy for decoherence: after a circuit
//! has run, every amplitude is independently zeroed with probability `p`.
//! The state is not renormalized afterwards, so the norm drops below one.
//! Noise is never applied by `run`; callers request it explicitly.

use num_complex::Complex64;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use statevec_ir::Circuit;
use std::collections::BTreeMap;
use tracing::debug;

use crate::config::SimulatorConfig;
use crate::error::{SimError, SimResult};
use crate::simulator::StatevectorSimulator;

/// A kind of noise the model can inject.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[non_exhaustive]
pub enum NoiseKind {
    /// Zero each amplitude with probability `p`.
    Depolarizing,
}

impl NoiseKind {
    /// Get a human-readable name for this noise kind.
    pub fn name(&self) -> &'static str {
        match self {
            NoiseKind::Depolarizing => "depolarizing",
        }
    }
}

impl std::fmt::Display for NoiseKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Mapping from noise kind to its probability.
///
/// Serialized as a plain map, e.g. `{ depolarizing: 0.01 }`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(
    try_from = "BTreeMap<NoiseKind, f64>",
    into = "BTreeMap<NoiseKind, f64>"
)]
pub struct NoiseModel {
    channels: BTreeMap<NoiseKind, f64>,
}

impl NoiseModel {
    /// A model with no channels.
    pub fn new() -> Self {
        Self::default()
    }

    /// A model with a single depolarizing channel.
    pub fn depolarizing(p: f64) -> SimResult<Self> {
        Self::new().with(NoiseKind::Depolarizing, p)
    }

    /// Add or replace the probability for `kind`.
    pub fn with(mut self, kind: NoiseKind, p: f64) -> SimResult<Self> {
        if !(0.0..=1.0).contains(&p) {
            return Err(SimError::InvalidProbability {
                kind: kind.name().to_string(),
                value: p,
            });
        }
        self.channels.insert(kind, p);
        Ok(self)
    }

    /// Probability configured for `kind`, if any.
    pub fn probability(&self, kind: NoiseKind) -> Option<f64> {
        self.channels.get(&kind).copied()
    }

    /// True when no channel can change the state.
    pub fn is_noiseless(&self) -> bool {
        self.channels.values().all(|&p| p == 0.0)
    }

    /// Configured channels in kind order.
    pub fn channels(&self) -> impl Iterator<Item = (NoiseKind, f64)> + '_ {
        self.channels.iter().map(|(&k, &p)| (k, p))
    }

    /// Apply every channel to `amplitudes`, one Bernoulli trial per
    /// amplitude per channel. Returns how many amplitudes were zeroed.
    pub fn apply<R: Rng + ?Sized>(&self, amplitudes: &mut [Complex64], rng: &mut R) -> usize {
        let mut zeroed = 0;
        for (kind, p) in self.channels() {
            match kind {
                NoiseKind::Depolarizing => {
                    for amp in amplitudes.iter_mut() {
                        if rng.gen_bool(p) {
                            *amp = Complex64::new(0.0, 0.0);
                            zeroed += 1;
                        }
                    }
                }
            }
        }
        zeroed
    }
}

impl TryFrom<BTreeMap<NoiseKind, f64>> for NoiseModel {
    type Error = SimError;

    fn try_from(channels: BTreeMap<NoiseKind, f64>) -> SimResult<Self> {
        channels
            .into_iter()
            .try_fold(NoiseModel::new(), |model, (kind, p)| model.with(kind, p))
    }
}

impl From<NoiseModel> for BTreeMap<NoiseKind, f64> {
    fn from(model: NoiseModel) -> Self {
        model.channels
    }
}

/// A simulator paired with a noise model and its own RNG.
///
/// `run` behaves exactly like [`StatevectorSimulator::run`]; noise is only
/// injected when [`NoisySimulator::apply_noise`] is called.
pub struct NoisySimulator {
    simulator: StatevectorSimulator,
    noise: NoiseModel,
    rng: StdRng,
}

impl NoisySimulator {
    /// Wrap `simulator` with an entropy-seeded RNG.
    pub fn new(simulator: StatevectorSimulator, noise: NoiseModel) -> Self {
        Self {
            simulator,
            noise,
            rng: StdRng::from_entropy(),
        }
    }

    /// Wrap `simulator` with a seeded RNG for reproducible noise.
    pub fn with_seed(simulator: StatevectorSimulator, noise: NoiseModel, seed: u64) -> Self {
        Self {
            simulator,
            noise,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Build simulator, noise model and RNG seed from configuration.
    pub fn from_config(num_qubits: usize, config: &SimulatorConfig) -> SimResult<Self> {
        let simulator = StatevectorSimulator::from_config(num_qubits, config)?;
        let noise = config.noise.clone();
        Ok(match config.seed {
            Some(seed) => Self::with_seed(simulator, noise, seed),
            None => Self::new(simulator, noise),
        })
    }

    /// Run `circuit` from |0...0⟩ without noise.
    pub fn run(&mut self, circuit: &Circuit) -> SimResult<()> {
        self.simulator.run(circuit)
    }

    /// Inject the configured noise into the current state.
    ///
    /// Returns how many amplitudes were zeroed.
    pub fn apply_noise(&mut self) -> SimResult<usize> {
        let zeroed = self.simulator.apply_noise(&self.noise, &mut self.rng)?;
        debug!(zeroed, "Applied noise");
        Ok(zeroed)
    }

    /// Probabilities of the current state.
    pub fn probabilities(&self) -> SimResult<Vec<f64>> {
        self.simulator.probabilities()
    }

    /// ⟨Z⟩ for every qubit of the current state.
    pub fn expectation_values(&self) -> SimResult<Vec<f64>> {
        self.simulator.expectation_values()
    }

    /// Sample `shots` outcomes with this simulator's RNG.
    pub fn sample_counts(&mut self, shots: u32) -> SimResult<BTreeMap<String, u64>> {
        self.simulator.sample_counts(shots, &mut self.rng)
    }

    /// The noise model.
    pub fn noise_model(&self) -> &NoiseModel {
        &self.noise
    }

    /// The wrapped simulator.
    pub fn simulator(&self) -> &StatevectorSimulator {
        &self.simulator
    }

    /// Mutable access to the wrapped simulator.
    pub fn simulator_mut(&mut self) -> &mut StatevectorSimulator {
        &mut self.simulator
    }

    /// Unwrap into the inner simulator.
    pub fn into_inner(self) -> StatevectorSimulator {
        self.simulator
    }
}
