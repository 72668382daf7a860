//! Simulator backend implementation.

use async_trait::async_trait;
use rustc_hash::FxHashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Instant;
use tracing::{debug, instrument, warn};
use uuid::Uuid;

use statevec_hal::{
    Backend, BackendAvailability, BackendConfig, BackendFactory, Capabilities, Counts,
    ExecutionResult, HalError, HalResult, Job, JobId, JobStatus, ValidationResult,
};
use statevec_ir::Circuit;
use statevec_sim::backend::parallel_available;
use statevec_sim::{BackendKind, NoiseModel, NoisySimulator, SimError, SimulatorConfig};

/// Finished jobs kept before the oldest are evicted.
pub const DEFAULT_JOB_RETENTION: usize = 1024;

/// Job data for the simulator.
struct SimJob {
    job: Job,
    result: Option<ExecutionResult>,
    /// Submission order, used for eviction.
    seq: u64,
}

/// Local simulator backend.
///
/// Each job runs the circuit once, applies the configured noise (if any)
/// and samples every shot from the final state.
pub struct SimulatorBackend {
    /// Backend configuration.
    config: BackendConfig,
    /// Engine configuration used for every job.
    sim_config: SimulatorConfig,
    /// Cached capabilities.
    capabilities: Capabilities,
    /// Submitted jobs.
    jobs: Arc<Mutex<FxHashMap<String, SimJob>>>,
    /// Finished jobs kept for `status`/`result`.
    job_retention: usize,
    next_seq: AtomicU64,
}

impl SimulatorBackend {
    /// Create a simulator backend with default engine settings.
    pub fn new() -> Self {
        Self::build(BackendConfig::new("statevector"), SimulatorConfig::default())
    }

    /// Create a simulator with a custom qubit limit.
    pub fn with_max_qubits(max_qubits: u32) -> Self {
        let sim_config = SimulatorConfig {
            max_qubits,
            ..SimulatorConfig::default()
        };
        Self::build(BackendConfig::new("statevector"), sim_config)
    }

    /// Create a simulator from a full engine configuration.
    pub fn with_config(sim_config: SimulatorConfig) -> HalResult<Self> {
        sim_config.validate().map_err(map_sim_error)?;
        Ok(Self::build(BackendConfig::new("statevector"), sim_config))
    }

    fn build(config: BackendConfig, sim_config: SimulatorConfig) -> Self {
        let mut capabilities = Capabilities::simulator(config.name.clone(), sim_config.max_qubits);
        if !sim_config.noise.is_noiseless() {
            capabilities = capabilities.with_feature("noise");
        }
        Self {
            config,
            sim_config,
            capabilities,
            jobs: Arc::new(Mutex::new(FxHashMap::default())),
            job_retention: DEFAULT_JOB_RETENTION,
            next_seq: AtomicU64::new(0),
        }
    }

    /// Keep at most `limit` finished jobs; older ones are evicted on submit.
    pub fn with_job_retention(mut self, limit: usize) -> Self {
        self.job_retention = limit;
        self
    }

    /// Drop a finished job and return its result, if it had one.
    ///
    /// Pending jobs are left in place.
    pub fn forget(&self, job_id: &JobId) -> HalResult<Option<ExecutionResult>> {
        let mut jobs = self.jobs();
        let sim_job = jobs
            .get(&job_id.0)
            .ok_or_else(|| HalError::JobNotFound(job_id.0.clone()))?;
        if !sim_job.job.status.is_terminal() {
            return Err(HalError::JobFailed(format!(
                "Job {job_id} is still {}",
                sim_job.job.status
            )));
        }
        Ok(jobs.remove(&job_id.0).and_then(|j| j.result))
    }

    /// Number of jobs currently held.
    pub fn job_count(&self) -> usize {
        self.jobs().len()
    }

    /// Evict the oldest finished jobs until at most `keep` remain.
    fn evict_finished(jobs: &mut FxHashMap<String, SimJob>, keep: usize) {
        let mut finished: Vec<_> = jobs
            .iter()
            .filter(|(_, j)| j.job.status.is_terminal())
            .map(|(id, j)| (j.seq, id.clone()))
            .collect();
        if finished.len() <= keep {
            return;
        }
        finished.sort_unstable();
        let excess = finished.len() - keep;
        for (_, id) in finished.into_iter().take(excess) {
            jobs.remove(&id);
        }
        debug!(evicted = excess, "Evicted finished jobs");
    }

    /// Engine configuration applied to every job.
    pub fn simulator_config(&self) -> &SimulatorConfig {
        &self.sim_config
    }

    fn jobs(&self) -> MutexGuard<'_, FxHashMap<String, SimJob>> {
        self.jobs.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn check_circuit(&self, circuit: &Circuit) -> Vec<String> {
        let mut reasons = Vec::new();
        if circuit.num_qubits() > self.capabilities.num_qubits as usize {
            reasons.push(format!(
                "Circuit has {} qubits but simulator only supports {}",
                circuit.num_qubits(),
                self.capabilities.num_qubits
            ));
        }
        for gate in circuit.gates() {
            if !self.capabilities.supports_gate(gate.kind()) {
                reasons.push(format!("Unsupported gate: {}", gate.name()));
            }
        }
        reasons
    }

    /// Run simulation synchronously.
    #[instrument(skip(self, circuit))]
    fn run_simulation(&self, circuit: &Circuit, shots: u32) -> Result<ExecutionResult, SimError> {
        let start = Instant::now();
        debug!(
            "Starting simulation: {} qubits, {} shots",
            circuit.num_qubits(),
            shots
        );

        let mut sim = NoisySimulator::from_config(circuit.num_qubits(), &self.sim_config)?;
        sim.run(circuit)?;
        if !sim.noise_model().is_noiseless() {
            sim.apply_noise()?;
        }
        let counts: Counts = sim.sample_counts(shots)?.into_iter().collect();

        let elapsed = start.elapsed();
        debug!("Simulation completed in {:?}", elapsed);

        Ok(ExecutionResult::new(counts, shots)
            .with_execution_time(elapsed.as_millis() as u64)
            .with_metadata(serde_json::json!({
                "backend": sim.simulator().backend_name(),
                "noise": !sim.noise_model().is_noiseless(),
            })))
    }
}

impl Default for SimulatorBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Backend for SimulatorBackend {
    fn name(&self) -> &str {
        &self.config.name
    }

    fn capabilities(&self) -> &Capabilities {
        &self.capabilities
    }

    async fn availability(&self) -> HalResult<BackendAvailability> {
        if self.sim_config.backend == BackendKind::Parallel
            && !self.sim_config.fallback_to_sequential
            && !parallel_available()
        {
            return Ok(BackendAvailability::unavailable(
                "parallel execution backend is not available on this host",
            ));
        }
        Ok(BackendAvailability::always_available())
    }

    async fn validate(&self, circuit: &Circuit) -> HalResult<ValidationResult> {
        let reasons = self.check_circuit(circuit);
        if reasons.is_empty() {
            Ok(ValidationResult::Valid)
        } else {
            Ok(ValidationResult::Invalid { reasons })
        }
    }

    #[instrument(skip(self, circuit))]
    async fn submit(&self, circuit: &Circuit, shots: u32) -> HalResult<JobId> {
        if shots == 0 || shots > self.capabilities.max_shots {
            return Err(HalError::InvalidShots(format!(
                "{shots} shots requested, allowed range is 1..={}",
                self.capabilities.max_shots
            )));
        }
        if circuit.num_qubits() > self.capabilities.num_qubits as usize {
            return Err(HalError::CircuitTooLarge(format!(
                "Circuit has {} qubits but simulator only supports {}",
                circuit.num_qubits(),
                self.capabilities.num_qubits
            )));
        }

        let job_id = JobId::new(Uuid::new_v4().to_string());
        let job = Job::new(job_id.clone(), shots).with_backend(self.config.name.clone());
        let seq = self.next_seq.fetch_add(1, Ordering::Relaxed);
        self.jobs().insert(
            job_id.0.clone(),
            SimJob {
                job,
                result: None,
                seq,
            },
        );
        debug!("Submitted job: {}", job_id);

        if let Some(sim_job) = self.jobs().get_mut(&job_id.0) {
            sim_job.job.transition(JobStatus::Running);
        }

        let outcome = self.run_simulation(circuit, shots);

        let mut jobs = self.jobs();
        if let Some(sim_job) = jobs.get_mut(&job_id.0) {
            match outcome {
                Ok(result) => {
                    sim_job.result = Some(result);
                    sim_job.job.transition(JobStatus::Completed);
                }
                Err(e) => {
                    warn!(job = %job_id, error = %e, "Simulation failed");
                    sim_job.job.transition(JobStatus::Failed(e.to_string()));
                }
            }
        }
        Self::evict_finished(&mut jobs, self.job_retention);

        Ok(job_id)
    }

    async fn status(&self, job_id: &JobId) -> HalResult<JobStatus> {
        self.jobs()
            .get(&job_id.0)
            .map(|j| j.job.status.clone())
            .ok_or_else(|| HalError::JobNotFound(job_id.0.clone()))
    }

    async fn result(&self, job_id: &JobId) -> HalResult<ExecutionResult> {
        let jobs = self.jobs();
        let sim_job = jobs
            .get(&job_id.0)
            .ok_or_else(|| HalError::JobNotFound(job_id.0.clone()))?;
        match (&sim_job.job.status, &sim_job.result) {
            (JobStatus::Completed, Some(result)) => Ok(result.clone()),
            (JobStatus::Failed(msg), _) => Err(HalError::JobFailed(msg.clone())),
            (JobStatus::Cancelled, _) => Err(HalError::JobCancelled),
            (status, _) => Err(HalError::JobFailed(format!(
                "Job {job_id} has no result yet (status: {status})"
            ))),
        }
    }

    async fn cancel(&self, job_id: &JobId) -> HalResult<()> {
        let mut jobs = self.jobs();
        let sim_job = jobs
            .get_mut(&job_id.0)
            .ok_or_else(|| HalError::JobNotFound(job_id.0.clone()))?;
        if !sim_job.job.transition(JobStatus::Cancelled) {
            debug!("Job {} already {}, cancel ignored", job_id, sim_job.job.status);
        }
        Ok(())
    }
}

impl BackendFactory for SimulatorBackend {
    /// Recognized `extra` keys: `max_qubits`, `threads`, `seed`,
    /// `backend` (`sequential`/`parallel`), `fallback_to_sequential` and
    /// `depolarizing`.
    fn from_config(config: BackendConfig) -> HalResult<Self> {
        let mut sim_config = SimulatorConfig::default();

        if let Some(max_qubits) = config.extra_u64("max_qubits")? {
            sim_config.max_qubits = u32::try_from(max_qubits)
                .map_err(|_| HalError::Configuration("'max_qubits' is too large".into()))?;
        }
        if let Some(threads) = config.extra_u64("threads")? {
            sim_config.threads = Some(threads as usize);
        }
        sim_config.seed = config.extra_u64("seed")?;
        if let Some(kind) = config.extra.get("backend").and_then(|v| v.as_str()) {
            sim_config.backend = kind.parse().map_err(map_sim_error)?;
        }
        if let Some(fallback) = config
            .extra
            .get("fallback_to_sequential")
            .and_then(serde_json::Value::as_bool)
        {
            sim_config.fallback_to_sequential = fallback;
        }
        if let Some(p) = config
            .extra
            .get("depolarizing")
            .and_then(serde_json::Value::as_f64)
        {
            sim_config.noise = NoiseModel::depolarizing(p).map_err(map_sim_error)?;
        }

        sim_config.validate().map_err(map_sim_error)?;
        Ok(Self::build(config, sim_config))
    }
}

fn map_sim_error(e: SimError) -> HalError {
    match e {
        SimError::TooManyQubits { .. } => HalError::CircuitTooLarge(e.to_string()),
        SimError::BackendUnavailable(reason) => HalError::BackendUnavailable(reason),
        SimError::Config(msg) => HalError::Configuration(msg),
        SimError::InvalidProbability { .. } => HalError::Configuration(e.to_string()),
        other => HalError::Simulation(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use statevec_ir::QubitId;

    #[tokio::test]
    async fn test_simulator_capabilities() {
        let backend = SimulatorBackend::new();
        let caps = backend.capabilities();

        assert!(caps.is_simulator);
        assert_eq!(caps.num_qubits, 24);
        assert!(!caps.has_feature("noise"));
        assert!(backend.availability().await.unwrap().is_available);
    }

    #[tokio::test]
    async fn test_simulator_bell_state() {
        let backend = SimulatorBackend::new();

        let circuit = Circuit::bell().unwrap();
        let job_id = backend.submit(&circuit, 1000).await.unwrap();

        let status = backend.status(&job_id).await.unwrap();
        assert!(status.is_success());

        let result = backend.result(&job_id).await.unwrap();
        assert_eq!(result.shots, 1000);
        assert!(result.success);

        // Bell state should produce only 00 and 11
        let counts = &result.counts;
        assert_eq!(counts.get("00") + counts.get("11"), 1000);
        assert_eq!(counts.get("01") + counts.get("10"), 0);
    }

    #[tokio::test]
    async fn test_simulator_ghz_state() {
        let backend = SimulatorBackend::new();

        let circuit = Circuit::ghz(3).unwrap();
        let job_id = backend.submit(&circuit, 1000).await.unwrap();
        let result = backend.wait(&job_id).await.unwrap();

        let counts = &result.counts;
        assert_eq!(counts.get("000") + counts.get("111"), 1000);
    }

    #[tokio::test]
    async fn test_bitstring_order() {
        let backend = SimulatorBackend::new();

        // Flip only qubit 0 of three.
        let mut circuit = Circuit::new(3).unwrap();
        circuit.add_rx(QubitId(0), std::f64::consts::PI).unwrap();
        let job_id = backend.submit(&circuit, 50).await.unwrap();

        let result = backend.result(&job_id).await.unwrap();
        assert_eq!(result.counts.get("100"), 50);
    }

    #[tokio::test]
    async fn test_simulator_too_many_qubits() {
        let backend = SimulatorBackend::with_max_qubits(5);

        let circuit = Circuit::new(10).unwrap();
        let result = backend.submit(&circuit, 100).await;
        assert!(matches!(result, Err(HalError::CircuitTooLarge(_))));

        let validation = backend.validate(&circuit).await.unwrap();
        assert!(!validation.is_valid());
    }

    #[tokio::test]
    async fn test_zero_shots_rejected() {
        let backend = SimulatorBackend::new();
        let circuit = Circuit::bell().unwrap();
        assert!(matches!(
            backend.submit(&circuit, 0).await,
            Err(HalError::InvalidShots(_))
        ));
    }

    #[tokio::test]
    async fn test_unknown_job() {
        let backend = SimulatorBackend::new();
        let missing = JobId::new("missing");
        assert!(matches!(
            backend.status(&missing).await,
            Err(HalError::JobNotFound(_))
        ));
        assert!(matches!(
            backend.cancel(&missing).await,
            Err(HalError::JobNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_cancel_completed_job_keeps_result() {
        let backend = SimulatorBackend::new();
        let job_id = backend.submit(&Circuit::bell().unwrap(), 10).await.unwrap();

        backend.cancel(&job_id).await.unwrap();
        assert_eq!(backend.status(&job_id).await.unwrap(), JobStatus::Completed);
        assert!(backend.result(&job_id).await.is_ok());
    }

    #[tokio::test]
    async fn test_full_noise_fails_job() {
        let config = BackendConfig::new("noisy")
            .with_extra("depolarizing", serde_json::json!(1.0))
            .with_extra("seed", serde_json::json!(4));
        let backend = SimulatorBackend::from_config(config).unwrap();
        assert!(backend.capabilities().has_feature("noise"));

        let job_id = backend.submit(&Circuit::bell().unwrap(), 10).await.unwrap();
        assert!(matches!(
            backend.status(&job_id).await.unwrap(),
            JobStatus::Failed(_)
        ));
        assert!(matches!(
            backend.wait(&job_id).await,
            Err(HalError::JobFailed(_))
        ));
    }

    #[tokio::test]
    async fn test_seeded_jobs_are_reproducible() {
        let config = BackendConfig::new("seeded")
            .with_extra("seed", serde_json::json!(21))
            .with_extra("depolarizing", serde_json::json!(0.2));
        let backend = SimulatorBackend::from_config(config).unwrap();
        let mut circuit = Circuit::new(4).unwrap();
        for q in 0..4 {
            circuit.add_h(QubitId(q)).unwrap();
        }

        let a = backend.submit(&circuit, 200).await.unwrap();
        let b = backend.submit(&circuit, 200).await.unwrap();
        assert_eq!(
            backend.result(&a).await.unwrap().counts,
            backend.result(&b).await.unwrap().counts
        );
    }

    #[test]
    fn test_from_config_extras() {
        let config = BackendConfig::new("custom")
            .with_extra("max_qubits", serde_json::json!(12))
            .with_extra("backend", serde_json::json!("sequential"));
        let backend = SimulatorBackend::from_config(config).unwrap();
        assert_eq!(backend.name(), "custom");
        assert_eq!(backend.capabilities().num_qubits, 12);

        let bad = BackendConfig::new("bad").with_extra("depolarizing", serde_json::json!(2.0));
        assert!(matches!(
            SimulatorBackend::from_config(bad),
            Err(HalError::Configuration(_))
        ));
    }

    #[tokio::test]
    async fn test_finished_jobs_are_evicted_past_retention() {
        let backend = SimulatorBackend::new().with_job_retention(2);
        let circuit = Circuit::bell().unwrap();

        let first = backend.submit(&circuit, 10).await.unwrap();
        let second = backend.submit(&circuit, 10).await.unwrap();
        let third = backend.submit(&circuit, 10).await.unwrap();

        assert_eq!(backend.job_count(), 2);
        assert!(matches!(
            backend.status(&first).await,
            Err(HalError::JobNotFound(_))
        ));
        assert!(backend.result(&second).await.is_ok());
        assert!(backend.result(&third).await.is_ok());
    }

    #[tokio::test]
    async fn test_forget_releases_job() {
        let backend = SimulatorBackend::new();
        let job_id = backend.submit(&Circuit::bell().unwrap(), 100).await.unwrap();

        let result = backend.forget(&job_id).unwrap().unwrap();
        assert_eq!(result.shots, 100);
        assert_eq!(backend.job_count(), 0);
        assert!(matches!(
            backend.status(&job_id).await,
            Err(HalError::JobNotFound(_))
        ));
        assert!(matches!(
            backend.forget(&job_id),
            Err(HalError::JobNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_forget_failed_job_has_no_result() {
        let config = BackendConfig::new("noisy").with_extra("depolarizing", serde_json::json!(1.0));
        let backend = SimulatorBackend::from_config(config).unwrap();
        let job_id = backend.submit(&Circuit::bell().unwrap(), 10).await.unwrap();

        assert!(matches!(
            backend.status(&job_id).await.unwrap(),
            JobStatus::Failed(_)
        ));
        assert!(backend.forget(&job_id).unwrap().is_none());
    }

    #[tokio::test]
    async fn test_strict_parallel_availability() {
        let config = SimulatorConfig {
            backend: BackendKind::Parallel,
            fallback_to_sequential: false,
            ..SimulatorConfig::default()
        };
        let backend = SimulatorBackend::with_config(config).unwrap();
        let availability = backend.availability().await.unwrap();

        assert_eq!(availability.is_available, parallel_available());
        assert_eq!(
            availability.status_message.is_some(),
            !availability.is_available
        );
    }
}
