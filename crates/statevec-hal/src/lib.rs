//! Statevec Hardware Abstraction Layer
//!
//! A common async interface for anything that executes circuits and returns
//! measurement counts: the local simulator today, remote executors later.
//!
//! - [`Backend`] trait for job submission and management
//! - [`Capabilities`] to describe what a backend accepts
//! - [`ExecutionResult`] and [`Counts`] for results
//!
//! # Example
//!
//! ```ignore
//! use statevec_hal::Backend;
//! use statevec_adapter_sim::SimulatorBackend;
//! use statevec_ir::Circuit;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let backend = SimulatorBackend::new();
//!     let job_id = backend.submit(&Circuit::bell()?, 1000).await?;
//!     let result = backend.wait(&job_id).await?;
//!
//!     if let Some((bitstring, count)) = result.counts.most_frequent() {
//!         println!("Most frequent: {bitstring} ({count} times)");
//!     }
//!     Ok(())
//! }
//! ```

pub mod backend;
pub mod capability;
pub mod error;
pub mod job;
pub mod result;

pub use backend::{Backend, BackendAvailability, BackendConfig, BackendFactory, ValidationResult};
pub use capability::Capabilities;
pub use error::{HalError, HalResult};
pub use job::{Job, JobId, JobStatus};
pub use result::{Counts, ExecutionResult};
