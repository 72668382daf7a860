//! Local statevector simulator as a HAL backend.
//!
//! [`SimulatorBackend`] runs each submitted circuit once on a
//! `statevec_sim` simulator, optionally applies the configured noise, and
//! samples the requested number of shots into [`statevec_hal::Counts`].
//!
//! | Qubits | Memory |
//! |--------|--------|
//! | 10 | 16 KiB |
//! | 20 | 16 MiB |
//! | 24 | 256 MiB |
//! | 30 | 16 GiB |
//!
//! # Example
//!
//! ```ignore
//! use statevec_adapter_sim::SimulatorBackend;
//! use statevec_hal::Backend;
//! use statevec_ir::Circuit;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let backend = SimulatorBackend::new();
//!     println!("Max qubits: {}", backend.capabilities().num_qubits);
//!
//!     let job_id = backend.submit(&Circuit::bell()?, 1000).await?;
//!     let result = backend.wait(&job_id).await?;
//!
//!     // Expect ~50% 00 and ~50% 11
//!     println!("Results: {:?}", result.counts);
//!     Ok(())
//! }
//! ```

mod simulator;

pub use simulator::SimulatorBackend;
