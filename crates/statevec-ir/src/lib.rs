//! Statevec Circuit Model
//!
//! This crate provides the circuit description consumed by the statevec
//! simulation engine: validated gate sequences over a fixed qubit register,
//! plus export to OpenQASM 2.0.
//!
//! # Core Components
//!
//! - **Qubits**: [`QubitId`] addresses bit `b` of a basis-state index
//! - **Gates**: [`Gate`] with a [`GateKind`] of H, CNOT, RX or MEASURE
//! - **Circuit**: [`Circuit`] append-only builder with fail-fast validation
//! - **QASM**: [`qasm::emit_qasm2`] renders a circuit as OpenQASM 2.0 text
//!
//! # Example: Building a Bell State
//!
//! ```rust
//! use statevec_ir::{Circuit, QubitId};
//!
//! let mut circuit = Circuit::new(2).unwrap();
//! circuit.add_h(QubitId(0)).unwrap();
//! circuit.add_cnot(QubitId(0), QubitId(1)).unwrap();
//! circuit.add_measure_all().unwrap();
//!
//! assert_eq!(circuit.len(), 3);
//! assert!(circuit.to_qasm().contains("cnot q[0],q[1];"));
//! ```
//!
//! # Supported Gates
//!
//! | Gate | Qubits | Params | Description |
//! |------|--------|--------|-------------|
//! | `H` | 1 | 0 | Hadamard gate |
//! | `CNOT` | 2 | 0 | Controlled-NOT, `[control, target]` |
//! | `RX` | 1 | 1 | Rotation about X by θ |
//! | `MEASURE` | all | 0 | Measurement marker (no effect on amplitudes) |

pub mod circuit;
pub mod error;
pub mod gate;
pub mod qasm;
pub mod qubit;

pub use circuit::Circuit;
pub use error::{IrError, IrResult};
pub use gate::{Gate, GateKind};
pub use qubit::QubitId;
