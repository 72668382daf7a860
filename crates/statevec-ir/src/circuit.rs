//! High-level circuit builder API.

use serde::{Deserialize, Serialize};

use crate::error::{IrError, IrResult};
use crate::gate::{Gate, GateKind};
use crate::qasm;
use crate::qubit::QubitId;

/// A quantum circuit over a fixed number of qubits.
///
/// Gates are append-only. Every builder method validates its operands
/// against the register before the gate is recorded, so a failed call
/// leaves the gate sequence untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "CircuitDocument")]
pub struct Circuit {
    /// Number of qubits in the register.
    num_qubits: u32,
    /// Gates in insertion order.
    gates: Vec<Gate>,
}

impl Circuit {
    /// Create an empty circuit over `num_qubits` qubits.
    pub fn new(num_qubits: u32) -> IrResult<Self> {
        if num_qubits == 0 {
            return Err(IrError::EmptyRegister);
        }
        Ok(Self {
            num_qubits,
            gates: vec![],
        })
    }

    /// Append a gate after validating it against this circuit's register.
    pub fn push(&mut self, gate: Gate) -> IrResult<&mut Self> {
        gate.validate(self.num_qubits)?;
        self.gates.push(gate);
        Ok(self)
    }

    // =========================================================================
    // Gates
    // =========================================================================

    /// Apply Hadamard gate.
    pub fn add_h(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.push(Gate::h(qubit))
    }

    /// Apply CNOT gate.
    pub fn add_cnot(&mut self, control: QubitId, target: QubitId) -> IrResult<&mut Self> {
        self.push(Gate::cnot(control, target))
    }

    /// Apply Rx rotation gate.
    pub fn add_rx(&mut self, qubit: QubitId, theta: f64) -> IrResult<&mut Self> {
        self.push(Gate::rx(qubit, theta))
    }

    /// Mark every qubit for measurement.
    pub fn add_measure_all(&mut self) -> IrResult<&mut Self> {
        self.push(Gate::measure((0..self.num_qubits).map(QubitId)))
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Get the number of qubits.
    pub fn num_qubits(&self) -> usize {
        self.num_qubits as usize
    }

    /// Gates in insertion order.
    pub fn gates(&self) -> &[Gate] {
        &self.gates
    }

    /// Number of gates, measurement markers included.
    pub fn len(&self) -> usize {
        self.gates.len()
    }

    /// Whether no gate has been added yet.
    pub fn is_empty(&self) -> bool {
        self.gates.is_empty()
    }

    /// Qubits named by any measurement marker, ascending and deduplicated.
    pub fn measured_qubits(&self) -> Vec<QubitId> {
        let mut qubits: Vec<_> = self
            .gates
            .iter()
            .filter(|g| g.kind() == GateKind::Measure)
            .flat_map(|g| g.qubits().iter().copied())
            .collect();
        qubits.sort_unstable();
        qubits.dedup();
        qubits
    }

    /// Render this circuit as OpenQASM 2.0 text.
    pub fn to_qasm(&self) -> String {
        qasm::emit_qasm2(self)
    }

    // =========================================================================
    // Pre-built circuits
    // =========================================================================

    /// Create a measured Bell state circuit.
    pub fn bell() -> IrResult<Self> {
        let mut circuit = Self::new(2)?;
        circuit
            .add_h(QubitId(0))?
            .add_cnot(QubitId(0), QubitId(1))?
            .add_measure_all()?;
        Ok(circuit)
    }

    /// Create a measured GHZ state circuit over `n` qubits.
    pub fn ghz(n: u32) -> IrResult<Self> {
        let mut circuit = Self::new(n)?;
        circuit.add_h(QubitId(0))?;
        for i in 0..n - 1 {
            circuit.add_cnot(QubitId(i), QubitId(i + 1))?;
        }
        circuit.add_measure_all()?;
        Ok(circuit)
    }
}

/// Wire shape of a circuit; replayed through [`Circuit::push`] on load.
#[derive(Deserialize)]
struct CircuitDocument {
    num_qubits: u32,
    #[serde(default)]
    gates: Vec<Gate>,
}

impl TryFrom<CircuitDocument> for Circuit {
    type Error = IrError;

    fn try_from(doc: CircuitDocument) -> IrResult<Self> {
        let mut circuit = Circuit::new(doc.num_qubits)?;
        for gate in doc.gates {
            circuit.push(gate)?;
        }
        Ok(circuit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    #[test]
    fn test_new_circuit() {
        let circuit = Circuit::new(3).unwrap();
        assert_eq!(circuit.num_qubits(), 3);
        assert!(circuit.is_empty());
    }

    #[test]
    fn test_zero_qubits_rejected() {
        assert_eq!(Circuit::new(0).unwrap_err(), IrError::EmptyRegister);
    }

    #[test]
    fn test_fluent_api() {
        let mut circuit = Circuit::new(2).unwrap();
        circuit
            .add_h(QubitId(0))
            .unwrap()
            .add_cnot(QubitId(0), QubitId(1))
            .unwrap()
            .add_rx(QubitId(1), PI / 2.0)
            .unwrap();

        assert_eq!(circuit.len(), 3);
        assert_eq!(circuit.gates()[1].kind(), GateKind::Cnot);
    }

    #[test]
    fn test_out_of_range_leaves_circuit_unchanged() {
        let mut circuit = Circuit::new(2).unwrap();
        circuit.add_h(QubitId(0)).unwrap();
        let before = circuit.len();

        let err = circuit.add_cnot(QubitId(0), QubitId(2)).unwrap_err();
        assert!(matches!(
            err,
            IrError::QubitOutOfRange {
                qubit: QubitId(2),
                num_qubits: 2,
                ..
            }
        ));
        assert_eq!(circuit.len(), before);
    }

    #[test]
    fn test_measured_qubits() {
        let mut circuit = Circuit::new(3).unwrap();
        assert!(circuit.measured_qubits().is_empty());
        circuit.add_measure_all().unwrap();
        assert_eq!(
            circuit.measured_qubits(),
            vec![QubitId(0), QubitId(1), QubitId(2)]
        );
    }

    #[test]
    fn test_ghz_state() {
        let circuit = Circuit::ghz(4).unwrap();
        assert_eq!(circuit.num_qubits(), 4);
        // H, three CNOTs, one measurement marker
        assert_eq!(circuit.len(), 5);
    }
}
