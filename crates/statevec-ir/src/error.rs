//! Error types for the IR crate.

use crate::qubit::QubitId;
use thiserror::Error;

/// Errors raised while building or validating a circuit.
///
/// All of these surface at construction time; a circuit that exists has
/// already passed every check here.
#[derive(Debug, Clone, PartialEq, Error)]
#[non_exhaustive]
pub enum IrError {
    /// Qubit index is not below the circuit's qubit count.
    #[error(
        "Qubit index {} out of range for {num_qubits}-qubit circuit{}",
        .qubit.0,
        format_gate_context(.gate_name)
    )]
    QubitOutOfRange {
        /// The offending qubit.
        qubit: QubitId,
        /// Number of qubits declared by the circuit.
        num_qubits: u32,
        /// Optional gate name for context.
        gate_name: Option<String>,
    },

    /// The same qubit appears twice in one gate.
    #[error("Duplicate qubit {} in operation{}", .qubit.0, format_gate_context(.gate_name))]
    DuplicateQubit {
        /// The duplicate qubit.
        qubit: QubitId,
        /// Optional gate name for context.
        gate_name: Option<String>,
    },

    /// Gate requires a different number of qubits.
    #[error("Gate '{gate_name}' requires {expected} qubits, got {got}")]
    QubitCountMismatch {
        /// Name of the gate.
        gate_name: String,
        /// Expected number of qubits.
        expected: usize,
        /// Actual number of qubits provided.
        got: usize,
    },

    /// Gate requires a different number of parameters.
    #[error("Gate '{gate_name}' takes {expected} parameters, got {got}")]
    ParamCountMismatch {
        /// Name of the gate.
        gate_name: String,
        /// Expected number of parameters.
        expected: usize,
        /// Actual number of parameters provided.
        got: usize,
    },

    /// Gate parameter is NaN or infinite.
    #[error("Gate '{gate_name}' has non-finite parameter {value}")]
    InvalidParameter {
        /// Name of the gate.
        gate_name: String,
        /// The rejected value.
        value: f64,
    },

    /// Circuit declared with zero qubits.
    #[error("Circuit must have at least one qubit")]
    EmptyRegister,
}

/// Helper function to format optional gate context.
#[allow(clippy::ref_option)]
fn format_gate_context(gate_name: &Option<String>) -> String {
    match gate_name {
        Some(name) => format!(" (gate: {name})"),
        None => String::new(),
    }
}

/// Result type for IR operations.
pub type IrResult<T> = Result<T, IrError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_out_of_range_message_cites_index() {
        let err = IrError::QubitOutOfRange {
            qubit: QubitId(5),
            num_qubits: 2,
            gate_name: Some("h".into()),
        };
        assert_eq!(
            err.to_string(),
            "Qubit index 5 out of range for 2-qubit circuit (gate: h)"
        );
    }

    #[test]
    fn test_duplicate_without_context() {
        let err = IrError::DuplicateQubit {
            qubit: QubitId(1),
            gate_name: None,
        };
        assert_eq!(err.to_string(), "Duplicate qubit 1 in operation");
    }
}
