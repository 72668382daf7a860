//! Gate descriptions.
//!
//! A [`Gate`] is an immutable record of one operation: what it is, which
//! qubits it touches, and its real parameters. Gates carry no amplitude
//! math; execution backends in `statevec-sim` interpret them.

use serde::{Deserialize, Serialize};

use crate::error::{IrError, IrResult};
use crate::qubit::QubitId;

/// The operations a circuit can contain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GateKind {
    /// Hadamard gate.
    H,
    /// Controlled-NOT gate, operands `[control, target]`.
    Cnot,
    /// Rotation around the X axis by one angle parameter.
    Rx,
    /// Measurement marker over a set of qubits.
    Measure,
}

impl GateKind {
    /// Get the lowercase name of this gate, as used in QASM output.
    #[inline]
    pub fn name(&self) -> &'static str {
        match self {
            GateKind::H => "h",
            GateKind::Cnot => "cnot",
            GateKind::Rx => "rx",
            GateKind::Measure => "measure",
        }
    }

    /// Number of qubit operands, or `None` when the gate spans a variable set.
    #[inline]
    pub fn num_qubits(&self) -> Option<usize> {
        match self {
            GateKind::H | GateKind::Rx => Some(1),
            GateKind::Cnot => Some(2),
            GateKind::Measure => None,
        }
    }

    /// Number of real parameters.
    #[inline]
    pub fn num_params(&self) -> usize {
        match self {
            GateKind::Rx => 1,
            GateKind::H | GateKind::Cnot | GateKind::Measure => 0,
        }
    }

    /// Whether this gate changes the amplitude vector.
    #[inline]
    pub fn is_unitary(&self) -> bool {
        !matches!(self, GateKind::Measure)
    }
}

impl std::fmt::Display for GateKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// One operation in a circuit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "GateDocument")]
pub struct Gate {
    kind: GateKind,
    qubits: Vec<QubitId>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    params: Vec<f64>,
}

impl Gate {
    /// Hadamard on `qubit`.
    pub fn h(qubit: QubitId) -> Self {
        Self {
            kind: GateKind::H,
            qubits: vec![qubit],
            params: vec![],
        }
    }

    /// CNOT with the given control and target.
    pub fn cnot(control: QubitId, target: QubitId) -> Self {
        Self {
            kind: GateKind::Cnot,
            qubits: vec![control, target],
            params: vec![],
        }
    }

    /// X rotation of `qubit` by `theta` radians.
    pub fn rx(qubit: QubitId, theta: f64) -> Self {
        Self {
            kind: GateKind::Rx,
            qubits: vec![qubit],
            params: vec![theta],
        }
    }

    /// Measurement marker over `qubits`.
    pub fn measure(qubits: impl IntoIterator<Item = QubitId>) -> Self {
        Self {
            kind: GateKind::Measure,
            qubits: qubits.into_iter().collect(),
            params: vec![],
        }
    }

    /// Build a gate from its parts, checking operand and parameter counts.
    pub fn try_new(kind: GateKind, qubits: Vec<QubitId>, params: Vec<f64>) -> IrResult<Self> {
        if let Some(expected) = kind.num_qubits() {
            if qubits.len() != expected {
                return Err(IrError::QubitCountMismatch {
                    gate_name: kind.name().to_string(),
                    expected,
                    got: qubits.len(),
                });
            }
        }
        if params.len() != kind.num_params() {
            return Err(IrError::ParamCountMismatch {
                gate_name: kind.name().to_string(),
                expected: kind.num_params(),
                got: params.len(),
            });
        }
        Ok(Self {
            kind,
            qubits,
            params,
        })
    }

    /// The gate kind.
    #[inline]
    pub fn kind(&self) -> GateKind {
        self.kind
    }

    /// The gate name.
    #[inline]
    pub fn name(&self) -> &'static str {
        self.kind.name()
    }

    /// Qubit operands in order (`[control, target]` for CNOT).
    #[inline]
    pub fn qubits(&self) -> &[QubitId] {
        &self.qubits
    }

    /// Real parameters; empty when the gate has none.
    #[inline]
    pub fn params(&self) -> &[f64] {
        &self.params
    }

    /// Check this gate against a register of `num_qubits` qubits.
    ///
    /// Rejects out-of-range operands, repeated operands and non-finite
    /// parameters.
    pub fn validate(&self, num_qubits: u32) -> IrResult<()> {
        for (i, &qubit) in self.qubits.iter().enumerate() {
            if qubit.0 >= num_qubits {
                return Err(IrError::QubitOutOfRange {
                    qubit,
                    num_qubits,
                    gate_name: Some(self.name().to_string()),
                });
            }
            if self.qubits[..i].contains(&qubit) {
                return Err(IrError::DuplicateQubit {
                    qubit,
                    gate_name: Some(self.name().to_string()),
                });
            }
        }
        if let Some(&value) = self.params.iter().find(|p| !p.is_finite()) {
            return Err(IrError::InvalidParameter {
                gate_name: self.name().to_string(),
                value,
            });
        }
        Ok(())
    }
}

/// Wire shape of a gate before arity checks.
#[derive(Deserialize)]
struct GateDocument {
    kind: GateKind,
    qubits: Vec<QubitId>,
    #[serde(default)]
    params: Vec<f64>,
}

impl TryFrom<GateDocument> for Gate {
    type Error = IrError;

    fn try_from(doc: GateDocument) -> IrResult<Self> {
        Gate::try_new(doc.kind, doc.qubits, doc.params)
    }
}
