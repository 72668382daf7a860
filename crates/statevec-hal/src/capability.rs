//! Backend capability introspection.

use serde::{Deserialize, Serialize};
use statevec_ir::GateKind;

/// What a backend can execute.
///
/// Cached at construction; [`crate::Backend::capabilities`] hands out a
/// reference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Capabilities {
    /// Name of the backend.
    pub name: String,
    /// Largest register the backend accepts.
    pub num_qubits: u32,
    /// Supported gate kinds.
    pub gate_set: Vec<GateKind>,
    /// Maximum number of shots per job.
    pub max_shots: u32,
    /// Whether this is a simulator (`true`) or real hardware (`false`).
    pub is_simulator: bool,
    /// Additional capability flags, e.g. `"statevector"`, `"noise"`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub features: Vec<String>,
}

impl Capabilities {
    /// Capabilities of a local statevector simulator.
    pub fn simulator(name: impl Into<String>, num_qubits: u32) -> Self {
        Self {
            name: name.into(),
            num_qubits,
            gate_set: vec![GateKind::H, GateKind::Cnot, GateKind::Rx, GateKind::Measure],
            max_shots: 1_000_000,
            is_simulator: true,
            features: vec!["statevector".into()],
        }
    }

    /// Add a capability flag.
    pub fn with_feature(mut self, feature: impl Into<String>) -> Self {
        self.features.push(feature.into());
        self
    }

    /// Check if a gate kind is supported.
    pub fn supports_gate(&self, kind: GateKind) -> bool {
        self.gate_set.contains(&kind)
    }

    /// Check if a capability flag is present.
    pub fn has_feature(&self, feature: &str) -> bool {
        self.features.iter().any(|f| f == feature)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simulator_capabilities() {
        let caps = Capabilities::simulator("sim", 20).with_feature("noise");
        assert!(caps.is_simulator);
        assert_eq!(caps.num_qubits, 20);
        assert!(caps.supports_gate(GateKind::Cnot));
        assert!(caps.has_feature("statevector"));
        assert!(caps.has_feature("noise"));
        assert!(!caps.has_feature("photonic"));
    }

    #[test]
    fn test_serde_gate_names() {
        let caps = Capabilities::simulator("sim", 2);
        let json = serde_json::to_value(&caps).unwrap();
        assert_eq!(json["gate_set"][1], "cnot");
    }
}
