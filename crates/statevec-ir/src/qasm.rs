//! OpenQASM 2.0 emitter.
//!
//! Output layout is a compatibility contract for downstream parsers:
//!
//! ```text
//! OPENQASM 2.0;
//! include "qelib1.inc";
//! qreg q[n];
//! creg c[n];
//! <one line per gate, in insertion order>
//! ```
//!
//! Parameterised gates render as `rx(0.5) q[0];`, CNOT as
//! `cnot q[0],q[1];`, and a measurement marker expands to one
//! `measure q[i] -> c[i];` line per qubit in ascending order. Lines are
//! joined with `\n` and the text has no trailing newline.

use crate::circuit::Circuit;
use crate::gate::{Gate, GateKind};

/// Emit a circuit as QASM 2.0 source code.
pub fn emit_qasm2(circuit: &Circuit) -> String {
    let mut emitter = Qasm2Emitter::new();
    emitter.emit_circuit(circuit);
    emitter.finish()
}

/// QASM 2.0 emitter.
struct Qasm2Emitter {
    lines: Vec<String>,
}

impl Qasm2Emitter {
    fn new() -> Self {
        Self { lines: vec![] }
    }

    fn emit_circuit(&mut self, circuit: &Circuit) {
        let n = circuit.num_qubits();

        // Header
        self.writeln("OPENQASM 2.0;");
        self.writeln("include \"qelib1.inc\";");
        self.writeln(&format!("qreg q[{n}];"));
        self.writeln(&format!("creg c[{n}];"));

        for gate in circuit.gates() {
            self.emit_gate(gate);
        }
    }

    fn emit_gate(&mut self, gate: &Gate) {
        match gate.kind() {
            GateKind::Measure => {
                let mut qubits = gate.qubits().to_vec();
                qubits.sort_unstable();
                for q in qubits {
                    self.writeln(&format!("measure q[{0}] -> c[{0}];", q.0));
                }
            }
            GateKind::Cnot => {
                let (control, target) = (gate.qubits()[0], gate.qubits()[1]);
                self.writeln(&format!(
                    "{} q[{}],q[{}];",
                    gate.name(),
                    control.0,
                    target.0
                ));
            }
            GateKind::H | GateKind::Rx => {
                let params = format_params(gate.params());
                self.writeln(&format!("{}{params} q[{}];", gate.name(), gate.qubits()[0].0));
            }
        }
    }

    fn writeln(&mut self, line: &str) {
        self.lines.push(line.to_string());
    }

    fn finish(self) -> String {
        self.lines.join("\n")
    }
}

/// Parenthesised, comma-joined parameter list, or nothing when empty.
///
/// Values use the shortest round-trip float formatting, so `1.0` stays
/// `1.0` and `PI / 2` prints all significant digits. Magnitudes below
/// `1e-4` or from `1e16` up switch to scientific notation with a signed,
/// two-digit exponent (`1e-05`, `1e+16`).
fn format_params(params: &[f64]) -> String {
    if params.is_empty() {
        return String::new();
    }
    let joined = params
        .iter()
        .map(|&p| format_param(p))
        .collect::<Vec<_>>()
        .join(",");
    format!("({joined})")
}

fn format_param(value: f64) -> String {
    let text = format!("{value:?}");
    match text.split_once('e') {
        Some((mantissa, exponent)) => {
            let (sign, digits) = match exponent.strip_prefix('-') {
                Some(digits) => ('-', digits),
                None => ('+', exponent),
            };
            format!("{mantissa}e{sign}{digits:0>2}")
        }
        None => text,
    }
}
