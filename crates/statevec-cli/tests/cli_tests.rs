//! End-to-end tests of the `statevec` binary.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use tempfile::TempDir;

const BELL_JSON: &str = r#"{
  "num_qubits": 2,
  "gates": [
    { "kind": "h", "qubits": [0] },
    { "kind": "cnot", "qubits": [0, 1] },
    { "kind": "measure", "qubits": [0, 1] }
  ]
}"#;

const FLIP_YAML: &str = "num_qubits: 3
gates:
  - kind: rx
    qubits: [0]
    params: [3.141592653589793]
";

fn statevec(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_statevec"))
        .args(args)
        .env_remove("STATEVEC_BACKEND")
        .env_remove("STATEVEC_THREADS")
        .env_remove("STATEVEC_SEED")
        .env_remove("STATEVEC_CONFIG")
        .output()
        .unwrap()
}

fn write(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, contents).unwrap();
    path
}

fn path_str(path: &Path) -> &str {
    path.to_str().unwrap()
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

// ============================================================================
// qasm
// ============================================================================

#[test]
fn qasm_prints_bell_export() {
    let dir = TempDir::new().unwrap();
    let input = write(&dir, "bell.json", BELL_JSON);

    let output = statevec(&["qasm", "-i", path_str(&input)]);
    assert!(output.status.success());
    assert_eq!(
        stdout(&output),
        "OPENQASM 2.0;\ninclude \"qelib1.inc\";\nqreg q[2];\ncreg c[2];\nh q[0];\ncnot q[0],q[1];\nmeasure q[0] -> c[0];\nmeasure q[1] -> c[1];\n"
    );
}

#[test]
fn qasm_writes_output_file() {
    let dir = TempDir::new().unwrap();
    let input = write(&dir, "flip.yaml", FLIP_YAML);
    let out = dir.path().join("flip.qasm");

    let output = statevec(&["qasm", "-i", path_str(&input), "-o", path_str(&out)]);
    assert!(output.status.success());
    let text = fs::read_to_string(&out).unwrap();
    assert!(text.contains("qreg q[3];"));
    assert!(text.contains("rx(3.141592653589793) q[0];"));
}

#[test]
fn invalid_circuit_reports_error() {
    let dir = TempDir::new().unwrap();
    let input = write(
        &dir,
        "bad.json",
        r#"{ "num_qubits": 2, "gates": [ { "kind": "h", "qubits": [5] } ] }"#,
    );

    let output = statevec(&["qasm", "-i", path_str(&input)]);
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Error:"));
    assert!(stderr.contains("out of range"));
}

#[test]
fn missing_file_reports_error() {
    let output = statevec(&["qasm", "-i", "/nonexistent/circuit.json"]);
    assert_eq!(output.status.code(), Some(1));
}

// ============================================================================
// run
// ============================================================================

#[test]
fn run_json_report() {
    let dir = TempDir::new().unwrap();
    let input = write(&dir, "bell.json", BELL_JSON);

    let output = statevec(&[
        "run",
        "-i",
        path_str(&input),
        "--shots",
        "200",
        "--seed",
        "1",
        "--format",
        "json",
    ]);
    assert!(output.status.success());

    let report: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(report["num_qubits"], 2);
    assert_eq!(report["backend"], "sequential");

    let probs = report["probabilities"].as_array().unwrap();
    assert!((probs[0].as_f64().unwrap() - 0.5).abs() < 1e-9);
    assert!((probs[3].as_f64().unwrap() - 0.5).abs() < 1e-9);

    let counts = report["result"]["counts"].as_object().unwrap();
    let total: u64 = counts.values().map(|v| v.as_u64().unwrap()).sum();
    assert_eq!(total, 200);
    assert!(counts.keys().all(|k| k == "00" || k == "11"));
}

#[test]
fn run_bitstrings_put_qubit_zero_first() {
    let dir = TempDir::new().unwrap();
    let input = write(&dir, "flip.yaml", FLIP_YAML);

    let output = statevec(&["run", "-i", path_str(&input), "--shots", "10"]);
    assert!(output.status.success());
    let text = stdout(&output);
    assert!(text.contains("100"));
    assert!(text.contains("q[0]: -1.000000"));
}

#[test]
fn run_parallel_with_fallback() {
    let dir = TempDir::new().unwrap();
    let input = write(&dir, "bell.json", BELL_JSON);

    let output = statevec(&[
        "run",
        "-i",
        path_str(&input),
        "--backend",
        "parallel",
        "--threads",
        "2",
        "--fallback",
        "--format",
        "json",
    ]);
    assert!(output.status.success());
    let report: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    let probs = report["probabilities"].as_array().unwrap();
    assert!((probs[3].as_f64().unwrap() - 0.5).abs() < 1e-9);
}

#[test]
fn run_full_noise_zeroes_state() {
    let dir = TempDir::new().unwrap();
    let input = write(&dir, "bell.json", BELL_JSON);

    let output = statevec(&[
        "run",
        "-i",
        path_str(&input),
        "--noise",
        "1.0",
        "--format",
        "json",
    ]);
    assert!(output.status.success());
    let report: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(report["zeroed_amplitudes"], 4);
    assert!(
        report["probabilities"]
            .as_array()
            .unwrap()
            .iter()
            .all(|p| p.as_f64() == Some(0.0))
    );
}

#[test]
fn run_rejects_bad_noise_probability() {
    let dir = TempDir::new().unwrap();
    let input = write(&dir, "bell.json", BELL_JSON);

    let output = statevec(&["run", "-i", path_str(&input), "--noise", "1.5"]);
    assert_eq!(output.status.code(), Some(1));
}

#[test]
fn run_uses_config_file() {
    let dir = TempDir::new().unwrap();
    let input = write(&dir, "bell.json", BELL_JSON);
    let config = write(&dir, "sim.yaml", "max_qubits: 1\n");

    let output = statevec(&["run", "-i", path_str(&input), "-c", path_str(&config)]);
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("exceeds"));
}

#[test]
fn run_rejects_unknown_format() {
    let dir = TempDir::new().unwrap();
    let input = write(&dir, "bell.json", BELL_JSON);

    let output = statevec(&["run", "-i", path_str(&input), "--format", "xml"]);
    assert_eq!(output.status.code(), Some(1));
}

// ============================================================================
// backends / version
// ============================================================================

#[test]
fn backends_lists_both_kinds() {
    let output = statevec(&["backends"]);
    assert!(output.status.success());
    let text = stdout(&output);
    assert!(text.contains("sequential"));
    assert!(text.contains("parallel"));
}

#[test]
fn version_prints_package_version() {
    let output = statevec(&["version"]);
    assert!(output.status.success());
    assert!(stdout(&output).contains(env!("CARGO_PKG_VERSION")));
}
