//! Benchmarks for circuit construction and QASM export
//!
//! Run with: cargo bench -p statevec-ir

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use statevec_ir::{Circuit, QubitId};
use std::f64::consts::PI;

/// Layered circuit of H, RX and a CNOT ladder.
fn layered(n: u32, layers: usize) -> Circuit {
    let mut circuit = Circuit::new(n).unwrap();
    for _ in 0..layers {
        for q in 0..n {
            circuit.add_h(QubitId(q)).unwrap();
            circuit.add_rx(QubitId(q), PI / 7.0).unwrap();
        }
        for q in 0..n - 1 {
            circuit.add_cnot(QubitId(q), QubitId(q + 1)).unwrap();
        }
    }
    circuit.add_measure_all().unwrap();
    circuit
}

fn bench_gate_addition(c: &mut Criterion) {
    let mut group = c.benchmark_group("gate_addition");

    group.bench_function("h_gate", |b| {
        let mut circuit = Circuit::new(10).unwrap();
        b.iter(|| {
            circuit.add_h(black_box(QubitId(0))).unwrap();
        });
    });

    group.bench_function("cnot_gate", |b| {
        let mut circuit = Circuit::new(10).unwrap();
        b.iter(|| {
            circuit
                .add_cnot(black_box(QubitId(0)), black_box(QubitId(1)))
                .unwrap();
        });
    });

    group.finish();
}

fn bench_qasm_export(c: &mut Criterion) {
    let mut group = c.benchmark_group("qasm_export");

    for num_qubits in &[2_u32, 8, 16] {
        let circuit = layered(*num_qubits, 10);
        group.bench_with_input(
            BenchmarkId::new("to_qasm", num_qubits),
            &circuit,
            |b, circuit| {
                b.iter(|| black_box(circuit).to_qasm());
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_gate_addition, bench_qasm_export);
criterion_main!(benches);
