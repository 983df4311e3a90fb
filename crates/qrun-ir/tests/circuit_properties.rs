//! Property tests for circuit construction.

use proptest::prelude::*;
use qrun_ir::{Circuit, QubitId, StandardGate};

fn gate_strategy(n: u32) -> impl Strategy<Value = (StandardGate, Vec<u32>)> {
    prop_oneof![
        (0..n).prop_map(|q| (StandardGate::H, vec![q])),
        (0..n).prop_map(|q| (StandardGate::X, vec![q])),
        ((0..n), -3.0f64..3.0).prop_map(|(q, a)| (StandardGate::Rz(a), vec![q])),
        ((0..n), (1..n)).prop_map(move |(a, off)| (StandardGate::CX, vec![a, (a + off) % n])),
    ]
}

proptest! {
    #[test]
    fn depth_never_exceeds_op_count(
        gates in prop::collection::vec(gate_strategy(4), 0..40)
    ) {
        let mut circuit = Circuit::with_size("prop", 4, 0);
        for (gate, qubits) in &gates {
            circuit.gate(*gate, qubits.iter().map(|&q| QubitId(q))).unwrap();
        }
        prop_assert_eq!(circuit.dag().num_ops(), gates.len());
        prop_assert!(circuit.depth() <= gates.len());
        prop_assert_eq!(circuit.num_qubits(), 4);
    }

    #[test]
    fn instruction_order_is_insertion_order(
        gates in prop::collection::vec(gate_strategy(3), 1..30)
    ) {
        let mut circuit = Circuit::with_size("prop", 3, 0);
        for (gate, qubits) in &gates {
            circuit.gate(*gate, qubits.iter().map(|&q| QubitId(q))).unwrap();
        }
        let names: Vec<&str> = circuit.instructions().map(|i| i.name()).collect();
        let expected: Vec<&str> = gates.iter().map(|(g, _)| g.name()).collect();
        prop_assert_eq!(names, expected);
    }
}

#[test]
fn instructions_serialize_to_json() {
    let circuit = Circuit::bell().unwrap();
    let insts: Vec<_> = circuit.instructions().cloned().collect();
    let json = serde_json::to_string(&insts).unwrap();
    assert!(json.contains("\"CX\""));
}
