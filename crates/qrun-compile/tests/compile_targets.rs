//! Compiling program circuits onto device-shaped targets.

use proptest::prelude::*;
use qrun_compile::{
    BasisGates, CompileError, CouplingMap, Target, generate_preset_pass_manager,
};
use qrun_ir::{Circuit, Observable};
use qrun_oracle::{GroverOperator, PhaseOracle, secret_to_expression};

fn grover(secret: &str) -> Circuit {
    let oracle: PhaseOracle = secret_to_expression(secret).unwrap().parse().unwrap();
    let op = GroverOperator::new(oracle).unwrap();
    op.search_circuit(op.optimal_iterations().unwrap()).unwrap()
}

fn assert_executable(circuit: &Circuit, target: &Target) {
    let basis = target.basis_gates.as_ref().unwrap();
    let map = target.coupling_map.as_ref().unwrap();
    for inst in circuit.instructions() {
        if let Some(gate) = inst.as_gate() {
            assert!(basis.contains(gate.name()), "{} not native", gate.name());
            if let [a, b] = inst.qubits.as_slice() {
                assert!(map.is_connected(a.0, b.0), "{a}-{b} not coupled");
            }
        }
    }
}

fn is_permutation_prefix(layout: &[u32], num_physical: u32) -> bool {
    let mut seen = vec![false; num_physical as usize];
    layout.iter().all(|&p| {
        let fresh = (p as usize) < seen.len() && !seen[p as usize];
        if fresh {
            seen[p as usize] = true;
        }
        fresh
    })
}

#[test]
fn grover_three_qubits_on_linear_device() {
    let target = Target::new(CouplingMap::linear(7), BasisGates::ibm());
    let compiled = generate_preset_pass_manager(&target, 1)
        .run(&grover("101"))
        .unwrap();

    assert_eq!(compiled.circuit.num_qubits(), 7);
    assert_executable(&compiled.circuit, &target);
    assert_eq!(compiled.layout.initial_index_layout(), &[0, 1, 2]);
    assert!(is_permutation_prefix(compiled.layout.final_index_layout(), 7));
}

#[test]
fn measured_circuit_keeps_every_measurement() {
    let mut circuit = grover("110");
    circuit.measure_all().unwrap();
    let target = Target::new(CouplingMap::linear(5), BasisGates::heron());
    let compiled = generate_preset_pass_manager(&target, 2)
        .run(&circuit)
        .unwrap();

    assert_executable(&compiled.circuit, &target);
    assert_eq!(compiled.circuit.num_clbits(), 3);
    assert_eq!(
        compiled.circuit.dag().count_ops().get("measure"),
        Some(&1),
        "measure_all emits one multi-qubit measure"
    );
    assert_eq!(compiled.circuit.creg_name(), "meas");
}

#[test]
fn observables_follow_final_layout() {
    let target = Target::new(CouplingMap::linear(4), BasisGates::ibm());
    let compiled = generate_preset_pass_manager(&target, 1)
        .run(&grover("11"))
        .unwrap();
    let layout = &compiled.layout;

    let zz: Observable = "ZZ".parse().unwrap();
    let mapped = zz
        .apply_layout(
            layout.final_index_layout(),
            layout.num_physical_qubits() as usize,
        )
        .unwrap();
    assert_eq!(mapped.num_qubits(), 4);
    assert_eq!(mapped.support().count(), 2);
}

#[test]
fn circuit_larger_than_device_is_rejected() {
    let target = Target::new(CouplingMap::linear(2), BasisGates::ibm());
    let result = generate_preset_pass_manager(&target, 1).run(&grover("111"));
    assert!(matches!(
        result,
        Err(CompileError::CircuitTooLarge {
            required: 3,
            available: 2
        })
    ));
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(12))]

    #[test]
    fn any_secret_compiles_to_native_gates(secret in "[01]{1,4}") {
        let target = Target::new(CouplingMap::linear(5), BasisGates::ibm());
        let compiled = generate_preset_pass_manager(&target, 1)
            .run(&grover(&secret))
            .unwrap();

        assert_executable(&compiled.circuit, &target);
        prop_assert_eq!(compiled.layout.final_index_layout().len(), secret.len());
    }
}

#[test]
fn grover_on_ecr_device() {
    let target = Target::new(CouplingMap::linear(6), BasisGates::eagle());
    let compiled = generate_preset_pass_manager(&target, 1)
        .run(&grover("1011"))
        .unwrap();

    assert_executable(&compiled.circuit, &target);
    let ops = compiled.circuit.dag().count_ops();
    assert!(ops.get("ecr").is_some_and(|&n| n > 0));
    assert_eq!(ops.get("cx"), None);
}
