//! Unrolling of three-qubit gates.

use qrun_ir::{CircuitDag, Instruction, QubitId, StandardGate};
use tracing::debug;

use crate::error::CompileResult;
use crate::pass::{Pass, PassKind};
use crate::property::PropertySet;

/// Rewrites every Toffoli into one- and two-qubit gates.
///
/// Routing only knows how to bring two qubits together, so this runs
/// before it.
pub struct Unroll3q;

impl Pass for Unroll3q {
    fn name(&self) -> &'static str {
        "Unroll3q"
    }

    fn kind(&self) -> PassKind {
        PassKind::Transformation
    }

    fn run(&self, dag: &mut CircuitDag, _properties: &mut PropertySet) -> CompileResult<()> {
        let mut new_dag = dag.copy_empty_like();
        let mut unrolled = 0usize;

        for (_idx, inst) in dag.topological_ops() {
            if let (Some(StandardGate::CCX), [a, b, c]) = (inst.as_gate(), inst.qubits.as_slice()) {
                for r in ccx_decomposition(*a, *b, *c) {
                    new_dag.apply(r)?;
                }
                unrolled += 1;
            } else {
                new_dag.apply(inst.clone())?;
            }
        }

        debug!(unrolled, "unrolled three-qubit gates");
        *dag = new_dag;
        Ok(())
    }

    fn should_run(&self, dag: &CircuitDag, _properties: &PropertySet) -> bool {
        dag.topological_ops()
            .any(|(_, inst)| inst.qubits.len() > 2 && inst.is_gate())
    }
}

/// Exact six-CX decomposition of `CCX(a, b → c)`.
pub(crate) fn ccx_decomposition(a: QubitId, b: QubitId, c: QubitId) -> Vec<Instruction> {
    use StandardGate::{CX, H, T, Tdg};
    vec![
        Instruction::gate(H, [c]),
        Instruction::gate(CX, [b, c]),
        Instruction::gate(Tdg, [c]),
        Instruction::gate(CX, [a, c]),
        Instruction::gate(T, [c]),
        Instruction::gate(CX, [b, c]),
        Instruction::gate(Tdg, [c]),
        Instruction::gate(CX, [a, c]),
        Instruction::gate(T, [b]),
        Instruction::gate(T, [c]),
        Instruction::gate(H, [c]),
        Instruction::gate(CX, [a, b]),
        Instruction::gate(T, [a]),
        Instruction::gate(Tdg, [b]),
        Instruction::gate(CX, [a, b]),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use qrun_ir::Circuit;

    #[test]
    fn test_unroll_ccx() {
        let mut circuit = Circuit::with_size("test", 3, 0);
        circuit.h(QubitId(0)).unwrap();
        circuit.ccx(QubitId(0), QubitId(1), QubitId(2)).unwrap();
        let mut dag = circuit.into_dag();
        let mut props = PropertySet::new();

        assert!(Unroll3q.should_run(&dag, &props));
        Unroll3q.run(&mut dag, &mut props).unwrap();

        let counts = dag.count_ops();
        assert_eq!(counts.get("ccx"), None);
        assert_eq!(counts.get("cx"), Some(&6));
        assert_eq!(dag.num_ops(), 16);
        assert!(dag.topological_ops().all(|(_, i)| i.qubits.len() <= 2));
        assert!(!Unroll3q.should_run(&dag, &props));
    }
}
