//! Basis translation pass.

use std::f64::consts::{FRAC_PI_2, PI};

use tracing::debug;

use qrun_ir::{CircuitDag, Instruction, QubitId, StandardGate};

use crate::error::{CompileError, CompileResult};
use crate::pass::{Pass, PassKind};
use crate::passes::agnostic::unroll::ccx_decomposition;
use crate::property::{BasisGates, PropertySet};

/// Rewrite rules are applied recursively; anything still foreign after
/// this many rounds is reported as untranslatable.
const MAX_DEPTH: usize = 6;

/// Basis translation pass.
///
/// Translates gates to the target basis gate set, up to global phase.
/// Supported targets are the IBM bases:
/// - Falcon: `rz` + `sx` + `x` + `cx`
/// - Eagle: `rz` + `sx` + `x` + `ecr`
/// - Heron: `rz` + `sx` + `x` + `cz`
pub struct BasisTranslation;

impl Pass for BasisTranslation {
    fn name(&self) -> &'static str {
        "BasisTranslation"
    }

    fn kind(&self) -> PassKind {
        PassKind::Transformation
    }

    fn run(&self, dag: &mut CircuitDag, properties: &mut PropertySet) -> CompileResult<()> {
        let Some(basis) = properties.basis_gates.as_ref() else {
            return Ok(());
        };

        // Rebuild so replacements land at the original node position.
        let mut new_dag = dag.copy_empty_like();
        let mut translated = 0usize;
        for (_idx, inst) in dag.topological_ops() {
            if inst.as_gate().is_some_and(|g| !basis.contains(g.name())) {
                translated += 1;
            }
            for r in translate(inst.clone(), basis, 0)? {
                new_dag.apply(r)?;
            }
        }

        debug!(translated, "basis translation complete");
        *dag = new_dag;
        Ok(())
    }

    fn should_run(&self, _dag: &CircuitDag, properties: &PropertySet) -> bool {
        properties.basis_gates.is_some()
    }
}

fn translate(inst: Instruction, basis: &BasisGates, depth: usize) -> CompileResult<Vec<Instruction>> {
    let Some(gate) = inst.as_gate().copied() else {
        return Ok(vec![inst]);
    };
    if basis.contains(gate.name()) {
        return Ok(vec![inst]);
    }
    if depth >= MAX_DEPTH {
        return Err(CompileError::GateNotInBasis(gate.name().to_string()));
    }

    let replacement = decompose(gate, &inst.qubits, basis)
        .ok_or_else(|| CompileError::GateNotInBasis(gate.name().to_string()))?;

    let mut out = Vec::with_capacity(replacement.len());
    for r in replacement {
        out.extend(translate(r, basis, depth + 1)?);
    }
    Ok(out)
}

/// One rewrite step, in circuit order.
fn decompose(gate: StandardGate, qubits: &[QubitId], basis: &BasisGates) -> Option<Vec<Instruction>> {
    use StandardGate::{CX, CZ, ECR, H, P, Rz, SX, SXdg, X};

    let g = |gate: StandardGate, qs: &[QubitId]| Instruction::gate(gate, qs.iter().copied());

    if let [q] = qubits {
        let q = [*q];
        let seq = match gate {
            StandardGate::I => vec![],
            StandardGate::H => vec![g(Rz(FRAC_PI_2), &q), g(SX, &q), g(Rz(FRAC_PI_2), &q)],
            StandardGate::X => vec![g(SX, &q), g(SX, &q)],
            StandardGate::Y => vec![g(Rz(PI), &q), g(X, &q)],
            StandardGate::SXdg => vec![g(Rz(PI), &q), g(SX, &q), g(Rz(PI), &q)],
            StandardGate::Rx(theta) => vec![
                g(Rz(FRAC_PI_2), &q),
                g(SX, &q),
                g(Rz(theta + PI), &q),
                g(SX, &q),
                g(Rz(FRAC_PI_2), &q),
            ],
            StandardGate::Ry(theta) => vec![
                g(SX, &q),
                g(Rz(theta + PI), &q),
                g(SX, &q),
                g(Rz(PI), &q),
            ],
            StandardGate::Rz(theta) if basis.contains("p") => vec![g(P(theta), &q)],
            StandardGate::Rz(_) | StandardGate::SX => return None,
            other => vec![g(Rz(other.phase_angle()?), &q)],
        };
        return Some(seq);
    }

    let seq = match (gate, qubits) {
        (StandardGate::CX, [c, t]) if basis.contains("cz") => {
            vec![g(H, &[*t]), g(CZ, &[*c, *t]), g(H, &[*t])]
        }
        // Up to global phase, CX = Rz(π/2)_c · ECR · (X_c ⊗ SX_t).
        (StandardGate::CX, [c, t]) if basis.contains("ecr") => vec![
            g(X, &[*c]),
            g(SX, &[*t]),
            g(ECR, &[*c, *t]),
            g(Rz(FRAC_PI_2), &[*c]),
        ],
        (StandardGate::ECR, [c, t]) if basis.contains("cx") || basis.contains("cz") => vec![
            g(X, &[*c]),
            g(SXdg, &[*t]),
            g(CX, &[*c, *t]),
            g(Rz(-FRAC_PI_2), &[*c]),
        ],
        (StandardGate::CZ, [c, t]) if basis.contains("cx") || basis.contains("ecr") => {
            vec![g(H, &[*t]), g(CX, &[*c, *t]), g(H, &[*t])]
        }
        (StandardGate::CP(lambda), [c, t]) => vec![
            g(P(lambda / 2.0), &[*c]),
            g(CX, &[*c, *t]),
            g(P(-lambda / 2.0), &[*t]),
            g(CX, &[*c, *t]),
            g(P(lambda / 2.0), &[*t]),
        ],
        (StandardGate::Swap, [a, b]) => vec![
            g(CX, &[*a, *b]),
            g(CX, &[*b, *a]),
            g(CX, &[*a, *b]),
        ],
        (StandardGate::CCX, [a, b, c]) => ccx_decomposition(*a, *b, *c),
        _ => return None,
    };
    Some(seq)
}

#[cfg(test)]
mod tests {
    use super::*;
    use qrun_ir::{Circuit, ClbitId};

    fn translate_with(circuit: Circuit, basis: BasisGates) -> CompileResult<CircuitDag> {
        let mut dag = circuit.into_dag();
        let mut props = PropertySet::new();
        props.basis_gates = Some(basis);
        BasisTranslation.run(&mut dag, &mut props)?;
        Ok(dag)
    }

    fn all_native(dag: &CircuitDag, basis: &BasisGates) -> bool {
        dag.topological_ops()
            .filter_map(|(_, i)| i.as_gate())
            .all(|g| basis.contains(g.name()))
    }

    #[test]
    fn test_bell_to_ibm() {
        let dag = translate_with(Circuit::bell().unwrap(), BasisGates::ibm()).unwrap();
        let names: Vec<_> = dag.topological_ops().map(|(_, i)| i.name().to_string()).collect();
        assert_eq!(names, vec!["rz", "sx", "rz", "cx"]);
    }

    #[test]
    fn test_every_gate_reaches_ibm_basis() {
        let mut circuit = Circuit::with_size("all", 3, 1);
        let (a, b, c) = (QubitId(0), QubitId(1), QubitId(2));
        circuit.h(a).unwrap().y(b).unwrap().z(c).unwrap();
        circuit.s(a).unwrap().t(b).unwrap();
        circuit.rx(0.4, a).unwrap().ry(-1.1, b).unwrap().p(0.7, c).unwrap();
        circuit.gate(StandardGate::SXdg, [a]).unwrap();
        circuit.cz(a, b).unwrap().cp(0.25, b, c).unwrap().swap(a, c).unwrap();
        circuit.ccx(a, b, c).unwrap();
        circuit.measure(a, ClbitId(0)).unwrap();

        let basis = BasisGates::ibm();
        let dag = translate_with(circuit, basis.clone()).unwrap();
        assert!(all_native(&dag, &basis));
        assert_eq!(dag.count_ops().get("measure"), Some(&1));
    }

    #[test]
    fn test_heron_uses_cz() {
        let basis = BasisGates::heron();
        let dag = translate_with(Circuit::bell().unwrap(), basis.clone()).unwrap();
        assert!(all_native(&dag, &basis));
        assert_eq!(dag.count_ops().get("cz"), Some(&1));
        assert_eq!(dag.count_ops().get("cx"), None);
    }

    #[test]
    fn test_eagle_uses_ecr() {
        let basis = BasisGates::eagle();
        let dag = translate_with(Circuit::bell().unwrap(), basis.clone()).unwrap();
        assert!(all_native(&dag, &basis));
        let ops = dag.count_ops();
        assert_eq!(ops.get("ecr"), Some(&1));
        assert_eq!(ops.get("cx"), None);
    }

    #[test]
    fn test_every_gate_reaches_eagle_basis() {
        let mut circuit = Circuit::with_size("all", 3, 0);
        let (a, b, c) = (QubitId(0), QubitId(1), QubitId(2));
        circuit.h(a).unwrap().cz(a, b).unwrap().cp(0.25, b, c).unwrap();
        circuit.swap(a, c).unwrap().ccx(a, b, c).unwrap();

        let basis = BasisGates::eagle();
        let dag = translate_with(circuit, basis.clone()).unwrap();
        assert!(all_native(&dag, &basis));
    }

    #[test]
    fn test_ecr_lowers_to_cx() {
        let mut circuit = Circuit::with_size("ecr", 2, 0);
        circuit.gate(StandardGate::ECR, [QubitId(0), QubitId(1)]).unwrap();
        let basis = BasisGates::ibm();
        let dag = translate_with(circuit, basis.clone()).unwrap();
        assert!(all_native(&dag, &basis));
        assert_eq!(dag.count_ops().get("cx"), Some(&1));
    }

    #[test]
    fn test_untranslatable_gate() {
        let mut circuit = Circuit::with_size("test", 1, 0);
        circuit.h(QubitId(0)).unwrap();
        let result = translate_with(circuit, BasisGates::new(["cx", "measure"]));
        assert!(matches!(result, Err(CompileError::GateNotInBasis(_))));
    }

    #[test]
    fn test_no_basis_is_noop() {
        let mut dag = Circuit::bell().unwrap().into_dag();
        let mut props = PropertySet::new();
        assert!(!BasisTranslation.should_run(&dag, &props));
        BasisTranslation.run(&mut dag, &mut props).unwrap();
        assert_eq!(dag.num_ops(), 2);
    }
}
