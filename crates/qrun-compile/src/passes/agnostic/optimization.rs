//! Peephole optimization passes.
//!
//! Both passes do a single linear scan with a stack of live instruction
//! indices per qubit. The top of a qubit's stack is the latest surviving
//! instruction on that wire, so two instructions are adjacent in the DAG
//! exactly when they share the top of every stack they touch. Measures,
//! resets and barriers sit on the stacks like any other instruction and
//! therefore block merging across them.

use std::f64::consts::{PI, TAU};

use rustc_hash::FxHashMap;
use tracing::debug;

use qrun_ir::{CircuitDag, Instruction, InstructionKind, QubitId, StandardGate};

use crate::error::CompileResult;
use crate::pass::{Pass, PassKind};
use crate::property::PropertySet;

const ANGLE_EPS: f64 = 1e-10;

/// Live instructions in scan order plus per-qubit stacks into them.
#[derive(Default)]
struct Scan {
    kept: Vec<Option<Instruction>>,
    stacks: FxHashMap<QubitId, Vec<usize>>,
}

impl Scan {
    /// Index of the instruction directly preceding `qubits` on all of
    /// them, if there is one and it touches no other qubit.
    fn adjacent(&self, qubits: &[QubitId]) -> Option<usize> {
        let (first, rest) = qubits.split_first()?;
        let top = *self.stacks.get(first)?.last()?;
        let shared = rest
            .iter()
            .all(|q| self.stacks.get(q).and_then(|s| s.last()) == Some(&top));
        let same_width = self.kept[top]
            .as_ref()
            .is_some_and(|prev| prev.qubits.len() == qubits.len());
        (shared && same_width).then_some(top)
    }

    fn push(&mut self, inst: Instruction) {
        let idx = self.kept.len();
        for q in &inst.qubits {
            self.stacks.entry(*q).or_default().push(idx);
        }
        self.kept.push(Some(inst));
    }

    fn remove(&mut self, idx: usize) {
        if let Some(inst) = self.kept[idx].take() {
            for q in &inst.qubits {
                if let Some(stack) = self.stacks.get_mut(q) {
                    stack.pop();
                }
            }
        }
    }

    fn rebuild(self, dag: &CircuitDag, extra_phase: f64) -> CompileResult<CircuitDag> {
        let mut new_dag = dag.copy_empty_like();
        new_dag.set_global_phase(dag.global_phase() + extra_phase);
        for inst in self.kept.into_iter().flatten() {
            new_dag.apply(inst)?;
        }
        Ok(new_dag)
    }
}

/// Removes adjacent gate pairs that multiply to the identity.
///
/// Cancellation cascades: in `X H H X` the inner pair goes first, which
/// makes the outer pair adjacent.
pub struct CancelAdjacent;

impl Pass for CancelAdjacent {
    fn name(&self) -> &'static str {
        "CancelAdjacent"
    }

    fn kind(&self) -> PassKind {
        PassKind::Transformation
    }

    fn run(&self, dag: &mut CircuitDag, _properties: &mut PropertySet) -> CompileResult<()> {
        let mut scan = Scan::default();
        let mut cancelled = 0usize;

        for (_idx, inst) in dag.topological_ops() {
            if inst.is_gate() {
                if let Some(j) = scan.adjacent(&inst.qubits) {
                    if scan.kept[j].as_ref().is_some_and(|prev| cancels(prev, inst)) {
                        scan.remove(j);
                        cancelled += 2;
                        continue;
                    }
                }
            }
            scan.push(inst.clone());
        }

        if cancelled > 0 {
            debug!(cancelled, "cancelled inverse gate pairs");
            *dag = scan.rebuild(dag, 0.0)?;
        }
        Ok(())
    }
}

fn cancels(prev: &Instruction, next: &Instruction) -> bool {
    let (Some(a), Some(b)) = (prev.as_gate(), next.as_gate()) else {
        return false;
    };
    if a.inverse() != *b {
        return false;
    }
    if prev.qubits == next.qubits {
        return true;
    }
    let symmetric = matches!(a, StandardGate::CZ | StandardGate::CP(_) | StandardGate::Swap);
    symmetric && prev.qubits.iter().rev().eq(next.qubits.iter())
}

/// Merges runs of `rz` (and of `p`) on a qubit and drops the identities.
///
/// Merged angles are wrapped to `(-π, π]`. Wrapping an `rz` by `2π`
/// flips its sign, which is folded into the global phase.
pub struct Optimize1qRotations;

impl Pass for Optimize1qRotations {
    fn name(&self) -> &'static str {
        "Optimize1qRotations"
    }

    fn kind(&self) -> PassKind {
        PassKind::Transformation
    }

    fn run(&self, dag: &mut CircuitDag, _properties: &mut PropertySet) -> CompileResult<()> {
        let mut scan = Scan::default();
        let mut phase = 0.0;
        let mut changed = false;

        for (_idx, inst) in dag.topological_ops() {
            let Some(gate) = inst.as_gate().copied() else {
                scan.push(inst.clone());
                continue;
            };

            if gate == StandardGate::I {
                changed = true;
                continue;
            }

            let Some(angle) = rotation_angle(&gate) else {
                scan.push(inst.clone());
                continue;
            };

            let mut total = angle;
            let mut target = None;
            if let Some(j) = scan.adjacent(&inst.qubits) {
                if let Some(prev_angle) = scan.kept[j]
                    .as_ref()
                    .and_then(Instruction::as_gate)
                    .filter(|prev| same_rotation(prev, &gate))
                    .and_then(rotation_angle)
                {
                    total += prev_angle;
                    target = Some(j);
                }
            }

            let (wrapped, turns) = wrap_angle(total);
            if matches!(gate, StandardGate::Rz(_)) && turns % 2 != 0 {
                phase += PI;
            }
            let merged = with_angle(gate, wrapped);
            if target.is_some() || turns != 0 || wrapped.abs() < ANGLE_EPS {
                changed = true;
            }

            match target {
                Some(j) if wrapped.abs() < ANGLE_EPS => scan.remove(j),
                Some(j) => {
                    if let Some(prev) = scan.kept[j].as_mut() {
                        prev.kind = InstructionKind::Gate(merged);
                    }
                }
                None if wrapped.abs() < ANGLE_EPS => {}
                None => scan.push(Instruction::gate(merged, inst.qubits.iter().copied())),
            }
        }

        if changed {
            debug!("merged single-qubit rotations");
            *dag = scan.rebuild(dag, phase)?;
        }
        Ok(())
    }
}

fn rotation_angle(gate: &StandardGate) -> Option<f64> {
    match *gate {
        StandardGate::Rz(a) | StandardGate::P(a) => Some(a),
        _ => None,
    }
}

fn same_rotation(a: &StandardGate, b: &StandardGate) -> bool {
    matches!(
        (a, b),
        (StandardGate::Rz(_), StandardGate::Rz(_)) | (StandardGate::P(_), StandardGate::P(_))
    )
}

fn with_angle(gate: StandardGate, angle: f64) -> StandardGate {
    match gate {
        StandardGate::P(_) => StandardGate::P(angle),
        _ => StandardGate::Rz(angle),
    }
}

/// Split `theta` into `wrapped + 2π·turns` with `wrapped` in `(-π, π]`.
#[allow(clippy::cast_possible_truncation)]
fn wrap_angle(theta: f64) -> (f64, i64) {
    let turns = ((theta - PI) / TAU).ceil();
    (theta - turns * TAU, turns as i64)
}
