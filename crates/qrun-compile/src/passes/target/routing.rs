//! Routing passes for satisfying connectivity constraints.

use rustc_hash::FxHashMap;
use tracing::{debug, warn};

use qrun_ir::{CircuitDag, CircuitLevel, Instruction, QubitId, StandardGate};

use crate::error::{CompileError, CompileResult};
use crate::pass::{Pass, PassKind};
use crate::property::{Layout, PropertySet};

/// Greedy SWAP routing.
///
/// Rewrites the DAG onto the device's physical qubits using the initial
/// layout, then walks the operations in order. Whenever a two-qubit gate
/// acts on qubits that are not coupled, the first operand is swapped
/// along a shortest path until it sits next to the second. The resulting
/// virtual→physical mapping is stored as `final_layout`.
///
/// Measurements follow their qubit, so classical bits keep their meaning.
pub struct SwapRouting;

/// Where each virtual qubit currently lives, and the reverse.
struct Placement {
    position: FxHashMap<QubitId, u32>,
    occupant: FxHashMap<u32, QubitId>,
}

impl Placement {
    fn from_layout(dag: &CircuitDag, layout: &Layout) -> CompileResult<Self> {
        let mut position = FxHashMap::default();
        let mut occupant = FxHashMap::default();
        for v in dag.qubits() {
            let p = layout.get_physical(v).ok_or(CompileError::MissingLayout)?;
            position.insert(v, p);
            occupant.insert(p, v);
        }
        Ok(Self { position, occupant })
    }

    fn physical(&self, v: QubitId) -> u32 {
        self.position.get(&v).copied().unwrap_or(v.0)
    }

    fn swap(&mut self, a: u32, b: u32) {
        let va = self.occupant.remove(&a);
        let vb = self.occupant.remove(&b);
        if let Some(v) = va {
            self.position.insert(v, b);
            self.occupant.insert(b, v);
        }
        if let Some(v) = vb {
            self.position.insert(v, a);
            self.occupant.insert(a, v);
        }
    }

    fn to_layout(&self) -> Layout {
        let mut layout = Layout::new();
        for (&v, &p) in &self.position {
            layout.add(v, p);
        }
        layout
    }
}

impl Pass for SwapRouting {
    fn name(&self) -> &'static str {
        "SwapRouting"
    }

    fn kind(&self) -> PassKind {
        PassKind::Transformation
    }

    fn run(&self, dag: &mut CircuitDag, properties: &mut PropertySet) -> CompileResult<()> {
        let coupling_map = properties
            .coupling_map
            .as_ref()
            .ok_or(CompileError::MissingCouplingMap)?;
        let layout = properties
            .layout
            .as_ref()
            .ok_or(CompileError::MissingLayout)?;

        let mut placement = Placement::from_layout(dag, layout)?;

        let mut new_dag = CircuitDag::new();
        for p in 0..coupling_map.num_qubits() {
            new_dag.add_qubit(QubitId(p));
        }
        for c in dag.clbits() {
            new_dag.add_clbit(c);
        }
        new_dag.set_global_phase(dag.global_phase());
        new_dag.set_level(CircuitLevel::Physical);

        let mut swaps = 0usize;
        for (_idx, inst) in dag.topological_ops() {
            if inst.is_gate() {
                match inst.qubits.as_slice() {
                    [_] => {}
                    [a, b] => {
                        let pa = placement.physical(*a);
                        let pb = placement.physical(*b);
                        if !coupling_map.is_connected(pa, pb) {
                            let path = coupling_map.shortest_path(pa, pb).ok_or(
                                CompileError::RoutingFailed {
                                    qubit1: pa,
                                    qubit2: pb,
                                },
                            )?;
                            for hop in path[..path.len() - 1].windows(2) {
                                new_dag.apply(Instruction::gate(
                                    StandardGate::Swap,
                                    [QubitId(hop[0]), QubitId(hop[1])],
                                ))?;
                                placement.swap(hop[0], hop[1]);
                                swaps += 1;
                            }
                        }
                    }
                    _ => {
                        warn!(gate = inst.name(), "multi-qubit gate reached routing");
                        return Err(CompileError::GateNotInBasis(inst.name().to_string()));
                    }
                }
            }
            new_dag.apply(inst.remap_qubits(|q| QubitId(placement.physical(q))))?;
        }

        debug!(swaps, "routing complete");
        properties.final_layout = Some(placement.to_layout());
        *dag = new_dag;
        Ok(())
    }

    fn should_run(&self, _dag: &CircuitDag, properties: &PropertySet) -> bool {
        properties.coupling_map.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::passes::TrivialLayout;
    use crate::property::{BasisGates, CouplingMap};
    use qrun_ir::{Circuit, ClbitId};

    fn route(circuit: Circuit, map: CouplingMap) -> CompileResult<(CircuitDag, PropertySet)> {
        let mut dag = circuit.into_dag();
        let mut props = PropertySet::new().with_target(map, BasisGates::ibm());
        TrivialLayout.run(&mut dag, &mut props)?;
        SwapRouting.run(&mut dag, &mut props)?;
        Ok((dag, props))
    }

    fn respects(dag: &CircuitDag, map: &CouplingMap) -> bool {
        dag.topological_ops()
            .filter(|(_, i)| i.is_gate() && i.qubits.len() == 2)
            .all(|(_, i)| map.is_connected(i.qubits[0].0, i.qubits[1].0))
    }

    #[test]
    fn test_adjacent_gates_untouched() {
        let (dag, props) = route(Circuit::bell().unwrap(), CouplingMap::linear(3)).unwrap();
        assert_eq!(dag.num_qubits(), 3);
        assert_eq!(dag.level(), CircuitLevel::Physical);
        assert_eq!(dag.count_ops().get("swap"), None);
        assert_eq!(props.final_layout.unwrap().to_index_vec(2), Some(vec![0, 1]));
    }

    #[test]
    fn test_distant_gate_gets_swaps() {
        let mut circuit = Circuit::with_size("test", 4, 0);
        circuit.cx(QubitId(0), QubitId(3)).unwrap();
        circuit.h(QubitId(0)).unwrap();
        let map = CouplingMap::linear(4);

        let (dag, props) = route(circuit, map.clone()).unwrap();
        assert_eq!(dag.count_ops().get("swap"), Some(&2));
        assert!(respects(&dag, &map));

        // Virtual 0 walked 0 -> 1 -> 2; 1 and 2 each shifted down one.
        let final_layout = props.final_layout.unwrap();
        assert_eq!(final_layout.to_index_vec(4), Some(vec![2, 0, 1, 3]));

        let last = dag.topological_ops().last().unwrap().1.clone();
        assert_eq!(last.qubits, vec![QubitId(2)]);
    }

    #[test]
    fn test_measure_follows_qubit() {
        let mut circuit = Circuit::with_size("test", 3, 3);
        circuit.cx(QubitId(0), QubitId(2)).unwrap();
        circuit.measure(QubitId(0), ClbitId(0)).unwrap();

        let (dag, _) = route(circuit, CouplingMap::linear(3)).unwrap();
        let measure = dag
            .topological_ops()
            .find(|(_, i)| i.is_measure())
            .unwrap()
            .1
            .clone();
        assert_eq!(measure.qubits, vec![QubitId(1)]);
        assert_eq!(measure.clbits, vec![ClbitId(0)]);
    }

    #[test]
    fn test_disconnected_map_fails() {
        let mut circuit = Circuit::with_size("test", 4, 0);
        circuit.cx(QubitId(0), QubitId(3)).unwrap();
        let map = CouplingMap::from_edges(4, [(0, 1), (2, 3)]);

        let result = route(circuit, map);
        assert!(matches!(
            result,
            Err(CompileError::RoutingFailed {
                qubit1: 0,
                qubit2: 3
            })
        ));
    }
}
