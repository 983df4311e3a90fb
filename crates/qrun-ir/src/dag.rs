//! DAG-based circuit representation.

use std::collections::BTreeMap;

use petgraph::graph::{DiGraph, NodeIndex as PetNodeIndex};
use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};

use crate::error::{IrError, IrResult};
use crate::instruction::{Instruction, InstructionKind};
use crate::qubit::{ClbitId, QubitId};

/// Node index type for the circuit DAG.
pub type NodeIndex = PetNodeIndex<u32>;

/// A node in the circuit DAG.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DagNode {
    /// Input node for a wire.
    In(WireId),
    /// Operation node containing an instruction.
    Op(Instruction),
}

impl DagNode {
    /// Get the instruction if this is an operation node.
    #[inline]
    pub fn instruction(&self) -> Option<&Instruction> {
        match self {
            DagNode::Op(inst) => Some(inst),
            DagNode::In(_) => None,
        }
    }
}

/// Identifier for a wire in the DAG.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WireId {
    /// A quantum wire.
    Qubit(QubitId),
    /// A classical wire.
    Clbit(ClbitId),
}

/// An edge in the circuit DAG representing a wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DagEdge {
    /// The wire this edge represents.
    pub wire: WireId,
}

/// The abstraction level of a circuit in the compilation pipeline.
///
/// Circuits start at the `Logical` level (abstract qubits) and are
/// lowered to the `Physical` level by the layout pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CircuitLevel {
    /// Logical level: qubits are abstract, no physical mapping applied.
    #[default]
    Logical,
    /// Physical level: qubit indices name device qubits.
    Physical,
}

/// DAG-based circuit representation.
///
/// Every wire starts at an `In` node; each operation is connected to the
/// previous operation on every wire it touches. Nodes are never removed,
/// so node indices grow monotonically and index order is a valid
/// topological order. Passes that rewrite a circuit build a fresh DAG.
#[derive(Debug, Clone)]
pub struct CircuitDag {
    graph: DiGraph<DagNode, DagEdge, u32>,
    /// Last node on each wire.
    wire_front: FxHashMap<WireId, NodeIndex>,
    /// Depth reached on each wire, in layers.
    wire_depth: FxHashMap<WireId, usize>,
    /// Layer of each operation node (1-based).
    op_layer: FxHashMap<NodeIndex, usize>,
    num_qubits: usize,
    num_clbits: usize,
    global_phase: f64,
    level: CircuitLevel,
}

impl CircuitDag {
    /// Create a new empty circuit DAG.
    pub fn new() -> Self {
        Self {
            graph: DiGraph::default(),
            wire_front: FxHashMap::default(),
            wire_depth: FxHashMap::default(),
            op_layer: FxHashMap::default(),
            num_qubits: 0,
            num_clbits: 0,
            global_phase: 0.0,
            level: CircuitLevel::Logical,
        }
    }

    /// Add a qubit wire. Adding an existing qubit is a no-op.
    pub fn add_qubit(&mut self, qubit: QubitId) {
        if self.add_wire(WireId::Qubit(qubit)) {
            self.num_qubits += 1;
        }
    }

    /// Add a classical bit wire. Adding an existing bit is a no-op.
    pub fn add_clbit(&mut self, clbit: ClbitId) {
        if self.add_wire(WireId::Clbit(clbit)) {
            self.num_clbits += 1;
        }
    }

    fn add_wire(&mut self, wire: WireId) -> bool {
        if self.wire_front.contains_key(&wire) {
            return false;
        }
        let node = self.graph.add_node(DagNode::In(wire));
        self.wire_front.insert(wire, node);
        self.wire_depth.insert(wire, 0);
        true
    }

    /// Apply an instruction to the circuit.
    #[allow(clippy::cast_possible_truncation)]
    pub fn apply(&mut self, instruction: Instruction) -> IrResult<NodeIndex> {
        let gate_name = instruction.as_gate().map(|g| g.name().to_string());

        if let InstructionKind::Gate(gate) = &instruction.kind {
            let expected = gate.num_qubits() as usize;
            let got = instruction.qubits.len();
            if expected != got {
                return Err(IrError::QubitCountMismatch {
                    gate_name: gate.name().to_string(),
                    expected: expected as u32,
                    got: got as u32,
                });
            }
        }

        if instruction.is_measure() && instruction.qubits.len() != instruction.clbits.len() {
            return Err(IrError::MeasureArity {
                qubits: instruction.qubits.len(),
                clbits: instruction.clbits.len(),
            });
        }

        let mut seen = FxHashSet::default();
        for &qubit in &instruction.qubits {
            if !self.wire_front.contains_key(&WireId::Qubit(qubit)) {
                return Err(IrError::QubitNotFound {
                    qubit,
                    gate_name: gate_name.clone(),
                });
            }
            if !seen.insert(qubit) {
                return Err(IrError::DuplicateQubit {
                    qubit,
                    gate_name: gate_name.clone(),
                });
            }
        }
        for &clbit in &instruction.clbits {
            if !self.wire_front.contains_key(&WireId::Clbit(clbit)) {
                return Err(IrError::ClbitNotFound {
                    clbit,
                    gate_name: gate_name.clone(),
                });
            }
        }

        let wires: Vec<WireId> = instruction
            .qubits
            .iter()
            .map(|&q| WireId::Qubit(q))
            .chain(instruction.clbits.iter().map(|&c| WireId::Clbit(c)))
            .collect();

        let layer = 1 + wires
            .iter()
            .map(|w| self.wire_depth.get(w).copied().unwrap_or(0))
            .max()
            .unwrap_or(0);

        let op_node = self.graph.add_node(DagNode::Op(instruction));
        for wire in wires {
            let prev = self.wire_front.insert(wire, op_node).ok_or_else(|| {
                IrError::InvalidDag(format!("wire {wire:?} has no front node"))
            })?;
            self.graph.add_edge(prev, op_node, DagEdge { wire });
            self.wire_depth.insert(wire, layer);
        }
        self.op_layer.insert(op_node, layer);

        Ok(op_node)
    }

    /// Iterate over operations in topological (insertion) order.
    pub fn topological_ops(&self) -> impl Iterator<Item = (NodeIndex, &Instruction)> {
        self.graph
            .node_indices()
            .filter_map(|idx| self.graph[idx].instruction().map(|inst| (idx, inst)))
    }

    /// Get an instruction by node index.
    #[inline]
    pub fn get_instruction(&self, node: NodeIndex) -> Option<&Instruction> {
        self.graph.node_weight(node).and_then(DagNode::instruction)
    }

    /// Layer (1-based ASAP time step) of an operation node.
    pub fn layer_of(&self, node: NodeIndex) -> Option<usize> {
        self.op_layer.get(&node).copied()
    }

    /// Group operations into ASAP layers.
    pub fn layers(&self) -> Vec<Vec<&Instruction>> {
        let mut layers: Vec<Vec<&Instruction>> = vec![Vec::new(); self.depth()];
        for (idx, inst) in self.topological_ops() {
            if let Some(layer) = self.layer_of(idx) {
                layers[layer - 1].push(inst);
            }
        }
        layers
    }

    /// Get the number of qubits.
    #[inline]
    pub fn num_qubits(&self) -> usize {
        self.num_qubits
    }

    /// Get the number of classical bits.
    #[inline]
    pub fn num_clbits(&self) -> usize {
        self.num_clbits
    }

    /// Get the number of operations.
    #[inline]
    pub fn num_ops(&self) -> usize {
        self.graph.node_count() - self.num_qubits - self.num_clbits
    }

    /// Circuit depth: the longest chain of operations on any wire.
    pub fn depth(&self) -> usize {
        self.wire_depth.values().copied().max().unwrap_or(0)
    }

    /// Count operations by name.
    pub fn count_ops(&self) -> BTreeMap<String, usize> {
        let mut counts = BTreeMap::new();
        for (_, inst) in self.topological_ops() {
            *counts.entry(inst.name().to_string()).or_insert(0) += 1;
        }
        counts
    }

    /// Qubits in ascending order.
    pub fn qubits(&self) -> Vec<QubitId> {
        let mut qubits: Vec<_> = self
            .wire_front
            .keys()
            .filter_map(|w| match w {
                WireId::Qubit(q) => Some(*q),
                WireId::Clbit(_) => None,
            })
            .collect();
        qubits.sort_unstable();
        qubits
    }

    /// Classical bits in ascending order.
    pub fn clbits(&self) -> Vec<ClbitId> {
        let mut clbits: Vec<_> = self
            .wire_front
            .keys()
            .filter_map(|w| match w {
                WireId::Clbit(c) => Some(*c),
                WireId::Qubit(_) => None,
            })
            .collect();
        clbits.sort_unstable();
        clbits
    }

    /// Get the global phase.
    pub fn global_phase(&self) -> f64 {
        self.global_phase
    }

    /// Set the global phase.
    pub fn set_global_phase(&mut self, phase: f64) {
        self.global_phase = phase;
    }

    /// Get the abstraction level of this circuit.
    pub fn level(&self) -> CircuitLevel {
        self.level
    }

    /// Set the abstraction level of this circuit.
    pub fn set_level(&mut self, level: CircuitLevel) {
        self.level = level;
    }

    /// Get a reference to the underlying graph.
    pub fn graph(&self) -> &DiGraph<DagNode, DagEdge, u32> {
        &self.graph
    }

    /// Build an empty DAG with the same wires, phase and level.
    ///
    /// Rewriting passes start from this and re-apply instructions.
    pub fn copy_empty_like(&self) -> Self {
        let mut dag = Self::new();
        for q in self.qubits() {
            dag.add_qubit(q);
        }
        for c in self.clbits() {
            dag.add_clbit(c);
        }
        dag.global_phase = self.global_phase;
        dag.level = self.level;
        dag
    }
}

impl Default for CircuitDag {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gate::StandardGate;

    fn two_qubit_dag() -> CircuitDag {
        let mut dag = CircuitDag::new();
        dag.add_qubit(QubitId(0));
        dag.add_qubit(QubitId(1));
        dag
    }

    #[test]
    fn test_apply_and_order() {
        let mut dag = two_qubit_dag();
        dag.apply(Instruction::gate(StandardGate::H, [QubitId(0)])).unwrap();
        dag.apply(Instruction::gate(StandardGate::CX, [QubitId(0), QubitId(1)]))
            .unwrap();
        dag.apply(Instruction::gate(StandardGate::X, [QubitId(1)])).unwrap();

        let names: Vec<_> = dag.topological_ops().map(|(_, i)| i.name()).collect();
        assert_eq!(names, vec!["h", "cx", "x"]);
        assert_eq!(dag.num_ops(), 3);
        assert_eq!(dag.depth(), 3);
    }

    #[test]
    fn test_parallel_gates_share_a_layer() {
        let mut dag = two_qubit_dag();
        dag.apply(Instruction::gate(StandardGate::H, [QubitId(0)])).unwrap();
        dag.apply(Instruction::gate(StandardGate::H, [QubitId(1)])).unwrap();
        assert_eq!(dag.depth(), 1);
        assert_eq!(dag.layers().len(), 1);
        assert_eq!(dag.layers()[0].len(), 2);
    }

    #[test]
    fn test_rejects_unknown_and_duplicate_qubits() {
        let mut dag = two_qubit_dag();
        let err = dag.apply(Instruction::gate(StandardGate::X, [QubitId(7)]));
        assert!(matches!(err, Err(IrError::QubitNotFound { .. })));

        let err = dag.apply(Instruction::gate(StandardGate::CX, [QubitId(0), QubitId(0)]));
        assert!(matches!(err, Err(IrError::DuplicateQubit { .. })));

        let err = dag.apply(Instruction::gate(StandardGate::CX, [QubitId(0)]));
        assert!(matches!(err, Err(IrError::QubitCountMismatch { .. })));
    }

    #[test]
    fn test_copy_empty_like_keeps_wires() {
        let mut dag = two_qubit_dag();
        dag.add_clbit(ClbitId(0));
        dag.set_level(CircuitLevel::Physical);
        dag.apply(Instruction::gate(StandardGate::H, [QubitId(0)])).unwrap();

        let empty = dag.copy_empty_like();
        assert_eq!(empty.num_qubits(), 2);
        assert_eq!(empty.num_clbits(), 1);
        assert_eq!(empty.num_ops(), 0);
        assert_eq!(empty.level(), CircuitLevel::Physical);
    }
}
