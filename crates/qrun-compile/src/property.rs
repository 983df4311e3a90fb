//! `PropertySet` and the target description passes read from it.
//!
//! Passes share state through a [`PropertySet`]: the target's coupling
//! map and basis gates go in before the run, the layout pass records the
//! initial virtual-to-physical mapping, and routing records where each
//! virtual qubit ends up.
//!
//! ```
//! use qrun_compile::{BasisGates, CouplingMap, PropertySet};
//!
//! let props = PropertySet::new().with_target(CouplingMap::linear(5), BasisGates::ibm());
//! assert!(props.coupling_map.is_some());
//! assert!(props.basis_gates.as_ref().unwrap().contains("sx"));
//! ```

use std::collections::VecDeque;

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use qrun_ir::QubitId;

/// A mapping from virtual qubits to physical qubits.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Layout {
    virtual_to_physical: FxHashMap<QubitId, u32>,
    physical_to_virtual: FxHashMap<u32, QubitId>,
}

impl Layout {
    /// Create a new empty layout.
    pub fn new() -> Self {
        Self::default()
    }

    /// Virtual qubit `i` on physical qubit `i`.
    pub fn trivial(num_qubits: u32) -> Self {
        let mut layout = Self::new();
        for i in 0..num_qubits {
            layout.add(QubitId(i), i);
        }
        layout
    }

    /// Build from a slice where entry `v` is the physical qubit of virtual `v`.
    #[allow(clippy::cast_possible_truncation)]
    pub fn from_physical(physical: &[u32]) -> Self {
        let mut layout = Self::new();
        for (v, &p) in physical.iter().enumerate() {
            layout.add(QubitId(v as u32), p);
        }
        layout
    }

    /// Map `virt` to `physical`, dropping any mapping either side had.
    pub fn add(&mut self, virt: QubitId, physical: u32) {
        if let Some(old_virtual) = self.physical_to_virtual.insert(physical, virt) {
            if old_virtual != virt {
                self.virtual_to_physical.remove(&old_virtual);
            }
        }
        if let Some(old_physical) = self.virtual_to_physical.insert(virt, physical) {
            if old_physical != physical {
                self.physical_to_virtual.remove(&old_physical);
            }
        }
    }

    /// Get the physical qubit for a virtual qubit.
    pub fn get_physical(&self, virt: QubitId) -> Option<u32> {
        self.virtual_to_physical.get(&virt).copied()
    }

    /// Get the virtual qubit for a physical qubit.
    pub fn get_virtual(&self, physical: u32) -> Option<QubitId> {
        self.physical_to_virtual.get(&physical).copied()
    }

    /// Get the number of mapped qubits.
    pub fn len(&self) -> usize {
        self.virtual_to_physical.len()
    }

    /// Check if the layout is empty.
    pub fn is_empty(&self) -> bool {
        self.virtual_to_physical.is_empty()
    }

    /// Physical qubits for virtual qubits `0..n`, or `None` if any is unmapped.
    #[allow(clippy::cast_possible_truncation)]
    pub fn to_index_vec(&self, n: usize) -> Option<Vec<u32>> {
        (0..n)
            .map(|v| self.get_physical(QubitId(v as u32)))
            .collect()
    }
}

/// Target device coupling map.
///
/// Edges are undirected. All-pairs BFS distances and predecessors are
/// computed on construction, so `distance` and `shortest_path` are cheap
/// during routing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CouplingMap {
    edges: Vec<(u32, u32)>,
    num_qubits: u32,
    #[serde(skip)]
    adjacency: FxHashMap<u32, Vec<u32>>,
    /// `dist_matrix[from][to]`, `u32::MAX` when unreachable.
    #[serde(skip)]
    dist_matrix: Vec<Vec<u32>>,
    /// `pred_matrix[from][to]` is the hop before `to` on a shortest path.
    #[serde(skip)]
    pred_matrix: Vec<Vec<u32>>,
}

impl CouplingMap {
    /// Build from an edge list. Duplicate and reversed edges collapse.
    pub fn from_edges(num_qubits: u32, edges: impl IntoIterator<Item = (u32, u32)>) -> Self {
        let mut map = Self {
            edges: vec![],
            num_qubits,
            adjacency: FxHashMap::default(),
            dist_matrix: vec![],
            pred_matrix: vec![],
        };
        for (a, b) in edges {
            map.add_edge(a, b);
        }
        map.precompute_distances();
        map
    }

    fn add_edge(&mut self, q1: u32, q2: u32) {
        if q1 == q2 || q1 >= self.num_qubits || q2 >= self.num_qubits {
            return;
        }
        if self.is_connected(q1, q2) {
            return;
        }
        self.edges.push((q1, q2));
        self.adjacency.entry(q1).or_default().push(q2);
        self.adjacency.entry(q2).or_default().push(q1);
    }

    fn precompute_distances(&mut self) {
        let n = self.num_qubits as usize;
        self.dist_matrix = vec![vec![u32::MAX; n]; n];
        self.pred_matrix = vec![vec![u32::MAX; n]; n];

        for src in 0..n {
            self.dist_matrix[src][src] = 0;
            let mut queue = VecDeque::new();
            #[allow(clippy::cast_possible_truncation)]
            queue.push_back(src as u32);

            while let Some(current) = queue.pop_front() {
                let cur = current as usize;
                for &neighbor in self.adjacency.get(&current).into_iter().flatten() {
                    let nb = neighbor as usize;
                    if self.dist_matrix[src][nb] == u32::MAX {
                        self.dist_matrix[src][nb] = self.dist_matrix[src][cur] + 1;
                        self.pred_matrix[src][nb] = current;
                        queue.push_back(neighbor);
                    }
                }
            }
        }
    }

    /// Recompute caches after deserialization.
    pub fn rebuild_caches(&mut self) {
        self.adjacency.clear();
        let edges = std::mem::take(&mut self.edges);
        for (a, b) in edges {
            self.add_edge(a, b);
        }
        self.precompute_distances();
    }

    /// Check if two qubits are directly connected.
    #[inline]
    pub fn is_connected(&self, q1: u32, q2: u32) -> bool {
        self.adjacency
            .get(&q1)
            .is_some_and(|neighbors| neighbors.contains(&q2))
    }

    /// Get the number of physical qubits.
    #[inline]
    pub fn num_qubits(&self) -> u32 {
        self.num_qubits
    }

    /// Get the coupling edges.
    pub fn edges(&self) -> &[(u32, u32)] {
        &self.edges
    }

    /// Get neighbors of a qubit.
    pub fn neighbors(&self, qubit: u32) -> impl Iterator<Item = u32> + '_ {
        self.adjacency.get(&qubit).into_iter().flatten().copied()
    }

    /// Linear chain `0-1-2-...`.
    pub fn linear(n: u32) -> Self {
        Self::from_edges(n, (1..n).map(|i| (i - 1, i)))
    }

    /// Every pair connected.
    pub fn full(n: u32) -> Self {
        Self::from_edges(n, (0..n).flat_map(|i| ((i + 1)..n).map(move |j| (i, j))))
    }

    /// Ring `0-1-...-(n-1)-0`.
    pub fn ring(n: u32) -> Self {
        Self::from_edges(n, (0..n).map(|i| (i, (i + 1) % n)))
    }

    /// Shortest hop count between two qubits.
    pub fn distance(&self, from: u32, to: u32) -> Option<u32> {
        let d = *self.dist_matrix.get(from as usize)?.get(to as usize)?;
        (d != u32::MAX).then_some(d)
    }

    /// Shortest path from `from` to `to`, both ends included.
    pub fn shortest_path(&self, from: u32, to: u32) -> Option<Vec<u32>> {
        self.distance(from, to)?;
        let preds = &self.pred_matrix[from as usize];
        let mut path = vec![to];
        let mut current = to;
        while current != from {
            current = preds[current as usize];
            path.push(current);
        }
        path.reverse();
        Some(path)
    }

    /// Check whether every qubit can reach every other.
    pub fn is_connected_graph(&self) -> bool {
        (0..self.num_qubits).all(|q| self.distance(0, q).is_some())
    }
}

/// Native gate names of a target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BasisGates {
    gates: Vec<String>,
}

impl BasisGates {
    /// Create from gate names.
    pub fn new(gates: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            gates: gates.into_iter().map(Into::into).collect(),
        }
    }

    /// Check whether a gate name is native.
    pub fn contains(&self, gate: &str) -> bool {
        self.gates.iter().any(|g| g == gate)
    }

    /// The gate names.
    pub fn gates(&self) -> &[String] {
        &self.gates
    }

    /// IBM Falcon-style basis: `rz`, `sx`, `x`, `cx`.
    pub fn ibm() -> Self {
        Self::new(["id", "rz", "sx", "x", "cx", "measure", "barrier", "reset"])
    }

    /// IBM Eagle-style basis with `ecr` entangler.
    pub fn eagle() -> Self {
        Self::new(["id", "rz", "sx", "x", "ecr", "measure", "barrier", "reset"])
    }

    /// IBM Heron-style basis with `cz` entangler.
    pub fn heron() -> Self {
        Self::new(["id", "rz", "sx", "x", "cz", "measure", "barrier", "reset"])
    }
}

/// Description of a compilation target.
#[derive(Debug, Clone)]
pub struct Target {
    /// Number of physical qubits.
    pub num_qubits: u32,
    /// Connectivity; `None` means all-to-all.
    pub coupling_map: Option<CouplingMap>,
    /// Native gates; `None` means any standard gate is accepted.
    pub basis_gates: Option<BasisGates>,
}

impl Target {
    /// A target with the given connectivity and gates.
    pub fn new(coupling_map: CouplingMap, basis_gates: BasisGates) -> Self {
        Self {
            num_qubits: coupling_map.num_qubits(),
            coupling_map: Some(coupling_map),
            basis_gates: Some(basis_gates),
        }
    }

    /// An ideal all-to-all target accepting every gate.
    pub fn ideal(num_qubits: u32) -> Self {
        Self {
            num_qubits,
            coupling_map: None,
            basis_gates: None,
        }
    }
}

/// Shared state threaded through a pass-manager run.
#[derive(Debug, Clone, Default)]
pub struct PropertySet {
    /// Initial virtual→physical layout, set by the layout pass.
    pub layout: Option<Layout>,
    /// Virtual→physical mapping after routing.
    pub final_layout: Option<Layout>,
    /// Device connectivity.
    pub coupling_map: Option<CouplingMap>,
    /// Native gate set.
    pub basis_gates: Option<BasisGates>,
    /// Number of virtual qubits before layout.
    pub num_virtual_qubits: Option<usize>,
}

impl PropertySet {
    /// Create an empty property set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set coupling map and basis gates.
    #[must_use]
    pub fn with_target(mut self, coupling_map: CouplingMap, basis_gates: BasisGates) -> Self {
        self.coupling_map = Some(coupling_map);
        self.basis_gates = Some(basis_gates);
        self
    }

    /// Seed from a [`Target`].
    pub fn from_target(target: &Target) -> Self {
        Self {
            coupling_map: target.coupling_map.clone(),
            basis_gates: target.basis_gates.clone(),
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_trivial() {
        let layout = Layout::trivial(3);
        assert_eq!(layout.len(), 3);
        assert_eq!(layout.get_physical(QubitId(2)), Some(2));
        assert_eq!(layout.get_virtual(1), Some(QubitId(1)));
    }

    #[test]
    fn test_layout_remap_drops_stale_entries() {
        let mut layout = Layout::trivial(2);
        layout.add(QubitId(0), 1);
        assert_eq!(layout.get_physical(QubitId(0)), Some(1));
        assert_eq!(layout.get_physical(QubitId(1)), None);
        assert_eq!(layout.get_virtual(0), None);
        assert_eq!(layout.to_index_vec(2), None);
    }

    #[test]
    fn test_coupling_map_linear() {
        let map = CouplingMap::linear(5);
        assert_eq!(map.edges().len(), 4);
        assert!(map.is_connected(2, 3));
        assert!(!map.is_connected(0, 2));
        assert_eq!(map.distance(0, 4), Some(4));
        assert_eq!(map.shortest_path(0, 3), Some(vec![0, 1, 2, 3]));
        assert!(map.is_connected_graph());
    }

    #[test]
    fn test_coupling_map_disconnected() {
        let map = CouplingMap::from_edges(4, [(0, 1), (2, 3)]);
        assert_eq!(map.distance(0, 3), None);
        assert_eq!(map.shortest_path(1, 2), None);
        assert!(!map.is_connected_graph());
    }

    #[test]
    fn test_coupling_map_dedup() {
        let map = CouplingMap::from_edges(3, [(0, 1), (1, 0), (1, 1), (1, 2), (2, 9)]);
        assert_eq!(map.edges(), &[(0, 1), (1, 2)]);
        assert_eq!(CouplingMap::ring(4).distance(0, 3), Some(1));
        assert_eq!(CouplingMap::full(4).edges().len(), 6);
    }

    #[test]
    fn test_basis_gates() {
        assert!(BasisGates::ibm().contains("cx"));
        assert!(!BasisGates::ibm().contains("h"));
        assert!(BasisGates::heron().contains("cz"));
    }
}
