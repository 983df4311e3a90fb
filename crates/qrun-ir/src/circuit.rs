//! High-level circuit builder API.

use crate::dag::CircuitDag;
use crate::error::{IrError, IrResult};
use crate::gate::StandardGate;
use crate::instruction::Instruction;
use crate::qubit::{ClbitId, QubitId};

/// Name of the classical register created by [`Circuit::measure_all`].
pub const MEASURE_ALL_REGISTER: &str = "meas";

/// A quantum circuit.
///
/// Thin builder over [`CircuitDag`]. Qubits and classical bits are
/// numbered densely from zero; every gate method validates its operands
/// and returns `&mut Self` so calls can be chained with `?`.
#[derive(Debug, Clone)]
pub struct Circuit {
    name: String,
    /// Name of the classical register, used when emitting OpenQASM.
    creg_name: String,
    dag: CircuitDag,
}

impl Circuit {
    /// Create a new empty circuit.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            creg_name: "c".into(),
            dag: CircuitDag::new(),
        }
    }

    /// Create a circuit with a given number of qubits and classical bits.
    pub fn with_size(name: impl Into<String>, num_qubits: u32, num_clbits: u32) -> Self {
        let mut circuit = Self::new(name);
        for _ in 0..num_qubits {
            circuit.add_qubit();
        }
        for _ in 0..num_clbits {
            circuit.add_clbit();
        }
        circuit
    }

    /// Add a single qubit to the circuit.
    #[allow(clippy::cast_possible_truncation)]
    pub fn add_qubit(&mut self) -> QubitId {
        let id = QubitId(self.dag.num_qubits() as u32);
        self.dag.add_qubit(id);
        id
    }

    /// Add a single classical bit to the circuit.
    #[allow(clippy::cast_possible_truncation)]
    pub fn add_clbit(&mut self) -> ClbitId {
        let id = ClbitId(self.dag.num_clbits() as u32);
        self.dag.add_clbit(id);
        id
    }

    fn apply_gate(
        &mut self,
        gate: StandardGate,
        qubits: impl IntoIterator<Item = QubitId>,
    ) -> IrResult<&mut Self> {
        self.dag.apply(Instruction::gate(gate, qubits))?;
        Ok(self)
    }

    // =========================================================================
    // Single-qubit gates
    // =========================================================================

    /// Apply Hadamard gate.
    pub fn h(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.apply_gate(StandardGate::H, [qubit])
    }

    /// Apply Pauli-X gate.
    pub fn x(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.apply_gate(StandardGate::X, [qubit])
    }

    /// Apply Pauli-Y gate.
    pub fn y(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.apply_gate(StandardGate::Y, [qubit])
    }

    /// Apply Pauli-Z gate.
    pub fn z(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.apply_gate(StandardGate::Z, [qubit])
    }

    /// Apply S gate.
    pub fn s(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.apply_gate(StandardGate::S, [qubit])
    }

    /// Apply T gate.
    pub fn t(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.apply_gate(StandardGate::T, [qubit])
    }

    /// Apply sqrt(X) gate.
    pub fn sx(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.apply_gate(StandardGate::SX, [qubit])
    }

    /// Apply RX rotation.
    pub fn rx(&mut self, theta: f64, qubit: QubitId) -> IrResult<&mut Self> {
        self.apply_gate(StandardGate::Rx(theta), [qubit])
    }

    /// Apply RY rotation.
    pub fn ry(&mut self, theta: f64, qubit: QubitId) -> IrResult<&mut Self> {
        self.apply_gate(StandardGate::Ry(theta), [qubit])
    }

    /// Apply RZ rotation.
    pub fn rz(&mut self, theta: f64, qubit: QubitId) -> IrResult<&mut Self> {
        self.apply_gate(StandardGate::Rz(theta), [qubit])
    }

    /// Apply phase gate.
    pub fn p(&mut self, lambda: f64, qubit: QubitId) -> IrResult<&mut Self> {
        self.apply_gate(StandardGate::P(lambda), [qubit])
    }

    // =========================================================================
    // Multi-qubit gates
    // =========================================================================

    /// Apply CNOT gate.
    pub fn cx(&mut self, control: QubitId, target: QubitId) -> IrResult<&mut Self> {
        self.apply_gate(StandardGate::CX, [control, target])
    }

    /// Apply controlled-Z gate.
    pub fn cz(&mut self, control: QubitId, target: QubitId) -> IrResult<&mut Self> {
        self.apply_gate(StandardGate::CZ, [control, target])
    }

    /// Apply controlled-phase gate.
    pub fn cp(&mut self, lambda: f64, control: QubitId, target: QubitId) -> IrResult<&mut Self> {
        self.apply_gate(StandardGate::CP(lambda), [control, target])
    }

    /// Apply SWAP gate.
    pub fn swap(&mut self, q1: QubitId, q2: QubitId) -> IrResult<&mut Self> {
        self.apply_gate(StandardGate::Swap, [q1, q2])
    }

    /// Apply Toffoli gate.
    pub fn ccx(&mut self, c1: QubitId, c2: QubitId, target: QubitId) -> IrResult<&mut Self> {
        self.apply_gate(StandardGate::CCX, [c1, c2, target])
    }

    /// Apply any standard gate.
    pub fn gate(
        &mut self,
        gate: StandardGate,
        qubits: impl IntoIterator<Item = QubitId>,
    ) -> IrResult<&mut Self> {
        self.apply_gate(gate, qubits)
    }

    // =========================================================================
    // Non-unitary operations
    // =========================================================================

    /// Measure a qubit into a classical bit.
    pub fn measure(&mut self, qubit: QubitId, clbit: ClbitId) -> IrResult<&mut Self> {
        self.dag.apply(Instruction::measure(qubit, clbit))?;
        Ok(self)
    }

    /// Measure every qubit into a fresh classical register.
    ///
    /// Adds a barrier over all qubits, then one new classical bit per qubit
    /// in a register named [`MEASURE_ALL_REGISTER`]; qubit `i` lands in the
    /// `i`-th new bit.
    pub fn measure_all(&mut self) -> IrResult<&mut Self> {
        let qubits = self.dag.qubits();
        if self.dag.num_clbits() == 0 {
            self.creg_name = MEASURE_ALL_REGISTER.into();
        }
        let clbits: Vec<ClbitId> = qubits.iter().map(|_| self.add_clbit()).collect();
        self.dag.apply(Instruction::barrier(qubits.iter().copied()))?;
        self.dag.apply(Instruction::measure_many(qubits, clbits)?)?;
        Ok(self)
    }

    /// Reset a qubit to |0⟩.
    pub fn reset(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.dag.apply(Instruction::reset(qubit))?;
        Ok(self)
    }

    /// Add a barrier on the given qubits.
    pub fn barrier(&mut self, qubits: impl IntoIterator<Item = QubitId>) -> IrResult<&mut Self> {
        self.dag.apply(Instruction::barrier(qubits))?;
        Ok(self)
    }

    /// Append `other` onto this circuit, sending its qubit `i` to `qubits[i]`.
    ///
    /// `other` must be purely quantum.
    pub fn compose(&mut self, other: &Circuit, qubits: &[QubitId]) -> IrResult<&mut Self> {
        if qubits.len() != other.num_qubits() {
            return Err(IrError::InvalidDag(format!(
                "compose: '{}' has {} qubits but {} were given",
                other.name,
                other.num_qubits(),
                qubits.len()
            )));
        }
        if other.num_clbits() > 0 {
            return Err(IrError::InvalidDag(format!(
                "compose: '{}' has classical bits",
                other.name
            )));
        }
        for (_, inst) in other.dag.topological_ops() {
            self.dag.apply(inst.remap_qubits(|q| qubits[q.index()]))?;
        }
        let phase = self.dag.global_phase() + other.dag.global_phase();
        self.dag.set_global_phase(phase);
        Ok(self)
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Get the circuit name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the classical register name.
    pub fn creg_name(&self) -> &str {
        &self.creg_name
    }

    /// Get the number of qubits.
    pub fn num_qubits(&self) -> usize {
        self.dag.num_qubits()
    }

    /// Get the number of classical bits.
    pub fn num_clbits(&self) -> usize {
        self.dag.num_clbits()
    }

    /// Global phase in radians.
    pub fn global_phase(&self) -> f64 {
        self.dag.global_phase()
    }

    /// Set the global phase.
    pub fn set_global_phase(&mut self, phase: f64) {
        self.dag.set_global_phase(phase);
    }

    /// Get the circuit depth.
    pub fn depth(&self) -> usize {
        self.dag.depth()
    }

    /// Instructions in topological order.
    pub fn instructions(&self) -> impl Iterator<Item = &Instruction> {
        self.dag.topological_ops().map(|(_, inst)| inst)
    }

    /// Check whether the circuit ends by measuring every qubit.
    pub fn has_terminal_measurement(&self) -> bool {
        let mut measured = vec![false; self.num_qubits()];
        let mut touched_after = false;
        for inst in self.instructions() {
            if inst.is_measure() {
                for q in &inst.qubits {
                    measured[q.index()] = true;
                }
            } else if !inst.is_barrier() && inst.qubits.iter().any(|q| measured[q.index()]) {
                touched_after = true;
            }
        }
        !measured.is_empty() && measured.iter().all(|&m| m) && !touched_after
    }

    /// Get a reference to the DAG.
    pub fn dag(&self) -> &CircuitDag {
        &self.dag
    }

    /// Convert into the DAG.
    pub fn into_dag(self) -> CircuitDag {
        self.dag
    }

    /// Wrap a DAG as a circuit.
    pub fn from_dag(name: impl Into<String>, dag: CircuitDag) -> Self {
        Self {
            name: name.into(),
            creg_name: "c".into(),
            dag,
        }
    }

    /// Replace the DAG, keeping name and register naming.
    #[must_use]
    pub fn with_dag(&self, dag: CircuitDag) -> Self {
        Self {
            name: self.name.clone(),
            creg_name: self.creg_name.clone(),
            dag,
        }
    }

    // =========================================================================
    // Prebuilt circuits
    // =========================================================================

    /// Two-qubit Bell-state preparation: `H(0); CX(0, 1)`.
    pub fn bell() -> IrResult<Self> {
        let mut circuit = Self::with_size("bell", 2, 0);
        circuit.h(QubitId(0))?.cx(QubitId(0), QubitId(1))?;
        Ok(circuit)
    }
}
