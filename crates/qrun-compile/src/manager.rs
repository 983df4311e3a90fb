//! Pass manager for orchestrating compilation.

use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use qrun_ir::{Circuit, CircuitDag};

use crate::error::{CompileError, CompileResult};
use crate::pass::Pass;
use crate::passes::{
    BasisTranslation, CancelAdjacent, Optimize1qRotations, SwapRouting, TrivialLayout, Unroll3q,
};
use crate::property::{BasisGates, CouplingMap, PropertySet, Target};

/// Manages and executes a sequence of compilation passes.
pub struct PassManager {
    /// The passes to execute, in order.
    passes: Vec<Box<dyn Pass>>,
}

impl PassManager {
    /// Create a new empty pass manager.
    pub fn new() -> Self {
        Self { passes: vec![] }
    }

    /// Add a pass to the manager.
    pub fn add_pass(&mut self, pass: impl Pass + 'static) {
        self.passes.push(Box::new(pass));
    }

    /// Run all passes on the given DAG.
    #[instrument(skip(self, dag, properties))]
    pub fn run(&self, dag: &mut CircuitDag, properties: &mut PropertySet) -> CompileResult<()> {
        info!(
            "Running pass manager with {} passes on circuit with {} qubits",
            self.passes.len(),
            dag.num_qubits()
        );

        for pass in &self.passes {
            if pass.should_run(dag, properties) {
                debug!("Running pass: {}", pass.name());
                pass.run(dag, properties)?;
                debug!("Pass {} completed, ops: {}", pass.name(), dag.num_ops());
            } else {
                debug!("Skipping pass: {}", pass.name());
            }
        }

        info!(
            "Pass manager completed, final depth: {}, ops: {}",
            dag.depth(),
            dag.num_ops()
        );

        Ok(())
    }

    /// Names of the passes, in run order.
    pub fn pass_names(&self) -> Vec<&str> {
        self.passes.iter().map(|p| p.name()).collect()
    }

    /// Get the number of passes.
    pub fn len(&self) -> usize {
        self.passes.len()
    }

    /// Check if the manager has no passes.
    pub fn is_empty(&self) -> bool {
        self.passes.is_empty()
    }
}

impl Default for PassManager {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for creating pass managers with preset configurations.
pub struct PassManagerBuilder {
    /// Optimization level (0-3).
    optimization_level: u8,
    /// Target properties.
    properties: PropertySet,
}

impl PassManagerBuilder {
    /// Create a new builder with default settings.
    pub fn new() -> Self {
        Self {
            optimization_level: 1,
            properties: PropertySet::new(),
        }
    }

    /// Set the optimization level, clamped to 0..=3.
    ///
    /// - Level 0: layout, routing and translation only
    /// - Level 1: plus one round of peephole optimization (default)
    /// - Levels 2 and 3: two and three rounds
    #[must_use]
    pub fn with_optimization_level(mut self, level: u8) -> Self {
        self.optimization_level = level.min(3);
        self
    }

    /// Set the target properties.
    #[must_use]
    pub fn with_properties(mut self, properties: PropertySet) -> Self {
        self.properties = properties;
        self
    }

    /// Set the target coupling map and basis gates.
    #[must_use]
    pub fn with_target(mut self, coupling_map: CouplingMap, basis_gates: BasisGates) -> Self {
        self.properties.coupling_map = Some(coupling_map);
        self.properties.basis_gates = Some(basis_gates);
        self
    }

    /// Build the pass manager and return it with the properties.
    pub fn build(self) -> (PassManager, PropertySet) {
        let mut pm = PassManager::new();

        if self.properties.coupling_map.is_some() {
            pm.add_pass(TrivialLayout);
            pm.add_pass(Unroll3q);
            pm.add_pass(SwapRouting);
        }

        if self.properties.basis_gates.is_some() {
            pm.add_pass(BasisTranslation);
        }

        for _ in 0..self.optimization_level {
            pm.add_pass(CancelAdjacent);
            pm.add_pass(Optimize1qRotations);
        }

        (pm, self.properties)
    }
}

impl Default for PassManagerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Where the virtual qubits of a compiled circuit live.
///
/// Entry `v` of each index layout is the physical qubit holding virtual
/// qubit `v`: `initial` before the first gate, `final` after the last
/// (routing swaps move qubits around).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranspileLayout {
    initial: Vec<u32>,
    #[serde(rename = "final")]
    final_: Vec<u32>,
    num_physical: u32,
}

impl TranspileLayout {
    /// Build from explicit index layouts.
    pub fn new(initial: Vec<u32>, final_: Vec<u32>, num_physical: u32) -> Self {
        Self {
            initial,
            final_,
            num_physical,
        }
    }

    /// Virtual qubit `v` on physical qubit `v` throughout.
    #[allow(clippy::cast_possible_truncation)]
    pub fn identity(num_qubits: usize) -> Self {
        let ids: Vec<u32> = (0..num_qubits as u32).collect();
        Self::new(ids.clone(), ids, num_qubits as u32)
    }

    /// Physical qubit of each virtual qubit before execution.
    pub fn initial_index_layout(&self) -> &[u32] {
        &self.initial
    }

    /// Physical qubit of each virtual qubit at the end of the circuit.
    pub fn final_index_layout(&self) -> &[u32] {
        &self.final_
    }

    /// Width of the compiled circuit.
    pub fn num_physical_qubits(&self) -> u32 {
        self.num_physical
    }
}

/// A circuit lowered onto a target, plus its layout.
#[derive(Debug, Clone)]
pub struct CompiledCircuit {
    /// The backend-executable circuit.
    pub circuit: Circuit,
    /// Virtual→physical mapping.
    pub layout: TranspileLayout,
}

/// A pass manager bound to one target and optimization level.
pub struct PresetPassManager {
    target: Target,
    optimization_level: u8,
    manager: PassManager,
    properties: PropertySet,
}

/// Build the standard pipeline for `target`.
///
/// Layout and routing run when the target has a coupling map, basis
/// translation when it has basis gates. `optimization_level` is clamped
/// to 0..=3.
pub fn generate_preset_pass_manager(target: &Target, optimization_level: u8) -> PresetPassManager {
    let optimization_level = optimization_level.min(3);
    let (manager, properties) = PassManagerBuilder::new()
        .with_optimization_level(optimization_level)
        .with_properties(PropertySet::from_target(target))
        .build();
    PresetPassManager {
        target: target.clone(),
        optimization_level,
        manager,
        properties,
    }
}

impl PresetPassManager {
    /// Compile `circuit` for the target.
    #[instrument(skip_all, fields(circuit = circuit.name(), level = self.optimization_level))]
    pub fn run(&self, circuit: &Circuit) -> CompileResult<CompiledCircuit> {
        let num_virtual = circuit.num_qubits();
        if self.target.coupling_map.is_none() && num_virtual > self.target.num_qubits as usize {
            return Err(CompileError::CircuitTooLarge {
                required: num_virtual,
                available: self.target.num_qubits,
            });
        }

        let mut dag = circuit.dag().clone();
        let mut properties = self.properties.clone();
        self.manager.run(&mut dag, &mut properties)?;

        let layout = match (&properties.layout, &properties.final_layout) {
            (Some(initial), Some(final_layout)) => {
                #[allow(clippy::cast_possible_truncation)]
                let num_physical = dag.num_qubits() as u32;
                TranspileLayout::new(
                    initial
                        .to_index_vec(num_virtual)
                        .ok_or(CompileError::MissingLayout)?,
                    final_layout
                        .to_index_vec(num_virtual)
                        .ok_or(CompileError::MissingLayout)?,
                    num_physical,
                )
            }
            _ => TranspileLayout::identity(num_virtual),
        };

        info!(
            ops = dag.num_ops(),
            depth = dag.depth(),
            "compiled circuit '{}'",
            circuit.name()
        );
        Ok(CompiledCircuit {
            circuit: circuit.with_dag(dag),
            layout,
        })
    }

    /// The target this manager compiles for.
    pub fn target(&self) -> &Target {
        &self.target
    }

    /// The clamped optimization level.
    pub fn optimization_level(&self) -> u8 {
        self.optimization_level
    }

    /// The underlying pass sequence.
    pub fn pass_manager(&self) -> &PassManager {
        &self.manager
    }
}
