//! Transpilation of qrun circuits onto device targets.
//!
//! A circuit is lowered by a sequence of passes sharing a [`PropertySet`]:
//!
//! ```text
//! Circuit
//!    │
//!    ├── TrivialLayout        virtual qubit i → physical qubit i
//!    ├── Unroll3q             Toffolis → 1q/2q gates
//!    ├── SwapRouting          SWAPs along shortest paths, final layout
//!    ├── BasisTranslation     rz / sx / x / cx (or cz)
//!    └── CancelAdjacent + Optimize1qRotations   (level ≥ 1, once per level)
//!    │
//!    ▼
//! CompiledCircuit { circuit, layout }
//! ```
//!
//! # Example
//!
//! ```rust
//! use qrun_compile::{BasisGates, CouplingMap, Target, generate_preset_pass_manager};
//! use qrun_ir::Circuit;
//!
//! let target = Target::new(CouplingMap::linear(5), BasisGates::ibm());
//! let pm = generate_preset_pass_manager(&target, 1);
//!
//! let compiled = pm.run(&Circuit::bell().unwrap()).unwrap();
//! assert_eq!(compiled.circuit.num_qubits(), 5);
//! assert_eq!(compiled.layout.final_index_layout(), &[0, 1]);
//! ```
//!
//! # Custom passes
//!
//! ```rust
//! use qrun_compile::{CompileResult, Pass, PassKind, PropertySet};
//! use qrun_ir::CircuitDag;
//!
//! struct CountOps;
//!
//! impl Pass for CountOps {
//!     fn name(&self) -> &str { "count_ops" }
//!     fn kind(&self) -> PassKind { PassKind::Analysis }
//!
//!     fn run(&self, dag: &mut CircuitDag, _props: &mut PropertySet) -> CompileResult<()> {
//!         println!("{} ops", dag.num_ops());
//!         Ok(())
//!     }
//! }
//! ```

pub mod error;
pub mod manager;
pub mod pass;
pub mod passes;
pub mod property;

pub use error::{CompileError, CompileResult};
pub use manager::{
    CompiledCircuit, PassManager, PassManagerBuilder, PresetPassManager, TranspileLayout,
    generate_preset_pass_manager,
};
pub use pass::{Pass, PassKind};
pub use property::{BasisGates, CouplingMap, Layout, PropertySet, Target};
