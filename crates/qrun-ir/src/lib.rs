//! qrun Circuit Intermediate Representation
//!
//! Core data structures for the qrun pipeline: circuits, gates, the DAG
//! they are stored in, Pauli observables and a text drawer.
//!
//! # Overview
//!
//! Circuits are stored as a DAG (Directed Acyclic Graph) so compiler
//! passes can reason about wire dependencies. The high-level [`Circuit`]
//! API provides a builder for constructing them.
//!
//! # Example: Building a Bell State
//!
//! ```rust
//! use qrun_ir::{Circuit, QubitId};
//!
//! let mut circuit = Circuit::with_size("bell_state", 2, 0);
//! circuit.h(QubitId(0)).unwrap();
//! circuit.cx(QubitId(0), QubitId(1)).unwrap();
//! circuit.measure_all().unwrap();
//!
//! assert_eq!(circuit.num_qubits(), 2);
//! assert_eq!(circuit.num_clbits(), 2);
//! println!("{circuit}");
//! ```
//!
//! # Observables
//!
//! ```rust
//! use qrun_ir::Observable;
//!
//! let z1 = Observable::from_label("ZI").unwrap();
//! // Virtual qubit 0 sits on physical 4, virtual 1 on physical 2.
//! let mapped = z1.apply_layout(&[4, 2], 5).unwrap();
//! assert_eq!(mapped.label(), "IIZII");
//! ```
//!
//! # Supported Gates
//!
//! | Gate | Qubits | Description |
//! |------|--------|-------------|
//! | `H` | 1 | Hadamard gate |
//! | `X`, `Y`, `Z` | 1 | Pauli gates |
//! | `S`, `Sdg`, `T`, `Tdg` | 1 | Phase Cliffords and T |
//! | `SX`, `SXdg` | 1 | sqrt(X) and its inverse |
//! | `Rx`, `Ry`, `Rz`, `P` | 1 | Rotation and phase gates |
//! | `CX`, `CZ`, `CP` | 2 | Controlled gates |
//! | `Swap` | 2 | SWAP gate |
//! | `CCX` | 3 | Toffoli (CCNOT) gate |

pub mod circuit;
pub mod dag;
pub mod draw;
pub mod error;
pub mod gate;
pub mod instruction;
pub mod observable;
pub mod qubit;

pub use circuit::{Circuit, MEASURE_ALL_REGISTER};
pub use dag::{CircuitDag, CircuitLevel, DagEdge, DagNode, NodeIndex, WireId};
pub use draw::{DrawOptions, draw, draw_with};
pub use error::{IrError, IrResult};
pub use gate::{StandardGate, format_angle};
pub use instruction::{Instruction, InstructionKind};
pub use observable::{Observable, Pauli, z_ladder_labels};
pub use qubit::{ClbitId, QubitId};
