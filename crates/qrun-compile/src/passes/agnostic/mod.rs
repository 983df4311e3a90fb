//! Target-agnostic compilation passes.
//!
//! These passes never consult the coupling map or basis gates and are
//! safe to run on any circuit.

pub mod optimization;
pub mod unroll;

pub use optimization::{CancelAdjacent, Optimize1qRotations};
pub use unroll::Unroll3q;
