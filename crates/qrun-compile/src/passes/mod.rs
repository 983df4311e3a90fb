//! Built-in compilation passes.
//!
//! Passes are organized into two categories:
//! - [`agnostic`]: passes that operate purely on DAG structure
//! - [`target`]: passes that need the coupling map, basis gates or layout

pub mod agnostic;
pub mod target;

pub use agnostic::{CancelAdjacent, Optimize1qRotations, Unroll3q};
pub use target::{BasisTranslation, SwapRouting, TrivialLayout};
