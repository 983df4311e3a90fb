//! Layout passes for mapping virtual qubits to physical qubits.

use qrun_ir::CircuitDag;
use tracing::debug;

use crate::error::{CompileError, CompileResult};
use crate::pass::{Pass, PassKind};
use crate::property::{Layout, PropertySet};

/// Trivial layout pass.
///
/// Maps virtual qubit `i` to physical qubit `i`. The DAG itself is left
/// alone; [`SwapRouting`](super::SwapRouting) applies the layout while it
/// routes.
pub struct TrivialLayout;

impl Pass for TrivialLayout {
    fn name(&self) -> &'static str {
        "TrivialLayout"
    }

    fn kind(&self) -> PassKind {
        PassKind::Analysis
    }

    #[allow(clippy::cast_possible_truncation)]
    fn run(&self, dag: &mut CircuitDag, properties: &mut PropertySet) -> CompileResult<()> {
        let coupling_map = properties
            .coupling_map
            .as_ref()
            .ok_or(CompileError::MissingCouplingMap)?;

        let num_virtual = dag.num_qubits();
        if num_virtual > coupling_map.num_qubits() as usize {
            return Err(CompileError::CircuitTooLarge {
                required: num_virtual,
                available: coupling_map.num_qubits(),
            });
        }

        let mut layout = Layout::new();
        for (p, v) in dag.qubits().into_iter().enumerate() {
            layout.add(v, p as u32);
        }
        debug!(virtual_qubits = num_virtual, "trivial layout");

        properties.layout = Some(layout);
        properties.num_virtual_qubits = Some(num_virtual);
        Ok(())
    }

    fn should_run(&self, _dag: &CircuitDag, properties: &PropertySet) -> bool {
        properties.layout.is_none() && properties.coupling_map.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::property::{BasisGates, CouplingMap};
    use qrun_ir::{Circuit, CircuitLevel, QubitId};

    #[test]
    fn test_trivial_layout() {
        let mut circuit = Circuit::with_size("test", 3, 0);
        circuit.h(QubitId(0)).unwrap();
        let mut dag = circuit.into_dag();

        let mut props = PropertySet::new().with_target(CouplingMap::linear(5), BasisGates::ibm());
        TrivialLayout.run(&mut dag, &mut props).unwrap();

        let layout = props.layout.as_ref().unwrap();
        assert_eq!(layout.to_index_vec(3), Some(vec![0, 1, 2]));
        assert_eq!(props.num_virtual_qubits, Some(3));
        assert_eq!(dag.level(), CircuitLevel::Logical);
        assert!(!TrivialLayout.should_run(&dag, &props));
    }

    #[test]
    fn test_trivial_layout_too_large() {
        let mut dag = Circuit::with_size("test", 10, 0).into_dag();
        let mut props = PropertySet::new().with_target(CouplingMap::linear(5), BasisGates::ibm());

        let result = TrivialLayout.run(&mut dag, &mut props);
        assert!(matches!(
            result,
            Err(CompileError::CircuitTooLarge {
                required: 10,
                available: 5
            })
        ));
    }

    #[test]
    fn test_trivial_layout_needs_coupling_map() {
        let mut dag = Circuit::with_size("test", 2, 0).into_dag();
        let result = TrivialLayout.run(&mut dag, &mut PropertySet::new());
        assert!(matches!(result, Err(CompileError::MissingCouplingMap)));
    }
}
