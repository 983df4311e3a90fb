//! Pass trait and types for compilation passes.

use qrun_ir::CircuitDag;

use crate::error::CompileResult;
use crate::property::PropertySet;

/// The kind of compilation pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassKind {
    /// Reads the DAG and writes to the `PropertySet`.
    Analysis,
    /// Rewrites the DAG.
    Transformation,
}

/// A compilation pass that operates on a circuit DAG.
pub trait Pass: Send + Sync {
    /// Get the name of this pass.
    fn name(&self) -> &str;

    /// Get the kind of this pass.
    fn kind(&self) -> PassKind;

    /// Run the pass on the given DAG.
    ///
    /// Analysis passes leave the DAG untouched and record their findings
    /// in `properties`; transformation passes rewrite the DAG and may read
    /// (and, for layout tracking, update) `properties`.
    fn run(&self, dag: &mut CircuitDag, properties: &mut PropertySet) -> CompileResult<()>;

    /// Check if this pass should run based on current state.
    fn should_run(&self, _dag: &CircuitDag, _properties: &PropertySet) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct TestPass;

    impl Pass for TestPass {
        fn name(&self) -> &'static str {
            "test"
        }

        fn kind(&self) -> PassKind {
            PassKind::Analysis
        }

        fn run(&self, _dag: &mut CircuitDag, _properties: &mut PropertySet) -> CompileResult<()> {
            Ok(())
        }
    }

    #[test]
    fn test_pass_defaults() {
        let pass = TestPass;
        assert_eq!(pass.kind(), PassKind::Analysis);
        assert_eq!(pass.name(), "test");
        assert!(pass.should_run(&CircuitDag::new(), &PropertySet::new()));
    }
}
