//! Boolean-expression oracles and Grover search for qrun.
//!
//! A secret bitstring is turned into a conjunction of literals, parsed
//! into a [`BooleanExpression`], compiled into a [`PhaseOracle`] and
//! wrapped in a [`GroverOperator`]:
//!
//! ```rust
//! use qrun_oracle::{GroverOperator, PhaseOracle, secret_to_expression};
//!
//! let expression = secret_to_expression("11").unwrap();
//! assert_eq!(expression, "x0 & x1");
//!
//! let oracle: PhaseOracle = expression.parse().unwrap();
//! let grover = GroverOperator::new(oracle).unwrap();
//! let iterations = grover.optimal_iterations().unwrap();
//! let circuit = grover.search_circuit(iterations).unwrap();
//! assert_eq!(circuit.num_qubits(), 2);
//! ```
//!
//! Multi-controlled gates are synthesized exactly (see [`synth`]), so the
//! oracle is correct for any number of variables up to
//! [`expr::MAX_VARIABLES`].

pub mod error;
pub mod expr;
pub mod grover;
pub mod oracle;
pub mod synth;

pub use error::{OracleError, OracleResult};
pub use expr::{BooleanExpression, Expr, secret_to_expression};
pub use grover::{GroverOperator, optimal_iterations};
pub use oracle::PhaseOracle;
