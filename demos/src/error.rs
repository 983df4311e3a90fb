//! Pipeline errors.

use thiserror::Error;

use qrun_adapter_ibm::IbmError;
use qrun_compile::CompileError;
use qrun_hal::HalError;
use qrun_ir::IrError;
use qrun_oracle::OracleError;

/// Result type for pipeline operations.
pub type PipelineResult<T> = Result<T, PipelineError>;

/// Anything that can stop a demo program.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum PipelineError {
    /// The execution mode was not `sampler` or `estimator`.
    #[error("Invalid mode '{0}': expected 'sampler' or 'estimator'")]
    InvalidMode(String),

    /// The secret or its expression could not be compiled.
    #[error(transparent)]
    Oracle(#[from] OracleError),

    /// Circuit construction failed.
    #[error(transparent)]
    Ir(#[from] IrError),

    /// The circuit could not be adapted to the device.
    #[error("Compilation failed: {0}")]
    Compile(#[from] CompileError),

    /// Service or job failure.
    #[error(transparent)]
    Hal(#[from] HalError),

    /// IBM client setup failed.
    #[error(transparent)]
    Ibm(#[from] IbmError),

    /// The service returned a result of the wrong shape.
    #[error("Unexpected result: {0}")]
    UnexpectedResult(String),
}
