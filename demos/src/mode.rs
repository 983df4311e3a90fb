//! Execution mode selection.

use std::fmt;
use std::str::FromStr;

use crate::error::PipelineError;

/// Which primitive a program runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExecutionMode {
    /// Measure every qubit and return counts.
    Sampler,
    /// Estimate expectation values of observables.
    Estimator,
}

impl ExecutionMode {
    /// Lowercase name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Sampler => "sampler",
            Self::Estimator => "estimator",
        }
    }
}

impl FromStr for ExecutionMode {
    type Err = PipelineError;

    /// Case-insensitive, surrounding whitespace ignored.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sampler" => Ok(Self::Sampler),
            "estimator" => Ok(Self::Estimator),
            _ => Err(PipelineError::InvalidMode(s.to_string())),
        }
    }
}

impl fmt::Display for ExecutionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
