//! Device descriptions and least-busy selection.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

use qrun_compile::{BasisGates, CouplingMap, Target};

use crate::error::{HalError, HalResult};

/// What a service reports about one device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackendDescriptor {
    /// Device name, e.g. `ibm_brisbane`.
    pub name: String,
    /// Number of physical qubits.
    pub num_qubits: u32,
    /// Whether this is a simulator.
    pub simulator: bool,
    /// Whether the device accepts jobs right now.
    pub operational: bool,
    /// Jobs waiting ahead of a new submission.
    pub pending_jobs: u32,
    /// Native gate names.
    #[serde(default)]
    pub basis_gates: Vec<String>,
    /// Coupled physical qubit pairs; empty means all-to-all.
    #[serde(default)]
    pub coupling_map: Vec<[u32; 2]>,
    /// Free-form status message from the provider.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_msg: Option<String>,
}

impl BackendDescriptor {
    /// The compilation target for this device.
    pub fn to_target(&self) -> Target {
        let coupling_map = (!self.coupling_map.is_empty()).then(|| {
            CouplingMap::from_edges(
                self.num_qubits,
                self.coupling_map.iter().map(|[a, b]| (*a, *b)),
            )
        });
        let basis_gates =
            (!self.basis_gates.is_empty()).then(|| BasisGates::new(self.basis_gates.iter().cloned()));
        Target {
            num_qubits: self.num_qubits,
            coupling_map,
            basis_gates,
        }
    }
}

/// Selection criteria for devices. `None` fields match anything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackendFilter {
    /// Require (or exclude) simulators.
    pub simulator: Option<bool>,
    /// Require operational (or down) devices.
    pub operational: Option<bool>,
    /// Minimum qubit count.
    pub min_qubits: Option<u32>,
}

impl BackendFilter {
    /// Real, operational hardware.
    pub fn hardware() -> Self {
        Self {
            simulator: Some(false),
            operational: Some(true),
            min_qubits: None,
        }
    }

    /// Also require at least `n` qubits.
    #[must_use]
    pub fn with_min_qubits(mut self, n: u32) -> Self {
        self.min_qubits = Some(n);
        self
    }

    /// Check one device.
    pub fn matches(&self, backend: &BackendDescriptor) -> bool {
        self.simulator.is_none_or(|s| backend.simulator == s)
            && self.operational.is_none_or(|o| backend.operational == o)
            && self.min_qubits.is_none_or(|n| backend.num_qubits >= n)
    }
}

impl fmt::Display for BackendFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = vec![];
        if let Some(s) = self.simulator {
            parts.push(format!("simulator={s}"));
        }
        if let Some(o) = self.operational {
            parts.push(format!("operational={o}"));
        }
        if let Some(n) = self.min_qubits {
            parts.push(format!("min_qubits={n}"));
        }
        if parts.is_empty() {
            write!(f, "any device")
        } else {
            write!(f, "{{{}}}", parts.join(", "))
        }
    }
}

/// The matching device with the fewest pending jobs; ties go to the
/// alphabetically first name.
pub fn least_busy(
    backends: impl IntoIterator<Item = BackendDescriptor>,
    filter: &BackendFilter,
) -> HalResult<BackendDescriptor> {
    let chosen = backends
        .into_iter()
        .filter(|b| filter.matches(b))
        .min_by(|a, b| {
            a.pending_jobs
                .cmp(&b.pending_jobs)
                .then_with(|| a.name.cmp(&b.name))
        })
        .ok_or_else(|| HalError::NoBackendAvailable(filter.to_string()))?;
    debug!(backend = %chosen.name, pending = chosen.pending_jobs, "selected least busy backend");
    Ok(chosen)
}
