//! Service selection shared by the demo binaries.

use std::fmt;
use std::sync::Arc;

use clap::{Args, ValueEnum};
use qrun_adapter_ibm::{IbmConfig, IbmService};
use qrun_adapter_sim::SimulatorService;
use qrun_hal::{BackendFilter, QuantumService};
use tracing::info;

use crate::error::PipelineResult;

/// Execution provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ServiceKind {
    /// In-process statevector simulator with fake devices.
    Sim,
    /// IBM Quantum Runtime.
    Ibm,
}

/// Where and how programs run.
#[derive(Clone, Args)]
pub struct ServiceConfig {
    /// Execution service
    #[arg(long, env = "QRUN_SERVICE", value_enum, default_value = "sim")]
    pub service: ServiceKind,

    /// IBM Cloud API key
    #[arg(long, env = "IBM_API_KEY", hide_env_values = true)]
    pub ibm_api_key: Option<String>,

    /// Service CRN of the IBM Quantum instance
    #[arg(long, env = "IBM_SERVICE_CRN")]
    pub ibm_service_crn: Option<String>,

    /// IBM Quantum bearer token (used when no API key is given)
    #[arg(long, env = "IBM_QUANTUM_TOKEN", hide_env_values = true)]
    pub ibm_token: Option<String>,

    /// IBM Quantum API endpoint
    #[arg(long, env = "IBM_ENDPOINT")]
    pub ibm_endpoint: Option<String>,

    /// Run on this device instead of the least busy one
    #[arg(long, env = "QRUN_BACKEND")]
    pub backend: Option<String>,

    /// Accept simulator devices during least-busy selection
    #[arg(long)]
    pub allow_simulator: bool,

    /// Seed for the local simulator's sampling
    #[arg(long)]
    pub seed: Option<u64>,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            service: ServiceKind::Sim,
            ibm_api_key: None,
            ibm_service_crn: None,
            ibm_token: None,
            ibm_endpoint: None,
            backend: None,
            allow_simulator: false,
            seed: None,
        }
    }
}

impl fmt::Debug for ServiceConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let redact = |v: &Option<String>| v.as_ref().map(|_| "[REDACTED]");
        f.debug_struct("ServiceConfig")
            .field("service", &self.service)
            .field("ibm_api_key", &redact(&self.ibm_api_key))
            .field("ibm_service_crn", &self.ibm_service_crn)
            .field("ibm_token", &redact(&self.ibm_token))
            .field("ibm_endpoint", &self.ibm_endpoint)
            .field("backend", &self.backend)
            .field("allow_simulator", &self.allow_simulator)
            .field("seed", &self.seed)
            .finish()
    }
}

/// Operational devices with at least `min_qubits`; hardware only unless
/// `allow_simulator`.
pub fn device_filter(min_qubits: u32, allow_simulator: bool) -> BackendFilter {
    let mut filter = BackendFilter::hardware().with_min_qubits(min_qubits);
    if allow_simulator {
        filter.simulator = None;
    }
    filter
}

impl ServiceConfig {
    /// Device filter for least-busy selection.
    pub fn filter(&self, min_qubits: u32) -> BackendFilter {
        device_filter(min_qubits, self.allow_simulator)
    }

    /// IBM client settings from the credential fields.
    pub fn ibm_config(&self) -> PipelineResult<IbmConfig> {
        let config = IbmConfig::from_parts(
            self.ibm_api_key.clone(),
            self.ibm_service_crn.clone(),
            self.ibm_token.clone(),
        )?;
        Ok(match &self.ibm_endpoint {
            Some(endpoint) => config.with_endpoint(endpoint),
            None => config,
        })
    }

    /// Build the configured service.
    pub async fn connect(&self) -> PipelineResult<Arc<dyn QuantumService>> {
        info!(service = ?self.service, "connecting");
        let service: Arc<dyn QuantumService> = match self.service {
            ServiceKind::Sim => {
                let sim = SimulatorService::new();
                Arc::new(match self.seed {
                    Some(seed) => sim.with_seed(seed),
                    None => sim,
                })
            }
            ServiceKind::Ibm => Arc::new(IbmService::connect(&self.ibm_config()?).await?),
        };
        Ok(service)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PipelineError;
    use clap::Parser;
    use qrun_adapter_ibm::IbmError;

    #[derive(Parser)]
    struct Cli {
        #[command(flatten)]
        service: ServiceConfig,
    }

    #[test]
    fn test_flags() {
        let cli = Cli::try_parse_from([
            "demo",
            "--service",
            "ibm",
            "--ibm-token",
            "tok",
            "--backend",
            "ibm_fez",
        ])
        .unwrap();
        assert_eq!(cli.service.service, ServiceKind::Ibm);
        assert_eq!(cli.service.backend.as_deref(), Some("ibm_fez"));
        assert!(cli.service.ibm_config().is_ok());
    }

    #[test]
    fn test_debug_hides_credentials() {
        let config = ServiceConfig {
            ibm_api_key: Some("key-123".into()),
            ibm_token: Some("tok-456".into()),
            ..ServiceConfig::default()
        };
        let shown = format!("{config:?}");
        assert!(!shown.contains("key-123"));
        assert!(!shown.contains("tok-456"));
    }

    #[test]
    fn test_api_key_without_crn() {
        let config = ServiceConfig {
            service: ServiceKind::Ibm,
            ibm_api_key: Some("key".into()),
            ..ServiceConfig::default()
        };
        assert!(matches!(
            config.ibm_config(),
            Err(PipelineError::Ibm(IbmError::MissingServiceCrn))
        ));
    }

    #[test]
    fn test_filter() {
        let strict = ServiceConfig::default().filter(2);
        assert_eq!(strict.simulator, Some(false));
        assert_eq!(strict.min_qubits, Some(2));

        let relaxed = ServiceConfig {
            allow_simulator: true,
            ..ServiceConfig::default()
        }
        .filter(2);
        assert_eq!(relaxed.simulator, None);
    }
}
