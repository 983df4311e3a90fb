//! Connection settings for IBM Quantum.

use std::fmt;
use std::time::Duration;

use crate::error::{IbmError, IbmResult};

/// Default IBM Quantum Cloud API endpoint.
pub const DEFAULT_ENDPOINT: &str = "https://quantum.cloud.ibm.com/api";

/// IBM Cloud IAM token endpoint.
pub const IAM_TOKEN_URL: &str = "https://iam.cloud.ibm.com/identity/token";

/// How the client authenticates.
#[derive(Clone)]
pub enum IbmCredentials {
    /// IBM Cloud API key, exchanged for an IAM bearer token.
    ApiKey {
        /// The API key.
        api_key: String,
        /// Service CRN of the Quantum instance.
        service_crn: String,
    },
    /// A bearer token used as is.
    Token {
        /// The token.
        token: String,
        /// Service CRN, when the endpoint requires one.
        service_crn: Option<String>,
    },
}

impl IbmCredentials {
    /// Service CRN header value, if any.
    pub fn service_crn(&self) -> Option<&str> {
        match self {
            Self::ApiKey { service_crn, .. } => Some(service_crn),
            Self::Token { service_crn, .. } => service_crn.as_deref(),
        }
    }
}

impl fmt::Debug for IbmCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ApiKey { service_crn, .. } => f
                .debug_struct("ApiKey")
                .field("api_key", &"[REDACTED]")
                .field("service_crn", service_crn)
                .finish(),
            Self::Token { service_crn, .. } => f
                .debug_struct("Token")
                .field("token", &"[REDACTED]")
                .field("service_crn", service_crn)
                .finish(),
        }
    }
}

/// Settings for [`IbmClient`](crate::IbmClient).
#[derive(Debug, Clone)]
pub struct IbmConfig {
    /// Runtime API base URL.
    pub endpoint: String,
    /// IAM token exchange URL.
    pub iam_url: String,
    /// Credentials.
    pub credentials: IbmCredentials,
    /// Per-request timeout.
    pub timeout: Duration,
    /// Connection timeout.
    pub connect_timeout: Duration,
}

impl IbmConfig {
    fn with_credentials(credentials: IbmCredentials) -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.into(),
            iam_url: IAM_TOKEN_URL.into(),
            credentials,
            timeout: Duration::from_secs(60),
            connect_timeout: Duration::from_secs(10),
        }
    }

    /// Authenticate with an IBM Cloud API key.
    pub fn api_key(api_key: impl Into<String>, service_crn: impl Into<String>) -> Self {
        Self::with_credentials(IbmCredentials::ApiKey {
            api_key: api_key.into(),
            service_crn: service_crn.into(),
        })
    }

    /// Authenticate with a bearer token.
    pub fn token(token: impl Into<String>) -> Self {
        Self::with_credentials(IbmCredentials::Token {
            token: token.into(),
            service_crn: None,
        })
    }

    /// Pick credentials from whichever values are present.
    ///
    /// An API key wins over a token and requires a service CRN.
    pub fn from_parts(
        api_key: Option<String>,
        service_crn: Option<String>,
        token: Option<String>,
    ) -> IbmResult<Self> {
        match (api_key, token) {
            (Some(key), _) => {
                let crn = service_crn.ok_or(IbmError::MissingServiceCrn)?;
                Ok(Self::api_key(key, crn))
            }
            (None, Some(token)) => Ok(Self::with_credentials(IbmCredentials::Token {
                token,
                service_crn,
            })),
            (None, None) => Err(IbmError::MissingToken),
        }
    }

    /// Read `IBM_API_KEY`, `IBM_SERVICE_CRN`, `IBM_QUANTUM_TOKEN` and
    /// `IBM_ENDPOINT` from the environment.
    pub fn from_env() -> IbmResult<Self> {
        let var = |name: &str| std::env::var(name).ok().filter(|v| !v.is_empty());
        let config = Self::from_parts(
            var("IBM_API_KEY"),
            var("IBM_SERVICE_CRN"),
            var("IBM_QUANTUM_TOKEN"),
        )?;
        Ok(match var("IBM_ENDPOINT") {
            Some(endpoint) => config.with_endpoint(endpoint),
            None => config,
        })
    }

    /// Override the API endpoint.
    #[must_use]
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into().trim_end_matches('/').to_string();
        self
    }

    /// Override the IAM endpoint.
    #[must_use]
    pub fn with_iam_url(mut self, url: impl Into<String>) -> Self {
        self.iam_url = url.into();
        self
    }

    /// Override the request timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_redacts_secrets() {
        let config = IbmConfig::api_key("super-secret-key", "crn:v1:abc");
        let shown = format!("{config:?}");
        assert!(!shown.contains("super-secret-key"));
        assert!(shown.contains("[REDACTED]"));
        assert!(shown.contains("crn:v1:abc"));

        let shown = format!("{:?}", IbmConfig::token("tok-123"));
        assert!(!shown.contains("tok-123"));
    }

    #[test]
    fn test_api_key_requires_crn() {
        assert!(matches!(
            IbmConfig::from_parts(Some("k".into()), None, None),
            Err(IbmError::MissingServiceCrn)
        ));
    }

    #[test]
    fn test_api_key_preferred_over_token() {
        let config =
            IbmConfig::from_parts(Some("k".into()), Some("crn".into()), Some("t".into())).unwrap();
        assert!(matches!(config.credentials, IbmCredentials::ApiKey { .. }));
        assert_eq!(config.credentials.service_crn(), Some("crn"));
    }

    #[test]
    fn test_no_credentials() {
        assert!(matches!(
            IbmConfig::from_parts(None, Some("crn".into()), None),
            Err(IbmError::MissingToken)
        ));
    }

    #[test]
    fn test_endpoint_trailing_slash() {
        let config = IbmConfig::token("t").with_endpoint("http://localhost:9000/api/");
        assert_eq!(config.endpoint, "http://localhost:9000/api");
        assert_eq!(IbmConfig::token("t").endpoint, DEFAULT_ENDPOINT);
    }
}
