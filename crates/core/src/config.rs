//! Configuration types

use serde::{Deserialize, Serialize};

use crate::{ConfigError, ConfigResult, NetworkId};

/// Symbols whose reference proxies were deprecated upstream
pub const DEFAULT_EXEMPTIONS: &[&str] = &[
    "ETHFI / USD",
    "NEIRO / USD",
    "STBT Proof of Reserves",
    "AMPL / USD",
];

pub const DEFAULT_THRESHOLD_PERCENT: f64 = 5.0;

/// RPC endpoint for one network
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointConfig {
    pub url: String,
    /// Append the provider API key to `url` (Infura-style endpoints)
    #[serde(default)]
    pub append_api_key: bool,
}

impl EndpointConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            append_api_key: false,
        }
    }

    pub fn with_api_key(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            append_api_key: true,
        }
    }

    /// Final URL, or an error if the key is needed but missing
    pub fn resolve(&self, api_key: Option<&str>, credential: &'static str) -> ConfigResult<String> {
        if !self.append_api_key {
            return Ok(self.url.clone());
        }
        match api_key {
            Some(key) if !key.is_empty() => Ok(format!("{}{}", self.url, key)),
            _ => Err(ConfigError::MissingCredential(credential)),
        }
    }
}

/// Run-scoped validation settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationConfig {
    /// Network hosting the oracles under validation
    pub local_network: NetworkId,
    /// NOT_OK cutoff, in percent (strictly greater fails)
    pub threshold_percent: f64,
    pub exemptions: Vec<String>,
    /// Symbols evaluated at once; 1 means strictly sequential
    pub max_concurrency: usize,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            local_network: NetworkId::new("opbnb"),
            threshold_percent: DEFAULT_THRESHOLD_PERCENT,
            exemptions: DEFAULT_EXEMPTIONS.iter().map(|s| s.to_string()).collect(),
            max_concurrency: 4,
        }
    }
}

impl ValidationConfig {
    pub fn validate(&self) -> ConfigResult<()> {
        if !self.threshold_percent.is_finite() || self.threshold_percent < 0.0 {
            return Err(ConfigError::InvalidThreshold(self.threshold_percent));
        }
        if self.max_concurrency == 0 {
            return Err(ConfigError::InvalidConcurrency);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = ValidationConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.threshold_percent, 5.0);
        assert_eq!(config.exemptions.len(), 4);
    }

    #[test]
    fn test_rejects_bad_threshold_and_concurrency() {
        let config = ValidationConfig {
            threshold_percent: -1.0,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::InvalidThreshold(_))));

        let config = ValidationConfig {
            threshold_percent: f64::NAN,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::InvalidThreshold(_))));

        let config = ValidationConfig {
            max_concurrency: 0,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::InvalidConcurrency)));
    }

    #[test]
    fn test_endpoint_resolution() {
        let infura = EndpointConfig::with_api_key("https://mainnet.infura.io/v3/");
        assert_eq!(
            infura.resolve(Some("abc"), "INFURA_API_KEY").unwrap(),
            "https://mainnet.infura.io/v3/abc"
        );
        assert!(matches!(
            infura.resolve(None, "INFURA_API_KEY"),
            Err(ConfigError::MissingCredential("INFURA_API_KEY"))
        ));

        let public = EndpointConfig::new("https://zkevm-rpc.com");
        assert_eq!(public.resolve(None, "INFURA_API_KEY").unwrap(), "https://zkevm-rpc.com");
    }
}
