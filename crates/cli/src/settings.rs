//! Layered run settings
//!
//! Defaults, then an optional config file, then `FEEDCHECK__*` environment
//! variables, then command-line flags.

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use feedcheck_core::{
    ConfigError, ConfigResult, EndpointConfig, NetworkId, ValidationConfig, DEFAULT_EXEMPTIONS,
    DEFAULT_THRESHOLD_PERCENT,
};

use crate::Cli;

/// Provider key appended to Infura-style endpoints
pub const API_KEY_VAR: &str = "INFURA_API_KEY";

/// Endpoint of the target network
pub const RPC_URL_VAR: &str = "RPC_URL";

const DEFAULT_CONFIG_NAME: &str = "feedcheck";

const ENV_PREFIX: &str = "FEEDCHECK";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub target_network: String,
    pub registry_path: PathBuf,
    pub manifest_path: Option<PathBuf>,
    pub report_path: Option<PathBuf>,
    pub threshold_percent: f64,
    pub exemptions: Vec<String>,
    pub max_concurrency: usize,
    pub request_timeout_secs: u64,
    /// Written as `[[networks]]` tables; names stay case-sensitive
    #[serde(with = "named_networks")]
    pub networks: BTreeMap<String, EndpointConfig>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            target_network: "opbnb".to_string(),
            registry_path: PathBuf::from("ignition/data-feeds.json"),
            manifest_path: None,
            report_path: None,
            threshold_percent: DEFAULT_THRESHOLD_PERCENT,
            exemptions: DEFAULT_EXEMPTIONS.iter().map(|s| s.to_string()).collect(),
            max_concurrency: 4,
            request_timeout_secs: 10,
            networks: default_networks(),
        }
    }
}

fn default_networks() -> BTreeMap<String, EndpointConfig> {
    [
        ("ethereum", EndpointConfig::with_api_key("https://mainnet.infura.io/v3/")),
        ("bnb", EndpointConfig::with_api_key("https://bsc-mainnet.infura.io/v3/")),
        ("polygon", EndpointConfig::with_api_key("https://polygon-mainnet.infura.io/v3/")),
        ("polygon-zkevm", EndpointConfig::new("https://zkevm-rpc.com")),
        ("arbitrum", EndpointConfig::with_api_key("https://arbitrum-mainnet.infura.io/v3/")),
        ("base", EndpointConfig::with_api_key("https://base-mainnet.infura.io/v3/")),
        ("opbnb", EndpointConfig::new("https://opbnb-mainnet-rpc.bnbchain.org")),
        ("opbnbTestnet", EndpointConfig::new("https://opbnb-testnet-rpc.bnbchain.org")),
    ]
    .into_iter()
    .map(|(name, endpoint)| (name.to_string(), endpoint))
    .collect()
}

/// Network tables carry their name as a value because the config loader
/// lowercases table keys
mod named_networks {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::collections::BTreeMap;

    use feedcheck_core::EndpointConfig;

    #[derive(Serialize, Deserialize)]
    struct NamedEndpoint {
        name: String,
        url: String,
        #[serde(default)]
        append_api_key: bool,
    }

    pub fn serialize<S>(networks: &BTreeMap<String, EndpointConfig>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_seq(networks.iter().map(|(name, endpoint)| NamedEndpoint {
            name: name.clone(),
            url: endpoint.url.clone(),
            append_api_key: endpoint.append_api_key,
        }))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<BTreeMap<String, EndpointConfig>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let entries = Vec::<NamedEndpoint>::deserialize(deserializer)?;
        Ok(entries
            .into_iter()
            .map(|entry| {
                let endpoint = EndpointConfig {
                    url: entry.url,
                    append_api_key: entry.append_api_key,
                };
                (entry.name.trim().to_string(), endpoint)
            })
            .collect())
    }
}

impl Settings {
    /// Load from `path` (required) or `./feedcheck.*` (optional), then the environment
    pub fn load(path: Option<&Path>) -> ConfigResult<Self> {
        Self::load_with_prefix(path, ENV_PREFIX)
    }

    fn load_with_prefix(path: Option<&Path>, env_prefix: &str) -> ConfigResult<Self> {
        let file = match path {
            Some(path) => File::from(path).required(true),
            None => File::with_name(DEFAULT_CONFIG_NAME).required(false),
        };

        let mut settings: Settings = Config::builder()
            .add_source(file)
            .add_source(
                Environment::with_prefix(env_prefix)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("exemptions"),
            )
            .build()
            .and_then(|config| config.try_deserialize())
            .map_err(|e| ConfigError::Load(e.to_string()))?;

        // Configured networks extend the built-in table rather than replace it
        for (name, endpoint) in default_networks() {
            settings.networks.entry(name).or_insert(endpoint);
        }

        Ok(settings)
    }

    /// Command-line flags win over file and environment
    pub fn apply_cli(&mut self, cli: &Cli) {
        if let Some(network) = &cli.network {
            self.target_network = network.clone();
        }
        if let Some(deviation) = cli.deviation {
            self.threshold_percent = deviation;
        }
        if let Some(registry) = &cli.registry {
            self.registry_path = registry.clone();
        }
        if let Some(manifest) = &cli.manifest {
            self.manifest_path = Some(manifest.clone());
        }
        if let Some(report) = &cli.report {
            self.report_path = Some(report.clone());
        }
        if let Some(concurrency) = cli.concurrency {
            self.max_concurrency = concurrency;
        }
    }

    /// Point the target network at an explicit endpoint (`RPC_URL`)
    pub fn apply_target_endpoint(&mut self, url: Option<String>) {
        if let Some(url) = url.filter(|u| !u.trim().is_empty()) {
            self.networks
                .insert(self.target_network.clone(), EndpointConfig::new(url));
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn validation_config(&self) -> ValidationConfig {
        ValidationConfig {
            local_network: NetworkId::new(self.target_network.as_str()),
            threshold_percent: self.threshold_percent,
            exemptions: self.exemptions.clone(),
            max_concurrency: self.max_concurrency,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use std::io::Write;

    fn toml_file(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.target_network, "opbnb");
        assert_eq!(settings.threshold_percent, 5.0);
        assert_eq!(settings.networks.len(), 8);
        assert!(settings.networks["ethereum"].append_api_key);
        assert!(!settings.networks["polygon-zkevm"].append_api_key);
        assert!(settings.validation_config().validate().is_ok());
    }

    #[test]
    fn test_load_file_merges_networks() {
        let file = toml_file(
            r#"
            target_network = "opbnbTestnet"
            threshold_percent = 2.5
            exemptions = ["FOO / USD"]

            [[networks]]
            name = "avalanche"
            url = "https://avalanche.example/rpc"
            "#,
        );

        let settings = Settings::load(Some(file.path())).unwrap();
        assert_eq!(settings.target_network, "opbnbTestnet");
        assert_eq!(settings.threshold_percent, 2.5);
        assert_eq!(settings.exemptions, vec!["FOO / USD".to_string()]);
        assert_eq!(settings.max_concurrency, 4);
        assert_eq!(settings.networks["avalanche"].url, "https://avalanche.example/rpc");
        assert!(!settings.networks["avalanche"].append_api_key);
        assert!(settings.networks.contains_key("ethereum"));
    }

    #[test]
    fn test_file_overrides_keep_network_case() {
        let file = toml_file(
            r#"
            [[networks]]
            name = "opbnbTestnet"
            url = "http://localhost:9999"

            [[networks]]
            name = "myChain"
            url = "https://my-chain.example/rpc"
            append_api_key = true
            "#,
        );

        let settings = Settings::load(Some(file.path())).unwrap();
        assert_eq!(settings.networks["opbnbTestnet"].url, "http://localhost:9999");
        assert!(!settings.networks.contains_key("opbnbtestnet"));
        assert_eq!(settings.networks["myChain"].url, "https://my-chain.example/rpc");
        assert!(settings.networks["myChain"].append_api_key);
        assert_eq!(settings.networks.len(), 9);
    }

    #[test]
    fn test_environment_layer() {
        let file = toml_file(
            r#"
            threshold_percent = 2.5
            max_concurrency = 2
            "#,
        );

        std::env::set_var("FEEDCHECK_ENV_TEST__THRESHOLD_PERCENT", "7.5");
        std::env::set_var("FEEDCHECK_ENV_TEST__TARGET_NETWORK", "opbnbTestnet");
        std::env::set_var("FEEDCHECK_ENV_TEST__EXEMPTIONS", "FOO / USD,BAR / USD");

        let settings = Settings::load_with_prefix(Some(file.path()), "FEEDCHECK_ENV_TEST");

        std::env::remove_var("FEEDCHECK_ENV_TEST__THRESHOLD_PERCENT");
        std::env::remove_var("FEEDCHECK_ENV_TEST__TARGET_NETWORK");
        std::env::remove_var("FEEDCHECK_ENV_TEST__EXEMPTIONS");

        let settings = settings.unwrap();
        // Environment wins over the file, the file over defaults
        assert_eq!(settings.threshold_percent, 7.5);
        assert_eq!(settings.target_network, "opbnbTestnet");
        assert_eq!(
            settings.exemptions,
            vec!["FOO / USD".to_string(), "BAR / USD".to_string()]
        );
        assert_eq!(settings.max_concurrency, 2);
        assert_eq!(settings.request_timeout_secs, 10);
    }

    #[test]
    fn test_missing_explicit_file_fails() {
        let err = Settings::load(Some(Path::new("/nonexistent/feedcheck.toml"))).unwrap_err();
        assert!(matches!(err, ConfigError::Load(_)));
    }

    #[test]
    fn test_cli_overrides() {
        let cli = Cli::try_parse_from([
            "feedcheck",
            "--network",
            "opbnbTestnet",
            "--deviation",
            "1",
            "--concurrency",
            "1",
            "--report",
            "out/report.json",
        ])
        .unwrap();

        let mut settings = Settings::default();
        settings.apply_cli(&cli);

        let config = settings.validation_config();
        assert_eq!(config.local_network.as_str(), "opbnbTestnet");
        assert_eq!(config.threshold_percent, 1.0);
        assert_eq!(config.max_concurrency, 1);
        assert_eq!(settings.report_path, Some(PathBuf::from("out/report.json")));
        assert_eq!(settings.registry_path, PathBuf::from("ignition/data-feeds.json"));
    }

    #[test]
    fn test_target_endpoint_override() {
        let mut settings = Settings::default();
        settings.apply_target_endpoint(Some("http://localhost:8545".to_string()));
        assert_eq!(settings.networks["opbnb"].url, "http://localhost:8545");

        settings.apply_target_endpoint(Some("  ".to_string()));
        assert_eq!(settings.networks["opbnb"].url, "http://localhost:8545");
    }
}
