//! Reader construction from settings

use std::sync::Arc;
use tracing::info;

use feedcheck_core::{ConfigError, ConfigResult};
use feedcheck_price_feed::{JsonRpcReader, ReaderRegistry, RpcReaderConfig};

use crate::settings::{Settings, API_KEY_VAR};

/// One JSON-RPC reader per configured network.
///
/// Fails before any read when the target network has no endpoint or an
/// endpoint needs the provider key and it is not set.
pub fn build_readers(settings: &Settings, api_key: Option<&str>) -> ConfigResult<ReaderRegistry> {
    if !settings.networks.contains_key(&settings.target_network) {
        return Err(ConfigError::UnknownTargetNetwork(settings.target_network.clone()));
    }

    let mut readers = ReaderRegistry::new();
    for (name, endpoint) in &settings.networks {
        let url = endpoint.resolve(api_key, API_KEY_VAR)?;
        let config = RpcReaderConfig::new(name.as_str(), url).with_timeout(settings.request_timeout());
        let reader = JsonRpcReader::new(config).map_err(|e| ConfigError::Load(e.to_string()))?;
        readers.register(Arc::new(reader));
    }

    info!("Configured readers for {} networks", readers.len());
    Ok(readers)
}
