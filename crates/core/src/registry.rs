//! Feed registry and deployment manifest loading
//!
//! The registry document maps a symbol to its oracle pair. Both the plain
//! layout and the deployment data file layout (wrapped in `uniquePair`, with
//! `chainlink*` keys and string decimals) are accepted. Loading is
//! all-or-nothing: the first bad entry fails the whole document.

use alloy_primitives::Address;
use serde_json::{Map, Value};
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::Path;
use tracing::{debug, warn};

use crate::{FeedDescriptor, NetworkId, RegistryError, RegistryResult};

/// Wrapper key used by the deployment data file
const WRAPPER_KEY: &str = "uniquePair";

const LOCAL_ADDRESS: &[&str] = &["localAddress"];
const REFERENCE_NETWORK: &[&str] = &["referenceNetwork", "chainlinkNetwork"];
const REFERENCE_ADDRESS: &[&str] = &["referenceAddress", "chainlinkAddress"];
const LOCAL_DECIMALS: &[&str] = &["localDecimals", "decimals"];
const REFERENCE_DECIMALS: &[&str] = &["referenceDecimals", "chainlinkDecimals"];

/// Read-only symbol -> descriptor mapping, iterated in symbol order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeedRegistry {
    feeds: BTreeMap<String, FeedDescriptor>,
}

impl FeedRegistry {
    /// Load a registry document from disk
    pub fn load(path: impl AsRef<Path>) -> RegistryResult<Self> {
        let text = read_file(path.as_ref())?;
        Self::from_json(&text)
    }

    /// Parse a registry document
    pub fn from_json(text: &str) -> RegistryResult<Self> {
        let doc: Value = serde_json::from_str(text)?;
        let feeds = match doc.get(WRAPPER_KEY) {
            Some(inner) => inner,
            None => &doc,
        };
        let entries = feeds.as_object().ok_or(RegistryError::NotAnObject)?;

        let mut registry = Self::default();
        for (symbol, entry) in entries {
            let entry = entry
                .as_object()
                .ok_or_else(|| RegistryError::InvalidEntry(symbol.clone()))?;
            registry.insert(parse_entry(symbol, entry)?);
        }

        debug!("Loaded {} feeds from registry", registry.len());
        Ok(registry)
    }

    pub fn from_descriptors(feeds: impl IntoIterator<Item = FeedDescriptor>) -> Self {
        let mut registry = Self::default();
        for feed in feeds {
            registry.insert(feed);
        }
        registry
    }

    pub fn insert(&mut self, feed: FeedDescriptor) {
        self.feeds.insert(feed.symbol.clone(), feed);
    }

    pub fn get(&self, symbol: &str) -> Option<&FeedDescriptor> {
        self.feeds.get(symbol)
    }

    pub fn iter(&self) -> impl Iterator<Item = &FeedDescriptor> {
        self.feeds.values()
    }

    pub fn len(&self) -> usize {
        self.feeds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.feeds.is_empty()
    }

    /// Take local addresses from a deployment manifest.
    ///
    /// Every registry symbol gets the manifest's address (or none, if the
    /// manifest lacks it). Manifest symbols unknown to the registry are added
    /// without a reference so they surface as "not found".
    pub fn apply_manifest(&mut self, manifest: &DeploymentManifest) {
        for feed in self.feeds.values_mut() {
            feed.local_address = manifest.address_of(&feed.symbol);
        }

        for (symbol, address) in &manifest.addresses {
            if self.feeds.contains_key(symbol) {
                continue;
            }
            warn!("{} is deployed but missing from the registry", symbol);
            self.insert(FeedDescriptor {
                symbol: symbol.clone(),
                local_address: *address,
                reference_network: None,
                reference_address: None,
                local_decimals: 0,
                reference_decimals: 0,
            });
        }
    }
}

/// Symbol -> locally deployed oracle address, for one target network
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeploymentManifest {
    addresses: HashMap<String, Option<Address>>,
}

impl DeploymentManifest {
    pub fn load(path: impl AsRef<Path>) -> RegistryResult<Self> {
        let text = read_file(path.as_ref())?;
        Self::from_json(&text)
    }

    pub fn from_json(text: &str) -> RegistryResult<Self> {
        let doc: Value = serde_json::from_str(text)?;
        let entries = doc.as_object().ok_or(RegistryError::NotAnObject)?;

        let mut addresses = HashMap::with_capacity(entries.len());
        for (symbol, value) in entries {
            addresses.insert(symbol.clone(), parse_address(symbol, "address", value)?);
        }

        Ok(Self { addresses })
    }

    pub fn address_of(&self, symbol: &str) -> Option<Address> {
        self.addresses.get(symbol).copied().flatten()
    }

    pub fn len(&self) -> usize {
        self.addresses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.addresses.is_empty()
    }
}

fn read_file(path: &Path) -> RegistryResult<String> {
    fs::read_to_string(path).map_err(|source| RegistryError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn parse_entry(symbol: &str, entry: &Map<String, Value>) -> RegistryResult<FeedDescriptor> {
    let local_address = match lookup(entry, LOCAL_ADDRESS) {
        Some(value) => parse_address(symbol, LOCAL_ADDRESS[0], value)?,
        None => None,
    };
    let reference_address = match lookup(entry, REFERENCE_ADDRESS) {
        Some(value) => parse_address(symbol, REFERENCE_ADDRESS[0], value)?,
        None => None,
    };
    let reference_network = match lookup(entry, REFERENCE_NETWORK) {
        Some(value) => parse_network(symbol, REFERENCE_NETWORK[0], value)?,
        None => None,
    };

    Ok(FeedDescriptor {
        symbol: symbol.to_string(),
        local_address,
        reference_network,
        reference_address,
        local_decimals: parse_decimals(symbol, LOCAL_DECIMALS, entry)?,
        reference_decimals: parse_decimals(symbol, REFERENCE_DECIMALS, entry)?,
    })
}

/// First non-null value among the accepted key names
fn lookup<'a>(entry: &'a Map<String, Value>, names: &[&str]) -> Option<&'a Value> {
    names
        .iter()
        .filter_map(|name| entry.get(*name))
        .find(|value| !value.is_null())
}

fn parse_decimals(
    symbol: &str,
    names: &[&'static str],
    entry: &Map<String, Value>,
) -> RegistryResult<u32> {
    let field = names[0];
    let value = lookup(entry, names).ok_or_else(|| RegistryError::MissingField {
        symbol: symbol.to_string(),
        field,
    })?;

    let parsed = match value {
        Value::Number(n) => n.as_u64().and_then(|d| u32::try_from(d).ok()),
        Value::String(s) => s.trim().parse::<u32>().ok(),
        _ => None,
    };

    parsed.ok_or_else(|| RegistryError::InvalidDecimals {
        symbol: symbol.to_string(),
        field,
        value: value.to_string(),
    })
}

fn parse_network(symbol: &str, field: &'static str, value: &Value) -> RegistryResult<Option<NetworkId>> {
    match value {
        Value::String(s) if s.trim().is_empty() => Ok(None),
        Value::String(s) => Ok(Some(NetworkId::from(s.trim()))),
        _ => Err(RegistryError::InvalidNetwork {
            symbol: symbol.to_string(),
            field,
            value: value.to_string(),
        }),
    }
}

fn parse_address(symbol: &str, field: &'static str, value: &Value) -> RegistryResult<Option<Address>> {
    let invalid = || RegistryError::InvalidAddress {
        symbol: symbol.to_string(),
        field,
        value: value.to_string(),
    };

    match value {
        Value::Null => Ok(None),
        Value::String(s) if s.trim().is_empty() => Ok(None),
        Value::String(s) => s.trim().parse::<Address>().map(Some).map_err(|_| invalid()),
        _ => Err(invalid()),
    }
}
