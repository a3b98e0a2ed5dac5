//! Core type definitions

use alloy_primitives::Address;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Network identifier (e.g. "ethereum", "polygon-zkevm", "opbnb")
///
/// Kept as an opaque string so new networks only need a registered reader,
/// not a new enum variant.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NetworkId(String);

impl NetworkId {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NetworkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NetworkId {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for NetworkId {
    fn from(name: String) -> Self {
        Self(name)
    }
}

/// One registry entry: a locally deployed oracle and its reference oracle
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedDescriptor {
    pub symbol: String,
    pub local_address: Option<Address>,
    pub reference_network: Option<NetworkId>,
    pub reference_address: Option<Address>,
    pub local_decimals: u32,
    pub reference_decimals: u32,
}

impl FeedDescriptor {
    /// Reference location, if both halves are known
    pub fn reference(&self) -> Option<(&NetworkId, Address)> {
        match (&self.reference_network, self.reference_address) {
            (Some(network), Some(address)) => Some((network, address)),
            _ => None,
        }
    }

    /// A feed can only be validated when it is deployed locally and has a reference
    pub fn is_checkable(&self) -> bool {
        self.local_address.is_some() && self.reference().is_some()
    }
}
