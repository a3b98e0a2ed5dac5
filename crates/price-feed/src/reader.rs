//! Reader trait and per-network registry

use alloy_primitives::{Address, I256};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

use feedcheck_core::{NetworkId, ReadError, ReadFailure, ReadResult};

/// Reads the latest raw answer of an oracle on one network
#[async_trait::async_trait]
pub trait ValueReader: Send + Sync {
    fn network(&self) -> &NetworkId;

    /// Issues exactly one remote read
    async fn read_latest(&self, address: Address) -> ReadResult<I256>;
}

/// Readers keyed by network; adding a network means registering a reader
#[derive(Clone, Default)]
pub struct ReaderRegistry {
    readers: HashMap<NetworkId, Arc<dyn ValueReader>>,
}

impl ReaderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a reader under its own network, replacing any previous one
    pub fn register(&mut self, reader: Arc<dyn ValueReader>) {
        let network = reader.network().clone();
        if self.readers.insert(network.clone(), reader).is_some() {
            debug!("Replaced reader for {}", network);
        }
    }

    pub fn with_reader(mut self, reader: Arc<dyn ValueReader>) -> Self {
        self.register(reader);
        self
    }

    pub fn get(&self, network: &NetworkId) -> Option<&Arc<dyn ValueReader>> {
        self.readers.get(network)
    }

    pub fn contains(&self, network: &NetworkId) -> bool {
        self.readers.contains_key(network)
    }

    pub fn networks(&self) -> impl Iterator<Item = &NetworkId> {
        self.readers.keys()
    }

    pub fn len(&self) -> usize {
        self.readers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.readers.is_empty()
    }

    /// Route a read to the network's reader
    pub async fn read_latest(&self, network: &NetworkId, address: Address) -> ReadResult<I256> {
        match self.readers.get(network) {
            Some(reader) => reader.read_latest(address).await,
            None => Err(ReadError::new(network.clone(), address, ReadFailure::UnknownNetwork)),
        }
    }
}

impl std::fmt::Debug for ReaderRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut networks: Vec<_> = self.readers.keys().map(NetworkId::as_str).collect();
        networks.sort_unstable();
        f.debug_struct("ReaderRegistry").field("networks", &networks).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedReader {
        network: NetworkId,
        answer: i64,
    }

    #[async_trait::async_trait]
    impl ValueReader for FixedReader {
        fn network(&self) -> &NetworkId {
            &self.network
        }

        async fn read_latest(&self, _address: Address) -> ReadResult<I256> {
            Ok(I256::try_from(self.answer).unwrap())
        }
    }

    fn fixed(network: &str, answer: i64) -> Arc<dyn ValueReader> {
        Arc::new(FixedReader {
            network: NetworkId::new(network),
            answer,
        })
    }

    #[tokio::test]
    async fn test_routes_by_network() {
        let registry = ReaderRegistry::new()
            .with_reader(fixed("ethereum", 100))
            .with_reader(fixed("base", 200));

        assert_eq!(registry.len(), 2);

        let eth = registry
            .read_latest(&NetworkId::new("ethereum"), Address::ZERO)
            .await
            .unwrap();
        assert_eq!(eth, I256::try_from(100).unwrap());

        let base = registry
            .read_latest(&NetworkId::new("base"), Address::ZERO)
            .await
            .unwrap();
        assert_eq!(base, I256::try_from(200).unwrap());
    }

    #[tokio::test]
    async fn test_unknown_network() {
        let registry = ReaderRegistry::new().with_reader(fixed("ethereum", 1));
        let address = Address::repeat_byte(7);

        let err = registry
            .read_latest(&NetworkId::new("solana"), address)
            .await
            .unwrap_err();

        assert_eq!(err.cause, ReadFailure::UnknownNetwork);
        assert_eq!(err.network.as_str(), "solana");
        assert_eq!(err.address, address);
    }

    #[test]
    fn test_register_replaces() {
        let mut registry = ReaderRegistry::new();
        registry.register(fixed("bnb", 1));
        registry.register(fixed("bnb", 2));

        assert_eq!(registry.len(), 1);
        assert!(registry.contains(&NetworkId::new("bnb")));
    }
}
