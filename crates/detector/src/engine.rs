//! Validation driver
//!
//! Walks the registry and evaluates every symbol to a terminal outcome:
//! exempt, not found, errored, ok or not ok. Symbols are evaluated up to
//! `max_concurrency` at a time; within one symbol the local read happens
//! before the reference read. No outcome is retried.

use alloy_primitives::Address;
use chrono::Utc;
use dashmap::DashMap;
use futures::stream::{self, StreamExt};
use std::time::Instant;
use thiserror::Error;
use tracing::{debug, info};

use feedcheck_core::{
    ConfigResult, FeedDescriptor, FeedRegistry, NetworkId, ReadError, ValidationConfig,
    ValidationError, ValidationOutcome,
};
use feedcheck_price_feed::ReaderRegistry;

use crate::classifier::classify;
use crate::exemptions::ExemptionList;
use crate::normalizer::normalize;
use crate::report::ValidationReport;

/// Anything that can fail inside one symbol's evaluation
#[derive(Debug, Error)]
pub enum EvaluationError {
    #[error("local {0}")]
    LocalRead(ReadError),

    #[error("reference {0}")]
    ReferenceRead(ReadError),

    #[error(transparent)]
    Validation(#[from] ValidationError),
}

/// Compares every feed in a registry against its reference oracle
#[derive(Debug)]
pub struct FeedValidator {
    config: ValidationConfig,
    exemptions: ExemptionList,
    readers: ReaderRegistry,
}

impl FeedValidator {
    pub fn new(config: ValidationConfig, readers: ReaderRegistry) -> ConfigResult<Self> {
        config.validate()?;

        let exemptions = ExemptionList::new(config.exemptions.iter().cloned());
        Ok(Self {
            config,
            exemptions,
            readers,
        })
    }

    pub fn config(&self) -> &ValidationConfig {
        &self.config
    }

    /// Evaluate every registry entry and fold the outcomes into a report
    pub async fn run(&self, registry: &FeedRegistry) -> ValidationReport {
        let started_at = Utc::now();
        let start = Instant::now();

        info!(
            "Validating {} feeds on {} (threshold {}%, concurrency {})",
            registry.len(),
            self.config.local_network,
            self.config.threshold_percent,
            self.config.max_concurrency
        );

        let outcomes: DashMap<String, ValidationOutcome> = DashMap::with_capacity(registry.len());

        stream::iter(registry.iter())
            .for_each_concurrent(self.config.max_concurrency, |feed| {
                let outcomes = &outcomes;
                async move {
                    let outcome = self.evaluate(feed).await;
                    outcomes.insert(outcome.symbol.clone(), outcome);
                }
            })
            .await;

        debug!("Evaluated {} feeds in {:?}", outcomes.len(), start.elapsed());

        ValidationReport::new(
            self.config.threshold_percent,
            outcomes.into_iter().map(|(_, outcome)| outcome).collect(),
            started_at,
            Utc::now(),
        )
    }

    /// Drive one symbol to its terminal outcome
    pub async fn evaluate(&self, feed: &FeedDescriptor) -> ValidationOutcome {
        let symbol = feed.symbol.as_str();

        let outcome = if self.exemptions.is_exempt(symbol) {
            ValidationOutcome::exempt(symbol)
        } else {
            match (feed.local_address, feed.reference()) {
                (Some(local), Some((network, reference))) => {
                    match self.compare(feed, local, network, reference).await {
                        Ok(outcome) => outcome,
                        Err(e) => ValidationOutcome::errored(symbol, e),
                    }
                }
                _ => ValidationOutcome::not_found(symbol),
            }
        };

        debug!("{}: {}", symbol, outcome.status);
        outcome.with_reference(feed.reference_network.clone(), feed.reference_address)
    }

    async fn compare(
        &self,
        feed: &FeedDescriptor,
        local: Address,
        network: &NetworkId,
        reference: Address,
    ) -> Result<ValidationOutcome, EvaluationError> {
        let local_raw = self
            .readers
            .read_latest(&self.config.local_network, local)
            .await
            .map_err(EvaluationError::LocalRead)?;

        let reference_raw = self
            .readers
            .read_latest(network, reference)
            .await
            .map_err(EvaluationError::ReferenceRead)?;

        let local_value = normalize(local_raw, feed.local_decimals)?;
        let reference_value = normalize(reference_raw, feed.reference_decimals)?;
        let classification = classify(local_value, reference_value, self.config.threshold_percent)?;

        Ok(ValidationOutcome::compared(
            feed.symbol.as_str(),
            classification.status,
            local_value,
            reference_value,
            classification.deviation_percent,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::I256;
    use feedcheck_core::{ConfigError, ReadFailure, ReadResult, ValidationStatus};
    use feedcheck_price_feed::ValueReader;
    use std::collections::HashMap;
    use std::sync::Arc;

    struct MapReader {
        network: NetworkId,
        answers: HashMap<Address, i64>,
    }

    #[async_trait::async_trait]
    impl ValueReader for MapReader {
        fn network(&self) -> &NetworkId {
            &self.network
        }

        async fn read_latest(&self, address: Address) -> ReadResult<I256> {
            self.answers
                .get(&address)
                .map(|answer| I256::try_from(*answer).unwrap())
                .ok_or_else(|| ReadError::new(self.network.clone(), address, ReadFailure::NotAContract))
        }
    }

    fn reader(network: &str, answers: &[(u8, i64)]) -> Arc<dyn ValueReader> {
        Arc::new(MapReader {
            network: NetworkId::new(network),
            answers: answers
                .iter()
                .map(|(byte, answer)| (Address::repeat_byte(*byte), *answer))
                .collect(),
        })
    }

    fn feed(symbol: &str, local: u8, reference: u8, local_decimals: u32, reference_decimals: u32) -> FeedDescriptor {
        FeedDescriptor {
            symbol: symbol.to_string(),
            local_address: Some(Address::repeat_byte(local)),
            reference_network: Some(NetworkId::new("ethereum")),
            reference_address: Some(Address::repeat_byte(reference)),
            local_decimals,
            reference_decimals,
        }
    }

    fn validator(local: &[(u8, i64)], reference: &[(u8, i64)]) -> FeedValidator {
        let readers = ReaderRegistry::new()
            .with_reader(reader("opbnb", local))
            .with_reader(reader("ethereum", reference));
        FeedValidator::new(ValidationConfig::default(), readers).unwrap()
    }

    #[tokio::test]
    async fn test_mixed_decimals_match() {
        let validator = validator(&[(1, 100)], &[(2, 10_000)]);
        let outcome = validator.evaluate(&feed("A", 1, 2, 2, 4)).await;

        assert_eq!(outcome.status, ValidationStatus::Ok);
        assert_eq!(outcome.local_value, Some(1.0));
        assert_eq!(outcome.reference_value, Some(1.0));
        assert_eq!(outcome.deviation_percent, Some(0.0));
    }

    #[tokio::test]
    async fn test_boundary_is_ok() {
        let validator = validator(&[(1, 9_500)], &[(2, 10_000)]);
        let outcome = validator.evaluate(&feed("B", 1, 2, 2, 2)).await;

        assert_eq!(outcome.deviation_percent, Some(5.0));
        assert_eq!(outcome.status, ValidationStatus::Ok);
    }

    #[tokio::test]
    async fn test_zero_reference_errors() {
        let validator = validator(&[(1, 100)], &[(2, 0)]);
        let outcome = validator.evaluate(&feed("Z", 1, 2, 2, 2)).await;

        assert_eq!(outcome.status, ValidationStatus::Errored);
        assert!(outcome.error.unwrap().contains("zero"));
        assert!(outcome.deviation_percent.is_none());
    }

    #[tokio::test]
    async fn test_local_read_failure_errors() {
        let validator = validator(&[], &[(2, 100)]);
        let outcome = validator.evaluate(&feed("L", 1, 2, 2, 2)).await;

        assert_eq!(outcome.status, ValidationStatus::Errored);
        assert!(outcome.error.unwrap().starts_with("local"));
    }

    #[tokio::test]
    async fn test_unregistered_reference_network_errors() {
        let validator = validator(&[(1, 100)], &[(2, 100)]);
        let mut descriptor = feed("N", 1, 2, 2, 2);
        descriptor.reference_network = Some(NetworkId::new("fantom"));

        let outcome = validator.evaluate(&descriptor).await;
        assert_eq!(outcome.status, ValidationStatus::Errored);
        assert_eq!(outcome.reference_network, Some(NetworkId::new("fantom")));
    }

    #[tokio::test]
    async fn test_oversized_scale_errors() {
        let validator = validator(&[(1, 100)], &[(2, 100)]);
        let outcome = validator.evaluate(&feed("D", 1, 2, 99, 2)).await;

        assert_eq!(outcome.status, ValidationStatus::Errored);
    }

    #[test]
    fn test_rejects_invalid_config() {
        let config = ValidationConfig {
            max_concurrency: 0,
            ..Default::default()
        };
        let err = FeedValidator::new(config, ReaderRegistry::new()).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidConcurrency));
    }
}
