//! Per-symbol validation outcomes and the run summary

use alloy_primitives::Address;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::NetworkId;

/// Terminal state of one symbol's evaluation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ValidationStatus {
    Ok,
    NotOk,
    SkippedException,
    SkippedNotFound,
    Errored,
}

impl ValidationStatus {
    pub fn name(&self) -> &'static str {
        match self {
            ValidationStatus::Ok => "OK",
            ValidationStatus::NotOk => "NOT OK",
            ValidationStatus::SkippedException => "EXEMPT",
            ValidationStatus::SkippedNotFound => "NOT FOUND",
            ValidationStatus::Errored => "ERRORED",
        }
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self, ValidationStatus::SkippedException | ValidationStatus::SkippedNotFound)
    }
}

impl fmt::Display for ValidationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Result of evaluating one symbol
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationOutcome {
    pub symbol: String,
    pub status: ValidationStatus,
    pub local_value: Option<f64>,
    pub reference_value: Option<f64>,
    pub deviation_percent: Option<f64>,
    pub reference_network: Option<NetworkId>,
    pub reference_address: Option<Address>,
    pub error: Option<String>,
}

impl ValidationOutcome {
    fn bare(symbol: impl Into<String>, status: ValidationStatus) -> Self {
        Self {
            symbol: symbol.into(),
            status,
            local_value: None,
            reference_value: None,
            deviation_percent: None,
            reference_network: None,
            reference_address: None,
            error: None,
        }
    }

    pub fn exempt(symbol: impl Into<String>) -> Self {
        Self::bare(symbol, ValidationStatus::SkippedException)
    }

    pub fn not_found(symbol: impl Into<String>) -> Self {
        Self::bare(symbol, ValidationStatus::SkippedNotFound)
    }

    pub fn errored(symbol: impl Into<String>, error: impl fmt::Display) -> Self {
        let mut outcome = Self::bare(symbol, ValidationStatus::Errored);
        outcome.error = Some(error.to_string());
        outcome
    }

    /// Completed comparison; `status` must be `Ok` or `NotOk`
    pub fn compared(
        symbol: impl Into<String>,
        status: ValidationStatus,
        local_value: f64,
        reference_value: f64,
        deviation_percent: f64,
    ) -> Self {
        debug_assert!(matches!(status, ValidationStatus::Ok | ValidationStatus::NotOk));
        let mut outcome = Self::bare(symbol, status);
        outcome.local_value = Some(local_value);
        outcome.reference_value = Some(reference_value);
        outcome.deviation_percent = Some(deviation_percent);
        outcome
    }

    /// Attach the reference location for log lines
    pub fn with_reference(mut self, network: Option<NetworkId>, address: Option<Address>) -> Self {
        self.reference_network = network;
        self.reference_address = address;
        self
    }
}

/// Aggregate counts for one run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    pub total_feeds: usize,
    pub ok_count: usize,
    pub not_ok_count: usize,
    pub exception_count: usize,
    pub error_count: usize,
    pub not_found_count: usize,
}

impl RunSummary {
    pub fn record(&mut self, status: ValidationStatus) {
        self.total_feeds += 1;
        match status {
            ValidationStatus::Ok => self.ok_count += 1,
            ValidationStatus::NotOk => self.not_ok_count += 1,
            ValidationStatus::SkippedException => self.exception_count += 1,
            ValidationStatus::SkippedNotFound => self.not_found_count += 1,
            ValidationStatus::Errored => self.error_count += 1,
        }
    }

    pub fn from_outcomes<'a>(outcomes: impl IntoIterator<Item = &'a ValidationOutcome>) -> Self {
        let mut summary = Self::default();
        for outcome in outcomes {
            summary.record(outcome.status);
        }
        summary
    }

    pub fn count(&self, status: ValidationStatus) -> usize {
        match status {
            ValidationStatus::Ok => self.ok_count,
            ValidationStatus::NotOk => self.not_ok_count,
            ValidationStatus::SkippedException => self.exception_count,
            ValidationStatus::SkippedNotFound => self.not_found_count,
            ValidationStatus::Errored => self.error_count,
        }
    }

    /// The five status counts add up to the total
    pub fn is_consistent(&self) -> bool {
        self.ok_count + self.not_ok_count + self.exception_count + self.error_count + self.not_found_count
            == self.total_feeds
    }

    /// Every checked feed was within tolerance and nothing errored
    pub fn is_clean(&self) -> bool {
        self.not_ok_count == 0 && self.error_count == 0
    }
}
