//! Run report and its log rendering

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use feedcheck_core::{RunSummary, ValidationOutcome, ValidationStatus};

/// Outcomes of one run, sorted by symbol, plus their tally
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub threshold_percent: f64,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub summary: RunSummary,
    pub outcomes: Vec<ValidationOutcome>,
}

impl ValidationReport {
    pub fn new(
        threshold_percent: f64,
        mut outcomes: Vec<ValidationOutcome>,
        started_at: DateTime<Utc>,
        finished_at: DateTime<Utc>,
    ) -> Self {
        outcomes.sort_by(|a, b| a.symbol.cmp(&b.symbol));
        let summary = RunSummary::from_outcomes(&outcomes);

        Self {
            threshold_percent,
            started_at,
            finished_at,
            summary,
            outcomes,
        }
    }

    pub fn outcome(&self, symbol: &str) -> Option<&ValidationOutcome> {
        self.outcomes
            .binary_search_by(|o| o.symbol.as_str().cmp(symbol))
            .ok()
            .map(|i| &self.outcomes[i])
    }

    pub fn with_status(&self, status: ValidationStatus) -> impl Iterator<Item = &ValidationOutcome> {
        self.outcomes.iter().filter(move |o| o.status == status)
    }

    /// Outcomes an operator has to look at
    pub fn failures(&self) -> impl Iterator<Item = &ValidationOutcome> {
        self.outcomes
            .iter()
            .filter(|o| matches!(o.status, ValidationStatus::NotOk | ValidationStatus::Errored))
    }

    /// Per-symbol line for NOT OK and ERRORED outcomes
    pub fn failure_line(outcome: &ValidationOutcome) -> Option<String> {
        match outcome.status {
            ValidationStatus::NotOk => Some(format!(
                "{} deviation - {:.4}% status - {}; reference answer - {}; our feed answer - {}",
                outcome.symbol,
                outcome.deviation_percent.unwrap_or(f64::NAN),
                outcome.status,
                display_value(outcome.reference_value),
                display_value(outcome.local_value),
            )),
            ValidationStatus::Errored => Some(format!(
                "{} {}: {}",
                outcome.symbol,
                outcome.status,
                outcome.error.as_deref().unwrap_or("unknown error"),
            )),
            _ => None,
        }
    }

    pub fn tally_line(&self) -> String {
        let s = &self.summary;
        format!(
            "total feeds count - {}; ok - {}; not ok - {}; exempt - {}; errored - {}; not found - {}",
            s.total_feeds, s.ok_count, s.not_ok_count, s.exception_count, s.error_count, s.not_found_count
        )
    }

    /// Write the per-symbol lines and the tally to the log
    pub fn emit(&self) {
        info!("Threshold deviation - {}%", self.threshold_percent);

        for outcome in &self.outcomes {
            match outcome.status {
                ValidationStatus::NotOk => {
                    if let Some(line) = Self::failure_line(outcome) {
                        warn!("{}", line);
                    }
                }
                ValidationStatus::Errored => {
                    if let Some(line) = Self::failure_line(outcome) {
                        error!("{}", line);
                    }
                }
                ValidationStatus::SkippedException => info!(
                    "{} exempt: reference {} on {} was deprecated upstream",
                    outcome.symbol,
                    outcome
                        .reference_address
                        .map(|a| a.to_string())
                        .unwrap_or_else(|| "-".to_string()),
                    outcome
                        .reference_network
                        .as_ref()
                        .map(|n| n.to_string())
                        .unwrap_or_else(|| "-".to_string()),
                ),
                ValidationStatus::SkippedNotFound => {
                    info!("{} not found: no local deployment or reference oracle", outcome.symbol)
                }
                ValidationStatus::Ok => debug!(
                    "{} ok, deviation {:.4}%",
                    outcome.symbol,
                    outcome.deviation_percent.unwrap_or_default()
                ),
            }
        }

        info!("{}", self.tally_line());
    }
}

fn display_value(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_else(|| "-".to_string())
}
