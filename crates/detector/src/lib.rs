//! Feed deviation validation engine
//!
//! Features:
//! - Decimal normalization of raw oracle answers
//! - Fixed-threshold deviation classification
//! - Run-scoped exemption list
//! - Bounded concurrent evaluation with per-symbol failure isolation
//! - Aggregate report with per-symbol log lines and a final tally

pub mod normalizer;
pub mod classifier;
pub mod exemptions;
pub mod engine;
pub mod report;

pub use normalizer::{normalize, MAX_DECIMALS};
pub use classifier::{classify, deviation_percent, Classification};
pub use exemptions::ExemptionList;
pub use engine::{EvaluationError, FeedValidator};
pub use report::ValidationReport;
