//! Core types for the feed deviation checker
//!
//! This crate provides shared types used across all components:
//! - Network identifiers and feed descriptors
//! - Feed registry and deployment manifest loading
//! - Validation outcomes and run summaries
//! - Run-scoped validation configuration
//! - Error taxonomy

pub mod types;
pub mod registry;
pub mod outcome;
pub mod config;
pub mod errors;

pub use types::*;
pub use registry::*;
pub use outcome::*;
pub use config::*;
pub use errors::*;
