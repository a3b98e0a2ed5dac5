//! Error types

use alloy_primitives::Address;
use std::path::PathBuf;
use thiserror::Error;

use crate::NetworkId;

/// Registry and manifest loading errors (fatal for a run)
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed registry document: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("Registry document must be a JSON object of feeds")]
    NotAnObject,

    #[error("Feed {0}: entry must be a JSON object")]
    InvalidEntry(String),

    #[error("Feed {symbol}: missing required field {field}")]
    MissingField { symbol: String, field: &'static str },

    #[error("Feed {symbol}: {field} must be a non-negative integer, got {value}")]
    InvalidDecimals {
        symbol: String,
        field: &'static str,
        value: String,
    },

    #[error("Feed {symbol}: {field} is not a valid address: {value}")]
    InvalidAddress {
        symbol: String,
        field: &'static str,
        value: String,
    },

    #[error("Feed {symbol}: {field} must be a network name, got {value}")]
    InvalidNetwork {
        symbol: String,
        field: &'static str,
        value: String,
    },
}

/// Why a single remote read failed
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReadFailure {
    #[error("no reader registered for network")]
    UnknownNetwork,

    #[error("endpoint unreachable: {0}")]
    Transport(String),

    #[error("request timed out")]
    Timeout,

    #[error("RPC error: {0}")]
    Rpc(String),

    #[error("malformed response: {0}")]
    Malformed(String),

    #[error("address is not a contract")]
    NotAContract,
}

/// Remote read error, recovered per symbol
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("read {address} on {network} failed: {cause}")]
pub struct ReadError {
    pub network: NetworkId,
    pub address: Address,
    pub cause: ReadFailure,
}

impl ReadError {
    pub fn new(network: NetworkId, address: Address, cause: ReadFailure) -> Self {
        Self { network, address, cause }
    }
}

/// Normalization and classification errors, recovered per symbol
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("Unsupported decimal precision: {0}")]
    InvalidDecimals(u32),

    #[error("Answer {0} cannot be represented as a real number")]
    UnrepresentableAnswer(String),

    #[error("Reference value is zero, deviation is undefined")]
    ZeroReference,

    #[error("Non-finite value: local={local}, reference={reference}")]
    NonFinite { local: f64, reference: f64 },
}

/// Configuration errors (fatal before any work starts)
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing credential: set {0}")]
    MissingCredential(&'static str),

    #[error("Invalid deviation threshold: {0}")]
    InvalidThreshold(f64),

    #[error("Invalid concurrency: must be at least 1")]
    InvalidConcurrency,

    #[error("Target network {0} has no configured endpoint")]
    UnknownTargetNetwork(String),

    #[error("Failed to load configuration: {0}")]
    Load(String),
}

/// Result type alias
pub type RegistryResult<T> = Result<T, RegistryError>;
pub type ReadResult<T> = Result<T, ReadError>;
pub type ValidationResult<T> = Result<T, ValidationError>;
pub type ConfigResult<T> = Result<T, ConfigError>;
