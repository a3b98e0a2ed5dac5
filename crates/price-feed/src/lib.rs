//! Oracle value readers
//!
//! Features:
//! - One reader per network behind a shared async trait
//! - Reader registry keyed by network identifier
//! - JSON-RPC `eth_call` reader for `latestAnswer()` with per-request timeout

pub mod reader;
pub mod rpc;

pub use reader::{ReaderRegistry, ValueReader};
pub use rpc::{JsonRpcReader, RpcReaderConfig};
