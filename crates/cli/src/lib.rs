//! Command-line front end for the feed deviation checker
//!
//! Loads configuration and credentials, builds one reader per network and
//! persists the final report.

pub mod args;
pub mod settings;
pub mod bootstrap;
pub mod output;

pub use args::Cli;
pub use bootstrap::build_readers;
pub use output::write_report;
pub use settings::{Settings, API_KEY_VAR, RPC_URL_VAR};
