/// Database configuration and connection management
pub mod database;

/// Ledger tunables loading from config.toml
pub mod ledger;

pub use ledger::LedgerConfig;
