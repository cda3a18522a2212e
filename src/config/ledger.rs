//! Ledger configuration loading from config.toml
//!
//! The engine's tunables (default period count, tolerances, which payment methods settle
//! instantly) live under a `[ledger]` table. Every field has a default, so an absent file
//! or an empty table yields the reference behavior.

use crate::entities::PaymentMethod;
use crate::errors::{Error, Result};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Deserialize;
use std::path::Path;

/// Default location of the configuration file
pub const DEFAULT_CONFIG_PATH: &str = "config.toml";

/// Configuration structure representing the entire config.toml file
#[derive(Debug, Default, Deserialize)]
pub struct Config {
    /// Ledger engine settings
    #[serde(default)]
    pub ledger: LedgerConfig,
}

/// Tunables for schedule generation, payment validation and reconciliation
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    /// Number of periods generated for a new debt
    pub default_period_count: u32,
    /// How far a payment may exceed the remaining balance and still be accepted
    pub payment_tolerance: Decimal,
    /// Gap between amount due and settled amount below which a debt counts as fully paid.
    ///
    /// The gap is measured from zero too: a debt whose `amount_due` is below this value
    /// snaps to `PAID` at creation, with nothing paid and no schedule. Lower it (or set it
    /// to zero) when such small debts must be tracked.
    pub settlement_tolerance: Decimal,
    /// Methods that are confirmed at submission instead of waiting for review
    pub instant_methods: Vec<PaymentMethod>,
    /// Recorded as confirmer when an instant payment has no creator
    pub system_actor: String,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            default_period_count: 12,
            payment_tolerance: dec!(0.01),
            settlement_tolerance: dec!(1000),
            instant_methods: vec![PaymentMethod::Cash],
            system_actor: "system".to_string(),
        }
    }
}

impl LedgerConfig {
    /// Whether payments made with `method` skip the pending/confirm handshake.
    #[must_use]
    pub fn is_instant(&self, method: PaymentMethod) -> bool {
        self.instant_methods.contains(&method)
    }

    /// Rejects settings the engine cannot work with.
    pub fn validate(&self) -> Result<()> {
        if self.default_period_count == 0 {
            return Err(Error::Config {
                message: "default_period_count must be at least 1".to_string(),
            });
        }
        if self.payment_tolerance.is_sign_negative() || self.settlement_tolerance.is_sign_negative()
        {
            return Err(Error::Config {
                message: "tolerances cannot be negative".to_string(),
            });
        }
        Ok(())
    }
}

/// Loads ledger configuration from a TOML file
///
/// # Errors
/// Returns an error if:
/// - The file cannot be read
/// - The TOML syntax is invalid
/// - A setting fails [`LedgerConfig::validate`]
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<LedgerConfig> {
    let contents = std::fs::read_to_string(path.as_ref()).map_err(|e| Error::Config {
        message: format!("Failed to read config file: {e}"),
    })?;

    parse_config(&contents)
}

/// Parses ledger configuration from TOML text.
pub fn parse_config(contents: &str) -> Result<LedgerConfig> {
    let config: Config = toml::from_str(contents).map_err(|e| Error::Config {
        message: format!("Failed to parse config.toml: {e}"),
    })?;
    config.ledger.validate()?;
    Ok(config.ledger)
}

/// Loads ledger configuration from the default location (./config.toml),
/// falling back to defaults when the file does not exist.
pub fn load_default_config() -> Result<LedgerConfig> {
    if Path::new(DEFAULT_CONFIG_PATH).exists() {
        load_config(DEFAULT_CONFIG_PATH)
    } else {
        tracing::info!("No {DEFAULT_CONFIG_PATH} found, using default ledger settings");
        Ok(LedgerConfig::default())
    }
}
