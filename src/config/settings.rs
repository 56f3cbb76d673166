//! Ledger settings loading from ledger.toml
//!
//! The settings file tunes budget aggregation and bulk limits and lists the wallets and
//! categories to seed on first run. Every section is optional; a missing file yields the
//! defaults.

use crate::{
    core::{bulk::DEFAULT_MAX_BULK_BATCH, summary::SavingsSpendPolicy},
    entities::CategoryType,
    errors::{Error, Result},
};
use serde::Deserialize;
use std::path::Path;
use tracing::{debug, info};

/// Configuration structure representing the entire ledger.toml file
#[derive(Debug, Default, Deserialize)]
pub struct Settings {
    /// Budget aggregation and bulk-operation tuning
    #[serde(default)]
    pub budget: BudgetSettings,
    /// Wallets to seed
    #[serde(default)]
    pub wallets: Vec<WalletSeed>,
    /// Categories to seed
    #[serde(default)]
    pub categories: Vec<CategorySeed>,
}

/// The `[budget]` section
#[derive(Debug, Clone, Deserialize)]
pub struct BudgetSettings {
    /// How savings-bucket budgets measure progress
    #[serde(default)]
    pub savings_policy: SavingsSpendPolicy,
    /// Largest number of ids accepted by one bulk operation
    #[serde(default = "default_max_bulk_batch")]
    pub max_bulk_batch: usize,
}

impl Default for BudgetSettings {
    fn default() -> Self {
        Self {
            savings_policy: SavingsSpendPolicy::default(),
            max_bulk_batch: DEFAULT_MAX_BULK_BATCH,
        }
    }
}

const fn default_max_bulk_batch() -> usize {
    DEFAULT_MAX_BULK_BATCH
}

/// A wallet listed under `[[wallets]]`
#[derive(Debug, Clone, Deserialize)]
pub struct WalletSeed {
    /// Wallet name
    pub name: String,
}

/// A category listed under `[[categories]]`
#[derive(Debug, Clone, Deserialize)]
pub struct CategorySeed {
    /// Category name
    pub name: String,
    /// `"income"` or `"expense"`
    #[serde(rename = "type")]
    pub category_type: CategoryType,
}

/// Loads settings from a TOML file
///
/// # Errors
/// Returns an error if:
/// - The file cannot be read
/// - The TOML syntax is invalid
/// - A value has the wrong type (e.g. an unknown savings policy)
pub fn load_settings<P: AsRef<Path>>(path: P) -> Result<Settings> {
    let path_ref = path.as_ref();
    debug!("Loading settings from: {:?}", path_ref);
    let contents = std::fs::read_to_string(path_ref).map_err(|e| Error::Config {
        message: format!("Failed to read settings file {}: {e}", path_ref.display()),
    })?;

    toml::from_str(&contents).map_err(|e| Error::Config {
        message: format!("Failed to parse {}: {e}", path_ref.display()),
    })
}

/// Loads settings from `LEDGER_SETTINGS` (default `./ledger.toml`), falling back to
/// defaults when the file does not exist.
pub fn load_default_settings() -> Result<Settings> {
    let path = std::env::var("LEDGER_SETTINGS").unwrap_or_else(|_| "ledger.toml".to_string());
    if Path::new(&path).exists() {
        load_settings(path)
    } else {
        info!("No settings file at {path}, using defaults.");
        Ok(Settings::default())
    }
}
