//! Reference data seeding from the settings file.

use crate::{
    config::settings::Settings,
    core::{category::create_category, wallet::create_wallet},
    entities::{Category, Wallet, category, wallet},
    errors::Result,
};
use sea_orm::prelude::*;
use serde::Serialize;
use tracing::{info, instrument};

/// How many records [`seed_reference_data`] created.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SeedReport {
    /// Wallets created
    pub wallets_created: usize,
    /// Categories created
    pub categories_created: usize,
}

/// Creates the wallets and categories listed in `settings` that do not exist yet.
///
/// Matching is by trimmed name (and type, for categories), archived records included,
/// so re-running never duplicates and never resurrects an archived record.
#[instrument(skip(db, settings))]
pub async fn seed_reference_data(db: &DatabaseConnection, settings: &Settings) -> Result<SeedReport> {
    let mut report = SeedReport::default();

    for seed in &settings.wallets {
        let name = seed.name.trim();
        let existing = Wallet::find()
            .filter(wallet::Column::Name.eq(name))
            .one(db)
            .await?;
        if existing.is_none() {
            create_wallet(db, name).await?;
            report.wallets_created += 1;
        }
    }

    for seed in &settings.categories {
        let name = seed.name.trim();
        let existing = Category::find()
            .filter(category::Column::Name.eq(name))
            .filter(category::Column::CategoryType.eq(seed.category_type))
            .one(db)
            .await?;
        if existing.is_none() {
            create_category(db, name, seed.category_type).await?;
            report.categories_created += 1;
        }
    }

    info!(
        wallets = report.wallets_created,
        categories = report.categories_created,
        "Seeded reference data"
    );
    Ok(report)
}
