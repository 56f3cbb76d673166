//! Wallet business logic - Creating, archiving and looking up wallets.
//!
//! Wallets are only referenced by postings, never owned; archiving one stops new
//! transactions from using it but leaves its history and balance intact.

use crate::{
    entities::{Wallet, wallet},
    errors::{Error, Resource, Result},
};
use chrono::Utc;
use sea_orm::{QueryOrder, Set, prelude::*};
use tracing::{info, instrument};
use uuid::Uuid;

/// Creates a new, active wallet.
///
/// The name is trimmed and must not be empty.
#[instrument(skip(db))]
pub async fn create_wallet(db: &DatabaseConnection, name: &str) -> Result<wallet::Model> {
    let name = name.trim();
    if name.is_empty() {
        return Err(Error::validation("Wallet name cannot be empty"));
    }

    let wallet = wallet::ActiveModel {
        id: Set(Uuid::new_v4().to_string()),
        name: Set(name.to_string()),
        archived: Set(false),
        created_at: Set(Utc::now()),
    }
    .insert(db)
    .await?;

    info!(wallet_id = %wallet.id, "Created wallet");
    Ok(wallet)
}

/// Finds a wallet by id, archived or not.
pub async fn get_wallet_by_id<C>(db: &C, wallet_id: &str) -> Result<Option<wallet::Model>>
where
    C: ConnectionTrait,
{
    Wallet::find_by_id(wallet_id.to_string())
        .one(db)
        .await
        .map_err(Into::into)
}

/// Loads a wallet that a new posting is about to reference.
///
/// Fails with `NotFound` when it does not exist and `ArchivedReference` when archived.
pub async fn require_active_wallet<C>(db: &C, wallet_id: &str) -> Result<wallet::Model>
where
    C: ConnectionTrait,
{
    let wallet = get_wallet_by_id(db, wallet_id)
        .await?
        .ok_or_else(|| Error::not_found(Resource::Wallet, wallet_id))?;
    if wallet.archived {
        return Err(Error::archived(Resource::Wallet, wallet_id));
    }
    Ok(wallet)
}

/// Retrieves all active wallets, ordered alphabetically by name.
pub async fn get_all_active_wallets(db: &DatabaseConnection) -> Result<Vec<wallet::Model>> {
    Wallet::find()
        .filter(wallet::Column::Archived.eq(false))
        .order_by_asc(wallet::Column::Name)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Archives a wallet. Archiving twice is a no-op.
#[instrument(skip(db))]
pub async fn archive_wallet(db: &DatabaseConnection, wallet_id: &str) -> Result<wallet::Model> {
    set_archived(db, wallet_id, true).await
}

/// Restores an archived wallet. Restoring an active wallet is a no-op.
#[instrument(skip(db))]
pub async fn restore_wallet(db: &DatabaseConnection, wallet_id: &str) -> Result<wallet::Model> {
    set_archived(db, wallet_id, false).await
}

async fn set_archived(
    db: &DatabaseConnection,
    wallet_id: &str,
    archived: bool,
) -> Result<wallet::Model> {
    let wallet = get_wallet_by_id(db, wallet_id)
        .await?
        .ok_or_else(|| Error::not_found(Resource::Wallet, wallet_id))?;
    if wallet.archived == archived {
        return Ok(wallet);
    }

    let mut active_model: wallet::ActiveModel = wallet.into();
    active_model.archived = Set(archived);
    let updated = active_model.update(db).await?;
    info!(wallet_id, archived, "Wallet archive state changed");
    Ok(updated)
}
