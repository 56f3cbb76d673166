//! Posting entity - One signed ledger line tying a transaction to a wallet or savings bucket.
//!
//! Exactly one of `wallet_id` / `savings_bucket_id` is set. Postings are only ever
//! written together with their owning transaction.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Posting database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[sea_orm(table_name = "postings")]
pub struct Model {
    /// Unique identifier (UUID v4)
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    /// Owning transaction
    pub event_id: String,
    /// Wallet this line moves money in or out of
    pub wallet_id: Option<String>,
    /// Savings bucket this line moves money in or out of
    pub savings_bucket_id: Option<String>,
    /// Signed whole-rupiah amount, never zero
    pub amount_idr: i64,
}

/// Defines relationships between Posting and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each posting belongs to exactly one transaction
    #[sea_orm(
        belongs_to = "super::transaction::Entity",
        from = "Column::EventId",
        to = "super::transaction::Column::Id"
    )]
    Transaction,
    /// Wallet-side postings
    #[sea_orm(
        belongs_to = "super::wallet::Entity",
        from = "Column::WalletId",
        to = "super::wallet::Column::Id"
    )]
    Wallet,
    /// Bucket-side postings
    #[sea_orm(
        belongs_to = "super::savings_bucket::Entity",
        from = "Column::SavingsBucketId",
        to = "super::savings_bucket::Column::Id"
    )]
    SavingsBucket,
}

impl Related<super::transaction::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Transaction.def()
    }
}

impl Related<super::wallet::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Wallet.def()
    }
}

impl Related<super::savings_bucket::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::SavingsBucket.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
