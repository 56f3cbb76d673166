//! Wallet entity - A money-holding account (cash, bank account, e-wallet).
//!
//! Wallets carry no stored balance; the balance is always derived from postings.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Wallet database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[sea_orm(table_name = "wallets")]
pub struct Model {
    /// Unique identifier (UUID v4)
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    /// Human-readable name (e.g., "BCA", "Cash")
    pub name: String,
    /// Archived wallets cannot be referenced by new transactions
    pub archived: bool,
    /// When the wallet was created
    pub created_at: DateTimeUtc,
}

/// Defines relationships between Wallet and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One wallet has many postings
    #[sea_orm(has_many = "super::posting::Entity")]
    Postings,
}

impl Related<super::posting::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Postings.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
