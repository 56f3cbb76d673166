//! Savings bucket entity - A named savings goal funded from wallets.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Savings bucket database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[sea_orm(table_name = "savings_buckets")]
pub struct Model {
    /// Unique identifier (UUID v4)
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    /// Human-readable name (e.g., "Emergency fund")
    pub name: String,
    /// Optional goal amount in whole rupiah
    pub target_amount_idr: Option<i64>,
    /// Archived buckets cannot be referenced by new transactions
    pub archived: bool,
    /// When the bucket was created
    pub created_at: DateTimeUtc,
}

/// Defines relationships between `SavingsBucket` and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One bucket has many postings
    #[sea_orm(has_many = "super::posting::Entity")]
    Postings,
    /// One bucket is the target of many budgets (one active per month)
    #[sea_orm(has_many = "super::budget::Entity")]
    Budgets,
}

impl Related<super::posting::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Postings.def()
    }
}

impl Related<super::budget::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Budgets.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
