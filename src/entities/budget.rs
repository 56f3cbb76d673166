//! Budget entity - A spending cap for one target in one month.
//!
//! The target is stored as two nullable columns guarded by a CHECK constraint; use
//! [`Model::target`] to read it as a [`BudgetTarget`](crate::core::budget::BudgetTarget).

use crate::core::budget::BudgetTarget;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Budget database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[sea_orm(table_name = "budgets")]
pub struct Model {
    /// Unique identifier (UUID v4)
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    /// First day of the budgeted month
    pub month: Date,
    /// Set when the target is a category
    pub category_id: Option<String>,
    /// Set when the target is a savings bucket
    pub savings_bucket_id: Option<String>,
    /// Cap in whole rupiah, always positive
    pub amount_idr: i64,
    /// Optional note
    pub note: Option<String>,
    /// Archived budgets are ignored by summaries and copies
    pub archived: bool,
    /// When the budget was created
    pub created_at: DateTimeUtc,
    /// When amount or note last changed
    pub updated_at: DateTimeUtc,
}

impl Model {
    /// Reads the stored column pair as a tagged target.
    ///
    /// The storage CHECK constraint guarantees exactly one column is set, so the
    /// error branch only fires on a corrupted row.
    pub fn target(&self) -> crate::errors::Result<BudgetTarget> {
        BudgetTarget::from_columns(self.category_id.clone(), self.savings_bucket_id.clone())
    }
}

/// Defines relationships between Budget and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Category-targeted budgets
    #[sea_orm(
        belongs_to = "super::category::Entity",
        from = "Column::CategoryId",
        to = "super::category::Column::Id"
    )]
    Category,
    /// Savings-bucket-targeted budgets
    #[sea_orm(
        belongs_to = "super::savings_bucket::Entity",
        from = "Column::SavingsBucketId",
        to = "super::savings_bucket::Column::Id"
    )]
    SavingsBucket,
}

impl Related<super::category::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Category.def()
    }
}

impl Related<super::savings_bucket::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::SavingsBucket.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
