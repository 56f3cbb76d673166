//! Transaction entity - One user-initiated financial event.
//!
//! A transaction owns one or two postings whose shape is fixed by `transaction_type`.
//! Rows are never physically removed; `deleted_at` marks a soft delete and excludes
//! the transaction's postings from every balance and budget computation.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// The five kinds of money movement the ledger records.
#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "snake_case")]
pub enum TransactionType {
    /// Money leaves a wallet against an expense category
    #[sea_orm(string_value = "expense")]
    Expense,
    /// Money enters a wallet
    #[sea_orm(string_value = "income")]
    Income,
    /// Money moves between two wallets
    #[sea_orm(string_value = "transfer")]
    Transfer,
    /// Money moves from a wallet into a savings bucket
    #[sea_orm(string_value = "savings_contribution")]
    SavingsContribution,
    /// Money moves from a savings bucket back into a wallet
    #[sea_orm(string_value = "savings_withdrawal")]
    SavingsWithdrawal,
}

/// Transaction database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[sea_orm(table_name = "transactions")]
pub struct Model {
    /// Unique identifier (UUID v4)
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    /// Kind of movement; immutable after creation
    pub transaction_type: TransactionType,
    /// Calendar date the movement happened
    pub occurred_at: Date,
    /// Free-form note (may be empty)
    pub note: String,
    /// Who was paid or who paid
    pub payee: Option<String>,
    /// Only set for expense and income transactions
    pub category_id: Option<String>,
    /// When the row was created
    pub created_at: DateTimeUtc,
    /// When the row (or its posting set) was last replaced
    pub updated_at: DateTimeUtc,
    /// Soft delete marker
    pub deleted_at: Option<DateTimeUtc>,
}

/// Defines relationships between Transaction and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One transaction owns its postings
    #[sea_orm(has_many = "super::posting::Entity")]
    Postings,
    /// Expense and income transactions may belong to a category
    #[sea_orm(
        belongs_to = "super::category::Entity",
        from = "Column::CategoryId",
        to = "super::category::Column::Id"
    )]
    Category,
}

impl Related<super::posting::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Postings.def()
    }
}

impl Related<super::category::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Category.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
