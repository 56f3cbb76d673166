//! Category entity - A classification label for income and expense transactions.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Whether a category classifies income or expenses.
#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "snake_case")]
pub enum CategoryType {
    /// Money coming in
    #[sea_orm(string_value = "income")]
    Income,
    /// Money going out
    #[sea_orm(string_value = "expense")]
    Expense,
}

/// Category database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[sea_orm(table_name = "categories")]
pub struct Model {
    /// Unique identifier (UUID v4)
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    /// Human-readable name (e.g., "Groceries", "Salary")
    pub name: String,
    /// Income or expense
    pub category_type: CategoryType,
    /// Archived categories cannot be referenced by new transactions
    pub archived: bool,
    /// When the category was created
    pub created_at: DateTimeUtc,
}

/// Defines relationships between Category and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One category classifies many transactions
    #[sea_orm(has_many = "super::transaction::Entity")]
    Transactions,
    /// One category is the target of many budgets (one active per month)
    #[sea_orm(has_many = "super::budget::Entity")]
    Budgets,
}

impl Related<super::transaction::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Transactions.def()
    }
}

impl Related<super::budget::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Budgets.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
