//! Shared test utilities for `LedgerBuddy`.
//!
//! This module provides common helper functions for setting up test databases
//! and creating test records with sensible defaults.

use crate::{
    core::{
        budget::{self, BudgetTarget},
        category,
        ledger::{self, LedgerEntry, TransactionDetails, TransactionInput},
        month::MonthKey,
        savings_bucket, wallet,
    },
    entities::{self, CategoryType},
    errors::Result,
};
use chrono::NaiveDate;
use sea_orm::DatabaseConnection;

/// Creates an in-memory `SQLite` database with all tables initialized.
/// This is the standard setup for all integration tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// Shorthand for a calendar date.
///
/// # Panics
/// Panics on an impossible date.
#[allow(clippy::unwrap_used)]
pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

/// Creates an active wallet.
pub async fn create_test_wallet(db: &DatabaseConnection, name: &str) -> Result<entities::WalletModel> {
    wallet::create_wallet(db, name).await
}

/// Creates an active expense category.
pub async fn create_test_category(
    db: &DatabaseConnection,
    name: &str,
) -> Result<entities::CategoryModel> {
    category::create_category(db, name, CategoryType::Expense).await
}

/// Creates an active income category.
pub async fn create_test_income_category(
    db: &DatabaseConnection,
    name: &str,
) -> Result<entities::CategoryModel> {
    category::create_category(db, name, CategoryType::Income).await
}

/// Creates an active savings bucket without a goal amount.
pub async fn create_test_savings_bucket(
    db: &DatabaseConnection,
    name: &str,
) -> Result<entities::savings_bucket::Model> {
    savings_bucket::create_savings_bucket(db, name, None).await
}

/// Records uncategorized income into a wallet.
pub async fn create_test_income(
    db: &DatabaseConnection,
    wallet_id: &str,
    amount_idr: i64,
    occurred_at: NaiveDate,
) -> Result<LedgerEntry> {
    let details = TransactionDetails::Income {
        wallet_id: wallet_id.to_string(),
        category_id: None,
    };
    ledger::create_transaction(db, TransactionInput::new(details, amount_idr, occurred_at)).await
}

/// Records an expense from a wallet.
pub async fn create_test_expense(
    db: &DatabaseConnection,
    wallet_id: &str,
    category_id: &str,
    amount_idr: i64,
    occurred_at: NaiveDate,
) -> Result<LedgerEntry> {
    let details = TransactionDetails::Expense {
        wallet_id: wallet_id.to_string(),
        category_id: category_id.to_string(),
    };
    ledger::create_transaction(db, TransactionInput::new(details, amount_idr, occurred_at)).await
}

/// Records a transfer between two wallets.
pub async fn create_test_transfer(
    db: &DatabaseConnection,
    from_wallet_id: &str,
    to_wallet_id: &str,
    amount_idr: i64,
    occurred_at: NaiveDate,
) -> Result<LedgerEntry> {
    let details = TransactionDetails::Transfer {
        from_wallet_id: from_wallet_id.to_string(),
        to_wallet_id: to_wallet_id.to_string(),
    };
    ledger::create_transaction(db, TransactionInput::new(details, amount_idr, occurred_at)).await
}

/// Records a savings contribution (`contribution == true`) or withdrawal.
pub async fn create_test_savings_movement(
    db: &DatabaseConnection,
    wallet_id: &str,
    savings_bucket_id: &str,
    amount_idr: i64,
    contribution: bool,
    occurred_at: NaiveDate,
) -> Result<LedgerEntry> {
    let wallet_id = wallet_id.to_string();
    let savings_bucket_id = savings_bucket_id.to_string();
    let details = if contribution {
        TransactionDetails::SavingsContribution {
            wallet_id,
            savings_bucket_id,
        }
    } else {
        TransactionDetails::SavingsWithdrawal {
            wallet_id,
            savings_bucket_id,
        }
    };
    ledger::create_transaction(db, TransactionInput::new(details, amount_idr, occurred_at)).await
}

/// Creates an active category budget without a note.
pub async fn create_test_budget(
    db: &DatabaseConnection,
    year: i32,
    month: u32,
    category_id: &str,
    amount_idr: i64,
) -> Result<entities::BudgetModel> {
    budget::create_budget(
        db,
        MonthKey::new(year, month)?,
        BudgetTarget::Category(category_id.to_string()),
        amount_idr,
        None,
    )
    .await
}
