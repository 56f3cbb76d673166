//! Ledger writer - Records money movements as a transaction plus its postings.
//!
//! Every transaction kind has a fixed posting shape. Callers always supply a positive
//! amount; this module assigns the signs:
//!
//! | kind                   | postings                     |
//! |------------------------|------------------------------|
//! | expense                | wallet −amount               |
//! | income                 | wallet +amount               |
//! | transfer               | from −amount, to +amount     |
//! | savings contribution   | wallet −amount, bucket +amount |
//! | savings withdrawal     | bucket −amount, wallet +amount |
//!
//! The transaction row and its postings are written in one database transaction which is
//! committed on success and rolled back on every failure, so a transaction with a missing
//! or half-written posting set is never visible. Editing a transaction replaces its whole
//! posting set inside the same kind of database transaction.

use crate::{
    core::{
        category::require_active_category, month::MonthKey,
        savings_bucket::require_active_savings_bucket, wallet::require_active_wallet,
    },
    entities::{CategoryType, Posting, Transaction, TransactionType, posting, transaction},
    errors::{Error, Resource, Result},
};
use chrono::{NaiveDate, Utc};
use sea_orm::{
    DatabaseTransaction, QueryOrder, Set, TransactionTrait, prelude::*, sea_query::Expr,
};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};
use uuid::Uuid;

/// The kind-specific part of a transaction.
///
/// Each variant carries exactly the references its posting shape needs, so a transfer
/// without a destination or an expense without a category cannot be expressed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    tag = "type",
    rename_all = "snake_case",
    rename_all_fields = "camelCase"
)]
pub enum TransactionDetails {
    /// Money leaves a wallet against an expense category
    Expense {
        /// Wallet paying
        wallet_id: String,
        /// Expense category (required)
        category_id: String,
    },
    /// Money enters a wallet
    Income {
        /// Wallet receiving
        wallet_id: String,
        /// Optional income category
        category_id: Option<String>,
    },
    /// Money moves between two different wallets
    Transfer {
        /// Source wallet
        from_wallet_id: String,
        /// Destination wallet
        to_wallet_id: String,
    },
    /// Money moves from a wallet into a savings bucket
    SavingsContribution {
        /// Wallet funding the contribution
        wallet_id: String,
        /// Bucket receiving it
        savings_bucket_id: String,
    },
    /// Money moves from a savings bucket back into a wallet
    SavingsWithdrawal {
        /// Wallet receiving the withdrawal
        wallet_id: String,
        /// Bucket paying it out
        savings_bucket_id: String,
    },
}

impl TransactionDetails {
    /// The stored type for this kind.
    #[must_use]
    pub const fn transaction_type(&self) -> TransactionType {
        match self {
            Self::Expense { .. } => TransactionType::Expense,
            Self::Income { .. } => TransactionType::Income,
            Self::Transfer { .. } => TransactionType::Transfer,
            Self::SavingsContribution { .. } => TransactionType::SavingsContribution,
            Self::SavingsWithdrawal { .. } => TransactionType::SavingsWithdrawal,
        }
    }

    /// The category stored on the transaction row, if any.
    #[must_use]
    pub fn category_id(&self) -> Option<&str> {
        match self {
            Self::Expense { category_id, .. } => Some(category_id),
            Self::Income { category_id, .. } => category_id.as_deref(),
            _ => None,
        }
    }

    /// The signed posting lines for a positive `amount_idr`.
    #[must_use]
    pub fn plan_postings(&self, amount_idr: i64) -> Vec<PlannedPosting> {
        let debit = |account| PlannedPosting {
            account,
            amount_idr: -amount_idr,
        };
        let credit = |account| PlannedPosting {
            account,
            amount_idr,
        };

        match self {
            Self::Expense { wallet_id, .. } => {
                vec![debit(PostingAccount::Wallet(wallet_id.clone()))]
            }
            Self::Income { wallet_id, .. } => {
                vec![credit(PostingAccount::Wallet(wallet_id.clone()))]
            }
            Self::Transfer {
                from_wallet_id,
                to_wallet_id,
            } => vec![
                debit(PostingAccount::Wallet(from_wallet_id.clone())),
                credit(PostingAccount::Wallet(to_wallet_id.clone())),
            ],
            Self::SavingsContribution {
                wallet_id,
                savings_bucket_id,
            } => vec![
                debit(PostingAccount::Wallet(wallet_id.clone())),
                credit(PostingAccount::SavingsBucket(savings_bucket_id.clone())),
            ],
            Self::SavingsWithdrawal {
                wallet_id,
                savings_bucket_id,
            } => vec![
                debit(PostingAccount::SavingsBucket(savings_bucket_id.clone())),
                credit(PostingAccount::Wallet(wallet_id.clone())),
            ],
        }
    }
}

/// The balance-holding account a posting line moves money in or out of.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PostingAccount {
    /// A wallet
    Wallet(String),
    /// A savings bucket
    SavingsBucket(String),
}

/// One posting line before it is written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedPosting {
    /// Where the money moves
    pub account: PostingAccount,
    /// Signed amount
    pub amount_idr: i64,
}

/// Input for creating or replacing a transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionInput {
    /// Kind and references
    #[serde(flatten)]
    pub details: TransactionDetails,
    /// Positive whole-rupiah amount
    pub amount_idr: i64,
    /// Calendar date of the movement
    pub occurred_at: NaiveDate,
    /// Free-form note
    #[serde(default)]
    pub note: String,
    /// Counterparty
    #[serde(default)]
    pub payee: Option<String>,
}

impl TransactionInput {
    /// Input with an empty note and no payee.
    #[must_use]
    pub const fn new(details: TransactionDetails, amount_idr: i64, occurred_at: NaiveDate) -> Self {
        Self {
            details,
            amount_idr,
            occurred_at,
            note: String::new(),
            payee: None,
        }
    }

    /// Sets the note.
    #[must_use]
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = note.into();
        self
    }

    /// Sets the payee.
    #[must_use]
    pub fn with_payee(mut self, payee: impl Into<String>) -> Self {
        self.payee = Some(payee.into());
        self
    }
}

/// A transaction together with its postings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerEntry {
    /// The transaction row
    #[serde(flatten)]
    pub transaction: transaction::Model,
    /// Its postings, debits first
    pub postings: Vec<posting::Model>,
}

/// Checks everything that can be checked without touching storage.
fn validate_input(input: &TransactionInput) -> Result<()> {
    if input.amount_idr <= 0 {
        return Err(Error::validation(format!(
            "Amount must be a positive whole number of rupiah, got {}",
            input.amount_idr
        )));
    }

    if let TransactionDetails::Transfer {
        from_wallet_id,
        to_wallet_id,
    } = &input.details
    {
        if from_wallet_id == to_wallet_id {
            return Err(Error::validation(
                "Transfer source and destination wallets must differ",
            ));
        }
    }

    Ok(())
}

async fn require_category_of_type<C>(
    db: &C,
    category_id: &str,
    expected: CategoryType,
) -> Result<()>
where
    C: ConnectionTrait,
{
    let category = require_active_category(db, category_id).await?;
    if category.category_type != expected {
        return Err(Error::validation(format!(
            "Category {category_id} is not an {} category",
            match expected {
                CategoryType::Income => "income",
                CategoryType::Expense => "expense",
            }
        )));
    }
    Ok(())
}

/// Verifies that every referenced wallet, bucket and category exists and is active.
async fn check_references<C>(db: &C, details: &TransactionDetails) -> Result<()>
where
    C: ConnectionTrait,
{
    match details {
        TransactionDetails::Expense {
            wallet_id,
            category_id,
        } => {
            require_active_wallet(db, wallet_id).await?;
            require_category_of_type(db, category_id, CategoryType::Expense).await?;
        }
        TransactionDetails::Income {
            wallet_id,
            category_id,
        } => {
            require_active_wallet(db, wallet_id).await?;
            if let Some(category_id) = category_id {
                require_category_of_type(db, category_id, CategoryType::Income).await?;
            }
        }
        TransactionDetails::Transfer {
            from_wallet_id,
            to_wallet_id,
        } => {
            require_active_wallet(db, from_wallet_id).await?;
            require_active_wallet(db, to_wallet_id).await?;
        }
        TransactionDetails::SavingsContribution {
            wallet_id,
            savings_bucket_id,
        }
        | TransactionDetails::SavingsWithdrawal {
            wallet_id,
            savings_bucket_id,
        } => {
            require_active_wallet(db, wallet_id).await?;
            require_active_savings_bucket(db, savings_bucket_id).await?;
        }
    }
    Ok(())
}

fn normalize_payee(payee: Option<String>) -> Option<String> {
    payee
        .map(|p| p.trim().to_string())
        .filter(|p| !p.is_empty())
}

async fn insert_postings(
    txn: &DatabaseTransaction,
    event_id: &str,
    details: &TransactionDetails,
    amount_idr: i64,
) -> Result<Vec<posting::Model>> {
    let mut postings = Vec::with_capacity(2);
    for planned in details.plan_postings(amount_idr) {
        let (wallet_id, savings_bucket_id) = match planned.account {
            PostingAccount::Wallet(id) => (Some(id), None),
            PostingAccount::SavingsBucket(id) => (None, Some(id)),
        };
        let row = posting::ActiveModel {
            id: Set(Uuid::new_v4().to_string()),
            event_id: Set(event_id.to_string()),
            wallet_id: Set(wallet_id),
            savings_bucket_id: Set(savings_bucket_id),
            amount_idr: Set(planned.amount_idr),
        }
        .insert(txn)
        .await?;
        postings.push(row);
    }
    Ok(postings)
}

/// Commits on success and rolls back on failure.
async fn finish<T>(txn: DatabaseTransaction, result: Result<T>) -> Result<T> {
    match result {
        Ok(value) => {
            txn.commit().await?;
            Ok(value)
        }
        Err(err) => {
            if let Err(rollback_err) = txn.rollback().await {
                warn!(error = %rollback_err, "Rollback failed after ledger write error");
            }
            Err(err)
        }
    }
}

/// Creates a transaction and its postings atomically.
///
/// # Errors
/// - `Validation` for a non-positive amount, a transfer between one wallet, or a category
///   of the wrong type
/// - `NotFound` / `ArchivedReference` for a missing or archived wallet, bucket or category
///
/// Nothing is written when any check fails.
#[instrument(skip(db, input), fields(kind = ?input.details.transaction_type()))]
pub async fn create_transaction(
    db: &DatabaseConnection,
    input: TransactionInput,
) -> Result<LedgerEntry> {
    validate_input(&input)?;

    let txn = db.begin().await?;
    let result = insert_transaction(&txn, input).await;
    let entry = finish(txn, result).await?;

    info!(
        transaction_id = %entry.transaction.id,
        postings = entry.postings.len(),
        "Recorded transaction"
    );
    Ok(entry)
}

async fn insert_transaction(
    txn: &DatabaseTransaction,
    input: TransactionInput,
) -> Result<LedgerEntry> {
    check_references(txn, &input.details).await?;

    let now = Utc::now();
    let transaction = transaction::ActiveModel {
        id: Set(Uuid::new_v4().to_string()),
        transaction_type: Set(input.details.transaction_type()),
        occurred_at: Set(input.occurred_at),
        note: Set(input.note.trim().to_string()),
        payee: Set(normalize_payee(input.payee)),
        category_id: Set(input.details.category_id().map(str::to_string)),
        created_at: Set(now),
        updated_at: Set(now),
        deleted_at: Set(None),
    }
    .insert(txn)
    .await?;

    let postings =
        insert_postings(txn, &transaction.id, &input.details, input.amount_idr).await?;

    Ok(LedgerEntry {
        transaction,
        postings,
    })
}

/// Replaces a transaction's fields and its entire posting set atomically.
///
/// The kind is immutable: `input.details` must be the same kind as the stored transaction.
///
/// # Errors
/// - `NotFound` when the transaction does not exist or is soft-deleted
/// - `Validation` when the kind differs, plus everything [`create_transaction`] checks
#[instrument(skip(db, input))]
pub async fn update_transaction(
    db: &DatabaseConnection,
    transaction_id: &str,
    input: TransactionInput,
) -> Result<LedgerEntry> {
    validate_input(&input)?;

    let txn = db.begin().await?;
    let result = replace_transaction(&txn, transaction_id, input).await;
    let entry = finish(txn, result).await?;

    info!(transaction_id, "Replaced transaction postings");
    Ok(entry)
}

async fn replace_transaction(
    txn: &DatabaseTransaction,
    transaction_id: &str,
    input: TransactionInput,
) -> Result<LedgerEntry> {
    let existing = find_live_transaction(txn, transaction_id)
        .await?
        .ok_or_else(|| Error::not_found(Resource::Transaction, transaction_id))?;

    let requested = input.details.transaction_type();
    if existing.transaction_type != requested {
        return Err(Error::validation(format!(
            "Transaction type cannot change (stored {:?}, got {requested:?})",
            existing.transaction_type
        )));
    }

    check_references(txn, &input.details).await?;

    let mut active_model: transaction::ActiveModel = existing.into();
    active_model.occurred_at = Set(input.occurred_at);
    active_model.note = Set(input.note.trim().to_string());
    active_model.payee = Set(normalize_payee(input.payee));
    active_model.category_id = Set(input.details.category_id().map(str::to_string));
    active_model.updated_at = Set(Utc::now());
    let transaction = active_model.update(txn).await?;

    Posting::delete_many()
        .filter(posting::Column::EventId.eq(transaction_id))
        .exec(txn)
        .await?;
    let postings =
        insert_postings(txn, transaction_id, &input.details, input.amount_idr).await?;

    Ok(LedgerEntry {
        transaction,
        postings,
    })
}

/// Soft-deletes a transaction by stamping `deleted_at`.
///
/// Its postings stay in storage but stop counting toward every balance and budget.
///
/// # Errors
/// `NotFound` when the transaction does not exist or was already deleted, so a repeated
/// call reports `NotFound` the second time.
#[instrument(skip(db))]
pub async fn delete_transaction(db: &DatabaseConnection, transaction_id: &str) -> Result<()> {
    let result = Transaction::update_many()
        .col_expr(transaction::Column::DeletedAt, Expr::value(Utc::now()))
        .filter(transaction::Column::Id.eq(transaction_id))
        .filter(transaction::Column::DeletedAt.is_null())
        .exec(db)
        .await?;

    if result.rows_affected == 0 {
        return Err(Error::not_found(Resource::Transaction, transaction_id));
    }

    info!(transaction_id, "Soft-deleted transaction");
    Ok(())
}

async fn find_live_transaction<C>(db: &C, transaction_id: &str) -> Result<Option<transaction::Model>>
where
    C: ConnectionTrait,
{
    Transaction::find_by_id(transaction_id.to_string())
        .filter(transaction::Column::DeletedAt.is_null())
        .one(db)
        .await
        .map_err(Into::into)
}

/// Retrieves the postings of a transaction, debits first.
pub async fn get_postings<C>(db: &C, transaction_id: &str) -> Result<Vec<posting::Model>>
where
    C: ConnectionTrait,
{
    Posting::find()
        .filter(posting::Column::EventId.eq(transaction_id))
        .order_by_asc(posting::Column::AmountIdr)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Retrieves a non-deleted transaction with its postings.
pub async fn get_transaction(
    db: &DatabaseConnection,
    transaction_id: &str,
) -> Result<Option<LedgerEntry>> {
    let Some(transaction) = find_live_transaction(db, transaction_id).await? else {
        return Ok(None);
    };
    let postings = get_postings(db, transaction_id).await?;
    Ok(Some(LedgerEntry {
        transaction,
        postings,
    }))
}

/// Lists non-deleted transactions, newest first, optionally limited to one month.
pub async fn list_transactions(
    db: &DatabaseConnection,
    month: Option<MonthKey>,
) -> Result<Vec<transaction::Model>> {
    let mut query = Transaction::find().filter(transaction::Column::DeletedAt.is_null());
    if let Some(month) = month {
        query = query
            .filter(transaction::Column::OccurredAt.gte(month.start()))
            .filter(transaction::Column::OccurredAt.lt(month.next().start()));
    }
    query
        .order_by_desc(transaction::Column::OccurredAt)
        .order_by_desc(transaction::Column::CreatedAt)
        .all(db)
        .await
        .map_err(Into::into)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::core::wallet::archive_wallet;
    use crate::test_utils::*;
    use sea_orm::{DatabaseBackend, MockDatabase, PaginatorTrait};

    async fn row_counts(db: &DatabaseConnection) -> Result<(u64, u64)> {
        Ok((
            Transaction::find().count(db).await?,
            Posting::find().count(db).await?,
        ))
    }

    #[tokio::test]
    async fn test_create_transaction_validation() {
        let db = MockDatabase::new(DatabaseBackend::Sqlite).into_connection();
        let details = TransactionDetails::Income {
            wallet_id: "w1".to_string(),
            category_id: None,
        };

        for amount in [0, -5_000] {
            let result =
                create_transaction(&db, TransactionInput::new(details.clone(), amount, date(2024, 1, 1)))
                    .await;
            assert!(matches!(result.unwrap_err(), Error::Validation { .. }));
        }

        let same_wallet = TransactionDetails::Transfer {
            from_wallet_id: "w1".to_string(),
            to_wallet_id: "w1".to_string(),
        };
        let result =
            create_transaction(&db, TransactionInput::new(same_wallet, 10_000, date(2024, 1, 1)))
                .await;
        assert!(matches!(result.unwrap_err(), Error::Validation { .. }));
    }

    #[test]
    fn test_plan_postings_signs() {
        let plan = TransactionDetails::SavingsWithdrawal {
            wallet_id: "w".to_string(),
            savings_bucket_id: "b".to_string(),
        }
        .plan_postings(40_000);

        assert_eq!(
            plan,
            vec![
                PlannedPosting {
                    account: PostingAccount::SavingsBucket("b".to_string()),
                    amount_idr: -40_000,
                },
                PlannedPosting {
                    account: PostingAccount::Wallet("w".to_string()),
                    amount_idr: 40_000,
                },
            ]
        );
        assert_eq!(plan.iter().map(|p| p.amount_idr).sum::<i64>(), 0);
    }

    #[tokio::test]
    async fn test_expense_creates_single_debit() -> Result<()> {
        let db = setup_test_db().await?;
        let wallet = create_test_wallet(&db, "BCA").await?;
        let category = create_test_category(&db, "Groceries").await?;

        let entry = create_transaction(
            &db,
            TransactionInput::new(
                TransactionDetails::Expense {
                    wallet_id: wallet.id.clone(),
                    category_id: category.id.clone(),
                },
                75_000,
                date(2024, 1, 15),
            )
            .with_note("  weekly shop ")
            .with_payee("Superindo"),
        )
        .await?;

        assert_eq!(entry.transaction.transaction_type, TransactionType::Expense);
        assert_eq!(entry.transaction.category_id, Some(category.id));
        assert_eq!(entry.transaction.note, "weekly shop");
        assert_eq!(entry.transaction.payee.as_deref(), Some("Superindo"));
        assert_eq!(entry.postings.len(), 1);
        assert_eq!(entry.postings[0].wallet_id, Some(wallet.id));
        assert_eq!(entry.postings[0].amount_idr, -75_000);
        Ok(())
    }

    #[tokio::test]
    async fn test_expense_rejects_income_category() -> Result<()> {
        let db = setup_test_db().await?;
        let wallet = create_test_wallet(&db, "BCA").await?;
        let salary = create_test_income_category(&db, "Salary").await?;

        let result = create_transaction(
            &db,
            TransactionInput::new(
                TransactionDetails::Expense {
                    wallet_id: wallet.id,
                    category_id: salary.id,
                },
                10_000,
                date(2024, 1, 2),
            ),
        )
        .await;

        assert!(matches!(result.unwrap_err(), Error::Validation { .. }));
        assert_eq!(row_counts(&db).await?, (0, 0));
        Ok(())
    }

    #[tokio::test]
    async fn test_income_without_category() -> Result<()> {
        let db = setup_test_db().await?;
        let wallet = create_test_wallet(&db, "BCA").await?;

        let entry = create_test_income(&db, &wallet.id, 5_000_000, date(2024, 1, 25)).await?;

        assert_eq!(entry.transaction.category_id, None);
        assert_eq!(entry.postings.len(), 1);
        assert_eq!(entry.postings[0].amount_idr, 5_000_000);
        Ok(())
    }

    #[tokio::test]
    async fn test_transfer_postings_are_equal_and_opposite() -> Result<()> {
        let db = setup_test_db().await?;
        let from = create_test_wallet(&db, "BCA").await?;
        let to = create_test_wallet(&db, "Cash").await?;

        let entry = create_test_transfer(&db, &from.id, &to.id, 100_000, date(2024, 1, 3)).await?;

        assert_eq!(entry.postings.len(), 2);
        let debit = &entry.postings[0];
        let credit = &entry.postings[1];
        assert_eq!(debit.amount_idr, -credit.amount_idr);
        assert_eq!(debit.wallet_id.as_deref(), Some(from.id.as_str()));
        assert_eq!(credit.wallet_id.as_deref(), Some(to.id.as_str()));
        assert_ne!(debit.wallet_id, credit.wallet_id);
        assert_eq!(entry.transaction.category_id, None);
        Ok(())
    }

    #[tokio::test]
    async fn test_savings_contribution_shape() -> Result<()> {
        let db = setup_test_db().await?;
        let wallet = create_test_wallet(&db, "BCA").await?;
        let bucket = create_test_savings_bucket(&db, "Holiday").await?;

        let entry = create_transaction(
            &db,
            TransactionInput::new(
                TransactionDetails::SavingsContribution {
                    wallet_id: wallet.id.clone(),
                    savings_bucket_id: bucket.id.clone(),
                },
                250_000,
                date(2024, 1, 5),
            ),
        )
        .await?;

        let postings = get_postings(&db, &entry.transaction.id).await?;
        assert_eq!(postings.len(), 2);
        assert_eq!(postings[0].wallet_id, Some(wallet.id));
        assert_eq!(postings[0].amount_idr, -250_000);
        assert_eq!(postings[1].savings_bucket_id, Some(bucket.id));
        assert_eq!(postings[1].amount_idr, 250_000);
        Ok(())
    }

    #[tokio::test]
    async fn test_archived_wallet_writes_nothing() -> Result<()> {
        let db = setup_test_db().await?;
        let wallet = create_test_wallet(&db, "Old card").await?;
        archive_wallet(&db, &wallet.id).await?;

        let result = create_test_income(&db, &wallet.id, 1_000, date(2024, 1, 1)).await;

        assert!(matches!(
            result.unwrap_err(),
            Error::ArchivedReference {
                resource: Resource::Wallet,
                ..
            }
        ));
        assert_eq!(row_counts(&db).await?, (0, 0));
        Ok(())
    }

    #[tokio::test]
    async fn test_missing_bucket_writes_nothing() -> Result<()> {
        let db = setup_test_db().await?;
        let wallet = create_test_wallet(&db, "BCA").await?;

        let result = create_transaction(
            &db,
            TransactionInput::new(
                TransactionDetails::SavingsWithdrawal {
                    wallet_id: wallet.id,
                    savings_bucket_id: "missing".to_string(),
                },
                1_000,
                date(2024, 1, 1),
            ),
        )
        .await;

        assert!(matches!(
            result.unwrap_err(),
            Error::NotFound {
                resource: Resource::SavingsBucket,
                ..
            }
        ));
        assert_eq!(row_counts(&db).await?, (0, 0));
        Ok(())
    }

    #[tokio::test]
    async fn test_update_replaces_posting_set() -> Result<()> {
        let db = setup_test_db().await?;
        let bca = create_test_wallet(&db, "BCA").await?;
        let cash = create_test_wallet(&db, "Cash").await?;
        let gopay = create_test_wallet(&db, "GoPay").await?;

        let entry = create_test_transfer(&db, &bca.id, &cash.id, 100_000, date(2024, 1, 3)).await?;
        let old_ids: Vec<String> = entry.postings.iter().map(|p| p.id.clone()).collect();

        let updated = update_transaction(
            &db,
            &entry.transaction.id,
            TransactionInput::new(
                TransactionDetails::Transfer {
                    from_wallet_id: bca.id.clone(),
                    to_wallet_id: gopay.id.clone(),
                },
                60_000,
                date(2024, 1, 4),
            )
            .with_note("top up"),
        )
        .await?;

        assert_eq!(updated.transaction.id, entry.transaction.id);
        assert_eq!(updated.transaction.occurred_at, date(2024, 1, 4));
        assert_eq!(updated.transaction.note, "top up");

        let postings = get_postings(&db, &entry.transaction.id).await?;
        assert_eq!(postings.len(), 2);
        assert!(postings.iter().all(|p| !old_ids.contains(&p.id)));
        assert_eq!(postings[0].amount_idr, -60_000);
        assert_eq!(postings[1].wallet_id, Some(gopay.id));
        assert_eq!(Posting::find().count(&db).await?, 2);
        Ok(())
    }

    #[tokio::test]
    async fn test_update_cannot_change_type() -> Result<()> {
        let db = setup_test_db().await?;
        let wallet = create_test_wallet(&db, "BCA").await?;
        let entry = create_test_income(&db, &wallet.id, 10_000, date(2024, 1, 1)).await?;
        let groceries = create_test_category(&db, "Groceries").await?;

        let result = update_transaction(
            &db,
            &entry.transaction.id,
            TransactionInput::new(
                TransactionDetails::Expense {
                    wallet_id: wallet.id,
                    category_id: groceries.id,
                },
                10_000,
                date(2024, 1, 1),
            ),
        )
        .await;

        assert!(matches!(result.unwrap_err(), Error::Validation { .. }));
        let stored = get_transaction(&db, &entry.transaction.id).await?.unwrap();
        assert_eq!(stored.transaction.transaction_type, TransactionType::Income);
        Ok(())
    }

    #[tokio::test]
    async fn test_failed_update_keeps_original_postings() -> Result<()> {
        let db = setup_test_db().await?;
        let wallet = create_test_wallet(&db, "BCA").await?;
        let retired = create_test_wallet(&db, "Retired").await?;
        archive_wallet(&db, &retired.id).await?;
        let entry = create_test_income(&db, &wallet.id, 10_000, date(2024, 1, 1)).await?;

        let result = update_transaction(
            &db,
            &entry.transaction.id,
            TransactionInput::new(
                TransactionDetails::Income {
                    wallet_id: retired.id,
                    category_id: None,
                },
                99_000,
                date(2024, 1, 1),
            ),
        )
        .await;

        assert!(matches!(result.unwrap_err(), Error::ArchivedReference { .. }));
        let stored = get_transaction(&db, &entry.transaction.id).await?.unwrap();
        assert_eq!(stored.postings, entry.postings);
        Ok(())
    }

    /// Makes any posting credited with exactly 777,777 fail at insert time.
    async fn reject_postings_of_777_777(db: &DatabaseConnection) -> Result<()> {
        db.execute_unprepared(
            "CREATE TRIGGER reject_posting BEFORE INSERT ON postings
             WHEN NEW.amount_idr = 777777
             BEGIN SELECT RAISE(ABORT, 'posting rejected'); END",
        )
        .await?;
        Ok(())
    }

    #[tokio::test]
    async fn test_posting_failure_after_row_insert_rolls_back_create() -> Result<()> {
        let db = setup_test_db().await?;
        let from = create_test_wallet(&db, "BCA").await?;
        let to = create_test_wallet(&db, "Cash").await?;
        reject_postings_of_777_777(&db).await?;

        // transaction row and debit leg are written before the credit leg fails
        let result = create_test_transfer(&db, &from.id, &to.id, 777_777, date(2024, 1, 1)).await;

        assert!(result.is_err());
        assert_eq!(row_counts(&db).await?, (0, 0));
        assert_eq!(crate::core::balance::get_wallet_balance(&db, &from.id).await?, 0);
        Ok(())
    }

    #[tokio::test]
    async fn test_posting_failure_during_update_restores_everything() -> Result<()> {
        let db = setup_test_db().await?;
        let from = create_test_wallet(&db, "BCA").await?;
        let to = create_test_wallet(&db, "Cash").await?;
        let entry = create_test_transfer(&db, &from.id, &to.id, 100_000, date(2024, 1, 1)).await?;
        reject_postings_of_777_777(&db).await?;

        // row update, old posting delete and the new debit all succeed first
        let result = update_transaction(
            &db,
            &entry.transaction.id,
            TransactionInput::new(
                TransactionDetails::Transfer {
                    from_wallet_id: from.id.clone(),
                    to_wallet_id: to.id.clone(),
                },
                777_777,
                date(2024, 2, 1),
            )
            .with_note("moved"),
        )
        .await;

        assert!(result.is_err());
        let stored = get_transaction(&db, &entry.transaction.id).await?.unwrap();
        assert_eq!(stored.transaction, entry.transaction);
        assert_eq!(stored.postings, entry.postings);
        assert_eq!(row_counts(&db).await?, (1, 2));
        Ok(())
    }

    #[tokio::test]
    async fn test_update_missing_transaction() -> Result<()> {
        let db = setup_test_db().await?;
        let wallet = create_test_wallet(&db, "BCA").await?;

        let result = update_transaction(
            &db,
            "missing",
            TransactionInput::new(
                TransactionDetails::Income {
                    wallet_id: wallet.id,
                    category_id: None,
                },
                1_000,
                date(2024, 1, 1),
            ),
        )
        .await;

        assert!(matches!(
            result.unwrap_err(),
            Error::NotFound {
                resource: Resource::Transaction,
                ..
            }
        ));
        Ok(())
    }

    #[tokio::test]
    async fn test_soft_delete_keeps_rows() -> Result<()> {
        let db = setup_test_db().await?;
        let wallet = create_test_wallet(&db, "BCA").await?;
        let entry = create_test_income(&db, &wallet.id, 10_000, date(2024, 1, 1)).await?;

        delete_transaction(&db, &entry.transaction.id).await?;

        assert!(get_transaction(&db, &entry.transaction.id).await?.is_none());
        let raw = Transaction::find_by_id(entry.transaction.id.clone())
            .one(&db)
            .await?
            .unwrap();
        assert!(raw.deleted_at.is_some());
        assert_eq!(row_counts(&db).await?, (1, 1));

        let second = delete_transaction(&db, &entry.transaction.id).await;
        assert!(matches!(second.unwrap_err(), Error::NotFound { .. }));
        Ok(())
    }

    #[tokio::test]
    async fn test_update_deleted_transaction_is_not_found() -> Result<()> {
        let db = setup_test_db().await?;
        let wallet = create_test_wallet(&db, "BCA").await?;
        let entry = create_test_income(&db, &wallet.id, 10_000, date(2024, 1, 1)).await?;
        delete_transaction(&db, &entry.transaction.id).await?;

        let result = update_transaction(
            &db,
            &entry.transaction.id,
            TransactionInput::new(
                TransactionDetails::Income {
                    wallet_id: wallet.id,
                    category_id: None,
                },
                20_000,
                date(2024, 1, 1),
            ),
        )
        .await;
        assert!(matches!(result.unwrap_err(), Error::NotFound { .. }));
        Ok(())
    }

    #[tokio::test]
    async fn test_list_transactions_by_month() -> Result<()> {
        let db = setup_test_db().await?;
        let wallet = create_test_wallet(&db, "BCA").await?;
        let early = create_test_income(&db, &wallet.id, 1_000, date(2024, 1, 2)).await?;
        let late = create_test_income(&db, &wallet.id, 2_000, date(2024, 1, 30)).await?;
        create_test_income(&db, &wallet.id, 3_000, date(2024, 2, 1)).await?;
        let deleted = create_test_income(&db, &wallet.id, 4_000, date(2024, 1, 10)).await?;
        delete_transaction(&db, &deleted.transaction.id).await?;

        let january = list_transactions(&db, Some(MonthKey::new(2024, 1)?)).await?;
        let ids: Vec<&str> = january.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec![late.transaction.id.as_str(), early.transaction.id.as_str()]);

        assert_eq!(list_transactions(&db, None).await?.len(), 3);
        Ok(())
    }

    #[test]
    fn test_input_deserializes_tagged_kind() {
        let input: TransactionInput = toml::from_str(
            r#"
            type = "transfer"
            fromWalletId = "w1"
            toWalletId = "w2"
            amountIdr = 100000
            occurredAt = "2024-01-03"
            "#,
        )
        .unwrap();

        assert_eq!(
            input.details,
            TransactionDetails::Transfer {
                from_wallet_id: "w1".to_string(),
                to_wallet_id: "w2".to_string(),
            }
        );
        assert_eq!(input.amount_idr, 100_000);
        assert!(input.note.is_empty());
    }
}
