//! Balance engine - Derives balances from the ledger on every call.
//!
//! No running balance is stored anywhere. A wallet's or savings bucket's balance is the sum
//! of its postings whose owning transaction has not been soft-deleted, so balances cannot
//! drift from the ledger. The same summing query, with extra filters, backs the budget
//! aggregator.

use crate::{
    core::{savings_bucket::get_savings_bucket_by_id, wallet::get_wallet_by_id},
    entities::{Posting, Transaction, TransactionType, Wallet, posting, transaction, wallet},
    errors::{Error, Resource, Result},
};
use chrono::NaiveDate;
use sea_orm::{QueryOrder, QuerySelect, prelude::*, sea_query::Expr};
use serde::Serialize;
use tracing::{debug, instrument};

/// Filters for [`sum_postings`]. Unset fields do not constrain the sum.
#[derive(Debug, Clone, Default)]
pub(crate) struct PostingFilter<'a> {
    pub wallet_id: Option<&'a str>,
    pub savings_bucket_id: Option<&'a str>,
    pub category_id: Option<&'a str>,
    pub transaction_types: Option<&'a [TransactionType]>,
    /// Inclusive lower bound on `occurred_at`
    pub occurred_from: Option<NaiveDate>,
    /// Exclusive upper bound on `occurred_at`
    pub occurred_before: Option<NaiveDate>,
}

/// Sums `amount_idr` over postings of non-deleted transactions matching `filter`.
pub(crate) async fn sum_postings<C>(db: &C, filter: &PostingFilter<'_>) -> Result<i64>
where
    C: ConnectionTrait,
{
    let mut query = Posting::find()
        .select_only()
        .column_as(
            Expr::col((posting::Entity, posting::Column::AmountIdr)).sum(),
            "total",
        )
        .inner_join(Transaction)
        .filter(transaction::Column::DeletedAt.is_null());

    if let Some(wallet_id) = filter.wallet_id {
        query = query.filter(posting::Column::WalletId.eq(wallet_id));
    }
    if let Some(bucket_id) = filter.savings_bucket_id {
        query = query.filter(posting::Column::SavingsBucketId.eq(bucket_id));
    }
    if let Some(category_id) = filter.category_id {
        query = query.filter(transaction::Column::CategoryId.eq(category_id));
    }
    if let Some(types) = filter.transaction_types {
        query = query.filter(transaction::Column::TransactionType.is_in(types.iter().copied()));
    }
    if let Some(from) = filter.occurred_from {
        query = query.filter(transaction::Column::OccurredAt.gte(from));
    }
    if let Some(before) = filter.occurred_before {
        query = query.filter(transaction::Column::OccurredAt.lt(before));
    }

    let total: Option<Option<i64>> = query.into_tuple::<Option<i64>>().one(db).await?;
    Ok(total.flatten().unwrap_or(0))
}

/// Current balance of a wallet.
///
/// # Errors
/// `NotFound` when the wallet does not exist. Archived wallets still report a balance.
#[instrument(skip(db))]
pub async fn get_wallet_balance<C>(db: &C, wallet_id: &str) -> Result<i64>
where
    C: ConnectionTrait,
{
    if get_wallet_by_id(db, wallet_id).await?.is_none() {
        return Err(Error::not_found(Resource::Wallet, wallet_id));
    }

    let balance = sum_postings(
        db,
        &PostingFilter {
            wallet_id: Some(wallet_id),
            ..PostingFilter::default()
        },
    )
    .await?;
    debug!(balance, "Computed wallet balance");
    Ok(balance)
}

/// Current balance of a savings bucket.
///
/// # Errors
/// `NotFound` when the bucket does not exist.
#[instrument(skip(db))]
pub async fn get_savings_bucket_balance<C>(db: &C, bucket_id: &str) -> Result<i64>
where
    C: ConnectionTrait,
{
    savings_bucket_balance_before(db, bucket_id, None).await
}

/// Balance of a savings bucket counting only transactions dated before `before`.
pub(crate) async fn savings_bucket_balance_before<C>(
    db: &C,
    bucket_id: &str,
    before: Option<NaiveDate>,
) -> Result<i64>
where
    C: ConnectionTrait,
{
    if get_savings_bucket_by_id(db, bucket_id).await?.is_none() {
        return Err(Error::not_found(Resource::SavingsBucket, bucket_id));
    }

    let balance = sum_postings(
        db,
        &PostingFilter {
            savings_bucket_id: Some(bucket_id),
            occurred_before: before,
            ..PostingFilter::default()
        },
    )
    .await?;
    debug!(bucket_id, balance, "Computed savings bucket balance");
    Ok(balance)
}

/// A wallet together with its live balance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletBalance {
    /// The wallet
    pub wallet: wallet::Model,
    /// Its balance in whole rupiah
    pub balance: i64,
}

/// Every wallet, archived ones included, with its live balance, ordered by name.
pub async fn get_all_wallet_balances(db: &DatabaseConnection) -> Result<Vec<WalletBalance>> {
    let wallets = Wallet::find()
        .order_by_asc(wallet::Column::Name)
        .all(db)
        .await?;

    let mut balances = Vec::with_capacity(wallets.len());
    for wallet in wallets {
        let balance = sum_postings(
            db,
            &PostingFilter {
                wallet_id: Some(wallet.id.as_str()),
                ..PostingFilter::default()
            },
        )
        .await?;
        balances.push(WalletBalance { wallet, balance });
    }
    Ok(balances)
}
