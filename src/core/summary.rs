//! Budget aggregator - Budget-vs-actual figures for one month.
//!
//! For each active budget in the month the aggregator measures actual movement against the
//! target and derives remaining amount, percent used and a status band. Everything is
//! recomputed from the ledger on each call.

use crate::{
    core::{
        balance::{PostingFilter, savings_bucket_balance_before, sum_postings},
        budget::{BudgetTarget, TargetType, list_budgets, target_name},
        month::MonthKey,
    },
    entities::TransactionType,
    errors::Result,
};
use sea_orm::ConnectionTrait;
use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

const EXPENSE_TYPES: &[TransactionType] = &[TransactionType::Expense];
const SAVINGS_TYPES: &[TransactionType] = &[
    TransactionType::SavingsContribution,
    TransactionType::SavingsWithdrawal,
];

/// How progress is measured for savings-bucket budgets.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SavingsSpendPolicy {
    /// Contributions minus withdrawals dated inside the month
    #[default]
    MonthlyNetMovement,
    /// The bucket's balance at the end of the month
    CumulativeBalance,
}

/// Status band derived from percent used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BudgetStatus {
    /// Below 80%
    OnTrack,
    /// 80% to 99%
    NearLimit,
    /// Exactly 100%
    ReachedLimit,
    /// Above 100%
    OverBudget,
}

impl BudgetStatus {
    /// Classifies a rounded percentage.
    #[must_use]
    pub const fn from_percent(percent_used: i64) -> Self {
        match percent_used {
            i64::MIN..80 => Self::OnTrack,
            80..100 => Self::NearLimit,
            100 => Self::ReachedLimit,
            _ => Self::OverBudget,
        }
    }
}

/// Budget-vs-actual for one budget.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetSummaryItem {
    /// The budget row this item reports on
    pub budget_id: String,
    /// Category or savings bucket id
    pub target_id: String,
    /// Category or savings bucket
    pub target_type: TargetType,
    /// Display name of the target
    pub target_name: String,
    /// The cap
    pub budget_amount: i64,
    /// Actual movement in the month
    pub spent_amount: i64,
    /// `budget_amount - spent_amount`, negative when over
    pub remaining: i64,
    /// `round(spent / budget * 100)`
    pub percent_used: i64,
    /// Band derived from `percent_used`
    pub status: BudgetStatus,
}

/// Budget-vs-actual for a whole month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetSummary {
    /// The month summarized
    pub month: MonthKey,
    /// Sum of budget amounts
    pub total_budget: i64,
    /// Sum of spent amounts
    pub total_spent: i64,
    /// Sum of remaining amounts
    pub remaining: i64,
    /// One item per active budget
    pub items: Vec<BudgetSummaryItem>,
}

/// `round(spent / budget * 100)`, rounding halves upward.
///
/// Integer arithmetic keeps large rupiah amounts exact. `budget_amount` is always positive.
#[must_use]
pub fn percent_used(spent_amount: i64, budget_amount: i64) -> i64 {
    if budget_amount <= 0 {
        return 0;
    }
    let numerator = i128::from(spent_amount) * 200 + i128::from(budget_amount);
    let denominator = i128::from(budget_amount) * 2;
    i64::try_from(numerator.div_euclid(denominator)).unwrap_or(i64::MAX)
}

/// Actual movement against a target within `month`.
///
/// - Category: the absolute total of non-deleted expense postings in that category.
/// - Savings bucket: per `policy`, either the month's net movement into the bucket or the
///   bucket's balance at the end of the month.
pub async fn spent_for_target<C>(
    db: &C,
    target: &BudgetTarget,
    month: MonthKey,
    policy: SavingsSpendPolicy,
) -> Result<i64>
where
    C: ConnectionTrait,
{
    match target {
        BudgetTarget::Category(category_id) => {
            let total = sum_postings(
                db,
                &PostingFilter {
                    category_id: Some(category_id.as_str()),
                    transaction_types: Some(EXPENSE_TYPES),
                    occurred_from: Some(month.start()),
                    occurred_before: Some(month.next().start()),
                    ..PostingFilter::default()
                },
            )
            .await?;
            Ok(total.abs())
        }
        BudgetTarget::SavingsBucket(bucket_id) => match policy {
            SavingsSpendPolicy::MonthlyNetMovement => {
                sum_postings(
                    db,
                    &PostingFilter {
                        savings_bucket_id: Some(bucket_id.as_str()),
                        transaction_types: Some(SAVINGS_TYPES),
                        occurred_from: Some(month.start()),
                        occurred_before: Some(month.next().start()),
                        ..PostingFilter::default()
                    },
                )
                .await
            }
            SavingsSpendPolicy::CumulativeBalance => {
                savings_bucket_balance_before(db, bucket_id, Some(month.next().start())).await
            }
        },
    }
}

/// Budget-vs-actual for every active budget in `month`, savings measured month by month.
pub async fn get_budget_summary(db: &DatabaseConnection, month: MonthKey) -> Result<BudgetSummary> {
    get_budget_summary_with_policy(db, month, SavingsSpendPolicy::default()).await
}

/// Budget-vs-actual for every active budget in `month` with an explicit savings policy.
#[instrument(skip(db))]
pub async fn get_budget_summary_with_policy(
    db: &DatabaseConnection,
    month: MonthKey,
    policy: SavingsSpendPolicy,
) -> Result<BudgetSummary> {
    let budgets = list_budgets(db, Some(month)).await?;

    let mut items = Vec::with_capacity(budgets.len());
    for budget in budgets {
        let target = budget.target()?;
        let spent_amount = spent_for_target(db, &target, month, policy).await?;
        let percent = percent_used(spent_amount, budget.amount_idr);

        items.push(BudgetSummaryItem {
            budget_id: budget.id,
            target_id: target.id().to_string(),
            target_type: target.target_type(),
            target_name: target_name(db, &target).await?,
            budget_amount: budget.amount_idr,
            spent_amount,
            remaining: budget.amount_idr - spent_amount,
            percent_used: percent,
            status: BudgetStatus::from_percent(percent),
        });
    }

    let total_budget: i64 = items.iter().map(|i| i.budget_amount).sum();
    let total_spent: i64 = items.iter().map(|i| i.spent_amount).sum();
    let remaining: i64 = items.iter().map(|i| i.remaining).sum();
    debug!(items = items.len(), total_budget, total_spent, "Aggregated budget summary");

    Ok(BudgetSummary {
        month,
        total_budget,
        total_spent,
        remaining,
        items,
    })
}
