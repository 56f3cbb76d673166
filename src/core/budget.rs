//! Budget business logic - Monthly spending caps per category or savings bucket.
//!
//! A budget targets exactly one category or one savings bucket. At most one active budget
//! may exist per month and target; the application checks first and a partial unique index
//! backs the check when two writers race. Losing that race surfaces as `Conflict`.

use crate::{
    core::{
        category::{get_category_by_id, require_active_category},
        month::MonthKey,
        savings_bucket::{get_savings_bucket_by_id, require_active_savings_bucket},
    },
    entities::{Budget, CategoryType, budget},
    errors::{Error, Resource, Result},
};
use chrono::Utc;
use sea_orm::{Condition, QueryOrder, Set, prelude::*};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use uuid::Uuid;

/// What a budget caps.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "targetType", content = "targetId", rename_all = "snake_case")]
pub enum BudgetTarget {
    /// Spending in an expense category
    Category(String),
    /// Net money moved into a savings bucket
    SavingsBucket(String),
}

/// The kind of a [`BudgetTarget`], without its id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetType {
    /// A category
    Category,
    /// A savings bucket
    SavingsBucket,
}

impl BudgetTarget {
    /// Builds a target from the nullable column pair used by storage and by callers that
    /// send `categoryId` / `savingsBucketId`.
    ///
    /// # Errors
    /// `Validation` unless exactly one of the two is set.
    pub fn from_columns(
        category_id: Option<String>,
        savings_bucket_id: Option<String>,
    ) -> Result<Self> {
        match (category_id, savings_bucket_id) {
            (Some(id), None) => Ok(Self::Category(id)),
            (None, Some(id)) => Ok(Self::SavingsBucket(id)),
            (Some(_), Some(_)) => Err(Error::validation(
                "A budget targets either a category or a savings bucket, not both",
            )),
            (None, None) => Err(Error::validation(
                "A budget needs a category or a savings bucket",
            )),
        }
    }

    /// The referenced id.
    #[must_use]
    pub fn id(&self) -> &str {
        match self {
            Self::Category(id) | Self::SavingsBucket(id) => id,
        }
    }

    /// Category or savings bucket.
    #[must_use]
    pub const fn target_type(&self) -> TargetType {
        match self {
            Self::Category(_) => TargetType::Category,
            Self::SavingsBucket(_) => TargetType::SavingsBucket,
        }
    }

    fn columns(&self) -> (Option<String>, Option<String>) {
        match self {
            Self::Category(id) => (Some(id.clone()), None),
            Self::SavingsBucket(id) => (None, Some(id.clone())),
        }
    }

    fn condition(&self) -> Condition {
        match self {
            Self::Category(id) => Condition::all().add(budget::Column::CategoryId.eq(id.as_str())),
            Self::SavingsBucket(id) => {
                Condition::all().add(budget::Column::SavingsBucketId.eq(id.as_str()))
            }
        }
    }
}

fn duplicate_budget(month: MonthKey, target: &BudgetTarget) -> Error {
    Error::conflict(format!(
        "An active budget already exists for {:?} {} in {month}",
        target.target_type(),
        target.id()
    ))
}

fn validate_amount(amount_idr: i64) -> Result<()> {
    if amount_idr <= 0 {
        return Err(Error::validation(format!(
            "Budget amount must be positive, got {amount_idr}"
        )));
    }
    Ok(())
}

fn normalize_note(note: Option<String>) -> Option<String> {
    note.map(|n| n.trim().to_string()).filter(|n| !n.is_empty())
}

/// Finds the active budget for a target in a month, if any.
///
/// This is the single "does a budget already exist" check shared by budget creation,
/// restore and the month-to-month copy.
pub async fn find_active_budget<C>(
    db: &C,
    month: MonthKey,
    target: &BudgetTarget,
) -> Result<Option<budget::Model>>
where
    C: ConnectionTrait,
{
    Budget::find()
        .filter(budget::Column::Month.eq(month.start()))
        .filter(budget::Column::Archived.eq(false))
        .filter(target.condition())
        .one(db)
        .await
        .map_err(Into::into)
}

/// Display name of a budget target, falling back to the id if the record is gone.
pub async fn target_name<C>(db: &C, target: &BudgetTarget) -> Result<String>
where
    C: ConnectionTrait,
{
    let name = match target {
        BudgetTarget::Category(id) => get_category_by_id(db, id).await?.map(|c| c.name),
        BudgetTarget::SavingsBucket(id) => get_savings_bucket_by_id(db, id).await?.map(|b| b.name),
    };
    Ok(name.unwrap_or_else(|| target.id().to_string()))
}

/// Checks that a target may receive a new budget: it exists, is active and, for a
/// category, is an expense category.
///
/// # Errors
/// `NotFound` / `ArchivedReference` for the target, `Validation` for an income category.
pub(crate) async fn require_budgetable_target<C>(db: &C, target: &BudgetTarget) -> Result<()>
where
    C: ConnectionTrait,
{
    match target {
        BudgetTarget::Category(id) => {
            let category = require_active_category(db, id).await?;
            if category.category_type != CategoryType::Expense {
                return Err(Error::validation(format!(
                    "Only expense categories can be budgeted, {id} is an income category"
                )));
            }
        }
        BudgetTarget::SavingsBucket(id) => {
            require_active_savings_bucket(db, id).await?;
        }
    }
    Ok(())
}

/// Inserts a budget row without reference checks.
///
/// A unique-index conflict is reported as a domain-level duplicate for this month and target.
pub(crate) async fn insert_budget<C>(
    db: &C,
    month: MonthKey,
    target: &BudgetTarget,
    amount_idr: i64,
    note: Option<String>,
) -> Result<budget::Model>
where
    C: ConnectionTrait,
{
    let (category_id, savings_bucket_id) = target.columns();
    let now = Utc::now();
    budget::ActiveModel {
        id: Set(Uuid::new_v4().to_string()),
        month: Set(month.start()),
        category_id: Set(category_id),
        savings_bucket_id: Set(savings_bucket_id),
        amount_idr: Set(amount_idr),
        note: Set(note),
        archived: Set(false),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(db)
    .await
    .map_err(|e| match Error::from(e) {
        Error::Conflict { .. } => duplicate_budget(month, target),
        other => other,
    })
}

/// Creates a budget for one target in one month.
///
/// # Errors
/// - `Validation` for a non-positive amount or an income category
/// - `NotFound` / `ArchivedReference` for the target
/// - `Conflict` when the target already has an active budget that month
#[instrument(skip(db))]
pub async fn create_budget(
    db: &DatabaseConnection,
    month: MonthKey,
    target: BudgetTarget,
    amount_idr: i64,
    note: Option<String>,
) -> Result<budget::Model> {
    validate_amount(amount_idr)?;
    require_budgetable_target(db, &target).await?;

    if find_active_budget(db, month, &target).await?.is_some() {
        return Err(duplicate_budget(month, &target));
    }

    let budget = insert_budget(db, month, &target, amount_idr, normalize_note(note)).await?;
    info!(budget_id = %budget.id, %month, "Created budget");
    Ok(budget)
}

/// Finds a budget by id, archived or not.
pub async fn get_budget<C>(db: &C, budget_id: &str) -> Result<Option<budget::Model>>
where
    C: ConnectionTrait,
{
    Budget::find_by_id(budget_id.to_string())
        .one(db)
        .await
        .map_err(Into::into)
}

async fn require_budget<C>(db: &C, budget_id: &str) -> Result<budget::Model>
where
    C: ConnectionTrait,
{
    get_budget(db, budget_id)
        .await?
        .ok_or_else(|| Error::not_found(Resource::Budget, budget_id))
}

/// Lists active budgets, for one month or for all months, oldest month first.
pub async fn list_budgets(
    db: &DatabaseConnection,
    month: Option<MonthKey>,
) -> Result<Vec<budget::Model>> {
    let mut query = Budget::find().filter(budget::Column::Archived.eq(false));
    if let Some(month) = month {
        query = query.filter(budget::Column::Month.eq(month.start()));
    }
    query
        .order_by_asc(budget::Column::Month)
        .order_by_asc(budget::Column::CreatedAt)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Lists archived budgets, for one month or for all months, oldest month first.
///
/// These are the ids [`restore_budget`] and bulk restore accept.
pub async fn list_archived_budgets(
    db: &DatabaseConnection,
    month: Option<MonthKey>,
) -> Result<Vec<budget::Model>> {
    let mut query = Budget::find().filter(budget::Column::Archived.eq(true));
    if let Some(month) = month {
        query = query.filter(budget::Column::Month.eq(month.start()));
    }
    query
        .order_by_asc(budget::Column::Month)
        .order_by_asc(budget::Column::CreatedAt)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Changes a budget's amount and note. The month and target never change.
#[instrument(skip(db))]
pub async fn update_budget(
    db: &DatabaseConnection,
    budget_id: &str,
    amount_idr: i64,
    note: Option<String>,
) -> Result<budget::Model> {
    validate_amount(amount_idr)?;
    let budget = require_budget(db, budget_id).await?;

    let mut active_model: budget::ActiveModel = budget.into();
    active_model.amount_idr = Set(amount_idr);
    active_model.note = Set(normalize_note(note));
    active_model.updated_at = Set(Utc::now());
    let updated = active_model.update(db).await?;

    info!(budget_id, amount_idr, "Updated budget");
    Ok(updated)
}

/// Archives an active budget.
///
/// # Errors
/// `NotFound` when missing, `Conflict` when already archived.
#[instrument(skip(db))]
pub async fn archive_budget<C>(db: &C, budget_id: &str) -> Result<budget::Model>
where
    C: ConnectionTrait,
{
    let budget = require_budget(db, budget_id).await?;
    if budget.archived {
        return Err(Error::conflict(format!("Budget {budget_id} is already archived")));
    }

    let mut active_model: budget::ActiveModel = budget.into();
    active_model.archived = Set(true);
    active_model.updated_at = Set(Utc::now());
    let updated = active_model.update(db).await?;

    info!(budget_id, "Archived budget");
    Ok(updated)
}

/// Restores an archived budget.
///
/// # Errors
/// `NotFound` when missing, `Conflict` when already active or when another active budget
/// now holds the same month and target.
#[instrument(skip(db))]
pub async fn restore_budget<C>(db: &C, budget_id: &str) -> Result<budget::Model>
where
    C: ConnectionTrait,
{
    let budget = require_budget(db, budget_id).await?;
    if !budget.archived {
        return Err(Error::conflict(format!("Budget {budget_id} is not archived")));
    }

    let month = MonthKey::containing(budget.month);
    let target = budget.target()?;
    if find_active_budget(db, month, &target).await?.is_some() {
        return Err(duplicate_budget(month, &target));
    }

    let mut active_model: budget::ActiveModel = budget.into();
    active_model.archived = Set(false);
    active_model.updated_at = Set(Utc::now());
    let updated = active_model.update(db).await.map_err(|e| match Error::from(e) {
        Error::Conflict { .. } => duplicate_budget(month, &target),
        other => other,
    })?;

    info!(budget_id, "Restored budget");
    Ok(updated)
}

/// Permanently deletes a budget, active or archived.
///
/// # Errors
/// `NotFound` when no budget has this id.
#[instrument(skip(db))]
pub async fn delete_budget<C>(db: &C, budget_id: &str) -> Result<()>
where
    C: ConnectionTrait,
{
    let result = Budget::delete_by_id(budget_id.to_string()).exec(db).await?;
    if result.rows_affected == 0 {
        return Err(Error::not_found(Resource::Budget, budget_id));
    }
    info!(budget_id, "Deleted budget");
    Ok(())
}
