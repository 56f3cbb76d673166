//! Budget copy - Carries one month's active budgets into another month.
//!
//! Targets that already have an active budget in the destination month are skipped, so
//! running the same copy twice creates nothing the second time. Targets that could no
//! longer be budgeted directly (archived or gone) are reported as invalid instead of
//! copied. The note is copied verbatim along with the amount.

use crate::{
    core::{
        budget::{
            BudgetTarget, TargetType, find_active_budget, insert_budget, list_budgets,
            require_budgetable_target, target_name,
        },
        month::MonthKey,
    },
    entities::budget,
    errors::{Error, Result},
};
use sea_orm::DatabaseConnection;
use serde::Serialize;
use tracing::{info, instrument, warn};

/// A source budget that was not copied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SkippedTarget {
    /// Category or savings bucket id
    pub target_id: String,
    /// Category or savings bucket
    pub target_type: TargetType,
    /// Display name of the target
    pub target_name: String,
}

/// Result of [`copy_budgets`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CopyOutcome {
    /// Budgets created in the destination month
    pub created: Vec<budget::Model>,
    /// Targets that already had an active budget there
    pub skipped: Vec<SkippedTarget>,
    /// Targets that are archived, missing or no longer budgetable
    pub invalid: Vec<SkippedTarget>,
}

async fn describe<C>(db: &C, target: &BudgetTarget) -> Result<SkippedTarget>
where
    C: sea_orm::ConnectionTrait,
{
    Ok(SkippedTarget {
        target_id: target.id().to_string(),
        target_type: target.target_type(),
        target_name: target_name(db, target).await?,
    })
}

/// Copies every active budget of `from` into `to`.
///
/// # Errors
/// `Validation` when `from` and `to` are the same month. A target that gains an active
/// budget between the existence check and the insert is reported as skipped. A target
/// that [`create_budget`](crate::core::budget::create_budget) would refuse lands in
/// `invalid`.
#[instrument(skip(db))]
pub async fn copy_budgets(
    db: &DatabaseConnection,
    from: MonthKey,
    to: MonthKey,
) -> Result<CopyOutcome> {
    if from == to {
        return Err(Error::validation(format!(
            "Cannot copy budgets of {from} onto itself"
        )));
    }

    let mut outcome = CopyOutcome::default();
    for source in list_budgets(db, Some(from)).await? {
        let target = source.target()?;

        match require_budgetable_target(db, &target).await {
            Ok(()) => {}
            Err(
                e @ (Error::NotFound { .. }
                | Error::ArchivedReference { .. }
                | Error::Validation { .. }),
            ) => {
                warn!(target_id = target.id(), error = %e, "Not copying budget");
                outcome.invalid.push(describe(db, &target).await?);
                continue;
            }
            Err(e) => return Err(e),
        }

        let inserted = if find_active_budget(db, to, &target).await?.is_some() {
            None
        } else {
            match insert_budget(db, to, &target, source.amount_idr, source.note.clone()).await {
                Ok(created) => Some(created),
                Err(Error::Conflict { .. }) => None,
                Err(e) => return Err(e),
            }
        };

        match inserted {
            Some(created) => outcome.created.push(created),
            None => outcome.skipped.push(describe(db, &target).await?),
        }
    }

    info!(
        created = outcome.created.len(),
        skipped = outcome.skipped.len(),
        invalid = outcome.invalid.len(),
        "Copied budgets"
    );
    Ok(outcome)
}
