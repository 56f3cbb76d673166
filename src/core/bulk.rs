//! Bulk budget mutations - Delete, archive or restore many budgets in one call.
//!
//! Ids are processed one at a time through the same single-budget operations used for
//! direct calls. A failing id is recorded and the batch moves on; a batch never aborts
//! because of one bad id.

use crate::{
    config::settings::BudgetSettings,
    core::budget::{archive_budget, delete_budget, restore_budget},
    errors::{Error, Result},
};
use sea_orm::DatabaseConnection;
use serde::Serialize;
use std::collections::HashSet;
use tracing::{info, instrument, warn};

/// Largest batch accepted unless `[budget] max_bulk_batch` says otherwise.
pub const DEFAULT_MAX_BULK_BATCH: usize = 100;

/// The single-budget operation applied to each id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BulkOperation {
    /// Permanently delete
    Delete,
    /// Archive an active budget
    Archive,
    /// Restore an archived budget
    Restore,
}

/// Result of a bulk operation.
///
/// `deleted_count` counts the ids the operation succeeded for, whichever operation ran.
/// A non-empty `failed_ids` is a partial failure, which the transport reports distinctly
/// from total success.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkOutcome {
    /// Number of ids processed successfully
    pub deleted_count: usize,
    /// Ids that failed, in input order
    pub failed_ids: Vec<String>,
}

impl BulkOutcome {
    /// Whether some ids failed.
    #[must_use]
    pub fn is_partial_failure(&self) -> bool {
        !self.failed_ids.is_empty()
    }
}

/// Permanently deletes each budget in `ids`, honoring the configured batch cap.
pub async fn bulk_delete_budgets(
    db: &DatabaseConnection,
    ids: &[String],
    settings: &BudgetSettings,
) -> Result<BulkOutcome> {
    apply_bulk(db, BulkOperation::Delete, ids, settings.max_bulk_batch).await
}

/// Archives each budget in `ids`, honoring the configured batch cap.
pub async fn bulk_archive_budgets(
    db: &DatabaseConnection,
    ids: &[String],
    settings: &BudgetSettings,
) -> Result<BulkOutcome> {
    apply_bulk(db, BulkOperation::Archive, ids, settings.max_bulk_batch).await
}

/// Restores each budget in `ids`, honoring the configured batch cap.
pub async fn bulk_restore_budgets(
    db: &DatabaseConnection,
    ids: &[String],
    settings: &BudgetSettings,
) -> Result<BulkOutcome> {
    apply_bulk(db, BulkOperation::Restore, ids, settings.max_bulk_batch).await
}

/// Applies `operation` to each distinct id in order.
///
/// # Errors
/// `Validation` when `ids` is empty or longer than `max_batch`. Per-id failures never
/// surface as an error; they land in [`BulkOutcome::failed_ids`].
#[instrument(skip(db, ids), fields(count = ids.len()))]
pub async fn apply_bulk(
    db: &DatabaseConnection,
    operation: BulkOperation,
    ids: &[String],
    max_batch: usize,
) -> Result<BulkOutcome> {
    if ids.is_empty() {
        return Err(Error::validation("At least one budget id is required"));
    }
    if ids.len() > max_batch {
        return Err(Error::validation(format!(
            "At most {max_batch} budget ids can be processed at once, got {}",
            ids.len()
        )));
    }

    let mut seen = HashSet::with_capacity(ids.len());
    let mut outcome = BulkOutcome::default();
    for id in ids {
        if !seen.insert(id.as_str()) {
            continue;
        }

        let result = match operation {
            BulkOperation::Delete => delete_budget(db, id).await,
            BulkOperation::Archive => archive_budget(db, id).await.map(|_| ()),
            BulkOperation::Restore => restore_budget(db, id).await.map(|_| ()),
        };

        match result {
            Ok(()) => outcome.deleted_count += 1,
            Err(e) => {
                warn!(budget_id = %id, error = %e, ?operation, "Bulk item failed");
                outcome.failed_ids.push(id.clone());
            }
        }
    }

    info!(
        ?operation,
        succeeded = outcome.deleted_count,
        failed = outcome.failed_ids.len(),
        "Bulk budget operation finished"
    );
    Ok(outcome)
}
