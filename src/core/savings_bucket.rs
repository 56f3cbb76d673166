//! Savings bucket business logic - Named savings goals.

use crate::{
    entities::{SavingsBucket, savings_bucket},
    errors::{Error, Resource, Result},
};
use chrono::Utc;
use sea_orm::{QueryOrder, Set, prelude::*};
use tracing::{info, instrument};
use uuid::Uuid;

/// Creates a new, active savings bucket with an optional goal amount.
#[instrument(skip(db))]
pub async fn create_savings_bucket(
    db: &DatabaseConnection,
    name: &str,
    target_amount_idr: Option<i64>,
) -> Result<savings_bucket::Model> {
    let name = name.trim();
    if name.is_empty() {
        return Err(Error::validation("Savings bucket name cannot be empty"));
    }
    if let Some(target) = target_amount_idr {
        if target <= 0 {
            return Err(Error::validation(format!(
                "Savings target must be positive, got {target}"
            )));
        }
    }

    let bucket = savings_bucket::ActiveModel {
        id: Set(Uuid::new_v4().to_string()),
        name: Set(name.to_string()),
        target_amount_idr: Set(target_amount_idr),
        archived: Set(false),
        created_at: Set(Utc::now()),
    }
    .insert(db)
    .await?;

    info!(savings_bucket_id = %bucket.id, "Created savings bucket");
    Ok(bucket)
}

/// Finds a savings bucket by id, archived or not.
pub async fn get_savings_bucket_by_id<C>(
    db: &C,
    bucket_id: &str,
) -> Result<Option<savings_bucket::Model>>
where
    C: ConnectionTrait,
{
    SavingsBucket::find_by_id(bucket_id.to_string())
        .one(db)
        .await
        .map_err(Into::into)
}

/// Loads a savings bucket that a new posting or budget is about to reference.
pub async fn require_active_savings_bucket<C>(
    db: &C,
    bucket_id: &str,
) -> Result<savings_bucket::Model>
where
    C: ConnectionTrait,
{
    let bucket = get_savings_bucket_by_id(db, bucket_id)
        .await?
        .ok_or_else(|| Error::not_found(Resource::SavingsBucket, bucket_id))?;
    if bucket.archived {
        return Err(Error::archived(Resource::SavingsBucket, bucket_id));
    }
    Ok(bucket)
}

/// Retrieves all active savings buckets, ordered by name.
pub async fn get_all_active_savings_buckets(
    db: &DatabaseConnection,
) -> Result<Vec<savings_bucket::Model>> {
    SavingsBucket::find()
        .filter(savings_bucket::Column::Archived.eq(false))
        .order_by_asc(savings_bucket::Column::Name)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Archives a savings bucket. Archiving twice is a no-op.
#[instrument(skip(db))]
pub async fn archive_savings_bucket(
    db: &DatabaseConnection,
    bucket_id: &str,
) -> Result<savings_bucket::Model> {
    set_archived(db, bucket_id, true).await
}

/// Restores an archived savings bucket.
#[instrument(skip(db))]
pub async fn restore_savings_bucket(
    db: &DatabaseConnection,
    bucket_id: &str,
) -> Result<savings_bucket::Model> {
    set_archived(db, bucket_id, false).await
}

async fn set_archived(
    db: &DatabaseConnection,
    bucket_id: &str,
    archived: bool,
) -> Result<savings_bucket::Model> {
    let bucket = get_savings_bucket_by_id(db, bucket_id)
        .await?
        .ok_or_else(|| Error::not_found(Resource::SavingsBucket, bucket_id))?;
    if bucket.archived == archived {
        return Ok(bucket);
    }

    let mut active_model: savings_bucket::ActiveModel = bucket.into();
    active_model.archived = Set(archived);
    let updated = active_model.update(db).await?;
    info!(savings_bucket_id = bucket_id, archived, "Savings bucket archive state changed");
    Ok(updated)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::*;
    use sea_orm::{DatabaseBackend, MockDatabase};

    #[tokio::test]
    async fn test_create_savings_bucket_validation() {
        let db = MockDatabase::new(DatabaseBackend::Sqlite).into_connection();

        let result = create_savings_bucket(&db, "", None).await;
        assert!(matches!(result.unwrap_err(), Error::Validation { .. }));

        let result = create_savings_bucket(&db, "Holiday", Some(0)).await;
        assert!(matches!(result.unwrap_err(), Error::Validation { .. }));
    }

    #[tokio::test]
    async fn test_create_savings_bucket_with_target() -> Result<()> {
        let db = setup_test_db().await?;

        let bucket = create_savings_bucket(&db, "Emergency fund", Some(10_000_000)).await?;
        assert_eq!(bucket.target_amount_idr, Some(10_000_000));
        assert_eq!(get_all_active_savings_buckets(&db).await?.len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_archived_bucket_is_rejected() -> Result<()> {
        let db = setup_test_db().await?;
        let bucket = create_test_savings_bucket(&db, "Holiday").await?;

        archive_savings_bucket(&db, &bucket.id).await?;
        let err = require_active_savings_bucket(&db, &bucket.id)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::ArchivedReference { .. }));
        assert!(get_all_active_savings_buckets(&db).await?.is_empty());

        restore_savings_bucket(&db, &bucket.id).await?;
        require_active_savings_bucket(&db, &bucket.id).await?;
        Ok(())
    }
}
