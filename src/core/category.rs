//! Category business logic - Income and expense classifications.

use crate::{
    entities::{Category, CategoryType, category},
    errors::{Error, Resource, Result},
};
use chrono::Utc;
use sea_orm::{QueryOrder, Set, prelude::*};
use tracing::{info, instrument};
use uuid::Uuid;

/// Creates a new, active category of the given type.
#[instrument(skip(db))]
pub async fn create_category(
    db: &DatabaseConnection,
    name: &str,
    category_type: CategoryType,
) -> Result<category::Model> {
    let name = name.trim();
    if name.is_empty() {
        return Err(Error::validation("Category name cannot be empty"));
    }

    let category = category::ActiveModel {
        id: Set(Uuid::new_v4().to_string()),
        name: Set(name.to_string()),
        category_type: Set(category_type),
        archived: Set(false),
        created_at: Set(Utc::now()),
    }
    .insert(db)
    .await?;

    info!(category_id = %category.id, "Created category");
    Ok(category)
}

/// Finds a category by id, archived or not.
pub async fn get_category_by_id<C>(db: &C, category_id: &str) -> Result<Option<category::Model>>
where
    C: ConnectionTrait,
{
    Category::find_by_id(category_id.to_string())
        .one(db)
        .await
        .map_err(Into::into)
}

/// Loads a category that a new transaction or budget is about to reference.
pub async fn require_active_category<C>(db: &C, category_id: &str) -> Result<category::Model>
where
    C: ConnectionTrait,
{
    let category = get_category_by_id(db, category_id)
        .await?
        .ok_or_else(|| Error::not_found(Resource::Category, category_id))?;
    if category.archived {
        return Err(Error::archived(Resource::Category, category_id));
    }
    Ok(category)
}

/// Retrieves active categories, optionally only those of one type, ordered by name.
pub async fn get_all_active_categories(
    db: &DatabaseConnection,
    category_type: Option<CategoryType>,
) -> Result<Vec<category::Model>> {
    let mut query = Category::find().filter(category::Column::Archived.eq(false));
    if let Some(category_type) = category_type {
        query = query.filter(category::Column::CategoryType.eq(category_type));
    }
    query
        .order_by_asc(category::Column::Name)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Archives a category. Archiving twice is a no-op.
#[instrument(skip(db))]
pub async fn archive_category(
    db: &DatabaseConnection,
    category_id: &str,
) -> Result<category::Model> {
    set_archived(db, category_id, true).await
}

/// Restores an archived category.
#[instrument(skip(db))]
pub async fn restore_category(
    db: &DatabaseConnection,
    category_id: &str,
) -> Result<category::Model> {
    set_archived(db, category_id, false).await
}

async fn set_archived(
    db: &DatabaseConnection,
    category_id: &str,
    archived: bool,
) -> Result<category::Model> {
    let category = get_category_by_id(db, category_id)
        .await?
        .ok_or_else(|| Error::not_found(Resource::Category, category_id))?;
    if category.archived == archived {
        return Ok(category);
    }

    let mut active_model: category::ActiveModel = category.into();
    active_model.archived = Set(archived);
    let updated = active_model.update(db).await?;
    info!(category_id, archived, "Category archive state changed");
    Ok(updated)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::*;

    #[tokio::test]
    async fn test_create_category() -> Result<()> {
        let db = setup_test_db().await?;

        let category = create_category(&db, "Salary", CategoryType::Income).await?;
        assert_eq!(category.name, "Salary");
        assert_eq!(category.category_type, CategoryType::Income);

        let err = create_category(&db, "", CategoryType::Expense)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Validation { .. }));
        Ok(())
    }

    #[tokio::test]
    async fn test_filter_by_type() -> Result<()> {
        let db = setup_test_db().await?;
        create_category(&db, "Salary", CategoryType::Income).await?;
        create_test_category(&db, "Groceries").await?;
        create_test_category(&db, "Dining").await?;

        let expenses = get_all_active_categories(&db, Some(CategoryType::Expense)).await?;
        assert_eq!(expenses.len(), 2);
        assert_eq!(expenses[0].name, "Dining");

        let all = get_all_active_categories(&db, None).await?;
        assert_eq!(all.len(), 3);
        Ok(())
    }

    #[tokio::test]
    async fn test_archived_category_is_rejected() -> Result<()> {
        let db = setup_test_db().await?;
        let category = create_test_category(&db, "Groceries").await?;

        archive_category(&db, &category.id).await?;
        let err = require_active_category(&db, &category.id)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            Error::ArchivedReference {
                resource: Resource::Category,
                ..
            }
        ));

        restore_category(&db, &category.id).await?;
        require_active_category(&db, &category.id).await?;
        Ok(())
    }
}
