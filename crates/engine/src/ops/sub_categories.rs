use chrono::Utc;
use sea_orm::{
    ActiveValue, PaginatorTrait, QueryFilter, QueryOrder, TransactionTrait, prelude::*,
    sea_query::Expr,
};
use uuid::Uuid;

use crate::{DEFAULT_OWNER, EngineError, ResultEngine, SubCategory, movements, sub_categories};

use super::{Engine, normalize_required_text, with_tx};

impl Engine {
    /// Add a sub-category under a category the user can see (own or default).
    pub async fn add_sub_category(
        &self,
        description: &str,
        category_id: Uuid,
        user_id: &str,
    ) -> ResultEngine<SubCategory> {
        with_tx!(self, "error to add sub-category", |db_tx| {
            let description = normalize_required_text(description, "sub-category")?;
            self.require_visible_category(&db_tx, category_id, user_id)
                .await
                .map_err(Self::as_bad_reference)?;

            let sub = SubCategory::new(description, category_id, user_id.to_string());
            sub_categories::ActiveModel::from(&sub)
                .insert(&db_tx)
                .await?;
            sub
        })
    }

    pub async fn sub_category(&self, id: Uuid, user_id: &str) -> ResultEngine<SubCategory> {
        with_tx!(self, "error to find sub-category", |db_tx| {
            SubCategory::from(self.require_visible_sub_category(&db_tx, id, user_id).await?)
        })
    }

    /// Visible sub-categories, optionally only those of one category.
    pub async fn sub_categories(
        &self,
        category_id: Option<Uuid>,
        user_id: &str,
    ) -> ResultEngine<Vec<SubCategory>> {
        with_tx!(self, "error to list sub-categories", |db_tx| {
            let mut query = sub_categories::Entity::find()
                .filter(sub_categories::Column::UserId.is_in([user_id, DEFAULT_OWNER]));
            if let Some(category_id) = category_id {
                query = query.filter(sub_categories::Column::CategoryId.eq(category_id));
            }
            query
                .order_by_asc(sub_categories::Column::Description)
                .all(&db_tx)
                .await?
                .into_iter()
                .map(SubCategory::from)
                .collect::<Vec<_>>()
        })
    }

    pub async fn update_sub_category(
        &self,
        id: Uuid,
        description: Option<&str>,
        category_id: Option<Uuid>,
        user_id: &str,
    ) -> ResultEngine<SubCategory> {
        with_tx!(self, "error to update sub-category", |db_tx| {
            let model = self.require_own_sub_category(&db_tx, id, user_id).await?;

            let mut active: sub_categories::ActiveModel = model.into();
            if let Some(description) = description {
                active.description =
                    ActiveValue::Set(normalize_required_text(description, "sub-category")?);
            }
            if let Some(category_id) = category_id {
                self.require_visible_category(&db_tx, category_id, user_id)
                    .await
                    .map_err(Self::as_bad_reference)?;
                active.category_id = ActiveValue::Set(category_id);

                // Movements follow their sub-category to the new parent.
                movements::Entity::update_many()
                    .col_expr(movements::Column::CategoryId, Expr::value(category_id))
                    .filter(movements::Column::SubCategoryId.eq(id))
                    .exec(&db_tx)
                    .await?;
            }
            active.updated_at = ActiveValue::Set(Utc::now());

            SubCategory::from(active.update(&db_tx).await?)
        })
    }

    pub async fn delete_sub_category(&self, id: Uuid, user_id: &str) -> ResultEngine<()> {
        with_tx!(self, "error to delete sub-category", |db_tx| {
            self.require_own_sub_category(&db_tx, id, user_id).await?;

            let used_by = movements::Entity::find()
                .filter(movements::Column::SubCategoryId.eq(id))
                .count(&db_tx)
                .await?;
            if used_by > 0 {
                return Err(EngineError::InUse(format!(
                    "sub-category {id} ({used_by} movements)"
                )));
            }

            sub_categories::Entity::delete_by_id(id).exec(&db_tx).await?;
        })
    }
}
