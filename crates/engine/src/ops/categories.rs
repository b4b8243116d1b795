use std::collections::HashMap;

use chrono::Utc;
use sea_orm::{
    ActiveValue, ConnectionTrait, PaginatorTrait, QueryFilter, QueryOrder, TransactionTrait,
    prelude::*,
};
use uuid::Uuid;

use crate::{
    Category, DEFAULT_OWNER, EngineError, ResultEngine, categories, movements, sub_categories,
};

use super::{Engine, normalize_required_text, with_tx};

impl Engine {
    /// Load the sub-categories of `categories` visible to the user and stitch
    /// them to their parent, both levels ordered by description.
    async fn stitch_sub_categories<C: ConnectionTrait>(
        &self,
        db: &C,
        parents: Vec<categories::Model>,
        user_id: &str,
    ) -> ResultEngine<Vec<Category>> {
        let ids: Vec<Uuid> = parents.iter().map(|c| c.id).collect();
        let mut by_parent: HashMap<Uuid, Vec<sub_categories::Model>> = HashMap::new();
        if !ids.is_empty() {
            let subs = sub_categories::Entity::find()
                .filter(sub_categories::Column::CategoryId.is_in(ids))
                .filter(sub_categories::Column::UserId.is_in([user_id, DEFAULT_OWNER]))
                .order_by_asc(sub_categories::Column::Description)
                .all(db)
                .await?;
            for sub in subs {
                by_parent.entry(sub.category_id).or_default().push(sub);
            }
        }

        Ok(parents
            .into_iter()
            .map(|model| {
                let subs = by_parent.remove(&model.id).unwrap_or_default();
                Category::from_parts(model, subs)
            })
            .collect())
    }

    pub async fn add_category(&self, description: &str, user_id: &str) -> ResultEngine<Category> {
        with_tx!(self, "error to add category", |db_tx| {
            let description = normalize_required_text(description, "category")?;
            let category = Category::new(description, user_id.to_string());
            categories::ActiveModel::from(&category)
                .insert(&db_tx)
                .await?;
            category
        })
    }

    /// A category owned by the user or shared by default, with its
    /// sub-categories.
    pub async fn category(&self, category_id: Uuid, user_id: &str) -> ResultEngine<Category> {
        with_tx!(self, "error to find category", |db_tx| {
            let model = self
                .require_visible_category(&db_tx, category_id, user_id)
                .await?;
            self.stitch_sub_categories(&db_tx, vec![model], user_id)
                .await?
                .pop()
                .ok_or_else(|| EngineError::NotFound(format!("category {category_id}")))?
        })
    }

    /// Categories owned by the user plus the default ones, alphabetically.
    pub async fn categories(&self, user_id: &str) -> ResultEngine<Vec<Category>> {
        with_tx!(self, "error to list categories", |db_tx| {
            let parents = categories::Entity::find()
                .filter(categories::Column::UserId.is_in([user_id, DEFAULT_OWNER]))
                .order_by_asc(categories::Column::Description)
                .order_by_asc(categories::Column::Id)
                .all(&db_tx)
                .await?;
            self.stitch_sub_categories(&db_tx, parents, user_id).await?
        })
    }

    /// Default categories can be read by everyone but changed by nobody.
    pub async fn update_category(
        &self,
        category_id: Uuid,
        description: Option<&str>,
        user_id: &str,
    ) -> ResultEngine<Category> {
        with_tx!(self, "error to update category", |db_tx| {
            let model = self
                .require_own_category(&db_tx, category_id, user_id)
                .await?;

            let mut active: categories::ActiveModel = model.into();
            if let Some(description) = description {
                active.description =
                    ActiveValue::Set(normalize_required_text(description, "category")?);
            }
            active.updated_at = ActiveValue::Set(Utc::now());
            let model = active.update(&db_tx).await?;

            self.stitch_sub_categories(&db_tx, vec![model], user_id)
                .await?
                .pop()
                .ok_or_else(|| EngineError::NotFound(format!("category {category_id}")))?
        })
    }

    pub async fn delete_category(&self, category_id: Uuid, user_id: &str) -> ResultEngine<()> {
        with_tx!(self, "error to delete category", |db_tx| {
            self.require_own_category(&db_tx, category_id, user_id)
                .await?;

            let subs = sub_categories::Entity::find()
                .filter(sub_categories::Column::CategoryId.eq(category_id))
                .count(&db_tx)
                .await?;
            if subs > 0 {
                return Err(EngineError::InUse(format!(
                    "category {category_id} ({subs} sub-categories)"
                )));
            }
            let used_by = movements::Entity::find()
                .filter(movements::Column::CategoryId.eq(category_id))
                .count(&db_tx)
                .await?;
            if used_by > 0 {
                return Err(EngineError::InUse(format!(
                    "category {category_id} ({used_by} movements)"
                )));
            }

            categories::Entity::delete_by_id(category_id)
                .exec(&db_tx)
                .await?;
        })
    }
}
