//! Categories and sub-categories.
//!
//! Both are owner-scoped labels. Rows owned by [`DEFAULT_OWNER`] are shared
//! with every user.
//!
//! [`DEFAULT_OWNER`]: crate::DEFAULT_OWNER

use chrono::{DateTime, Utc};
use sea_orm::entity::{ActiveValue, prelude::*};
use uuid::Uuid;

use crate::sub_categories::{self, SubCategory};

#[derive(Clone, Debug, PartialEq)]
pub struct Category {
    pub id: Uuid,
    pub description: String,
    pub user_id: String,
    pub sub_categories: Vec<SubCategory>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Category {
    pub fn new(description: String, user_id: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            description,
            user_id,
            sub_categories: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "categories")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub description: String,
    pub user_id: String,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::sub_categories::Entity")]
    SubCategories,
}

impl Related<super::sub_categories::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::SubCategories.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Category> for ActiveModel {
    fn from(value: &Category) -> Self {
        Self {
            id: ActiveValue::Set(value.id),
            description: ActiveValue::Set(value.description.clone()),
            user_id: ActiveValue::Set(value.user_id.clone()),
            created_at: ActiveValue::Set(value.created_at),
            updated_at: ActiveValue::Set(value.updated_at),
        }
    }
}

impl Category {
    /// Build a category from its row and the sub-category rows fetched for it.
    pub(crate) fn from_parts(model: Model, subs: Vec<sub_categories::Model>) -> Self {
        Self {
            id: model.id,
            description: model.description,
            user_id: model.user_id,
            sub_categories: subs.into_iter().map(SubCategory::from).collect(),
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}
