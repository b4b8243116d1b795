//! Movement primitives.
//!
//! A `Movement` is a single financial entry against a wallet. Its sign encodes
//! the direction: income is `>= 0`, expense is `< 0`.

use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, ResultEngine};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MovementStatus {
    Paid,
    Planned,
}

impl MovementStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Paid => "paid",
            Self::Planned => "planned",
        }
    }
}

impl TryFrom<&str> for MovementStatus {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "paid" => Ok(Self::Paid),
            "planned" => Ok(Self::Planned),
            other => Err(EngineError::Validation(format!(
                "invalid movement status: {other}"
            ))),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Movement {
    pub id: Uuid,
    pub description: String,
    pub amount: f64,
    pub date: NaiveDate,
    pub wallet_id: Uuid,
    pub type_payment_id: Option<Uuid>,
    pub category_id: Option<Uuid>,
    pub sub_category_id: Option<Uuid>,
    pub status: MovementStatus,
    /// Group root. A movement created without a group is its own root.
    pub transaction_id: Option<Uuid>,
    pub user_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Movement {
    /// Amount this movement adds to its wallet balance.
    pub fn wallet_effect(&self) -> f64 {
        match self.status {
            MovementStatus::Paid => self.amount,
            MovementStatus::Planned => 0.0,
        }
    }

    /// True when the movement does not belong to any group but its own.
    pub fn is_ungrouped(&self) -> bool {
        self.transaction_id.is_none_or(|root| root == self.id)
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "movements")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub description: String,
    pub amount: f64,
    pub date: Date,
    pub wallet_id: Uuid,
    pub type_payment_id: Option<Uuid>,
    pub category_id: Option<Uuid>,
    pub sub_category_id: Option<Uuid>,
    pub status: String,
    pub transaction_id: Option<Uuid>,
    pub user_id: String,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::wallets::Entity",
        from = "Column::WalletId",
        to = "super::wallets::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Wallet,
}

impl Related<super::wallets::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Wallet.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Movement> for ActiveModel {
    fn from(value: &Movement) -> Self {
        Self {
            id: ActiveValue::Set(value.id),
            description: ActiveValue::Set(value.description.clone()),
            amount: ActiveValue::Set(value.amount),
            date: ActiveValue::Set(value.date),
            wallet_id: ActiveValue::Set(value.wallet_id),
            type_payment_id: ActiveValue::Set(value.type_payment_id),
            category_id: ActiveValue::Set(value.category_id),
            sub_category_id: ActiveValue::Set(value.sub_category_id),
            status: ActiveValue::Set(value.status.as_str().to_string()),
            transaction_id: ActiveValue::Set(value.transaction_id),
            user_id: ActiveValue::Set(value.user_id.clone()),
            created_at: ActiveValue::Set(value.created_at),
            updated_at: ActiveValue::Set(value.updated_at),
        }
    }
}

impl TryFrom<Model> for Movement {
    type Error = EngineError;

    fn try_from(model: Model) -> ResultEngine<Self> {
        Ok(Self {
            id: model.id,
            description: model.description,
            amount: model.amount,
            date: model.date,
            wallet_id: model.wallet_id,
            type_payment_id: model.type_payment_id,
            category_id: model.category_id,
            sub_category_id: model.sub_category_id,
            status: MovementStatus::try_from(model.status.as_str())?,
            transaction_id: model.transaction_id,
            user_id: model.user_id,
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }
}
