use chrono::Utc;
use sea_orm::{ActiveValue, PaginatorTrait, QueryFilter, QueryOrder, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{EngineError, ResultEngine, TypePayment, movements, type_payments};

use super::{Engine, normalize_required_text, with_tx};

impl Engine {
    pub async fn add_type_payment(
        &self,
        description: &str,
        user_id: &str,
    ) -> ResultEngine<TypePayment> {
        with_tx!(self, "error to add type payment", |db_tx| {
            let description = normalize_required_text(description, "type payment")?;
            let type_payment = TypePayment::new(description, user_id.to_string());
            type_payments::ActiveModel::from(&type_payment)
                .insert(&db_tx)
                .await?;
            type_payment
        })
    }

    pub async fn type_payment(&self, id: Uuid, user_id: &str) -> ResultEngine<TypePayment> {
        with_tx!(self, "error to find type payment", |db_tx| {
            TypePayment::from(self.require_type_payment(&db_tx, id, user_id).await?)
        })
    }

    pub async fn type_payments(&self, user_id: &str) -> ResultEngine<Vec<TypePayment>> {
        with_tx!(self, "error to list type payments", |db_tx| {
            type_payments::Entity::find()
                .filter(type_payments::Column::UserId.eq(user_id))
                .order_by_asc(type_payments::Column::Description)
                .all(&db_tx)
                .await?
                .into_iter()
                .map(TypePayment::from)
                .collect::<Vec<_>>()
        })
    }

    pub async fn update_type_payment(
        &self,
        id: Uuid,
        description: Option<&str>,
        user_id: &str,
    ) -> ResultEngine<TypePayment> {
        with_tx!(self, "error to update type payment", |db_tx| {
            let model = self.require_type_payment(&db_tx, id, user_id).await?;

            let mut active: type_payments::ActiveModel = model.into();
            if let Some(description) = description {
                active.description =
                    ActiveValue::Set(normalize_required_text(description, "type payment")?);
            }
            active.updated_at = ActiveValue::Set(Utc::now());

            TypePayment::from(active.update(&db_tx).await?)
        })
    }

    pub async fn delete_type_payment(&self, id: Uuid, user_id: &str) -> ResultEngine<()> {
        with_tx!(self, "error to delete type payment", |db_tx| {
            self.require_type_payment(&db_tx, id, user_id).await?;

            let used_by = movements::Entity::find()
                .filter(movements::Column::TypePaymentId.eq(id))
                .count(&db_tx)
                .await?;
            if used_by > 0 {
                return Err(EngineError::InUse(format!(
                    "type payment {id} ({used_by} movements)"
                )));
            }

            type_payments::Entity::delete_by_id(id).exec(&db_tx).await?;
        })
    }
}
