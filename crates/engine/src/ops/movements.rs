use chrono::{NaiveDate, Utc};
use sea_orm::{
    ActiveValue, ConnectionTrait, PaginatorTrait, QueryFilter, QueryOrder, Select,
    TransactionTrait, prelude::*, sea_query::Expr,
};
use uuid::Uuid;

use crate::{EngineError, Movement, MovementStatus, Period, ResultEngine, movements};

use super::{Engine, ensure_finite, normalize_required_text, with_tx};

/// Input of a new movement.
#[derive(Clone, Debug, PartialEq)]
pub struct MovementNew {
    pub description: String,
    pub amount: f64,
    pub date: NaiveDate,
    pub wallet_id: Uuid,
    pub type_payment_id: Option<Uuid>,
    pub category_id: Option<Uuid>,
    pub sub_category_id: Option<Uuid>,
    pub status: MovementStatus,
    /// Group root; `None` makes the movement its own root.
    pub transaction_id: Option<Uuid>,
}

/// Fields to overwrite on an existing movement. `None` leaves the stored
/// value alone, so zero amounts and empty references can be set explicitly.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MovementPatch {
    pub description: Option<String>,
    pub amount: Option<f64>,
    pub date: Option<NaiveDate>,
    pub wallet_id: Option<Uuid>,
    pub type_payment_id: Option<Uuid>,
    pub category_id: Option<Uuid>,
    pub sub_category_id: Option<Uuid>,
    pub status: Option<MovementStatus>,
    pub transaction_id: Option<Uuid>,
}

impl MovementPatch {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Restrict a movement query to the dates of `period`.
pub(super) fn in_period(
    query: Select<movements::Entity>,
    period: &Period,
) -> Select<movements::Entity> {
    let query = if period.from == NaiveDate::MIN {
        query
    } else {
        query.filter(movements::Column::Date.gte(period.from))
    };
    match period.to {
        Some(to) => query.filter(movements::Column::Date.lte(to)),
        None => query,
    }
}

pub(super) fn into_movements(models: Vec<movements::Model>) -> ResultEngine<Vec<Movement>> {
    models.into_iter().map(Movement::try_from).collect()
}

impl Engine {
    /// Check the references of a movement against what the user can see.
    ///
    /// Returns the category to store: when only a sub-category is given its
    /// parent is filled in.
    async fn check_references<C: ConnectionTrait>(
        &self,
        db: &C,
        movement: &Movement,
        user_id: &str,
    ) -> ResultEngine<Option<Uuid>> {
        self.require_wallet(db, movement.wallet_id, user_id)
            .await
            .map_err(Self::as_bad_reference)?;

        if let Some(type_payment_id) = movement.type_payment_id {
            self.require_type_payment(db, type_payment_id, user_id)
                .await
                .map_err(Self::as_bad_reference)?;
        }

        if let Some(category_id) = movement.category_id {
            self.require_visible_category(db, category_id, user_id)
                .await
                .map_err(Self::as_bad_reference)?;
        }

        let mut category_id = movement.category_id;
        if let Some(sub_category_id) = movement.sub_category_id {
            let sub = self
                .require_visible_sub_category(db, sub_category_id, user_id)
                .await
                .map_err(Self::as_bad_reference)?;
            match category_id {
                Some(category_id) if category_id != sub.category_id => {
                    return Err(EngineError::Validation(format!(
                        "sub-category {sub_category_id} does not belong to category {category_id}"
                    )));
                }
                Some(_) => {}
                None => category_id = Some(sub.category_id),
            }
        }

        if let Some(root_id) = movement.transaction_id
            && root_id != movement.id
        {
            let root = Movement::try_from(
                self.require_movement(db, root_id, user_id)
                    .await
                    .map_err(Self::as_bad_reference)?,
            )?;
            if root.status != MovementStatus::Planned || !root.is_ungrouped() {
                return Err(EngineError::Validation(format!(
                    "movement {root_id} is not a planned estimate"
                )));
            }
        }

        Ok(category_id)
    }

    /// Validate, insert and apply the wallet side effect of a movement.
    ///
    /// Must run inside the caller's DB transaction: the insert and the wallet
    /// credit commit or roll back together.
    pub(super) async fn insert_movement<C: ConnectionTrait>(
        &self,
        db: &C,
        new: MovementNew,
        user_id: &str,
    ) -> ResultEngine<Movement> {
        let id = Uuid::new_v4();
        let now = Utc::now();
        let mut movement = Movement {
            id,
            description: normalize_required_text(&new.description, "movement")?,
            amount: ensure_finite(new.amount, "amount")?,
            date: new.date,
            wallet_id: new.wallet_id,
            type_payment_id: new.type_payment_id,
            category_id: new.category_id,
            sub_category_id: new.sub_category_id,
            status: new.status,
            transaction_id: Some(new.transaction_id.unwrap_or(id)),
            user_id: user_id.to_string(),
            created_at: now,
            updated_at: now,
        };
        movement.category_id = self.check_references(db, &movement, user_id).await?;

        movements::ActiveModel::from(&movement).insert(db).await?;
        self.credit_wallet(db, movement.wallet_id, movement.wallet_effect())
            .await?;

        tracing::debug!(
            "movement {} ({}) added to wallet {}",
            movement.id,
            movement.status.as_str(),
            movement.wallet_id
        );
        Ok(movement)
    }

    /// Record a movement. A paid movement credits its wallet by `amount` in
    /// the same DB transaction.
    pub async fn add_movement(&self, new: MovementNew, user_id: &str) -> ResultEngine<Movement> {
        with_tx!(self, "error to add movement", |db_tx| {
            self.insert_movement(&db_tx, new, user_id).await?
        })
    }

    pub async fn movement(&self, id: Uuid, user_id: &str) -> ResultEngine<Movement> {
        with_tx!(self, "error to find movement", |db_tx| {
            Movement::try_from(self.require_movement(&db_tx, id, user_id).await?)?
        })
    }

    /// Every movement of the user, oldest first.
    pub async fn movements(&self, user_id: &str) -> ResultEngine<Vec<Movement>> {
        self.movements_in_period(&Period::new(None, None)?, user_id)
            .await
    }

    pub async fn movements_in_period(
        &self,
        period: &Period,
        user_id: &str,
    ) -> ResultEngine<Vec<Movement>> {
        with_tx!(self, "error to list movements", |db_tx| {
            let query = movements::Entity::find().filter(movements::Column::UserId.eq(user_id));
            let models = in_period(query, period)
                .order_by_asc(movements::Column::Date)
                .order_by_asc(movements::Column::CreatedAt)
                .all(&db_tx)
                .await?;
            into_movements(models)?
        })
    }

    /// Overwrite the given fields, moving the paid amount between wallets
    /// when amount, status or wallet change.
    pub async fn update_movement(
        &self,
        id: Uuid,
        patch: MovementPatch,
        user_id: &str,
    ) -> ResultEngine<Movement> {
        with_tx!(self, "error to update movement", |db_tx| {
            let old = Movement::try_from(self.require_movement(&db_tx, id, user_id).await?)?;

            let mut movement = old.clone();
            if let Some(description) = patch.description.as_deref() {
                movement.description = normalize_required_text(description, "movement")?;
            }
            if let Some(amount) = patch.amount {
                movement.amount = ensure_finite(amount, "amount")?;
            }
            if let Some(date) = patch.date {
                movement.date = date;
            }
            if let Some(wallet_id) = patch.wallet_id {
                movement.wallet_id = wallet_id;
            }
            if patch.type_payment_id.is_some() {
                movement.type_payment_id = patch.type_payment_id;
            }
            if patch.category_id.is_some() {
                movement.category_id = patch.category_id;
            }
            if patch.sub_category_id.is_some() {
                movement.sub_category_id = patch.sub_category_id;
            }
            if let Some(status) = patch.status {
                movement.status = status;
            }
            if patch.transaction_id.is_some() {
                movement.transaction_id = patch.transaction_id;
            }
            movement.category_id = self.check_references(&db_tx, &movement, user_id).await?;

            // Children only hang off a planned root.
            if movement.status != MovementStatus::Planned || !movement.is_ungrouped() {
                let grouped = movements::Entity::find()
                    .filter(movements::Column::TransactionId.eq(id))
                    .filter(movements::Column::Id.ne(id))
                    .count(&db_tx)
                    .await?;
                if grouped > 0 {
                    return Err(EngineError::Validation(format!(
                        "movement {id} is the estimate of {grouped} movements"
                    )));
                }
            }
            movement.updated_at = Utc::now();

            let mut active = movements::ActiveModel::from(&movement);
            active.created_at = ActiveValue::NotSet;
            active.user_id = ActiveValue::NotSet;
            active.update(&db_tx).await?;

            if old.wallet_id == movement.wallet_id {
                self.credit_wallet(
                    &db_tx,
                    movement.wallet_id,
                    movement.wallet_effect() - old.wallet_effect(),
                )
                .await?;
            } else {
                self.credit_wallet(&db_tx, old.wallet_id, -old.wallet_effect())
                    .await?;
                self.credit_wallet(&db_tx, movement.wallet_id, movement.wallet_effect())
                    .await?;
            }

            movement
        })
    }

    /// Hard delete. A paid movement is taken back from its wallet, and the
    /// movements grouped under it become their own roots.
    pub async fn delete_movement(&self, id: Uuid, user_id: &str) -> ResultEngine<()> {
        with_tx!(self, "error to delete movement", |db_tx| {
            let old = Movement::try_from(self.require_movement(&db_tx, id, user_id).await?)?;

            movements::Entity::update_many()
                .col_expr(
                    movements::Column::TransactionId,
                    Expr::col(movements::Column::Id).into(),
                )
                .filter(movements::Column::TransactionId.eq(id))
                .filter(movements::Column::Id.ne(id))
                .exec(&db_tx)
                .await?;
            movements::Entity::delete_by_id(id).exec(&db_tx).await?;
            self.credit_wallet(&db_tx, old.wallet_id, -old.wallet_effect())
                .await?;
        })
    }
}
