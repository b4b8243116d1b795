use std::collections::HashMap;

use sea_orm::{Condition, QueryFilter, QueryOrder, TransactionTrait, prelude::*, sea_query::Expr};
use uuid::Uuid;

use crate::{
    EngineError, Movement, MovementStatus, Period, ResultEngine, TransactionView, movements,
};

use super::{
    Engine, MovementNew,
    movements::{in_period, into_movements},
    with_tx,
};

/// An estimate plus the movements already realized against it.
#[derive(Clone, Debug, PartialEq)]
pub struct TransactionNew {
    /// Stored as `planned` and as its own root.
    pub estimate: MovementNew,
    /// Stored as `paid` and grouped under the estimate.
    pub realized: Vec<MovementNew>,
}

impl Engine {
    /// Create a whole transaction group in one DB transaction: if any
    /// movement or wallet update fails nothing is written.
    pub async fn add_consistent(
        &self,
        new: TransactionNew,
        user_id: &str,
    ) -> ResultEngine<TransactionView> {
        with_tx!(self, "error to add transaction", |db_tx| {
            let TransactionNew {
                mut estimate,
                realized,
            } = new;
            estimate.status = MovementStatus::Planned;
            estimate.transaction_id = None;
            let estimate = self.insert_movement(&db_tx, estimate, user_id).await?;

            let mut movements = Vec::with_capacity(realized.len());
            for mut movement in realized {
                movement.status = MovementStatus::Paid;
                movement.transaction_id = Some(estimate.id);
                movements.push(self.insert_movement(&db_tx, movement, user_id).await?);
            }

            tracing::info!(
                "transaction {} added with {} realized movements",
                estimate.id,
                movements.len()
            );
            TransactionView::new(Some(estimate), movements)
        })
    }

    /// The planned movement `id` with the paid movements grouped under it.
    pub async fn transaction(&self, id: Uuid, user_id: &str) -> ResultEngine<TransactionView> {
        with_tx!(self, "error to find transaction", |db_tx| {
            let estimate = movements::Entity::find_by_id(id)
                .filter(movements::Column::UserId.eq(user_id))
                .filter(movements::Column::Status.eq(MovementStatus::Planned.as_str()))
                .one(&db_tx)
                .await?
                .ok_or_else(|| EngineError::NotFound(format!("transaction {id}")))?;

            let realized = movements::Entity::find()
                .filter(movements::Column::UserId.eq(user_id))
                .filter(movements::Column::TransactionId.eq(id))
                .filter(movements::Column::Id.ne(id))
                .filter(movements::Column::Status.eq(MovementStatus::Paid.as_str()))
                .order_by_asc(movements::Column::Date)
                .order_by_asc(movements::Column::CreatedAt)
                .all(&db_tx)
                .await?;

            TransactionView::new(
                Some(Movement::try_from(estimate)?),
                into_movements(realized)?,
            )
        })
    }

    /// Every planned movement of the period with its realized movements,
    /// followed by the ungrouped paid movements of the period.
    ///
    /// Realized movements are attached to their estimate even when they fall
    /// outside the period.
    pub async fn transactions_in_period(
        &self,
        period: &Period,
        user_id: &str,
    ) -> ResultEngine<Vec<TransactionView>> {
        with_tx!(self, "error to list transactions", |db_tx| {
            let owned = || movements::Entity::find().filter(movements::Column::UserId.eq(user_id));

            let estimates = in_period(owned(), period)
                .filter(movements::Column::Status.eq(MovementStatus::Planned.as_str()))
                .order_by_asc(movements::Column::Date)
                .order_by_asc(movements::Column::CreatedAt)
                .all(&db_tx)
                .await?;
            let estimates = into_movements(estimates)?;

            let mut realized_by_root: HashMap<Uuid, Vec<Movement>> = HashMap::new();
            if !estimates.is_empty() {
                let roots: Vec<Uuid> = estimates.iter().map(|m| m.id).collect();
                let realized = owned()
                    .filter(movements::Column::TransactionId.is_in(roots))
                    .filter(movements::Column::Status.eq(MovementStatus::Paid.as_str()))
                    .order_by_asc(movements::Column::Date)
                    .order_by_asc(movements::Column::CreatedAt)
                    .all(&db_tx)
                    .await?;
                for movement in into_movements(realized)? {
                    if movement.is_ungrouped() {
                        continue;
                    }
                    if let Some(root) = movement.transaction_id {
                        realized_by_root.entry(root).or_default().push(movement);
                    }
                }
            }

            let ungrouped = in_period(owned(), period)
                .filter(movements::Column::Status.eq(MovementStatus::Paid.as_str()))
                .filter(
                    Condition::any()
                        .add(movements::Column::TransactionId.is_null())
                        .add(
                            Expr::col(movements::Column::TransactionId)
                                .equals(movements::Column::Id),
                        ),
                )
                .order_by_asc(movements::Column::Date)
                .order_by_asc(movements::Column::CreatedAt)
                .all(&db_tx)
                .await?;

            let mut views: Vec<TransactionView> = estimates
                .into_iter()
                .map(|estimate| {
                    let realized = realized_by_root.remove(&estimate.id).unwrap_or_default();
                    TransactionView::new(Some(estimate), realized)
                })
                .collect();
            for movement in into_movements(ungrouped)? {
                views.push(TransactionView::new(None, vec![movement]));
            }

            if views.is_empty() {
                return Err(EngineError::NotFound("transactions in period".to_string()));
            }
            views
        })
    }
}
