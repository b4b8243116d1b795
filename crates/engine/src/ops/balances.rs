use sea_orm::{QueryFilter, TransactionTrait, prelude::*};

use crate::{Balance, MovementStatus, Period, ResultEngine, movements};

use super::{
    Engine,
    movements::{in_period, into_movements},
    with_tx,
};

impl Engine {
    /// Income and expense of the user's movements dated inside `period`.
    ///
    /// With `status` only movements in that state are summed.
    pub async fn balance(
        &self,
        period: &Period,
        status: Option<MovementStatus>,
        user_id: &str,
    ) -> ResultEngine<Balance> {
        with_tx!(self, "error to compute balance", |db_tx| {
            let mut query = in_period(movements::Entity::find(), period)
                .filter(movements::Column::UserId.eq(user_id));
            if let Some(status) = status {
                query = query.filter(movements::Column::Status.eq(status.as_str()));
            }
            let movements = into_movements(query.all(&db_tx).await?)?;

            Balance::from_movements(*period, &movements)
        })
    }
}
