use sea_orm::{ConnectionTrait, QueryFilter, prelude::*, sea_query::Expr};
use uuid::Uuid;

use crate::{
    DEFAULT_OWNER, EngineError, ResultEngine, categories, movements, sub_categories, type_payments,
    wallets,
};

use super::Engine;

/// Generates a `require_*` method loading one row of `$entity` by id, scoped to
/// the given owners.
///
/// - `owned`: only rows of the caller.
/// - `visible`: rows of the caller or of [`DEFAULT_OWNER`].
macro_rules! impl_require {
    (owned, $require_fn:ident, $entity:path, $user_col:expr, $label:literal) => {
        pub(super) async fn $require_fn<C: ConnectionTrait>(
            &self,
            db: &C,
            id: Uuid,
            user_id: &str,
        ) -> ResultEngine<<$entity as EntityTrait>::Model> {
            <$entity>::find_by_id(id)
                .filter($user_col.eq(user_id))
                .one(db)
                .await?
                .ok_or_else(|| EngineError::NotFound(format!("{} {id}", $label)))
        }
    };
    (visible, $require_fn:ident, $entity:path, $user_col:expr, $label:literal) => {
        pub(super) async fn $require_fn<C: ConnectionTrait>(
            &self,
            db: &C,
            id: Uuid,
            user_id: &str,
        ) -> ResultEngine<<$entity as EntityTrait>::Model> {
            <$entity>::find_by_id(id)
                .filter($user_col.is_in([user_id, DEFAULT_OWNER]))
                .one(db)
                .await?
                .ok_or_else(|| EngineError::NotFound(format!("{} {id}", $label)))
        }
    };
}

impl Engine {
    impl_require!(
        owned,
        require_wallet,
        wallets::Entity,
        wallets::Column::UserId,
        "wallet"
    );

    impl_require!(
        owned,
        require_movement,
        movements::Entity,
        movements::Column::UserId,
        "movement"
    );

    impl_require!(
        owned,
        require_type_payment,
        type_payments::Entity,
        type_payments::Column::UserId,
        "type payment"
    );

    impl_require!(
        owned,
        require_own_category,
        categories::Entity,
        categories::Column::UserId,
        "category"
    );

    impl_require!(
        visible,
        require_visible_category,
        categories::Entity,
        categories::Column::UserId,
        "category"
    );

    impl_require!(
        owned,
        require_own_sub_category,
        sub_categories::Entity,
        sub_categories::Column::UserId,
        "sub-category"
    );

    impl_require!(
        visible,
        require_visible_sub_category,
        sub_categories::Entity,
        sub_categories::Column::UserId,
        "sub-category"
    );

    /// Credit `amount` to a wallet with a single `balance = balance + ?`
    /// statement.
    pub(super) async fn credit_wallet<C: ConnectionTrait>(
        &self,
        db: &C,
        wallet_id: Uuid,
        amount: f64,
    ) -> ResultEngine<()> {
        if amount == 0.0 {
            return Ok(());
        }

        let result = wallets::Entity::update_many()
            .col_expr(
                wallets::Column::Balance,
                Expr::col(wallets::Column::Balance).add(amount),
            )
            .col_expr(wallets::Column::UpdatedAt, Expr::value(chrono::Utc::now()))
            .filter(wallets::Column::Id.eq(wallet_id))
            .exec(db)
            .await?;
        if result.rows_affected == 0 {
            return Err(EngineError::NotFound(format!("wallet {wallet_id}")));
        }
        Ok(())
    }

    /// Turn a reference check failure into a validation error: a dangling
    /// reference in the payload is bad input, not a missing resource.
    pub(super) fn as_bad_reference(err: EngineError) -> EngineError {
        match err {
            EngineError::NotFound(what) => EngineError::Validation(format!("unknown {what}")),
            other => other,
        }
    }
}
