use chrono::Utc;
use uuid::Uuid;

use sea_orm::{ActiveValue, PaginatorTrait, QueryFilter, QueryOrder, TransactionTrait, prelude::*};

use crate::{EngineError, ResultEngine, Wallet, movements, wallets};

use super::{Engine, ensure_finite, normalize_required_text, with_tx};

impl Engine {
    /// Add a new wallet with an opening balance.
    pub async fn add_wallet(
        &self,
        description: &str,
        balance: f64,
        user_id: &str,
    ) -> ResultEngine<Wallet> {
        with_tx!(self, "error to add wallet", |db_tx| {
            let description = normalize_required_text(description, "wallet")?;
            let balance = ensure_finite(balance, "balance")?;

            let wallet = Wallet::new(description, balance, user_id.to_string());
            wallets::ActiveModel::from(&wallet).insert(&db_tx).await?;
            tracing::debug!("wallet {} added for {user_id}", wallet.id);
            wallet
        })
    }

    /// Return a wallet snapshot from DB.
    pub async fn wallet(&self, wallet_id: Uuid, user_id: &str) -> ResultEngine<Wallet> {
        with_tx!(self, "error to find wallet", |db_tx| {
            Wallet::from(self.require_wallet(&db_tx, wallet_id, user_id).await?)
        })
    }

    /// Every wallet of the user, ordered by description.
    pub async fn wallets(&self, user_id: &str) -> ResultEngine<Vec<Wallet>> {
        with_tx!(self, "error to list wallets", |db_tx| {
            wallets::Entity::find()
                .filter(wallets::Column::UserId.eq(user_id))
                .order_by_asc(wallets::Column::Description)
                .all(&db_tx)
                .await?
                .into_iter()
                .map(Wallet::from)
                .collect::<Vec<_>>()
        })
    }

    /// Overwrite the given fields.
    ///
    /// Setting `balance` by hand breaks the link with the paid movements; it is
    /// meant for corrections.
    pub async fn update_wallet(
        &self,
        wallet_id: Uuid,
        description: Option<&str>,
        balance: Option<f64>,
        user_id: &str,
    ) -> ResultEngine<Wallet> {
        with_tx!(self, "error to update wallet", |db_tx| {
            let model = self.require_wallet(&db_tx, wallet_id, user_id).await?;

            let mut active: wallets::ActiveModel = model.into();
            if let Some(description) = description {
                active.description =
                    ActiveValue::Set(normalize_required_text(description, "wallet")?);
            }
            if let Some(balance) = balance {
                active.balance = ActiveValue::Set(ensure_finite(balance, "balance")?);
            }
            active.updated_at = ActiveValue::Set(Utc::now());

            Wallet::from(active.update(&db_tx).await?)
        })
    }

    /// Delete a wallet no movement points at.
    pub async fn delete_wallet(&self, wallet_id: Uuid, user_id: &str) -> ResultEngine<()> {
        with_tx!(self, "error to delete wallet", |db_tx| {
            self.require_wallet(&db_tx, wallet_id, user_id).await?;

            let used_by = movements::Entity::find()
                .filter(movements::Column::WalletId.eq(wallet_id))
                .count(&db_tx)
                .await?;
            if used_by > 0 {
                return Err(EngineError::InUse(format!(
                    "wallet {wallet_id} ({used_by} movements)"
                )));
            }

            wallets::Entity::delete_by_id(wallet_id).exec(&db_tx).await?;
        })
    }
}
