//! Wallets API endpoints.

use api_types::wallet::{WalletNew, WalletUpdate, WalletView};
use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use uuid::Uuid;

use crate::{ServerError, server::ServerState, user::CurrentUser};

fn map_wallet(wallet: engine::Wallet) -> WalletView {
    WalletView {
        id: wallet.id,
        description: wallet.description,
        balance: wallet.balance,
        user_id: wallet.user_id,
        created_at: wallet.created_at,
        updated_at: wallet.updated_at,
    }
}

pub async fn list(
    Extension(user): Extension<CurrentUser>,
    State(state): State<ServerState>,
) -> Result<Json<Vec<WalletView>>, ServerError> {
    let wallets = state
        .engine
        .wallets(&user.username)
        .await?
        .into_iter()
        .map(map_wallet)
        .collect();
    Ok(Json(wallets))
}

pub async fn get(
    Extension(user): Extension<CurrentUser>,
    State(state): State<ServerState>,
    Path(wallet_id): Path<Uuid>,
) -> Result<Json<WalletView>, ServerError> {
    let wallet = state.engine.wallet(wallet_id, &user.username).await?;
    Ok(Json(map_wallet(wallet)))
}

pub async fn create(
    Extension(user): Extension<CurrentUser>,
    State(state): State<ServerState>,
    Json(payload): Json<WalletNew>,
) -> Result<(StatusCode, Json<WalletView>), ServerError> {
    let wallet = state
        .engine
        .add_wallet(&payload.description, payload.balance, &user.username)
        .await?;
    Ok((StatusCode::CREATED, Json(map_wallet(wallet))))
}

pub async fn update(
    Extension(user): Extension<CurrentUser>,
    State(state): State<ServerState>,
    Path(wallet_id): Path<Uuid>,
    Json(payload): Json<WalletUpdate>,
) -> Result<Json<WalletView>, ServerError> {
    if payload.description.is_none() && payload.balance.is_none() {
        return Err(ServerError::Generic(
            "provide at least one of description or balance".to_string(),
        ));
    }

    let wallet = state
        .engine
        .update_wallet(
            wallet_id,
            payload.description.as_deref(),
            payload.balance,
            &user.username,
        )
        .await?;
    Ok(Json(map_wallet(wallet)))
}

pub async fn delete(
    Extension(user): Extension<CurrentUser>,
    State(state): State<ServerState>,
    Path(wallet_id): Path<Uuid>,
) -> Result<StatusCode, ServerError> {
    state.engine.delete_wallet(wallet_id, &user.username).await?;
    Ok(StatusCode::NO_CONTENT)
}
