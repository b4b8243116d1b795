//! Caller identity and session login/logout.

use api_types::session::{Login, LoginResponse};
use axum::{Extension, Json, extract::State, http::StatusCode};
use engine::users;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};
use uuid::Uuid;

use crate::{ServerError, server::ServerState};

/// Identity resolved by the auth middleware.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CurrentUser {
    pub username: String,
    /// Set when the request was authenticated through a session token.
    pub token: Option<Uuid>,
}

/// Look up a user by its credentials.
pub(crate) async fn find_user(
    db: &DatabaseConnection,
    username: &str,
    password: &str,
) -> Result<Option<users::Model>, sea_orm::DbErr> {
    if username.is_empty() || password.is_empty() {
        return Ok(None);
    }

    users::Entity::find()
        .filter(users::Column::Username.eq(username))
        .filter(users::Column::Password.eq(password))
        .one(db)
        .await
}

pub async fn login(
    State(state): State<ServerState>,
    Json(payload): Json<Login>,
) -> Result<Json<LoginResponse>, StatusCode> {
    let user = find_user(&state.db, &payload.username, &payload.password)
        .await
        .map_err(|err| {
            tracing::error!("login lookup failed: {err}");
            StatusCode::INTERNAL_SERVER_ERROR
        })?;

    let Some(user) = user else {
        tracing::warn!("rejected login for '{}'", payload.username);
        return Err(StatusCode::UNAUTHORIZED);
    };

    let purged = state.sessions.purge_expired().await;
    if purged > 0 {
        tracing::debug!("purged {purged} expired sessions");
    }
    let (token, expires_at) = state.sessions.open(&user.username).await;
    tracing::info!("{} logged in", user.username);

    Ok(Json(LoginResponse { token: token.to_string(), expires_at }))
}

pub async fn logout(
    Extension(user): Extension<CurrentUser>,
    State(state): State<ServerState>,
) -> Result<StatusCode, ServerError> {
    let Some(token) = user.token else {
        return Err(ServerError::Generic(
            "logout requires a user_token header".to_string(),
        ));
    };

    state.sessions.revoke(token).await;
    tracing::info!("{} logged out", user.username);
    Ok(StatusCode::NO_CONTENT)
}
