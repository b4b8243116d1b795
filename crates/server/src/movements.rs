//! Movements API endpoints.

use api_types::{
    PeriodQuery,
    movement::{MovementNew, MovementUpdate, MovementView},
};
use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use engine::Period;
use uuid::Uuid;

use crate::{ServerError, server::ServerState, user::CurrentUser};

pub(crate) fn map_status(status: engine::MovementStatus) -> api_types::MovementStatus {
    match status {
        engine::MovementStatus::Paid => api_types::MovementStatus::Paid,
        engine::MovementStatus::Planned => api_types::MovementStatus::Planned,
    }
}

pub(crate) fn engine_status(status: api_types::MovementStatus) -> engine::MovementStatus {
    match status {
        api_types::MovementStatus::Paid => engine::MovementStatus::Paid,
        api_types::MovementStatus::Planned => engine::MovementStatus::Planned,
    }
}

pub(crate) fn map_movement(movement: engine::Movement) -> MovementView {
    MovementView {
        id: movement.id,
        description: movement.description,
        amount: movement.amount,
        date: movement.date,
        wallet_id: movement.wallet_id,
        type_payment_id: movement.type_payment_id,
        category_id: movement.category_id,
        sub_category_id: movement.sub_category_id,
        status: map_status(movement.status),
        transaction_id: movement.transaction_id,
        user_id: movement.user_id,
        created_at: movement.created_at,
        updated_at: movement.updated_at,
    }
}

pub(crate) fn engine_movement(payload: MovementNew) -> engine::MovementNew {
    engine::MovementNew {
        description: payload.description,
        amount: payload.amount,
        date: payload.date,
        wallet_id: payload.wallet_id,
        type_payment_id: payload.type_payment_id,
        category_id: payload.category_id,
        sub_category_id: payload.sub_category_id,
        status: engine_status(payload.status),
        transaction_id: payload.transaction_id,
    }
}

pub(crate) fn parse_period(query: &PeriodQuery) -> Result<Period, ServerError> {
    Ok(Period::parse(query.from.as_deref(), query.to.as_deref())?)
}

pub async fn list(
    Extension(user): Extension<CurrentUser>,
    State(state): State<ServerState>,
) -> Result<Json<Vec<MovementView>>, ServerError> {
    let movements = state
        .engine
        .movements(&user.username)
        .await?
        .into_iter()
        .map(map_movement)
        .collect();
    Ok(Json(movements))
}

/// Movements dated inside `?from=&to=`, oldest first.
pub async fn period(
    Extension(user): Extension<CurrentUser>,
    State(state): State<ServerState>,
    Query(query): Query<PeriodQuery>,
) -> Result<Json<Vec<MovementView>>, ServerError> {
    let period = parse_period(&query)?;
    let movements = state
        .engine
        .movements_in_period(&period, &user.username)
        .await?
        .into_iter()
        .map(map_movement)
        .collect();
    Ok(Json(movements))
}

pub async fn get(
    Extension(user): Extension<CurrentUser>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<Json<MovementView>, ServerError> {
    let movement = state.engine.movement(id, &user.username).await?;
    Ok(Json(map_movement(movement)))
}

pub async fn create(
    Extension(user): Extension<CurrentUser>,
    State(state): State<ServerState>,
    Json(payload): Json<MovementNew>,
) -> Result<(StatusCode, Json<MovementView>), ServerError> {
    let movement = state
        .engine
        .add_movement(engine_movement(payload), &user.username)
        .await?;
    Ok((StatusCode::CREATED, Json(map_movement(movement))))
}

pub async fn update(
    Extension(user): Extension<CurrentUser>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<MovementUpdate>,
) -> Result<Json<MovementView>, ServerError> {
    let patch = engine::MovementPatch {
        description: payload.description,
        amount: payload.amount,
        date: payload.date,
        wallet_id: payload.wallet_id,
        type_payment_id: payload.type_payment_id,
        category_id: payload.category_id,
        sub_category_id: payload.sub_category_id,
        status: payload.status.map(engine_status),
        transaction_id: payload.transaction_id,
    };
    if patch.is_empty() {
        return Err(ServerError::Generic(
            "provide at least one field to update".to_string(),
        ));
    }

    let movement = state
        .engine
        .update_movement(id, patch, &user.username)
        .await?;
    Ok(Json(map_movement(movement)))
}

pub async fn delete(
    Extension(user): Extension<CurrentUser>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ServerError> {
    state.engine.delete_movement(id, &user.username).await?;
    Ok(StatusCode::NO_CONTENT)
}
