//! Type payment API endpoints.

use api_types::type_payment::{TypePaymentNew, TypePaymentUpdate, TypePaymentView};
use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use uuid::Uuid;

use crate::{ServerError, server::ServerState, user::CurrentUser};

fn map_type_payment(type_payment: engine::TypePayment) -> TypePaymentView {
    TypePaymentView {
        id: type_payment.id,
        description: type_payment.description,
        user_id: type_payment.user_id,
        created_at: type_payment.created_at,
        updated_at: type_payment.updated_at,
    }
}

pub async fn list(
    Extension(user): Extension<CurrentUser>,
    State(state): State<ServerState>,
) -> Result<Json<Vec<TypePaymentView>>, ServerError> {
    let type_payments = state
        .engine
        .type_payments(&user.username)
        .await?
        .into_iter()
        .map(map_type_payment)
        .collect();
    Ok(Json(type_payments))
}

pub async fn get(
    Extension(user): Extension<CurrentUser>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<Json<TypePaymentView>, ServerError> {
    let type_payment = state.engine.type_payment(id, &user.username).await?;
    Ok(Json(map_type_payment(type_payment)))
}

pub async fn create(
    Extension(user): Extension<CurrentUser>,
    State(state): State<ServerState>,
    Json(payload): Json<TypePaymentNew>,
) -> Result<(StatusCode, Json<TypePaymentView>), ServerError> {
    let type_payment = state
        .engine
        .add_type_payment(&payload.description, &user.username)
        .await?;
    Ok((StatusCode::CREATED, Json(map_type_payment(type_payment))))
}

pub async fn update(
    Extension(user): Extension<CurrentUser>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<TypePaymentUpdate>,
) -> Result<Json<TypePaymentView>, ServerError> {
    let Some(description) = payload.description.as_deref() else {
        return Err(ServerError::Generic("provide a description".to_string()));
    };

    let type_payment = state
        .engine
        .update_type_payment(id, Some(description), &user.username)
        .await?;
    Ok(Json(map_type_payment(type_payment)))
}

pub async fn delete(
    Extension(user): Extension<CurrentUser>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ServerError> {
    state.engine.delete_type_payment(id, &user.username).await?;
    Ok(StatusCode::NO_CONTENT)
}
