//! Sub-categories API endpoints.

use api_types::category::{SubCategoryList, SubCategoryNew, SubCategoryUpdate, SubCategoryView};
use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use uuid::Uuid;

use crate::{ServerError, server::ServerState, user::CurrentUser};

pub(crate) fn map_sub_category(sub_category: engine::SubCategory) -> SubCategoryView {
    SubCategoryView {
        id: sub_category.id,
        description: sub_category.description,
        category_id: sub_category.category_id,
        user_id: sub_category.user_id,
        created_at: sub_category.created_at,
        updated_at: sub_category.updated_at,
    }
}

/// `?categoryId=` narrows the list to one parent.
pub async fn list(
    Extension(user): Extension<CurrentUser>,
    State(state): State<ServerState>,
    Query(query): Query<SubCategoryList>,
) -> Result<Json<Vec<SubCategoryView>>, ServerError> {
    let sub_categories = state
        .engine
        .sub_categories(query.category_id, &user.username)
        .await?
        .into_iter()
        .map(map_sub_category)
        .collect();
    Ok(Json(sub_categories))
}

pub async fn get(
    Extension(user): Extension<CurrentUser>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SubCategoryView>, ServerError> {
    let sub_category = state.engine.sub_category(id, &user.username).await?;
    Ok(Json(map_sub_category(sub_category)))
}

pub async fn create(
    Extension(user): Extension<CurrentUser>,
    State(state): State<ServerState>,
    Json(payload): Json<SubCategoryNew>,
) -> Result<(StatusCode, Json<SubCategoryView>), ServerError> {
    let sub_category = state
        .engine
        .add_sub_category(&payload.description, payload.category_id, &user.username)
        .await?;
    Ok((StatusCode::CREATED, Json(map_sub_category(sub_category))))
}

pub async fn update(
    Extension(user): Extension<CurrentUser>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<SubCategoryUpdate>,
) -> Result<Json<SubCategoryView>, ServerError> {
    if payload.description.is_none() && payload.category_id.is_none() {
        return Err(ServerError::Generic(
            "provide at least one of description or categoryId".to_string(),
        ));
    }

    let sub_category = state
        .engine
        .update_sub_category(
            id,
            payload.description.as_deref(),
            payload.category_id,
            &user.username,
        )
        .await?;
    Ok(Json(map_sub_category(sub_category)))
}

pub async fn delete(
    Extension(user): Extension<CurrentUser>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ServerError> {
    state.engine.delete_sub_category(id, &user.username).await?;
    Ok(StatusCode::NO_CONTENT)
}
