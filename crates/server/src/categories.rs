//! Categories API endpoints.

use api_types::category::{CategoryNew, CategoryUpdate, CategoryView};
use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use uuid::Uuid;

use crate::{ServerError, server::ServerState, sub_categories::map_sub_category, user::CurrentUser};

fn map_category(category: engine::Category) -> CategoryView {
    CategoryView {
        id: category.id,
        description: category.description,
        user_id: category.user_id,
        sub_categories: category
            .sub_categories
            .into_iter()
            .map(map_sub_category)
            .collect(),
        created_at: category.created_at,
        updated_at: category.updated_at,
    }
}

/// The caller's categories plus the shared defaults, each with its
/// sub-categories.
pub async fn list(
    Extension(user): Extension<CurrentUser>,
    State(state): State<ServerState>,
) -> Result<Json<Vec<CategoryView>>, ServerError> {
    let categories = state
        .engine
        .categories(&user.username)
        .await?
        .into_iter()
        .map(map_category)
        .collect();
    Ok(Json(categories))
}

pub async fn get(
    Extension(user): Extension<CurrentUser>,
    State(state): State<ServerState>,
    Path(category_id): Path<Uuid>,
) -> Result<Json<CategoryView>, ServerError> {
    let category = state.engine.category(category_id, &user.username).await?;
    Ok(Json(map_category(category)))
}

pub async fn create(
    Extension(user): Extension<CurrentUser>,
    State(state): State<ServerState>,
    Json(payload): Json<CategoryNew>,
) -> Result<(StatusCode, Json<CategoryView>), ServerError> {
    let category = state
        .engine
        .add_category(&payload.description, &user.username)
        .await?;
    Ok((StatusCode::CREATED, Json(map_category(category))))
}

pub async fn update(
    Extension(user): Extension<CurrentUser>,
    State(state): State<ServerState>,
    Path(category_id): Path<Uuid>,
    Json(payload): Json<CategoryUpdate>,
) -> Result<Json<CategoryView>, ServerError> {
    let Some(description) = payload.description.as_deref() else {
        return Err(ServerError::Generic("provide a description".to_string()));
    };

    let category = state
        .engine
        .update_category(category_id, Some(description), &user.username)
        .await?;
    Ok(Json(map_category(category)))
}

pub async fn delete(
    Extension(user): Extension<CurrentUser>,
    State(state): State<ServerState>,
    Path(category_id): Path<Uuid>,
) -> Result<StatusCode, ServerError> {
    state
        .engine
        .delete_category(category_id, &user.username)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
