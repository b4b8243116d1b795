use api_types::import::ImportSummary;
use axum::{Extension, Json, extract::State, http::StatusCode};

use crate::{ServerError, server::ServerState, user::CurrentUser};

/// Import a uPlanner export sent as the raw request body.
pub async fn uplanner(
    Extension(user): Extension<CurrentUser>,
    State(state): State<ServerState>,
    body: String,
) -> Result<(StatusCode, Json<ImportSummary>), ServerError> {
    let summary = state.engine.import_uplanner(&body, &user.username).await?;
    Ok((
        StatusCode::CREATED,
        Json(ImportSummary {
            imported: summary.imported,
            paid: summary.paid,
            planned: summary.planned,
        }),
    ))
}
