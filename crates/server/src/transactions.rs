//! Transaction group endpoints: an estimate with its realized movements.

use api_types::{
    PeriodQuery,
    transaction::{Consolidation, TransactionNew, TransactionView},
};
use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use uuid::Uuid;

use crate::{
    ServerError,
    movements::{engine_movement, map_movement, parse_period},
    server::ServerState,
    user::CurrentUser,
};

fn map_transaction(view: engine::TransactionView) -> TransactionView {
    TransactionView {
        estimate: view.estimate.map(map_movement),
        movements: view.movements.into_iter().map(map_movement).collect(),
        consolidation: Consolidation {
            estimated: view.consolidation.estimated,
            realized: view.consolidation.realized,
            remaining: view.consolidation.remaining,
        },
    }
}

pub async fn create(
    Extension(user): Extension<CurrentUser>,
    State(state): State<ServerState>,
    Json(payload): Json<TransactionNew>,
) -> Result<(StatusCode, Json<TransactionView>), ServerError> {
    let new = engine::TransactionNew {
        estimate: engine_movement(payload.estimate),
        realized: payload.realized.into_iter().map(engine_movement).collect(),
    };
    let view = state.engine.add_consistent(new, &user.username).await?;
    Ok((StatusCode::CREATED, Json(map_transaction(view))))
}

pub async fn get(
    Extension(user): Extension<CurrentUser>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<Json<TransactionView>, ServerError> {
    let view = state.engine.transaction(id, &user.username).await?;
    Ok(Json(map_transaction(view)))
}

pub async fn period(
    Extension(user): Extension<CurrentUser>,
    State(state): State<ServerState>,
    Query(query): Query<PeriodQuery>,
) -> Result<Json<Vec<TransactionView>>, ServerError> {
    let period = parse_period(&query)?;
    let views = state
        .engine
        .transactions_in_period(&period, &user.username)
        .await?
        .into_iter()
        .map(map_transaction)
        .collect();
    Ok(Json(views))
}
