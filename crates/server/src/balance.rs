use api_types::{
    PeriodQuery,
    balance::{Balance, PeriodView},
};
use axum::{
    Extension, Json,
    extract::{Query, State},
};
use chrono::NaiveDate;

use crate::{
    ServerError,
    movements::{engine_status, parse_period},
    server::ServerState,
    user::CurrentUser,
};

/// Income and expense of the period, optionally only `?status=paid|planned`.
pub async fn period(
    Extension(user): Extension<CurrentUser>,
    State(state): State<ServerState>,
    Query(query): Query<PeriodQuery>,
) -> Result<Json<Balance>, ServerError> {
    let period = parse_period(&query)?;
    let balance = state
        .engine
        .balance(&period, query.status.map(engine_status), &user.username)
        .await?;

    Ok(Json(Balance {
        period: PeriodView {
            from: (balance.period.from != NaiveDate::MIN).then_some(balance.period.from),
            to: balance.period.to,
        },
        income: balance.income,
        expense: balance.expense,
    }))
}
