use axum::{
    Router,
    extract::{Request, State},
    http::{HeaderName, StatusCode},
    middleware::{self, Next},
    response::Response,
    routing::{get, post},
};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Basic},
};
use sea_orm::DatabaseConnection;
use uuid::Uuid;

use std::{net::SocketAddr, sync::Arc};

use crate::{
    SessionStore, balance, categories, import, movements, sub_categories, transactions,
    type_payments,
    user::{self, CurrentUser},
    wallets,
};
use engine::Engine;

static USER_TOKEN_HEADER: HeaderName = HeaderName::from_static("user_token");

#[derive(Clone)]
pub struct ServerState {
    pub engine: Arc<Engine>,
    pub db: DatabaseConnection,
    pub sessions: SessionStore,
}

/// Resolve the caller from a `user_token` session header, falling back to
/// Basic credentials checked against the `users` table.
async fn auth(
    basic: Option<TypedHeader<Authorization<Basic>>>,
    State(state): State<ServerState>,
    mut request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let token = request
        .headers()
        .get(&USER_TOKEN_HEADER)
        .map(|value| {
            value
                .to_str()
                .ok()
                .and_then(|value| Uuid::parse_str(value.trim()).ok())
                .ok_or(StatusCode::UNAUTHORIZED)
        })
        .transpose()?;

    let user = if let Some(token) = token {
        let Some(username) = state.sessions.resolve(token).await else {
            tracing::warn!("rejected unknown or expired session token");
            return Err(StatusCode::UNAUTHORIZED);
        };
        CurrentUser {
            username,
            token: Some(token),
        }
    } else {
        let Some(TypedHeader(basic)) = basic else {
            return Err(StatusCode::UNAUTHORIZED);
        };
        let found = user::find_user(&state.db, basic.username(), basic.password())
            .await
            .map_err(|err| {
                tracing::error!("auth lookup failed: {err}");
                StatusCode::UNAUTHORIZED
            })?;
        let Some(found) = found else {
            tracing::warn!("rejected credentials for '{}'", basic.username());
            return Err(StatusCode::UNAUTHORIZED);
        };
        CurrentUser {
            username: found.username,
            token: None,
        }
    };

    tracing::debug!("{} {} as {}", request.method(), request.uri(), user.username);
    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}

fn router(state: ServerState) -> Router {
    Router::new()
        .route("/wallets", get(wallets::list).post(wallets::create))
        .route(
            "/wallets/{id}",
            get(wallets::get)
                .put(wallets::update)
                .delete(wallets::delete),
        )
        .route("/categories", get(categories::list).post(categories::create))
        .route(
            "/categories/{id}",
            get(categories::get)
                .put(categories::update)
                .delete(categories::delete),
        )
        .route(
            "/subcategories",
            get(sub_categories::list).post(sub_categories::create),
        )
        .route(
            "/subcategories/{id}",
            get(sub_categories::get)
                .put(sub_categories::update)
                .delete(sub_categories::delete),
        )
        .route(
            "/typePayments",
            get(type_payments::list).post(type_payments::create),
        )
        .route(
            "/typePayments/{id}",
            get(type_payments::get)
                .put(type_payments::update)
                .delete(type_payments::delete),
        )
        .route("/movements", get(movements::list).post(movements::create))
        .route("/movements/period", get(movements::period))
        .route(
            "/movements/{id}",
            get(movements::get)
                .put(movements::update)
                .delete(movements::delete),
        )
        .route("/transactions", post(transactions::create))
        .route("/transactions/period", get(transactions::period))
        .route("/transactions/{id}", get(transactions::get))
        .route("/balance/estimate/period", get(balance::period))
        .route("/import/uplanner", post(import::uplanner))
        .route("/logout", post(user::logout))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth))
        .route("/login", post(user::login))
        .with_state(state)
}

/// Build the full application router.
pub fn app(engine: Engine, db: DatabaseConnection, sessions: SessionStore) -> Router {
    router(ServerState {
        engine: Arc::new(engine),
        db,
        sessions,
    })
}

pub async fn run(
    engine: Engine,
    db: DatabaseConnection,
    sessions: SessionStore,
    addr: SocketAddr,
) {
    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(err) => {
            tracing::error!("failed to bind server listener on {addr}: {err}");
            return;
        }
    };
    if let Err(err) = run_with_listener(engine, db, sessions, listener).await {
        tracing::error!("server failed: {err}");
    }
}

pub async fn run_with_listener(
    engine: Engine,
    db: DatabaseConnection,
    sessions: SessionStore,
    listener: tokio::net::TcpListener,
) -> Result<(), std::io::Error> {
    let addr = listener.local_addr()?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app(engine, db, sessions)).await
}

pub fn spawn_with_listener(
    engine: Engine,
    db: DatabaseConnection,
    sessions: SessionStore,
    listener: tokio::net::TcpListener,
) -> Result<SocketAddr, std::io::Error> {
    let addr = listener.local_addr()?;

    tokio::spawn(async move {
        if let Err(err) = run_with_listener(engine, db, sessions, listener).await {
            tracing::error!("server failed: {err}");
        }
    });

    Ok(addr)
}
