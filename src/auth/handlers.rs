use axum::{extract::State, routing::post, Json, Router};
use tracing::instrument;

use crate::auth::service::AuthResponse;
use crate::auth::validate::{LoginInput, RegisterInput};
use crate::errors::AuthError;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
}

// Transport only; every rule lives in the service.
#[instrument(skip(state, payload))]
async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterInput>,
) -> Result<Json<AuthResponse>, AuthError> {
    let response = state.auth.register(payload).await?;
    Ok(Json(response))
}

#[instrument(skip(state, payload))]
async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginInput>,
) -> Result<Json<AuthResponse>, AuthError> {
    let response = state.auth.login(payload).await?;
    Ok(Json(response))
}
