// src/handlers/auth.rs

use axum::{Json, Router, extract::State, routing::get, routing::post};
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::auth::AuthenticatedUser,
    models::auth::{AccessToken, LoginPayload, RefreshPayload, TokenPair, User},
};

pub fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/token", post(token))
        .route("/token/refresh", post(token_refresh))
}

pub fn protected_routes() -> Router<AppState> {
    Router::new().route("/me", get(me))
}

async fn token(
    State(state): State<AppState>,
    Json(payload): Json<LoginPayload>,
) -> Result<Json<TokenPair>, AppError> {
    payload.validate()?;
    let pair = state
        .auth_service
        .login(&payload.email, &payload.password)
        .await?;
    Ok(Json(pair))
}

async fn token_refresh(
    State(state): State<AppState>,
    Json(payload): Json<RefreshPayload>,
) -> Result<Json<AccessToken>, AppError> {
    payload.validate()?;
    let access = state.auth_service.refresh(&payload.refresh).await?;
    Ok(Json(AccessToken { access }))
}

async fn me(AuthenticatedUser(user): AuthenticatedUser) -> Json<User> {
    Json(user)
}
