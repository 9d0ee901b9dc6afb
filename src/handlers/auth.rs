// src/handlers/auth.rs

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    response::IntoResponse,
};
use validator::Validate;

use crate::{
    config::Config,
    error::AppError,
    models::admin::{LoginRequest, LoginResponse},
    store::QuizStore,
    utils::{hash::verify_password, jwt::sign_jwt},
};

/// Authenticates an admin and returns a signed credential.
///
/// Unknown usernames and wrong passwords get the same answer so that the
/// endpoint does not reveal which accounts exist.
pub async fn login(
    State(store): State<QuizStore>,
    State(config): State<Config>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(payload) = payload?;

    if payload.username.is_empty() || payload.password.is_empty() {
        return Err(AppError::BadRequest(
            "Username and password are required".to_string(),
        ));
    }
    if payload.validate().is_err() {
        return Err(AppError::BadRequest(
            "Username or password is too long".to_string(),
        ));
    }

    let admin = store
        .find_admin(&payload.username)
        .await?
        .ok_or(AppError::AuthError("Invalid credentials".to_string()))?;

    if !verify_password(&payload.password, &admin.password_hash)? {
        tracing::warn!("Failed admin login for {}", admin.username);
        return Err(AppError::AuthError("Invalid credentials".to_string()));
    }

    store.record_login(admin.id).await?;

    let token = sign_jwt(
        admin.id,
        &admin.username,
        &config.jwt_secret,
        config.jwt_expiration,
    )?;

    tracing::info!("Admin {} logged in", admin.username);

    Ok(Json(LoginResponse {
        success: true,
        token,
        username: admin.username,
        expires_in: config.jwt_expiration,
    }))
}
