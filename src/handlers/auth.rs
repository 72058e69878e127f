// src/handlers/auth.rs

use std::sync::Arc;

use axum::{Json, extract::State, response::IntoResponse};
use validator::Validate;

use crate::{
    config::Config,
    error::AppError,
    models::{
        new_id, now,
        user::{AuthResponse, CreateUserRequest, LoginRequest, PublicUser, User},
    },
    repository::Store,
    utils::{
        hash::{hash_password, verify_password},
        jwt::sign_jwt,
    },
};

/// Registers a new user.
///
/// Hashes the password using Argon2 before storing it.
/// Returns a token together with the public user fields.
pub async fn register(
    State(store): State<Arc<dyn Store>>,
    State(config): State<Config>,
    Json(payload): Json<CreateUserRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    if store.find_user_by_username(&payload.username).await?.is_some() {
        return Err(AppError::Conflict(format!(
            "Username '{}' already exists",
            payload.username
        )));
    }

    let user = User {
        id: new_id(),
        username: payload.username,
        email: payload.email,
        password_hash: hash_password(&payload.password)?,
        created_at: now(),
    };

    store.insert_user(&user).await?;
    tracing::info!(user_id = %user.id, "User registered");

    let token = sign_jwt(&user.id, &config.jwt_secret, config.jwt_expiration)?;

    Ok(Json(AuthResponse {
        token,
        user: PublicUser::from(&user),
    }))
}

/// Authenticates a user and returns a fresh token.
///
/// Unknown usernames and wrong passwords are indistinguishable to the caller.
pub async fn login(
    State(store): State<Arc<dyn Store>>,
    State(config): State<Config>,
    Json(payload): Json<LoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    let invalid = || AppError::AuthError("Invalid credentials".to_string());

    let user = store
        .find_user_by_username(&payload.username)
        .await?
        .ok_or_else(invalid)?;

    if !verify_password(&payload.password, &user.password_hash)? {
        return Err(invalid());
    }

    let token = sign_jwt(&user.id, &config.jwt_secret, config.jwt_expiration)?;

    Ok(Json(AuthResponse {
        token,
        user: PublicUser::from(&user),
    }))
}
