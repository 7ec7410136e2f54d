//! Auth API Handlers
//!
//! 登录在租户上下文存在之前发生：员工是系统级行，按全局唯一的用户名
//! 直查。签发的令牌携带 restaurant_id，之后的请求以它为租户来源。

use argon2::password_hash::PasswordHash;
use argon2::{Argon2, PasswordVerifier};
use axum::{Json, extract::State};
use shared::models::{LoginRequest, LoginResponse};
use validator::Validate;

use crate::core::ServerState;
use crate::db::repository::staff;
use crate::utils::error::ok;
use crate::utils::{AppError, AppResponse, AppResult};

/// POST /api/auth/login
pub async fn login(
    State(state): State<ServerState>,
    Json(payload): Json<LoginRequest>,
) -> AppResult<Json<AppResponse<LoginResponse>>> {
    payload.validate()?;

    // Same error for unknown user and wrong password
    let account = staff::find_by_username(&state.db.pool, &payload.username)
        .await
        .map_err(AppError::from)?
        .ok_or_else(AppError::invalid_credentials)?;

    let parsed = PasswordHash::new(&account.password_hash)
        .map_err(|e| AppError::internal(format!("Corrupt password hash: {e}")))?;
    Argon2::default()
        .verify_password(payload.password.as_bytes(), &parsed)
        .map_err(|_| AppError::invalid_credentials())?;

    let token = state
        .jwt
        .generate_token(
            account.id,
            &account.username,
            &account.role,
            account.restaurant_id,
        )
        .map_err(|e| AppError::internal(format!("Token generation failed: {e}")))?;

    tracing::info!(
        username = %account.username,
        restaurant_id = account.restaurant_id,
        role = %account.role,
        "staff logged in"
    );

    Ok(ok(LoginResponse {
        token,
        restaurant_id: account.restaurant_id,
        role: account.role,
        display_name: account.display_name,
    }))
}
