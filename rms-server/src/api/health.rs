//! Health Check Handler

use axum::{Json, extract::State};
use serde_json::{Value, json};

use crate::core::ServerState;
use crate::utils::error::ok;
use crate::utils::{AppResponse, AppResult};

/// GET /api/health
pub async fn check(State(state): State<ServerState>) -> AppResult<Json<AppResponse<Value>>> {
    // A cheap pool round-trip so "ok" actually means the database answers
    sqlx::query("SELECT 1").execute(&state.db.pool).await?;
    Ok(ok(json!({
        "status": "ok",
        "environment": state.config.environment,
    })))
}
