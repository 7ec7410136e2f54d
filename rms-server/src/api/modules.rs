//! Module Config API Handlers

use axum::{Json, extract::State};
use futures::future::FutureExt;
use shared::models::ModuleFlag;

use crate::core::ServerState;
use crate::db::repository::module_config;
use crate::tenant::TenantContext;
use crate::utils::error::ok;
use crate::utils::{AppResponse, AppResult};

/// GET /api/modules - 当前门店的模块开关
pub async fn list(
    State(state): State<ServerState>,
    tenant: TenantContext,
) -> AppResult<Json<AppResponse<Vec<ModuleFlag>>>> {
    let flags = state
        .gateway
        .with_tenant(tenant.restaurant_id, |conn| {
            async move { Ok(module_config::list(conn).await?) }.boxed()
        })
        .await?;
    Ok(ok(flags))
}
