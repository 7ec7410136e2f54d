//! Dining Table API Handlers
//!
//! 预订走 vacant <-> reserved 的独立支线；occupied/billed 由订单生命
//! 周期驱动，不开放手工接口。

use axum::{
    Json,
    extract::{Path, State},
};
use futures::future::FutureExt;
use serde_json::json;
use shared::models::{DiningTable, TableStatus};

use crate::core::ServerState;
use crate::db::repository::dining_table;
use crate::tenant::TenantContext;
use crate::utils::error::ok;
use crate::utils::{AppError, AppResponse, AppResult};

/// GET /api/pos/tables - 当前门店全部桌台
pub async fn list(
    State(state): State<ServerState>,
    tenant: TenantContext,
) -> AppResult<Json<AppResponse<Vec<DiningTable>>>> {
    let tables = state
        .gateway
        .with_tenant(tenant.restaurant_id, |conn| {
            async move { Ok(dining_table::list(conn).await?) }.boxed()
        })
        .await?;
    Ok(ok(tables))
}

/// POST /api/pos/tables/{id}/reserve - vacant -> reserved
pub async fn reserve(
    State(state): State<ServerState>,
    tenant: TenantContext,
    Path(id): Path<i64>,
) -> AppResult<Json<AppResponse<bool>>> {
    transition(state, tenant.restaurant_id, id, TableStatus::Vacant, TableStatus::Reserved).await
}

/// POST /api/pos/tables/{id}/release - reserved -> vacant
pub async fn release(
    State(state): State<ServerState>,
    tenant: TenantContext,
    Path(id): Path<i64>,
) -> AppResult<Json<AppResponse<bool>>> {
    transition(state, tenant.restaurant_id, id, TableStatus::Reserved, TableStatus::Vacant).await
}

async fn transition(
    state: ServerState,
    restaurant_id: i64,
    table_id: i64,
    from: TableStatus,
    to: TableStatus,
) -> AppResult<Json<AppResponse<bool>>> {
    state
        .gateway
        .with_tenant(restaurant_id, move |conn| {
            async move {
                let moved = dining_table::transition(conn, table_id, from, to).await?;
                if !moved {
                    let known = dining_table::find_by_id(conn, table_id).await?;
                    return match known {
                        Some(table) => Err(AppError::state_conflict(format!(
                            "Table {} is {}, not {}",
                            table.name, table.status, from
                        ))),
                        None => Err(AppError::not_found(format!("Table {table_id} not found"))),
                    };
                }
                Ok(())
            }
            .boxed()
        })
        .await?;

    state
        .fanout
        .broadcast_table_update(restaurant_id, json!({"table_id": table_id, "status": to}));

    Ok(ok(true))
}
