//! Kitchen API Handlers
//!
//! KDS 上线时先拉快照，之后靠 /ws/kds 的增量推送。

use axum::{
    Json,
    extract::{Path, State},
};
use futures::future::FutureExt;
use serde_json::json;
use shared::models::KitchenTicket;

use crate::core::ServerState;
use crate::db::repository::order;
use crate::realtime::Channel;
use crate::tenant::TenantContext;
use crate::utils::error::ok;
use crate::utils::{AppError, AppResponse, AppResult};

/// GET /api/pos/kitchen/queue - 待制作明细快照
pub async fn queue(
    State(state): State<ServerState>,
    tenant: TenantContext,
) -> AppResult<Json<AppResponse<Vec<KitchenTicket>>>> {
    let tickets = state
        .gateway
        .with_tenant(tenant.restaurant_id, |conn| {
            async move { Ok(order::kitchen_queue(conn).await?) }.boxed()
        })
        .await?;
    Ok(ok(tickets))
}

/// POST /api/pos/kitchen/items/{id}/ready - 明细出餐 (pending -> ready)
pub async fn item_ready(
    State(state): State<ServerState>,
    tenant: TenantContext,
    Path(id): Path<i64>,
) -> AppResult<Json<AppResponse<bool>>> {
    let restaurant_id = tenant.restaurant_id;
    let order_id = state
        .gateway
        .with_tenant(restaurant_id, move |conn| {
            async move {
                order::mark_item_ready(conn, id).await?.ok_or_else(|| {
                    AppError::state_conflict(format!("Item {id} is not pending"))
                })
            }
            .boxed()
        })
        .await?;

    state.fanout.push(
        Channel::Waiter,
        restaurant_id,
        "item_ready",
        json!({"order_id": order_id, "item_id": id}),
    );

    Ok(ok(true))
}
