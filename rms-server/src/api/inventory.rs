//! Inventory API Handlers
//!
//! 库存查询与进货单。收货把单据翻成 received 并按明细加回库存，
//! 两步在同一个事务里。

use axum::{
    Json,
    extract::{Path, State},
};
use futures::future::FutureExt;
use shared::models::{PurchaseOrder, PurchaseOrderCreate, StockLevel};
use shared::util::now_millis;
use validator::Validate;

use crate::core::ServerState;
use crate::db::repository::inventory;
use crate::tenant::TenantContext;
use crate::utils::error::ok;
use crate::utils::{AppError, AppResponse, AppResult};

/// GET /api/inventory/stock - 当前库存水位
pub async fn stock(
    State(state): State<ServerState>,
    tenant: TenantContext,
) -> AppResult<Json<AppResponse<Vec<StockLevel>>>> {
    let levels = state
        .gateway
        .with_tenant(tenant.restaurant_id, |conn| {
            async move { Ok(inventory::stock_levels(conn).await?) }.boxed()
        })
        .await?;
    Ok(ok(levels))
}

/// GET /api/inventory/purchase-orders - 进货单列表
pub async fn list_purchase_orders(
    State(state): State<ServerState>,
    tenant: TenantContext,
) -> AppResult<Json<AppResponse<Vec<PurchaseOrder>>>> {
    let orders = state
        .gateway
        .with_tenant(tenant.restaurant_id, |conn| {
            async move { Ok(inventory::list_purchase_orders(conn).await?) }.boxed()
        })
        .await?;
    Ok(ok(orders))
}

/// POST /api/inventory/purchase-orders - 开进货单 (pending)
pub async fn create_purchase_order(
    State(state): State<ServerState>,
    tenant: TenantContext,
    Json(payload): Json<PurchaseOrderCreate>,
) -> AppResult<Json<AppResponse<i64>>> {
    payload.validate()?;

    let po_id = state
        .gateway
        .with_tenant(tenant.restaurant_id, move |conn| {
            async move { Ok(inventory::create_purchase_order(conn, &payload, now_millis()).await?) }
                .boxed()
        })
        .await?;

    tracing::info!(restaurant_id = tenant.restaurant_id, po_id, "purchase order created");
    Ok(ok(po_id))
}

/// POST /api/inventory/purchase-orders/{id}/receive - 收货入库
pub async fn receive_purchase_order(
    State(state): State<ServerState>,
    tenant: TenantContext,
    Path(id): Path<i64>,
) -> AppResult<Json<AppResponse<bool>>> {
    state
        .gateway
        .with_tenant(tenant.restaurant_id, move |conn| {
            async move {
                if inventory::mark_received(conn, id).await? == 0 {
                    return Err(AppError::state_conflict(format!(
                        "Purchase order {id} is not pending"
                    )));
                }
                for (raw_material_id, quantity) in
                    inventory::purchase_order_lines(conn, id).await?
                {
                    inventory::credit_stock(conn, raw_material_id, quantity).await?;
                }
                Ok(())
            }
            .boxed()
        })
        .await?;

    tracing::info!(restaurant_id = tenant.restaurant_id, po_id = id, "purchase order received");
    Ok(ok(true))
}
