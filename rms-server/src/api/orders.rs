//! Order API Handlers
//!
//! 下单是整个平台的关键路径：堂食订单先抢桌台 (vacant -> occupied 的
//! 条件更新)，抢输直接 409，然后在同一个事务里落订单和明细。事件在
//! 事务提交之后才发布。

use axum::{
    Json,
    extract::{Path, State},
};
use futures::future::FutureExt;
use serde_json::json;
use shared::event::{DomainEvent, OrderCreatedPayload, OrderLine, OrderRef};
use shared::models::{OrderCreate, OrderDetail, OrderStatus, OrderStatusUpdate, TableStatus};
use shared::types::OrderType;
use shared::util::now_millis;
use validator::Validate;

use crate::core::ServerState;
use crate::db::repository::{dining_table, order};
use crate::realtime::Channel;
use crate::tenant::TenantContext;
use crate::utils::error::ok;
use crate::utils::{AppError, AppResponse, AppResult};

/// GET /api/pos/orders - 当前门店全部订单
pub async fn list(
    State(state): State<ServerState>,
    tenant: TenantContext,
) -> AppResult<Json<AppResponse<Vec<shared::models::Order>>>> {
    let orders = state
        .gateway
        .with_tenant(tenant.restaurant_id, |conn| {
            async move { Ok(order::list(conn).await?) }.boxed()
        })
        .await?;
    Ok(ok(orders))
}

/// GET /api/pos/orders/{id} - 订单详情
pub async fn detail(
    State(state): State<ServerState>,
    tenant: TenantContext,
    Path(id): Path<i64>,
) -> AppResult<Json<AppResponse<OrderDetail>>> {
    let detail = state
        .gateway
        .with_tenant(tenant.restaurant_id, move |conn| {
            async move { Ok(order::find_detail(conn, id).await?) }.boxed()
        })
        .await?
        .ok_or_else(|| AppError::not_found(format!("Order {id} not found")))?;
    Ok(ok(detail))
}

/// POST /api/pos/orders (同 /api/public/orders) - 创建订单
pub async fn create(
    State(state): State<ServerState>,
    tenant: TenantContext,
    Json(payload): Json<OrderCreate>,
) -> AppResult<Json<AppResponse<OrderDetail>>> {
    payload.validate()?;

    if payload.order_type == OrderType::DineIn && payload.table_id.is_none() {
        return Err(AppError::validation("Dine-in order requires a table"));
    }

    let restaurant_id = tenant.restaurant_id;
    let data = payload;
    let detail = state
        .gateway
        .with_tenant(restaurant_id, move |conn| {
            async move {
                // Seat the table before inserting anything. The conditional
                // update is the race arbiter: of two concurrent orders for
                // the same table exactly one sees a row change.
                if data.order_type == OrderType::DineIn {
                    let table_id = data.table_id.unwrap_or_default();
                    let seated = dining_table::transition(
                        conn,
                        table_id,
                        TableStatus::Vacant,
                        TableStatus::Occupied,
                    )
                    .await?;
                    if !seated {
                        let known = dining_table::find_by_id(conn, table_id).await?;
                        return match known {
                            Some(table) => Err(AppError::state_conflict(format!(
                                "Table {} is {}, not vacant",
                                table.name, table.status
                            ))),
                            None => {
                                Err(AppError::not_found(format!("Table {table_id} not found")))
                            }
                        };
                    }
                }

                let (order_id, _total) = order::create(conn, &data, now_millis()).await?;
                let detail = order::find_detail(conn, order_id).await?.ok_or_else(|| {
                    AppError::internal("order vanished inside its own transaction")
                })?;
                Ok(detail)
            }
            .boxed()
        })
        .await?;

    state.bus.publish(DomainEvent::OrderCreated(OrderCreatedPayload {
        restaurant_id,
        order_id: detail.order.id,
        table_id: detail.order.table_id,
        order_type: detail.order.order_type,
        customer_name: detail.order.customer_name.clone(),
        items: detail
            .items
            .iter()
            .map(|i| OrderLine {
                menu_item_id: i.menu_item_id,
                quantity: i.quantity,
                price: i.price,
            })
            .collect(),
        total: detail.order.total,
    }));

    tracing::info!(
        restaurant_id,
        order_id = detail.order.id,
        total = detail.order.total,
        "order created"
    );

    Ok(ok(detail))
}

/// PUT /api/pos/orders/{id}/status - 订单状态流转
pub async fn update_status(
    State(state): State<ServerState>,
    tenant: TenantContext,
    Path(id): Path<i64>,
    Json(payload): Json<OrderStatusUpdate>,
) -> AppResult<Json<AppResponse<OrderDetail>>> {
    let restaurant_id = tenant.restaurant_id;
    let next = payload.status;

    let detail = state
        .gateway
        .with_tenant(restaurant_id, move |conn| {
            async move {
                // Conditional update first, like order creation: the loser
                // of a same-order race sees 0 rows here instead of a busy
                // snapshot upgrade after a read. The re-read only names the
                // actual status for the conflict message.
                if order::advance(conn, id, next).await? == 0 {
                    let current = order::status_of(conn, id)
                        .await?
                        .ok_or_else(|| AppError::not_found(format!("Order {id} not found")))?;
                    return Err(AppError::state_conflict(format!(
                        "Order is {current}, cannot move to {next}"
                    )));
                }

                let detail = order::find_detail(conn, id)
                    .await?
                    .ok_or_else(|| AppError::not_found(format!("Order {id} not found")))?;
                Ok(detail)
            }
            .boxed()
        })
        .await?;

    let order_ref = OrderRef {
        restaurant_id,
        order_id: id,
    };
    match next {
        OrderStatus::Completed => state.bus.publish(DomainEvent::OrderCompleted(order_ref)),
        OrderStatus::Paid => state.bus.publish(DomainEvent::OrderPaid(order_ref)),
        _ => {}
    }

    tracing::info!(restaurant_id, order_id = id, status = %next, "order status updated");
    Ok(ok(detail))
}

/// POST /api/pos/orders/{id}/items - 追加明细 (只允许 open 状态)
pub async fn add_items(
    State(state): State<ServerState>,
    tenant: TenantContext,
    Path(id): Path<i64>,
    Json(items): Json<Vec<shared::models::OrderItemCreate>>,
) -> AppResult<Json<AppResponse<OrderDetail>>> {
    if items.is_empty() {
        return Err(AppError::validation("No items to add"));
    }
    for item in &items {
        item.validate()?;
    }

    let restaurant_id = tenant.restaurant_id;
    let to_add = items.clone();
    let detail = state
        .gateway
        .with_tenant(restaurant_id, move |conn| {
            async move {
                for item in &to_add {
                    if order::add_item(conn, id, item).await? == 0 {
                        return Err(AppError::state_conflict(format!(
                            "Order {id} is not open for new items"
                        )));
                    }
                }
                let detail = order::find_detail(conn, id)
                    .await?
                    .ok_or_else(|| AppError::not_found(format!("Order {id} not found")))?;
                Ok(detail)
            }
            .boxed()
        })
        .await?;

    state.fanout.push(
        Channel::Kitchen,
        restaurant_id,
        "order_items_added",
        json!({"order_id": id, "items": items}),
    );

    Ok(ok(detail))
}
