//! 库存事件订阅者
//!
//! `ORDER_COMPLETED` 按配方扣减原料库存。整张订单的扣减在一个工作
//! 单元里提交；阈值穿越判定用扣减前后的数量，只有从阈值之上落到之下
//! 才发 `LOW_STOCK` (停在阈值之下继续扣减不再重复告警)。库存允许为负。

use futures::future::FutureExt;
use serde_json::json;
use shared::event::{DomainEvent, EventKind, LowStockPayload};
use std::collections::HashMap;
use std::sync::Arc;

use crate::core::ServerState;
use crate::db::repository::{inventory, order};
use crate::realtime::Channel;
use crate::utils::AppError;

pub fn register(state: &ServerState) {
    let bus = state.bus.clone();

    let st = state.clone();
    bus.subscribe(
        EventKind::OrderCompleted,
        "stock-consumption",
        Arc::new(move |event| {
            let state = st.clone();
            async move { on_order_completed(state, event).await }.boxed()
        }),
    );

    let st = state.clone();
    bus.subscribe(
        EventKind::LowStock,
        "low-stock-fanout",
        Arc::new(move |event| {
            let state = st.clone();
            async move { on_low_stock(state, event).await }.boxed()
        }),
    );
}

async fn on_order_completed(state: ServerState, event: DomainEvent) -> Result<(), AppError> {
    let DomainEvent::OrderCompleted(order_ref) = event else {
        return Ok(());
    };

    let restaurant_id = order_ref.restaurant_id;
    let order_id = order_ref.order_id;

    // Alerts are collected inside the unit of work but published only
    // after it commits, so a rollback cannot leave phantom alerts behind.
    let alerts = state
        .gateway
        .with_tenant(restaurant_id, move |conn| {
            async move { consume_for_order(conn, restaurant_id, order_id).await }.boxed()
        })
        .await?;

    for alert in alerts {
        state.bus.publish(DomainEvent::LowStock(alert));
    }

    Ok(())
}

async fn consume_for_order(
    conn: &mut sqlx::SqliteConnection,
    restaurant_id: i64,
    order_id: i64,
) -> Result<Vec<LowStockPayload>, AppError> {
    // Aggregate per material across all lines first so one material hit
    // by several dishes crosses its threshold at most once.
    let mut demand: HashMap<i64, f64> = HashMap::new();
    for (menu_item_id, quantity) in order::items_for_consumption(conn, order_id).await? {
        for line in inventory::recipe_lines(conn, menu_item_id).await? {
            *demand.entry(line.raw_material_id).or_insert(0.0) +=
                line.amount * quantity as f64;
        }
    }

    let mut alerts = Vec::new();
    for (raw_material_id, amount) in demand {
        let Some((after, threshold)) = inventory::consume_stock(conn, raw_material_id, amount).await?
        else {
            // Material without a stock row is simply not tracked here
            continue;
        };

        let before = after + amount;
        if threshold > 0.0 && before >= threshold && after < threshold {
            alerts.push(LowStockPayload {
                restaurant_id,
                raw_material_id,
                quantity: after,
                threshold,
            });
        }
    }

    tracing::debug!(order_id, restaurant_id, alerts = alerts.len(), "stock consumed");
    Ok(alerts)
}

async fn on_low_stock(state: ServerState, event: DomainEvent) -> Result<(), AppError> {
    let DomainEvent::LowStock(payload) = event else {
        return Ok(());
    };

    state.fanout.push(
        Channel::Inventory,
        payload.restaurant_id,
        "low_stock",
        json!({
            "raw_material_id": payload.raw_material_id,
            "quantity": payload.quantity,
            "threshold": payload.threshold,
        }),
    );

    Ok(())
}
