//! 订单事件订阅者
//!
//! 桌台派生流转与角色频道推送。桌台更新用条件更新，前置状态不匹配
//! (比如桌台被手工改过) 时静默跳过，只记日志。

use futures::future::FutureExt;
use serde_json::json;
use shared::event::{DomainEvent, EventKind};
use shared::models::TableStatus;
use shared::types::OrderType;
use std::sync::Arc;

use crate::core::ServerState;
use crate::db::repository::dining_table;
use crate::realtime::Channel;

pub fn register(state: &ServerState) {
    let bus = state.bus.clone();

    let st = state.clone();
    bus.subscribe(
        EventKind::OrderCreated,
        "order-created-fanout",
        Arc::new(move |event| {
            let state = st.clone();
            async move { on_order_created(state, event).await }.boxed()
        }),
    );

    let st = state.clone();
    bus.subscribe(
        EventKind::OrderCompleted,
        "table-billing",
        Arc::new(move |event| {
            let state = st.clone();
            async move { on_order_completed(state, event).await }.boxed()
        }),
    );

    let st = state.clone();
    bus.subscribe(
        EventKind::OrderPaid,
        "table-vacating",
        Arc::new(move |event| {
            let state = st.clone();
            async move { on_order_paid(state, event).await }.boxed()
        }),
    );
}

/// Push the fresh order to kitchen and waiter screens. The table was
/// already seated inside the creation unit of work; here we only announce.
async fn on_order_created(state: ServerState, event: DomainEvent) -> Result<(), crate::utils::AppError> {
    let DomainEvent::OrderCreated(payload) = event else {
        return Ok(());
    };

    let frame = json!({
        "order_id": payload.order_id,
        "table_id": payload.table_id,
        "order_type": payload.order_type,
        "customer_name": payload.customer_name,
        "items": payload.items,
        "total": payload.total,
    });

    state
        .fanout
        .push(Channel::Kitchen, payload.restaurant_id, "new_order", frame.clone());
    state
        .fanout
        .push(Channel::Waiter, payload.restaurant_id, "new_order", frame);

    if payload.order_type == OrderType::DineIn {
        if let Some(table_id) = payload.table_id {
            state.fanout.broadcast_table_update(
                payload.restaurant_id,
                json!({"table_id": table_id, "status": TableStatus::Occupied}),
            );
        }
    }

    Ok(())
}

/// occupied -> billed when the order completes
async fn on_order_completed(
    state: ServerState,
    event: DomainEvent,
) -> Result<(), crate::utils::AppError> {
    let DomainEvent::OrderCompleted(order) = event else {
        return Ok(());
    };

    let order_id = order.order_id;
    let table_id = state
        .gateway
        .with_tenant(order.restaurant_id, move |conn| {
            async move {
                let table_id = dining_table::transition_for_order(
                    conn,
                    order_id,
                    TableStatus::Occupied,
                    TableStatus::Billed,
                )
                .await?;
                Ok(table_id)
            }
            .boxed()
        })
        .await?;

    match table_id {
        Some(table_id) => {
            state.fanout.broadcast_table_update(
                order.restaurant_id,
                json!({"table_id": table_id, "status": TableStatus::Billed}),
            );
        }
        None => {
            // Takeaway orders, or a table someone already moved on
            tracing::debug!(order_id, "no table to bill for completed order");
        }
    }

    Ok(())
}

/// billed -> vacant when the order is paid
async fn on_order_paid(state: ServerState, event: DomainEvent) -> Result<(), crate::utils::AppError> {
    let DomainEvent::OrderPaid(order) = event else {
        return Ok(());
    };

    let order_id = order.order_id;
    let table_id = state
        .gateway
        .with_tenant(order.restaurant_id, move |conn| {
            async move {
                let table_id = dining_table::transition_for_order(
                    conn,
                    order_id,
                    TableStatus::Billed,
                    TableStatus::Vacant,
                )
                .await?;
                Ok(table_id)
            }
            .boxed()
        })
        .await?;

    if let Some(table_id) = table_id {
        state.fanout.broadcast_table_update(
            order.restaurant_id,
            json!({"table_id": table_id, "status": TableStatus::Vacant}),
        );
    }

    Ok(())
}
