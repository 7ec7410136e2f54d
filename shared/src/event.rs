//! 领域事件
//!
//! 订单/桌台/库存生命周期产生的进程内事件。事件一经发布不可变，
//! 不落盘、不重放：发布时没有订阅者的事件直接丢失 (best-effort)。

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::types::OrderType;

/// Event kinds, used as the subscription key on the bus
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventKind {
    OrderCreated,
    OrderCompleted,
    OrderPaid,
    LowStock,
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OrderCreated => write!(f, "ORDER_CREATED"),
            Self::OrderCompleted => write!(f, "ORDER_COMPLETED"),
            Self::OrderPaid => write!(f, "ORDER_PAID"),
            Self::LowStock => write!(f, "LOW_STOCK"),
        }
    }
}

/// One line of an order as carried inside [`DomainEvent::OrderCreated`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderLine {
    pub menu_item_id: i64,
    pub quantity: i64,
    pub price: f64,
}

/// Payload of `ORDER_CREATED`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderCreatedPayload {
    pub restaurant_id: i64,
    pub order_id: i64,
    pub table_id: Option<i64>,
    pub order_type: OrderType,
    pub customer_name: Option<String>,
    pub items: Vec<OrderLine>,
    pub total: f64,
}

/// Payload of `ORDER_COMPLETED` / `ORDER_PAID`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderRef {
    pub restaurant_id: i64,
    pub order_id: i64,
}

/// Payload of `LOW_STOCK`; quantity is the post-decrement value that was
/// actually committed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LowStockPayload {
    pub restaurant_id: i64,
    pub raw_material_id: i64,
    pub quantity: f64,
    pub threshold: f64,
}

/// A typed, immutable domain event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "payload")]
pub enum DomainEvent {
    #[serde(rename = "ORDER_CREATED")]
    OrderCreated(OrderCreatedPayload),
    #[serde(rename = "ORDER_COMPLETED")]
    OrderCompleted(OrderRef),
    #[serde(rename = "ORDER_PAID")]
    OrderPaid(OrderRef),
    #[serde(rename = "LOW_STOCK")]
    LowStock(LowStockPayload),
}

impl DomainEvent {
    /// Subscription key for this event
    pub fn kind(&self) -> EventKind {
        match self {
            Self::OrderCreated(_) => EventKind::OrderCreated,
            Self::OrderCompleted(_) => EventKind::OrderCompleted,
            Self::OrderPaid(_) => EventKind::OrderPaid,
            Self::LowStock(_) => EventKind::LowStock,
        }
    }

    /// Tenant this event belongs to
    pub fn restaurant_id(&self) -> i64 {
        match self {
            Self::OrderCreated(p) => p.restaurant_id,
            Self::OrderCompleted(p) | Self::OrderPaid(p) => p.restaurant_id,
            Self::LowStock(p) => p.restaurant_id,
        }
    }
}
