//! Order Model
//!
//! 订单与订单明细，以及两者的状态机。
//!
//! 订单状态单向流转，`paid` 为终态：
//!
//! ```text
//! open ──► served ──► completed ──► paid
//!   └────────────────────▲
//! ```
//!
//! 明细状态由厨房控制：`pending ──► ready`。所有明细 ready 时订单可出餐。

use serde::{Deserialize, Serialize};
use std::fmt;
use validator::Validate;

use crate::types::OrderType;

/// Order lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "db", derive(sqlx::Type), sqlx(rename_all = "snake_case"))]
pub enum OrderStatus {
    Open,
    Served,
    Completed,
    Paid,
}

impl OrderStatus {
    /// Whether `next` is a legal one-step transition from `self`.
    ///
    /// `open -> completed` is allowed directly for counter service where
    /// nothing is plated at the table.
    pub fn can_transition_to(self, next: OrderStatus) -> bool {
        matches!(
            (self, next),
            (OrderStatus::Open, OrderStatus::Served)
                | (OrderStatus::Open, OrderStatus::Completed)
                | (OrderStatus::Served, OrderStatus::Completed)
                | (OrderStatus::Completed, OrderStatus::Paid)
        )
    }

    /// Legal immediate predecessors of `self`; the mirror of
    /// [`Self::can_transition_to`]
    pub fn allowed_predecessors(self) -> &'static [OrderStatus] {
        match self {
            Self::Open => &[],
            Self::Served => &[Self::Open],
            Self::Completed => &[Self::Open, Self::Served],
            Self::Paid => &[Self::Completed],
        }
    }

    /// Terminal states accept no further transitions
    pub fn is_terminal(self) -> bool {
        self == OrderStatus::Paid
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Served => "served",
            Self::Completed => "completed",
            Self::Paid => "paid",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Order item status (kitchen-controlled)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "db", derive(sqlx::Type), sqlx(rename_all = "snake_case"))]
pub enum ItemStatus {
    Pending,
    Ready,
}

impl ItemStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Ready => "ready",
        }
    }
}

/// Order entity
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Order {
    pub id: i64,
    pub restaurant_id: i64,
    pub table_id: Option<i64>,
    pub order_type: OrderType,
    pub customer_name: Option<String>,
    pub status: OrderStatus,
    pub total: f64,
    pub created_at: i64,
}

/// Order item entity
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct OrderItem {
    pub id: i64,
    pub order_id: i64,
    pub menu_item_id: i64,
    pub quantity: i64,
    pub price: f64,
    pub status: ItemStatus,
}

/// Order with its items, as returned by the detail endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderDetail {
    pub order: Order,
    pub items: Vec<OrderItem>,
    /// Every item marked ready by the kitchen
    pub ready_for_service: bool,
}

impl OrderDetail {
    pub fn new(order: Order, items: Vec<OrderItem>) -> Self {
        let ready_for_service =
            !items.is_empty() && items.iter().all(|i| i.status == ItemStatus::Ready);
        Self {
            order,
            items,
            ready_for_service,
        }
    }
}

/// Create order payload
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct OrderCreate {
    pub table_id: Option<i64>,
    pub order_type: OrderType,
    pub customer_name: Option<String>,
    #[validate(length(min = 1, message = "order needs at least one item"))]
    #[validate(nested)]
    pub items: Vec<OrderItemCreate>,
}

/// One requested line of a new order; price is frozen at creation time
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct OrderItemCreate {
    pub menu_item_id: i64,
    #[validate(range(min = 1, message = "quantity must be positive"))]
    pub quantity: i64,
    #[validate(range(min = 0.0, message = "price cannot be negative"))]
    pub price: f64,
}

impl OrderItemCreate {
    pub fn line_total(&self) -> f64 {
        self.price * self.quantity as f64
    }
}

/// Status update payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderStatusUpdate {
    pub status: OrderStatus,
}

/// One pending item on the kitchen queue (snapshot endpoint row)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct KitchenTicket {
    pub order_id: i64,
    pub table_id: Option<i64>,
    pub item_id: i64,
    pub menu_item_id: i64,
    pub item_name: String,
    pub quantity: i64,
    pub created_at: i64,
}
