//! Inventory Models
//!
//! 库存只有两条变更路径：采购单入库 (加)、订单完成按配方消耗 (减)。

use serde::{Deserialize, Serialize};
use std::fmt;
use validator::Validate;

/// Stock level joined with its raw material (snapshot endpoint row)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct StockLevel {
    pub raw_material_id: i64,
    pub name: String,
    pub unit: String,
    pub quantity: f64,
    /// Low-stock threshold; 0 disables the alert for this line
    pub threshold: f64,
}

/// Recipe line: raw material consumed per unit of a menu item sold
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct RecipeLine {
    pub menu_item_id: i64,
    pub raw_material_id: i64,
    pub amount: f64,
}

/// Purchase order status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "db", derive(sqlx::Type), sqlx(rename_all = "snake_case"))]
pub enum PurchaseOrderStatus {
    Pending,
    Received,
}

impl fmt::Display for PurchaseOrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Received => write!(f, "received"),
        }
    }
}

/// Purchase order entity
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct PurchaseOrder {
    pub id: i64,
    pub restaurant_id: i64,
    pub vendor_name: String,
    pub status: PurchaseOrderStatus,
    pub created_at: i64,
}

/// Create purchase order payload
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct PurchaseOrderCreate {
    #[validate(length(min = 1, message = "vendor name required"))]
    pub vendor_name: String,
    #[validate(length(min = 1, message = "purchase order needs at least one line"))]
    #[validate(nested)]
    pub items: Vec<PurchaseOrderItemCreate>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct PurchaseOrderItemCreate {
    pub raw_material_id: i64,
    #[validate(range(min = 0.000001, message = "quantity must be positive"))]
    pub quantity: f64,
}
