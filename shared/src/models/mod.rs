//! Data models
//!
//! Plain serde structs shared between the server and its clients. Database
//! derives (`sqlx::FromRow`) are behind the `db` feature so client builds
//! stay free of sqlx.

pub mod dining_table;
pub mod inventory;
pub mod module_config;
pub mod order;
pub mod staff;

pub use dining_table::{DiningTable, TableStatus};
pub use inventory::{
    PurchaseOrder, PurchaseOrderCreate, PurchaseOrderItemCreate, PurchaseOrderStatus, RecipeLine,
    StockLevel,
};
pub use module_config::ModuleFlag;
pub use order::{
    ItemStatus, KitchenTicket, Order, OrderCreate, OrderDetail, OrderItem, OrderItemCreate,
    OrderStatus, OrderStatusUpdate,
};
pub use staff::{LoginRequest, LoginResponse, Staff};
