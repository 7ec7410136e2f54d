//! Shared domain types for the RMS platform
//!
//! Everything the server and its clients agree on lives here:
//! - [`models`] - 数据模型 (订单、桌台、库存、模块开关)
//! - [`event`] - 领域事件 (订单生命周期、库存告警)
//! - [`types`] - 基础类型 (订单类型、员工角色)

pub mod event;
pub mod models;
pub mod types;
pub mod util;

pub use event::{DomainEvent, EventKind};
pub use types::{OrderType, Role};
