//! Lifecycle Engine
//!
//! 订单事件驱动的派生状态流转。订阅关系：
//!
//! ```text
//! ORDER_CREATED ───► 厨房/服务员推送 (+ 堂食桌台 occupied 推送)
//! ORDER_COMPLETED ─► 桌台 occupied -> billed
//!                └─► 按配方扣减库存，穿越阈值则发 LOW_STOCK
//! ORDER_PAID ──────► 桌台 billed -> vacant
//! LOW_STOCK ───────► 库存频道推送
//! ```
//!
//! 订阅者尽力而为：失败只记日志，既不重试也不影响已提交的订单状态。

mod inventory_listeners;
mod order_listeners;

use crate::core::ServerState;

/// Wire up every lifecycle subscriber. Called once during state
/// initialization, before the server accepts requests.
pub fn register(state: &ServerState) {
    order_listeners::register(state);
    inventory_listeners::register(state);
}
