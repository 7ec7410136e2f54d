//! RMS Server
//!
//! 多租户餐厅运营平台核心。模块总览：
//!
//! | 模块 | 职责 |
//! |------|------|
//! | [`tenant`] | 请求级租户上下文解析 |
//! | [`db`] | 连接池、迁移、租户数据网关与仓储 |
//! | [`events`] | 进程内领域事件总线 |
//! | [`lifecycle`] | 订单/桌台/库存联动流转 |
//! | [`realtime`] | 角色频道实时推送 (WebSocket) |
//! | [`gate`] | 按租户模块开关拦截请求 |
//! | [`auth`] | JWT 认证 |
//! | [`api`] | HTTP 处理函数 |
//! | [`core`] | 配置、状态装配与服务器 |

pub mod api;
pub mod auth;
pub mod core;
pub mod db;
pub mod events;
pub mod gate;
pub mod lifecycle;
pub mod realtime;
pub mod tenant;
pub mod utils;

pub use crate::core::{Config, Server, ServerState};
pub use crate::utils::{AppError, AppResult};
