//! API 模块
//!
//! HTTP 处理函数，按资源分文件。所有租户数据访问都经过
//! [`crate::db::TenantGateway`]，处理函数自身不拼 restaurant_id 条件。

pub mod auth;
pub mod health;
pub mod inventory;
pub mod kitchen;
pub mod modules;
pub mod orders;
pub mod tables;
