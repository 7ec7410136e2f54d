//! 基础类型
//!
//! 订单服务类型与员工角色。

use serde::{Deserialize, Serialize};
use std::fmt;

/// Service type of an order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "db", derive(sqlx::Type), sqlx(rename_all = "snake_case"))]
pub enum OrderType {
    /// 堂食 (需要桌台)
    DineIn,
    /// 外带
    Takeaway,
    /// 外送
    Delivery,
}

impl fmt::Display for OrderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DineIn => write!(f, "dine_in"),
            Self::Takeaway => write!(f, "takeaway"),
            Self::Delivery => write!(f, "delivery"),
        }
    }
}

/// Staff roles
///
/// Stored as plain strings in tokens and in the staff table; this enum is the
/// canonical list plus the privileged set used by the module gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Owner,
    Manager,
    Waiter,
    Kitchen,
    Staff,
}

impl Role {
    /// Roles allowed through a disabled module gate (owners must always be
    /// able to re-enable or inspect a module)
    pub const MODULE_BYPASS: &[&str] = &["owner", "manager"];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Owner => "owner",
            Self::Manager => "manager",
            Self::Waiter => "waiter",
            Self::Kitchen => "kitchen",
            Self::Staff => "staff",
        }
    }

    /// Whether a role name is in the privileged bypass set
    pub fn bypasses_module_gate(role: &str) -> bool {
        Self::MODULE_BYPASS.contains(&role)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
