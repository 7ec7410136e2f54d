//! Dining Table Model
//!
//! 桌台状态机 (仅堂食)：
//!
//! ```text
//! vacant ──► occupied ──► billed ──► vacant
//!   │ ▲
//!   ▼ │
//! reserved
//! ```
//!
//! 每一步落库都是条件更新 (`WHERE status = <expected>`)，并发下输家看到
//! 0 行受影响，按业务冲突处理，不重试。

use serde::{Deserialize, Serialize};
use std::fmt;

/// Dining table status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "db", derive(sqlx::Type), sqlx(rename_all = "snake_case"))]
pub enum TableStatus {
    Vacant,
    Occupied,
    Reserved,
    Billed,
}

impl TableStatus {
    /// Whether `next` is a legal one-step transition from `self`
    pub fn can_transition_to(self, next: TableStatus) -> bool {
        matches!(
            (self, next),
            (TableStatus::Vacant, TableStatus::Occupied)
                | (TableStatus::Vacant, TableStatus::Reserved)
                | (TableStatus::Reserved, TableStatus::Vacant)
                | (TableStatus::Occupied, TableStatus::Billed)
                | (TableStatus::Billed, TableStatus::Vacant)
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Vacant => "vacant",
            Self::Occupied => "occupied",
            Self::Reserved => "reserved",
            Self::Billed => "billed",
        }
    }
}

impl fmt::Display for TableStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Dining table entity
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct DiningTable {
    pub id: i64,
    pub restaurant_id: i64,
    pub name: String,
    pub capacity: i64,
    pub status: TableStatus,
}
