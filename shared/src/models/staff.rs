//! Staff Model
//!
//! 员工账号是系统级行 (登录先于租户上下文存在)，但仍携带 restaurant_id，
//! 签发的令牌以它为租户来源。

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Staff account
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Staff {
    pub id: i64,
    pub restaurant_id: i64,
    pub username: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub display_name: Option<String>,
    pub role: String,
}

/// Login request payload
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1, message = "username required"))]
    pub username: String,
    #[validate(length(min = 1, message = "password required"))]
    pub password: String,
}

/// Login response: the token embeds restaurant id and role
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub restaurant_id: i64,
    pub role: String,
    pub display_name: Option<String>,
}
