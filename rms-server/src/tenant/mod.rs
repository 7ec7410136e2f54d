//! Tenant Context Provider
//!
//! 每个请求解析出一个 [`TenantContext`]，解析顺序：
//!
//! 1. 认证身份 ([`CurrentUser`]) 携带的 restaurant_id，权威来源，
//!    请求头不能覆盖它；
//! 2. 未认证路径上的 `x-restaurant-id` 请求头；
//! 3. 两者皆无则拒绝请求 (400, Restaurant ID missing)。
//!
//! 上下文只在请求生命周期内有效，不跨请求缓存。

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::auth::CurrentUser;
use crate::utils::AppError;

pub const TENANT_HEADER: &str = "x-restaurant-id";

/// Resolved tenant for the current request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TenantContext {
    pub restaurant_id: i64,
}

impl<S> FromRequestParts<S> for TenantContext
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // Authenticated identity wins over any header
        if let Some(user) = parts.extensions.get::<CurrentUser>() {
            return Ok(Self {
                restaurant_id: user.restaurant_id,
            });
        }

        let header_id = parts
            .headers
            .get(TENANT_HEADER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse::<i64>().ok());

        match header_id {
            Some(restaurant_id) => Ok(Self { restaurant_id }),
            None => Err(AppError::UnresolvedTenant),
        }
    }
}
