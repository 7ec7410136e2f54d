//! Feature-Gate Filter
//!
//! 按租户的模块开关决定请求放行与否。规则：
//!
//! - 开关打开：放行；
//! - 开关关闭或从未配置：默认拒绝 (403, Module disabled)；
//! - owner / manager 角色无视开关，始终放行；
//! - 开关查询失败按关闭处理，拒绝请求。
//!
//! 只拦 HTTP 路由。事件订阅者不经过这里，模块中途被关掉时在途的
//! 生命周期动作照常跑完。

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use futures::future::FutureExt;
use shared::types::Role;

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::utils::AppError;

/// Whether `role` may use `module` in `restaurant_id`'s scope
pub async fn allow(
    state: &ServerState,
    restaurant_id: i64,
    module: &str,
    role: &str,
) -> Result<bool, AppError> {
    if Role::bypasses_module_gate(role) {
        return Ok(true);
    }

    let module_name = module.to_string();
    let lookup = state
        .gateway
        .with_tenant(restaurant_id, move |conn| {
            async move {
                let enabled =
                    crate::db::repository::module_config::is_enabled(conn, &module_name).await?;
                Ok(enabled)
            }
            .boxed()
        })
        .await;

    // A failed lookup counts as switched off, same as a missing row
    match lookup {
        Ok(enabled) => Ok(enabled),
        Err(err) => {
            tracing::warn!(module, restaurant_id, error = %err, "module flag lookup failed, denying");
            Ok(false)
        }
    }
}

/// 模块开关中间件工厂
///
/// # 用法
///
/// ```ignore
/// Router::new()
///     .route("/api/inventory/stock", get(handler::stock))
///     .layer(middleware::from_fn_with_state(state, require_module("inventory")));
/// ```
///
/// 必须套在认证中间件之内 (先认证，后查开关)。
pub fn require_module(
    module: &'static str,
) -> impl Fn(
    State<ServerState>,
    Request,
    Next,
) -> std::pin::Pin<Box<dyn std::future::Future<Output = Result<Response, AppError>> + Send>>
+ Clone {
    move |State(state): State<ServerState>, req: Request, next: Next| {
        Box::pin(async move {
            let user = req
                .extensions()
                .get::<CurrentUser>()
                .ok_or(AppError::Unauthorized)?;

            if !allow(&state, user.restaurant_id, module, &user.role).await? {
                tracing::warn!(
                    module,
                    restaurant_id = user.restaurant_id,
                    username = %user.username,
                    role = %user.role,
                    "module gate denied request"
                );
                return Err(AppError::ModuleDisabled(module.to_string()));
            }

            Ok(next.run(req).await)
        })
    }
}
