//! Server Implementation
//!
//! HTTP 服务器启动、路由装配和优雅退出。

use axum::{
    Router, middleware,
    routing::{get, post, put},
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::api;
use crate::auth::require_auth;
use crate::core::{Config, ServerState};
use crate::gate::require_module;
use crate::realtime::ws;
use crate::utils::AppError;

/// 装配完整路由
///
/// | 前缀 | 认证 | 模块开关 |
/// |------|------|----------|
/// | /api/auth | 无 | 无 |
/// | /api/public | 无 (租户走请求头) | 无 |
/// | /api/pos | JWT | pos |
/// | /api/inventory | JWT | inventory |
/// | /api/modules | JWT | 无 |
/// | /ws/* | JWT (query token) | 无 |
pub fn build_router(state: ServerState) -> Router {
    let pos_routes = Router::new()
        .route("/orders", get(api::orders::list).post(api::orders::create))
        .route("/orders/{id}", get(api::orders::detail))
        .route("/orders/{id}/status", put(api::orders::update_status))
        .route("/orders/{id}/items", post(api::orders::add_items))
        .route("/tables", get(api::tables::list))
        .route("/tables/{id}/reserve", post(api::tables::reserve))
        .route("/tables/{id}/release", post(api::tables::release))
        .route("/kitchen/queue", get(api::kitchen::queue))
        .route("/kitchen/items/{id}/ready", post(api::kitchen::item_ready))
        // Gate layer goes on first so auth (added after) runs before it
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_module("pos"),
        ))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth));

    let inventory_routes = Router::new()
        .route("/stock", get(api::inventory::stock))
        .route(
            "/purchase-orders",
            get(api::inventory::list_purchase_orders).post(api::inventory::create_purchase_order),
        )
        .route(
            "/purchase-orders/{id}/receive",
            post(api::inventory::receive_purchase_order),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_module("inventory"),
        ))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth));

    let module_routes = Router::new()
        .route("/api/modules", get(api::modules::list))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth));

    Router::new()
        .route("/api/health", get(api::health::check))
        .route("/api/auth/login", post(api::auth::login))
        // Unauthenticated order intake (self-service kiosks); tenant comes
        // from the x-restaurant-id header
        .route("/api/public/orders", post(api::orders::create))
        .nest("/api/pos", pos_routes)
        .nest("/api/inventory", inventory_routes)
        .merge(module_routes)
        .route("/ws/kds", get(ws::kds_handler))
        .route("/ws/waiter", get(ws::waiter_handler))
        .route("/ws/inventory", get(ws::inventory_handler))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// HTTP Server
pub struct Server {
    config: Config,
    state: Option<ServerState>,
}

impl Server {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            state: None,
        }
    }

    /// Create server with existing state (used by tests)
    pub fn with_state(config: Config, state: ServerState) -> Self {
        Self {
            config,
            state: Some(state),
        }
    }

    pub async fn run(&self) -> Result<(), AppError> {
        let state = match &self.state {
            Some(s) => s.clone(),
            None => ServerState::initialize(&self.config).await?,
        };

        let app = build_router(state);
        let addr = std::net::SocketAddr::from(([0, 0, 0, 0], self.config.http_port));
        tracing::info!("RMS server starting on {}", addr);

        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|e| AppError::internal(format!("Failed to bind {addr}: {e}")))?;

        axum::serve(listener, app)
            .with_graceful_shutdown(async {
                let _ = tokio::signal::ctrl_c().await;
                tracing::info!("Shutting down...");
            })
            .await
            .map_err(|e| AppError::internal(format!("Server error: {e}")))?;

        Ok(())
    }
}
