use std::sync::Arc;

use crate::auth::JwtService;
use crate::core::Config;
use crate::db::{DbService, TenantGateway};
use crate::events::EventBus;
use crate::realtime::FanOutRegistry;
use crate::utils::AppError;

/// 服务器状态 - 持有所有服务的共享引用
///
/// 使用 Arc 实现浅拷贝，克隆成本极低。
///
/// | 字段 | 说明 |
/// |------|------|
/// | config | 配置项 (不可变) |
/// | db | SQLite 连接池 |
/// | gateway | 租户数据网关 |
/// | bus | 领域事件总线 |
/// | fanout | 实时推送通道 |
/// | jwt | JWT 认证服务 |
#[derive(Clone)]
pub struct ServerState {
    pub config: Config,
    pub db: DbService,
    pub gateway: TenantGateway,
    pub bus: EventBus,
    pub fanout: FanOutRegistry,
    pub jwt: Arc<JwtService>,
}

impl ServerState {
    /// 初始化所有服务并接好事件订阅
    pub async fn initialize(config: &Config) -> Result<Self, AppError> {
        let db = DbService::new(&config.db_path()).await?;
        let gateway = TenantGateway::new(db.pool.clone());
        let bus = EventBus::new();
        let fanout = FanOutRegistry::new();
        let jwt = Arc::new(JwtService::with_config(config.jwt.clone()));

        let state = Self {
            config: config.clone(),
            db,
            gateway,
            bus,
            fanout,
            jwt,
        };

        crate::lifecycle::register(&state);
        tracing::info!("Server state initialized, lifecycle subscribers registered");

        Ok(state)
    }
}
