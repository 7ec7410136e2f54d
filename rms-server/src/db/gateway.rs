//! Tenant-Scoped Data Gateway
//!
//! 所有租户数据访问的唯一入口。`with_tenant` 从池中取出一条物理连接，
//! 在连接会话上建立租户隔离标记，再把整个工作单元包进一个事务：
//!
//! ```text
//! acquire ──► set _tenant_scope ──► BEGIN ──► unit of work ──► COMMIT/ROLLBACK
//!                                                   │
//!                                  clear _tenant_scope ──► release
//! ```
//!
//! 隔离标记是连接本地的 temp 表 (SQLite temp 表按连接隔离)，等价于原生
//! 行级安全里的会话 GUC。仓储层用
//! `restaurant_id = (SELECT restaurant_id FROM _tenant_scope)` 过滤，
//! 因此即使连接被池复用，语句也拿不到别的租户的行。
//!
//! 清理在成功与失败两条路径上都执行；清理本身失败时连接直接关闭，
//! 绝不带着标记回池。

use futures::future::BoxFuture;
use sqlx::{Connection, SqliteConnection, SqlitePool};

use crate::utils::AppError;

/// Gateway over the shared pool; cheap to clone
#[derive(Clone)]
pub struct TenantGateway {
    pool: SqlitePool,
}

impl TenantGateway {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Execute `work` as one unit of work under `restaurant_id`'s scope.
    ///
    /// The whole unit runs inside a single transaction on one dedicated
    /// connection: `Ok` commits, `Err` rolls back every statement. Domain
    /// errors from `work` propagate unchanged.
    pub async fn with_tenant<T, F>(&self, restaurant_id: i64, work: F) -> Result<T, AppError>
    where
        T: Send,
        F: for<'c> FnOnce(&'c mut SqliteConnection) -> BoxFuture<'c, Result<T, AppError>> + Send,
    {
        let mut conn = self.pool.acquire().await.map_err(AppError::from)?;

        // Marker goes on the raw session, outside the transaction, so a
        // rollback cannot resurrect or drop it.
        set_scope(&mut *conn, restaurant_id).await?;

        let result = run_in_transaction(&mut *conn, work).await;

        if let Err(e) = clear_scope(&mut *conn).await {
            // A connection we failed to clean must not return to the pool.
            tracing::warn!(error = %e, "failed to clear tenant scope, closing connection");
            let raw = conn.detach();
            let _ = raw.close().await;
        }

        result
    }
}

async fn run_in_transaction<T, F>(conn: &mut SqliteConnection, work: F) -> Result<T, AppError>
where
    T: Send,
    F: for<'c> FnOnce(&'c mut SqliteConnection) -> BoxFuture<'c, Result<T, AppError>> + Send,
{
    // IMMEDIATE takes the write lock up front so concurrent units of work
    // queue on busy_timeout; a deferred BEGIN that reads before writing
    // would instead fail with SQLITE_BUSY on the lock upgrade.
    let mut tx = conn
        .begin_with("BEGIN IMMEDIATE")
        .await
        .map_err(AppError::from)?;
    match work(&mut *tx).await {
        Ok(value) => {
            tx.commit().await.map_err(AppError::from)?;
            Ok(value)
        }
        Err(e) => {
            // Rollback failure is secondary; the domain error wins.
            if let Err(rb) = tx.rollback().await {
                tracing::warn!(error = %rb, "rollback failed");
            }
            Err(e)
        }
    }
}

async fn set_scope(conn: &mut SqliteConnection, restaurant_id: i64) -> Result<(), AppError> {
    sqlx::query(
        "CREATE TEMP TABLE IF NOT EXISTS _tenant_scope (
            slot INTEGER PRIMARY KEY CHECK (slot = 0),
            restaurant_id INTEGER NOT NULL
        )",
    )
    .execute(&mut *conn)
    .await?;
    sqlx::query("INSERT OR REPLACE INTO _tenant_scope (slot, restaurant_id) VALUES (0, ?)")
        .bind(restaurant_id)
        .execute(&mut *conn)
        .await?;
    Ok(())
}

async fn clear_scope(conn: &mut SqliteConnection) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM _tenant_scope")
        .execute(&mut *conn)
        .await?;
    Ok(())
}

/// Read the session marker, if any. Used by tests and diagnostics.
pub async fn current_scope(conn: &mut SqliteConnection) -> Result<Option<i64>, sqlx::Error> {
    sqlx::query(
        "CREATE TEMP TABLE IF NOT EXISTS _tenant_scope (
            slot INTEGER PRIMARY KEY CHECK (slot = 0),
            restaurant_id INTEGER NOT NULL
        )",
    )
    .execute(&mut *conn)
    .await?;
    sqlx::query_scalar::<_, i64>("SELECT restaurant_id FROM _tenant_scope")
        .fetch_optional(&mut *conn)
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::DbService;
    use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
    use std::str::FromStr;

    async fn test_gateway(max_connections: u32) -> (TenantGateway, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("test.db");
        let path = path.to_str().unwrap();

        // Run migrations through the normal service, then build a pool of
        // the requested size over the same file.
        let _ = DbService::new(path).await.unwrap();
        let options = SqliteConnectOptions::from_str(&format!("sqlite:{path}")).unwrap();
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await
            .unwrap();

        (TenantGateway::new(pool), dir)
    }

    async fn seed_two_restaurants(gateway: &TenantGateway) {
        sqlx::query(
            "INSERT INTO restaurant (id, name, slug) VALUES
             (1, 'One', 'one'), (2, 'Two', 'two')",
        )
        .execute(gateway.pool())
        .await
        .unwrap();
        sqlx::query(
            "INSERT INTO orders (restaurant_id, order_type, status, total, created_at) VALUES
             (1, 'takeaway', 'open', 10.0, 0),
             (1, 'takeaway', 'open', 20.0, 0),
             (2, 'takeaway', 'open', 99.0, 0)",
        )
        .execute(gateway.pool())
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn test_scope_visible_inside_unit_of_work() {
        let (gateway, _dir) = test_gateway(1).await;
        let seen = gateway
            .with_tenant(42, |conn| {
                Box::pin(async move { Ok(current_scope(conn).await?) })
            })
            .await
            .unwrap();
        assert_eq!(seen, Some(42));
    }

    #[tokio::test]
    async fn test_scope_cleared_before_connection_returns_to_pool() {
        // Single-connection pool: the next checkout is guaranteed to reuse
        // the same physical connection.
        let (gateway, _dir) = test_gateway(1).await;
        gateway
            .with_tenant(7, |_conn| Box::pin(async move { Ok(()) }))
            .await
            .unwrap();

        let mut conn = gateway.pool().acquire().await.unwrap();
        let leaked = current_scope(&mut conn).await.unwrap();
        assert_eq!(leaked, None);
    }

    #[tokio::test]
    async fn test_scope_cleared_after_failed_unit_of_work() {
        let (gateway, _dir) = test_gateway(1).await;
        let result: Result<(), _> = gateway
            .with_tenant(7, |_conn| {
                Box::pin(async move { Err(AppError::business_rule("boom")) })
            })
            .await;
        assert!(result.is_err());

        let mut conn = gateway.pool().acquire().await.unwrap();
        assert_eq!(current_scope(&mut conn).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_scoped_query_never_sees_other_tenant_rows() {
        let (gateway, _dir) = test_gateway(1).await;
        seed_two_restaurants(&gateway).await;

        // Scope to tenant 2 first so the reused connection had a different
        // marker before tenant 1 checks it out.
        let t2_totals = gateway
            .with_tenant(2, |conn| {
                Box::pin(async move {
                    let rows: Vec<f64> = sqlx::query_scalar(
                        "SELECT total FROM orders
                         WHERE restaurant_id = (SELECT restaurant_id FROM _tenant_scope)",
                    )
                    .fetch_all(&mut *conn)
                    .await?;
                    Ok(rows)
                })
            })
            .await
            .unwrap();
        assert_eq!(t2_totals, vec![99.0]);

        let t1_totals = gateway
            .with_tenant(1, |conn| {
                Box::pin(async move {
                    let rows: Vec<f64> = sqlx::query_scalar(
                        "SELECT total FROM orders
                         WHERE restaurant_id = (SELECT restaurant_id FROM _tenant_scope)",
                    )
                    .fetch_all(&mut *conn)
                    .await?;
                    Ok(rows)
                })
            })
            .await
            .unwrap();
        assert_eq!(t1_totals, vec![10.0, 20.0]);
    }

    #[tokio::test]
    async fn test_failed_unit_of_work_rolls_back_every_statement() {
        let (gateway, _dir) = test_gateway(1).await;
        seed_two_restaurants(&gateway).await;

        let result: Result<(), _> = gateway
            .with_tenant(1, |conn| {
                Box::pin(async move {
                    sqlx::query(
                        "INSERT INTO orders (restaurant_id, order_type, status, total, created_at)
                         VALUES ((SELECT restaurant_id FROM _tenant_scope), 'takeaway', 'open', 5.0, 0)",
                    )
                    .execute(&mut *conn)
                    .await?;
                    Err(AppError::business_rule("abort after insert"))
                })
            })
            .await;
        assert!(result.is_err());

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM orders WHERE restaurant_id = 1")
            .fetch_one(gateway.pool())
            .await
            .unwrap();
        assert_eq!(count, 2, "insert must have been rolled back");
    }

    #[tokio::test]
    async fn test_successful_unit_of_work_commits() {
        let (gateway, _dir) = test_gateway(1).await;
        seed_two_restaurants(&gateway).await;

        gateway
            .with_tenant(1, |conn| {
                Box::pin(async move {
                    sqlx::query(
                        "INSERT INTO orders (restaurant_id, order_type, status, total, created_at)
                         VALUES ((SELECT restaurant_id FROM _tenant_scope), 'takeaway', 'open', 5.0, 0)",
                    )
                    .execute(&mut *conn)
                    .await?;
                    Ok(())
                })
            })
            .await
            .unwrap();

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM orders WHERE restaurant_id = 1")
            .fetch_one(gateway.pool())
            .await
            .unwrap();
        assert_eq!(count, 3);
    }
}
