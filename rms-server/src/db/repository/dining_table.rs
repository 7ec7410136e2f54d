//! Dining Table Repository
//!
//! 桌台状态全部走条件更新：`WHERE status = <expected>`。并发竞争时输家
//! 影响 0 行，由调用方按冲突处理；这里不加锁。

use super::RepoResult;
use shared::models::{DiningTable, TableStatus};
use sqlx::SqliteConnection;

/// All tables for the current tenant
pub async fn list(conn: &mut SqliteConnection) -> RepoResult<Vec<DiningTable>> {
    let tables = sqlx::query_as::<_, DiningTable>(
        "SELECT id, restaurant_id, name, capacity, status
         FROM dining_table
         WHERE restaurant_id = (SELECT restaurant_id FROM _tenant_scope)
         ORDER BY name",
    )
    .fetch_all(&mut *conn)
    .await?;
    Ok(tables)
}

/// Find a table by id, scoped
pub async fn find_by_id(
    conn: &mut SqliteConnection,
    table_id: i64,
) -> RepoResult<Option<DiningTable>> {
    let table = sqlx::query_as::<_, DiningTable>(
        "SELECT id, restaurant_id, name, capacity, status
         FROM dining_table
         WHERE id = ? AND restaurant_id = (SELECT restaurant_id FROM _tenant_scope)",
    )
    .bind(table_id)
    .fetch_optional(&mut *conn)
    .await?;
    Ok(table)
}

/// Conditional transition of one table; true when this caller won the update
pub async fn transition(
    conn: &mut SqliteConnection,
    table_id: i64,
    from: TableStatus,
    to: TableStatus,
) -> RepoResult<bool> {
    let result = sqlx::query(
        "UPDATE dining_table SET status = ?
         WHERE id = ? AND status = ?
           AND restaurant_id = (SELECT restaurant_id FROM _tenant_scope)",
    )
    .bind(to)
    .bind(table_id)
    .bind(from)
    .execute(&mut *conn)
    .await?;
    Ok(result.rows_affected() == 1)
}

/// Conditional transition of the table referenced by an order; returns the
/// table id when the update won, None otherwise (no table, or prior status
/// already moved on)
pub async fn transition_for_order(
    conn: &mut SqliteConnection,
    order_id: i64,
    from: TableStatus,
    to: TableStatus,
) -> RepoResult<Option<i64>> {
    let table_id = sqlx::query_scalar::<_, i64>(
        "UPDATE dining_table SET status = ?
         WHERE id = (SELECT table_id FROM orders
                     WHERE id = ? AND restaurant_id = (SELECT restaurant_id FROM _tenant_scope))
           AND status = ?
           AND restaurant_id = (SELECT restaurant_id FROM _tenant_scope)
         RETURNING id",
    )
    .bind(to)
    .bind(order_id)
    .bind(from)
    .fetch_optional(&mut *conn)
    .await?;
    Ok(table_id)
}
