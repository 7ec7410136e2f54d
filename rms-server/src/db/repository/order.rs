//! Order Repository
//!
//! 订单与明细的 SQL。状态流转一律条件更新，影响行数交给上层判定冲突。

use super::RepoResult;
use shared::models::{ItemStatus, KitchenTicket, Order, OrderDetail, OrderItem, OrderStatus};
use shared::models::{OrderCreate, OrderItemCreate};
use sqlx::SqliteConnection;

/// Insert an order with its items; returns the new order id and the frozen
/// total. Items are priced at creation time and never re-priced.
pub async fn create(
    conn: &mut SqliteConnection,
    data: &OrderCreate,
    now: i64,
) -> RepoResult<(i64, f64)> {
    let order_id: i64 = sqlx::query_scalar(
        "INSERT INTO orders (restaurant_id, table_id, order_type, customer_name, status, total, created_at)
         VALUES ((SELECT restaurant_id FROM _tenant_scope), ?, ?, ?, 'open', 0, ?)
         RETURNING id",
    )
    .bind(data.table_id)
    .bind(data.order_type)
    .bind(&data.customer_name)
    .bind(now)
    .fetch_one(&mut *conn)
    .await?;

    let mut total = 0.0;
    for item in &data.items {
        total += item.line_total();
        sqlx::query(
            "INSERT INTO order_item (restaurant_id, order_id, menu_item_id, quantity, price, status)
             VALUES ((SELECT restaurant_id FROM _tenant_scope), ?, ?, ?, ?, 'pending')",
        )
        .bind(order_id)
        .bind(item.menu_item_id)
        .bind(item.quantity)
        .bind(item.price)
        .execute(&mut *conn)
        .await?;
    }

    sqlx::query("UPDATE orders SET total = ? WHERE id = ?")
        .bind(total)
        .bind(order_id)
        .execute(&mut *conn)
        .await?;

    Ok((order_id, total))
}

/// All orders for the current tenant, newest first
pub async fn list(conn: &mut SqliteConnection) -> RepoResult<Vec<Order>> {
    let orders = sqlx::query_as::<_, Order>(
        "SELECT id, restaurant_id, table_id, order_type, customer_name, status, total, created_at
         FROM orders
         WHERE restaurant_id = (SELECT restaurant_id FROM _tenant_scope)
         ORDER BY created_at DESC, id DESC",
    )
    .fetch_all(&mut *conn)
    .await?;
    Ok(orders)
}

/// Order with items, or None when it does not exist in this tenant's scope
pub async fn find_detail(
    conn: &mut SqliteConnection,
    order_id: i64,
) -> RepoResult<Option<OrderDetail>> {
    let order = sqlx::query_as::<_, Order>(
        "SELECT id, restaurant_id, table_id, order_type, customer_name, status, total, created_at
         FROM orders
         WHERE id = ? AND restaurant_id = (SELECT restaurant_id FROM _tenant_scope)",
    )
    .bind(order_id)
    .fetch_optional(&mut *conn)
    .await?;

    let Some(order) = order else {
        return Ok(None);
    };

    let items = sqlx::query_as::<_, OrderItem>(
        "SELECT id, order_id, menu_item_id, quantity, price, status
         FROM order_item
         WHERE order_id = ? AND restaurant_id = (SELECT restaurant_id FROM _tenant_scope)
         ORDER BY id",
    )
    .bind(order_id)
    .fetch_all(&mut *conn)
    .await?;

    Ok(Some(OrderDetail::new(order, items)))
}

/// Current status, scoped
pub async fn status_of(
    conn: &mut SqliteConnection,
    order_id: i64,
) -> RepoResult<Option<OrderStatus>> {
    let status = sqlx::query_scalar::<_, OrderStatus>(
        "SELECT status FROM orders
         WHERE id = ? AND restaurant_id = (SELECT restaurant_id FROM _tenant_scope)",
    )
    .bind(order_id)
    .fetch_optional(&mut *conn)
    .await?;
    Ok(status)
}

/// Advance an order to `to` when its current status is a legal predecessor.
/// This must be the first write of its unit of work: a racer that moved the
/// order first makes it affect 0 rows instead of failing the snapshot
/// upgrade mid-transaction.
pub async fn advance(
    conn: &mut SqliteConnection,
    order_id: i64,
    to: OrderStatus,
) -> RepoResult<u64> {
    // Predecessor sets hold one or two entries; pad to two binds
    let (first, second) = match to.allowed_predecessors() {
        [] => return Ok(0),
        [only] => (*only, *only),
        [a, b, ..] => (*a, *b),
    };
    let result = sqlx::query(
        "UPDATE orders SET status = ?
         WHERE id = ? AND status IN (?, ?)
           AND restaurant_id = (SELECT restaurant_id FROM _tenant_scope)",
    )
    .bind(to)
    .bind(order_id)
    .bind(first)
    .bind(second)
    .execute(&mut *conn)
    .await?;
    Ok(result.rows_affected())
}

/// Append one item to an order and bump the stored total in the same unit of
/// work. The conditional total update doubles as the open-status check.
/// Returns affected rows of the total update (0 = order not open here).
pub async fn add_item(
    conn: &mut SqliteConnection,
    order_id: i64,
    item: &OrderItemCreate,
) -> RepoResult<u64> {
    let result = sqlx::query(
        "UPDATE orders SET total = total + ?
         WHERE id = ? AND status = 'open'
           AND restaurant_id = (SELECT restaurant_id FROM _tenant_scope)",
    )
    .bind(item.line_total())
    .bind(order_id)
    .execute(&mut *conn)
    .await?;

    if result.rows_affected() == 0 {
        return Ok(0);
    }

    sqlx::query(
        "INSERT INTO order_item (restaurant_id, order_id, menu_item_id, quantity, price, status)
         VALUES ((SELECT restaurant_id FROM _tenant_scope), ?, ?, ?, ?, 'pending')",
    )
    .bind(order_id)
    .bind(item.menu_item_id)
    .bind(item.quantity)
    .bind(item.price)
    .execute(&mut *conn)
    .await?;

    Ok(result.rows_affected())
}

/// Items of an order as (menu_item_id, quantity), for recipe resolution
pub async fn items_for_consumption(
    conn: &mut SqliteConnection,
    order_id: i64,
) -> RepoResult<Vec<(i64, i64)>> {
    let rows = sqlx::query_as::<_, (i64, i64)>(
        "SELECT menu_item_id, quantity FROM order_item
         WHERE order_id = ? AND restaurant_id = (SELECT restaurant_id FROM _tenant_scope)",
    )
    .bind(order_id)
    .fetch_all(&mut *conn)
    .await?;
    Ok(rows)
}

/// Kitchen-side conditional item transition `pending -> ready`; returns the
/// parent order id when this caller won the update
pub async fn mark_item_ready(
    conn: &mut SqliteConnection,
    item_id: i64,
) -> RepoResult<Option<i64>> {
    let order_id = sqlx::query_scalar::<_, i64>(
        "UPDATE order_item SET status = ?
         WHERE id = ? AND status = ?
           AND restaurant_id = (SELECT restaurant_id FROM _tenant_scope)
         RETURNING order_id",
    )
    .bind(ItemStatus::Ready)
    .bind(item_id)
    .bind(ItemStatus::Pending)
    .fetch_optional(&mut *conn)
    .await?;
    Ok(order_id)
}

/// Pending items of open orders, for the kitchen display snapshot
pub async fn kitchen_queue(conn: &mut SqliteConnection) -> RepoResult<Vec<KitchenTicket>> {
    let tickets = sqlx::query_as::<_, KitchenTicket>(
        "SELECT o.id AS order_id, o.table_id, oi.id AS item_id,
                oi.menu_item_id, mi.name AS item_name, oi.quantity, o.created_at
         FROM orders o
         JOIN order_item oi ON oi.order_id = o.id
         JOIN menu_item mi ON mi.id = oi.menu_item_id
         WHERE o.status = 'open' AND oi.status = 'pending'
           AND o.restaurant_id = (SELECT restaurant_id FROM _tenant_scope)
         ORDER BY o.created_at, oi.id",
    )
    .fetch_all(&mut *conn)
    .await?;
    Ok(tickets)
}
