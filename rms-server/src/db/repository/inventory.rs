//! Inventory Repository
//!
//! 库存扣减走单条 `UPDATE ... RETURNING`，返回扣减后的数量和阈值，
//! 越界判定 (低库存穿越) 留给上层。库存允许为负，进货冲正即可。

use super::RepoResult;
use shared::models::{
    PurchaseOrder, PurchaseOrderCreate, PurchaseOrderStatus, RecipeLine, StockLevel,
};
use sqlx::SqliteConnection;

/// Stock levels of the current tenant, joined with material names
pub async fn stock_levels(conn: &mut SqliteConnection) -> RepoResult<Vec<StockLevel>> {
    let levels = sqlx::query_as::<_, StockLevel>(
        "SELECT s.raw_material_id, m.name, m.unit, s.quantity, s.threshold
         FROM inventory_stock s
         JOIN raw_material m ON m.id = s.raw_material_id
         WHERE s.restaurant_id = (SELECT restaurant_id FROM _tenant_scope)
         ORDER BY m.name",
    )
    .fetch_all(&mut *conn)
    .await?;
    Ok(levels)
}

/// Recipe lines for one menu item
pub async fn recipe_lines(
    conn: &mut SqliteConnection,
    menu_item_id: i64,
) -> RepoResult<Vec<RecipeLine>> {
    let lines = sqlx::query_as::<_, RecipeLine>(
        "SELECT menu_item_id, raw_material_id, amount
         FROM recipe
         WHERE menu_item_id = ? AND restaurant_id = (SELECT restaurant_id FROM _tenant_scope)",
    )
    .bind(menu_item_id)
    .fetch_all(&mut *conn)
    .await?;
    Ok(lines)
}

/// Decrement one material's stock; returns (quantity_after, threshold) when
/// the tenant tracks that material, None otherwise.
pub async fn consume_stock(
    conn: &mut SqliteConnection,
    raw_material_id: i64,
    amount: f64,
) -> RepoResult<Option<(f64, f64)>> {
    let row = sqlx::query_as::<_, (f64, f64)>(
        "UPDATE inventory_stock SET quantity = quantity - ?
         WHERE raw_material_id = ?
           AND restaurant_id = (SELECT restaurant_id FROM _tenant_scope)
         RETURNING quantity, threshold",
    )
    .bind(amount)
    .bind(raw_material_id)
    .fetch_optional(&mut *conn)
    .await?;
    Ok(row)
}

/// Increment stock, creating the row if the material was never stocked
pub async fn credit_stock(
    conn: &mut SqliteConnection,
    raw_material_id: i64,
    amount: f64,
) -> RepoResult<()> {
    sqlx::query(
        "INSERT INTO inventory_stock (restaurant_id, raw_material_id, quantity, threshold)
         VALUES ((SELECT restaurant_id FROM _tenant_scope), ?, ?, 0)
         ON CONFLICT (restaurant_id, raw_material_id)
         DO UPDATE SET quantity = quantity + excluded.quantity",
    )
    .bind(raw_material_id)
    .bind(amount)
    .execute(&mut *conn)
    .await?;
    Ok(())
}

/// Insert a pending purchase order with its lines
pub async fn create_purchase_order(
    conn: &mut SqliteConnection,
    data: &PurchaseOrderCreate,
    now: i64,
) -> RepoResult<i64> {
    let po_id: i64 = sqlx::query_scalar(
        "INSERT INTO purchase_order (restaurant_id, vendor_name, status, created_at)
         VALUES ((SELECT restaurant_id FROM _tenant_scope), ?, 'pending', ?)
         RETURNING id",
    )
    .bind(&data.vendor_name)
    .bind(now)
    .fetch_one(&mut *conn)
    .await?;

    for item in &data.items {
        sqlx::query(
            "INSERT INTO purchase_order_item (restaurant_id, purchase_order_id, raw_material_id, quantity)
             VALUES ((SELECT restaurant_id FROM _tenant_scope), ?, ?, ?)",
        )
        .bind(po_id)
        .bind(item.raw_material_id)
        .bind(item.quantity)
        .execute(&mut *conn)
        .await?;
    }

    Ok(po_id)
}

/// All purchase orders of the current tenant, newest first
pub async fn list_purchase_orders(conn: &mut SqliteConnection) -> RepoResult<Vec<PurchaseOrder>> {
    let orders = sqlx::query_as::<_, PurchaseOrder>(
        "SELECT id, restaurant_id, vendor_name, status, created_at
         FROM purchase_order
         WHERE restaurant_id = (SELECT restaurant_id FROM _tenant_scope)
         ORDER BY created_at DESC, id DESC",
    )
    .fetch_all(&mut *conn)
    .await?;
    Ok(orders)
}

/// Conditional flip `pending -> received`; returns affected rows (0 = already
/// received or not visible in this scope)
pub async fn mark_received(conn: &mut SqliteConnection, po_id: i64) -> RepoResult<u64> {
    let result = sqlx::query(
        "UPDATE purchase_order SET status = ?
         WHERE id = ? AND status = ?
           AND restaurant_id = (SELECT restaurant_id FROM _tenant_scope)",
    )
    .bind(PurchaseOrderStatus::Received)
    .bind(po_id)
    .bind(PurchaseOrderStatus::Pending)
    .execute(&mut *conn)
    .await?;
    Ok(result.rows_affected())
}

/// Lines of a purchase order as (raw_material_id, quantity)
pub async fn purchase_order_lines(
    conn: &mut SqliteConnection,
    po_id: i64,
) -> RepoResult<Vec<(i64, f64)>> {
    let rows = sqlx::query_as::<_, (i64, f64)>(
        "SELECT raw_material_id, quantity FROM purchase_order_item
         WHERE purchase_order_id = ?
           AND restaurant_id = (SELECT restaurant_id FROM _tenant_scope)",
    )
    .bind(po_id)
    .fetch_all(&mut *conn)
    .await?;
    Ok(rows)
}
